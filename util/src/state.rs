//! Shared handle passed to every Axum handler and host operation.

use crate::ws::WebSocketManager;
use sea_orm::DatabaseConnection;

/// Database connection plus the live-event hub. Both halves are cheap,
/// reference-counted clones.
#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
    ws: WebSocketManager,
}

impl AppState {
    pub fn new(db: DatabaseConnection, ws: WebSocketManager) -> Self {
        Self { db, ws }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn ws(&self) -> &WebSocketManager {
        &self.ws
    }

    /// Owned connection for hosts and spawned tasks.
    pub fn db_clone(&self) -> DatabaseConnection {
        self.db.clone()
    }

    /// Owned hub for WebSocket sessions that outlive the handler.
    pub fn ws_clone(&self) -> WebSocketManager {
        self.ws.clone()
    }
}
