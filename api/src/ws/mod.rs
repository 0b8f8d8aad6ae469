//! WebSocket entry point for `/ws/...`.
//!
//! - `/assignments/{assignment_id}` → live events for one assignment
//!   (`work_saved`, `handed_in`, `marked`), for its student and class teacher.
//!
//! Browsers pass the token as `?token=...` on the upgrade request.

use axum::{Router, middleware::from_fn, routing::get};
use util::state::AppState;

use crate::auth::guards::allow_authenticated;

pub mod handlers;
pub mod serve;

use handlers::assignment_events_handler;

pub fn ws_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/assignments/{assignment_id}", get(assignment_events_handler))
        .route_layer(from_fn(allow_authenticated))
        .with_state(app_state)
}
