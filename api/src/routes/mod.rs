//! HTTP route entry point for `/api/...`.
//!
//! - `/health` → liveness (public)
//! - `/assignments` → worksheet sync, hand-in, quiz grading, replay and marking (authenticated)
//! - `/classes` → bulk answer export and feedback import (teachers)

use crate::auth::guards::{allow_authenticated, allow_teacher};
use crate::routes::{
    assignments::assignment_routes, classes::class_routes, health::health_routes,
};
use axum::{Router, middleware::from_fn};
use util::state::AppState;

pub mod assignments;
pub mod classes;
pub mod common;
pub mod health;

pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .nest("/health", health_routes())
        .nest(
            "/assignments",
            assignment_routes().route_layer(from_fn(allow_authenticated)),
        )
        .nest("/classes", class_routes().route_layer(from_fn(allow_teacher)))
        .with_state(app_state)
}
