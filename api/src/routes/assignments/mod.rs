//! `/assignments` route group.
//!
//! - `GET  /{assignment_id}`          → fetch (owner or class teacher)
//! - `GET  /{assignment_id}/embed`    → the student's sandboxed embed or quiz prompts
//! - `POST /{assignment_id}/messages` → worksheet message ingress (autosave)
//! - `POST /{assignment_id}/hand-in`  → freeze the student's work
//! - `POST /{assignment_id}/quiz`     → grade a quiz submission
//! - `GET  /{assignment_id}/replay`   → marker's read-only replay
//! - `PUT  /{assignment_id}/mark`     → record mark and feedback

use axum::{
    Router,
    routing::{get, post, put},
};
use util::state::AppState;

pub mod get;
pub mod post;
pub mod put;

use get::{get_assignment, get_embed, get_replay};
use post::{hand_in, post_message, submit_quiz};
use put::put_mark;

pub fn assignment_routes() -> Router<AppState> {
    Router::new()
        .route("/{assignment_id}", get(get_assignment))
        .route("/{assignment_id}/embed", get(get_embed))
        .route("/{assignment_id}/messages", post(post_message))
        .route("/{assignment_id}/hand-in", post(hand_in))
        .route("/{assignment_id}/quiz", post(submit_quiz))
        .route("/{assignment_id}/replay", get(get_replay))
        .route("/{assignment_id}/mark", put(put_mark))
}
