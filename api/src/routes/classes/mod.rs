//! `/classes` route group: bulk marking for one worksheet in one class.
//!
//! - `GET  /{class_id}/worksheets/{worksheet_id}/answers`           → answers export (text)
//! - `GET  /{class_id}/worksheets/{worksheet_id}/feedback-template` → blank template (text)
//! - `POST /{class_id}/worksheets/{worksheet_id}/feedback`          → import a filled template
//! - `GET  /grades`                                                  → grade vocabulary

use axum::{
    Router,
    routing::{get, post},
};
use util::state::AppState;

pub mod get;
pub mod post;

use get::{get_answers, get_feedback_template, get_grades};
use post::import_feedback;

pub fn class_routes() -> Router<AppState> {
    Router::new()
        .route("/grades", get(get_grades))
        .route("/{class_id}/worksheets/{worksheet_id}/answers", get(get_answers))
        .route(
            "/{class_id}/worksheets/{worksheet_id}/feedback-template",
            get(get_feedback_template),
        )
        .route(
            "/{class_id}/worksheets/{worksheet_id}/feedback",
            post(import_feedback),
        )
}
