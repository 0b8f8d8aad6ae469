use axum::{
    Extension,
    extract::{Path, State, WebSocketUpgrade},
    response::{IntoResponse, Response},
};
use services::AssignmentHost;
use util::state::AppState;
use util::ws::assignment_topic;

use super::serve::{WsServerOptions, serve_topic};
use crate::{auth::AuthUser, routes::common::service_error};

/// GET /ws/assignments/{assignment_id}
///
/// Authorized before the upgrade: the owning student or the class teacher.
pub async fn assignment_events_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<AppState>,
    Path(assignment_id): Path<i64>,
    Extension(user): Extension<AuthUser>,
) -> Response {
    let host = AssignmentHost::from_state(&app_state);
    if let Err(e) = host.get_assignment(&user.caller(), assignment_id).await {
        return service_error(e).into_response();
    }

    let manager = app_state.ws_clone();
    let topic = assignment_topic(assignment_id);
    let user_id = user.0.sub;
    ws.on_upgrade(move |socket| {
        serve_topic(socket, manager, topic, Some(user_id), WsServerOptions::default())
    })
}
