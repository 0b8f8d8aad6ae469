use crate::helpers::{make_test_app, spawn_server};
use db::models::assignment::{self, AssignmentStatus};
use sea_orm::EntityTrait;
use serial_test::serial;
use services::{AssignmentHost, Caller};
use std::time::Duration;
use sync::{HttpChannel, SaveIndicator, SavePhase, SyncController, TickOutcome};
use worksheet::{Snapshot, TaskState};

fn answered(text: &str) -> Snapshot {
    let mut s = Snapshot::default();
    s.inputs.insert("q1".into(), text.into());
    s.interactive_states.insert(
        "match-parts".into(),
        TaskState::MatchPairs {
            matched: ["cpu".to_string()].into_iter().collect(),
        },
    );
    s
}

#[tokio::test]
#[serial]
async fn controller_autosaves_over_http_until_handed_in() {
    let app = make_test_app().await;
    let id = app.seed.assignment.id;
    let addr = spawn_server(app.app.clone()).await;

    let channel = HttpChannel::new(&format!("http://{addr}"), id, app.student_token()).unwrap();
    let indicator = SaveIndicator::new(Duration::from_secs(60));
    let mut controller = SyncController::new(channel, Snapshot::default(), indicator);

    assert_eq!(controller.tick(Snapshot::default()).await, TickOutcome::Unchanged);
    assert_eq!(controller.tick(answered("RAM")).await, TickOutcome::Saved);
    assert_eq!(controller.indicator().phase(), SavePhase::Saved);
    assert_eq!(controller.tick(answered("RAM")).await, TickOutcome::Unchanged);

    let stored = assignment::Entity::find_by_id(id)
        .one(app.db())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, AssignmentStatus::InProgress);
    let work: Snapshot = serde_json::from_value(stored.student_work.unwrap()).unwrap();
    assert_eq!(work, answered("RAM"));

    AssignmentHost::from_state(&app.state)
        .hand_in(&Caller::student(app.seed.student.id), id)
        .await
        .unwrap();

    assert_eq!(controller.tick(answered("ROM")).await, TickOutcome::Frozen);
    assert!(controller.is_frozen());
    assert_eq!(controller.indicator().phase(), SavePhase::Idle);

    let stored = assignment::Entity::find_by_id(id)
        .one(app.db())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.student_work.unwrap()["inputs"]["q1"], "RAM");
}

#[tokio::test]
#[serial]
async fn a_rejected_post_keeps_the_baseline() {
    let app = make_test_app().await;
    let id = app.seed.assignment.id;
    let addr = spawn_server(app.app.clone()).await;

    let channel =
        HttpChannel::new(&format!("http://{addr}"), id, app.other_student_token()).unwrap();
    let mut controller = SyncController::new(
        channel,
        Snapshot::default(),
        SaveIndicator::new(Duration::from_secs(60)),
    );

    assert_eq!(controller.tick(answered("RAM")).await, TickOutcome::Failed);
    assert_eq!(controller.baseline(), &Snapshot::default());
    assert_eq!(controller.indicator().phase(), SavePhase::Error);
}
