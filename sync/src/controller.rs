use crate::channel::{SaveAck, SnapshotChannel};
use crate::indicator::{SaveIndicator, SavePhase};
use worksheet::Snapshot;
use worksheet::boundary::encode_save;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Same as the baseline; nothing was sent.
    Unchanged,
    Saved,
    /// The post failed; the baseline was kept so the next tick retries.
    Failed,
    /// The host refused because the work was handed in. No further posts.
    Frozen,
}

/// Change detection and save status for one worksheet instance.
///
/// The baseline is owned by the controller, so two open copies of the same
/// worksheet never share it.
pub struct SyncController<C> {
    channel: C,
    baseline: Snapshot,
    indicator: SaveIndicator,
    frozen: bool,
}

impl<C: SnapshotChannel> SyncController<C> {
    /// `baseline` is the snapshot extracted right after the saved state was loaded.
    pub fn new(channel: C, baseline: Snapshot, indicator: SaveIndicator) -> Self {
        Self {
            channel,
            baseline,
            indicator,
            frozen: false,
        }
    }

    pub fn baseline(&self) -> &Snapshot {
        &self.baseline
    }

    pub fn indicator(&self) -> &SaveIndicator {
        &self.indicator
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub async fn tick(&mut self, current: Snapshot) -> TickOutcome {
        if self.frozen {
            return TickOutcome::Frozen;
        }
        if current == self.baseline {
            return TickOutcome::Unchanged;
        }

        self.indicator.set(SavePhase::Saving);
        match self.channel.post(&encode_save(&current)).await {
            Ok(SaveAck::Saved) => {
                self.baseline = current;
                self.indicator.set(SavePhase::Saved);
                TickOutcome::Saved
            }
            Ok(SaveAck::Frozen) => {
                tracing::info!("host reports worksheet handed in; autosave stopped");
                self.frozen = true;
                self.indicator.set(SavePhase::Idle);
                TickOutcome::Frozen
            }
            Err(e) => {
                tracing::warn!(error = %e, "autosave failed; will retry on next tick");
                self.indicator.set(SavePhase::Error);
                TickOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::SyncError;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Records every post and answers from a script (default: `Saved`).
    #[derive(Clone, Default)]
    pub(crate) struct ScriptedChannel {
        pub posts: Arc<Mutex<Vec<Value>>>,
        pub script: Arc<Mutex<VecDeque<Result<SaveAck, String>>>>,
        pub delay: Option<Duration>,
    }

    impl ScriptedChannel {
        pub fn then(self, answer: Result<SaveAck, &str>) -> Self {
            self.script
                .lock()
                .unwrap()
                .push_back(answer.map_err(str::to_string));
            self
        }

        pub fn post_count(&self) -> usize {
            self.posts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl SnapshotChannel for ScriptedChannel {
        async fn post(&self, message: &Value) -> Result<SaveAck, SyncError> {
            if let Some(d) = self.delay {
                tokio::time::sleep(d).await;
            }
            self.posts.lock().unwrap().push(message.clone());
            match self.script.lock().unwrap().pop_front() {
                None | Some(Ok(SaveAck::Saved)) => Ok(SaveAck::Saved),
                Some(Ok(SaveAck::Frozen)) => Ok(SaveAck::Frozen),
                Some(Err(e)) => Err(SyncError::Persistence(e)),
            }
        }
    }

    fn answered(q1: &str) -> Snapshot {
        let mut s = Snapshot::default();
        s.inputs.insert("q1".into(), q1.into());
        s
    }

    fn controller(ch: ScriptedChannel) -> SyncController<ScriptedChannel> {
        SyncController::new(ch, Snapshot::default(), SaveIndicator::new(Duration::from_secs(2)))
    }

    #[tokio::test]
    async fn unchanged_snapshot_is_never_posted() {
        let ch = ScriptedChannel::default();
        let mut c = controller(ch.clone());

        assert_eq!(c.tick(Snapshot::default()).await, TickOutcome::Unchanged);
        assert_eq!(c.tick(answered("RAM")).await, TickOutcome::Saved);
        assert_eq!(c.tick(answered("RAM")).await, TickOutcome::Unchanged);
        assert_eq!(ch.post_count(), 1);
        assert_eq!(c.indicator().phase(), SavePhase::Saved);
    }

    #[tokio::test]
    async fn failure_keeps_baseline_and_next_tick_retries_same_snapshot() {
        let ch = ScriptedChannel::default().then(Err("db down")).then(Ok(SaveAck::Saved));
        let mut c = controller(ch.clone());

        assert_eq!(c.tick(answered("RAM")).await, TickOutcome::Failed);
        assert_eq!(c.baseline(), &Snapshot::default());
        assert_eq!(c.indicator().phase(), SavePhase::Error);

        assert_eq!(c.tick(answered("RAM")).await, TickOutcome::Saved);
        assert_eq!(c.baseline(), &answered("RAM"));

        let posts = ch.posts.lock().unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0], posts[1]);
        assert_eq!(posts[1]["type"], "SAVE_WORKSHEET_DATA");
        assert_eq!(posts[1]["payload"]["inputs"]["q1"], "RAM");
    }

    #[tokio::test]
    async fn frozen_host_stops_all_further_posts() {
        let ch = ScriptedChannel::default().then(Ok(SaveAck::Frozen));
        let mut c = controller(ch.clone());

        assert_eq!(c.tick(answered("late edit")).await, TickOutcome::Frozen);
        assert!(c.is_frozen());
        assert_eq!(c.tick(answered("another")).await, TickOutcome::Frozen);
        assert_eq!(ch.post_count(), 1);
    }

    #[tokio::test]
    async fn controllers_do_not_share_baselines() {
        let ch = ScriptedChannel::default();
        let mut tab_a = controller(ch.clone());
        let mut tab_b = controller(ch.clone());

        tab_a.tick(answered("from A")).await;
        assert_eq!(tab_b.baseline(), &Snapshot::default());
        assert_eq!(tab_b.tick(answered("from A")).await, TickOutcome::Saved);
        assert_eq!(ch.post_count(), 2);
    }
}
