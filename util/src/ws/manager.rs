//! Topic-based broadcast hub for live assignment events, with per-user presence.
//!
//! Each topic owns a Tokio broadcast channel created on first subscription and
//! dropped once a send finds no receivers left. Presence is a refcount per
//! `(topic, user)` so a student with several tabs on the same worksheet is
//! visible as such; the second tab is logged because autosave across tabs is
//! last-write-wins.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};

type Topic = String;
type Sender = broadcast::Sender<String>;
type Receiver = broadcast::Receiver<String>;

const TOPIC_CAPACITY: usize = 100;

#[derive(Clone, Default)]
pub struct WebSocketManager {
    inner: Arc<RwLock<HashMap<Topic, Sender>>>,
    /// topic -> (user_id -> open sockets)
    presence: Arc<RwLock<HashMap<Topic, HashMap<i64, usize>>>>,
}

impl WebSocketManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to the given topic, creating it if necessary.
    pub async fn subscribe(&self, topic: &str) -> Receiver {
        let mut map = self.inner.write().await;
        map.entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(TOPIC_CAPACITY).0)
            .subscribe()
    }

    /// Broadcasts a message to all subscribers of `topic`.
    ///
    /// No-op for unknown topics. A topic left without receivers is removed.
    pub async fn broadcast<T: Into<String>>(&self, topic: &str, msg: T) {
        let mut map = self.inner.write().await;
        if let Some(sender) = map.get(topic) {
            let _ = sender.send(msg.into());
            if sender.receiver_count() == 0 {
                tracing::debug!(topic, "removing topic without subscribers");
                map.remove(topic);
            }
        }
    }

    pub async fn has_topic(&self, topic: &str) -> bool {
        self.inner.read().await.contains_key(topic)
    }

    /// Records one more open socket for `user_id` on `topic` and returns the new count.
    pub async fn register(&self, topic: &str, user_id: i64) -> usize {
        let mut p = self.presence.write().await;
        let entry = p.entry(topic.to_string()).or_default();
        let count = entry.entry(user_id).or_insert(0);
        *count += 1;
        if *count > 1 {
            tracing::warn!(
                topic,
                user_id,
                sockets = *count,
                "user has several sessions open; autosave is last-write-wins"
            );
        }
        *count
    }

    pub async fn unregister(&self, topic: &str, user_id: i64) {
        let mut p = self.presence.write().await;
        if let Some(users) = p.get_mut(topic) {
            if let Some(cnt) = users.get_mut(&user_id) {
                if *cnt > 1 {
                    *cnt -= 1;
                } else {
                    users.remove(&user_id);
                }
            }
            if users.is_empty() {
                p.remove(topic);
            }
        }
    }

    /// Number of sockets `user_id` currently has open on `topic`.
    pub async fn sessions_for(&self, topic: &str, user_id: i64) -> usize {
        let p = self.presence.read().await;
        p.get(topic)
            .and_then(|m| m.get(&user_id))
            .copied()
            .unwrap_or(0)
    }
}
