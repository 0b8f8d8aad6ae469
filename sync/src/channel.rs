//! Channels a controller posts boundary messages over.

use crate::error::SyncError;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;

/// How the host answered a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveAck {
    Saved,
    /// The assignment was handed in; the host will never accept another save.
    Frozen,
}

#[async_trait]
pub trait SnapshotChannel: Send + Sync {
    /// Posts one encoded boundary message.
    async fn post(&self, message: &Value) -> Result<SaveAck, SyncError>;
}

/// Posts to the host API: `POST {base}/api/assignments/{id}/messages`.
#[derive(Debug, Clone)]
pub struct HttpChannel {
    client: reqwest::Client,
    url: String,
    token: String,
}

impl HttpChannel {
    pub fn new(
        base_url: &str,
        assignment_id: i64,
        token: impl Into<String>,
    ) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(20))
            .build()?;
        Ok(Self {
            client,
            url: format!(
                "{}/api/assignments/{assignment_id}/messages",
                base_url.trim_end_matches('/')
            ),
            token: token.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SnapshotChannel for HttpChannel {
    async fn post(&self, message: &Value) -> Result<SaveAck, SyncError> {
        let resp = self
            .client
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(message)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(SaveAck::Saved);
        }
        if status == StatusCode::CONFLICT {
            return Ok(SaveAck::Frozen);
        }
        let message = resp.text().await.unwrap_or_default();
        Err(SyncError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

/// Receives raw boundary messages on the host side, in-process.
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn receive(&self, raw: Vec<u8>) -> Result<SaveAck, SyncError>;
}

/// Channel that hands the serialized message straight to a [`MessageSink`],
/// so in-process hosts validate exactly the bytes an HTTP host would.
pub struct HostChannel<S> {
    sink: S,
}

impl<S: MessageSink> HostChannel<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

#[async_trait]
impl<S: MessageSink> SnapshotChannel for HostChannel<S> {
    async fn post(&self, message: &Value) -> Result<SaveAck, SyncError> {
        self.sink.receive(message.to_string().into_bytes()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use worksheet::boundary::{BoundaryMessage, encode_save, parse_message};
    use worksheet::Snapshot;

    #[test]
    fn http_channel_targets_the_assignment_messages_route() {
        let ch = HttpChannel::new("http://localhost:3000/", 42, "tok").unwrap();
        assert_eq!(ch.url(), "http://localhost:3000/api/assignments/42/messages");
    }

    struct Recorder(Mutex<Vec<Vec<u8>>>);

    #[async_trait]
    impl MessageSink for Recorder {
        async fn receive(&self, raw: Vec<u8>) -> Result<SaveAck, SyncError> {
            self.0.lock().unwrap().push(raw);
            Ok(SaveAck::Saved)
        }
    }

    #[tokio::test]
    async fn host_channel_delivers_bytes_the_boundary_accepts() {
        let channel = HostChannel::new(Recorder(Mutex::new(Vec::new())));
        let mut s = Snapshot::default();
        s.inputs.insert("q1".into(), "RAM".into());

        assert_eq!(channel.post(&encode_save(&s)).await.unwrap(), SaveAck::Saved);

        let raw = channel.sink().0.lock().unwrap().pop().unwrap();
        match parse_message(&raw, 1024).unwrap() {
            BoundaryMessage::SaveWorksheetData { snapshot, .. } => assert_eq!(snapshot, s),
            other => panic!("unexpected {other:?}"),
        }
    }
}
