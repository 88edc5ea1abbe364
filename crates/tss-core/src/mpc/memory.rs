//! In-memory relay implementation for testing

use super::{async_trait, Relay};
use crate::{Error, ParticipantId, Result, SessionId};
use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::trace;

/// In-memory message relay shared by participants running in one process
pub struct MemoryRelay {
    /// Broadcast messages: (session_id, round) -> Vec<message_bytes>
    broadcasts: Arc<DashMap<(SessionId, u32), Vec<Vec<u8>>>>,
    /// Direct messages: (session_id, round, to) -> Vec<message_bytes>
    directs: Arc<DashMap<(SessionId, u32, ParticipantId), Vec<Vec<u8>>>>,
    /// Notification channel
    notify: broadcast::Sender<()>,
    /// Give up collecting after this long
    timeout: Option<Duration>,
}

impl MemoryRelay {
    /// Create a new in-memory relay that waits indefinitely
    pub fn new() -> Self {
        let (notify, _) = broadcast::channel(100);
        Self {
            broadcasts: Arc::new(DashMap::new()),
            directs: Arc::new(DashMap::new()),
            notify,
            timeout: None,
        }
    }

    /// Fail collection with [`Error::Timeout`] once `timeout` has elapsed
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    async fn wait_for<K, T>(
        &self,
        store: &DashMap<K, Vec<Vec<u8>>>,
        key: K,
        count: usize,
        what: &str,
    ) -> Result<Vec<T>>
    where
        K: Eq + Hash,
        T: DeserializeOwned,
    {
        let mut rx = self.notify.subscribe();
        let deadline = self.timeout.map(|timeout| Instant::now() + timeout);

        loop {
            if let Some(messages) = store.get(&key) {
                if messages.len() >= count {
                    return messages
                        .iter()
                        .take(count)
                        .map(|bytes| deserialize(bytes))
                        .collect();
                }
                trace!(have = messages.len(), want = count, what, "Waiting for messages");
            }

            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    return Err(Error::Timeout(format!("{} ({} expected)", what, count)));
                }
            }

            tokio::select! {
                _ = rx.recv() => continue,
                _ = tokio::time::sleep(Duration::from_millis(100)) => continue,
            }
        }
    }
}

impl Default for MemoryRelay {
    fn default() -> Self {
        Self::new()
    }
}

fn serialize<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| Error::Serialization(e.to_string()))
}

fn deserialize<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| Error::Deserialization(e.to_string()))
}

#[async_trait]
impl Relay for MemoryRelay {
    async fn broadcast<T: Serialize + Send + Sync>(
        &self,
        session_id: &SessionId,
        round: u32,
        message: &T,
    ) -> Result<()> {
        let bytes = serialize(message)?;

        self.broadcasts
            .entry((*session_id, round))
            .or_default()
            .push(bytes);

        let _ = self.notify.send(());
        Ok(())
    }

    async fn send_direct<T: Serialize + Send + Sync>(
        &self,
        session_id: &SessionId,
        round: u32,
        to: ParticipantId,
        message: &T,
    ) -> Result<()> {
        let bytes = serialize(message)?;

        self.directs
            .entry((*session_id, round, to))
            .or_default()
            .push(bytes);

        let _ = self.notify.send(());
        Ok(())
    }

    async fn collect_broadcasts<T: DeserializeOwned + Send>(
        &self,
        session_id: &SessionId,
        round: u32,
        count: usize,
    ) -> Result<Vec<T>> {
        let what = format!("round {} broadcasts", round);
        self.wait_for(&*self.broadcasts, (*session_id, round), count, &what)
            .await
    }

    async fn collect_direct<T: DeserializeOwned + Send>(
        &self,
        session_id: &SessionId,
        round: u32,
        my_id: ParticipantId,
        count: usize,
    ) -> Result<Vec<T>> {
        let what = format!("round {} messages for party {}", round, my_id);
        self.wait_for(&*self.directs, (*session_id, round, my_id), count, &what)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct TestMessage {
        value: u32,
    }

    #[tokio::test]
    async fn test_broadcast() {
        let relay = MemoryRelay::new();
        let session_id = [0u8; 32];

        relay.broadcast(&session_id, 1, &TestMessage { value: 42 }).await.unwrap();
        relay.broadcast(&session_id, 1, &TestMessage { value: 43 }).await.unwrap();

        let messages: Vec<TestMessage> = relay.collect_broadcasts(&session_id, 1, 2).await.unwrap();

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].value, 42);
        assert_eq!(messages[1].value, 43);
    }

    #[tokio::test]
    async fn test_direct() {
        let relay = MemoryRelay::new();
        let session_id = [0u8; 32];

        relay.send_direct(&session_id, 1, 2, &TestMessage { value: 100 }).await.unwrap();

        let messages: Vec<TestMessage> = relay.collect_direct(&session_id, 1, 2, 1).await.unwrap();

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].value, 100);
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let relay = MemoryRelay::new().with_timeout(Duration::from_millis(50));

        relay.broadcast(&[1u8; 32], 1, &TestMessage { value: 1 }).await.unwrap();

        let result: Result<Vec<TestMessage>> = relay.collect_broadcasts(&[2u8; 32], 1, 1).await;
        assert!(matches!(result, Err(Error::Timeout(_))));
    }

    #[tokio::test]
    async fn test_timeout_when_messages_missing() {
        let relay = MemoryRelay::new().with_timeout(Duration::from_millis(50));
        let session_id = [0u8; 32];

        relay.send_direct(&session_id, 2, 1, &TestMessage { value: 7 }).await.unwrap();

        let result: Result<Vec<TestMessage>> = relay.collect_direct(&session_id, 2, 1, 2).await;
        assert!(matches!(result, Err(Error::Timeout(_))));
    }

    #[tokio::test]
    async fn test_waits_for_late_messages() {
        let relay = Arc::new(MemoryRelay::new().with_timeout(Duration::from_secs(5)));
        let session_id = [3u8; 32];

        let sender = {
            let relay = Arc::clone(&relay);
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                relay.broadcast(&session_id, 1, &TestMessage { value: 9 }).await
            })
        };

        let messages: Vec<TestMessage> = relay.collect_broadcasts(&session_id, 1, 1).await.unwrap();
        assert_eq!(messages, vec![TestMessage { value: 9 }]);
        sender.await.unwrap().unwrap();
    }
}
