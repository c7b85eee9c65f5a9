//! StreamRegistry - authoritative in-memory stream state
//!
//! ## Responsibilities
//!
//! - Hold the map of relay-confirmed stream records
//! - Serialize add/remove/restart per stream ID
//! - Keep local state consistent with relay confirmations
//!
//! A record exists only after the relay accepted the registration. Removal
//! always deletes the local record, even when the relay teardown fails, so
//! the registry can diverge from the relay; local consistency wins because
//! the relay is the weaker-availability dependency.

mod locks;

use crate::error::{Error, Result};
use crate::relay_client::PathManager;
use chrono::{DateTime, Utc};
use locks::StreamLocks;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Delay between restart teardown and re-registration, giving the relay
/// time to tear down the old path before one with the same name is created.
const RESTART_DELAY_MS: u64 = 1000;

/// Stream status
///
/// A record either exists (the relay accepted it) or it does not; there are
/// no intermediate states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamStatus {
    Running,
}

/// A registered stream
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamRecord {
    pub id: String,
    #[serde(rename = "rtspUrl")]
    pub source_url: String,
    pub status: StreamStatus,
    #[serde(rename = "startTime")]
    pub start_time: DateTime<Utc>,
}

/// Outcome of an add request
#[derive(Debug, Clone)]
pub enum AddOutcome {
    /// Relay accepted the registration and a new record was inserted
    Created(StreamRecord),
    /// The ID was already registered; the relay was not contacted
    AlreadyExists(StreamRecord),
}

/// StreamRegistry instance
pub struct StreamRegistry {
    relay: Arc<dyn PathManager>,
    streams: RwLock<HashMap<String, StreamRecord>>,
    locks: StreamLocks,
    restart_delay: Duration,
}

impl StreamRegistry {
    /// Create a new registry backed by the given relay
    pub fn new(relay: Arc<dyn PathManager>) -> Self {
        Self::with_restart_delay(relay, Duration::from_millis(RESTART_DELAY_MS))
    }

    /// Create a registry with a specific restart delay
    pub fn with_restart_delay(relay: Arc<dyn PathManager>, restart_delay: Duration) -> Self {
        Self {
            relay,
            streams: RwLock::new(HashMap::new()),
            locks: StreamLocks::new(),
            restart_delay,
        }
    }

    /// Snapshot of all records; never mutates
    pub async fn list(&self) -> Vec<StreamRecord> {
        self.streams.read().await.values().cloned().collect()
    }

    /// Number of registered streams
    pub async fn len(&self) -> usize {
        self.streams.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.streams.read().await.is_empty()
    }

    /// Register a stream with the relay and record it.
    ///
    /// An already-registered ID returns the existing record without
    /// contacting the relay. On relay failure nothing is inserted.
    pub async fn add(&self, id: &str, source_url: &str) -> Result<AddOutcome> {
        let _guard = self.locks.acquire(id).await;
        self.add_locked(id, source_url).await
    }

    /// Remove a stream.
    ///
    /// Returns false if the ID is unknown. Relay teardown is best-effort;
    /// the local record is deleted regardless.
    pub async fn remove(&self, id: &str) -> bool {
        let _guard = self.locks.acquire(id).await;
        self.remove_locked(id).await
    }

    /// Tear a stream down and re-register it with the same source.
    ///
    /// The old record is deleted immediately; after the restart delay the
    /// same ID and source are registered again. The per-ID lock is held
    /// across both phases, so a concurrent add/remove for the same ID waits
    /// until the restart completes.
    pub async fn restart(&self, id: &str) -> Result<StreamRecord> {
        let _guard = self.locks.acquire(id).await;

        let source_url = {
            let streams = self.streams.read().await;
            match streams.get(id) {
                Some(record) => record.source_url.clone(),
                None => return Err(Error::NotFound("Stream not found".to_string())),
            }
        };

        self.remove_locked(id).await;

        // Give the relay time to tear the old path down
        tokio::time::sleep(self.restart_delay).await;

        match self.add_locked(id, &source_url).await? {
            AddOutcome::Created(record) | AddOutcome::AlreadyExists(record) => {
                tracing::info!(id = id, "stream restarted");
                Ok(record)
            }
        }
    }

    async fn add_locked(&self, id: &str, source_url: &str) -> Result<AddOutcome> {
        {
            let streams = self.streams.read().await;
            if let Some(existing) = streams.get(id) {
                tracing::debug!(id = id, "add ignored, stream already registered");
                return Ok(AddOutcome::AlreadyExists(existing.clone()));
            }
        }

        self.relay.register(id, source_url).await?;

        let record = StreamRecord {
            id: id.to_string(),
            source_url: source_url.to_string(),
            status: StreamStatus::Running,
            start_time: Utc::now(),
        };

        self.streams
            .write()
            .await
            .insert(id.to_string(), record.clone());

        tracing::info!(id = id, source_url = source_url, "stream registered");
        Ok(AddOutcome::Created(record))
    }

    async fn remove_locked(&self, id: &str) -> bool {
        if !self.streams.read().await.contains_key(id) {
            return false;
        }

        // Best-effort: the relay may already have dropped the path, or be
        // unreachable; the local record goes away either way
        if let Err(e) = self.relay.unregister(id).await {
            tracing::warn!(id = id, error = %e, "relay teardown failed, removing local record anyway");
        }

        self.streams.write().await.remove(id);
        tracing::info!(id = id, "stream removed");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay_client::fake::FakeRelay;
    use std::sync::atomic::Ordering;

    fn registry_with_fake() -> (Arc<FakeRelay>, StreamRegistry) {
        let relay = Arc::new(FakeRelay::new());
        let registry = StreamRegistry::with_restart_delay(
            relay.clone(),
            Duration::from_millis(50),
        );
        (relay, registry)
    }

    #[tokio::test]
    async fn test_add_then_list() {
        let (_relay, registry) = registry_with_fake();

        let outcome = registry.add("cam1", "rtsp://10.0.0.5/live").await.unwrap();
        let record = match outcome {
            AddOutcome::Created(r) => r,
            AddOutcome::AlreadyExists(_) => panic!("expected Created"),
        };
        assert_eq!(record.id, "cam1");
        assert_eq!(record.source_url, "rtsp://10.0.0.5/live");
        assert_eq!(record.status, StreamStatus::Running);

        let listed = registry.list().await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, "cam1");
    }

    #[tokio::test]
    async fn test_duplicate_add_registers_once() {
        let (relay, registry) = registry_with_fake();

        let first = registry.add("cam1", "rtsp://10.0.0.5/live").await.unwrap();
        let second = registry.add("cam1", "rtsp://10.0.0.5/live").await.unwrap();

        let original = match first {
            AddOutcome::Created(r) => r,
            _ => panic!("expected Created"),
        };
        match second {
            AddOutcome::AlreadyExists(r) => {
                assert_eq!(r.id, original.id);
                assert_eq!(r.source_url, original.source_url);
                assert_eq!(r.start_time, original.start_time);
            }
            _ => panic!("expected AlreadyExists"),
        }

        assert_eq!(relay.register_calls.load(Ordering::SeqCst), 1);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_failed_add_inserts_nothing() {
        let (relay, registry) = registry_with_fake();
        relay.set_fail_register(true);

        let result = registry.add("cam1", "rtsp://10.0.0.5/live").await;
        assert!(matches!(result, Err(Error::RelayRejected { status: 400, .. })));
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_remove_unknown_returns_false() {
        let (relay, registry) = registry_with_fake();

        assert!(!registry.remove("ghost").await);
        assert_eq!(relay.unregister_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_remove_proceeds_when_relay_fails() {
        let (relay, registry) = registry_with_fake();

        registry.add("cam1", "rtsp://10.0.0.5/live").await.unwrap();
        relay.set_fail_unregister(true);

        assert!(registry.remove("cam1").await);
        assert!(registry.is_empty().await);

        // Second remove reports unknown
        assert!(!registry.remove("cam1").await);
    }

    #[tokio::test]
    async fn test_restart_reuses_source_and_waits() {
        let (relay, registry) = registry_with_fake();

        registry.add("cam1", "rtsp://10.0.0.5/live").await.unwrap();

        let started = std::time::Instant::now();
        let record = registry.restart("cam1").await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(50));
        assert_eq!(record.source_url, "rtsp://10.0.0.5/live");
        assert_eq!(relay.register_calls.load(Ordering::SeqCst), 2);
        assert_eq!(relay.unregister_calls.load(Ordering::SeqCst), 1);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_restart_unknown_is_not_found() {
        let (_relay, registry) = registry_with_fake();

        let result = registry.restart("ghost").await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_restart_failure_leaves_id_absent() {
        let (relay, registry) = registry_with_fake();

        registry.add("cam1", "rtsp://10.0.0.5/live").await.unwrap();
        relay.set_fail_register(true);

        let result = registry.restart("cam1").await;
        assert!(result.is_err());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_concurrent_add_waits_for_restart() {
        let relay = Arc::new(FakeRelay::new());
        let registry = Arc::new(StreamRegistry::with_restart_delay(
            relay.clone(),
            Duration::from_millis(100),
        ));

        registry.add("cam1", "rtsp://10.0.0.5/live").await.unwrap();

        let restarter = {
            let registry = registry.clone();
            tokio::spawn(async move { registry.restart("cam1").await })
        };

        // Let the restart enter its delay window, then race an add
        tokio::time::sleep(Duration::from_millis(30)).await;
        let outcome = registry.add("cam1", "rtsp://other/source").await.unwrap();

        // The add waited for the restart, so it observes the re-added
        // record with the original source
        match outcome {
            AddOutcome::AlreadyExists(r) => {
                assert_eq!(r.source_url, "rtsp://10.0.0.5/live")
            }
            AddOutcome::Created(_) => panic!("add should have waited for restart"),
        }

        restarter.await.unwrap().unwrap();
        assert_eq!(registry.len().await, 1);
    }
}
