//! Short-lived record of provider messages that were already processed.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use talenthub_config::DispatchConfig;
use tokio::sync::RwLock;
use tokio::time::Instant;

/// Internal storage optimized for both expiry in arrival order and lookup by ID.
#[derive(Debug, Default)]
struct DeliveryState {
    /// Message IDs with their record time (oldest first). May hold stale
    /// entries for IDs that were recorded again later.
    order: VecDeque<(String, Instant)>,
    /// Latest record time per message ID.
    seen: HashMap<String, Instant>,
}

impl DeliveryState {
    fn insert(&mut self, id: String, now: Instant, ttl: Duration, capacity: usize) {
        self.seen.insert(id.clone(), now);
        self.order.push_back((id, now));
        self.prune(now, ttl, capacity);
    }

    fn prune(&mut self, now: Instant, ttl: Duration, capacity: usize) {
        while let Some((id, at)) = self.order.front() {
            let expired = now.duration_since(*at) >= ttl;
            let over =
                self.seen.len() > capacity || self.order.len() > capacity.saturating_mul(2);
            if !expired && !over {
                break;
            }
            if self.seen.get(id) == Some(at) {
                self.seen.remove(id);
            }
            self.order.pop_front();
        }
    }

    #[inline]
    fn contains(&self, id: &str, now: Instant, ttl: Duration) -> bool {
        self.seen
            .get(id)
            .is_some_and(|at| now.duration_since(*at) < ttl)
    }
}

/// Bounded, TTL-limited set of message IDs whose jobs completed successfully.
///
/// Lets the dispatch endpoint acknowledge a redelivered message without
/// running its job twice. Concurrent deliveries of the same message can
/// still both run; delivery stays at-least-once.
#[derive(Debug, Clone)]
pub struct DeliveryLog {
    state: Arc<RwLock<DeliveryState>>,
    ttl: Duration,
    capacity: usize,
}

impl DeliveryLog {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            state: Arc::new(RwLock::new(DeliveryState::default())),
            ttl,
            capacity: capacity.max(1),
        }
    }

    /// `None` when deduplication is disabled.
    pub fn from_config(cfg: &DispatchConfig) -> Option<Self> {
        cfg.dedup_enabled
            .then(|| Self::new(Duration::from_secs(cfg.dedup_ttl_secs), cfg.dedup_capacity))
    }

    pub async fn contains(&self, message_id: &str) -> bool {
        let state = self.state.read().await;
        state.contains(message_id, Instant::now(), self.ttl)
    }

    pub async fn record(&self, message_id: impl Into<String>) {
        let mut state = self.state.write().await;
        state.insert(message_id.into(), Instant::now(), self.ttl, self.capacity);
    }

    pub async fn len(&self) -> usize {
        let mut state = self.state.write().await;
        state.prune(Instant::now(), self.ttl, self.capacity);
        state.seen.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_record_and_contains() {
        let log = DeliveryLog::new(Duration::from_secs(60), 10);
        assert!(!log.contains("msg_1").await);
        log.record("msg_1").await;
        assert!(log.contains("msg_1").await);
        assert!(!log.contains("msg_2").await);
        assert_eq!(log.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire_after_ttl() {
        let log = DeliveryLog::new(Duration::from_secs(60), 10);
        log.record("msg_1").await;

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(log.contains("msg_1").await);

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(!log.contains("msg_1").await);
        assert!(log.is_empty().await);
    }

    #[tokio::test]
    async fn test_capacity_evicts_oldest() {
        let log = DeliveryLog::new(Duration::from_secs(60), 2);
        log.record("a").await;
        log.record("b").await;
        log.record("c").await;
        assert!(!log.contains("a").await);
        assert!(log.contains("b").await);
        assert!(log.contains("c").await);
        assert_eq!(log.len().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rerecord_refreshes_entry() {
        let log = DeliveryLog::new(Duration::from_secs(60), 10);
        log.record("a").await;
        tokio::time::advance(Duration::from_secs(40)).await;
        log.record("a").await;
        tokio::time::advance(Duration::from_secs(40)).await;
        assert!(log.contains("a").await);
        assert_eq!(log.len().await, 1);
    }

    #[tokio::test]
    async fn test_unbounded_capacity() {
        let log = DeliveryLog::new(Duration::from_secs(60), usize::MAX);
        log.record("msg_1").await;
        log.record("msg_2").await;
        assert!(log.contains("msg_1").await);
        assert_eq!(log.len().await, 2);
    }

    #[test]
    fn test_disabled_by_config() {
        let cfg = DispatchConfig {
            dedup_enabled: false,
            ..DispatchConfig::default()
        };
        assert!(DeliveryLog::from_config(&cfg).is_none());
        assert!(DeliveryLog::from_config(&DispatchConfig::default()).is_some());
    }
}
