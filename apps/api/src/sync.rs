//! Real-time sync hub.
//!
//! One broadcast channel per collection. Every mutation republishes the
//! *entire* materialized result set (newest first) — consumers never see
//! incremental diffs. Subscriptions are tracked in a registry map; dropping
//! a `Subscription` unsubscribes it, and `unsubscribe_all` sweeps every
//! live channel. Publish failures and lagged receivers are logged, never
//! surfaced.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::debug;

/// Buffered snapshots per channel before slow receivers start lagging.
const CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Users,
    Clients,
    Jobs,
    Candidates,
    CandidateApplications,
    Applications,
    Interviews,
    Emails,
    EmailTemplates,
}

impl Collection {
    pub const ALL: &'static [Collection] = &[
        Collection::Users,
        Collection::Clients,
        Collection::Jobs,
        Collection::Candidates,
        Collection::CandidateApplications,
        Collection::Applications,
        Collection::Interviews,
        Collection::Emails,
        Collection::EmailTemplates,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Clients => "clients",
            Collection::Jobs => "jobs",
            Collection::Candidates => "candidates",
            Collection::CandidateApplications => "candidate_applications",
            Collection::Applications => "applications",
            Collection::Interviews => "interviews",
            Collection::Emails => "emails",
            Collection::EmailTemplates => "email_templates",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Collection::ALL
            .iter()
            .find(|c| c.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unknown collection '{s}'"))
    }
}

/// A full collection snapshot pushed to subscribers.
#[derive(Debug, Clone)]
pub struct CollectionUpdate {
    pub collection: Collection,
    pub documents: Arc<Vec<Value>>,
}

/// Removes its subscription from the registry when dropped, so teardown is
/// tied to the consumer's lifetime rather than a manual call.
pub struct SubscriptionGuard {
    id: u64,
    hub: Arc<SyncHub>,
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.hub.forget(self.id);
    }
}

pub struct Subscription {
    pub receiver: broadcast::Receiver<CollectionUpdate>,
    guard: SubscriptionGuard,
}

impl Subscription {
    /// Splits into the receiver and its guard so the receiver can be wrapped
    /// in a stream while the guard rides along.
    pub fn into_parts(self) -> (SubscriptionGuard, broadcast::Receiver<CollectionUpdate>) {
        (self.guard, self.receiver)
    }
}

#[derive(Default)]
pub struct SyncHub {
    senders: RwLock<HashMap<Collection, broadcast::Sender<CollectionUpdate>>>,
    registry: Mutex<HashMap<u64, Collection>>,
    next_id: AtomicU64,
}

impl SyncHub {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Opens a tracked subscription to one collection.
    pub fn subscribe(self: &Arc<Self>, collection: Collection) -> Subscription {
        let receiver = self.sender(collection).subscribe();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.registry
            .lock()
            .expect("sync registry poisoned")
            .insert(id, collection);

        Subscription {
            receiver,
            guard: SubscriptionGuard {
                id,
                hub: Arc::clone(self),
            },
        }
    }

    /// Pushes a fresh snapshot to every subscriber of `collection`.
    pub fn publish(&self, collection: Collection, documents: Vec<Value>) {
        let update = CollectionUpdate {
            collection,
            documents: Arc::new(documents),
        };
        if self.sender(collection).send(update).is_err() {
            // No live subscribers; nothing to deliver.
            debug!("no subscribers for {collection}, snapshot dropped");
        }
    }

    /// Sweeps every subscription: clears the registry and closes all
    /// channels, ending any live streams.
    pub fn unsubscribe_all(&self) {
        self.registry
            .lock()
            .expect("sync registry poisoned")
            .clear();
        self.senders
            .write()
            .expect("sync senders poisoned")
            .clear();
    }

    pub fn active_subscriptions(&self) -> usize {
        self.registry.lock().expect("sync registry poisoned").len()
    }

    fn forget(&self, id: u64) {
        self.registry
            .lock()
            .expect("sync registry poisoned")
            .remove(&id);
    }

    fn sender(&self, collection: Collection) -> broadcast::Sender<CollectionUpdate> {
        if let Some(sender) = self
            .senders
            .read()
            .expect("sync senders poisoned")
            .get(&collection)
        {
            return sender.clone();
        }

        let mut senders = self.senders.write().expect("sync senders poisoned");
        senders
            .entry(collection)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_subscriber_receives_full_snapshot() {
        let hub = SyncHub::new();
        let mut sub = hub.subscribe(Collection::Jobs);

        hub.publish(Collection::Jobs, vec![json!({"id": 1}), json!({"id": 2})]);

        let update = sub.receiver.recv().await.unwrap();
        assert_eq!(update.collection, Collection::Jobs);
        assert_eq!(update.documents.len(), 2);
    }

    #[tokio::test]
    async fn test_collections_are_isolated() {
        let hub = SyncHub::new();
        let mut jobs = hub.subscribe(Collection::Jobs);
        let mut clients = hub.subscribe(Collection::Clients);

        hub.publish(Collection::Clients, vec![json!({"id": "c1"})]);

        let update = clients.receiver.recv().await.unwrap();
        assert_eq!(update.collection, Collection::Clients);
        assert!(jobs.receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_drop_unsubscribes() {
        let hub = SyncHub::new();
        let sub = hub.subscribe(Collection::Candidates);
        assert_eq!(hub.active_subscriptions(), 1);

        drop(sub);
        assert_eq!(hub.active_subscriptions(), 0);
    }

    #[tokio::test]
    async fn test_unsubscribe_all_closes_channels() {
        let hub = SyncHub::new();
        let mut a = hub.subscribe(Collection::Jobs);
        let _b = hub.subscribe(Collection::Clients);
        assert_eq!(hub.active_subscriptions(), 2);

        hub.unsubscribe_all();
        assert_eq!(hub.active_subscriptions(), 0);
        assert!(matches!(
            a.receiver.recv().await,
            Err(broadcast::error::RecvError::Closed)
        ));
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_silent() {
        let hub = SyncHub::new();
        // Must not panic or error.
        hub.publish(Collection::Emails, vec![json!({"id": "e1"})]);
    }

    #[test]
    fn test_collection_parses_from_path_segment() {
        assert_eq!(Collection::from_str("jobs"), Ok(Collection::Jobs));
        assert_eq!(
            Collection::from_str("email_templates"),
            Ok(Collection::EmailTemplates)
        );
        assert!(Collection::from_str("invoices").is_err());
    }
}
