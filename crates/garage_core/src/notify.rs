//! Change notification registry for garage resources.
//!
//! # Responsibility
//! - Track observers of the cars collection and of individual cars.
//! - Fan out a change signal after effective store mutations.
//!
//! # Invariants
//! - Collection observers see every change; item observers see only
//!   changes to their own id.
//! - Dropping a `ChangeSubscription` unregisters its observer.
//! - Notification is publish-style: only observers registered at the
//!   moment of the change are told, with no delivery guarantee beyond
//!   the synchronous callback.

use crate::store::Resource;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

type ChangeCallback = Arc<dyn Fn(&Resource) + Send + Sync>;

struct Watcher {
    resource: Resource,
    callback: ChangeCallback,
}

/// In-process observer registry keyed by resource.
///
/// Replaces an ambient broadcast channel: every store owns one notifier
/// instance, and callers subscribe through it explicitly.
#[derive(Default)]
pub struct ChangeNotifier {
    watchers: Mutex<BTreeMap<u64, Watcher>>,
    next_id: AtomicU64,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one observer of `resource`.
    ///
    /// The returned subscription unregisters the observer when dropped,
    /// so holding it scopes the observation.
    pub fn watch(
        self: &Arc<Self>,
        resource: Resource,
        callback: impl Fn(&Resource) + Send + Sync + 'static,
    ) -> ChangeSubscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let watcher = Watcher {
            resource,
            callback: Arc::new(callback),
        };
        self.lock_watchers().insert(id, watcher);
        ChangeSubscription {
            notifier: Arc::clone(self),
            id,
        }
    }

    /// Announces that `changed` may hold different data.
    ///
    /// Item changes also reach collection observers; collection changes do
    /// not reach item observers, since a bulk mutation does not know which
    /// ids it touched.
    pub fn notify(&self, changed: &Resource) {
        let callbacks: Vec<ChangeCallback> = {
            self.lock_watchers()
                .values()
                .filter(|watcher| observes(&watcher.resource, changed))
                .map(|watcher| Arc::clone(&watcher.callback))
                .collect()
        };
        // Callbacks run outside the lock so an observer may re-subscribe.
        for callback in callbacks {
            callback(changed);
        }
    }

    /// Number of currently registered observers.
    pub fn watcher_count(&self) -> usize {
        self.lock_watchers().len()
    }

    fn unwatch(&self, id: u64) {
        self.lock_watchers().remove(&id);
    }

    fn lock_watchers(&self) -> std::sync::MutexGuard<'_, BTreeMap<u64, Watcher>> {
        // A poisoned lock only means another observer callback panicked;
        // the registry itself stays consistent, so keep serving it.
        self.watchers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn observes(watched: &Resource, changed: &Resource) -> bool {
    match (watched, changed) {
        (Resource::Collection, _) => true,
        (Resource::Item(watched_id), Resource::Item(changed_id)) => watched_id == changed_id,
        (Resource::Item(_), Resource::Collection) => false,
    }
}

/// Guard for one registered observer.
pub struct ChangeSubscription {
    notifier: Arc<ChangeNotifier>,
    id: u64,
}

impl Drop for ChangeSubscription {
    fn drop(&mut self) {
        self.notifier.unwatch(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::ChangeNotifier;
    use crate::store::Resource;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn item_change_reaches_item_and_collection_observers() {
        let notifier = Arc::new(ChangeNotifier::new());
        let item_hits = Arc::new(AtomicUsize::new(0));
        let collection_hits = Arc::new(AtomicUsize::new(0));

        let item_counter = Arc::clone(&item_hits);
        let _item_sub = notifier.watch(Resource::Item(3), move |_| {
            item_counter.fetch_add(1, Ordering::SeqCst);
        });
        let collection_counter = Arc::clone(&collection_hits);
        let _collection_sub = notifier.watch(Resource::Collection, move |_| {
            collection_counter.fetch_add(1, Ordering::SeqCst);
        });

        notifier.notify(&Resource::Item(3));
        assert_eq!(item_hits.load(Ordering::SeqCst), 1);
        assert_eq!(collection_hits.load(Ordering::SeqCst), 1);

        notifier.notify(&Resource::Item(4));
        assert_eq!(item_hits.load(Ordering::SeqCst), 1);
        assert_eq!(collection_hits.load(Ordering::SeqCst), 2);

        notifier.notify(&Resource::Collection);
        assert_eq!(item_hits.load(Ordering::SeqCst), 1);
        assert_eq!(collection_hits.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn dropping_subscription_unregisters_observer() {
        let notifier = Arc::new(ChangeNotifier::new());
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&hits);
        let subscription = notifier.watch(Resource::Collection, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(notifier.watcher_count(), 1);

        notifier.notify(&Resource::Collection);
        drop(subscription);
        assert_eq!(notifier.watcher_count(), 0);

        notifier.notify(&Resource::Collection);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
