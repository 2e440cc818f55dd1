//! Persisted key-value store with change notifications.
//!
//! [`StorageBackend`] is the platform store (browser `localStorage`, a JSON
//! file, an in-memory map). [`StorageNotifier`] wraps one backend and turns
//! every mutation into a [`StorageChange`], whether it was made locally
//! through the notifier or by another execution context sharing the store.

pub mod memory;

pub use memory::MemoryStorage;

use crate::stream::{EventStream, Subscription};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Identifies one storage area. Native events name the area they came from
/// so listeners can ignore areas they do not own.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AreaId(String);

impl AreaId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AreaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A change notification as the platform reports it.
///
/// A `key` of `None` means the other context cleared the whole area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub area: AreaId,
    pub key: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

/// One persisted-value mutation, as seen by notifier subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageChange {
    pub key: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

impl StorageChange {
    pub fn is_for(&self, key: &str) -> bool {
        self.key.as_deref() == Some(key)
    }
}

impl From<StorageEvent> for StorageChange {
    fn from(event: StorageEvent) -> Self {
        Self {
            key: event.key,
            old_value: event.old_value,
            new_value: event.new_value,
        }
    }
}

/// Platform key-value store.
///
/// `watch` delivers events caused by *other* contexts only; local writes are
/// reported by [`StorageNotifier`] itself.
pub trait StorageBackend {
    fn area(&self) -> AreaId;
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str);
    fn remove_item(&self, key: &str);
    fn keys(&self) -> Vec<String>;
    fn watch(&self, listener: Rc<dyn Fn(&StorageEvent)>) -> Subscription;
}

/// Wraps a [`StorageBackend`] and publishes every mutation.
pub struct StorageNotifier {
    backend: Rc<dyn StorageBackend>,
    changes: EventStream<StorageChange>,
    native: RefCell<Option<Subscription>>,
}

impl StorageNotifier {
    /// Attaches to the backend's native change events straight away.
    pub fn new(backend: Rc<dyn StorageBackend>) -> Self {
        let changes = EventStream::new();
        let area = backend.area();

        let sink = changes.clone();
        let native = backend.watch(Rc::new(move |event: &StorageEvent| {
            if event.area != area {
                log::debug!(
                    "Ignoring storage event from area '{}' (own area '{area}')",
                    event.area
                );
                return;
            }
            sink.emit(&StorageChange::from(event.clone()));
        }));

        Self {
            backend,
            changes,
            native: RefCell::new(Some(native)),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.backend.get_item(key)
    }

    pub fn set(&self, key: &str, value: &str) {
        let old_value = self.backend.get_item(key);
        self.backend.set_item(key, value);
        self.changes.emit(&StorageChange {
            key: Some(key.to_string()),
            old_value,
            new_value: Some(value.to_string()),
        });
    }

    pub fn remove(&self, key: &str) {
        let old_value = self.backend.get_item(key);
        self.backend.remove_item(key);
        self.changes.emit(&StorageChange {
            key: Some(key.to_string()),
            old_value,
            new_value: None,
        });
    }

    /// Removes every key, publishing one change per key in ascending key order.
    pub fn clear(&self) {
        let mut keys = self.backend.keys();
        keys.sort();
        for key in keys {
            self.remove(&key);
        }
    }

    pub fn changes(&self) -> EventStream<StorageChange> {
        self.changes.clone()
    }

    pub fn area(&self) -> AreaId {
        self.backend.area()
    }

    /// Detaches from native events and completes the change stream.
    pub fn dispose(&self) {
        if let Some(native) = self.native.borrow_mut().take() {
            native.unsubscribe();
        }
        self.changes.complete();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims::*;
    use std::cell::Cell;

    fn change(key: &str, old: Option<&str>, new: Option<&str>) -> StorageChange {
        StorageChange {
            key: Some(key.to_string()),
            old_value: old.map(str::to_string),
            new_value: new.map(str::to_string),
        }
    }

    fn recorded(notifier: &StorageNotifier) -> (Rc<RefCell<Vec<StorageChange>>>, Subscription) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let sub = notifier
            .changes()
            .subscribe(move |c| sink.borrow_mut().push(c.clone()));
        (seen, sub)
    }

    #[test]
    fn test_set_and_remove_publish_old_and_new_values() {
        let notifier = StorageNotifier::new(Rc::new(MemoryStorage::new("local")));
        let (seen, _sub) = recorded(&notifier);

        notifier.set("theme", "dark");
        notifier.set("theme", "light");
        notifier.remove("theme");

        assert_none!(notifier.get("theme"));
        assert_eq!(
            *seen.borrow(),
            vec![
                change("theme", None, Some("dark")),
                change("theme", Some("dark"), Some("light")),
                change("theme", Some("light"), None),
            ]
        );
    }

    #[test]
    fn test_clear_publishes_one_change_per_key() {
        let storage = Rc::new(MemoryStorage::new("local"));
        storage.set_item("b", "2");
        storage.set_item("a", "1");
        let notifier = StorageNotifier::new(storage.clone());
        let (seen, _sub) = recorded(&notifier);

        notifier.clear();

        assert_eq!(
            *seen.borrow(),
            vec![
                change("a", Some("1"), None),
                change("b", Some("2"), None),
            ]
        );
        assert!(storage.keys().is_empty());
    }

    #[test]
    fn test_other_context_writes_surface_as_changes() {
        let here = Rc::new(MemoryStorage::new("local"));
        let there = here.open_context();
        let notifier = StorageNotifier::new(here);
        let (seen, _sub) = recorded(&notifier);

        there.set_item("theme", "dark");
        there.remove_item("theme");

        assert_eq!(
            *seen.borrow(),
            vec![
                change("theme", None, Some("dark")),
                change("theme", Some("dark"), None),
            ]
        );
    }

    #[test]
    fn test_events_from_another_area_are_filtered() {
        let storage = Rc::new(MemoryStorage::new("local"));
        let notifier = StorageNotifier::new(storage.clone());
        let (seen, _sub) = recorded(&notifier);

        storage.dispatch(StorageEvent {
            area: AreaId::new("session"),
            key: Some("theme".to_string()),
            old_value: None,
            new_value: Some("dark".to_string()),
        });

        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_native_values_pass_through_verbatim() {
        let storage = Rc::new(MemoryStorage::new("local"));
        let notifier = StorageNotifier::new(storage.clone());
        let (seen, _sub) = recorded(&notifier);

        storage.dispatch(StorageEvent {
            area: AreaId::new("local"),
            key: None,
            old_value: None,
            new_value: None,
        });

        assert_eq!(
            *seen.borrow(),
            vec![StorageChange {
                key: None,
                old_value: None,
                new_value: None,
            }]
        );
    }

    #[test]
    fn test_dispose_completes_and_detaches() {
        let here = Rc::new(MemoryStorage::new("local"));
        let there = here.open_context();
        let notifier = StorageNotifier::new(here.clone());

        let completed = Rc::new(Cell::new(false));
        let flag = Rc::clone(&completed);
        let _sub = notifier.changes().subscribe_with(|_| {}, move || flag.set(true));

        notifier.dispose();
        there.set_item("theme", "dark");

        assert!(completed.get());
        assert_eq!(here.watcher_count(), 0);
    }
}
