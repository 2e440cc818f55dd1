use super::{AreaId, StorageBackend, StorageEvent};
use crate::stream::Subscription;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

type ContextId = u64;

struct Watcher {
    id: u64,
    context: ContextId,
    listener: Rc<dyn Fn(&StorageEvent)>,
}

struct SharedArea {
    id: AreaId,
    entries: RefCell<BTreeMap<String, String>>,
    watchers: RefCell<Vec<Watcher>>,
    next_context: Cell<ContextId>,
    next_watcher: Cell<u64>,
}

impl SharedArea {
    fn deliver(&self, event: &StorageEvent, matches: impl Fn(ContextId) -> bool) {
        let targets: Vec<Rc<dyn Fn(&StorageEvent)>> = self
            .watchers
            .borrow()
            .iter()
            .filter(|w| matches(w.context))
            .map(|w| Rc::clone(&w.listener))
            .collect();

        for listener in targets {
            listener(event);
        }
    }
}

/// In-memory storage area shared between execution contexts.
///
/// Each `MemoryStorage` handle is one context (a tab, a window). Writes made
/// through one handle are reported to the watchers of every *other* handle
/// on the same area, and only when the stored value actually changed, the
/// way browsers fire `storage` events.
///
/// ```no_run
/// use engine::storage::{MemoryStorage, StorageBackend};
///
/// let tab_a = MemoryStorage::new("local");
/// let tab_b = tab_a.open_context();
/// tab_a.set_item("theme", "dark");
/// assert_eq!(tab_b.get_item("theme").as_deref(), Some("dark"));
/// ```
pub struct MemoryStorage {
    area: Rc<SharedArea>,
    context: ContextId,
}

impl MemoryStorage {
    pub fn new(area: impl Into<String>) -> Self {
        let area = Rc::new(SharedArea {
            id: AreaId::new(area),
            entries: RefCell::new(BTreeMap::new()),
            watchers: RefCell::new(Vec::new()),
            next_context: Cell::new(1),
            next_watcher: Cell::new(0),
        });
        Self { area, context: 0 }
    }

    /// Another context attached to the same area.
    pub fn open_context(&self) -> Self {
        let context = self.area.next_context.get();
        self.area.next_context.set(context + 1);
        Self {
            area: Rc::clone(&self.area),
            context,
        }
    }

    /// Hands a raw platform event to this context's watchers, exactly as
    /// given. Useful for events the area itself would never produce, such as
    /// those of a different storage area.
    pub fn dispatch(&self, event: StorageEvent) {
        let context = self.context;
        self.area.deliver(&event, |target| target == context);
    }

    pub fn watcher_count(&self) -> usize {
        let context = self.context;
        self.area
            .watchers
            .borrow()
            .iter()
            .filter(|w| w.context == context)
            .count()
    }

    fn broadcast(&self, key: Option<&str>, old_value: Option<String>, new_value: Option<String>) {
        if old_value == new_value {
            return;
        }
        let event = StorageEvent {
            area: self.area.id.clone(),
            key: key.map(str::to_string),
            old_value,
            new_value,
        };
        let source = self.context;
        self.area.deliver(&event, |target| target != source);
    }
}

impl StorageBackend for MemoryStorage {
    fn area(&self) -> AreaId {
        self.area.id.clone()
    }

    fn get_item(&self, key: &str) -> Option<String> {
        self.area.entries.borrow().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) {
        let old_value = self
            .area
            .entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.broadcast(Some(key), old_value, Some(value.to_string()));
    }

    fn remove_item(&self, key: &str) {
        let old_value = self.area.entries.borrow_mut().remove(key);
        self.broadcast(Some(key), old_value, None);
    }

    fn keys(&self) -> Vec<String> {
        self.area.entries.borrow().keys().cloned().collect()
    }

    fn watch(&self, listener: Rc<dyn Fn(&StorageEvent)>) -> Subscription {
        let id = self.area.next_watcher.get();
        self.area.next_watcher.set(id + 1);
        self.area.watchers.borrow_mut().push(Watcher {
            id,
            context: self.context,
            listener,
        });

        let area: Weak<SharedArea> = Rc::downgrade(&self.area);
        Subscription::new(move || {
            if let Some(area) = area.upgrade() {
                area.watchers.borrow_mut().retain(|w| w.id != id);
            }
        })
    }
}
