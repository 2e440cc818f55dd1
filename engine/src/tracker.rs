use crate::stream::{EventStream, Subscription};
use std::cell::RefCell;

/// Holds the currently selected theme identifier.
///
/// Assigning the value it already holds is a no-op, so listeners observe
/// one notification per distinct transition. The value is stored before
/// listeners run: reading [`ActiveTheme::get`] from inside a notification
/// yields the new value.
pub struct ActiveTheme {
    current: RefCell<Option<String>>,
    changes: EventStream<Option<String>>,
}

impl ActiveTheme {
    pub fn new() -> Self {
        Self {
            current: RefCell::new(None),
            changes: EventStream::new(),
        }
    }

    pub fn get(&self) -> Option<String> {
        self.current.borrow().clone()
    }

    /// Returns `true` when the value changed and listeners were notified.
    pub fn set(&self, value: Option<String>) -> bool {
        {
            let mut current = self.current.borrow_mut();
            if *current == value {
                return false;
            }
            *current = value.clone();
        }

        log::debug!("Active theme is now {value:?}");
        self.changes.emit(&value);
        true
    }

    /// Distinct future values only.
    pub fn changes(&self) -> EventStream<Option<String>> {
        self.changes.clone()
    }

    /// Calls `listener` with the current value, then with every distinct change.
    pub fn watch(&self, listener: impl Fn(&Option<String>) + 'static) -> Subscription {
        listener(&self.get());
        self.changes.subscribe(listener)
    }

    /// Like [`ActiveTheme::watch`], plus `complete` once the tracker is disposed.
    pub fn watch_with(
        &self,
        listener: impl Fn(&Option<String>) + 'static,
        complete: impl Fn() + 'static,
    ) -> Subscription {
        listener(&self.get());
        self.changes.subscribe_with(listener, complete)
    }

    pub fn dispose(&self) {
        self.changes.complete();
    }
}

impl Default for ActiveTheme {
    fn default() -> Self {
        Self::new()
    }
}
