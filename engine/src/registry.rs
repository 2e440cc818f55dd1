use crate::stream::{EventStream, Subscription};
use crate::theme::Theme;
use std::cell::RefCell;

/// The set of known themes, keyed by identifier.
///
/// Registration merges into any existing entry with the same id. Every
/// effective change publishes a freshly built snapshot of the whole set, in
/// the order the identifiers were first admitted.
pub struct ThemeRegistry {
    themes: RefCell<Vec<Theme>>,
    changes: EventStream<Vec<Theme>>,
}

impl ThemeRegistry {
    pub fn new() -> Self {
        Self {
            themes: RefCell::new(Vec::new()),
            changes: EventStream::new(),
        }
    }

    /// Merges `theme` into the registry. Returns `false`, without
    /// publishing, when the theme has no identifier.
    pub fn register(&self, theme: Theme) -> bool {
        if !self.merge(theme) {
            return false;
        }
        self.publish();
        true
    }

    /// Merges a batch and publishes a single snapshot if anything was
    /// admitted. Returns the number of admitted themes.
    pub fn register_all(&self, themes: impl IntoIterator<Item = Theme>) -> usize {
        let admitted = themes
            .into_iter()
            .map(|theme| self.merge(theme))
            .filter(|admitted| *admitted)
            .count();
        if admitted > 0 {
            self.publish();
        }
        admitted
    }

    /// Removes the entry with `id`. Publishes only if something was removed.
    pub fn unregister(&self, id: &str) -> bool {
        let removed = {
            let mut themes = self.themes.borrow_mut();
            let before = themes.len();
            themes.retain(|theme| theme.id != id);
            themes.len() != before
        };

        if removed {
            log::debug!("Unregistered theme '{id}'");
            self.publish();
        }
        removed
    }

    pub fn get(&self, id: &str) -> Option<Theme> {
        self.themes
            .borrow()
            .iter()
            .find(|theme| theme.id == id)
            .cloned()
    }

    pub fn has(&self, id: &str) -> bool {
        self.themes.borrow().iter().any(|theme| theme.id == id)
    }

    pub fn snapshot(&self) -> Vec<Theme> {
        self.themes.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.themes.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.themes.borrow().is_empty()
    }

    /// Future snapshots only.
    pub fn changes(&self) -> EventStream<Vec<Theme>> {
        self.changes.clone()
    }

    /// Calls `listener` with the current snapshot, then with every change.
    pub fn watch(&self, listener: impl Fn(&Vec<Theme>) + 'static) -> Subscription {
        listener(&self.snapshot());
        self.changes.subscribe(listener)
    }

    /// Like [`ThemeRegistry::watch`], plus `complete` once the registry is disposed.
    pub fn watch_with(
        &self,
        listener: impl Fn(&Vec<Theme>) + 'static,
        complete: impl Fn() + 'static,
    ) -> Subscription {
        listener(&self.snapshot());
        self.changes.subscribe_with(listener, complete)
    }

    pub fn dispose(&self) {
        self.changes.complete();
    }

    fn merge(&self, theme: Theme) -> bool {
        if !theme.has_id() {
            log::debug!("Ignoring theme registration without an id");
            return false;
        }

        let mut themes = self.themes.borrow_mut();
        match themes.iter_mut().find(|existing| existing.id == theme.id) {
            Some(existing) => existing.merge(&theme),
            None => {
                log::debug!("Registered theme '{}'", theme.id);
                themes.push(theme);
            }
        }
        true
    }

    fn publish(&self) {
        let snapshot = self.snapshot();
        self.changes.emit(&snapshot);
    }
}

impl Default for ThemeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
