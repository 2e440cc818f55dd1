use super::Navigator;
use crate::stream::{EventStream, Subscription};
use std::cell::RefCell;
use std::rc::Rc;
use url::Url;

/// Location state for hosts without a real browser history.
pub struct MemoryNavigator {
    current: RefCell<Url>,
    history: RefCell<Vec<Url>>,
    changes: EventStream<Url>,
}

impl MemoryNavigator {
    pub fn new(url: Url) -> Self {
        Self {
            current: RefCell::new(url.clone()),
            history: RefCell::new(vec![url]),
            changes: EventStream::new(),
        }
    }

    /// Simulates the user navigating to `url` (a new history entry).
    pub fn navigate(&self, url: Url) {
        if *self.current.borrow() == url {
            return;
        }
        self.history.borrow_mut().push(url.clone());
        self.update(url);
    }

    /// Every location visited, oldest first. Replacements overwrite the
    /// latest entry.
    pub fn history(&self) -> Vec<Url> {
        self.history.borrow().clone()
    }

    fn update(&self, url: Url) {
        *self.current.borrow_mut() = url.clone();
        self.changes.emit(&url);
    }
}

impl Navigator for MemoryNavigator {
    fn current_url(&self) -> Url {
        self.current.borrow().clone()
    }

    fn replace_url(&self, url: Url) {
        if *self.current.borrow() == url {
            return;
        }
        if let Some(last) = self.history.borrow_mut().last_mut() {
            *last = url.clone();
        }
        self.update(url);
    }

    fn watch(&self, listener: Rc<dyn Fn(&Url)>) -> Subscription {
        self.changes.subscribe(move |url| listener(url))
    }
}
