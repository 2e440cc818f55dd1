use super::{StyleBlock, StyleHost};
use crate::stream::{EventStream, Subscription};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// An in-memory `<style>` element.
pub struct MemoryStyle {
    text: String,
    attributes: RefCell<BTreeMap<String, String>>,
}

impl MemoryStyle {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attributes: RefCell::new(BTreeMap::new()),
        }
    }

    pub fn attributes(&self) -> BTreeMap<String, String> {
        self.attributes.borrow().clone()
    }
}

impl StyleBlock for MemoryStyle {
    fn text_content(&self) -> String {
        self.text.clone()
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.borrow().get(name).cloned()
    }

    fn set_attribute(&self, name: &str, value: &str) {
        self.attributes
            .borrow_mut()
            .insert(name.to_string(), value.to_string());
    }

    fn remove_attribute(&self, name: &str) {
        self.attributes.borrow_mut().remove(name);
    }
}

/// An in-memory document head.
///
/// Insertion observers run synchronously from [`MemoryDocument::append_style`].
#[derive(Default)]
pub struct MemoryDocument {
    styles: RefCell<Vec<Rc<MemoryStyle>>>,
    insertions: EventStream<()>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_style(&self, text: impl Into<String>) -> Rc<MemoryStyle> {
        self.append(MemoryStyle::new(text))
    }

    /// Appends a block that already carries attributes.
    pub fn append(&self, style: MemoryStyle) -> Rc<MemoryStyle> {
        let style = Rc::new(style);
        self.styles.borrow_mut().push(Rc::clone(&style));
        self.insertions.emit(&());
        style
    }

    pub fn styles(&self) -> Vec<Rc<MemoryStyle>> {
        self.styles.borrow().clone()
    }

    pub fn observer_count(&self) -> usize {
        self.insertions.listener_count()
    }
}

impl StyleHost for MemoryDocument {
    fn style_blocks(&self) -> Vec<Rc<dyn StyleBlock>> {
        self.styles
            .borrow()
            .iter()
            .map(|style| Rc::clone(style) as Rc<dyn StyleBlock>)
            .collect()
    }

    fn observe_insertions(&self, listener: Rc<dyn Fn()>) -> Subscription {
        self.insertions.subscribe(move |_| listener())
    }
}
