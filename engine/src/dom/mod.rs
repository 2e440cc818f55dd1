//! Style-block container abstraction.
//!
//! Discovery only needs a handful of DOM operations: enumerate style blocks,
//! read their text, read and write attributes, and hear about insertions.
//! Browser bindings implement these over `document.head`; the in-memory
//! [`MemoryDocument`] backs tests and headless hosts.

pub mod memory;

pub use memory::{MemoryDocument, MemoryStyle};

use crate::stream::Subscription;
use std::rc::Rc;

/// Marks a block as belonging to the theme named by the attribute value.
pub const THEME_ATTR: &str = "data-theme";
/// Presence-only marker for blocks that were scanned and carry no theme.
pub const NO_THEME_ATTR: &str = "data-no-theme";
/// Attribute holding the disabling media directive.
pub const MEDIA_ATTR: &str = "media";
/// A media query that never matches; the block stays in the document but
/// has no effect.
pub const DISABLED_MEDIA: &str = "not all";

/// One stylesheet-bearing node.
pub trait StyleBlock {
    fn text_content(&self) -> String;
    fn attribute(&self, name: &str) -> Option<String>;
    fn set_attribute(&self, name: &str, value: &str);
    fn remove_attribute(&self, name: &str);

    fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Theme this block was tagged with during discovery.
    fn theme_id(&self) -> Option<String> {
        self.attribute(THEME_ATTR)
    }

    /// Neither tagged as a theme nor as a non-theme.
    fn is_untagged(&self) -> bool {
        !self.has_attribute(THEME_ATTR) && !self.has_attribute(NO_THEME_ATTR)
    }

    fn is_disabled(&self) -> bool {
        self.attribute(MEDIA_ATTR).as_deref() == Some(DISABLED_MEDIA)
    }

    fn disable(&self) {
        self.set_attribute(MEDIA_ATTR, DISABLED_MEDIA);
    }

    fn enable(&self) {
        if self.is_disabled() {
            self.remove_attribute(MEDIA_ATTR);
        }
    }
}

/// The container style blocks live in (a document head).
pub trait StyleHost {
    /// Every style block currently in the container, in document order.
    fn style_blocks(&self) -> Vec<Rc<dyn StyleBlock>>;

    /// Calls `listener` whenever style-carrying nodes are inserted.
    fn observe_insertions(&self, listener: Rc<dyn Fn()>) -> Subscription;
}
