//! Navigation state and query-parameter helpers.

pub mod memory;

pub use memory::MemoryNavigator;

use crate::stream::Subscription;
use std::rc::Rc;
use url::Url;

/// The host's current location.
///
/// `replace_url` updates the location without adding a history entry;
/// `watch` reports every location change, whoever caused it.
pub trait Navigator {
    fn current_url(&self) -> Url;
    fn replace_url(&self, url: Url);
    fn watch(&self, listener: Rc<dyn Fn(&Url)>) -> Subscription;
}

/// First value of the query parameter `name`, if present.
pub fn query_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// `url` with the parameter `name` set to `value`.
///
/// The parameter keeps its position when it already exists (later duplicates
/// are dropped) and is appended otherwise. Other parameters and the fragment
/// are preserved.
pub fn with_query_param(url: &Url, name: &str, value: &str) -> Url {
    let mut pairs: Vec<(String, String)> = Vec::new();
    let mut replaced = false;

    for (key, existing) in url.query_pairs() {
        if key == name {
            if !replaced {
                pairs.push((key.into_owned(), value.to_string()));
                replaced = true;
            }
            continue;
        }
        pairs.push((key.into_owned(), existing.into_owned()));
    }
    if !replaced {
        pairs.push((name.to_string(), value.to_string()));
    }

    let mut updated = url.clone();
    updated.query_pairs_mut().clear().extend_pairs(pairs);
    updated
}
