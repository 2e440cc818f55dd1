use crate::annotation::parse_theme;
use crate::dom::{NO_THEME_ATTR, StyleBlock, StyleHost, THEME_ATTR};
use crate::registry::ThemeRegistry;
use crate::scheduler::Scheduler;
use crate::stream::Subscription;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

struct DiscoveryState {
    host: Rc<dyn StyleHost>,
    registry: Rc<ThemeRegistry>,
    scheduler: Rc<dyn Scheduler>,
    observer: RefCell<Option<Subscription>>,
    disposed: Cell<bool>,
}

impl DiscoveryState {
    fn scan(&self) -> usize {
        let mut discovered = Vec::new();

        for block in self.host.style_blocks() {
            if !block.is_untagged() {
                continue;
            }

            match parse_theme(&block.text_content()) {
                Some(theme) => {
                    block.set_attribute(THEME_ATTR, &theme.id);
                    block.disable();
                    discovered.push(theme);
                }
                None => block.set_attribute(NO_THEME_ATTR, ""),
            }
        }

        if discovered.is_empty() {
            return 0;
        }

        log::debug!(
            "Discovered {} theme block(s): {:?}",
            discovered.len(),
            discovered.iter().map(|t| t.id.as_str()).collect::<Vec<_>>()
        );
        self.registry.register_all(discovered)
    }

    fn activate(&self, theme_id: &str) -> usize {
        let mut enabled = 0;
        for block in self.host.style_blocks() {
            let Some(tag) = block.theme_id() else {
                continue;
            };
            if tag == theme_id {
                block.enable();
                enabled += 1;
            } else {
                block.disable();
            }
        }

        if enabled == 0 {
            log::warn!("No style block carries theme '{theme_id}'");
        } else {
            log::trace!("Enabled {enabled} style block(s) for theme '{theme_id}'");
        }
        enabled
    }
}

/// Finds theme blocks in a [`StyleHost`] and switches between them.
///
/// Scanning tags every block it inspects (`data-theme="<id>"` or
/// `data-no-theme`) so later scans only look at new blocks. Switching themes
/// toggles a disabling media directive instead of removing content, which
/// keeps it reversible and invisible to the insertion observer.
pub struct StyleDiscovery {
    state: Rc<DiscoveryState>,
}

impl StyleDiscovery {
    pub fn new(
        host: Rc<dyn StyleHost>,
        registry: Rc<ThemeRegistry>,
        scheduler: Rc<dyn Scheduler>,
    ) -> Self {
        Self {
            state: Rc::new(DiscoveryState {
                host,
                registry,
                scheduler,
                observer: RefCell::new(None),
                disposed: Cell::new(false),
            }),
        }
    }

    /// Scans the blocks already present and starts observing insertions.
    pub fn init(&self) {
        self.state.scan();

        let weak: Weak<DiscoveryState> = Rc::downgrade(&self.state);
        let observer = self.state.host.observe_insertions(Rc::new(move || {
            if let Some(state) = weak.upgrade() {
                if !state.disposed.get() {
                    state.scan();
                }
            }
        }));
        *self.state.observer.borrow_mut() = Some(observer);
    }

    /// Scans untagged blocks now. Returns how many themes were registered.
    pub fn scan(&self) -> usize {
        self.state.scan()
    }

    /// Activates `theme_id` on the next scheduler turn: its blocks are
    /// enabled, every other theme block is disabled.
    pub fn use_theme(&self, theme_id: &str) {
        let weak: Weak<DiscoveryState> = Rc::downgrade(&self.state);
        let theme_id = theme_id.to_string();
        self.state.scheduler.defer(Box::new(move || {
            let Some(state) = weak.upgrade() else {
                return;
            };
            if state.disposed.get() {
                return;
            }
            state.activate(&theme_id);
        }));
    }

    /// Stops observing. Activations still queued become no-ops.
    pub fn dispose(&self) {
        self.state.disposed.set(true);
        if let Some(observer) = self.state.observer.borrow_mut().take() {
            observer.unsubscribe();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{MemoryDocument, MemoryStyle};
    use crate::scheduler::TaskQueue;
    use crate::theme::Theme;

    struct Fixture {
        doc: Rc<MemoryDocument>,
        registry: Rc<ThemeRegistry>,
        queue: Rc<TaskQueue>,
        discovery: StyleDiscovery,
    }

    fn fixture() -> Fixture {
        let doc = Rc::new(MemoryDocument::new());
        let registry = Rc::new(ThemeRegistry::new());
        let queue = Rc::new(TaskQueue::new());
        let discovery = StyleDiscovery::new(doc.clone(), registry.clone(), queue.clone());
        Fixture {
            doc,
            registry,
            queue,
            discovery,
        }
    }

    fn enabled(style: &MemoryStyle) -> bool {
        !style.is_disabled()
    }

    #[test]
    fn test_init_tags_existing_blocks() {
        let f = fixture();
        let dark = f.doc.append_style("/* @@id dark */ body { background: #000; }");
        let plain = f.doc.append_style("body { margin: 0; }");

        f.discovery.init();

        assert_eq!(dark.theme_id().as_deref(), Some("dark"));
        assert!(dark.is_disabled());
        assert!(plain.has_attribute(NO_THEME_ATTR));
        assert!(enabled(&plain));
        assert_eq!(f.registry.snapshot(), vec![Theme::new("dark")]);
    }

    #[test]
    fn test_inserted_blocks_are_discovered() {
        let f = fixture();
        f.discovery.init();

        f.doc.append_style("/* @@id light */");

        assert!(f.registry.has("light"));
    }

    #[test]
    fn test_tagged_blocks_are_not_rescanned() {
        let f = fixture();
        f.doc.append_style("/* @@id dark */");
        f.discovery.init();
        f.registry.unregister("dark");

        // A fresh insertion triggers a scan, but the old block is already tagged.
        f.doc.append_style("p {}");

        assert!(!f.registry.has("dark"));
        assert_eq!(f.discovery.scan(), 0);
    }

    #[test]
    fn test_pre_tagged_blocks_are_skipped() {
        let f = fixture();
        let style = MemoryStyle::new("/* @@id dark */");
        style.set_attribute(NO_THEME_ATTR, "");
        f.doc.append(style);

        f.discovery.init();

        assert!(f.registry.is_empty());
    }

    #[test]
    fn test_use_theme_is_deferred() {
        let f = fixture();
        let dark = f.doc.append_style("/* @@id dark */");
        f.discovery.init();

        f.discovery.use_theme("dark");
        assert!(dark.is_disabled());

        f.queue.run_until_idle();
        assert!(enabled(&dark));
    }

    #[test]
    fn test_activation_enables_all_blocks_of_a_theme() {
        let f = fixture();
        let dark_a = f.doc.append_style("/* @@id dark */ body {}");
        let dark_b = f.doc.append_style("/* @@id dark */ p {}");
        let light = f.doc.append_style("/* @@id light */ body {}");
        let plain = f.doc.append_style("a {}");
        f.discovery.init();

        f.discovery.use_theme("light");
        f.queue.run_until_idle();
        f.discovery.use_theme("dark");
        f.queue.run_until_idle();

        assert!(enabled(&dark_a));
        assert!(enabled(&dark_b));
        assert!(light.is_disabled());
        assert!(enabled(&plain));
        assert_eq!(f.registry.len(), 2);
    }

    #[test]
    fn test_activation_sees_blocks_inserted_before_it_runs() {
        let f = fixture();
        f.discovery.init();

        f.discovery.use_theme("late");
        let late = f.doc.append_style("/* @@id late */");
        f.queue.run_until_idle();

        assert!(enabled(&late));
    }

    #[test]
    fn test_dispose_stops_observing_and_cancels_activation() {
        let f = fixture();
        let dark = f.doc.append_style("/* @@id dark */");
        f.discovery.init();
        f.discovery.use_theme("dark");

        f.discovery.dispose();
        f.queue.run_until_idle();
        f.doc.append_style("/* @@id light */");

        assert!(dark.is_disabled());
        assert!(!f.registry.has("light"));
        assert_eq!(f.doc.observer_count(), 0);
    }
}
