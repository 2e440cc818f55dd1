//! Reconciles every source of "which theme is active" into one value.
//!
//! The coordinator owns the registry, the tracker, the storage notifier and
//! the discovery engine, and listens to navigation. Its rules:
//!
//! - **Initial theme**: evaluated once, on the first non-empty registry
//!   snapshot, unless a theme was already selected by then. Sources in
//!   priority order: the query parameter, the persisted value, the theme
//!   flagged as default, the first registered theme.
//! - **Propagation**: each change to a concrete theme rewrites the query
//!   parameter, persists the id, then asks discovery to activate it.
//! - **Inbound sync**: storage changes on the configured key and navigation
//!   carrying the configured parameter feed the tracker, once the initial
//!   evaluation has run or a theme has been selected. The gate never closes
//!   again.

use crate::discovery::StyleDiscovery;
use crate::dom::StyleHost;
use crate::navigation::{Navigator, query_param, with_query_param};
use crate::options::SyncOptions;
use crate::registry::ThemeRegistry;
use crate::scheduler::Scheduler;
use crate::storage::{StorageBackend, StorageChange, StorageNotifier};
use crate::stream::Subscription;
use crate::theme::{Theme, default_or_first};
use crate::tracker::ActiveTheme;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use url::Url;

/// The host services a coordinator runs on.
pub struct Platform {
    pub storage: Rc<dyn StorageBackend>,
    pub styles: Rc<dyn StyleHost>,
    /// Hosts without a location (e.g. a command-line tool) pass `None`,
    /// which disables URL sync regardless of the options.
    pub navigator: Option<Rc<dyn Navigator>>,
    pub scheduler: Rc<dyn Scheduler>,
}

struct CoordinatorState {
    options: SyncOptions,
    registry: Rc<ThemeRegistry>,
    tracker: Rc<ActiveTheme>,
    notifier: StorageNotifier,
    discovery: StyleDiscovery,
    navigator: Option<Rc<dyn Navigator>>,
    initialized: Cell<bool>,
    inbound_open: Cell<bool>,
    subscriptions: RefCell<Vec<Subscription>>,
}

impl CoordinatorState {
    fn url_sync(&self) -> Option<(&dyn Navigator, &str)> {
        let param = self.options.query_param()?;
        let navigator = self.navigator.as_deref()?;
        Some((navigator, param))
    }

    fn resolve_initial(&self, themes: &[Theme]) {
        if self.initialized.get() || themes.is_empty() {
            return;
        }
        // Set first: propagation below re-enters the inbound listeners.
        self.initialized.set(true);
        self.inbound_open.set(true);

        if let Some(selected) = self.tracker.get() {
            log::debug!("Theme '{selected}' already selected, skipping initial resolution");
            return;
        }

        let from_url = self
            .url_sync()
            .and_then(|(navigator, param)| query_param(&navigator.current_url(), param));
        let from_storage = || {
            self.options
                .storage_key()
                .and_then(|key| self.notifier.get(key))
        };
        let fallback = || default_or_first(themes).map(|theme| theme.id.clone());

        let initial = from_url.or_else(from_storage).or_else(fallback);
        if let Some(id) = &initial {
            log::info!("Initial theme resolved to '{id}'");
        }
        self.tracker.set(initial);
    }

    fn propagate(&self, theme: &Option<String>) {
        let Some(id) = theme else {
            log::debug!("Active theme cleared; nothing to propagate");
            return;
        };

        log::info!("Switching to theme '{id}'");
        self.inbound_open.set(true);

        if let Some((navigator, param)) = self.url_sync() {
            let current = navigator.current_url();
            if query_param(&current, param).as_deref() != Some(id.as_str()) {
                navigator.replace_url(with_query_param(&current, param, id));
            }
        }

        if let Some(key) = self.options.storage_key() {
            self.notifier.set(key, id);
        }

        self.discovery.use_theme(id);
    }

    fn on_storage_change(&self, change: &StorageChange) {
        let Some(key) = self.options.storage_key() else {
            return;
        };
        if !change.is_for(key) {
            return;
        }
        if !self.inbound_open.get() {
            log::debug!("Ignoring storage change before the initial theme is known");
            return;
        }
        self.tracker.set(change.new_value.clone());
    }

    fn on_navigation(&self, url: &Url) {
        let Some((_, param)) = self.url_sync() else {
            return;
        };
        if !self.inbound_open.get() {
            log::debug!("Ignoring navigation before the initial theme is known");
            return;
        }
        if let Some(id) = query_param(url, param) {
            self.tracker.set(Some(id));
        }
    }
}

/// The public face of the theme system.
///
/// # Examples
///
/// ```no_run
/// use engine::coordinator::{Platform, ThemeCoordinator};
/// use engine::dom::MemoryDocument;
/// use engine::options::SyncOptions;
/// use engine::scheduler::TaskQueue;
/// use engine::storage::MemoryStorage;
/// use std::rc::Rc;
///
/// let document = Rc::new(MemoryDocument::new());
/// document.append_style("/* @@id dark */ body { background: #111; }");
/// let queue = Rc::new(TaskQueue::new());
///
/// let themes = ThemeCoordinator::new(
///     SyncOptions::default(),
///     Platform {
///         storage: Rc::new(MemoryStorage::new("local")),
///         styles: document.clone(),
///         navigator: None,
///         scheduler: queue.clone(),
///     },
/// );
/// themes.init();
/// queue.run_until_idle();
/// assert_eq!(themes.current_theme().as_deref(), Some("dark"));
/// ```
pub struct ThemeCoordinator {
    state: Rc<CoordinatorState>,
}

impl ThemeCoordinator {
    pub fn new(options: SyncOptions, platform: Platform) -> Self {
        let registry = Rc::new(ThemeRegistry::new());
        let discovery =
            StyleDiscovery::new(platform.styles, registry.clone(), platform.scheduler);
        let navigator = if options.query_param().is_some() {
            platform.navigator
        } else {
            None
        };

        Self {
            state: Rc::new(CoordinatorState {
                options,
                registry,
                tracker: Rc::new(ActiveTheme::new()),
                notifier: StorageNotifier::new(platform.storage),
                discovery,
                navigator,
                initialized: Cell::new(false),
                inbound_open: Cell::new(false),
                subscriptions: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Wires every listener and starts discovery.
    pub fn init(&self) {
        let state = &self.state;
        let mut subscriptions = Vec::new();

        let weak = Rc::downgrade(state);
        subscriptions.push(state.tracker.changes().subscribe(move |theme| {
            if let Some(state) = weak.upgrade() {
                state.propagate(theme);
            }
        }));

        let weak = Rc::downgrade(state);
        subscriptions.push(state.registry.watch(move |themes| {
            if let Some(state) = weak.upgrade() {
                state.resolve_initial(themes);
            }
        }));

        if state.options.storage_key().is_some() {
            let weak = Rc::downgrade(state);
            subscriptions.push(state.notifier.changes().subscribe(move |change| {
                if let Some(state) = weak.upgrade() {
                    state.on_storage_change(change);
                }
            }));
        }

        if let Some((navigator, _)) = state.url_sync() {
            let weak: Weak<CoordinatorState> = Rc::downgrade(state);
            subscriptions.push(navigator.watch(Rc::new(move |url: &Url| {
                if let Some(state) = weak.upgrade() {
                    state.on_navigation(url);
                }
            })));
        }

        state.subscriptions.borrow_mut().extend(subscriptions);
        state.discovery.init();
        log::debug!(
            "Theme coordinator initialized (storage key: {:?}, query param: {:?})",
            state.options.storage_key(),
            state.options.query_param()
        );
    }

    /// Selects `id` as the active theme.
    pub fn select_theme(&self, id: impl Into<String>) {
        self.state.tracker.set(Some(id.into()));
    }

    pub fn current_theme(&self) -> Option<String> {
        self.state.tracker.get()
    }

    pub fn themes(&self) -> Vec<Theme> {
        self.state.registry.snapshot()
    }

    /// Current theme first, then every distinct change.
    pub fn watch_current(&self, listener: impl Fn(&Option<String>) + 'static) -> Subscription {
        self.state.tracker.watch(listener)
    }

    /// [`ThemeCoordinator::watch_current`] that also hears [`ThemeCoordinator::dispose`].
    pub fn watch_current_with(
        &self,
        listener: impl Fn(&Option<String>) + 'static,
        complete: impl Fn() + 'static,
    ) -> Subscription {
        self.state.tracker.watch_with(listener, complete)
    }

    /// Current theme list first, then every change.
    pub fn watch_themes(&self, listener: impl Fn(&Vec<Theme>) + 'static) -> Subscription {
        self.state.registry.watch(listener)
    }

    pub fn watch_themes_with(
        &self,
        listener: impl Fn(&Vec<Theme>) + 'static,
        complete: impl Fn() + 'static,
    ) -> Subscription {
        self.state.registry.watch_with(listener, complete)
    }

    /// Direct access for explicit registration and lookups.
    pub fn registry(&self) -> &ThemeRegistry {
        &self.state.registry
    }

    pub fn options(&self) -> &SyncOptions {
        &self.state.options
    }

    /// Whether the one-time initial evaluation has run.
    pub fn is_initialized(&self) -> bool {
        self.state.initialized.get()
    }

    /// Unsubscribes everything, detaches native listeners and completes the
    /// owned streams.
    pub fn dispose(&self) {
        let subscriptions = std::mem::take(&mut *self.state.subscriptions.borrow_mut());
        for subscription in subscriptions {
            subscription.unsubscribe();
        }
        self.state.discovery.dispose();
        self.state.notifier.dispose();
        self.state.tracker.dispose();
        self.state.registry.dispose();
        log::debug!("Theme coordinator disposed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{MemoryDocument, StyleBlock};
    use crate::navigation::MemoryNavigator;
    use crate::scheduler::TaskQueue;
    use crate::storage::MemoryStorage;
    use claims::*;

    struct Host {
        doc: Rc<MemoryDocument>,
        storage: Rc<MemoryStorage>,
        nav: Rc<MemoryNavigator>,
        queue: Rc<TaskQueue>,
    }

    impl Host {
        fn new(url: &str) -> Self {
            Self {
                doc: Rc::new(MemoryDocument::new()),
                storage: Rc::new(MemoryStorage::new("local")),
                nav: Rc::new(MemoryNavigator::new(Url::parse(url).unwrap())),
                queue: Rc::new(TaskQueue::new()),
            }
        }

        fn coordinator(&self, options: SyncOptions) -> ThemeCoordinator {
            ThemeCoordinator::new(
                options,
                Platform {
                    storage: self.storage.clone(),
                    styles: self.doc.clone(),
                    navigator: Some(self.nav.clone()),
                    scheduler: self.queue.clone(),
                },
            )
        }
    }

    #[test]
    fn test_query_beats_storage_beats_default() {
        let host = Host::new("https://app.test/?theme=sepia");
        host.storage.set_item(crate::options::DEFAULT_STORAGE_KEY, "light");
        host.doc.append_style("/* @@id light */");
        host.doc.append_style("/* @@id dark */ /* @@default */");
        host.doc.append_style("/* @@id sepia */");

        let themes = host.coordinator(SyncOptions::default());
        themes.init();

        assert_some_eq!(themes.current_theme(), "sepia".to_string());
        assert!(themes.registry().get("dark").is_some_and(|t| t.is_default()));
    }

    #[test]
    fn test_storage_used_when_query_absent() {
        let host = Host::new("https://app.test/");
        host.storage.set_item(crate::options::DEFAULT_STORAGE_KEY, "light");
        host.doc.append_style("/* @@id light */");
        host.doc.append_style("@@id dark\n@@default");

        let themes = host.coordinator(SyncOptions::default());
        themes.init();

        assert_some_eq!(themes.current_theme(), "light".to_string());
    }

    #[test]
    fn test_disabled_sources_are_not_consulted() {
        let host = Host::new("https://app.test/?theme=sepia");
        host.storage.set_item(crate::options::DEFAULT_STORAGE_KEY, "light");
        host.doc.append_style("@@id light");
        host.doc.append_style("@@id dark\n@@default");

        let themes = host.coordinator(SyncOptions::disabled());
        themes.init();

        assert_some_eq!(themes.current_theme(), "dark".to_string());
        assert_eq!(host.nav.current_url().query(), Some("theme=sepia"));
    }

    #[test]
    fn test_propagation_updates_url_storage_and_styles() {
        let host = Host::new("https://app.test/page?lang=en#top");
        let light = host.doc.append_style("@@id light");
        let dark = host.doc.append_style("@@id dark");

        let themes = host.coordinator(SyncOptions::default());
        themes.init();
        host.queue.run_until_idle();

        assert_some_eq!(themes.current_theme(), "light".to_string());
        assert_eq!(
            host.nav.current_url().as_str(),
            "https://app.test/page?lang=en&theme=light#top"
        );
        assert_some_eq!(
            host.storage.get_item(crate::options::DEFAULT_STORAGE_KEY),
            "light".to_string()
        );
        assert!(!light.is_disabled());
        assert!(dark.is_disabled());

        themes.select_theme("dark");
        host.queue.run_until_idle();

        assert!(light.is_disabled());
        assert!(!dark.is_disabled());
    }

    #[test]
    fn test_registry_updates_land_before_activation() {
        let host = Host::new("https://app.test/");
        let themes = host.coordinator(SyncOptions::default());
        themes.init();
        assert_none!(themes.current_theme());

        // Registration, initial resolution and the activation request all
        // happen inside this insertion; the block is enabled on the next turn.
        let dark = host.doc.append_style("@@id dark");
        assert!(dark.is_disabled());
        host.queue.run_until_idle();

        assert!(!dark.is_disabled());
    }

    #[test]
    fn test_dispose_releases_every_listener() {
        let host = Host::new("https://app.test/");
        host.doc.append_style("@@id light");
        let themes = host.coordinator(SyncOptions::default());
        themes.init();

        themes.dispose();

        assert_eq!(host.storage.watcher_count(), 0);
        assert_eq!(host.doc.observer_count(), 0);
        host.nav
            .navigate(Url::parse("https://app.test/?theme=dark").unwrap());
        assert_some_eq!(themes.current_theme(), "light".to_string());
    }

    #[test]
    fn test_dispose_completes_public_watchers() {
        let host = Host::new("https://app.test/");
        host.doc.append_style("@@id light");
        let themes = host.coordinator(SyncOptions::default());
        themes.init();
        let completed = Rc::new(Cell::new(0));

        let done = Rc::clone(&completed);
        let _current = themes.watch_current_with(|_| {}, move || done.set(done.get() + 1));
        let done = Rc::clone(&completed);
        let _themes = themes.watch_themes_with(|_| {}, move || done.set(done.get() + 1));
        assert_eq!(completed.get(), 0);

        themes.dispose();

        assert_eq!(completed.get(), 2);
    }
}
