use crate::error::AppResult;
use crate::theme::{FileStore, StylesheetLoader, ThemeIdValidator, ThemeValidationError};
use crate::validation::Validator;
use engine::dom::{MemoryDocument, StyleBlock};
use engine::navigation::{MemoryNavigator, Navigator};
use engine::scheduler::TaskQueue;
use engine::{Platform, SyncOptions, Theme, ThemeCoordinator};
use std::path::PathBuf;
use std::rc::Rc;
use url::Url;

/// Where a session reads stylesheets from and persists its state.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub styles_dir: PathBuf,
    pub state_file: PathBuf,
    /// Location to keep the query parameter in sync with; without one the
    /// session has no URL sync.
    pub url: Option<Url>,
    pub sync: SyncOptions,
}

impl SessionOptions {
    pub fn new(styles_dir: impl Into<PathBuf>, state_file: impl Into<PathBuf>) -> Self {
        Self {
            styles_dir: styles_dir.into(),
            state_file: state_file.into(),
            url: None,
            sync: SyncOptions::default(),
        }
    }

    pub fn with_url(mut self, url: Option<Url>) -> Self {
        self.url = url;
        self
    }

    pub fn with_sync(mut self, sync: SyncOptions) -> Self {
        self.sync = sync;
        self
    }
}

/// One run of the theme engine over a styles directory and a state file.
///
/// Opening a session loads every stylesheet, resolves the initial theme
/// (URL parameter, then state file, then the default-flagged theme, then the
/// first one) and applies it before returning.
pub struct ThemeSession {
    coordinator: ThemeCoordinator,
    document: Rc<MemoryDocument>,
    navigator: Option<Rc<MemoryNavigator>>,
    queue: Rc<TaskQueue>,
    store: Rc<FileStore>,
}

impl ThemeSession {
    pub fn open(options: SessionOptions) -> AppResult<Self> {
        let document = Rc::new(MemoryDocument::new());
        // Loaded before init so one scan registers every theme at once.
        StylesheetLoader::new(&options.styles_dir).load_into(&document)?;

        let store = Rc::new(FileStore::open(&options.state_file)?);
        let navigator = options.url.map(|url| Rc::new(MemoryNavigator::new(url)));
        let queue = Rc::new(TaskQueue::new());

        let coordinator = ThemeCoordinator::new(
            options.sync,
            Platform {
                storage: store.clone(),
                styles: document.clone(),
                navigator: navigator.clone().map(|nav| nav as Rc<dyn Navigator>),
                scheduler: queue.clone(),
            },
        );
        coordinator.init();
        queue.run_until_idle();
        if let Some(e) = store.take_error() {
            log::warn!("Initial theme was not persisted: {e}");
        }

        log::debug!(
            "Session opened with {} theme(s), current: {:?}",
            coordinator.themes().len(),
            coordinator.current_theme()
        );
        Ok(Self {
            coordinator,
            document,
            navigator,
            queue,
            store,
        })
    }

    pub fn themes(&self) -> Vec<Theme> {
        self.coordinator.themes()
    }

    pub fn current(&self) -> Option<String> {
        self.coordinator.current_theme()
    }

    /// Makes `id` the active theme, persisting it and updating the URL.
    ///
    /// Fails if the state file could not be rewritten; the theme stays
    /// selected for this session.
    pub fn select(&self, id: &str) -> AppResult<()> {
        ThemeIdValidator.validate(id)?;
        if !self.coordinator.registry().has(id) {
            let available = self.themes().into_iter().map(|theme| theme.id).collect();
            return Err(ThemeValidationError::UnknownTheme {
                id: id.to_string(),
                available,
            }
            .into());
        }

        self.coordinator.select_theme(id);
        self.queue.run_until_idle();
        match self.store.take_error() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn url(&self) -> Option<Url> {
        self.navigator.as_ref().map(|nav| nav.current_url())
    }

    /// The text of every enabled style block in document order: the active
    /// theme's blocks plus all blocks that are not themes.
    pub fn bundle(&self) -> String {
        let mut bundle = String::new();
        for style in self.document.styles() {
            if style.is_disabled() {
                continue;
            }
            let text = style.text_content();
            bundle.push_str(&text);
            if !text.ends_with('\n') {
                bundle.push('\n');
            }
        }
        bundle
    }

    pub fn close(self) {
        self.coordinator.dispose();
    }
}
