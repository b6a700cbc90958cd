//! Keeps the live stylesheet in line with the theme settings.
//!
//! # Resolution
//!
//! Each pass computes the effective [`ColorScheme`] from the theme mode:
//! the system preference for `System`, fixed for `Dark` and `Light`, and the
//! `custom-color-scheme` setting for `Custom`. In custom mode the pass fills
//! the scheme's template with the user's colors, writes it to storage and
//! loads the written file. Any failure on that path is logged once and the
//! pass continues as if the dark built-in stylesheet had been selected.
//! Otherwise the pre-built stylesheet for the scheme is loaded, unless it is
//! already the current one.
//!
//! # Ordering
//!
//! Every change queues a pass on the local task set and bumps a generation
//! counter. A pass checks the counter after each await and abandons, without
//! touching the presentation context, once a newer pass has been requested.
//! So the last request always determines the final stylesheet. Custom file
//! writes take turns, and a pass rechecks the counter once it is its turn,
//! so an abandoned pass never overwrites the file of a newer one.
//!
//! ```rust,ignore
//! let local = tokio::task::LocalSet::new();
//! local.run_until(async {
//!     let manager = ThemeManager::new(host, ManagerConfig::default());
//!     manager.flush().await;
//!     let mut schemes = manager.watch_color_scheme();
//!     settings.set_enum(THEME_KEY, ThemeMode::Light.index());
//!     schemes.changed().await?;
//! }).await;
//! ```

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use tinct_template::{ColorVariable, PlaceholderSyntax, Template};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use crate::colors::{resolve_color, settings_key};
use crate::error::{PresentationError, ThemeError};
use crate::mode::{Choice, ColorScheme, ThemeMode};
use crate::presentation::{PresentationContext, StylesheetId};
use crate::resource::{
    stylesheet_name, template_name, Registration, ResourceBundle, ResourceRegistry, RESOURCE_PREFIX,
};
use crate::settings::{theme_keys, Settings, CUSTOM_COLOR_SCHEME_KEY, THEME_KEY};
use crate::storage::Storage;
use crate::subscription::SubscriptionSet;
use crate::system::SystemAppearance;

/// Runtime options of a [`ThemeManager`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ManagerConfig {
    /// URI prefix templates and stylesheets are looked up under.
    pub resource_prefix: String,
    /// File name the filled custom stylesheet is stored as.
    pub custom_file: String,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            resource_prefix: RESOURCE_PREFIX.to_string(),
            custom_file: "custom-theme.css".to_string(),
        }
    }
}

impl ManagerConfig {
    pub fn from_yaml(text: &str) -> Result<Self, ThemeError> {
        Ok(serde_yaml::from_str(text)?)
    }

    fn uri(&self, name: &str) -> String {
        format!("{}/{}", self.resource_prefix, name)
    }
}

/// The collaborators a [`ThemeManager`] works with.
pub struct ThemeHost {
    pub settings: Rc<dyn Settings>,
    pub appearance: Rc<dyn SystemAppearance>,
    pub context: Rc<dyn PresentationContext>,
    pub storage: Rc<dyn Storage>,
    pub resources: ResourceRegistry,
    /// Registered for the manager's lifetime.
    pub bundle: ResourceBundle,
}

/// Outcome of one resolution pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The stylesheet was loaded and is now current.
    Loaded(StylesheetId),
    /// The target was already current; nothing was called.
    Unchanged,
    /// A newer pass was requested; this one made no changes.
    Superseded,
    /// The swap failed and was logged.
    Failed,
}

struct Inner {
    config: ManagerConfig,
    settings: Rc<dyn Settings>,
    appearance: Rc<dyn SystemAppearance>,
    context: Rc<dyn PresentationContext>,
    storage: Rc<dyn Storage>,
    resources: ResourceRegistry,
    generation: Cell<u64>,
    destroyed: Cell<bool>,
    stylesheet: RefCell<Option<StylesheetId>>,
    color_scheme: watch::Sender<ColorScheme>,
    pending: RefCell<Vec<JoinHandle<Resolution>>>,
    /// Held across a custom file write.
    write_lock: Mutex<()>,
}

/// Resolves theme settings into a loaded stylesheet.
///
/// Must be created and used inside a [`tokio::task::LocalSet`].
pub struct ThemeManager {
    inner: Rc<Inner>,
    subscriptions: RefCell<SubscriptionSet>,
    registration: RefCell<Option<Registration>>,
}

impl ThemeManager {
    /// Registers the bundle, subscribes to every theme input and queues the
    /// first pass.
    pub fn new(host: ThemeHost, config: ManagerConfig) -> Self {
        let ThemeHost {
            settings,
            appearance,
            context,
            storage,
            resources,
            bundle,
        } = host;

        let registration = resources.register(bundle);
        let (color_scheme, _) = watch::channel(ColorScheme::Dark);
        let inner = Rc::new(Inner {
            config,
            settings,
            appearance,
            context,
            storage,
            resources,
            generation: Cell::new(0),
            destroyed: Cell::new(false),
            stylesheet: RefCell::new(None),
            color_scheme,
            pending: RefCell::new(Vec::new()),
            write_lock: Mutex::new(()),
        });

        let mut subscriptions = SubscriptionSet::new();
        for key in theme_keys() {
            let weak = Rc::downgrade(&inner);
            subscriptions.push(inner.settings.connect_changed(
                key,
                Box::new(move |key| {
                    tracing::debug!(key, "theme setting changed");
                    request(&weak);
                }),
            ));
        }
        let weak = Rc::downgrade(&inner);
        subscriptions.push(inner.appearance.connect_changed(Box::new(move || {
            tracing::debug!("system color scheme changed");
            request(&weak);
        })));

        inner.request_update();

        Self {
            inner,
            subscriptions: RefCell::new(subscriptions),
            registration: RefCell::new(Some(registration)),
        }
    }

    /// Queues a resolution pass.
    pub fn request_update(&self) {
        self.inner.request_update();
    }

    /// Runs a resolution pass to completion.
    ///
    /// Counts as the newest request, so queued passes abandon.
    pub async fn update_theme(&self) -> Resolution {
        match self.inner.next_generation() {
            Some(generation) => Rc::clone(&self.inner).run_pass(generation).await,
            None => Resolution::Superseded,
        }
    }

    /// Waits for every queued pass, including ones queued meanwhile.
    ///
    /// Returns their outcomes in request order.
    pub async fn flush(&self) -> Vec<Resolution> {
        let mut outcomes = Vec::new();
        loop {
            let handles: Vec<_> = self.inner.pending.borrow_mut().drain(..).collect();
            if handles.is_empty() {
                return outcomes;
            }
            for handle in handles {
                match handle.await {
                    Ok(outcome) => outcomes.push(outcome),
                    Err(err) => tracing::warn!(error = %err, "resolution pass did not complete"),
                }
            }
        }
    }

    /// The last computed effective scheme.
    pub fn color_scheme(&self) -> ColorScheme {
        *self.inner.color_scheme.borrow()
    }

    /// Notified when the effective scheme changes.
    pub fn watch_color_scheme(&self) -> watch::Receiver<ColorScheme> {
        self.inner.color_scheme.subscribe()
    }

    /// The stylesheet currently loaded by this manager.
    pub fn stylesheet(&self) -> Option<StylesheetId> {
        self.inner.stylesheet.borrow().clone()
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.get()
    }

    /// Disconnects from every input and unregisters the bundle.
    ///
    /// Passes still in flight abandon. The current stylesheet stays loaded.
    pub fn destroy(&self) {
        if self.inner.destroyed.replace(true) {
            return;
        }
        self.inner.generation.set(self.inner.generation.get() + 1);
        self.subscriptions.borrow_mut().clear();
        self.registration.borrow_mut().take();
        tracing::debug!("theme manager destroyed");
    }
}

impl Drop for ThemeManager {
    fn drop(&mut self) {
        self.destroy();
    }
}

fn request(inner: &Weak<Inner>) {
    if let Some(inner) = inner.upgrade() {
        inner.request_update();
    }
}

impl Inner {
    fn next_generation(&self) -> Option<u64> {
        if self.destroyed.get() {
            return None;
        }
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        Some(generation)
    }

    fn request_update(self: &Rc<Self>) {
        let Some(generation) = self.next_generation() else {
            return;
        };
        let inner = Rc::clone(self);
        let handle = tokio::task::spawn_local(async move { inner.run_pass(generation).await });

        let mut pending = self.pending.borrow_mut();
        pending.retain(|h| !h.is_finished());
        pending.push(handle);
    }

    fn is_stale(&self, generation: u64) -> bool {
        self.destroyed.get() || self.generation.get() != generation
    }

    async fn run_pass(self: Rc<Self>, generation: u64) -> Resolution {
        if self.is_stale(generation) {
            return Resolution::Superseded;
        }

        let mode = ThemeMode::from_setting(self.settings.get_enum(THEME_KEY));
        let scheme = match mode {
            ThemeMode::System => ColorScheme::from_system(self.appearance.color_scheme()),
            ThemeMode::Dark => ColorScheme::Dark,
            ThemeMode::Light => ColorScheme::Light,
            ThemeMode::Custom => {
                ColorScheme::from_setting(self.settings.get_enum(CUSTOM_COLOR_SCHEME_KEY))
            }
        };
        tracing::debug!(%mode, %scheme, generation, "resolving theme");
        self.publish(scheme);

        let mut target = scheme;
        if mode == ThemeMode::Custom {
            match self.apply_custom(scheme, generation).await {
                Ok(Some(id)) => return Resolution::Loaded(id),
                Ok(None) => return Resolution::Superseded,
                Err(err) => {
                    if self.is_stale(generation) {
                        return Resolution::Superseded;
                    }
                    tracing::error!(error = %err, %scheme, "custom theme failed, using dark stylesheet");
                    target = ColorScheme::Dark;
                }
            }
        }

        let id = StylesheetId::Resource(self.config.uri(&stylesheet_name(target)));
        if self.stylesheet.borrow().as_ref() == Some(&id) {
            return Resolution::Unchanged;
        }
        self.swap(id)
    }

    fn publish(&self, scheme: ColorScheme) {
        let changed = self.color_scheme.send_if_modified(|current| {
            if *current == scheme {
                return false;
            }
            *current = scheme;
            true
        });
        if changed {
            tracing::debug!(%scheme, "color scheme changed");
        }
    }

    /// Writes the custom stylesheet and swaps it in. `Ok(None)` when superseded.
    async fn apply_custom(
        &self,
        scheme: ColorScheme,
        generation: u64,
    ) -> Result<Option<StylesheetId>, ThemeError> {
        let Some(path) = self.write_custom(scheme, generation).await? else {
            return Ok(None);
        };
        let id = self.replace_stylesheet(StylesheetId::File(path))?;
        tracing::debug!(stylesheet = %id, "loaded custom stylesheet");
        Ok(Some(id))
    }

    /// Fills and stores the custom stylesheet. `Ok(None)` when superseded.
    async fn write_custom(
        &self,
        scheme: ColorScheme,
        generation: u64,
    ) -> Result<Option<PathBuf>, ThemeError> {
        let uri = self.config.uri(&template_name(scheme));
        let bytes = self.resources.load_contents(&uri).await?;
        if self.is_stale(generation) {
            return Ok(None);
        }

        let template = Template::parse(String::from_utf8(bytes)?, PlaceholderSyntax::Bare)?;
        let values: HashMap<ColorVariable, String> = ColorVariable::ALL
            .into_iter()
            .map(|var| {
                let stored = self.settings.get_string(settings_key(var));
                (var, resolve_color(var, &stored, scheme).to_string())
            })
            .collect();
        let filled = template.fill(&values)?;

        let name = self.config.custom_file.as_str();
        let _write = self.write_lock.lock().await;
        if self.is_stale(generation) {
            return Ok(None);
        }
        let path = self
            .storage
            .replace_contents(name, filled.as_bytes())
            .await
            .map_err(|source| ThemeError::Write {
                name: name.to_string(),
                source,
            })?;
        if self.is_stale(generation) {
            return Ok(None);
        }
        Ok(Some(path))
    }

    /// Swaps in a built-in stylesheet, logging a failure.
    fn swap(&self, id: StylesheetId) -> Resolution {
        match self.replace_stylesheet(id) {
            Ok(id) => {
                tracing::debug!(stylesheet = %id, "loaded stylesheet");
                Resolution::Loaded(id)
            }
            Err(err @ PresentationError::Unload { .. }) => {
                tracing::error!(error = %err, "failed to unload stylesheet, keeping it");
                Resolution::Failed
            }
            Err(err @ PresentationError::Load { .. }) => {
                tracing::error!(error = %err, "failed to load stylesheet");
                Resolution::Failed
            }
        }
    }

    /// Unloads the current stylesheet, then loads `id`.
    ///
    /// An unload failure leaves the current stylesheet recorded. A load
    /// failure leaves none.
    fn replace_stylesheet(&self, id: StylesheetId) -> Result<StylesheetId, PresentationError> {
        let current = self.stylesheet.borrow().clone();
        if let Some(current) = current {
            self.context.unload_stylesheet(&current)?;
            *self.stylesheet.borrow_mut() = None;
        }
        self.context.load_stylesheet(&id)?;
        *self.stylesheet.borrow_mut() = Some(id.clone());
        Ok(id)
    }
}
