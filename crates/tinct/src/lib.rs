//! # Tinct - Runtime Theme Resolution
//!
//! `tinct` keeps a host's live stylesheet in line with the user's theme
//! settings. Templates produced by `tinct-template` (and compiled to CSS by
//! the host's stylesheet pipeline) are shipped in a [`ResourceBundle`]
//! alongside one pre-built stylesheet per [`ColorScheme`].
//!
//! ## Core Concepts
//!
//! - [`ThemeMode`]: the user's choice (`system`, `dark`, `light`, `custom`)
//! - [`ColorScheme`]: the dark/light scheme the choice resolves to
//! - [`ThemeManager`]: watches the inputs and swaps stylesheets
//! - [`Settings`], [`SystemAppearance`], [`PresentationContext`] and
//!   [`Storage`]: the host seams, each with an in-process implementation
//! - [`ColorBinding`] and [`CustomizationPanel`]: preferences UI wiring
//!
//! ## Custom Colors
//!
//! In custom mode the manager fills the template for the chosen scheme.
//! Each of the four [`ColorVariable`]s takes the user's override when one
//! is set, or the scheme default otherwise:
//!
//! ```rust
//! use tinct::{default_color, resolve_color, ColorScheme, ColorVariable};
//!
//! assert_eq!(resolve_color(ColorVariable::Bg, "", ColorScheme::Light), "rgb(250,250,251)");
//! assert_eq!(resolve_color(ColorVariable::Bg, "#101010", ColorScheme::Light), "#101010");
//! // Scheme indices past the last default clamp to it.
//! assert_eq!(default_color(ColorVariable::Fg, 5), "rgb(34,34,38)");
//! ```
//!
//! ## Threading
//!
//! Everything here is single-threaded. The manager spawns its passes with
//! [`tokio::task::spawn_local`], so it lives inside a
//! [`tokio::task::LocalSet`].

pub mod binding;
mod colors;
mod error;
pub mod manager;
pub mod mode;
pub mod presentation;
pub mod resource;
pub mod settings;
pub mod storage;
mod subscription;
pub mod system;

pub use binding::{
    bind_color_scheme, bind_theme_mode, ColorBinding, ColorCell, ColorControl, CustomizationPanel,
    PanelControls, SelectionBinding, SelectionCell, SelectionControl,
};
pub use colors::{default_color, resolve_color, settings_key, Rgba};
pub use error::{ColorParseError, PresentationError, ResourceError, ThemeError};
pub use manager::{ManagerConfig, Resolution, ThemeHost, ThemeManager};
pub use mode::{Choice, ColorScheme, ModeEntry, SystemColorScheme, ThemeMode, COLOR_SCHEMES, THEME_MODES};
pub use presentation::{ContextCall, MemoryContext, PresentationContext, StylesheetId};
pub use resource::{
    stylesheet_name, template_name, Registration, ResourceBundle, ResourceRegistry, RESOURCE_PREFIX,
};
pub use settings::{
    theme_keys, MemorySettings, Settings, ThemeSettings, CUSTOM_COLOR_SCHEME_KEY, THEME_KEY,
};
pub use storage::{DataDir, Storage};
pub use subscription::{Subscription, SubscriptionSet};
pub use system::{FixedAppearance, OsAppearance, SystemAppearance};
pub use tinct_template::ColorVariable;
