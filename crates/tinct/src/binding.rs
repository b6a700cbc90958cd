//! Two-way bindings between settings and preference controls.
//!
//! Controls are traits so any toolkit widget can sit behind them;
//! [`ColorCell`] and [`SelectionCell`] are in-memory implementations.
//!
//! A binding applying a settings value to its control ignores the change
//! notification that control raises in response, so neither side writes
//! back a value it was just given.

use std::cell::{Cell, RefCell};
use std::marker::PhantomData;
use std::rc::Rc;

use tinct_template::ColorVariable;

use crate::colors::{default_color, settings_key, Rgba};
use crate::mode::{Choice, ColorScheme, ThemeMode};
use crate::settings::{Settings, CUSTOM_COLOR_SCHEME_KEY, THEME_KEY};
use crate::subscription::{Signal, Subscription, SubscriptionSet};

/// A color chooser.
pub trait ColorControl {
    /// The displayed color in normalized form, `""` before any is set.
    fn color(&self) -> String;

    /// Displays `color`. Unparseable values are ignored.
    fn set_color(&self, color: &str);

    fn set_sensitive(&self, sensitive: bool);

    /// Calls `callback` with the normalized color after each change.
    fn connect_changed(&self, callback: Box<dyn Fn(&str)>) -> Subscription;
}

/// A dropdown or radio group choosing one position.
pub trait SelectionControl {
    fn selected(&self) -> usize;

    fn set_selected(&self, position: usize);

    fn set_sensitive(&self, sensitive: bool);

    /// Calls `callback` with the position after each change.
    fn connect_changed(&self, callback: Box<dyn Fn(usize)>) -> Subscription;
}

/// In-memory [`ColorControl`].
pub struct ColorCell {
    color: RefCell<String>,
    sensitive: Cell<bool>,
    changed: Signal<str>,
}

impl ColorCell {
    pub fn new() -> Self {
        Self {
            color: RefCell::new(String::new()),
            sensitive: Cell::new(true),
            changed: Signal::new(),
        }
    }

    pub fn is_sensitive(&self) -> bool {
        self.sensitive.get()
    }
}

impl Default for ColorCell {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorControl for ColorCell {
    fn color(&self) -> String {
        self.color.borrow().clone()
    }

    fn set_color(&self, color: &str) {
        let normalized = match Rgba::parse(color) {
            Ok(rgba) => rgba.to_string(),
            Err(err) => {
                tracing::warn!(error = %err, "ignoring color");
                return;
            }
        };
        if *self.color.borrow() == normalized {
            return;
        }
        *self.color.borrow_mut() = normalized.clone();
        self.changed.emit(&normalized);
    }

    fn set_sensitive(&self, sensitive: bool) {
        self.sensitive.set(sensitive);
    }

    fn connect_changed(&self, callback: Box<dyn Fn(&str)>) -> Subscription {
        self.changed.connect(move |color: &str| callback(color))
    }
}

/// In-memory [`SelectionControl`].
pub struct SelectionCell {
    selected: Cell<usize>,
    sensitive: Cell<bool>,
    changed: Signal<usize>,
}

impl SelectionCell {
    pub fn new() -> Self {
        Self {
            selected: Cell::new(0),
            sensitive: Cell::new(true),
            changed: Signal::new(),
        }
    }

    pub fn is_sensitive(&self) -> bool {
        self.sensitive.get()
    }
}

impl Default for SelectionCell {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionControl for SelectionCell {
    fn selected(&self) -> usize {
        self.selected.get()
    }

    fn set_selected(&self, position: usize) {
        if self.selected.replace(position) != position {
            self.changed.emit(&position);
        }
    }

    fn set_sensitive(&self, sensitive: bool) {
        self.sensitive.set(sensitive);
    }

    fn connect_changed(&self, callback: Box<dyn Fn(usize)>) -> Subscription {
        self.changed.connect(move |position: &usize| callback(*position))
    }
}

struct ColorState {
    settings: Rc<dyn Settings>,
    var: ColorVariable,
    control: Rc<dyn ColorControl>,
    applying: Cell<bool>,
}

impl ColorState {
    fn current_default(&self) -> &'static str {
        default_color(self.var, self.settings.get_enum(CUSTOM_COLOR_SCHEME_KEY))
    }

    fn apply_to_control(&self) {
        let stored = self.settings.get_string(settings_key(self.var));
        let shown = if stored.is_empty() {
            self.current_default().to_string()
        } else {
            match Rgba::parse(&stored) {
                Ok(rgba) => rgba.to_string(),
                Err(err) => {
                    tracing::warn!(error = %err, key = settings_key(self.var), "malformed color override");
                    return;
                }
            }
        };

        self.applying.set(true);
        self.control.set_color(&shown);
        self.applying.set(false);
    }

    fn store_from_control(&self, chosen: &str) {
        if self.applying.get() {
            return;
        }
        let is_default = Rgba::parse(self.current_default())
            .map(|d| d.to_string() == chosen)
            .unwrap_or(false);
        let value = if is_default { "" } else { chosen };
        self.settings.set_string(settings_key(self.var), value);
    }
}

/// Keeps one [`ColorControl`] and one color override in sync.
pub struct ColorBinding {
    state: Rc<ColorState>,
    _subscriptions: SubscriptionSet,
}

impl ColorBinding {
    /// Shows the current value on `control` and keeps both sides in sync.
    ///
    /// Choosing the scheme default stores `""`.
    pub fn bind(settings: Rc<dyn Settings>, var: ColorVariable, control: Rc<dyn ColorControl>) -> Self {
        let state = Rc::new(ColorState {
            settings,
            var,
            control,
            applying: Cell::new(false),
        });

        let mut subscriptions = SubscriptionSet::new();
        for key in [settings_key(var), CUSTOM_COLOR_SCHEME_KEY] {
            let weak = Rc::downgrade(&state);
            subscriptions.push(state.settings.connect_changed(
                key,
                Box::new(move |_| {
                    if let Some(state) = weak.upgrade() {
                        state.apply_to_control();
                    }
                }),
            ));
        }
        let weak = Rc::downgrade(&state);
        subscriptions.push(state.control.connect_changed(Box::new(move |color| {
            if let Some(state) = weak.upgrade() {
                state.store_from_control(color);
            }
        })));

        state.apply_to_control();
        Self {
            state,
            _subscriptions: subscriptions,
        }
    }

    pub fn variable(&self) -> ColorVariable {
        self.state.var
    }

    /// Clears the override, returning the control to the default.
    pub fn reset(&self) {
        self.state.settings.set_string(settings_key(self.state.var), "");
    }
}

struct SelectionState<T> {
    settings: Rc<dyn Settings>,
    key: &'static str,
    control: Rc<dyn SelectionControl>,
    applying: Cell<bool>,
    _choice: PhantomData<T>,
}

impl<T: Choice> SelectionState<T> {
    fn apply_to_control(&self) {
        let value = T::from_setting(self.settings.get_enum(self.key));
        self.applying.set(true);
        self.control.set_selected(value.position());
        self.applying.set(false);
    }

    fn store_from_control(&self, position: usize) {
        if self.applying.get() {
            return;
        }
        match T::from_position(position) {
            Some(value) => self.settings.set_enum(self.key, value.index()),
            None => tracing::warn!(position, key = self.key, "selection out of range"),
        }
    }
}

/// Keeps a [`SelectionControl`] and an enum setting in sync.
///
/// Positions map to stored values through the [`Choice`] table of `T`.
pub struct SelectionBinding<T: Choice> {
    state: Rc<SelectionState<T>>,
    _subscriptions: SubscriptionSet,
}

impl<T: Choice> SelectionBinding<T> {
    pub fn bind(settings: Rc<dyn Settings>, key: &'static str, control: Rc<dyn SelectionControl>) -> Self {
        let state = Rc::new(SelectionState::<T> {
            settings,
            key,
            control,
            applying: Cell::new(false),
            _choice: PhantomData,
        });

        let mut subscriptions = SubscriptionSet::new();
        let weak = Rc::downgrade(&state);
        subscriptions.push(state.settings.connect_changed(
            key,
            Box::new(move |_| {
                if let Some(state) = weak.upgrade() {
                    state.apply_to_control();
                }
            }),
        ));
        let weak = Rc::downgrade(&state);
        subscriptions.push(state.control.connect_changed(Box::new(move |position| {
            if let Some(state) = weak.upgrade() {
                state.store_from_control(position);
            }
        })));

        state.apply_to_control();
        Self {
            state,
            _subscriptions: subscriptions,
        }
    }

    /// The value the control currently shows.
    pub fn value(&self) -> Option<T> {
        T::from_position(self.state.control.selected())
    }
}

/// Binds the `theme` setting to a mode selector.
pub fn bind_theme_mode(
    settings: Rc<dyn Settings>,
    control: Rc<dyn SelectionControl>,
) -> SelectionBinding<ThemeMode> {
    SelectionBinding::bind(settings, THEME_KEY, control)
}

/// Binds the `custom-color-scheme` setting to a scheme selector.
pub fn bind_color_scheme(
    settings: Rc<dyn Settings>,
    control: Rc<dyn SelectionControl>,
) -> SelectionBinding<ColorScheme> {
    SelectionBinding::bind(settings, CUSTOM_COLOR_SCHEME_KEY, control)
}

/// The controls of a theme preferences page.
pub struct PanelControls {
    pub theme: Rc<dyn SelectionControl>,
    pub color_scheme: Rc<dyn SelectionControl>,
    pub colors: Vec<(ColorVariable, Rc<dyn ColorControl>)>,
}

/// A bound preferences page.
///
/// The scheme selector and color controls are sensitive only while the
/// theme mode is `Custom`.
pub struct CustomizationPanel {
    theme: SelectionBinding<ThemeMode>,
    color_scheme: SelectionBinding<ColorScheme>,
    colors: Vec<ColorBinding>,
    _sensitivity: Subscription,
}

impl CustomizationPanel {
    pub fn new(settings: Rc<dyn Settings>, controls: PanelControls) -> Self {
        let PanelControls {
            theme,
            color_scheme,
            colors,
        } = controls;

        let scheme_control = Rc::clone(&color_scheme);
        let color_controls: Vec<Rc<dyn ColorControl>> =
            colors.iter().map(|(_, control)| Rc::clone(control)).collect();
        let reader = Rc::clone(&settings);
        let update_sensitivity = move || {
            let custom = ThemeMode::from_setting(reader.get_enum(THEME_KEY)) == ThemeMode::Custom;
            scheme_control.set_sensitive(custom);
            for control in &color_controls {
                control.set_sensitive(custom);
            }
        };
        update_sensitivity();
        let sensitivity = settings.connect_changed(THEME_KEY, Box::new(move |_| update_sensitivity()));

        Self {
            theme: bind_theme_mode(Rc::clone(&settings), theme),
            color_scheme: bind_color_scheme(Rc::clone(&settings), color_scheme),
            colors: colors
                .into_iter()
                .map(|(var, control)| ColorBinding::bind(Rc::clone(&settings), var, control))
                .collect(),
            _sensitivity: sensitivity,
        }
    }

    pub fn theme_mode(&self) -> Option<ThemeMode> {
        self.theme.value()
    }

    pub fn color_scheme(&self) -> Option<ColorScheme> {
        self.color_scheme.value()
    }

    pub fn color_bindings(&self) -> &[ColorBinding] {
        &self.colors
    }

    /// Clears every color override.
    pub fn reset_colors(&self) {
        for binding in &self.colors {
            binding.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MemorySettings;

    const BG_KEY: &str = "custom-bg-color";

    fn setup() -> (MemorySettings, Rc<ColorCell>, ColorBinding) {
        let settings = MemorySettings::new();
        let cell = Rc::new(ColorCell::new());
        let binding = ColorBinding::bind(Rc::new(settings.clone()), ColorVariable::Bg, cell.clone());
        (settings, cell, binding)
    }

    #[test]
    fn test_control_shows_default_when_unset() {
        let (settings, cell, _binding) = setup();
        assert_eq!(cell.color(), "rgb(54,54,58)");

        settings.set_enum(CUSTOM_COLOR_SCHEME_KEY, 1);
        assert_eq!(cell.color(), "rgb(250,250,251)");
    }

    #[test]
    fn test_control_shows_normalized_override() {
        let (settings, cell, _binding) = setup();
        settings.set_string(BG_KEY, "#ff0000");
        assert_eq!(cell.color(), "rgb(255,0,0)");
        assert_eq!(settings.get_string(BG_KEY), "#ff0000");
    }

    #[test]
    fn test_choosing_default_stores_empty() {
        let (settings, cell, _binding) = setup();
        cell.set_color("#102030");
        assert_eq!(settings.get_string(BG_KEY), "rgb(16,32,48)");

        cell.set_color("#36363a");
        assert_eq!(settings.get_string(BG_KEY), "");
        assert_eq!(cell.color(), "rgb(54,54,58)");
    }

    #[test]
    fn test_out_of_range_scheme_uses_last_default() {
        let (settings, cell, _binding) = setup();
        settings.set_enum(CUSTOM_COLOR_SCHEME_KEY, 5);
        assert_eq!(cell.color(), "rgb(250,250,251)");

        cell.set_color("#000");
        assert_eq!(settings.get_string(BG_KEY), "rgb(0,0,0)");
        cell.set_color("rgb(250, 250, 251)");
        assert_eq!(settings.get_string(BG_KEY), "");
    }

    #[test]
    fn test_malformed_override_is_not_applied() {
        let (settings, cell, _binding) = setup();
        cell.set_color("#111111");
        settings.set_string(BG_KEY, "not-a-color");

        assert_eq!(cell.color(), "rgb(17,17,17)");
        assert_eq!(settings.get_string(BG_KEY), "not-a-color");
    }

    #[test]
    fn test_reset_clears_override() {
        let (settings, cell, binding) = setup();
        cell.set_color("#111111");
        binding.reset();
        assert_eq!(settings.get_string(BG_KEY), "");
        assert_eq!(cell.color(), "rgb(54,54,58)");
    }

    #[test]
    fn test_dropped_binding_disconnects() {
        let (settings, cell, binding) = setup();
        drop(binding);
        assert_eq!(settings.connection_count(), 0);

        cell.set_color("#111111");
        assert_eq!(settings.get_string(BG_KEY), "");
    }

    #[test]
    fn test_theme_selector_round_trip() {
        let settings = MemorySettings::new();
        let cell = Rc::new(SelectionCell::new());
        let binding = bind_theme_mode(Rc::new(settings.clone()), cell.clone());

        settings.set_enum(THEME_KEY, ThemeMode::Light.index());
        assert_eq!(cell.selected(), 2);
        assert_eq!(binding.value(), Some(ThemeMode::Light));

        cell.set_selected(3);
        assert_eq!(settings.get_enum(THEME_KEY), 3);
    }

    #[test]
    fn test_out_of_range_selection_is_ignored() {
        let settings = MemorySettings::new();
        let cell = Rc::new(SelectionCell::new());
        let _binding = bind_color_scheme(Rc::new(settings.clone()), cell.clone());

        cell.set_selected(7);
        assert_eq!(settings.get_enum(CUSTOM_COLOR_SCHEME_KEY), 0);
    }

    #[test]
    fn test_panel_sensitivity_follows_mode() {
        let settings = MemorySettings::new();
        let theme = Rc::new(SelectionCell::new());
        let scheme = Rc::new(SelectionCell::new());
        let colors: Vec<(ColorVariable, Rc<ColorCell>)> = ColorVariable::ALL
            .into_iter()
            .map(|var| (var, Rc::new(ColorCell::new())))
            .collect();

        let panel = CustomizationPanel::new(
            Rc::new(settings.clone()),
            PanelControls {
                theme: theme.clone(),
                color_scheme: scheme.clone(),
                colors: colors
                    .iter()
                    .map(|(var, cell)| (*var, cell.clone() as Rc<dyn ColorControl>))
                    .collect(),
            },
        );

        assert!(!scheme.is_sensitive());
        assert!(colors.iter().all(|(_, cell)| !cell.is_sensitive()));

        theme.set_selected(ThemeMode::Custom.position());
        assert_eq!(panel.theme_mode(), Some(ThemeMode::Custom));
        assert!(scheme.is_sensitive());
        assert!(colors.iter().all(|(_, cell)| cell.is_sensitive()));

        colors[1].1.set_color("#abcdef");
        assert_eq!(settings.get_string("custom-fg-color"), "rgb(171,205,239)");
        panel.reset_colors();
        assert_eq!(settings.get_string("custom-fg-color"), "");
    }
}
