//! GUI collaborator contract: folders, sliders, buttons and event handlers.

use crate::scene::SceneError;
use thiserror::Error;

/// Folder grouping widgets in the control panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FolderId(pub(crate) usize);

/// A slider widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SliderId(pub(crate) usize);

/// A button widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ButtonId(pub(crate) usize);

/// Panel theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub dark_mode: bool,
}

impl Default for Theme {
    fn default() -> Self {
        Self { dark_mode: true }
    }
}

/// Bounds and resolution of a slider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderConfig {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub initial_value: f64,
}

impl SliderConfig {
    pub fn new(min: f64, max: f64, step: f64, initial_value: f64) -> Self {
        Self {
            min,
            max,
            step,
            initial_value,
        }
    }

    /// Snap a requested value to the step grid anchored at `min` and clamp it
    /// into bounds.
    ///
    /// Non-finite requests fall back to the lower bound.
    pub fn constrain(&self, value: f64) -> f64 {
        if !value.is_finite() {
            return self.min;
        }
        let snapped = if self.step > 0.0 {
            let steps = ((value - self.min) / self.step).round();
            strip_float_noise(self.min + steps * self.step)
        } else {
            value
        };
        snapped.clamp(self.min, self.max)
    }
}

/// Grid points like `-15 + 153 * 0.1` come out a few ulps off the decimal
/// the user typed; round them back onto a 1e-9 grid.
fn strip_float_noise(value: f64) -> f64 {
    const SCALE: f64 = 1e9;
    let scaled = value * SCALE;
    if scaled.abs() < 9.0e15 {
        scaled.round() / SCALE
    } else {
        value
    }
}

/// An event delivered to registered handlers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GuiEvent {
    SliderChanged { slider: SliderId, value: f64 },
    ButtonClicked { button: ButtonId },
}

/// User input fed into a GUI implementation from outside (a browser, a
/// terminal, a test).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GuiInput {
    SetSlider { slider: SliderId, value: f64 },
    Click { button: ButtonId },
}

/// Callback run for each event from the widget it is registered on.
pub type EventHandler = Box<dyn FnMut(&GuiEvent) -> Result<(), SceneError>>;

/// Errors raised by GUI operations.
#[derive(Debug, Error)]
pub enum GuiError {
    #[error("Unknown widget {0}")]
    UnknownWidget(usize),

    #[error("Widget {index} is a {found}, not a {expected}")]
    WrongWidgetKind {
        index: usize,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Event handler failed: {0}")]
    Handler(#[from] SceneError),
}

/// Operations the viewer needs from a GUI implementation.
///
/// Handlers run one at a time, in delivery order, never concurrently with
/// each other.
pub trait GuiApi {
    fn configure_theme(&mut self, theme: Theme);

    fn add_folder(&mut self, label: &str) -> FolderId;

    fn add_slider(&mut self, folder: Option<FolderId>, label: &str, config: SliderConfig)
    -> SliderId;

    fn add_button(&mut self, folder: Option<FolderId>, label: &str) -> ButtonId;

    /// Current (constrained) slider value.
    fn slider_value(&self, slider: SliderId) -> Result<f64, GuiError>;

    /// Register a handler for slider changes.
    fn on_update(&mut self, slider: SliderId, handler: EventHandler) -> Result<(), GuiError>;

    /// Register a handler for button clicks.
    fn on_click(&mut self, button: ButtonId, handler: EventHandler) -> Result<(), GuiError>;
}
