//! In-process GUI: a widget registry plus a sequential event dispatcher.

use crate::gui::{
    ButtonId, EventHandler, FolderId, GuiApi, GuiError, GuiEvent, GuiInput, SliderConfig,
    SliderId, Theme,
};
use std::collections::HashMap;
use std::sync::mpsc::Receiver;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq)]
enum WidgetKind {
    Slider { config: SliderConfig, value: f64 },
    Button,
}

impl WidgetKind {
    fn name(&self) -> &'static str {
        match self {
            WidgetKind::Slider { .. } => "slider",
            WidgetKind::Button => "button",
        }
    }
}

#[derive(Debug, Clone)]
struct Widget {
    label: String,
    folder: Option<FolderId>,
    kind: WidgetKind,
}

/// GUI implementation that keeps widget state in memory and runs handlers on
/// the calling thread.
#[derive(Default)]
pub struct LocalGui {
    theme: Theme,
    folders: Vec<String>,
    widgets: Vec<Widget>,
    handlers: HashMap<usize, Vec<EventHandler>>,
}

impl LocalGui {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn slider_config(&self, slider: SliderId) -> Result<SliderConfig, GuiError> {
        match self.widget(slider.0)?.kind {
            WidgetKind::Slider { config, .. } => Ok(config),
            kind => Err(wrong_kind(slider.0, "slider", kind)),
        }
    }

    /// Apply one user input: update widget state, then run its handlers.
    pub fn apply(&mut self, input: GuiInput) -> Result<(), GuiError> {
        let event = match input {
            GuiInput::SetSlider { slider, value } => {
                let widget = self.widget_mut(slider.0)?;
                let value = match &mut widget.kind {
                    WidgetKind::Slider { config, value: current } => {
                        *current = config.constrain(value);
                        *current
                    }
                    kind => return Err(wrong_kind(slider.0, "slider", *kind)),
                };
                debug!(
                    "Slider '{}' set to {}",
                    self.widget_path(slider.0).unwrap_or_default(),
                    value
                );
                GuiEvent::SliderChanged { slider, value }
            }
            GuiInput::Click { button } => {
                let widget = self.widget(button.0)?;
                if widget.kind != WidgetKind::Button {
                    return Err(wrong_kind(button.0, "button", widget.kind));
                }
                debug!(
                    "Button '{}' clicked",
                    self.widget_path(button.0).unwrap_or_default()
                );
                GuiEvent::ButtonClicked { button }
            }
        };
        self.dispatch(&event)
    }

    /// Run every handler registered on the event's source, in registration
    /// order. The first failure stops dispatch and is returned.
    pub fn dispatch(&mut self, event: &GuiEvent) -> Result<(), GuiError> {
        let source = match event {
            GuiEvent::SliderChanged { slider, .. } => slider.0,
            GuiEvent::ButtonClicked { button } => button.0,
        };
        if let Some(handlers) = self.handlers.get_mut(&source) {
            for handler in handlers.iter_mut() {
                handler(event)?;
            }
        }
        Ok(())
    }

    /// Process inputs until every sender is dropped.
    pub fn run(&mut self, inputs: Receiver<GuiInput>) -> Result<(), GuiError> {
        for input in inputs.iter() {
            self.apply(input)?;
        }
        info!("GUI input channel closed");
        Ok(())
    }

    fn widget(&self, index: usize) -> Result<&Widget, GuiError> {
        self.widgets
            .get(index)
            .ok_or(GuiError::UnknownWidget(index))
    }

    fn widget_mut(&mut self, index: usize) -> Result<&mut Widget, GuiError> {
        self.widgets
            .get_mut(index)
            .ok_or(GuiError::UnknownWidget(index))
    }

    /// `Folder/Label` path of a widget, for logs.
    fn widget_path(&self, index: usize) -> Option<String> {
        let widget = self.widgets.get(index)?;
        match widget.folder.and_then(|f| self.folders.get(f.0)) {
            Some(folder) => Some(format!("{}/{}", folder, widget.label)),
            None => Some(widget.label.clone()),
        }
    }

    fn push_widget(&mut self, folder: Option<FolderId>, label: &str, kind: WidgetKind) -> usize {
        self.widgets.push(Widget {
            label: label.to_string(),
            folder,
            kind,
        });
        self.widgets.len() - 1
    }
}

fn wrong_kind(index: usize, expected: &'static str, found: WidgetKind) -> GuiError {
    GuiError::WrongWidgetKind {
        index,
        expected,
        found: found.name(),
    }
}

impl GuiApi for LocalGui {
    fn configure_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    fn add_folder(&mut self, label: &str) -> FolderId {
        self.folders.push(label.to_string());
        FolderId(self.folders.len() - 1)
    }

    fn add_slider(
        &mut self,
        folder: Option<FolderId>,
        label: &str,
        config: SliderConfig,
    ) -> SliderId {
        let value = config.initial_value.clamp(config.min, config.max);
        SliderId(self.push_widget(folder, label, WidgetKind::Slider { config, value }))
    }

    fn add_button(&mut self, folder: Option<FolderId>, label: &str) -> ButtonId {
        ButtonId(self.push_widget(folder, label, WidgetKind::Button))
    }

    fn slider_value(&self, slider: SliderId) -> Result<f64, GuiError> {
        match self.widget(slider.0)?.kind {
            WidgetKind::Slider { value, .. } => Ok(value),
            kind => Err(wrong_kind(slider.0, "slider", kind)),
        }
    }

    fn on_update(&mut self, slider: SliderId, handler: EventHandler) -> Result<(), GuiError> {
        self.slider_config(slider)?;
        self.handlers.entry(slider.0).or_default().push(handler);
        Ok(())
    }

    fn on_click(&mut self, button: ButtonId, handler: EventHandler) -> Result<(), GuiError> {
        let kind = self.widget(button.0)?.kind;
        if kind != WidgetKind::Button {
            return Err(wrong_kind(button.0, "button", kind));
        }
        self.handlers.entry(button.0).or_default().push(handler);
        Ok(())
    }
}
