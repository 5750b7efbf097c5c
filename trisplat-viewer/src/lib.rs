//! Trisplat Viewer Crate
//!
//! Contracts for the two collaborators the viewer drives, and in-process
//! implementations of both:
//!
//! - [`SceneApi`]: owns the triangle splat object and the connected clients.
//!   Attributes change only through [`SceneApi::update`].
//! - [`GuiApi`]: folders, sliders and buttons whose handlers run sequentially.
//!
//! [`LocalScene`] and [`LocalGui`] keep everything in host memory; they do
//! not render.

mod camera;
pub mod gui;
pub mod local;
pub mod scene;

pub use camera::CameraPose;
pub use gui::{
    ButtonId, EventHandler, FolderId, GuiApi, GuiError, GuiEvent, GuiInput, SliderConfig,
    SliderId, Theme,
};
pub use local::{LocalGui, LocalScene};
pub use scene::{ClientId, SceneApi, SceneError, SplatHandle, SplatUpdate};
