//! Error types for the viewer application.

use thiserror::Error;
use trisplat_data::LoadError;
use trisplat_viewer::{GuiError, SceneError};

/// Errors that end the application.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Checkpoint loading error: {0}")]
    Load(#[from] LoadError),

    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    #[error("GUI error: {0}")]
    Gui(#[from] GuiError),
}
