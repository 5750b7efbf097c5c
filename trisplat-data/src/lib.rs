//! Trisplat Data Crate
//!
//! Checkpoint loading and attribute derivation for triangle splats.
//! This crate is GPU-agnostic: it produces host-side buffers that a scene
//! collaborator uploads and renders.

pub mod activation;
pub mod attributes;
pub mod checkpoint;
pub mod color;
pub mod types;

pub use activation::{
    DEFAULT_OPACITY_FLOOR, opacity_activation, opacity_floor_from_percent, sigmoid,
};
pub use attributes::{ColorMode, RenderableAttributes, SplatColors};
pub use checkpoint::{DEFAULT_CHECKPOINT_PATH, LoadError, TensorDict, load_checkpoint};
pub use color::{SH_C0, sh_dc_to_rgb8};
pub use types::{FIXED_SH_DEGREE, ShCoefficients, SplatCheckpoint};
