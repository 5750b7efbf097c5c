//! Checkpoint container parsing and loading

mod error;
mod loader;
mod tensor;

pub use error::LoadError;
pub use loader::{
    DEFAULT_CHECKPOINT_PATH, KEY_ACTIVE_SH_DEGREE, KEY_FEATURES_DC, KEY_FEATURES_REST, KEY_POINTS,
    KEY_SIGMA, KEY_TRIANGLE_INDICES, KEY_VERTEX_WEIGHT, checkpoint_from_dict, load_checkpoint,
};
pub use tensor::{DType, Tensor, TensorDict};
