//! In-process collaborators used by the binary and by tests.

mod gui;
mod scene;

pub use gui::LocalGui;
pub use scene::{FrameNode, LocalScene, SplatNode};
