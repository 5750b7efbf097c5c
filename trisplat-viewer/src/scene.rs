//! Scene collaborator contract.
//!
//! The scene owns the renderable triangle splat primitive and the set of
//! connected clients. Callers only hold opaque handles and push changes
//! through [`SceneApi::update`]; a successful update is visible to clients.

use crate::camera::CameraPose;
use std::fmt;
use thiserror::Error;
use trisplat_data::RenderableAttributes;

/// Opaque handle to a triangle splat object in a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SplatHandle(pub(crate) usize);

/// Identifier of a connected viewing client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(pub u32);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client#{}", self.0)
    }
}

/// A single attribute replacement on a live splat object.
#[derive(Debug, Clone, PartialEq)]
pub enum SplatUpdate {
    /// Edge softness, linear domain.
    Sigma(f64),
    /// Full per-vertex opacity buffer. Replaces the previous buffer wholesale.
    Opacities(Vec<f64>),
}

impl SplatUpdate {
    pub fn field(&self) -> &'static str {
        match self {
            SplatUpdate::Sigma(_) => "sigma",
            SplatUpdate::Opacities(_) => "opacities",
        }
    }
}

/// Errors raised by a scene when creating or updating objects.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("A scene node named '{0}' already exists")]
    DuplicateName(String),

    #[error("Unknown splat handle {0:?}")]
    UnknownHandle(SplatHandle),

    #[error("Unknown client {0}")]
    UnknownClient(ClientId),

    #[error("Attribute '{attribute}' has {found} entries, expected {expected}")]
    LengthMismatch {
        attribute: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Attribute '{attribute}' has invalid value {value}")]
    InvalidValue { attribute: &'static str, value: f64 },
}

/// Operations the viewer needs from a scene implementation.
pub trait SceneApi {
    /// Add a triangle splat object and return a handle for later updates.
    fn add_triangle_splats(
        &mut self,
        name: &str,
        attributes: RenderableAttributes,
    ) -> Result<SplatHandle, SceneError>;

    /// Replace one attribute of a live splat object.
    fn update(&mut self, handle: SplatHandle, update: SplatUpdate) -> Result<(), SceneError>;

    /// Add a static coordinate frame gizmo.
    fn add_frame(&mut self, name: &str, axes_length: f32, axes_radius: f32)
    -> Result<(), SceneError>;

    /// Clients connected at the time of the call.
    fn clients(&self) -> Vec<ClientId>;

    /// Move a client's camera.
    fn set_client_camera(&mut self, client: ClientId, pose: CameraPose) -> Result<(), SceneError>;
}
