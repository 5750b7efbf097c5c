//! In-process scene that keeps attribute buffers on the host.

use crate::camera::CameraPose;
use crate::scene::{ClientId, SceneApi, SceneError, SplatHandle, SplatUpdate};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};
use trisplat_data::RenderableAttributes;

/// A triangle splat object held by [`LocalScene`].
#[derive(Debug, Clone)]
pub struct SplatNode {
    pub name: String,
    pub attributes: RenderableAttributes,
    /// Bumped on every accepted update.
    pub revision: u64,
}

/// A coordinate frame gizmo held by [`LocalScene`].
#[derive(Debug, Clone, PartialEq)]
pub struct FrameNode {
    pub name: String,
    pub axes_length: f32,
    pub axes_radius: f32,
}

/// Scene implementation that validates and records pushes without rendering.
#[derive(Debug, Default)]
pub struct LocalScene {
    names: HashSet<String>,
    splats: Vec<SplatNode>,
    frames: Vec<FrameNode>,
    clients: BTreeMap<ClientId, CameraPose>,
    next_client: u32,
}

impl LocalScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a viewing client with an initial camera.
    pub fn connect_client(&mut self, pose: CameraPose) -> ClientId {
        let id = ClientId(self.next_client);
        self.next_client += 1;
        self.clients.insert(id, pose);
        info!("{} connected", id);
        id
    }

    pub fn client_camera(&self, client: ClientId) -> Option<CameraPose> {
        self.clients.get(&client).copied()
    }

    pub fn splat(&self, handle: SplatHandle) -> Option<&SplatNode> {
        self.splats.get(handle.0)
    }

    pub fn frames(&self) -> &[FrameNode] {
        &self.frames
    }

    fn claim_name(&mut self, name: &str) -> Result<(), SceneError> {
        if !self.names.insert(name.to_string()) {
            return Err(SceneError::DuplicateName(name.to_string()));
        }
        Ok(())
    }
}

fn check_len(attribute: &'static str, expected: usize, found: usize) -> Result<(), SceneError> {
    if expected != found {
        return Err(SceneError::LengthMismatch {
            attribute,
            expected,
            found,
        });
    }
    Ok(())
}

fn check_sigma(sigma: f64) -> Result<(), SceneError> {
    if !(sigma.is_finite() && sigma > 0.0) {
        return Err(SceneError::InvalidValue {
            attribute: "sigma",
            value: sigma,
        });
    }
    Ok(())
}

impl SceneApi for LocalScene {
    fn add_triangle_splats(
        &mut self,
        name: &str,
        attributes: RenderableAttributes,
    ) -> Result<SplatHandle, SceneError> {
        let vertex_count = attributes.vertex_count();
        check_len("opacities", vertex_count, attributes.opacities.len())?;
        check_len("vertex_weights", vertex_count, attributes.vertex_weights.len())?;
        check_len("colors", vertex_count, attributes.colors.vertex_count())?;
        check_sigma(attributes.sigma)?;
        if let Some(bad) = attributes
            .triangle_indices
            .iter()
            .flatten()
            .find(|&&i| i as usize >= vertex_count)
        {
            return Err(SceneError::LengthMismatch {
                attribute: "triangle_indices",
                expected: vertex_count,
                found: *bad as usize + 1,
            });
        }
        self.claim_name(name)?;

        let position_bytes = bytemuck::cast_slice::<_, u8>(&attributes.vertices).len();
        let index_bytes = bytemuck::cast_slice::<_, u8>(&attributes.triangle_indices).len();
        info!(
            "Added triangle splats '{}': {} vertices, {} triangles, {} colors, {} bytes of geometry, {} bytes of color",
            name,
            vertex_count,
            attributes.triangle_count(),
            attributes.colors.mode(),
            position_bytes + index_bytes,
            attributes.colors.byte_len()
        );

        let handle = SplatHandle(self.splats.len());
        self.splats.push(SplatNode {
            name: name.to_string(),
            attributes,
            revision: 0,
        });
        Ok(handle)
    }

    fn update(&mut self, handle: SplatHandle, update: SplatUpdate) -> Result<(), SceneError> {
        let node = self
            .splats
            .get_mut(handle.0)
            .ok_or(SceneError::UnknownHandle(handle))?;
        let field = update.field();

        match update {
            SplatUpdate::Sigma(sigma) => {
                check_sigma(sigma)?;
                node.attributes.sigma = sigma;
            }
            SplatUpdate::Opacities(opacities) => {
                check_len("opacities", node.attributes.vertex_count(), opacities.len())?;
                node.attributes.opacities = opacities;
            }
        }

        node.revision += 1;
        debug!("'{}' {} updated (revision {})", node.name, field, node.revision);
        Ok(())
    }

    fn add_frame(
        &mut self,
        name: &str,
        axes_length: f32,
        axes_radius: f32,
    ) -> Result<(), SceneError> {
        self.claim_name(name)?;
        self.frames.push(FrameNode {
            name: name.to_string(),
            axes_length,
            axes_radius,
        });
        debug!("Added frame '{}'", name);
        Ok(())
    }

    fn clients(&self) -> Vec<ClientId> {
        self.clients.keys().copied().collect()
    }

    fn set_client_camera(&mut self, client: ClientId, pose: CameraPose) -> Result<(), SceneError> {
        let camera = self
            .clients
            .get_mut(&client)
            .ok_or(SceneError::UnknownClient(client))?;
        *camera = pose;
        debug!("{} camera moved to {:?}", client, pose);
        Ok(())
    }
}
