//! Renderer-facing attribute buffers derived from a checkpoint.

use crate::color::sh_dc_to_rgb8;
use crate::types::{ShCoefficients, SplatCheckpoint};
use glam::Vec3;
use std::fmt;

/// How vertex colors are handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// Pass SH coefficients through for view-dependent shading.
    #[default]
    SphericalHarmonics,
    /// Bake the DC term into 8-bit RGB and drop higher-order coefficients.
    Direct,
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorMode::SphericalHarmonics => write!(f, "spherical harmonics"),
            ColorMode::Direct => write!(f, "direct RGB"),
        }
    }
}

/// Color representation of a splat object. Exactly one variant is used for
/// the lifetime of an object.
#[derive(Debug, Clone, PartialEq)]
pub enum SplatColors {
    SphericalHarmonics {
        features_dc: Vec<Vec3>,
        features_rest: ShCoefficients,
        sh_degree: u32,
    },
    Direct {
        colors: Vec<[u8; 3]>,
    },
}

impl SplatColors {
    pub fn mode(&self) -> ColorMode {
        match self {
            SplatColors::SphericalHarmonics { .. } => ColorMode::SphericalHarmonics,
            SplatColors::Direct { .. } => ColorMode::Direct,
        }
    }

    /// Number of vertices the colors cover.
    pub fn vertex_count(&self) -> usize {
        match self {
            SplatColors::SphericalHarmonics { features_dc, .. } => features_dc.len(),
            SplatColors::Direct { colors } => colors.len(),
        }
    }

    /// Size of the color payload sent to the renderer.
    pub fn byte_len(&self) -> usize {
        match self {
            SplatColors::SphericalHarmonics {
                features_dc,
                features_rest,
                ..
            } => {
                bytemuck::cast_slice::<Vec3, u8>(features_dc).len()
                    + bytemuck::cast_slice::<f32, u8>(features_rest.as_flat()).len()
            }
            SplatColors::Direct { colors } => bytemuck::cast_slice::<[u8; 3], u8>(colors).len(),
        }
    }
}

/// Attribute buffers consumed by a scene's triangle splat primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderableAttributes {
    pub vertices: Vec<Vec3>,
    pub triangle_indices: Vec<[u32; 3]>,
    /// Per-vertex opacity (V).
    pub opacities: Vec<f64>,
    /// Edge softness, linear domain.
    pub sigma: f64,
    /// Raw weights, retained for recomputing opacities.
    pub vertex_weights: Vec<f64>,
    pub colors: SplatColors,
}

impl RenderableAttributes {
    /// Derive renderer inputs from a loaded checkpoint.
    pub fn from_checkpoint(checkpoint: &SplatCheckpoint, mode: ColorMode) -> Self {
        let colors = match mode {
            ColorMode::SphericalHarmonics => SplatColors::SphericalHarmonics {
                features_dc: checkpoint.features_dc.clone(),
                features_rest: checkpoint.features_rest.clone(),
                sh_degree: checkpoint.sh_degree,
            },
            ColorMode::Direct => SplatColors::Direct {
                colors: sh_dc_to_rgb8(&checkpoint.features_dc),
            },
        };

        Self {
            vertices: checkpoint.vertices.clone(),
            triangle_indices: checkpoint.triangle_indices.clone(),
            opacities: checkpoint.opacities.clone(),
            sigma: checkpoint.sigma.exp(),
            vertex_weights: checkpoint.vertex_weight.clone(),
            colors,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangle_indices.len()
    }
}
