//! Core data types for triangle splat checkpoints.
//!
//! These are CPU-side representations. Renderer-facing buffers are derived
//! from them in [`crate::attributes`].

use glam::Vec3;

/// SH degree handed to the renderer regardless of checkpoint metadata.
///
/// `active_sh_degree` from the checkpoint is logged but not used. A checkpoint
/// whose `features_rest` holds fewer than 15 rows per vertex will not match
/// this degree; the loader warns in that case.
pub const FIXED_SH_DEGREE: u32 = 3;

/// Number of non-DC coefficient rows needed per vertex for an SH degree.
pub fn rest_coefficients_for_degree(degree: u32) -> usize {
    let n = degree as usize + 1;
    n * n - 1
}

/// Higher-order SH coefficients, `per_vertex` RGB rows for each vertex.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShCoefficients {
    /// Coefficient rows per vertex (D).
    pub per_vertex: usize,
    /// Row-major `V * D` RGB triples.
    pub coefficients: Vec<Vec3>,
}

impl ShCoefficients {
    pub fn new(per_vertex: usize, coefficients: Vec<Vec3>) -> Self {
        Self {
            per_vertex,
            coefficients,
        }
    }

    /// Flat `f32` view suitable for a GPU upload.
    pub fn as_flat(&self) -> &[f32] {
        bytemuck::cast_slice(&self.coefficients)
    }

    /// Number of vertices covered.
    pub fn vertex_count(&self) -> usize {
        if self.per_vertex == 0 {
            0
        } else {
            self.coefficients.len() / self.per_vertex
        }
    }
}

/// A loaded triangle splat checkpoint. Immutable after loading.
#[derive(Debug, Clone, PartialEq)]
pub struct SplatCheckpoint {
    /// Vertex positions (V).
    pub vertices: Vec<Vec3>,
    /// Vertex index triples (T), each index `< V`.
    pub triangle_indices: Vec<[u32; 3]>,
    /// Raw, unbounded per-vertex weights. Kept so opacities can be
    /// re-derived at a different floor.
    pub vertex_weight: Vec<f64>,
    /// Opacities derived at load time with the default floor (V).
    pub opacities: Vec<f64>,
    /// Edge softness in log domain.
    pub sigma: f64,
    /// SH degree recorded by the checkpoint. Informational only.
    pub active_sh_degree: u32,
    /// SH degree handed to the renderer, always [`FIXED_SH_DEGREE`].
    pub sh_degree: u32,
    /// Degree-0 SH coefficients, one RGB triple per vertex.
    pub features_dc: Vec<Vec3>,
    /// Higher-order SH coefficients.
    pub features_rest: ShCoefficients,
}

impl SplatCheckpoint {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangle_indices.len()
    }
}
