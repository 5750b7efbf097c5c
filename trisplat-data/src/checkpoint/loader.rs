//! Checkpoint loading functions

use crate::activation::{DEFAULT_OPACITY_FLOOR, opacity_activation};
use crate::checkpoint::{LoadError, Tensor, TensorDict};
use crate::types::{
    FIXED_SH_DEGREE, ShCoefficients, SplatCheckpoint, rest_coefficients_for_degree,
};
use glam::Vec3;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Checkpoint location used when none is given on the command line.
pub const DEFAULT_CHECKPOINT_PATH: &str = "data/point_cloud_state_dict.json";

pub const KEY_POINTS: &str = "triangles_points";
pub const KEY_TRIANGLE_INDICES: &str = "_triangle_indices";
pub const KEY_VERTEX_WEIGHT: &str = "vertex_weight";
pub const KEY_SIGMA: &str = "sigma";
pub const KEY_ACTIVE_SH_DEGREE: &str = "active_sh_degree";
pub const KEY_FEATURES_DC: &str = "features_dc";
pub const KEY_FEATURES_REST: &str = "features_rest";

/// Load a triangle splat checkpoint from disk.
///
/// Opacities are derived once here with [`DEFAULT_OPACITY_FLOOR`]; the raw
/// weights are kept alongside them.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn load_checkpoint(path: &Path) -> Result<SplatCheckpoint, LoadError> {
    info!("Loading triangle splats from {}", path.display());
    let start = Instant::now();

    let dict = TensorDict::open(path)?;
    debug!("Checkpoint container holds {} tensors", dict.len());
    let checkpoint = checkpoint_from_dict(&dict)?;

    info!("Loaded in {:.2} seconds", start.elapsed().as_secs_f64());
    info!("  Vertices: {}", checkpoint.vertex_count());
    info!("  Triangles: {}", checkpoint.triangle_count());
    info!("  SH degree: {}", checkpoint.active_sh_degree);
    info!("  Sigma: {}", checkpoint.sigma);

    Ok(checkpoint)
}

/// Build a checkpoint from an already parsed tensor dictionary.
pub fn checkpoint_from_dict(dict: &TensorDict) -> Result<SplatCheckpoint, LoadError> {
    let vertices = vec3_rows(KEY_POINTS, dict.require(KEY_POINTS)?)?;
    let vertex_count = vertices.len();

    let triangle_indices = index_rows(
        KEY_TRIANGLE_INDICES,
        dict.require(KEY_TRIANGLE_INDICES)?,
        vertex_count,
    )?;

    let vertex_weight = per_vertex_scalars(KEY_VERTEX_WEIGHT, dict.require(KEY_VERTEX_WEIGHT)?)?;
    expect_vertex_count(KEY_VERTEX_WEIGHT, vertex_weight.len(), vertex_count)?;

    let sigma = scalar(KEY_SIGMA, dict.require(KEY_SIGMA)?)?;
    let active_sh_degree = non_negative_integer(
        KEY_ACTIVE_SH_DEGREE,
        scalar(KEY_ACTIVE_SH_DEGREE, dict.require(KEY_ACTIVE_SH_DEGREE)?)?,
    )?;

    let features_dc = sh_rows(KEY_FEATURES_DC, dict.require(KEY_FEATURES_DC)?)?;
    if features_dc.per_vertex != 1 {
        return Err(shape_error(
            KEY_FEATURES_DC,
            "[V, 1, 3]",
            dict.require(KEY_FEATURES_DC)?,
        ));
    }
    expect_vertex_count(KEY_FEATURES_DC, features_dc.coefficients.len(), vertex_count)?;

    let features_rest = sh_rows(KEY_FEATURES_REST, dict.require(KEY_FEATURES_REST)?)?;
    let rest_vertices = if features_rest.per_vertex == 0 {
        dict.require(KEY_FEATURES_REST)?.shape()[0]
    } else {
        features_rest.vertex_count()
    };
    expect_vertex_count(KEY_FEATURES_REST, rest_vertices, vertex_count)?;

    if active_sh_degree != FIXED_SH_DEGREE {
        warn!(
            "Checkpoint reports active SH degree {}, rendering with degree {}",
            active_sh_degree, FIXED_SH_DEGREE
        );
    }
    let needed = rest_coefficients_for_degree(FIXED_SH_DEGREE);
    if features_rest.per_vertex < needed {
        warn!(
            "features_rest has {} coefficient rows per vertex, degree {} expects {}",
            features_rest.per_vertex, FIXED_SH_DEGREE, needed
        );
    }

    let opacities = opacity_activation(&vertex_weight, DEFAULT_OPACITY_FLOOR);

    Ok(SplatCheckpoint {
        vertices,
        triangle_indices,
        vertex_weight,
        opacities,
        sigma,
        active_sh_degree,
        sh_degree: FIXED_SH_DEGREE,
        features_dc: features_dc.coefficients,
        features_rest,
    })
}

fn shape_error(field: &'static str, expected: &str, tensor: &Tensor) -> LoadError {
    LoadError::Shape {
        field,
        expected: expected.to_string(),
        found: tensor.shape().to_vec(),
    }
}

fn expect_vertex_count(field: &'static str, found: usize, expected: usize) -> Result<(), LoadError> {
    if found != expected {
        return Err(LoadError::VertexCountMismatch {
            field,
            expected,
            found,
        });
    }
    Ok(())
}

/// `[N, 3]` float rows.
fn vec3_rows(field: &'static str, tensor: &Tensor) -> Result<Vec<Vec3>, LoadError> {
    match tensor.shape() {
        [_, 3] => Ok(tensor
            .data()
            .chunks_exact(3)
            .map(|c| Vec3::new(c[0] as f32, c[1] as f32, c[2] as f32))
            .collect()),
        _ => Err(shape_error(field, "[V, 3]", tensor)),
    }
}

/// `[T, 3]` integer rows, each entry a valid vertex index.
fn index_rows(
    field: &'static str,
    tensor: &Tensor,
    vertex_count: usize,
) -> Result<Vec<[u32; 3]>, LoadError> {
    if !matches!(tensor.shape(), [_, 3]) {
        return Err(shape_error(field, "[T, 3]", tensor));
    }
    if !tensor.dtype().is_integer() {
        debug!("{} stored as {:?}, converting to integer indices", field, tensor.dtype());
    }

    let mut triangles = Vec::with_capacity(tensor.len() / 3);
    for (triangle, row) in tensor.data().chunks_exact(3).enumerate() {
        let mut indices = [0u32; 3];
        for (slot, &value) in indices.iter_mut().zip(row) {
            if value.fract() != 0.0 {
                return Err(LoadError::InvalidValue {
                    field,
                    reason: format!("triangle {triangle} has non-integer index {value}"),
                });
            }
            let index = value as i64;
            if index < 0 || index as usize >= vertex_count {
                return Err(LoadError::IndexOutOfRange {
                    triangle,
                    index,
                    vertex_count,
                });
            }
            *slot = index as u32;
        }
        triangles.push(indices);
    }
    Ok(triangles)
}

/// `[V]` or `[V, 1]`, flattened.
fn per_vertex_scalars(field: &'static str, tensor: &Tensor) -> Result<Vec<f64>, LoadError> {
    match tensor.shape() {
        [_] | [_, 1] => Ok(tensor.data().to_vec()),
        _ => Err(shape_error(field, "[V] or [V, 1]", tensor)),
    }
}

/// Any single-element tensor.
fn scalar(field: &'static str, tensor: &Tensor) -> Result<f64, LoadError> {
    match tensor.data() {
        [value] => Ok(*value),
        _ => Err(shape_error(field, "a single element", tensor)),
    }
}

fn non_negative_integer(field: &'static str, value: f64) -> Result<u32, LoadError> {
    if value < 0.0 || value.fract() != 0.0 || value > u32::MAX as f64 {
        return Err(LoadError::InvalidValue {
            field,
            reason: format!("expected a non-negative integer, found {value}"),
        });
    }
    Ok(value as u32)
}

/// `[V, D, 3]` SH coefficient rows.
fn sh_rows(field: &'static str, tensor: &Tensor) -> Result<ShCoefficients, LoadError> {
    match *tensor.shape() {
        [_, per_vertex, 3] => {
            let coefficients = tensor
                .data()
                .chunks_exact(3)
                .map(|c| Vec3::new(c[0] as f32, c[1] as f32, c[2] as f32))
                .collect();
            Ok(ShCoefficients::new(per_vertex, coefficients))
        }
        _ => Err(shape_error(field, "[V, D, 3]", tensor)),
    }
}
