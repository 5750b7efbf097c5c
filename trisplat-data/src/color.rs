//! Direct RGB colors from degree-0 spherical harmonics.

use glam::{DVec3, Vec3};

/// Degree-0 real SH basis constant, `1 / (2 * sqrt(pi))`.
pub const SH_C0: f64 = 0.28209479177387814;

/// Evaluate the DC term of one vertex to a linear RGB color in `[0, 1]`.
/// Evaluated in `f64`.
#[inline]
pub fn sh_dc_to_rgb(dc: Vec3) -> DVec3 {
    (DVec3::splat(0.5) + SH_C0 * dc.as_dvec3()).clamp(DVec3::ZERO, DVec3::ONE)
}

/// Convert per-vertex DC coefficients to 8-bit RGB.
///
/// Values outside `[0, 1]` clamp to 0 or 255; NaN maps to 0.
pub fn sh_dc_to_rgb8(features_dc: &[Vec3]) -> Vec<[u8; 3]> {
    features_dc
        .iter()
        .map(|&dc| {
            let rgb = (sh_dc_to_rgb(dc) * 255.0).round();
            [rgb.x as u8, rgb.y as u8, rgb.z as u8]
        })
        .collect()
}
