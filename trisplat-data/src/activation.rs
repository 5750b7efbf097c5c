//! Activation functions mapping raw checkpoint parameters to render values.

/// Opacity floor applied when a checkpoint is first loaded.
pub const DEFAULT_OPACITY_FLOOR: f64 = 0.9999;

/// Logistic sigmoid, `1 / (1 + e^-x)`.
///
/// Saturates to 0 or 1 for large |x|; `exp` overflowing to infinity is fine here.
#[inline]
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Map raw per-vertex weights to opacities in `[opacity_floor, 1]`.
///
/// Output has the same length as the input.
pub fn opacity_activation(vertex_weight: &[f64], opacity_floor: f64) -> Vec<f64> {
    let span = 1.0 - opacity_floor;
    vertex_weight
        .iter()
        .map(|&w| opacity_floor + span * sigmoid(w))
        .collect()
}

/// Convert a percent-valued control into an opacity floor fraction.
#[inline]
pub fn opacity_floor_from_percent(percent: f64) -> f64 {
    percent / 100.0
}
