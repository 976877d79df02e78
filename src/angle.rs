//! Degree arithmetic
//!
//! Every heading and bearing in Mihrab is a compass angle in degrees.
//! This module owns the two operations everything else builds on:
//! normalization into [0, 360) and folding into the shortest arc [0, 180].

/// Normalize an angle in degrees into [0, 360).
///
/// Periodic: `normalize_degrees(x) == normalize_degrees(x + 360.0 * k)`
/// for any integer `k`.
pub fn normalize_degrees(deg: f64) -> f64 {
    ((deg % 360.0) + 360.0) % 360.0
}

/// Shortest angular separation between two compass angles, in [0, 180].
///
/// Symmetric in its arguments. Inputs need not be pre-normalized.
pub fn shortest_arc(a: f64, b: f64) -> f64 {
    let diff = (a - b).abs() % 360.0;
    if diff > 180.0 {
        360.0 - diff
    } else {
        diff
    }
}
