//! Heading reconciliation
//!
//! Combines the normalized device heading and the resolved Qibla bearing
//! into the values the compass UI renders: the marker rotation, the folded
//! angular separation, and the aligned indicator.

use crate::angle::{normalize_degrees, shortest_arc};
use serde::{Deserialize, Serialize};

/// Default angular threshold for the aligned indicator, in degrees.
///
/// Editorial choice carried as configuration, not logic; see
/// [`crate::config::AppConfig::alignment_threshold`].
pub const DEFAULT_ALIGNMENT_THRESHOLD: f64 = 10.0;

/// Result of reconciling a heading against a bearing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Alignment {
    /// Rotation for the destination marker, `normalize(B - H)`
    pub relative: f64,
    /// Shortest angular separation, [0, 180]
    pub angle_diff: f64,
    /// Separation within threshold AND permission granted
    pub aligned: bool,
}

/// Reconciler producing render values from heading and bearing
pub struct HeadingReconciler;

impl HeadingReconciler {
    /// Reconcile a heading and bearing, both in degrees.
    ///
    /// `permission_granted` gates the aligned indicator: without live
    /// orientation data the heading defaults to 0, which would otherwise
    /// produce spurious alignment.
    pub fn reconcile(
        heading: f64,
        bearing: f64,
        threshold: f64,
        permission_granted: bool,
    ) -> Alignment {
        let heading = normalize_degrees(heading);
        let bearing = normalize_degrees(bearing);

        let relative = normalize_degrees(bearing - heading);
        let angle_diff = shortest_arc(heading, bearing);

        Alignment {
            relative,
            angle_diff,
            aligned: angle_diff <= threshold && permission_granted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_rotation() {
        let a = HeadingReconciler::reconcile(90.0, 135.0, DEFAULT_ALIGNMENT_THRESHOLD, true);
        assert!((a.relative - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_wraparound_diff() {
        // H=350, B=10 is 20 degrees apart, not 340
        let a = HeadingReconciler::reconcile(350.0, 10.0, DEFAULT_ALIGNMENT_THRESHOLD, true);
        assert!((a.angle_diff - 20.0).abs() < 1e-9);
        assert!(!a.aligned);
    }

    #[test]
    fn test_aligned_within_threshold() {
        let a = HeadingReconciler::reconcile(132.0, 136.0, DEFAULT_ALIGNMENT_THRESHOLD, true);
        assert!(a.aligned);
    }

    #[test]
    fn test_permission_gates_alignment() {
        // Same angles, permission not granted: no alignment
        let a = HeadingReconciler::reconcile(132.0, 136.0, DEFAULT_ALIGNMENT_THRESHOLD, false);
        assert!((a.angle_diff - 4.0).abs() < 1e-9);
        assert!(!a.aligned);
    }

    #[test]
    fn test_exact_threshold_is_aligned() {
        let a = HeadingReconciler::reconcile(0.0, 10.0, DEFAULT_ALIGNMENT_THRESHOLD, true);
        assert!(a.aligned);
    }

    #[test]
    fn test_unnormalized_inputs_accepted() {
        let a = HeadingReconciler::reconcile(-10.0, 370.0, DEFAULT_ALIGNMENT_THRESHOLD, true);
        assert!((a.angle_diff - 20.0).abs() < 1e-9);
    }
}
