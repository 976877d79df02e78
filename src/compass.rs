//! Compass orchestration
//!
//! Stateful processor tying the pipeline together: permission flow,
//! last-write-wins heading from orientation samples, independently
//! resolved bearing, and frame snapshots for the rendering layer.
//!
//! The bearing fetch and the permission request may race; both sides hold
//! neutral defaults (bearing 0, heading 0) until resolved, so either order
//! produces a renderable frame.

use crate::orientation::{OrientationNormalizer, OrientationSample};
use crate::reconciler::{HeadingReconciler, DEFAULT_ALIGNMENT_THRESHOLD};
use crate::types::{CompassFrame, PermissionState};
use chrono::Utc;
use uuid::Uuid;

/// Stateful compass processor for one view session
pub struct CompassProcessor {
    session_id: String,
    permission: PermissionState,
    heading: Option<f64>,
    bearing: f64,
    threshold: f64,
}

impl Default for CompassProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl CompassProcessor {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            permission: PermissionState::NotRequested,
            heading: None,
            bearing: 0.0,
            threshold: DEFAULT_ALIGNMENT_THRESHOLD,
        }
    }

    /// Use a configured alignment threshold instead of the default
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn permission(&self) -> PermissionState {
        self.permission
    }

    /// Opening the compass view issues a permission request unless one is
    /// already granted or in flight. Returns whether the platform prompt
    /// should be shown.
    pub fn open_view(&mut self) -> bool {
        self.permission.request()
    }

    pub fn grant_permission(&mut self) {
        self.permission.grant();
    }

    pub fn deny_permission(&mut self) {
        self.permission.deny();
    }

    /// Whether the orientation event listener should currently be attached.
    ///
    /// The listener is removed whenever permission moves away from
    /// `Granted`, so listeners never leak across navigations.
    pub fn listener_active(&self) -> bool {
        self.permission.is_granted()
    }

    /// Apply one orientation sample, last-write-wins.
    ///
    /// Samples are ignored unless permission is granted (no listener would
    /// exist). A sample without compass data keeps the previous heading.
    /// Returns whether the heading changed.
    pub fn apply(&mut self, sample: &OrientationSample) -> bool {
        if !self.permission.is_granted() {
            return false;
        }

        match OrientationNormalizer::heading(sample) {
            Some(heading) => {
                self.heading = Some(heading);
                true
            }
            None => false,
        }
    }

    /// Store the resolved bearing. Independent of the permission flow.
    pub fn set_bearing(&mut self, bearing: f64) {
        self.bearing = bearing;
    }

    pub fn heading(&self) -> Option<f64> {
        self.heading
    }

    pub fn bearing(&self) -> f64 {
        self.bearing
    }

    /// Snapshot the current state as a renderable frame.
    ///
    /// The heading falls back to 0 until a live sample arrives; the
    /// permission gate in the reconciler keeps that neutral heading from
    /// reporting a spurious alignment.
    pub fn frame(&self) -> CompassFrame {
        let heading = self.heading.unwrap_or(0.0);
        let alignment = HeadingReconciler::reconcile(
            heading,
            self.bearing,
            self.threshold,
            self.permission.is_granted(),
        );

        CompassFrame {
            heading,
            bearing: crate::angle::normalize_degrees(self.bearing),
            relative: alignment.relative,
            angle_diff: alignment.angle_diff,
            aligned: alignment.aligned,
            permission: self.permission,
            live_heading: self.heading.is_some(),
            computed_at: Utc::now(),
            session_id: self.session_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orientation::ScreenRotation;
    use pretty_assertions::assert_eq;

    fn granted_processor() -> CompassProcessor {
        let mut p = CompassProcessor::new();
        p.open_view();
        p.grant_permission();
        p
    }

    #[test]
    fn test_samples_ignored_before_grant() {
        let mut p = CompassProcessor::new();
        p.open_view();
        let sample = OrientationSample::new(Some(120.0), None, ScreenRotation::Deg0);
        assert!(!p.apply(&sample));
        assert_eq!(p.heading(), None);
    }

    #[test]
    fn test_last_write_wins() {
        let mut p = granted_processor();
        p.apply(&OrientationSample::new(Some(100.0), None, ScreenRotation::Deg0));
        p.apply(&OrientationSample::new(Some(200.0), None, ScreenRotation::Deg0));
        assert_eq!(p.heading(), Some(200.0));
    }

    #[test]
    fn test_capability_gap_keeps_previous_heading() {
        let mut p = granted_processor();
        p.apply(&OrientationSample::new(Some(100.0), None, ScreenRotation::Deg0));
        // Device stops reporting compass fields
        assert!(!p.apply(&OrientationSample::new(None, None, ScreenRotation::Deg0)));
        assert_eq!(p.heading(), Some(100.0));
    }

    #[test]
    fn test_frame_neutral_before_any_input() {
        let p = CompassProcessor::new();
        let frame = p.frame();
        assert_eq!(frame.heading, 0.0);
        assert_eq!(frame.bearing, 0.0);
        assert!(!frame.aligned);
        assert!(!frame.live_heading);
    }

    #[test]
    fn test_no_spurious_alignment_without_permission() {
        // Bearing 5, default heading 0: within threshold, but not granted
        let mut p = CompassProcessor::new();
        p.set_bearing(5.0);
        let frame = p.frame();
        assert!(frame.angle_diff <= DEFAULT_ALIGNMENT_THRESHOLD);
        assert!(!frame.aligned);
    }

    #[test]
    fn test_aligned_frame() {
        let mut p = granted_processor();
        p.set_bearing(136.0);
        p.apply(&OrientationSample::new(Some(130.0), None, ScreenRotation::Deg0));
        let frame = p.frame();
        assert!(frame.aligned);
        assert!((frame.relative - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_bearing_and_permission_race_either_order() {
        // Permission first
        let mut p1 = granted_processor();
        p1.apply(&OrientationSample::new(Some(50.0), None, ScreenRotation::Deg0));
        p1.set_bearing(55.0);

        // Bearing first
        let mut p2 = CompassProcessor::new();
        p2.set_bearing(55.0);
        p2.open_view();
        p2.grant_permission();
        p2.apply(&OrientationSample::new(Some(50.0), None, ScreenRotation::Deg0));

        assert_eq!(p1.frame().aligned, p2.frame().aligned);
        assert_eq!(p1.frame().angle_diff, p2.frame().angle_diff);
    }

    #[test]
    fn test_listener_gating() {
        let mut p = CompassProcessor::new();
        assert!(!p.listener_active());
        p.open_view();
        assert!(!p.listener_active());
        p.grant_permission();
        assert!(p.listener_active());
    }
}
