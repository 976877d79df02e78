//! Orientation normalization
//!
//! This module maps raw platform orientation samples to a single normalized
//! compass heading:
//! - Vendor absolute compass field used directly when present
//! - Generic alpha converted via `360 - alpha`
//! - Screen rotation compensated before normalization
//! - Absence of both fields yields no value, not an error

use crate::angle::normalize_degrees;
use crate::error::MihrabError;
use serde::{Deserialize, Serialize};

/// Screen rotation angle of the device display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum ScreenRotation {
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Default for ScreenRotation {
    fn default() -> Self {
        ScreenRotation::Deg0
    }
}

impl ScreenRotation {
    pub fn degrees(self) -> f64 {
        match self {
            ScreenRotation::Deg0 => 0.0,
            ScreenRotation::Deg90 => 90.0,
            ScreenRotation::Deg180 => 180.0,
            ScreenRotation::Deg270 => 270.0,
        }
    }
}

impl TryFrom<i32> for ScreenRotation {
    type Error = MihrabError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ScreenRotation::Deg0),
            90 => Ok(ScreenRotation::Deg90),
            180 => Ok(ScreenRotation::Deg180),
            270 => Ok(ScreenRotation::Deg270),
            other => Err(MihrabError::InvalidScreenRotation(other)),
        }
    }
}

impl From<ScreenRotation> for i32 {
    fn from(rotation: ScreenRotation) -> i32 {
        rotation.degrees() as i32
    }
}

/// One raw orientation sample as delivered by the platform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientationSample {
    /// Vendor-specific absolute compass heading (e.g. iOS Safari's
    /// `webkitCompassHeading`), already in compass convention
    pub compass_heading: Option<f64>,
    /// Generic device rotation around the z-axis, in rotation convention
    pub alpha: Option<f64>,
    /// Current screen rotation lock angle
    pub screen_rotation: ScreenRotation,
}

impl OrientationSample {
    pub fn new(
        compass_heading: Option<f64>,
        alpha: Option<f64>,
        screen_rotation: ScreenRotation,
    ) -> Self {
        Self {
            compass_heading,
            alpha,
            screen_rotation,
        }
    }
}

/// Normalizer for converting raw orientation samples to compass headings
pub struct OrientationNormalizer;

impl OrientationNormalizer {
    /// Derive the normalized compass heading for a sample.
    ///
    /// Returns `None` when the sample carries neither a vendor compass
    /// field nor an alpha value. That is a normal condition on devices
    /// without the capability; the caller keeps its previous heading.
    pub fn heading(sample: &OrientationSample) -> Option<f64> {
        let raw = match (sample.compass_heading, sample.alpha) {
            (Some(compass), _) => compass,
            // Rotation convention is counter-clockwise; compass is clockwise
            (None, Some(alpha)) => 360.0 - alpha,
            (None, None) => return None,
        };

        Some(normalize_degrees(raw + sample.screen_rotation.degrees()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_vendor_compass_takes_precedence() {
        let sample = OrientationSample::new(Some(42.0), Some(100.0), ScreenRotation::Deg0);
        assert_eq!(OrientationNormalizer::heading(&sample), Some(42.0));
    }

    #[test]
    fn test_alpha_fallback() {
        // alpha=100, screen angle 0 -> 360 - 100 = 260
        let sample = OrientationSample::new(None, Some(100.0), ScreenRotation::Deg0);
        assert_eq!(OrientationNormalizer::heading(&sample), Some(260.0));
    }

    #[test]
    fn test_no_fields_yields_none() {
        let sample = OrientationSample::new(None, None, ScreenRotation::Deg90);
        assert_eq!(OrientationNormalizer::heading(&sample), None);
    }

    #[test]
    fn test_screen_rotation_applied() {
        let sample = OrientationSample::new(Some(300.0), None, ScreenRotation::Deg90);
        // 300 + 90 = 390 -> 30
        let h = OrientationNormalizer::heading(&sample).unwrap();
        assert!((h - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_alpha_zero_is_north() {
        let sample = OrientationSample::new(None, Some(0.0), ScreenRotation::Deg0);
        // 360 - 0 = 360 -> normalized 0
        assert_eq!(OrientationNormalizer::heading(&sample), Some(0.0));
    }

    #[test]
    fn test_screen_rotation_rejects_odd_angles() {
        assert!(ScreenRotation::try_from(45).is_err());
        assert!(ScreenRotation::try_from(270).is_ok());
    }
}
