//! Local great-circle bearing computation
//!
//! The same initial-bearing formula the remote service applies, usable
//! offline and as a cross-check in tests.

use super::{BearingService, KAABA};
use crate::angle::normalize_degrees;
use crate::error::MihrabError;
use crate::types::Coordinates;

/// Bearing service computing the great-circle initial bearing locally
pub struct GreatCircle;

impl GreatCircle {
    /// Initial bearing from `origin` to `destination`, in [0, 360)
    pub fn initial_bearing(origin: Coordinates, destination: Coordinates) -> f64 {
        let phi1 = origin.latitude.to_radians();
        let phi2 = destination.latitude.to_radians();
        let delta_lambda = (destination.longitude - origin.longitude).to_radians();

        let y = delta_lambda.sin() * phi2.cos();
        let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();

        normalize_degrees(y.atan2(x).to_degrees())
    }
}

impl BearingService for GreatCircle {
    fn bearing_to_qibla(&self, origin: Coordinates) -> Result<f64, MihrabError> {
        Ok(Self::initial_bearing(origin, KAABA))
    }
}
