//! Bearing resolution
//!
//! This module obtains the Qibla bearing for a user's origin point:
//! - Origin precedence: configured region > live geolocation (bounded
//!   wait) > hardcoded fallback coordinate
//! - Bearing via a pluggable [`BearingService`] (remote HTTP or local
//!   great-circle computation)
//! - Never fails: any service error degrades to a bearing of 0

mod great_circle;
#[cfg(feature = "http")]
mod service;

pub use great_circle::GreatCircle;
#[cfg(feature = "http")]
pub use service::{HttpBearingService, DEFAULT_SERVICE_URL};

use crate::angle::normalize_degrees;
use crate::error::MihrabError;
use crate::types::Coordinates;
use std::time::Duration;

/// Destination coordinate: the Kaaba in Makkah
pub const KAABA: Coordinates = Coordinates::new(21.422487, 39.826206);

/// Origin used when neither a configured region nor geolocation is
/// available (Cairo)
pub const FALLBACK_ORIGIN: Coordinates = Coordinates::new(30.0444, 31.2357);

/// Bearing substituted when the service fails
pub const DEFAULT_BEARING: i32 = 0;

/// Bounded wait for a geolocation fix
pub const DEFAULT_LOCATION_TIMEOUT: Duration = Duration::from_secs(5);

/// Source of a live device location.
///
/// Implementations must honor the timeout so a denied or slow fix never
/// blocks the caller indefinitely.
pub trait LocationProvider {
    fn current_location(&self, timeout: Duration) -> Result<Coordinates, MihrabError>;
}

/// Source of a Qibla bearing for a given origin
pub trait BearingService {
    fn bearing_to_qibla(&self, origin: Coordinates) -> Result<f64, MihrabError>;
}

/// Resolver combining origin precedence with a bearing service
pub struct BearingResolver {
    service: Box<dyn BearingService>,
    fallback_origin: Coordinates,
    location_timeout: Duration,
}

impl BearingResolver {
    pub fn new(service: Box<dyn BearingService>) -> Self {
        Self {
            service,
            fallback_origin: FALLBACK_ORIGIN,
            location_timeout: DEFAULT_LOCATION_TIMEOUT,
        }
    }

    pub fn with_fallback_origin(mut self, origin: Coordinates) -> Self {
        self.fallback_origin = origin;
        self
    }

    pub fn with_location_timeout(mut self, timeout: Duration) -> Self {
        self.location_timeout = timeout;
        self
    }

    /// Resolve the origin point for the bearing request.
    ///
    /// A parseable configured region wins outright and the locator is
    /// never consulted, so no permission prompt is triggered. A malformed
    /// region is treated as absent. Geolocation failure or timeout falls
    /// through to the hardcoded origin.
    pub fn resolve_origin(
        &self,
        region: Option<&str>,
        locator: Option<&dyn LocationProvider>,
    ) -> Coordinates {
        if let Some(region) = region {
            match Coordinates::parse_region(region) {
                Ok(origin) => return origin,
                Err(e) => {
                    log::warn!("ignoring malformed region {:?}: {}", region, e);
                }
            }
        }

        if let Some(locator) = locator {
            match locator.current_location(self.location_timeout) {
                Ok(origin) => return origin,
                Err(e) => {
                    log::warn!("geolocation unavailable, using fallback origin: {}", e);
                }
            }
        }

        self.fallback_origin
    }

    /// Resolve the Qibla bearing, rounded to a whole degree in [0, 360).
    ///
    /// Never returns an error: any service failure is logged and degrades
    /// to [`DEFAULT_BEARING`].
    pub fn resolve(
        &self,
        region: Option<&str>,
        locator: Option<&dyn LocationProvider>,
    ) -> i32 {
        let origin = self.resolve_origin(region, locator);

        match self.service.bearing_to_qibla(origin) {
            Ok(direction) => (normalize_degrees(direction).round() as i32) % 360,
            Err(e) => {
                log::warn!("bearing service failed, using default bearing: {}", e);
                DEFAULT_BEARING
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct FixedService(f64);

    impl BearingService for FixedService {
        fn bearing_to_qibla(&self, _origin: Coordinates) -> Result<f64, MihrabError> {
            Ok(self.0)
        }
    }

    struct FailingService;

    impl BearingService for FailingService {
        fn bearing_to_qibla(&self, _origin: Coordinates) -> Result<f64, MihrabError> {
            Err(MihrabError::ServiceError("connection refused".to_string()))
        }
    }

    struct FixedLocation(Coordinates);

    impl LocationProvider for FixedLocation {
        fn current_location(&self, _timeout: Duration) -> Result<Coordinates, MihrabError> {
            Ok(self.0)
        }
    }

    struct DeniedLocation;

    impl LocationProvider for DeniedLocation {
        fn current_location(&self, _timeout: Duration) -> Result<Coordinates, MihrabError> {
            Err(MihrabError::LocationError("permission denied".to_string()))
        }
    }

    #[test]
    fn test_bearing_is_rounded() {
        let resolver = BearingResolver::new(Box::new(FixedService(58.7)));
        assert_eq!(resolver.resolve(None, None), 59);
    }

    #[test]
    fn test_bearing_rounds_up_across_north() {
        // 359.7 rounds to 360, which must wrap back to 0
        let resolver = BearingResolver::new(Box::new(FixedService(359.7)));
        assert_eq!(resolver.resolve(None, None), 0);
    }

    #[test]
    fn test_service_failure_degrades_to_default() {
        let resolver = BearingResolver::new(Box::new(FailingService));
        assert_eq!(resolver.resolve(None, None), DEFAULT_BEARING);
    }

    #[test]
    fn test_region_wins_over_locator() {
        let resolver = BearingResolver::new(Box::new(FixedService(0.0)));
        let locator = FixedLocation(Coordinates::new(51.5, -0.12));
        let origin = resolver.resolve_origin(Some("30.0444,31.2357"), Some(&locator));
        assert!((origin.latitude - 30.0444).abs() < 1e-9);
    }

    #[test]
    fn test_malformed_region_falls_through_to_locator() {
        let resolver = BearingResolver::new(Box::new(FixedService(0.0)));
        let locator = FixedLocation(Coordinates::new(51.5, -0.12));
        let origin = resolver.resolve_origin(Some("not-a-region"), Some(&locator));
        assert!((origin.latitude - 51.5).abs() < 1e-9);
    }

    #[test]
    fn test_denied_locator_falls_through_to_fallback() {
        let resolver = BearingResolver::new(Box::new(FixedService(0.0)));
        let origin = resolver.resolve_origin(None, Some(&DeniedLocation));
        assert_eq!(origin, FALLBACK_ORIGIN);
    }

    #[test]
    fn test_no_inputs_uses_fallback_origin() {
        let resolver = BearingResolver::new(Box::new(FixedService(0.0)))
            .with_fallback_origin(Coordinates::new(24.7136, 46.6753));
        let origin = resolver.resolve_origin(None, None);
        assert!((origin.longitude - 46.6753).abs() < 1e-9);
    }
}
