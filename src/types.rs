//! Core types shared across the Mihrab pipeline
//!
//! Coordinates, permission state, and the compass frame emitted to the
//! rendering layer.

use crate::error::MihrabError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A geographic point in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Create coordinates without range validation (for constants)
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Create coordinates, rejecting out-of-range values
    pub fn checked(latitude: f64, longitude: f64) -> Result<Self, MihrabError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(MihrabError::InvalidCoordinate(format!(
                "latitude {} outside [-90, 90]",
                latitude
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(MihrabError::InvalidCoordinate(format!(
                "longitude {} outside [-180, 180]",
                longitude
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Parse a region string of the form `"<lat>,<lng>"`.
    ///
    /// This is the format the persisted user configuration stores the
    /// origin override in.
    pub fn parse_region(region: &str) -> Result<Self, MihrabError> {
        let mut parts = region.splitn(2, ',');
        let lat = parts
            .next()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| MihrabError::InvalidRegion(region.to_string()))?;
        let lng = parts
            .next()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| MihrabError::InvalidRegion(region.to_string()))?;

        let latitude: f64 = lat
            .parse()
            .map_err(|_| MihrabError::InvalidRegion(region.to_string()))?;
        let longitude: f64 = lng
            .parse()
            .map_err(|_| MihrabError::InvalidRegion(region.to_string()))?;

        Self::checked(latitude, longitude)
    }
}

impl FromStr for Coordinates {
    type Err = MihrabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_region(s)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// Sensor permission state for the compass view.
///
/// Transitions: `NotRequested -> Requesting -> {Granted | Denied}`.
/// There is no automatic retry from `Denied`; reopening the view issues a
/// fresh request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionState {
    NotRequested,
    Requesting,
    Granted,
    Denied,
}

impl Default for PermissionState {
    fn default() -> Self {
        PermissionState::NotRequested
    }
}

impl PermissionState {
    /// Move to `Requesting` if a request is allowed from the current state.
    ///
    /// Returns `true` when a platform prompt should be issued. `Granted`
    /// never re-prompts; `Requesting` is already in flight.
    pub fn request(&mut self) -> bool {
        match self {
            PermissionState::NotRequested | PermissionState::Denied => {
                *self = PermissionState::Requesting;
                true
            }
            PermissionState::Requesting | PermissionState::Granted => false,
        }
    }

    /// Resolve an in-flight request as granted
    pub fn grant(&mut self) {
        if *self == PermissionState::Requesting {
            *self = PermissionState::Granted;
        }
    }

    /// Resolve an in-flight request as denied
    pub fn deny(&mut self) {
        if *self == PermissionState::Requesting {
            *self = PermissionState::Denied;
        }
    }

    pub fn is_granted(&self) -> bool {
        *self == PermissionState::Granted
    }
}

/// One snapshot of everything the compass UI needs to render
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompassFrame {
    /// Normalized device heading in [0, 360); 0 when no sample has arrived
    pub heading: f64,
    /// Resolved Qibla bearing in [0, 360)
    pub bearing: f64,
    /// Rotation to apply to the destination marker, `normalize(B - H)`
    pub relative: f64,
    /// Shortest angular separation between heading and bearing, [0, 180]
    pub angle_diff: f64,
    /// Within threshold AND orientation permission granted
    pub aligned: bool,
    /// Permission state at the time of the snapshot
    pub permission: PermissionState,
    /// Whether at least one live heading sample has been applied
    pub live_heading: bool,
    /// When the frame was computed (UTC)
    pub computed_at: DateTime<Utc>,
    /// Session identifier for provenance
    pub session_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_region() {
        let c = Coordinates::parse_region("21.4225, 39.8262").unwrap();
        assert!((c.latitude - 21.4225).abs() < 1e-9);
        assert!((c.longitude - 39.8262).abs() < 1e-9);
    }

    #[test]
    fn test_parse_region_rejects_garbage() {
        assert!(Coordinates::parse_region("").is_err());
        assert!(Coordinates::parse_region("21.4225").is_err());
        assert!(Coordinates::parse_region("abc,def").is_err());
        assert!(Coordinates::parse_region("91.0,10.0").is_err());
        assert!(Coordinates::parse_region("10.0,181.0").is_err());
    }

    #[test]
    fn test_region_roundtrip_display() {
        let c = Coordinates::new(30.0444, 31.2357);
        let parsed: Coordinates = c.to_string().parse().unwrap();
        assert_eq!(parsed, c);
    }

    #[test]
    fn test_permission_happy_path() {
        let mut p = PermissionState::default();
        assert_eq!(p, PermissionState::NotRequested);
        assert!(p.request());
        assert_eq!(p, PermissionState::Requesting);
        p.grant();
        assert!(p.is_granted());
        // Granted never re-prompts
        assert!(!p.request());
        assert!(p.is_granted());
    }

    #[test]
    fn test_permission_denied_retries_on_reopen() {
        let mut p = PermissionState::NotRequested;
        p.request();
        p.deny();
        assert_eq!(p, PermissionState::Denied);
        // Reopening the view issues a fresh prompt
        assert!(p.request());
        assert_eq!(p, PermissionState::Requesting);
    }

    #[test]
    fn test_grant_only_resolves_inflight_request() {
        let mut p = PermissionState::NotRequested;
        p.grant();
        assert_eq!(p, PermissionState::NotRequested);
        p.deny();
        assert_eq!(p, PermissionState::NotRequested);
    }
}
