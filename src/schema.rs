//! Orientation event schema (compass.orientation.v1)
//!
//! Versioned wire schema for streaming raw device-orientation events into
//! the compass pipeline, one JSON object per event. Mirrors what the
//! platform delivers: an optional vendor compass field, an optional alpha
//! value, and the screen rotation angle.

use crate::error::MihrabError;
use crate::orientation::{OrientationSample, ScreenRotation};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Current input schema version
pub const SCHEMA_VERSION: &str = "compass.orientation.v1";

/// Validation failures for a single orientation event
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("schema_version must be {SCHEMA_VERSION}, got {0}")]
    SchemaVersionMismatch(String),

    #[error("{field} must be a finite number, got {value}")]
    NonFiniteAngle { field: &'static str, value: f64 },

    #[error("screen_angle must be one of 0/90/180/270, got {0}")]
    InvalidScreenAngle(i32),
}

/// One raw orientation event as delivered over the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrientationEvent {
    /// Must equal [`SCHEMA_VERSION`]
    pub schema_version: String,
    /// Optional caller-assigned identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    /// Delivery timestamp (UTC)
    pub timestamp: DateTime<Utc>,
    /// Vendor absolute compass heading, when the platform exposes one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compass_heading: Option<f64>,
    /// Generic z-axis rotation (rotation convention)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f64>,
    /// Screen rotation lock angle: 0, 90, 180, or 270
    #[serde(default)]
    pub screen_angle: i32,
}

impl OrientationEvent {
    /// Validate the event against the schema.
    ///
    /// An event with neither `compass_heading` nor `alpha` is valid; it
    /// models a device without compass capability.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(ValidationError::SchemaVersionMismatch(
                self.schema_version.clone(),
            ));
        }

        if let Some(h) = self.compass_heading {
            if !h.is_finite() {
                return Err(ValidationError::NonFiniteAngle {
                    field: "compass_heading",
                    value: h,
                });
            }
        }

        if let Some(a) = self.alpha {
            if !a.is_finite() {
                return Err(ValidationError::NonFiniteAngle {
                    field: "alpha",
                    value: a,
                });
            }
        }

        if ScreenRotation::try_from(self.screen_angle).is_err() {
            return Err(ValidationError::InvalidScreenAngle(self.screen_angle));
        }

        Ok(())
    }

    /// Convert to a pipeline orientation sample
    pub fn sample(&self) -> Result<OrientationSample, MihrabError> {
        let rotation = ScreenRotation::try_from(self.screen_angle)?;
        Ok(OrientationSample::new(
            self.compass_heading,
            self.alpha,
            rotation,
        ))
    }
}

/// Result of validating one event in a batch
#[derive(Debug)]
pub struct ValidationResult {
    pub index: usize,
    pub event_id: Option<String>,
    pub error: ValidationError,
}

/// Adapter for parsing orientation event streams
pub struct OrientationEventAdapter;

impl OrientationEventAdapter {
    /// Parse a JSON array of events
    pub fn parse_array(json: &str) -> Result<Vec<OrientationEvent>, MihrabError> {
        let events: Vec<OrientationEvent> = serde_json::from_str(json)?;
        Ok(events)
    }

    /// Parse newline-delimited JSON, one event per line
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<OrientationEvent>, MihrabError> {
        let mut events = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<OrientationEvent>(trimmed) {
                Ok(event) => events.push(event),
                Err(e) => {
                    return Err(MihrabError::ParseError(format!(
                        "Failed to parse line {}: {}",
                        line_num + 1,
                        e
                    )));
                }
            }
        }
        Ok(events)
    }

    /// Validate a batch, returning one entry per invalid event
    pub fn validate_events(events: &[OrientationEvent]) -> Vec<ValidationResult> {
        events
            .iter()
            .enumerate()
            .filter_map(|(index, event)| {
                event.validate().err().map(|error| ValidationResult {
                    index,
                    event_id: event.event_id.clone(),
                    error,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn make_event(alpha: Option<f64>, screen_angle: i32) -> OrientationEvent {
        OrientationEvent {
            schema_version: SCHEMA_VERSION.to_string(),
            event_id: None,
            timestamp: Utc::now(),
            compass_heading: None,
            alpha,
            screen_angle,
        }
    }

    #[test]
    fn test_valid_event() {
        assert!(make_event(Some(100.0), 0).validate().is_ok());
    }

    #[test]
    fn test_capability_gap_is_valid() {
        // No compass fields at all is a normal condition, not an error
        assert!(make_event(None, 0).validate().is_ok());
    }

    #[test]
    fn test_rejects_wrong_schema_version() {
        let mut event = make_event(Some(10.0), 0);
        event.schema_version = "compass.orientation.v0".to_string();
        assert!(matches!(
            event.validate(),
            Err(ValidationError::SchemaVersionMismatch(_))
        ));
    }

    #[test]
    fn test_rejects_odd_screen_angle() {
        assert_eq!(
            make_event(Some(10.0), 45).validate(),
            Err(ValidationError::InvalidScreenAngle(45))
        );
    }

    #[test]
    fn test_rejects_non_finite_alpha() {
        assert!(make_event(Some(f64::NAN), 0).validate().is_err());
    }

    #[test]
    fn test_parse_ndjson() {
        let ndjson = r#"{"schema_version":"compass.orientation.v1","timestamp":"2024-06-01T12:00:00Z","alpha":100.0}
{"schema_version":"compass.orientation.v1","timestamp":"2024-06-01T12:00:01Z","compass_heading":260.0,"screen_angle":90}"#;

        let events = OrientationEventAdapter::parse_ndjson(ndjson).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].alpha, Some(100.0));
        assert_eq!(events[1].screen_angle, 90);
    }

    #[test]
    fn test_parse_ndjson_reports_line_number() {
        let ndjson = "{\"schema_version\":\"compass.orientation.v1\",\"timestamp\":\"2024-06-01T12:00:00Z\"}\nnot json";
        let err = OrientationEventAdapter::parse_ndjson(ndjson).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_validate_batch() {
        let events = vec![make_event(Some(10.0), 0), make_event(Some(10.0), 33)];
        let results = OrientationEventAdapter::validate_events(&events);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].index, 1);
    }

    #[test]
    fn test_sample_conversion() {
        let event = make_event(Some(100.0), 90);
        let sample = event.sample().unwrap();
        assert_eq!(sample.alpha, Some(100.0));
        assert_eq!(sample.screen_rotation, ScreenRotation::Deg90);
    }
}
