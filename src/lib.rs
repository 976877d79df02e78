//! Mihrab - On-device compute core for an Islamic lifestyle application
//!
//! Mihrab owns the application's computational flows so the rendering
//! layer stays pure presentation:
//!
//! - **Compass pipeline**: orientation normalization → bearing resolution
//!   → heading reconciliation, with the sensor-permission state machine
//! - **Configuration service**: local/remote settings reconciliation with
//!   change notification
//! - **Recitation sequencing**: sequential ayah playback as an explicit
//!   state machine over audio resource handles
//! - **Navigation cards**: the versioned `[NAV:...]` grammar embedded in
//!   assistant replies
//! - **Observance tables**: Hijri calendar dates carried as data

pub mod angle;
pub mod bearing;
pub mod compass;
pub mod config;
pub mod error;
pub mod navcard;
pub mod observances;
pub mod orientation;
pub mod recitation;
pub mod reconciler;
pub mod schema;
pub mod types;

pub use compass::CompassProcessor;
pub use config::{AppConfig, ConfigService, ConfigStore};
pub use error::MihrabError;
pub use types::{CompassFrame, Coordinates, PermissionState};

// Schema exports
pub use schema::{OrientationEvent, OrientationEventAdapter, SCHEMA_VERSION};

// Bearing exports
pub use bearing::{BearingResolver, BearingService, GreatCircle, LocationProvider, KAABA};

/// Mihrab version embedded in emitted frames and reports
pub const MIHRAB_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for emitted frames and reports
pub const PRODUCER_NAME: &str = "mihrab-core";
