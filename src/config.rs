//! Configuration service
//!
//! Explicit replacement for effect-driven settings synchronization: a
//! service with `load`, `save`, and observer subscription, reconciling a
//! local store with an optional remote store across auth transitions.
//!
//! Reconciliation rules:
//! - While signed out, the local store is the source of truth.
//! - On sign-in (`attach_remote`), an existing remote row wins and is
//!   written back to the local store; an empty remote receives the local
//!   state.
//! - Every accepted change is written to the local store, to the remote
//!   store when attached, and broadcast to subscribers.

use crate::error::MihrabError;
use crate::observances::ObservanceTable;
use crate::reconciler::DEFAULT_ALIGNMENT_THRESHOLD;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

/// UI language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Ar,
    En,
}

impl Default for Language {
    fn default() -> Self {
        Language::Ar
    }
}

/// User-facing application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Active UI language
    #[serde(default)]
    pub language: Language,
    /// Origin override as a `"<lat>,<lng>"` region string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Angular threshold for the Qibla aligned indicator, degrees
    #[serde(default = "default_alignment_threshold")]
    pub alignment_threshold: f64,
    /// Preferred reciter identifier for recitation playback
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reciter: Option<String>,
    /// Hijri observance table (editorial data carried as configuration)
    #[serde(default)]
    pub observances: ObservanceTable,
}

fn default_alignment_threshold() -> f64 {
    DEFAULT_ALIGNMENT_THRESHOLD
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            language: Language::default(),
            region: None,
            alignment_threshold: DEFAULT_ALIGNMENT_THRESHOLD,
            reciter: None,
            observances: ObservanceTable::default(),
        }
    }
}

/// Backing store for configuration rows.
///
/// `load` returns `Ok(None)` when the store holds no row yet; that is a
/// normal first-run condition, not an error.
pub trait ConfigStore {
    fn load(&self) -> Result<Option<AppConfig>, MihrabError>;
    fn save(&self, config: &AppConfig) -> Result<(), MihrabError>;
}

/// JSON file store for local configuration
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ConfigStore for FileStore {
    fn load(&self) -> Result<Option<AppConfig>, MihrabError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)
            .map_err(|e| MihrabError::ConfigError(format!("read {:?}: {}", self.path, e)))?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(Some(config))
    }

    fn save(&self, config: &AppConfig) -> Result<(), MihrabError> {
        let json = serde_json::to_string_pretty(config)?;
        fs::write(&self.path, json)
            .map_err(|e| MihrabError::ConfigError(format!("write {:?}: {}", self.path, e)))
    }
}

/// In-memory store, used in tests and as a remote-table stand-in
#[derive(Default)]
pub struct MemoryStore {
    slot: Mutex<Option<AppConfig>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AppConfig) -> Self {
        Self {
            slot: Mutex::new(Some(config)),
        }
    }
}

impl ConfigStore for MemoryStore {
    fn load(&self) -> Result<Option<AppConfig>, MihrabError> {
        Ok(self
            .slot
            .lock()
            .map_err(|_| MihrabError::ConfigError("store lock poisoned".to_string()))?
            .clone())
    }

    fn save(&self, config: &AppConfig) -> Result<(), MihrabError> {
        *self
            .slot
            .lock()
            .map_err(|_| MihrabError::ConfigError("store lock poisoned".to_string()))? =
            Some(config.clone());
        Ok(())
    }
}

type Observer = Box<dyn Fn(&AppConfig) + Send>;

/// Configuration service with explicit lifecycle
pub struct ConfigService {
    local: Box<dyn ConfigStore>,
    remote: Option<Box<dyn ConfigStore>>,
    current: AppConfig,
    observers: Vec<Observer>,
}

impl ConfigService {
    /// Create the service, loading the current state from the local store
    pub fn new(local: Box<dyn ConfigStore>) -> Result<Self, MihrabError> {
        let current = local.load()?.unwrap_or_default();
        Ok(Self {
            local,
            remote: None,
            current,
            observers: Vec::new(),
        })
    }

    /// Current configuration
    pub fn get(&self) -> &AppConfig {
        &self.current
    }

    /// Persist a new configuration and notify subscribers.
    ///
    /// The local write must succeed; a remote write failure is logged and
    /// tolerated (the row will be reconciled on the next sign-in).
    pub fn save(&mut self, config: AppConfig) -> Result<(), MihrabError> {
        self.local.save(&config)?;
        if let Some(remote) = &self.remote {
            if let Err(e) = remote.save(&config) {
                log::warn!("remote settings write failed, keeping local copy: {}", e);
            }
        }
        self.current = config;
        self.notify();
        Ok(())
    }

    /// Subscribe to configuration changes
    pub fn subscribe(&mut self, observer: impl Fn(&AppConfig) + Send + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Sign-in transition: attach the remote store and reconcile.
    ///
    /// An existing remote row replaces the local state; otherwise the
    /// local state is pushed up. Subscribers are notified only if the
    /// effective configuration changed.
    pub fn attach_remote(&mut self, remote: Box<dyn ConfigStore>) -> Result<(), MihrabError> {
        match remote.load()? {
            Some(remote_config) => {
                let changed = remote_config != self.current;
                self.local.save(&remote_config)?;
                self.current = remote_config;
                self.remote = Some(remote);
                if changed {
                    self.notify();
                }
            }
            None => {
                remote.save(&self.current)?;
                self.remote = Some(remote);
            }
        }
        Ok(())
    }

    /// Sign-out transition: drop the remote store, keep local state
    pub fn detach_remote(&mut self) {
        self.remote = None;
    }

    fn notify(&self) {
        for observer in &self.observers {
            observer(&self.current);
        }
    }
}
