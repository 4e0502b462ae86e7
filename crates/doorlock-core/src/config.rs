//! Runtime configuration shared by both units.
//!
//! Both units must be configured with the same dwell and lockout durations:
//! they free-run their own timers after the initial trigger and only agree
//! on wall-clock timing through this configuration.
//!
//! # Examples
//!
//! ```
//! use doorlock_core::DoorlockConfig;
//! use std::time::Duration;
//!
//! let config = DoorlockConfig::from_json_str(r#"{ "unlock_dwell_ms": 5000 }"#).unwrap();
//! assert_eq!(config.unlock_dwell(), Duration::from_secs(5));
//! assert_eq!(config.lockout_ticks, 8);
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_LOCK_DWELL_MS, DEFAULT_LOCKOUT_MS, DEFAULT_LOCKOUT_TICKS, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_OPEN_DWELL_MS, DEFAULT_STORE_SETTLE_MS, DEFAULT_UNLOCK_DWELL_MS,
};
use crate::{Error, Result, TimerPhase};

/// Timing and policy configuration.
///
/// Every field has a default, so a partial JSON document is enough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoorlockConfig {
    /// Motor forward dwell while unlocking.
    pub unlock_dwell_ms: u64,

    /// Dwell with the door held open.
    pub open_dwell_ms: u64,

    /// Motor reverse dwell while locking.
    pub lock_dwell_ms: u64,

    /// Total lockout cooldown.
    pub lockout_ms: u64,

    /// Periodic firings counted to make up one lockout.
    pub lockout_ticks: u32,

    /// Delay after each persistent store write.
    pub store_settle_ms: u64,

    /// Maximum wait for a peer message. `None` blocks indefinitely.
    pub reply_timeout_ms: Option<u64>,

    /// Consecutive failed verifications before lockout.
    pub max_attempts: u8,
}

impl Default for DoorlockConfig {
    fn default() -> Self {
        Self {
            unlock_dwell_ms: DEFAULT_UNLOCK_DWELL_MS,
            open_dwell_ms: DEFAULT_OPEN_DWELL_MS,
            lock_dwell_ms: DEFAULT_LOCK_DWELL_MS,
            lockout_ms: DEFAULT_LOCKOUT_MS,
            lockout_ticks: DEFAULT_LOCKOUT_TICKS,
            store_settle_ms: DEFAULT_STORE_SETTLE_MS,
            reply_timeout_ms: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl DoorlockConfig {
    /// Parse and validate a JSON document.
    ///
    /// # Errors
    /// Returns `Error::Config` if the document is malformed or fails
    /// [`validate`](Self::validate).
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("Invalid configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    ///
    /// # Errors
    /// Returns `Error::Io` if the file cannot be read, `Error::Config` if it
    /// is invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check that every duration and count is usable.
    ///
    /// # Errors
    /// Returns `Error::Config` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let durations = [
            ("unlock_dwell_ms", self.unlock_dwell_ms),
            ("open_dwell_ms", self.open_dwell_ms),
            ("lock_dwell_ms", self.lock_dwell_ms),
            ("lockout_ms", self.lockout_ms),
        ];
        if let Some((name, _)) = durations.iter().find(|(_, ms)| *ms == 0) {
            return Err(Error::Config(format!("{name} must be greater than zero")));
        }

        if self.lockout_ticks == 0 {
            return Err(Error::Config(
                "lockout_ticks must be at least 1".to_string(),
            ));
        }

        if self.max_attempts == 0 {
            return Err(Error::Config("max_attempts must be at least 1".to_string()));
        }

        if self.reply_timeout_ms == Some(0) {
            return Err(Error::Config(
                "reply_timeout_ms must be greater than zero when set".to_string(),
            ));
        }

        Ok(())
    }

    pub fn unlock_dwell(&self) -> Duration {
        Duration::from_millis(self.unlock_dwell_ms)
    }

    pub fn open_dwell(&self) -> Duration {
        Duration::from_millis(self.open_dwell_ms)
    }

    pub fn lock_dwell(&self) -> Duration {
        Duration::from_millis(self.lock_dwell_ms)
    }

    /// Period of one lockout firing (`lockout_ms / lockout_ticks`).
    pub fn lockout_period(&self) -> Duration {
        Duration::from_millis(self.lockout_ms) / self.lockout_ticks.max(1)
    }

    /// Duration a timer binding for `phase` is armed with.
    ///
    /// Door phases are one-shot dwells; `Lockout` is one lockout period.
    pub fn dwell(&self, phase: TimerPhase) -> Duration {
        match phase {
            TimerPhase::Unlocking => self.unlock_dwell(),
            TimerPhase::Open => self.open_dwell(),
            TimerPhase::Locking => self.lock_dwell(),
            TimerPhase::Lockout => self.lockout_period(),
        }
    }

    pub fn store_settle(&self) -> Duration {
        Duration::from_millis(self.store_settle_ms)
    }

    pub fn reply_timeout(&self) -> Option<Duration> {
        self.reply_timeout_ms.map(Duration::from_millis)
    }
}
