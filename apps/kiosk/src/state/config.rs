//! # Kiosk Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     KIOSK_ID=entrance-2                                                │
//! │     KIOSK_IDLE_TIMEOUT_SECS=120                                        │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/store-kiosk/kiosk.toml (Linux)                           │
//! │     ~/Library/Application Support/com.store.kiosk/kiosk.toml (macOS)   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     300 s idle timeout, 30 s auto-return, demo mode on                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # kiosk.toml
//! [kiosk]
//! id = "entrance-1"
//! store_name = "Phoenix Mall"
//! demo_mode = true
//!
//! [timing]
//! idle_timeout_secs = 300
//! confirmation_return_secs = 30
//! loading_delay_ms = 2000
//! payment_delay_ms = 1500
//!
//! [database]
//! path = "/var/lib/kiosk/kiosk.db"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::ConfigError;
use kiosk_core::{CONFIRMATION_RETURN_SECS, IDLE_TIMEOUT_SECS};

// =============================================================================
// Kiosk Section
// =============================================================================

/// Identity of this kiosk device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KioskSection {
    /// Device identifier, used in logs.
    #[serde(default = "default_kiosk_id")]
    pub id: String,

    /// Store name shown on the home screen.
    #[serde(default = "default_store_name")]
    pub store_name: String,

    /// Enables the showroom personalization rules.
    #[serde(default = "default_true")]
    pub demo_mode: bool,
}

fn default_kiosk_id() -> String {
    "kiosk-1".to_string()
}

fn default_store_name() -> String {
    "Flagship Store".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for KioskSection {
    fn default() -> Self {
        KioskSection {
            id: default_kiosk_id(),
            store_name: default_store_name(),
            demo_mode: true,
        }
    }
}

// =============================================================================
// Timing Section
// =============================================================================

/// Timer settings. All values must be positive except the simulated delays.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingSection {
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,

    #[serde(default = "default_confirmation_return")]
    pub confirmation_return_secs: u64,

    /// Simulated progress shown on the loading screen.
    #[serde(default = "default_loading_delay")]
    pub loading_delay_ms: u64,

    /// Simulated payment processing time.
    #[serde(default = "default_payment_delay")]
    pub payment_delay_ms: u64,
}

fn default_idle_timeout() -> u64 {
    IDLE_TIMEOUT_SECS
}
fn default_confirmation_return() -> u64 {
    CONFIRMATION_RETURN_SECS
}
fn default_loading_delay() -> u64 {
    2000
}
fn default_payment_delay() -> u64 {
    1500
}

impl Default for TimingSection {
    fn default() -> Self {
        TimingSection {
            idle_timeout_secs: default_idle_timeout(),
            confirmation_return_secs: default_confirmation_return(),
            loading_delay_ms: default_loading_delay(),
            payment_delay_ms: default_payment_delay(),
        }
    }
}

/// Timer settings as durations, handed to the screen controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub idle_timeout: Duration,
    pub confirmation_return: Duration,
    pub loading_delay: Duration,
    pub payment_delay: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Timing::from(&TimingSection::default())
    }
}

impl From<&TimingSection> for Timing {
    fn from(section: &TimingSection) -> Self {
        Timing {
            idle_timeout: Duration::from_secs(section.idle_timeout_secs),
            confirmation_return: Duration::from_secs(section.confirmation_return_secs),
            loading_delay: Duration::from_millis(section.loading_delay_ms),
            payment_delay: Duration::from_millis(section.payment_delay_ms),
        }
    }
}

// =============================================================================
// Database Section
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseSection {
    /// SQLite file. Defaults to `kiosk.db` in the platform data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

// =============================================================================
// Main Kiosk Configuration
// =============================================================================

/// Complete kiosk configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KioskConfig {
    #[serde(default)]
    pub kiosk: KioskSection,

    #[serde(default)]
    pub timing: TimingSection,

    #[serde(default)]
    pub database: DatabaseSection,
}

impl KioskConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (kiosk.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading kiosk config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.kiosk.id.trim().is_empty() {
            return Err(ConfigError::Invalid("kiosk.id must not be empty".into()));
        }

        if self.timing.idle_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "timing.idle_timeout_secs must be greater than 0".into(),
            ));
        }

        if self.timing.confirmation_return_secs == 0 {
            return Err(ConfigError::Invalid(
                "timing.confirmation_return_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies `KIOSK_*` overrides from any key lookup.
    ///
    /// Unparseable numbers are ignored with a warning.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(id) = lookup("KIOSK_ID") {
            debug!(kiosk_id = %id, "Overriding kiosk ID from environment");
            self.kiosk.id = id;
        }

        if let Some(name) = lookup("KIOSK_STORE_NAME") {
            self.kiosk.store_name = name;
        }

        if let Some(path) = lookup("KIOSK_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = Some(PathBuf::from(path));
        }

        if let Some(demo) = lookup("KIOSK_DEMO_MODE") {
            match demo.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.kiosk.demo_mode = true,
                "0" | "false" | "no" | "off" => self.kiosk.demo_mode = false,
                _ => warn!(value = %demo, "Unknown KIOSK_DEMO_MODE value in environment"),
            }
        }

        let numeric: [(&str, &mut u64); 4] = [
            ("KIOSK_IDLE_TIMEOUT_SECS", &mut self.timing.idle_timeout_secs),
            ("KIOSK_CONFIRMATION_RETURN_SECS", &mut self.timing.confirmation_return_secs),
            ("KIOSK_LOADING_DELAY_MS", &mut self.timing.loading_delay_ms),
            ("KIOSK_PAYMENT_DELAY_MS", &mut self.timing.payment_delay_ms),
        ];
        for (key, slot) in numeric {
            if let Some(raw) = lookup(key) {
                match raw.parse::<u64>() {
                    Ok(value) => {
                        debug!(key, value, "Overriding timing from environment");
                        *slot = value;
                    }
                    Err(_) => warn!(key, value = %raw, "Ignoring non-numeric timing override"),
                }
            }
        }
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("com", "store", "kiosk")
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("kiosk.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Database file to open: the configured path, the platform data
    /// directory, or `./kiosk.db` as a last resort.
    pub fn database_path(&self) -> PathBuf {
        self.database
            .path
            .clone()
            .or_else(|| Self::project_dirs().map(|dirs| dirs.data_dir().join("kiosk.db")))
            .unwrap_or_else(|| PathBuf::from("kiosk.db"))
    }

    pub fn timing(&self) -> Timing {
        Timing::from(&self.timing)
    }

    pub fn kiosk_id(&self) -> &str {
        &self.kiosk.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = KioskConfig::default();
        assert_eq!(config.timing.idle_timeout_secs, 300);
        assert_eq!(config.timing.confirmation_return_secs, 30);
        assert!(config.kiosk.demo_mode);
        assert!(config.validate().is_ok());

        let timing = config.timing();
        assert_eq!(timing.loading_delay, Duration::from_secs(2));
        assert_eq!(timing.payment_delay, Duration::from_millis(1500));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: KioskConfig = toml::from_str(
            r#"
            [kiosk]
            id = "entrance-2"

            [timing]
            idle_timeout_secs = 120
            "#,
        )
        .unwrap();

        assert_eq!(config.kiosk.id, "entrance-2");
        assert_eq!(config.kiosk.store_name, "Flagship Store");
        assert_eq!(config.timing.idle_timeout_secs, 120);
        assert_eq!(config.timing.confirmation_return_secs, 30);
        assert!(config.database.path.is_none());
    }

    #[test]
    fn test_overrides() {
        let mut config = KioskConfig::default();
        config.apply_overrides(lookup(&[
            ("KIOSK_ID", "lobby"),
            ("KIOSK_DB_PATH", "/tmp/k.db"),
            ("KIOSK_DEMO_MODE", "off"),
            ("KIOSK_IDLE_TIMEOUT_SECS", "60"),
            ("KIOSK_PAYMENT_DELAY_MS", "soon"),
        ]));

        assert_eq!(config.kiosk_id(), "lobby");
        assert_eq!(config.database_path(), PathBuf::from("/tmp/k.db"));
        assert!(!config.kiosk.demo_mode);
        assert_eq!(config.timing.idle_timeout_secs, 60);
        assert_eq!(config.timing.payment_delay_ms, 1500);
    }

    #[test]
    fn test_validation() {
        let mut config = KioskConfig::default();
        config.timing.idle_timeout_secs = 0;
        assert!(config.validate().is_err());

        config.timing.idle_timeout_secs = 300;
        config.kiosk.id = "  ".into();
        assert!(config.validate().is_err());

        config.kiosk.id = "k".into();
        config.timing.confirmation_return_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = std::env::temp_dir().join(format!("kiosk-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("kiosk.toml");
        std::fs::write(&path, "[timing]\nloading_delay_ms = 0\n").unwrap();

        let config = KioskConfig::load(Some(path)).unwrap();
        assert_eq!(config.timing().loading_delay, Duration::ZERO);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_bad_file_is_parse_error() {
        let dir = std::env::temp_dir().join(format!("kiosk-config-bad-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("kiosk.toml");
        std::fs::write(&path, "[timing\n").unwrap();

        assert!(matches!(KioskConfig::load(Some(path)), Err(ConfigError::Parse(_))));

        std::fs::remove_dir_all(&dir).ok();
    }
}
