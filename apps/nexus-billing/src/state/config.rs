//! # Application Configuration
//!
//! Settings for the billing client, loaded once per command.
//!
//! ## Configuration Sources (later overrides earlier)
//! 1. Defaults (this file)
//! 2. Config file (`config.toml` in the platform config directory)
//! 3. Environment variables (`NEXUS_*`)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Config File Locations                               │
//! │                                                                         │
//! │  Linux:   ~/.config/nexus/config.toml                                   │
//! │  macOS:   ~/Library/Application Support/com.autonexus.nexus/config.toml │
//! │  Windows: %APPDATA%\autonexus\nexus\config\config.toml                  │
//! │                                                                         │
//! │  The session file lives in the matching data directory.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use nexus_api::{ApiConfig, DEFAULT_BASE_URL};
use nexus_core::{AccessPolicy, Identity, Percent};

use super::notice::MAX_NOTICE_TTL;

const CONFIG_FILE: &str = "config.toml";
const SESSION_FILE: &str = "session.json";

/// Configuration failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config file is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config could not be written: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("no config directory available on this platform")]
    NoConfigDir,
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Sections
// =============================================================================

/// `[api]`: where the REST API lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

/// `[billing]`: store identity and bill defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillingSettings {
    /// Printed at the top of receipts
    pub store_name: String,

    /// Currency code shown next to amounts
    pub currency: String,

    /// Tax rate for new drafts
    pub default_tax_rate: Percent,

    /// How long notices stay visible
    pub notice_ttl_secs: u64,

    /// Overrides the session file location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_path: Option<PathBuf>,
}

impl Default for BillingSettings {
    fn default() -> Self {
        BillingSettings {
            store_name: "AutoNexus".to_string(),
            currency: "LKR".to_string(),
            default_tax_rate: Percent::zero(),
            notice_ttl_secs: 7,
            session_path: None,
        }
    }
}

/// `[access]`: who counts as an administrator.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessSettings {
    pub admin_emails: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_role: Option<String>,
}

/// `[identity]`: the signed-in user, as handed over by the identity provider.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentitySettings {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub roles: Vec<String>,
}

// =============================================================================
// App Config
// =============================================================================

/// Complete client configuration.
///
/// ## Example config.toml
/// ```toml
/// [api]
/// base_url = "http://localhost:5000/api"
/// timeout_secs = 30
///
/// [billing]
/// store_name = "AutoNexus"
/// currency = "LKR"
/// default_tax_rate = 5
/// notice_ttl_secs = 7
///
/// [access]
/// admin_emails = ["owner@autonexus.lk"]
/// admin_role = "admin"
///
/// [identity]
/// email = "cashier@autonexus.lk"
/// roles = []
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub billing: BillingSettings,

    #[serde(default)]
    pub access: AccessSettings,

    #[serde(default)]
    pub identity: IdentitySettings,
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        Self::load_with(config_path, |key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::load`] with an explicit variable lookup.
    pub fn load_with<F>(config_path: Option<PathBuf>, lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides_from(lookup);
        config.validate()?;

        Ok(config)
    }

    /// Writes the configuration as TOML.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<PathBuf> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or(ConfigError::NoConfigDir)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Config saved");
        Ok(path)
    }

    /// Checks values that the type system does not.
    pub fn validate(&self) -> ConfigResult<()> {
        self.api_config()
            .parsed_base_url()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "api.timeout_secs must be greater than 0".into(),
            ));
        }

        if self.billing.currency.trim().is_empty() {
            return Err(ConfigError::Invalid("billing.currency is required".into()));
        }

        let max_ttl = MAX_NOTICE_TTL.as_secs();
        if self.billing.notice_ttl_secs == 0 || self.billing.notice_ttl_secs > max_ttl {
            return Err(ConfigError::Invalid(format!(
                "billing.notice_ttl_secs must be between 1 and {}",
                max_ttl
            )));
        }

        Ok(())
    }

    /// Applies `NEXUS_*` overrides read through `lookup`.
    ///
    /// Values that do not parse are logged and skipped.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("NEXUS_API_URL") {
            debug!(url = %url, "Overriding API URL from environment");
            self.api.base_url = url;
        }

        if let Some(secs) = lookup("NEXUS_API_TIMEOUT_SECS") {
            match secs.trim().parse::<u64>() {
                Ok(secs) => self.api.timeout_secs = secs,
                Err(_) => warn!(value = %secs, "Ignoring NEXUS_API_TIMEOUT_SECS"),
            }
        }

        if let Some(currency) = lookup("NEXUS_CURRENCY") {
            self.billing.currency = currency.trim().to_string();
        }

        if let Some(rate) = lookup("NEXUS_DEFAULT_TAX_RATE") {
            match rate.parse::<Percent>() {
                Ok(rate) => {
                    debug!(tax_rate = %rate, "Overriding default tax rate from environment");
                    self.billing.default_tax_rate = rate;
                }
                Err(e) => warn!(value = %rate, error = %e, "Ignoring NEXUS_DEFAULT_TAX_RATE"),
            }
        }

        if let Some(secs) = lookup("NEXUS_NOTICE_TTL_SECS") {
            match secs.trim().parse::<u64>() {
                Ok(secs) => self.billing.notice_ttl_secs = secs,
                Err(_) => warn!(value = %secs, "Ignoring NEXUS_NOTICE_TTL_SECS"),
            }
        }

        if let Some(path) = lookup("NEXUS_SESSION_PATH") {
            self.billing.session_path = Some(PathBuf::from(path));
        }

        if let Some(emails) = lookup("NEXUS_ADMIN_EMAILS") {
            self.access.admin_emails = split_list(&emails);
        }

        if let Some(role) = lookup("NEXUS_ADMIN_ROLE") {
            let role = role.trim();
            self.access.admin_role = (!role.is_empty()).then(|| role.to_string());
        }

        if let Some(email) = lookup("NEXUS_USER_EMAIL") {
            self.identity.email = email.trim().to_string();
        }

        if let Some(name) = lookup("NEXUS_USER_NAME") {
            self.identity.display_name = Some(name);
        }

        if let Some(roles) = lookup("NEXUS_USER_ROLES") {
            self.identity.roles = split_list(&roles);
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn api_config(&self) -> ApiConfig {
        ApiConfig::new(self.api.base_url.clone())
            .timeout(Duration::from_secs(self.api.timeout_secs))
    }

    pub fn access_policy(&self) -> AccessPolicy {
        AccessPolicy::new(
            self.access.admin_emails.clone(),
            self.access.admin_role.clone(),
        )
    }

    pub fn identity(&self) -> Identity {
        Identity {
            email: self.identity.email.clone(),
            display_name: self.identity.display_name.clone(),
            roles: self.identity.roles.clone(),
            ..Identity::default()
        }
    }

    pub fn notice_ttl(&self) -> Duration {
        Duration::from_secs(self.billing.notice_ttl_secs)
    }

    /// Where the billing session is kept between commands.
    pub fn session_path(&self) -> ConfigResult<PathBuf> {
        if let Some(path) = &self.billing.session_path {
            return Ok(path.clone());
        }
        project_dirs()
            .map(|dirs| dirs.data_dir().join(SESSION_FILE))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Config file that [`AppConfig::load`] reads when no path is given.
    pub fn describe_source(path: Option<&Path>) -> String {
        path.map(Path::to_path_buf)
            .or_else(Self::default_config_path)
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(defaults only)".to_string())
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "autonexus", "nexus")
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
