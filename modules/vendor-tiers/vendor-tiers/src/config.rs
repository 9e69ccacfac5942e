//! Configuration for the vendor tiers module.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};

use crate::domain::service::ServiceConfig;

/// Environment variables with this prefix override file values; nested keys
/// are separated by `__` (e.g. `VENDOR_TIERS__RATE_LIMIT__MAX_REQUESTS`).
pub const ENV_PREFIX: &str = "VENDOR_TIERS__";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VendorTiersConfig {
    pub workflow: WorkflowConfig,
    pub rate_limit: RateLimitConfig,
    pub notifications: NotificationConfig,
}

impl VendorTiersConfig {
    /// Defaults, then the optional YAML file, then the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or a value has the wrong
    /// shape.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("invalid vendor tiers configuration")
    }
}

/// Limits applied by the tier change workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkflowConfig {
    /// Minimum length of non-blank vendor notes, after trimming.
    #[serde(default = "default_notes_min_len")]
    pub notes_min_len: usize,

    #[serde(default = "default_notes_max_len")]
    pub notes_max_len: usize,

    #[serde(default = "default_rejection_reason_max_len")]
    pub rejection_reason_max_len: usize,

    #[serde(default = "default_page_size")]
    pub default_page_size: u32,

    /// Upper clamp for the admin listing page size.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
}

fn default_notes_min_len() -> usize {
    20
}

fn default_notes_max_len() -> usize {
    500
}

fn default_rejection_reason_max_len() -> usize {
    1000
}

fn default_page_size() -> u32 {
    20
}

fn default_max_page_size() -> u32 {
    100
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            notes_min_len: default_notes_min_len(),
            notes_max_len: default_notes_max_len(),
            rejection_reason_max_len: default_rejection_reason_max_len(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

impl From<&WorkflowConfig> for ServiceConfig {
    fn from(cfg: &WorkflowConfig) -> Self {
        Self {
            notes_min_len: cfg.notes_min_len,
            notes_max_len: cfg.notes_max_len,
            rejection_reason_max_len: cfg.rejection_reason_max_len,
            default_page_size: cfg.default_page_size,
            max_page_size: cfg.max_page_size,
        }
    }
}

/// Per-caller throttle on tier change submissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RateLimitConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Submissions allowed per caller within `window`.
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    #[serde(default = "default_window", with = "humantime_serde")]
    pub window: Duration,

    /// How often idle callers are evicted from the limiter.
    #[serde(default = "default_sweep_interval", with = "humantime_serde")]
    pub sweep_interval: Duration,
}

fn default_enabled() -> bool {
    true
}

fn default_max_requests() -> u32 {
    5
}

fn default_window() -> Duration {
    Duration::from_secs(15 * 60)
}

fn default_sweep_interval() -> Duration {
    Duration::from_secs(60)
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_requests: default_max_requests(),
            window: default_window(),
            sweep_interval: default_sweep_interval(),
        }
    }
}

/// Delivery policy for workflow emails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotificationConfig {
    /// When false, workflow events are consumed and dropped without sending.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_from_address")]
    pub from_address: String,

    /// Address that receives new-request notices.
    #[serde(default = "default_admin_email")]
    pub admin_email: String,

    /// Per-attempt send timeout.
    #[serde(default = "default_send_timeout", with = "humantime_serde")]
    pub send_timeout: Duration,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_retry_delay", with = "humantime_serde")]
    pub retry_delay: Duration,
}

fn default_from_address() -> String {
    "notifications@localhost".to_owned()
}

fn default_admin_email() -> String {
    "admin@localhost".to_owned()
}

fn default_send_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay() -> Duration {
    Duration::from_secs(2)
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            from_address: default_from_address(),
            admin_email: default_admin_email(),
            send_timeout: default_send_timeout(),
            max_attempts: default_max_attempts(),
            retry_delay: default_retry_delay(),
        }
    }
}
