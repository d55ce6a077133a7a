//! Settings loaded from `<home>/.giftdraw/config.yaml`.
//!
//! A missing file yields [`Settings::default`]. Environment variables
//! `GIFTDRAW_EVENT` and `GIFTDRAW_ADMIN_PASSPHRASE` override the file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;
use crate::store::root_at;
use crate::types::{default_categories, Category, EventName};

pub const ENV_EVENT: &str = "GIFTDRAW_EVENT";
pub const ENV_ADMIN_PASSPHRASE: &str = "GIFTDRAW_ADMIN_PASSPHRASE";

/// Top-level settings document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_event")]
    pub default_event: String,
    /// Shared admin passphrase. Admin commands are refused while unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_passphrase: Option<String>,
    /// Categories seeded on `init`; falls back to the built-in six.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_categories: Option<Vec<Category>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mirror: Option<MirrorSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify: Option<NotifySettings>,
}

/// Remote mirror of the guest table (GitHub contents API).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorSettings {
    pub owner: String,
    pub repo: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    /// Path of the mirrored file inside the repository.
    #[serde(default = "default_mirror_path")]
    pub path: String,
    /// Name of the env var holding the API token (never the token itself).
    #[serde(default = "default_token_env")]
    pub token_env: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

/// Registration notification e-mail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifySettings {
    /// Recipients; an empty list disables notification.
    #[serde(default)]
    pub hosts: Vec<String>,
    #[serde(default)]
    pub transport: NotifyTransport,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NotifyTransport {
    /// Write `.eml` files under `<home>/.giftdraw/outbox/<event>/`.
    #[default]
    Outbox,
    /// POST a JSON message to a mail relay.
    Http {
        endpoint: String,
        #[serde(default = "default_mail_token_env")]
        token_env: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<String>,
    },
}

fn default_event() -> String {
    "default".to_string()
}
fn default_branch() -> String {
    "main".to_string()
}
fn default_mirror_path() -> String {
    "guests.yaml".to_string()
}
fn default_token_env() -> String {
    "GITHUB_TOKEN".to_string()
}
fn default_api_base() -> String {
    "https://api.github.com".to_string()
}
fn default_mail_token_env() -> String {
    "GIFTDRAW_MAIL_TOKEN".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_event: default_event(),
            admin_passphrase: None,
            seed_categories: None,
            mirror: None,
            notify: None,
        }
    }
}

impl Settings {
    /// Event to use when the command line names none.
    pub fn event(&self) -> Result<EventName, RegistryError> {
        EventName::parse(&self.default_event)
    }

    pub fn seed(&self) -> Vec<Category> {
        self.seed_categories.clone().unwrap_or_else(default_categories)
    }

    /// Apply `GIFTDRAW_*` environment overrides.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(event) = std::env::var(ENV_EVENT) {
            if !event.is_empty() {
                self.default_event = event;
            }
        }
        if let Ok(pass) = std::env::var(ENV_ADMIN_PASSPHRASE) {
            if !pass.is_empty() {
                self.admin_passphrase = Some(pass);
            }
        }
        self
    }
}

/// `<home>/.giftdraw/config.yaml` — pure, no I/O.
pub fn settings_path_at(home: &Path) -> PathBuf {
    root_at(home).join("config.yaml")
}

/// Load settings from `<home>/.giftdraw/config.yaml` without env overrides.
pub fn load_at(home: &Path) -> Result<Settings, RegistryError> {
    let path = settings_path_at(home);
    if !path.exists() {
        return Ok(Settings::default());
    }
    let contents = std::fs::read_to_string(&path)?;
    serde_yaml::from_str(&contents).map_err(|e| RegistryError::Parse { path, source: e })
}
