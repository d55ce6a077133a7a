pub mod admin;
pub mod init;
pub mod lookup;
pub mod mirror;
pub mod register;
pub mod status;

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;

use giftdraw_core::{settings, store, EventName, Guest, Registry, Settings};
use giftdraw_sync::{Collaborators, PipelineReport};

/// Resolved home, settings and event shared by every command.
pub struct Session {
    pub home: PathBuf,
    pub settings: Settings,
    pub event: EventName,
    /// Tables as they were right after opening.
    pub registry: Registry,
}

impl Session {
    /// Load settings and make sure the event tables exist.
    pub fn open(event: Option<String>) -> Result<Self> {
        let home: PathBuf = dirs::home_dir().context("could not determine home directory")?;
        let settings = settings::load_at(&home)
            .context("failed to load settings")?
            .with_env_overrides();
        let event = match event {
            Some(raw) => EventName::parse(&raw),
            None => settings.event(),
        }
        .context("invalid event name")?;
        let registry = store::init_at(&home, &event, &settings.seed())
            .with_context(|| format!("failed to open event '{event}'"))?;
        tracing::debug!(event = %event, home = %home.display(), "session opened");
        Ok(Self { home, settings, event, registry })
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators::from_settings(&self.home, &self.event, &self.settings)
    }

    pub fn templates_dir(&self) -> PathBuf {
        store::root_at(&self.home).join("templates")
    }
}

/// JSON shape of one guest, shared by `register`, `lookup` and `admin guests`.
#[derive(Serialize)]
pub struct GuestJson<'a> {
    pub event: &'a str,
    pub name: &'a str,
    pub phone: &'a str,
    pub category: &'a str,
    pub companions: u32,
    pub registered_at: String,
}

impl<'a> GuestJson<'a> {
    pub fn new(event: &'a EventName, guest: &'a Guest) -> Self {
        Self {
            event: &event.0,
            name: &guest.name,
            phone: guest.phone.as_str(),
            category: &guest.category.0,
            companions: guest.companions,
            registered_at: guest.registered_at.to_rfc3339(),
        }
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("failed to serialize JSON")?
    );
    Ok(())
}

/// Collaborator failures never change the exit status.
pub fn print_warnings(report: &PipelineReport) {
    for warning in &report.warnings {
        eprintln!("{} {warning}", "warning:".yellow().bold());
    }
}
