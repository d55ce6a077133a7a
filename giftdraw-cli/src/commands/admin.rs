//! `giftdraw admin` — passphrase-gated guest and capacity management.

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use giftdraw_core::{settings::ENV_ADMIN_PASSPHRASE, store, GuestPatch};
use giftdraw_renderer::context::DATE_FORMAT;
use giftdraw_sync::pipeline::{self, Mutation};

use super::{print_json, print_warnings, GuestJson, Session};

#[derive(Args, Debug)]
pub struct AdminArgs {
    /// Shared admin passphrase.
    #[arg(long, short = 'p')]
    pub passphrase: Option<String>,

    #[command(subcommand)]
    pub command: AdminCommand,
}

#[derive(Subcommand, Debug)]
pub enum AdminCommand {
    /// List every registered guest.
    Guests {
        /// Emit machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Set the capacity of one category.
    Capacity {
        category: String,
        #[arg(allow_negative_numbers = true)]
        capacity: i64,
    },

    /// Change a guest's name, phone or companions.
    Edit {
        /// Current phone of the guest.
        phone: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        new_phone: Option<String>,
        #[arg(long)]
        companions: Option<u32>,
    },

    /// Remove a guest permanently.
    Delete { phone: String },
}

#[derive(Tabled)]
struct GuestRow {
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "phone")]
    phone: String,
    #[tabled(rename = "category")]
    category: String,
    #[tabled(rename = "companions")]
    companions: u32,
    #[tabled(rename = "registered")]
    registered: String,
}

impl AdminArgs {
    pub fn run(self, session: &Session) -> Result<()> {
        check_passphrase(session.settings.admin_passphrase.as_deref(), self.passphrase.as_deref())?;

        match self.command {
            AdminCommand::Guests { json } => list_guests(session, json),
            AdminCommand::Capacity { category, capacity } => {
                let updated =
                    store::update_capacity_at(&session.home, &session.event, &category, capacity)
                        .with_context(|| format!("could not update capacity of '{category}'"))?;
                println!("✓ {} capacity set to {}", updated.name, updated.capacity);
                Ok(())
            }
            AdminCommand::Edit { phone, name, new_phone, companions } => {
                let patch = GuestPatch { name, phone: new_phone, companions };
                if patch.is_empty() {
                    bail!("nothing to change: pass --name, --new-phone or --companions");
                }
                let guest = store::edit_guest_at(&session.home, &session.event, &phone, patch)
                    .with_context(|| format!("could not edit '{phone}'"))?;
                println!(
                    "✓ Updated {} ({}) → {}",
                    guest.name,
                    guest.phone.as_str(),
                    guest.category
                );
                run_pipeline(session, Mutation::Edited(&guest));
                Ok(())
            }
            AdminCommand::Delete { phone } => {
                let guest = store::delete_guest_at(&session.home, &session.event, &phone)
                    .with_context(|| format!("could not delete '{phone}'"))?;
                println!("✓ Deleted {} ({})", guest.name, guest.phone.as_str());
                run_pipeline(session, Mutation::Deleted(&guest));
                Ok(())
            }
        }
    }
}

fn check_passphrase(expected: Option<&str>, supplied: Option<&str>) -> Result<()> {
    let Some(expected) = expected else {
        bail!(
            "admin access is disabled: set admin_passphrase in config.yaml or {ENV_ADMIN_PASSPHRASE}"
        );
    };
    match supplied {
        Some(s) if s == expected => Ok(()),
        Some(_) => bail!("access denied: wrong admin passphrase"),
        None => bail!("access denied: --passphrase is required"),
    }
}

fn list_guests(session: &Session, json: bool) -> Result<()> {
    let guests = &session.registry.guests;
    if json {
        let rows: Vec<GuestJson<'_>> =
            guests.iter().map(|g| GuestJson::new(&session.event, g)).collect();
        return print_json(&rows);
    }
    if guests.is_empty() {
        println!("No guests registered for '{}'.", session.event);
        return Ok(());
    }
    let rows: Vec<GuestRow> = guests
        .iter()
        .map(|g| GuestRow {
            name: g.name.clone(),
            phone: g.phone.as_str().to_string(),
            category: g.category.0.clone(),
            companions: g.companions,
            registered: g.registered_at.format(DATE_FORMAT).to_string(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    println!("{} guests", guests.len().to_string().bold());
    Ok(())
}

fn run_pipeline(session: &Session, mutation: Mutation<'_>) {
    let report = pipeline::run(&session.home, &session.event, &session.collaborators(), mutation);
    print_warnings(&report);
}
