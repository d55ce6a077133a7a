//! `giftdraw status` — capacity and assignment dashboard.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use giftdraw_core::CategoryStatus;
use giftdraw_sync::hash_store;

use super::{print_json, Session};

const BAR_WIDTH: u32 = 20;

/// Arguments for `giftdraw status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct StatusJson<'a> {
    event: &'a str,
    summary: SummaryJson,
    categories: Vec<CategoryStatus>,
    last_push_at: Option<String>,
}

#[derive(Serialize)]
struct SummaryJson {
    guests: usize,
    companions: u64,
    attendees: u64,
    capacity: u64,
    assigned: u64,
    remaining: u64,
}

#[derive(Tabled)]
struct StatusTableRow {
    #[tabled(rename = "category")]
    category: String,
    #[tabled(rename = "assigned")]
    assigned: String,
    #[tabled(rename = "remaining")]
    remaining: u32,
    #[tabled(rename = "")]
    bar: String,
}

impl StatusArgs {
    pub fn run(self, session: &Session) -> Result<()> {
        let reg = &session.registry;
        let categories = reg.category_status();
        let companions: u64 = reg.guests.iter().map(|g| u64::from(g.companions)).sum();
        let summary = SummaryJson {
            guests: reg.guests.len(),
            companions,
            attendees: reg.guests.len() as u64 + companions,
            capacity: categories.iter().map(|c| u64::from(c.capacity)).sum(),
            assigned: categories.iter().map(|c| u64::from(c.assigned)).sum(),
            remaining: categories.iter().map(|c| u64::from(c.remaining)).sum(),
        };
        let last_push_at = hash_store::load_at(&session.home, &session.event)
            .context("failed to load mirror hash store")?
            .pushed_at
            .map(|t| t.to_rfc3339());

        if self.json {
            return print_json(&StatusJson {
                event: &session.event.0,
                summary,
                categories,
                last_push_at,
            });
        }

        print_table(session, &summary, categories, last_push_at.as_deref());
        Ok(())
    }
}

fn print_table(
    session: &Session,
    summary: &SummaryJson,
    categories: Vec<CategoryStatus>,
    last_push_at: Option<&str>,
) {
    println!(
        "giftdraw v{} | {} | {} guests | {} attendees | {}/{} gifts assigned",
        env!("CARGO_PKG_VERSION"),
        session.event.to_string().bold(),
        summary.guests,
        summary.attendees,
        summary.assigned,
        summary.capacity,
    );

    if categories.is_empty() {
        println!("No categories configured.");
        return;
    }

    let rows: Vec<StatusTableRow> = categories
        .into_iter()
        .map(|c| StatusTableRow {
            category: c.name.0.clone(),
            assigned: format!("{}/{}", c.assigned, c.capacity),
            remaining: c.remaining,
            bar: bar(&c),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    if summary.remaining == 0 {
        println!("{}", "All categories are full.".red().bold());
    }
    if let Some(at) = last_push_at {
        println!("Last mirror push: {at}");
    }
}

/// Filled share of `BAR_WIDTH`, red once the category is full.
fn bar(status: &CategoryStatus) -> String {
    let filled = if status.capacity == 0 {
        BAR_WIDTH
    } else {
        let ratio = u64::from(status.assigned.min(status.capacity)) * u64::from(BAR_WIDTH)
            / u64::from(status.capacity);
        u32::try_from(ratio).unwrap_or(BAR_WIDTH)
    };
    let full = "█".repeat(filled as usize);
    let empty = "░".repeat((BAR_WIDTH - filled) as usize).bright_black();
    if status.remaining == 0 {
        format!("{}{empty}", full.red())
    } else {
        format!("{}{empty}", full.green())
    }
}
