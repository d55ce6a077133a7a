//! `giftdraw init [--event <name>]`

use anyhow::{Context, Result};
use clap::Args;

use giftdraw_core::store;

use super::Session;

/// Create the event tables. Existing tables are left untouched.
#[derive(Args, Debug)]
pub struct InitArgs {}

impl InitArgs {
    pub fn run(self, session: &Session) -> Result<()> {
        let reg = &session.registry;
        println!(
            "✓ Event '{}' ready: {} categories, {} guests",
            session.event,
            reg.categories.len(),
            reg.guests.len()
        );
        for category in &reg.categories {
            println!("  - {} (capacity {})", category.name, category.capacity);
        }
        println!(
            "  Saved to: {}",
            store::event_path_at(&session.home, &session.event).display()
        );

        let others: Vec<String> = store::list_events_at(&session.home)
            .context("failed to list events")?
            .into_iter()
            .filter(|e| *e != session.event)
            .map(|e| e.0)
            .collect();
        if !others.is_empty() {
            println!("  Other events: {}", others.join(", "));
        }
        Ok(())
    }
}
