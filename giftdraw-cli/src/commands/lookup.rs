//! `giftdraw lookup <phone> [--json]`

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use giftdraw_core::store;

use super::{print_json, GuestJson, Session};

#[derive(Args, Debug)]
pub struct LookupArgs {
    /// 10-digit phone number used at registration.
    pub phone: String,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl LookupArgs {
    pub fn run(self, session: &Session) -> Result<()> {
        let guest = store::lookup_at(&session.home, &session.event, &self.phone)
            .with_context(|| format!("lookup failed for '{}'", self.phone))?;

        if self.json {
            return print_json(&GuestJson::new(&session.event, &guest));
        }
        println!(
            "{} → {}",
            guest.name,
            guest.category.to_string().green().bold()
        );
        if guest.companions > 0 {
            println!("  companions: {}", guest.companions);
        }
        Ok(())
    }
}
