//! `giftdraw register <name> <phone> [--companions N] [--no-animation] [--json]`

use std::io::{IsTerminal, Write};

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use giftdraw_core::{store, CategoryName, Guest};
use giftdraw_renderer::{share_link, MessageKind, Renderer, RevealPlan, TemplateContext};
use giftdraw_sync::pipeline::{self, Mutation};

use super::{print_json, print_warnings, GuestJson, Session};

const REVEAL_SPINS: usize = 18;

#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Guest name as it should appear on the list.
    pub name: String,

    /// 10-digit phone number; one registration per phone.
    pub phone: String,

    /// Extra people coming with the guest.
    #[arg(long, default_value_t = 0)]
    pub companions: u32,

    /// Print the result without the draw animation.
    #[arg(long)]
    pub no_animation: bool,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct RegisterJson<'a> {
    #[serde(flatten)]
    guest: GuestJson<'a>,
    share_message: Option<&'a str>,
    share_link: Option<String>,
}

impl RegisterArgs {
    pub fn run(self, session: &Session) -> Result<()> {
        let mut rng = rand::rng();
        let guest = store::register_at(
            &session.home,
            &session.event,
            &self.name,
            &self.phone,
            self.companions,
            &mut rng,
        )
        .with_context(|| format!("could not register '{}'", self.phone))?;

        let animate = !self.json && !self.no_animation && std::io::stdout().is_terminal();
        if animate {
            let candidates: Vec<CategoryName> = session
                .registry
                .categories
                .iter()
                .map(|c| c.name.clone())
                .collect();
            play_reveal(&RevealPlan::new(&candidates, &guest.category, REVEAL_SPINS, &mut rng));
        }

        let share = match render_share(session, &guest) {
            Ok(message) => Some(message),
            Err(e) => {
                eprintln!("{} share message: {e:#}", "warning:".yellow().bold());
                None
            }
        };

        let report = pipeline::run(
            &session.home,
            &session.event,
            &session.collaborators(),
            Mutation::Registered(&guest),
        );

        if self.json {
            print_json(&RegisterJson {
                guest: GuestJson::new(&session.event, &guest),
                share_message: share.as_deref(),
                share_link: share.as_deref().map(|m| share_link(guest.phone.as_str(), m)),
            })?;
        } else {
            println!(
                "✓ {} registered: {}",
                guest.name,
                guest.category.to_string().green().bold()
            );
            if let Some(message) = &share {
                println!();
                println!("{message}");
                println!("{}", share_link(guest.phone.as_str(), message).cyan());
            }
        }
        print_warnings(&report);
        Ok(())
    }
}

fn render_share(session: &Session, guest: &Guest) -> Result<String> {
    let registry = store::load_at(&session.home, &session.event)?;
    let renderer = Renderer::with_overrides(&session.templates_dir())?;
    let ctx = TemplateContext::from_registration(&session.event, guest, &registry);
    Ok(renderer.render(&ctx, MessageKind::Share)?.body)
}

fn play_reveal(plan: &RevealPlan) {
    tracing::debug!(
        frames = plan.len(),
        duration_ms = plan.total_duration().as_millis() as u64,
        "playing reveal"
    );
    let mut out = std::io::stdout().lock();
    for frame in plan.frames() {
        let label = if frame.is_final {
            frame.label.green().bold().to_string()
        } else {
            frame.label.bright_black().to_string()
        };
        // best effort: a closed terminal only loses the animation
        let _ = write!(out, "\r\x1b[2K🎁 {label}");
        let _ = out.flush();
        std::thread::sleep(frame.delay);
    }
    let _ = writeln!(out);
}
