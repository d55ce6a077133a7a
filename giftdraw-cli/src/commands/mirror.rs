//! `giftdraw mirror push [--dry-run]`

use anyhow::{bail, Context, Result};
use clap::Subcommand;

use giftdraw_sync::PushOutcome;

use super::Session;

#[derive(Subcommand, Debug)]
pub enum MirrorCommand {
    /// Push the guest list now.
    Push {
        /// Show what would be pushed without contacting the remote.
        #[arg(long)]
        dry_run: bool,
    },
}

pub fn run(command: MirrorCommand, session: &Session) -> Result<()> {
    match command {
        MirrorCommand::Push { dry_run } => push(session, dry_run),
    }
}

fn push(session: &Session, dry_run: bool) -> Result<()> {
    let settings = session
        .settings
        .mirror
        .as_ref()
        .context("no mirror configured: add a `mirror:` section to config.yaml")?;
    let collaborators = session.collaborators();
    if !collaborators.has_mirror() {
        let reason = collaborators
            .pending_warnings()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        bail!("cannot reach mirror: {reason}");
    }
    let outcome = collaborators
        .push(&session.home, &session.event, dry_run)
        .context("mirror disappeared from collaborators")?
        .with_context(|| format!("mirror push failed for '{}'", session.event))?;

    let repo = format!("{}/{}@{}", settings.owner, settings.repo, settings.branch);
    match outcome {
        PushOutcome::Created { path } => println!("✓ Created {path} in {repo}"),
        PushOutcome::Updated { path } => println!("✓ Updated {path} in {repo}"),
        PushOutcome::Unchanged { path } => println!("✓ {path} already up to date in {repo}"),
        PushOutcome::WouldPush { path } => println!("[dry-run] would push {path} to {repo}"),
    }
    Ok(())
}
