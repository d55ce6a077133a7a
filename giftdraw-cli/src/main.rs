//! giftdraw — event registration with random gift categories.
//!
//! # Usage
//!
//! ```text
//! giftdraw init [--event <name>]
//! giftdraw register <name> <phone> [--companions N] [--no-animation] [--json]
//! giftdraw lookup <phone> [--json]
//! giftdraw status [--json]
//! giftdraw admin --passphrase <p> guests [--json]
//! giftdraw admin --passphrase <p> capacity <category> <capacity>
//! giftdraw admin --passphrase <p> edit <phone> [--name N] [--new-phone P] [--companions N]
//! giftdraw admin --passphrase <p> delete <phone>
//! giftdraw mirror push [--dry-run]
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    admin::AdminArgs, init::InitArgs, lookup::LookupArgs, mirror::MirrorCommand,
    register::RegisterArgs, status::StatusArgs, Session,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "giftdraw",
    version,
    about = "Register event guests and draw their gift category",
    long_about = None,
)]
struct Cli {
    /// Event to operate on (default: settings `default_event` or GIFTDRAW_EVENT).
    #[arg(long, global = true)]
    event: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the event tables, seeding the configured categories.
    Init(InitArgs),

    /// Register a guest and draw their gift category.
    Register(RegisterArgs),

    /// Show the category assigned to a phone number.
    Lookup(LookupArgs),

    /// Capacity and assignment dashboard.
    Status(StatusArgs),

    /// Passphrase-gated guest and capacity management.
    Admin(AdminArgs),

    /// Push the guest list to the configured remote mirror.
    Mirror {
        #[command(subcommand)]
        command: MirrorCommand,
    },
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    // a missing .env is fine
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    let session = Session::open(cli.event)?;
    match cli.command {
        Commands::Init(args) => args.run(&session),
        Commands::Register(args) => args.run(&session),
        Commands::Lookup(args) => args.run(&session),
        Commands::Status(args) => args.run(&session),
        Commands::Admin(args) => args.run(&session),
        Commands::Mirror { command } => commands::mirror::run(command, &session),
    }
}

/// Logs go to stderr; collaborator warnings are printed by the commands
/// themselves, so the default level is `error`.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
