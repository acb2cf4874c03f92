use std::path::PathBuf;

use atlas_db::repository::DEFAULT_CHUNK_SIZE;
use clap::{ArgAction, Parser, Subcommand, ValueHint};

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    help_template = "{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}",
    arg_required_else_help = true
)]
pub struct Args {
    /// Set output verbosity
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress outputs
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output as json
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Provide custom config file
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<String>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the REST API
    Serve {
        /// Address to bind, overrides the configured host
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on, overrides the configured port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Manage the database schema
    #[command(arg_required_else_help = true)]
    Migrate {
        #[clap(subcommand)]
        action: MigrateAction,
    },

    /// Reload the continent seed data
    Seed,

    /// Load countries from a JSON array file
    #[command(arg_required_else_help = true)]
    Import {
        /// File containing camelCase country objects
        #[arg(required = true, value_hint = ValueHint::FilePath)]
        file: PathBuf,

        /// Rows inserted per statement
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,

        /// Delete existing countries before importing
        #[arg(long)]
        replace: bool,
    },

    /// Check that the database is reachable
    Health,

    /// Print the effective configuration
    Config,

    /// Generate default config with documentation
    #[clap(name = "defconfig")]
    DefConfig,
}

#[derive(Subcommand)]
pub enum MigrateAction {
    /// Apply pending migrations
    Up,
    /// Revert the last applied migration
    Down,
    /// List migrations and whether they are applied
    Status,
}
