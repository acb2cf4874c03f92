use std::env;

use atlas_config::config::{self, generate_default_config, get_config, set_config_path};
use clap::Parser;
use cli::{Args, Commands};
use error::{AtlasResult, ErrorContext};
use health::display_health;
use import::import_countries;
use logging::setup_logging;
use migrate::migrate;
use seed::seed;
use serve::serve;
use tracing::info;
use utils::set_color;

mod api;
mod cli;
mod error;
mod health;
mod import;
mod logging;
mod migrate;
mod seed;
mod serve;
mod utils;

async fn handle_cli() -> AtlasResult<()> {
    let args = Args::parse();

    setup_logging(&args);

    if args.no_color {
        set_color(false);
    }

    if let Some(ref c) = args.config {
        let path = std::path::PathBuf::from(c);
        let path = if path.is_absolute() {
            path
        } else {
            env::current_dir()
                .with_context(|| "retrieving current directory".into())?
                .join(path)
        };
        set_config_path(path);
    }

    if let Commands::DefConfig = args.command {
        generate_default_config()?;
        return Ok(());
    }

    config::init()?;
    let config = get_config();

    match args.command {
        Commands::Serve { host, port } => serve(config, host, port).await?,
        Commands::Migrate { action } => migrate(&config, &action, args.json)?,
        Commands::Seed => seed(&config)?,
        Commands::Import {
            file,
            chunk_size,
            replace,
        } => import_countries(&config, &file, chunk_size, replace)?,
        Commands::Health => display_health(&config, args.json)?,
        Commands::Config => {
            info!("# {}", config::config_path().display());
            info!("{}", toml::to_string_pretty(&config)?);
        }
        Commands::DefConfig => {}
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    if let Err(err) = handle_cli().await {
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(1);
    }
}
