use atlas_config::config::Config;
use atlas_db::migration::{apply_migrations, migration_status, revert_last_migration};
use nu_ansi_term::Color::{Green, Yellow};
use tabled::{builder::Builder, settings::Style};
use tracing::info;

use crate::{
    cli::MigrateAction,
    error::AtlasResult,
    utils::{open_database, Colored, Icons},
};

pub fn migrate(config: &Config, action: &MigrateAction, json: bool) -> AtlasResult<()> {
    let mut db = open_database(config, false)?;

    match action {
        MigrateAction::Up => {
            let applied = apply_migrations(db.conn())?;
            if applied.is_empty() {
                info!("Database schema is up to date");
            }
            for version in applied {
                info!("{} Applied {}", Colored(Green, Icons::CHECK), version);
            }
        }
        MigrateAction::Down => {
            let version = revert_last_migration(db.conn())?;
            info!("{} Reverted {}", Colored(Yellow, Icons::CROSS), version);
        }
        MigrateAction::Status => {
            let status = migration_status(db.conn())?;
            if json {
                info!("{}", serde_json::to_string(&status)?);
                return Ok(());
            }

            let mut builder = Builder::new();
            builder.push_record(["Migration", "Status"]);
            for migration in &status {
                let state = if migration.applied {
                    format!("{} applied", Colored(Green, Icons::CHECK))
                } else {
                    format!("{} pending", Colored(Yellow, Icons::PENDING))
                };
                builder.push_record([migration.name.clone(), state]);
            }
            let table = builder.build().with(Style::rounded()).to_string();
            info!("\n{table}");
        }
    }

    Ok(())
}
