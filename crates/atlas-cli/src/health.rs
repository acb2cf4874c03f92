use atlas_config::config::Config;
use atlas_db::{
    heartbeat::{check_heartbeat, HeartbeatResult},
    migration::migration_status,
    repository::{ContinentRepository, CountryRepository},
    ConnectionOptions, DbConnection,
};
use nu_ansi_term::Color::{Blue, Green, Red, Yellow};
use serde::Serialize;
use tabled::{
    builder::Builder,
    settings::{themes::BorderCorrection, Panel, Style},
};
use tracing::info;

use crate::{
    error::{AtlasError, AtlasResult},
    utils::{Colored, Icons},
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub database: String,
    pub heartbeat: HeartbeatResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_migrations: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub continents: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub countries: Option<i64>,
}

/// Checks the configured database without applying migrations.
pub fn check_health(config: &Config) -> HealthReport {
    let path = config.database_path();
    let options = ConnectionOptions {
        busy_timeout: config.busy_timeout(),
        run_migrations: false,
    };

    let mut report = HealthReport {
        database: path.display().to_string(),
        heartbeat: HeartbeatResult {
            is_ok: false,
            error: None,
        },
        pending_migrations: None,
        continents: None,
        countries: None,
    };

    let mut db = match DbConnection::open(&path, &options) {
        Ok(db) => db,
        Err(err) => {
            report.heartbeat.error = Some(err.to_string());
            return report;
        }
    };

    report.heartbeat = check_heartbeat(db.conn(), None);
    if !report.heartbeat.is_ok {
        return report;
    }

    report.pending_migrations = migration_status(db.conn())
        .ok()
        .map(|status| status.iter().filter(|m| !m.applied).count());
    report.continents = ContinentRepository::repository()
        .count_by_criteria(db.conn(), None)
        .ok();
    report.countries = CountryRepository::repository()
        .count_by_criteria(db.conn(), None)
        .ok();
    report
}

fn count_cell(count: Option<i64>) -> String {
    match count {
        Some(n) => Colored(Blue, n).to_string(),
        None => format!("{} table missing", Colored(Yellow, "!")),
    }
}

pub fn display_health(config: &Config, json: bool) -> AtlasResult<()> {
    let report = check_health(config);

    if json {
        info!("{}", serde_json::to_string(&report)?);
    } else {
        let mut builder = Builder::new();
        builder.push_record(["Database".to_string(), Colored(Blue, &report.database).to_string()]);

        let connection = match &report.heartbeat.error {
            None => format!("{} OK", Colored(Green, Icons::CHECK)),
            Some(err) => format!("{} {}", Colored(Red, Icons::CROSS), err),
        };
        builder.push_record(["Connection".to_string(), connection]);

        if report.heartbeat.is_ok {
            let migrations = match report.pending_migrations {
                Some(0) => format!("{} Up to date", Colored(Green, Icons::CHECK)),
                Some(n) => format!("{} {} pending", Colored(Yellow, Icons::PENDING), n),
                None => format!("{} Unknown", Colored(Yellow, "!")),
            };
            builder.push_record(["Migrations".to_string(), migrations]);
            builder.push_record(["Continents".to_string(), count_cell(report.continents)]);
            builder.push_record(["Countries".to_string(), count_cell(report.countries)]);
        }

        let table = builder
            .build()
            .with(Panel::header("Database Health Check"))
            .with(Style::rounded())
            .with(BorderCorrection {})
            .to_string();
        info!("\n{table}");
    }

    if !report.heartbeat.is_ok {
        return Err(AtlasError::Custom("Database is unreachable".into()));
    }
    if report.pending_migrations.unwrap_or(0) > 0 {
        info!("Run {} to apply them", Colored(Green, "atlas migrate up"));
    }
    Ok(())
}
