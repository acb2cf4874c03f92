//! Database liveness check.

use diesel::{sql_query, RunQueryDsl, SqliteConnection};
use serde::Serialize;
use tracing::warn;

pub const DEFAULT_HEARTBEAT_QUERY: &str = "SELECT 1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatResult {
    pub is_ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Runs `query` (default `SELECT 1`) and reports whether it succeeded.
///
/// Failures are returned in [`HeartbeatResult::error`], never as `Err`.
pub fn check_heartbeat(conn: &mut SqliteConnection, query: Option<&str>) -> HeartbeatResult {
    match sql_query(query.unwrap_or(DEFAULT_HEARTBEAT_QUERY)).execute(conn) {
        Ok(_) => HeartbeatResult {
            is_ok: true,
            error: None,
        },
        Err(err) => {
            warn!(error = %err, "heartbeat query failed");
            HeartbeatResult {
                is_ok: false,
                error: Some(err.to_string()),
            }
        }
    }
}
