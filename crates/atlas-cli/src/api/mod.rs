//! HTTP API over the reference data.
//!
//! Read routes are always mounted. `POST`, `PATCH` and `DELETE` on countries
//! are only added when the server is not read-only.

use std::sync::{Arc, Mutex, PoisonError};

use atlas_config::config::Config;
use atlas_db::{DbConnection, SqliteConnection};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod error;
pub mod handlers;

use error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<DbConnection>>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: DbConnection, config: Config) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            config: Arc::new(config),
        }
    }

    /// Runs `f` against the shared connection on the blocking pool.
    pub async fn with_db<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteConnection) -> atlas_db::Result<T> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let mut guard = db.lock().unwrap_or_else(PoisonError::into_inner);
            f(guard.conn())
        })
        .await
        .map_err(ApiError::internal)?
        .map_err(ApiError::from)
    }
}

pub fn router(state: AppState) -> Router {
    let mut country = get(handlers::country_by_code);
    let mut router = Router::new()
        .route("/continents", get(handlers::list_continents))
        .route(
            "/countries/:continent_code",
            get(handlers::countries_by_continent),
        )
        .route(
            "/countries/:continent_code/:page_number/:page_size/:order_by/:order_desc",
            get(handlers::countries_page),
        )
        .route("/health", get(handlers::health));

    if !state.config.read_only() {
        country = country
            .patch(handlers::update_country)
            .delete(handlers::delete_country);
        router = router.route("/country", post(handlers::create_country));
    }

    router
        .route("/country/:country_code", country)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
