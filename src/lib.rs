pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod state;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{AppConfig, StorageBackend};
use crate::database::{MemoryStore, PgStore, Store};
use crate::state::AppState;

/// Build the full HTTP application for the given state.
pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    let router = Router::new()
        // Public
        .route("/", get(handlers::public::system::root))
        .route("/health", get(handlers::public::system::health))
        .merge(public_routes())
        // Protected API
        .merge(protected_routes(state.clone()))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(cors_layer(&config.security.cors_origins))
                .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes)),
        );

    if config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

fn public_routes() -> Router<AppState> {
    use handlers::public::{auth, profile};

    Router::new()
        .route("/auth/login", post(auth::admin_login))
        .route("/auth/login/:slug", post(auth::entreprise_login))
        .route("/public/:slug", get(profile::public_profile))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use handlers::protected::{contacts, dashboard, entreprise, factures, missions, profile, whoami};

    Router::new()
        .route("/api/auth/whoami", get(whoami::whoami))
        .route("/api/entreprise", get(entreprise::get_own).put(entreprise::update_own))
        .route("/api/dashboard", get(dashboard::summary))
        .route("/api/contacts", get(contacts::list).post(contacts::create))
        .route(
            "/api/contacts/:id",
            get(contacts::get).put(contacts::update).delete(contacts::delete),
        )
        .route("/api/missions", get(missions::list).post(missions::create))
        .route(
            "/api/missions/:id",
            get(missions::get).put(missions::update).delete(missions::delete),
        )
        .route("/api/factures", get(factures::list).post(factures::create))
        .route(
            "/api/factures/:id",
            get(factures::get).put(factures::update).delete(factures::delete),
        )
        .route("/api/factures/:id/status", post(factures::change_status))
        .route("/api/profile", get(profile::get_own).put(profile::upsert_own))
        .merge(admin_routes())
        // route_layer so unknown paths still 404 instead of 401
        .route_layer(from_fn_with_state(state, middleware::require_auth))
}

fn admin_routes() -> Router<AppState> {
    use handlers::elevated::entreprises;

    Router::new()
        .route(
            "/api/admin/entreprises",
            get(entreprises::list).post(entreprises::create),
        )
        .route("/api/admin/entreprises/:slug", axum::routing::delete(entreprises::delete))
        .route_layer(from_fn(middleware::require_admin))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return base.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", o);
                None
            }
        })
        .collect();
    base.allow_origin(AllowOrigin::list(origins))
}

/// Open the configured storage backend. Postgres schemas are brought up to
/// date before the store is handed out.
pub async fn connect_store(config: &AppConfig) -> anyhow::Result<Arc<dyn Store>> {
    match config.database.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StorageBackend::Postgres => {
            let store = PgStore::connect(&config.database).await?;
            store.migrate().await?;
            Ok(Arc::new(store))
        }
    }
}
