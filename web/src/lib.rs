//! Web layer of the social login service.
//!
//! Wires the axum router together with the session and CORS middleware and runs the
//! HTTP listener. Request handling lives in [`controller`] with the URL surface
//! declared in [`router`].

use axum::http::{
    header::{AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use log::*;
use time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use domain::error::{DomainErrorKind, Error as DomainError, InternalErrorKind};
use service::config::Config;

pub use self::error::{Error, Result};
pub use service::AppState;

pub(crate) mod controller;
pub(crate) mod error;
pub(crate) mod extractors;
pub(crate) mod params;
pub(crate) mod router;

pub async fn init_server(app_state: AppState) -> Result<()> {
    // Pending login state lives in Postgres backed sessions so a login attempt survives
    // a restart between the authorize and callback legs.
    let session_store = PostgresStore::new(
        app_state
            .database_connection
            .get_postgres_connection_pool()
            .clone(),
    );
    session_store
        .migrate()
        .await
        .map_err(|err| startup_error("Failed to run session store migrations", Box::new(err)))?;

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(app_state.config.is_production())
        .with_expiry(Expiry::OnInactivity(Duration::seconds(
            app_state.config.backend_session_expiry_seconds as i64,
        )));

    let cors_layer = cors_layer(&app_state.config)?;

    let host = app_state
        .config
        .interface
        .clone()
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let port = app_state.config.port;
    let listen_addr = format!("{host}:{port}");

    info!("Server starting... listening on {listen_addr}");

    let router = router::define_routes(app_state)
        .layer(session_layer)
        .layer(cors_layer);

    let listener = TcpListener::bind(&listen_addr)
        .await
        .map_err(|err| startup_error(&format!("Failed to bind {listen_addr}"), Box::new(err)))?;
    axum::serve(listener, router)
        .await
        .map_err(|err| startup_error("Server stopped unexpectedly", Box::new(err)))?;

    Ok(())
}

fn cors_layer(config: &Config) -> Result<CorsLayer> {
    let allowed_origins = config
        .allowed_origins
        .iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect::<core::result::Result<Vec<_>, _>>()
        .map_err(|err| startup_error("Invalid allowed origin", Box::new(err)))?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true))
}

fn startup_error(message: &str, source: Box<dyn std::error::Error + Send + Sync>) -> DomainError {
    error!("{message}: {source:?}");
    DomainError {
        source: Some(source),
        error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(message.to_string())),
    }
}
