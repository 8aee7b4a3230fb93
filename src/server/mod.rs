pub mod api;
pub mod dtos;
pub mod error;
pub mod services;
pub mod utils;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::get;
use axum::{Extension, Router};
use once_cell::sync::Lazy;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::AppConfig;
use crate::server::api::health_controller::health_endpoint;
use crate::server::api::playlist_controller::PlaylistController;
use crate::server::api::relay_controller::RelayController;
use crate::server::services::app_services::AppServices;

static START_TIME: Lazy<Instant> = Lazy::new(Instant::now);

pub fn get_uptime_seconds() -> u64 {
    START_TIME.elapsed().as_secs()
}

pub fn get_app_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub struct ApplicationServer;

impl ApplicationServer {
    pub async fn serve(config: Arc<AppConfig>) -> anyhow::Result<()> {
        // pin the start time before anything can ask for uptime
        Lazy::force(&START_TIME);

        let port = config.port;
        let max_body = config.max_upload_mb * 1024 * 1024;
        let cors = Self::build_cors(&config);

        let services = AppServices::new(config);

        let app = Router::new()
            .nest(
                "/api/v1",
                Router::new()
                    .route("/health", get(health_endpoint))
                    .nest("/playlist", PlaylistController::app())
                    .nest("/proxy", RelayController::app()),
            )
            .layer(TraceLayer::new_for_http())
            .layer(cors)
            // upload ceiling is enforced by the platform before the parser
            // ever sees a byte
            .layer(DefaultBodyLimit::max(max_body))
            .layer(Extension(services));

        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .context("Failed to bind server port")?;

        info!("listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(Self::shutdown_signal())
            .await
            .context("Server stopped unexpectedly")?;

        Ok(())
    }

    // * means everything, otherwise a comma seperated list of origins from
    // both the normal and the preview config values
    fn build_cors(config: &AppConfig) -> CorsLayer {
        let mut origins: Vec<HeaderValue> = Vec::new();
        let mut allow_any = false;

        for origin in config
            .cors_origin
            .split(',')
            .chain(config.preview_cors_origin.split(','))
        {
            let origin = origin.trim();
            if origin == "*" {
                allow_any = true;
            } else if !origin.is_empty() {
                if let Ok(value) = origin.parse::<HeaderValue>() {
                    origins.push(value);
                }
            }
        }

        let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
        if allow_any {
            layer.allow_origin(Any)
        } else {
            layer.allow_origin(AllowOrigin::list(origins))
        }
    }

    async fn shutdown_signal() {
        let _ = tokio::signal::ctrl_c().await;
        info!("shutdown signal received");
    }
}
