use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;

use tracing::info;

use playlist_edge::{AppConfig, ApplicationServer, Logger};

// stateless edge service - parse uploads, regenerate playlists, relay
// downloads. nothing survives a request
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let config = Arc::new(AppConfig::parse());

    // init logger and sentry, guards are kept alive to flush logs and maintain sentry connection
    let _guards = Logger::init(config.cargo_env, config.sentry_dsn.clone());

    info!("logger and env prepped, starting server...");

    ApplicationServer::serve(config)
        .await
        .context("server failed to start")?;

    Ok(())
}
