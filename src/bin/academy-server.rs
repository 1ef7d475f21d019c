// ABOUTME: Main server binary wiring configuration, database, auth, and the REST router
// ABOUTME: Listens on the configured HTTP port and serves the academy API
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Academy Server Binary
//!
//! Starts the academy management API with JWT authentication and
//! `SQLite` storage.

use academy_server::{
    auth::AuthManager, config::environment::ServerConfig, context::ServerResources,
    database::Database, logging, routes,
};
use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "academy-server")]
#[command(about = "Academy management API - scheduling, attendance, and evaluations")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override database URL
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(database_url) = args.database_url {
        config.database_url = database_url;
    }

    logging::init_from_env()?;

    info!("Starting Academy Server");
    info!("{}", config.summary());

    let database = Database::new(&config.database_url).await?;
    info!("Database initialized: {}", config.database_url);

    let auth_manager = AuthManager::new(config.jwt_secret.as_bytes(), config.jwt_expiry_hours);

    let http_port = config.http_port;
    let resources = Arc::new(ServerResources::new(database, auth_manager, config));
    let app = routes::router(resources);

    let addr = format!("0.0.0.0:{http_port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
