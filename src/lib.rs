// ABOUTME: Main library entry point for the academy management backend
// ABOUTME: Exposes scheduling, attendance, evaluation, and rating services over a REST API
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

#![deny(unsafe_code)]

//! # Academy Server
//!
//! Backend for a youth sports academy: weekly training schedules expanded
//! into concrete sessions, per-event attendance with batch marking, coach
//! evaluations per player and category, and rating statistics over time.
//!
//! ## Architecture
//!
//! - **Models**: Domain types shared across layers
//! - **Database**: `SQLite` storage via `sqlx`, split per domain
//! - **Services**: The scheduling, attendance, evaluation, and rating engines
//! - **Routes**: REST surface built on `axum`
//! - **Auth**: JWT bearer tokens carrying the user's role
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use academy_server::config::environment::ServerConfig;
//! use anyhow::Result;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("Academy server configured with port: HTTP={}", config.http_port);
//!     Ok(())
//! }
//! ```

/// JWT-based authentication and token validation
pub mod auth;

/// Server configuration from environment variables
pub mod config;

/// Shared server resources handed to route handlers
pub mod context;

/// `SQLite` storage layer
pub mod database;

/// Unified error handling
pub mod errors;

/// Logging configuration
pub mod logging;

/// Domain models
pub mod models;

/// REST routes
pub mod routes;

/// Domain services
pub mod services;
