// ABOUTME: Database management and schema migrations for the academy server
// ABOUTME: Owns the SQLite pool and wires per-domain operation modules onto the Database struct
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Database Management
//!
//! This module provides storage for the academy server. Operations are
//! split by domain across submodules which extend [`Database`]; multi-step
//! upserts additionally expose transaction-scoped free functions that take
//! a `&mut SqliteConnection`, so the caller's transaction is explicit in
//! the signature rather than implied by shared state.

pub mod attendance;
pub mod evaluations;
pub mod events;
pub mod groups;
pub mod players;
pub mod users;

use crate::errors::{AppError, AppResult};
use anyhow::Result;
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};
use uuid::Uuid;

/// Database manager for academy data
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Create a new database connection and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or a migration fails
    pub async fn new(database_url: &str) -> Result<Self> {
        // Ensure SQLite creates the database file if it doesn't exist
        let connection_options = if database_url.starts_with("sqlite:") && !database_url.contains('?')
        {
            format!("{database_url}?mode=rwc")
        } else {
            database_url.to_string()
        };

        // An in-memory SQLite database exists per connection, so the pool
        // must not hand out more than one
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(&connection_options)
            .await?;

        let db = Self { pool };

        db.migrate().await?;

        Ok(db)
    }

    /// Get a reference to the database pool for advanced operations
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if table or index creation fails
    pub async fn migrate(&self) -> Result<()> {
        self.migrate_users().await?;
        self.migrate_groups().await?;
        self.migrate_players().await?;
        self.migrate_events().await?;
        self.migrate_attendance().await?;
        self.migrate_evaluations().await?;

        Ok(())
    }
}

/// Parse a TEXT uuid column, mapping failures to a database error
pub(crate) fn parse_uuid(value: &str, column: &str) -> AppResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|e| AppError::database(format!("Invalid uuid in column {column}: {e}")))
}

/// Parse a nullable TEXT uuid column
pub(crate) fn parse_uuid_opt(value: Option<&str>, column: &str) -> AppResult<Option<Uuid>> {
    value.map(|v| parse_uuid(v, column)).transpose()
}
