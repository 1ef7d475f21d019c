// ABOUTME: Shared server resources handed to every route via Arc
// ABOUTME: Bundles the database pool, auth manager, and configuration
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Shared server state.

use crate::auth::AuthManager;
use crate::config::ServerConfig;
use crate::database::Database;

/// Resources shared across all request handlers
pub struct ServerResources {
    /// Database access
    pub database: Database,
    /// Token issuing and validation
    pub auth_manager: AuthManager,
    /// Server configuration
    pub config: ServerConfig,
}

impl ServerResources {
    /// Bundle the shared resources
    #[must_use]
    pub fn new(database: Database, auth_manager: AuthManager, config: ServerConfig) -> Self {
        Self {
            database,
            auth_manager,
            config,
        }
    }
}
