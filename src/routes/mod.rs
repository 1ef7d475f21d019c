// ABOUTME: REST route registration and the shared bearer-token authentication helpers
// ABOUTME: Assembles the per-domain routers into the server's single axum Router
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! REST routes.
//!
//! Every data endpoint authenticates the bearer token and checks the
//! caller's role; schedule, attendance, and evaluation writes are
//! restricted to admins and coaches.

pub mod attendance;
pub mod evaluations;
pub mod health;
pub mod players;
pub mod schedule;

use crate::auth::AuthResult;
use crate::context::ServerResources;
use crate::errors::AppError;
use crate::models::UserRole;
use axum::{http::HeaderMap, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the complete application router
pub fn router(resources: Arc<ServerResources>) -> Router {
    Router::new()
        .merge(health::HealthRoutes::routes())
        .merge(schedule::ScheduleRoutes::routes(resources.clone()))
        .merge(attendance::AttendanceRoutes::routes(resources.clone()))
        .merge(evaluations::EvaluationRoutes::routes(resources.clone()))
        .merge(players::PlayerRoutes::routes(resources))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Extract and validate the bearer token from the authorization header
pub(crate) fn authenticate(
    headers: &HeaderMap,
    resources: &Arc<ServerResources>,
) -> Result<AuthResult, AppError> {
    let auth_header = headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(AppError::auth_required)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::auth_invalid("Authorization header must use the Bearer scheme"))?;

    resources.auth_manager.validate_token(token)
}

/// Authenticate and require an admin or coach role
pub(crate) fn authenticate_staff(
    headers: &HeaderMap,
    resources: &Arc<ServerResources>,
) -> Result<AuthResult, AppError> {
    let auth = authenticate(headers, resources)?;
    match auth.role {
        UserRole::Admin | UserRole::Coach => Ok(auth),
        UserRole::Player | UserRole::Parent => Err(AppError::permission_denied(
            "Admin or coach role required",
        )),
    }
}
