// ABOUTME: Route handlers for attendance marking, per-event reads, and attendance statistics
// ABOUTME: Batch writes go through the transactional marking engine in the service layer
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Attendance routes.

use crate::context::ServerResources;
use crate::errors::AppError;
use crate::models::EventRef;
use crate::services::attendance::{self, AttendanceRecordInput};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

/// Request body for a batch attendance write
#[derive(Debug, Deserialize)]
pub struct AttendanceBatchBody {
    /// Training the batch is for; exactly one of this and `match_id`
    pub training_id: Option<Uuid>,
    /// Match the batch is for; exactly one of this and `training_id`
    pub match_id: Option<Uuid>,
    /// Records to upsert
    pub records: Vec<AttendanceRecordInput>,
}

/// Query parameters for the stats endpoint
#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    /// Comma-separated player ids to aggregate over
    pub player_ids: String,
}

/// Attendance routes handler
pub struct AttendanceRoutes;

impl AttendanceRoutes {
    /// Create all attendance routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/attendance/batch", post(Self::handle_batch))
            .route(
                "/api/attendance/training/:training_id",
                get(Self::handle_by_training),
            )
            .route("/api/attendance/match/:match_id", get(Self::handle_by_match))
            .route("/api/attendance/stats", get(Self::handle_stats))
            .with_state(resources)
    }

    /// Handle POST /api/attendance/batch
    async fn handle_batch(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<AttendanceBatchBody>,
    ) -> Result<Response, AppError> {
        super::authenticate_staff(&headers, &resources)?;

        let event = EventRef::from_ids(body.training_id, body.match_id).ok_or_else(|| {
            AppError::invalid_input("Exactly one of trainingId or matchId must be provided")
        })?;

        let rows = attendance::mark_batch(&resources.database, event, &body.records).await?;
        Ok((StatusCode::OK, Json(rows)).into_response())
    }

    /// Handle GET /api/attendance/training/:training_id
    async fn handle_by_training(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(training_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        super::authenticate_staff(&headers, &resources)?;

        resources
            .database
            .get_training(training_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Training {training_id}")))?;

        let entries =
            attendance::find_by_event(&resources.database, EventRef::Training(training_id)).await?;
        Ok((StatusCode::OK, Json(entries)).into_response())
    }

    /// Handle GET /api/attendance/match/:match_id
    async fn handle_by_match(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(match_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        super::authenticate_staff(&headers, &resources)?;

        resources
            .database
            .get_match(match_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Match {match_id}")))?;

        let entries =
            attendance::find_by_event(&resources.database, EventRef::Match(match_id)).await?;
        Ok((StatusCode::OK, Json(entries)).into_response())
    }

    /// Handle GET /api/attendance/stats?player_ids=a,b,c
    async fn handle_stats(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<StatsQuery>,
    ) -> Result<Response, AppError> {
        super::authenticate_staff(&headers, &resources)?;

        let player_ids = parse_id_list(&query.player_ids)?;
        let stats = attendance::get_player_stats(&resources.database, &player_ids).await?;
        Ok((StatusCode::OK, Json(stats)).into_response())
    }
}

/// Parse a comma-separated list of uuids
fn parse_id_list(raw: &str) -> Result<Vec<Uuid>, AppError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            Uuid::parse_str(s).map_err(|_| AppError::invalid_input(format!("Invalid player id '{s}'")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_list() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let parsed = parse_id_list(&format!("{a}, {b}")).unwrap();
        assert_eq!(parsed, vec![a, b]);

        assert!(parse_id_list("not-a-uuid").is_err());
        assert!(parse_id_list("").unwrap().is_empty());
    }
}
