// ABOUTME: Route handlers for player evaluation submission and per-event/per-player reads
// ABOUTME: Batch writes go through the transactional evaluation engine in the service layer
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Evaluation routes.

use crate::context::ServerResources;
use crate::errors::AppError;
use crate::services::evaluations::{self, EvaluationBatchRequest};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use uuid::Uuid;

/// Evaluation routes handler
pub struct EvaluationRoutes;

impl EvaluationRoutes {
    /// Create all evaluation routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/evaluations/batch", post(Self::handle_batch))
            .route(
                "/api/evaluations/training/:training_id",
                get(Self::handle_by_training),
            )
            .route(
                "/api/evaluations/match/:match_id",
                get(Self::handle_by_match),
            )
            .route(
                "/api/evaluations/player/:player_id",
                get(Self::handle_by_player),
            )
            .with_state(resources)
    }

    /// Handle POST /api/evaluations/batch
    async fn handle_batch(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<EvaluationBatchRequest>,
    ) -> Result<Response, AppError> {
        let auth = super::authenticate_staff(&headers, &resources)?;

        let rows = evaluations::create_batch(&resources.database, &body, auth.user_id).await?;
        Ok((StatusCode::OK, Json(rows)).into_response())
    }

    /// Handle GET /api/evaluations/training/:training_id
    async fn handle_by_training(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(training_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        super::authenticate_staff(&headers, &resources)?;

        let entries = evaluations::find_by_training(&resources.database, training_id).await?;
        Ok((StatusCode::OK, Json(entries)).into_response())
    }

    /// Handle GET /api/evaluations/match/:match_id
    async fn handle_by_match(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(match_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        super::authenticate_staff(&headers, &resources)?;

        let entries = evaluations::find_by_match(&resources.database, match_id).await?;
        Ok((StatusCode::OK, Json(entries)).into_response())
    }

    /// Handle GET /api/evaluations/player/:player_id
    async fn handle_by_player(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(player_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        super::authenticate_staff(&headers, &resources)?;

        let rows = evaluations::find_by_player(&resources.database, player_id).await?;
        Ok((StatusCode::OK, Json(rows)).into_response())
    }
}
