// ABOUTME: Route handlers for per-player views, currently the rating statistics endpoint
// ABOUTME: Delegates to the rating aggregator with optional date-window query parameters
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Player routes.

use crate::context::ServerResources;
use crate::errors::AppError;
use crate::services::ratings;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

/// Query parameters for the rating stats endpoint
#[derive(Debug, Deserialize, Default)]
pub struct RatingStatsQuery {
    /// Inclusive lower bound on the event date
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound on the event date
    pub end_date: Option<NaiveDate>,
}

/// Player routes handler
pub struct PlayerRoutes;

impl PlayerRoutes {
    /// Create all player routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/players/:player_id/rating-stats",
                get(Self::handle_rating_stats),
            )
            .with_state(resources)
    }

    /// Handle GET /api/players/:player_id/rating-stats
    async fn handle_rating_stats(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(player_id): Path<Uuid>,
        Query(query): Query<RatingStatsQuery>,
    ) -> Result<Response, AppError> {
        super::authenticate_staff(&headers, &resources)?;

        let stats = ratings::get_rating_stats(
            &resources.database,
            player_id,
            query.start_date,
            query.end_date,
        )
        .await?;
        Ok((StatusCode::OK, Json(stats)).into_response())
    }
}
