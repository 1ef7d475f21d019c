// ABOUTME: Route handlers for group weekly schedules and training generation
// ABOUTME: Covers schedule read/replace, bulk training generation, and future-training cleanup
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Schedule routes.
//!
//! All endpoints require an admin or coach role. Updating a schedule
//! replaces it wholesale; generation expands the stored weekly slots
//! into concrete trainings over a date range.

use crate::context::ServerResources;
use crate::database::groups::NewScheduleSlot;
use crate::errors::AppError;
use crate::services::schedule;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

/// One slot in a schedule replacement request
#[derive(Debug, Deserialize)]
pub struct ScheduleSlotBody {
    /// Day of week, 0 = Sunday .. 6 = Saturday
    pub day_of_week: u8,
    /// Start of the time window, "HH:MM"
    pub start_time: String,
    /// End of the time window, "HH:MM"
    pub end_time: String,
    /// Where the session takes place
    pub location: String,
}

impl From<ScheduleSlotBody> for NewScheduleSlot {
    fn from(body: ScheduleSlotBody) -> Self {
        Self {
            day_of_week: body.day_of_week,
            start_time: body.start_time,
            end_time: body.end_time,
            location: body.location,
        }
    }
}

/// Request body for replacing a group's schedule
#[derive(Debug, Deserialize)]
pub struct UpdateScheduleBody {
    /// The new slots; previously stored slots not listed here are deleted
    pub slots: Vec<ScheduleSlotBody>,
}

/// Request body for generating trainings from the schedule
#[derive(Debug, Deserialize)]
pub struct GenerateTrainingsBody {
    /// First date of the inclusive range
    pub from_date: NaiveDate,
    /// Last date of the inclusive range
    pub to_date: NaiveDate,
    /// Topic to stamp on every generated training
    pub default_topic: Option<String>,
}

/// Schedule routes handler
pub struct ScheduleRoutes;

impl ScheduleRoutes {
    /// Create all schedule routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/groups/:group_id/schedule", get(Self::handle_get))
            .route("/api/groups/:group_id/schedule", put(Self::handle_update))
            .route(
                "/api/groups/:group_id/schedule/generate",
                post(Self::handle_generate),
            )
            .route(
                "/api/groups/:group_id/schedule/trainings",
                delete(Self::handle_cleanup),
            )
            .with_state(resources)
    }

    /// Handle GET /api/groups/:group_id/schedule
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(group_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        super::authenticate_staff(&headers, &resources)?;

        let slots = schedule::get_schedule(&resources.database, group_id).await?;
        Ok((StatusCode::OK, Json(slots)).into_response())
    }

    /// Handle PUT /api/groups/:group_id/schedule
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(group_id): Path<Uuid>,
        Json(body): Json<UpdateScheduleBody>,
    ) -> Result<Response, AppError> {
        super::authenticate_staff(&headers, &resources)?;

        let slots: Vec<NewScheduleSlot> = body.slots.into_iter().map(Into::into).collect();
        let stored = schedule::update_schedule(&resources.database, group_id, &slots).await?;
        Ok((StatusCode::OK, Json(stored)).into_response())
    }

    /// Handle POST /api/groups/:group_id/schedule/generate
    async fn handle_generate(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(group_id): Path<Uuid>,
        Json(body): Json<GenerateTrainingsBody>,
    ) -> Result<Response, AppError> {
        super::authenticate_staff(&headers, &resources)?;

        let summary = schedule::generate_trainings(
            &resources.database,
            group_id,
            body.from_date,
            body.to_date,
            body.default_topic.as_deref(),
        )
        .await?;
        Ok((StatusCode::CREATED, Json(summary)).into_response())
    }

    /// Handle DELETE /api/groups/:group_id/schedule/trainings
    async fn handle_cleanup(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(group_id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        super::authenticate_staff(&headers, &resources)?;

        let summary =
            schedule::delete_future_generated_trainings(&resources.database, group_id).await?;
        Ok((StatusCode::OK, Json(summary)).into_response())
    }
}
