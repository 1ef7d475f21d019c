// ABOUTME: Evaluation batch-upsert engine, scoped per (player, event, category)
// ABOUTME: Transactional create-or-update keyed by category so distinct categories never collide
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Evaluation submission.
//!
//! Structurally parallel to attendance marking: one transaction per
//! batch, records in list order, upsert keyed by (player, event,
//! category). The acting user must own a coach profile; the resolved
//! coach is stamped onto every created or updated row.

use crate::database::{self, Database};
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::models::{CoachProfile, Evaluation, EvaluationCategory, EventRef, Player};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{Sqlite, Transaction};
use tracing::warn;
use uuid::Uuid;

/// An evaluation batch submission
#[derive(Debug, Clone, Deserialize)]
pub struct EvaluationBatchRequest {
    /// Training the batch is for; exactly one of this and `match_id`
    pub training_id: Option<Uuid>,
    /// Match the batch is for; exactly one of this and `training_id`
    pub match_id: Option<Uuid>,
    /// Records to upsert
    pub records: Vec<EvaluationRecordInput>,
}

/// One record in an evaluation batch
#[derive(Debug, Clone, Deserialize)]
pub struct EvaluationRecordInput {
    /// Player being evaluated
    pub player_id: Uuid,
    /// Rating category
    #[serde(rename = "type")]
    pub category: EvaluationCategory,
    /// Rating on a 1-10 scale
    pub rating: i64,
    /// Optional free-form comment
    pub comment: Option<String>,
}

/// An evaluation with its player and coach populated
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationEntry {
    /// The evaluation record
    #[serde(flatten)]
    pub evaluation: Evaluation,
    /// The player being evaluated
    pub player: Player,
    /// The coach who submitted it
    pub coach: CoachProfile,
}

/// Upsert a batch of evaluations against one event.
///
/// The acting user is resolved to their coach profile; records are
/// processed in order and returned in order. All-or-nothing via one
/// transaction.
///
/// # Errors
///
/// Returns `InvalidInput` if neither or both event ids are set, the
/// batch is empty, or a rating is out of range; `NotFound` for a missing
/// event, coach profile, or player; and a generic `InvalidInput`
/// ("Failed to save evaluations") for unexpected persistence failures
pub async fn create_batch(
    db: &Database,
    request: &EvaluationBatchRequest,
    coach_user_id: Uuid,
) -> AppResult<Vec<Evaluation>> {
    let event = EventRef::from_ids(request.training_id, request.match_id).ok_or_else(|| {
        AppError::invalid_input("Exactly one of trainingId or matchId must be provided")
    })?;

    if request.records.is_empty() {
        return Err(AppError::invalid_input(
            "Evaluation batch requires at least one record",
        ));
    }

    for record in &request.records {
        if !(1..=10).contains(&record.rating) {
            return Err(AppError::new(
                ErrorCode::ValueOutOfRange,
                format!("Rating must be between 1 and 10, got {}", record.rating),
            ));
        }
    }

    let mut tx = db
        .pool()
        .begin()
        .await
        .map_err(|err| super::wrap_batch_error(err.into(), "Failed to save evaluations"))?;

    match create_batch_in_tx(&mut tx, event, &request.records, coach_user_id).await {
        Ok(rows) => match tx.commit().await {
            Ok(()) => Ok(rows),
            Err(err) => Err(super::wrap_batch_error(
                err.into(),
                "Failed to save evaluations",
            )),
        },
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!("evaluation batch rollback failed: {rollback_err}");
            }
            Err(super::wrap_batch_error(err, "Failed to save evaluations"))
        }
    }
}

/// The batch body, running entirely inside the caller's transaction
async fn create_batch_in_tx(
    tx: &mut Transaction<'_, Sqlite>,
    event: EventRef,
    records: &[EvaluationRecordInput],
    coach_user_id: Uuid,
) -> AppResult<Vec<Evaluation>> {
    resolve_event(tx, event).await?;

    let coach = database::players::get_coach_by_user(&mut *tx, coach_user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Coach profile"))?;

    let mut results = Vec::with_capacity(records.len());
    for record in records {
        database::players::get_player(&mut *tx, record.player_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Player {}", record.player_id)))?;

        let now = Utc::now();
        let comment = record
            .comment
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToOwned::to_owned);

        let row = if let Some(existing) = database::evaluations::find_evaluation(
            &mut *tx,
            record.player_id,
            event,
            record.category,
        )
        .await?
        {
            database::evaluations::update_evaluation(
                &mut *tx,
                existing.id,
                record.rating,
                comment.as_deref(),
                coach.id,
                now,
            )
            .await?;

            Evaluation {
                rating: record.rating,
                comment,
                coach_id: coach.id,
                updated_at: now,
                ..existing
            }
        } else {
            let row = Evaluation {
                id: Uuid::new_v4(),
                player_id: record.player_id,
                coach_id: coach.id,
                event,
                category: record.category,
                rating: record.rating,
                comment,
                created_at: now,
                updated_at: now,
            };
            database::evaluations::insert_evaluation(&mut *tx, &row).await?;
            row
        };

        results.push(row);
    }

    Ok(results)
}

/// Get all evaluations for a training, newest first
///
/// # Errors
///
/// Returns `NotFound` if the training does not exist
pub async fn find_by_training(
    db: &Database,
    training_id: Uuid,
) -> AppResult<Vec<EvaluationEntry>> {
    db.get_training(training_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Training {training_id}")))?;

    collect_entries(db, EventRef::Training(training_id)).await
}

/// Get all evaluations for a match, newest first
///
/// # Errors
///
/// Returns `NotFound` if the match does not exist
pub async fn find_by_match(db: &Database, match_id: Uuid) -> AppResult<Vec<EvaluationEntry>> {
    db.get_match(match_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Match {match_id}")))?;

    collect_entries(db, EventRef::Match(match_id)).await
}

/// Get all evaluations for a player across all events, newest first.
/// No existence check on the player.
///
/// # Errors
///
/// Returns an error if the database query fails
pub async fn find_by_player(db: &Database, player_id: Uuid) -> AppResult<Vec<Evaluation>> {
    db.evaluations_by_player(player_id).await
}

async fn collect_entries(db: &Database, event: EventRef) -> AppResult<Vec<EvaluationEntry>> {
    let rows = db.evaluations_by_event(event).await?;

    Ok(rows
        .into_iter()
        .map(|(evaluation, player, coach)| EvaluationEntry {
            evaluation,
            player,
            coach,
        })
        .collect())
}

async fn resolve_event(tx: &mut Transaction<'_, Sqlite>, event: EventRef) -> AppResult<()> {
    match event {
        EventRef::Training(id) => {
            database::events::get_training(&mut *tx, id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Training {id}")))?;
        }
        EventRef::Match(id) => {
            database::events::get_match(&mut *tx, id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Match {id}")))?;
        }
    }
    Ok(())
}
