// ABOUTME: Evaluation row storage with category-scoped upsert primitives and cascade deletion
// ABOUTME: Runs on a caller-supplied transaction for batch writes; joined reads feed the rating views
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::{parse_uuid, Database};
use crate::errors::{AppError, AppResult};
use crate::models::{CoachProfile, EvaluationCategory, Evaluation, EventRef, Player};
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection};
use uuid::Uuid;

impl Database {
    /// Create the evaluations table
    pub(super) async fn migrate_evaluations(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS evaluations (
                id TEXT PRIMARY KEY,
                player_id TEXT NOT NULL REFERENCES players(id) ON DELETE CASCADE,
                coach_id TEXT NOT NULL REFERENCES coaches(id),
                training_id TEXT REFERENCES trainings(id) ON DELETE CASCADE,
                match_id TEXT REFERENCES matches(id) ON DELETE CASCADE,
                category TEXT NOT NULL CHECK (category IN ('technique', 'tactics', 'physical', 'psychological')),
                rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 10),
                comment TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                CHECK ((training_id IS NULL) != (match_id IS NULL)),
                UNIQUE (player_id, training_id, category),
                UNIQUE (player_id, match_id, category)
            )
            ",
        )
        .execute(self.pool())
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_evaluations_training ON evaluations(training_id)",
        )
        .execute(self.pool())
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_evaluations_match ON evaluations(match_id)")
            .execute(self.pool())
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_evaluations_player ON evaluations(player_id)")
            .execute(self.pool())
            .await?;

        Ok(())
    }

    /// Get all evaluations for an event with player and coach populated,
    /// newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn evaluations_by_event(
        &self,
        event: EventRef,
    ) -> AppResult<Vec<(Evaluation, Player, CoachProfile)>> {
        let column = event_column(event);
        let query = format!(
            r"
            SELECT e.id, e.player_id, e.coach_id, e.training_id, e.match_id, e.category,
                   e.rating, e.comment, e.created_at, e.updated_at,
                   p.id AS p_id, p.user_id AS p_user_id, p.group_id AS p_group_id,
                   p.first_name AS p_first_name, p.last_name AS p_last_name,
                   p.created_at AS p_created_at,
                   c.id AS c_id, c.user_id AS c_user_id, c.first_name AS c_first_name,
                   c.last_name AS c_last_name, c.created_at AS c_created_at
            FROM evaluations e
            JOIN players p ON p.id = e.player_id
            JOIN coaches c ON c.id = e.coach_id
            WHERE e.{column} = $1
            ORDER BY e.created_at DESC
            "
        );

        let rows = sqlx::query(&query)
            .bind(event.id().to_string())
            .fetch_all(self.pool())
            .await?;

        rows.iter()
            .map(|row| {
                Ok((
                    row_to_evaluation(row)?,
                    row_to_joined_player(row)?,
                    row_to_joined_coach(row)?,
                ))
            })
            .collect()
    }

    /// Get all evaluations for a player across all events, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn evaluations_by_player(&self, player_id: Uuid) -> AppResult<Vec<Evaluation>> {
        let rows = sqlx::query(
            r"
            SELECT id, player_id, coach_id, training_id, match_id, category, rating, comment,
                   created_at, updated_at
            FROM evaluations
            WHERE player_id = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(player_id.to_string())
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(row_to_evaluation).collect()
    }

    /// Get a player's evaluations joined with the start time of the event
    /// each one attaches to, ascending by creation time
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn evaluations_with_event_start(
        &self,
        player_id: Uuid,
    ) -> AppResult<Vec<(Evaluation, DateTime<Utc>)>> {
        let rows = sqlx::query(
            r"
            SELECT e.id, e.player_id, e.coach_id, e.training_id, e.match_id, e.category,
                   e.rating, e.comment, e.created_at, e.updated_at,
                   COALESCE(t.start_time, m.start_time) AS event_start
            FROM evaluations e
            LEFT JOIN trainings t ON t.id = e.training_id
            LEFT JOIN matches m ON m.id = e.match_id
            WHERE e.player_id = $1
            ORDER BY e.created_at ASC
            ",
        )
        .bind(player_id.to_string())
        .fetch_all(self.pool())
        .await?;

        rows.iter()
            .map(|row| {
                let event_start: DateTime<Utc> = row.get("event_start");
                Ok((row_to_evaluation(row)?, event_start))
            })
            .collect()
    }
}

/// Find the evaluation for (player, event, category) on the caller's
/// transaction. The key includes the category, so distinct categories
/// never collide.
pub(crate) async fn find_evaluation(
    conn: &mut SqliteConnection,
    player_id: Uuid,
    event: EventRef,
    category: EvaluationCategory,
) -> AppResult<Option<Evaluation>> {
    let column = event_column(event);
    let query = format!(
        r"
        SELECT id, player_id, coach_id, training_id, match_id, category, rating, comment,
               created_at, updated_at
        FROM evaluations
        WHERE player_id = $1 AND {column} = $2 AND category = $3
        "
    );

    let row = sqlx::query(&query)
        .bind(player_id.to_string())
        .bind(event.id().to_string())
        .bind(category.as_str())
        .fetch_optional(conn)
        .await?;

    row.as_ref().map(row_to_evaluation).transpose()
}

/// Insert a new evaluation row on the caller's transaction
pub(crate) async fn insert_evaluation(
    conn: &mut SqliteConnection,
    record: &Evaluation,
) -> AppResult<()> {
    sqlx::query(
        r"
        INSERT INTO evaluations (id, player_id, coach_id, training_id, match_id, category,
                                 rating, comment, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        ",
    )
    .bind(record.id.to_string())
    .bind(record.player_id.to_string())
    .bind(record.coach_id.to_string())
    .bind(record.event.training_id().map(|id| id.to_string()))
    .bind(record.event.match_id().map(|id| id.to_string()))
    .bind(record.category.as_str())
    .bind(record.rating)
    .bind(&record.comment)
    .bind(record.created_at)
    .bind(record.updated_at)
    .execute(conn)
    .await?;

    Ok(())
}

/// Overwrite rating, comment, and coach of an existing evaluation on the
/// caller's transaction
pub(crate) async fn update_evaluation(
    conn: &mut SqliteConnection,
    id: Uuid,
    rating: i64,
    comment: Option<&str>,
    coach_id: Uuid,
    updated_at: DateTime<Utc>,
) -> AppResult<()> {
    sqlx::query(
        r"
        UPDATE evaluations SET rating = $2, comment = $3, coach_id = $4, updated_at = $5
        WHERE id = $1
        ",
    )
    .bind(id.to_string())
    .bind(rating)
    .bind(comment)
    .bind(coach_id.to_string())
    .bind(updated_at)
    .execute(conn)
    .await?;

    Ok(())
}

/// Delete every evaluation for (player, training) on the caller's
/// transaction. Invoked when a training attendance status leaves the
/// present-equivalent set.
pub(crate) async fn delete_for_player_training(
    conn: &mut SqliteConnection,
    player_id: Uuid,
    training_id: Uuid,
) -> AppResult<u64> {
    let result = sqlx::query("DELETE FROM evaluations WHERE player_id = $1 AND training_id = $2")
        .bind(player_id.to_string())
        .bind(training_id.to_string())
        .execute(conn)
        .await?;

    Ok(result.rows_affected())
}

const fn event_column(event: EventRef) -> &'static str {
    match event {
        EventRef::Training(_) => "training_id",
        EventRef::Match(_) => "match_id",
    }
}

pub(crate) fn row_to_evaluation(row: &SqliteRow) -> AppResult<Evaluation> {
    let id: String = row.get("id");
    let player_id: String = row.get("player_id");
    let coach_id: String = row.get("coach_id");
    let training_id: Option<String> = row.get("training_id");
    let match_id: Option<String> = row.get("match_id");
    let category: String = row.get("category");

    let training_id = training_id
        .as_deref()
        .map(|v| parse_uuid(v, "evaluations.training_id"))
        .transpose()?;
    let match_id = match_id
        .as_deref()
        .map(|v| parse_uuid(v, "evaluations.match_id"))
        .transpose()?;

    let event = EventRef::from_ids(training_id, match_id).ok_or_else(|| {
        AppError::database("Evaluation row must reference exactly one of training or match")
    })?;

    Ok(Evaluation {
        id: parse_uuid(&id, "evaluations.id")?,
        player_id: parse_uuid(&player_id, "evaluations.player_id")?,
        coach_id: parse_uuid(&coach_id, "evaluations.coach_id")?,
        event,
        category: EvaluationCategory::parse(&category),
        rating: row.get("rating"),
        comment: row.get("comment"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn row_to_joined_player(row: &SqliteRow) -> AppResult<Player> {
    let id: String = row.get("p_id");
    let user_id: Option<String> = row.get("p_user_id");
    let group_id: Option<String> = row.get("p_group_id");

    Ok(Player {
        id: parse_uuid(&id, "players.id")?,
        user_id: super::parse_uuid_opt(user_id.as_deref(), "players.user_id")?,
        group_id: super::parse_uuid_opt(group_id.as_deref(), "players.group_id")?,
        first_name: row.get("p_first_name"),
        last_name: row.get("p_last_name"),
        created_at: row.get("p_created_at"),
    })
}

fn row_to_joined_coach(row: &SqliteRow) -> AppResult<CoachProfile> {
    let id: String = row.get("c_id");
    let user_id: String = row.get("c_user_id");

    Ok(CoachProfile {
        id: parse_uuid(&id, "coaches.id")?,
        user_id: parse_uuid(&user_id, "coaches.user_id")?,
        first_name: row.get("c_first_name"),
        last_name: row.get("c_last_name"),
        created_at: row.get("c_created_at"),
    })
}
