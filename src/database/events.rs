// ABOUTME: Training and match storage, including bulk insertion of generated trainings
// ABOUTME: Event lookups for the batch engines plus date-range and cleanup queries for scheduling
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::{parse_uuid, parse_uuid_opt, Database};
use crate::errors::{AppError, AppResult};
use crate::models::{Match, Training};
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, QueryBuilder, Row, Sqlite, SqliteConnection};
use uuid::Uuid;

impl Database {
    /// Create the trainings and matches tables
    pub(super) async fn migrate_events(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS trainings (
                id TEXT PRIMARY KEY,
                group_id TEXT NOT NULL REFERENCES groups(id) ON DELETE CASCADE,
                start_time DATETIME NOT NULL,
                end_time DATETIME NOT NULL,
                location TEXT NOT NULL,
                topic TEXT,
                schedule_id TEXT REFERENCES training_schedules(id) ON DELETE SET NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(self.pool())
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS matches (
                id TEXT PRIMARY KEY,
                group_id TEXT NOT NULL REFERENCES groups(id) ON DELETE CASCADE,
                opponent TEXT NOT NULL,
                start_time DATETIME NOT NULL,
                end_time DATETIME NOT NULL,
                location TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(self.pool())
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_trainings_group_start ON trainings(group_id, start_time)",
        )
        .execute(self.pool())
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_matches_group_start ON matches(group_id, start_time)",
        )
        .execute(self.pool())
        .await?;

        Ok(())
    }

    /// Create a training session directly (manual creation, no schedule
    /// back-reference)
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create_training(
        &self,
        group_id: Uuid,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        location: &str,
        topic: Option<&str>,
    ) -> AppResult<Training> {
        let training = Training {
            id: Uuid::new_v4(),
            group_id,
            start_time,
            end_time,
            location: location.to_owned(),
            topic: topic.map(ToOwned::to_owned),
            schedule_id: None,
            created_at: Utc::now(),
        };

        self.insert_trainings(std::slice::from_ref(&training)).await?;

        Ok(training)
    }

    /// Persist a batch of trainings in one bulk insert
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn insert_trainings(&self, trainings: &[Training]) -> AppResult<()> {
        if trainings.is_empty() {
            return Ok(());
        }

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "INSERT INTO trainings (id, group_id, start_time, end_time, location, topic, schedule_id, created_at) ",
        );
        builder.push_values(trainings, |mut b, t| {
            b.push_bind(t.id.to_string())
                .push_bind(t.group_id.to_string())
                .push_bind(t.start_time)
                .push_bind(t.end_time)
                .push_bind(t.location.clone())
                .push_bind(t.topic.clone())
                .push_bind(t.schedule_id.map(|id| id.to_string()))
                .push_bind(t.created_at);
        });

        builder
            .build()
            .execute(self.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to insert trainings: {e}")))?;

        Ok(())
    }

    /// Create a match
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create_match(
        &self,
        group_id: Uuid,
        opponent: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        location: &str,
    ) -> AppResult<Match> {
        let record = Match {
            id: Uuid::new_v4(),
            group_id,
            opponent: opponent.to_owned(),
            start_time,
            end_time,
            location: location.to_owned(),
            created_at: Utc::now(),
        };

        sqlx::query(
            r"
            INSERT INTO matches (id, group_id, opponent, start_time, end_time, location, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(record.id.to_string())
        .bind(record.group_id.to_string())
        .bind(&record.opponent)
        .bind(record.start_time)
        .bind(record.end_time)
        .bind(&record.location)
        .bind(record.created_at)
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to create match: {e}")))?;

        Ok(record)
    }

    /// Get a training by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_training(&self, training_id: Uuid) -> AppResult<Option<Training>> {
        let mut conn = self.pool().acquire().await?;
        get_training(&mut conn, training_id).await
    }

    /// Get a match by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_match(&self, match_id: Uuid) -> AppResult<Option<Match>> {
        let mut conn = self.pool().acquire().await?;
        get_match(&mut conn, match_id).await
    }

    /// Get a group's trainings whose start time falls in `[from, until)`
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn trainings_in_range(
        &self,
        group_id: Uuid,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> AppResult<Vec<Training>> {
        let rows = sqlx::query(
            r"
            SELECT id, group_id, start_time, end_time, location, topic, schedule_id, created_at
            FROM trainings
            WHERE group_id = $1 AND start_time >= $2 AND start_time < $3
            ORDER BY start_time ASC
            ",
        )
        .bind(group_id.to_string())
        .bind(from)
        .bind(until)
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(row_to_training).collect()
    }

    /// Get a group's future trainings that were generated from a schedule
    /// slot (`start_time > now` and a non-null schedule back-reference)
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn future_generated_trainings(
        &self,
        group_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Training>> {
        let rows = sqlx::query(
            r"
            SELECT id, group_id, start_time, end_time, location, topic, schedule_id, created_at
            FROM trainings
            WHERE group_id = $1 AND start_time > $2 AND schedule_id IS NOT NULL
            ORDER BY start_time ASC
            ",
        )
        .bind(group_id.to_string())
        .bind(now)
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(row_to_training).collect()
    }

    /// Delete a training by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails
    pub async fn delete_training(&self, training_id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM trainings WHERE id = $1")
            .bind(training_id.to_string())
            .execute(self.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to delete training: {e}")))?;

        Ok(())
    }
}

/// Get a training by ID on the caller's connection or transaction
pub(crate) async fn get_training(
    conn: &mut SqliteConnection,
    training_id: Uuid,
) -> AppResult<Option<Training>> {
    let row = sqlx::query(
        r"
        SELECT id, group_id, start_time, end_time, location, topic, schedule_id, created_at
        FROM trainings WHERE id = $1
        ",
    )
    .bind(training_id.to_string())
    .fetch_optional(conn)
    .await?;

    row.as_ref().map(row_to_training).transpose()
}

/// Get a match by ID on the caller's connection or transaction
pub(crate) async fn get_match(
    conn: &mut SqliteConnection,
    match_id: Uuid,
) -> AppResult<Option<Match>> {
    let row = sqlx::query(
        r"
        SELECT id, group_id, opponent, start_time, end_time, location, created_at
        FROM matches WHERE id = $1
        ",
    )
    .bind(match_id.to_string())
    .fetch_optional(conn)
    .await?;

    row.as_ref().map(row_to_match).transpose()
}

fn row_to_training(row: &SqliteRow) -> AppResult<Training> {
    let id: String = row.get("id");
    let group_id: String = row.get("group_id");
    let schedule_id: Option<String> = row.get("schedule_id");

    Ok(Training {
        id: parse_uuid(&id, "trainings.id")?,
        group_id: parse_uuid(&group_id, "trainings.group_id")?,
        start_time: row.get("start_time"),
        end_time: row.get("end_time"),
        location: row.get("location"),
        topic: row.get("topic"),
        schedule_id: parse_uuid_opt(schedule_id.as_deref(), "trainings.schedule_id")?,
        created_at: row.get("created_at"),
    })
}

fn row_to_match(row: &SqliteRow) -> AppResult<Match> {
    let id: String = row.get("id");
    let group_id: String = row.get("group_id");

    Ok(Match {
        id: parse_uuid(&id, "matches.id")?,
        group_id: parse_uuid(&group_id, "matches.group_id")?,
        opponent: row.get("opponent"),
        start_time: row.get("start_time"),
        end_time: row.get("end_time"),
        location: row.get("location"),
        created_at: row.get("created_at"),
    })
}
