// ABOUTME: Attendance row storage with upsert primitives scoped to a caller-supplied transaction
// ABOUTME: Also provides the joined per-event reads and per-player scans behind attendance stats
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::{parse_uuid, Database};
use crate::errors::{AppError, AppResult};
use crate::models::{Attendance, AttendanceStatus, EventRef, Player};
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection};
use uuid::Uuid;

impl Database {
    /// Create the attendances table
    pub(super) async fn migrate_attendance(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS attendances (
                id TEXT PRIMARY KEY,
                player_id TEXT NOT NULL REFERENCES players(id) ON DELETE CASCADE,
                training_id TEXT REFERENCES trainings(id) ON DELETE CASCADE,
                match_id TEXT REFERENCES matches(id) ON DELETE CASCADE,
                status TEXT NOT NULL CHECK (status IN ('present', 'absent', 'sick', 'late', 'excused')),
                notes TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                CHECK ((training_id IS NULL) != (match_id IS NULL)),
                UNIQUE (player_id, training_id),
                UNIQUE (player_id, match_id)
            )
            ",
        )
        .execute(self.pool())
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_attendances_training ON attendances(training_id)",
        )
        .execute(self.pool())
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_attendances_match ON attendances(match_id)")
            .execute(self.pool())
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_attendances_player ON attendances(player_id)")
            .execute(self.pool())
            .await?;

        Ok(())
    }

    /// Get all attendance rows for an event with their players, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn attendance_by_event(
        &self,
        event: EventRef,
    ) -> AppResult<Vec<(Attendance, Player)>> {
        let column = event_column(event);
        let query = format!(
            r"
            SELECT a.id, a.player_id, a.training_id, a.match_id, a.status, a.notes,
                   a.created_at, a.updated_at,
                   p.id AS p_id, p.user_id, p.group_id, p.first_name, p.last_name,
                   p.created_at AS p_created_at
            FROM attendances a
            JOIN players p ON p.id = a.player_id
            WHERE a.{column} = $1
            ORDER BY a.created_at DESC
            "
        );

        let rows = sqlx::query(&query)
            .bind(event.id().to_string())
            .fetch_all(self.pool())
            .await?;

        rows.iter()
            .map(|row| Ok((row_to_attendance(row)?, row_to_joined_player(row)?)))
            .collect()
    }

    /// Get all attendance rows for one player across all events
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn attendance_for_player(&self, player_id: Uuid) -> AppResult<Vec<Attendance>> {
        let rows = sqlx::query(
            r"
            SELECT id, player_id, training_id, match_id, status, notes, created_at, updated_at
            FROM attendances
            WHERE player_id = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(player_id.to_string())
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(row_to_attendance).collect()
    }

    /// Count attendance rows recorded against a training
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn attendance_count_for_training(&self, training_id: Uuid) -> AppResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM attendances WHERE training_id = $1")
            .bind(training_id.to_string())
            .fetch_one(self.pool())
            .await?;

        Ok(count)
    }
}

/// Find the attendance row for (player, event) on the caller's transaction
pub(crate) async fn find_attendance(
    conn: &mut SqliteConnection,
    player_id: Uuid,
    event: EventRef,
) -> AppResult<Option<Attendance>> {
    let column = event_column(event);
    let query = format!(
        r"
        SELECT id, player_id, training_id, match_id, status, notes, created_at, updated_at
        FROM attendances
        WHERE player_id = $1 AND {column} = $2
        "
    );

    let row = sqlx::query(&query)
        .bind(player_id.to_string())
        .bind(event.id().to_string())
        .fetch_optional(conn)
        .await?;

    row.as_ref().map(row_to_attendance).transpose()
}

/// Insert a new attendance row on the caller's transaction
pub(crate) async fn insert_attendance(
    conn: &mut SqliteConnection,
    record: &Attendance,
) -> AppResult<()> {
    sqlx::query(
        r"
        INSERT INTO attendances (id, player_id, training_id, match_id, status, notes, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ",
    )
    .bind(record.id.to_string())
    .bind(record.player_id.to_string())
    .bind(record.event.training_id().map(|id| id.to_string()))
    .bind(record.event.match_id().map(|id| id.to_string()))
    .bind(record.status.as_str())
    .bind(&record.notes)
    .bind(record.created_at)
    .bind(record.updated_at)
    .execute(conn)
    .await?;

    Ok(())
}

/// Overwrite status and notes of an existing attendance row on the
/// caller's transaction
pub(crate) async fn update_attendance(
    conn: &mut SqliteConnection,
    id: Uuid,
    status: AttendanceStatus,
    notes: Option<&str>,
    updated_at: DateTime<Utc>,
) -> AppResult<()> {
    sqlx::query(
        r"
        UPDATE attendances SET status = $2, notes = $3, updated_at = $4
        WHERE id = $1
        ",
    )
    .bind(id.to_string())
    .bind(status.as_str())
    .bind(notes)
    .bind(updated_at)
    .execute(conn)
    .await?;

    Ok(())
}

const fn event_column(event: EventRef) -> &'static str {
    match event {
        EventRef::Training(_) => "training_id",
        EventRef::Match(_) => "match_id",
    }
}

pub(crate) fn row_to_attendance(row: &SqliteRow) -> AppResult<Attendance> {
    let id: String = row.get("id");
    let player_id: String = row.get("player_id");
    let training_id: Option<String> = row.get("training_id");
    let match_id: Option<String> = row.get("match_id");
    let status: String = row.get("status");

    let training_id = training_id
        .as_deref()
        .map(|v| parse_uuid(v, "attendances.training_id"))
        .transpose()?;
    let match_id = match_id
        .as_deref()
        .map(|v| parse_uuid(v, "attendances.match_id"))
        .transpose()?;

    let event = EventRef::from_ids(training_id, match_id).ok_or_else(|| {
        AppError::database("Attendance row must reference exactly one of training or match")
    })?;

    Ok(Attendance {
        id: parse_uuid(&id, "attendances.id")?,
        player_id: parse_uuid(&player_id, "attendances.player_id")?,
        event,
        status: AttendanceStatus::parse(&status),
        notes: row.get("notes"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn row_to_joined_player(row: &SqliteRow) -> AppResult<Player> {
    // The join aliases collide with attendance columns, so rebuild the
    // player from the aliased columns rather than reusing row_to_player
    let id: String = row.get("p_id");
    let user_id: Option<String> = row.get("user_id");
    let group_id: Option<String> = row.get("group_id");

    Ok(Player {
        id: parse_uuid(&id, "players.id")?,
        user_id: super::parse_uuid_opt(user_id.as_deref(), "players.user_id")?,
        group_id: super::parse_uuid_opt(group_id.as_deref(), "players.group_id")?,
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        created_at: row.get("p_created_at"),
    })
}
