// ABOUTME: Group and weekly training-schedule storage
// ABOUTME: Group lookup plus schedule-slot reads and the transactional replace-all write
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::{parse_uuid, Database};
use crate::errors::{AppError, AppResult};
use crate::models::{Group, ScheduleSlot};
use anyhow::Result;
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row};
use uuid::Uuid;

/// A schedule slot about to be written; ids and timestamps are assigned here
#[derive(Debug, Clone)]
pub struct NewScheduleSlot {
    /// Day of week, 0 = Sunday .. 6 = Saturday
    pub day_of_week: u8,
    /// Start of the time window, "HH:MM"
    pub start_time: String,
    /// End of the time window, "HH:MM"
    pub end_time: String,
    /// Where the session takes place
    pub location: String,
}

impl Database {
    /// Create the groups and training_schedules tables
    pub(super) async fn migrate_groups(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS groups (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                year_of_birth INTEGER NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(self.pool())
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS training_schedules (
                id TEXT PRIMARY KEY,
                group_id TEXT NOT NULL REFERENCES groups(id) ON DELETE CASCADE,
                day_of_week INTEGER NOT NULL CHECK (day_of_week BETWEEN 0 AND 6),
                start_time TEXT NOT NULL,
                end_time TEXT NOT NULL,
                location TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(self.pool())
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_training_schedules_group ON training_schedules(group_id)",
        )
        .execute(self.pool())
        .await?;

        Ok(())
    }

    /// Create a group
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create_group(&self, name: &str, year_of_birth: i32) -> AppResult<Group> {
        let group = Group {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            year_of_birth,
            created_at: Utc::now(),
        };

        sqlx::query(
            r"
            INSERT INTO groups (id, name, year_of_birth, created_at)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(group.id.to_string())
        .bind(&group.name)
        .bind(group.year_of_birth)
        .bind(group.created_at)
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to create group: {e}")))?;

        Ok(group)
    }

    /// Get a group by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_group(&self, group_id: Uuid) -> AppResult<Option<Group>> {
        let row = sqlx::query(
            r"
            SELECT id, name, year_of_birth, created_at
            FROM groups WHERE id = $1
            ",
        )
        .bind(group_id.to_string())
        .fetch_optional(self.pool())
        .await?;

        row.map(|r| row_to_group(&r)).transpose()
    }

    /// Get a group's schedule slots, ordered by day of week
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_schedule_slots(&self, group_id: Uuid) -> AppResult<Vec<ScheduleSlot>> {
        let rows = sqlx::query(
            r"
            SELECT id, group_id, day_of_week, start_time, end_time, location, created_at
            FROM training_schedules
            WHERE group_id = $1
            ORDER BY day_of_week ASC
            ",
        )
        .bind(group_id.to_string())
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(row_to_slot).collect()
    }

    /// Replace a group's entire schedule in one transaction.
    ///
    /// Delete-all then insert-all, never a merge: stored slots that do not
    /// reappear in `slots` are gone afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails
    pub async fn replace_schedule_slots(
        &self,
        group_id: Uuid,
        slots: &[NewScheduleSlot],
    ) -> AppResult<Vec<ScheduleSlot>> {
        let mut tx = self.pool().begin().await?;

        sqlx::query("DELETE FROM training_schedules WHERE group_id = $1")
            .bind(group_id.to_string())
            .execute(&mut *tx)
            .await?;

        let now = Utc::now();
        let mut stored = Vec::with_capacity(slots.len());
        for slot in slots {
            let record = ScheduleSlot {
                id: Uuid::new_v4(),
                group_id,
                day_of_week: slot.day_of_week,
                start_time: slot.start_time.clone(),
                end_time: slot.end_time.clone(),
                location: slot.location.clone(),
                created_at: now,
            };

            sqlx::query(
                r"
                INSERT INTO training_schedules (id, group_id, day_of_week, start_time, end_time, location, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ",
            )
            .bind(record.id.to_string())
            .bind(record.group_id.to_string())
            .bind(i64::from(record.day_of_week))
            .bind(&record.start_time)
            .bind(&record.end_time)
            .bind(&record.location)
            .bind(record.created_at)
            .execute(&mut *tx)
            .await?;

            stored.push(record);
        }

        tx.commit().await?;

        Ok(stored)
    }
}

fn row_to_group(row: &SqliteRow) -> AppResult<Group> {
    let id: String = row.get("id");

    Ok(Group {
        id: parse_uuid(&id, "groups.id")?,
        name: row.get("name"),
        year_of_birth: row.get("year_of_birth"),
        created_at: row.get("created_at"),
    })
}

fn row_to_slot(row: &SqliteRow) -> AppResult<ScheduleSlot> {
    let id: String = row.get("id");
    let group_id: String = row.get("group_id");
    let day_of_week: i64 = row.get("day_of_week");

    Ok(ScheduleSlot {
        id: parse_uuid(&id, "training_schedules.id")?,
        group_id: parse_uuid(&group_id, "training_schedules.group_id")?,
        // Safe: constrained to 0..=6 by the schema CHECK
        day_of_week: u8::try_from(day_of_week).unwrap_or(0),
        start_time: row.get("start_time"),
        end_time: row.get("end_time"),
        location: row.get("location"),
        created_at: row.get("created_at"),
    })
}
