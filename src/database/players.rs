// ABOUTME: Player and coach profile storage
// ABOUTME: Profile lookups used by the batch engines plus seed helpers for tests and tooling
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::{parse_uuid, parse_uuid_opt, Database};
use crate::errors::{AppError, AppResult};
use crate::models::{CoachProfile, Player};
use anyhow::Result;
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection};
use uuid::Uuid;

impl Database {
    /// Create the players and coaches tables
    pub(super) async fn migrate_players(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS players (
                id TEXT PRIMARY KEY,
                user_id TEXT REFERENCES users(id) ON DELETE SET NULL,
                group_id TEXT REFERENCES groups(id) ON DELETE SET NULL,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(self.pool())
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS coaches (
                id TEXT PRIMARY KEY,
                user_id TEXT UNIQUE NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(self.pool())
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_players_group ON players(group_id)")
            .execute(self.pool())
            .await?;

        Ok(())
    }

    /// Create a player profile
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create_player(
        &self,
        first_name: &str,
        last_name: &str,
        group_id: Option<Uuid>,
    ) -> AppResult<Player> {
        let player = Player {
            id: Uuid::new_v4(),
            user_id: None,
            group_id,
            first_name: first_name.to_owned(),
            last_name: last_name.to_owned(),
            created_at: Utc::now(),
        };

        sqlx::query(
            r"
            INSERT INTO players (id, user_id, group_id, first_name, last_name, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(player.id.to_string())
        .bind(Option::<String>::None)
        .bind(player.group_id.map(|id| id.to_string()))
        .bind(&player.first_name)
        .bind(&player.last_name)
        .bind(player.created_at)
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to create player: {e}")))?;

        Ok(player)
    }

    /// Get a player by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_player(&self, player_id: Uuid) -> AppResult<Option<Player>> {
        let mut conn = self.pool().acquire().await?;
        get_player(&mut conn, player_id).await
    }

    /// Create a coach profile linked to a user account
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn create_coach(
        &self,
        user_id: Uuid,
        first_name: &str,
        last_name: &str,
    ) -> AppResult<CoachProfile> {
        let coach = CoachProfile {
            id: Uuid::new_v4(),
            user_id,
            first_name: first_name.to_owned(),
            last_name: last_name.to_owned(),
            created_at: Utc::now(),
        };

        sqlx::query(
            r"
            INSERT INTO coaches (id, user_id, first_name, last_name, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(coach.id.to_string())
        .bind(coach.user_id.to_string())
        .bind(&coach.first_name)
        .bind(&coach.last_name)
        .bind(coach.created_at)
        .execute(self.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to create coach: {e}")))?;

        Ok(coach)
    }

    /// Get the coach profile belonging to a user account
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_coach_by_user(&self, user_id: Uuid) -> AppResult<Option<CoachProfile>> {
        let mut conn = self.pool().acquire().await?;
        get_coach_by_user(&mut conn, user_id).await
    }
}

/// Get a player by ID on the caller's connection or transaction
pub(crate) async fn get_player(
    conn: &mut SqliteConnection,
    player_id: Uuid,
) -> AppResult<Option<Player>> {
    let row = sqlx::query(
        r"
        SELECT id, user_id, group_id, first_name, last_name, created_at
        FROM players WHERE id = $1
        ",
    )
    .bind(player_id.to_string())
    .fetch_optional(conn)
    .await?;

    row.map(|r| row_to_player(&r)).transpose()
}

/// Get a coach profile by user ID on the caller's connection or transaction
pub(crate) async fn get_coach_by_user(
    conn: &mut SqliteConnection,
    user_id: Uuid,
) -> AppResult<Option<CoachProfile>> {
    let row = sqlx::query(
        r"
        SELECT id, user_id, first_name, last_name, created_at
        FROM coaches WHERE user_id = $1
        ",
    )
    .bind(user_id.to_string())
    .fetch_optional(conn)
    .await?;

    row.map(|r| row_to_coach(&r)).transpose()
}

pub(crate) fn row_to_player(row: &SqliteRow) -> AppResult<Player> {
    let id: String = row.get("id");
    let user_id: Option<String> = row.get("user_id");
    let group_id: Option<String> = row.get("group_id");

    Ok(Player {
        id: parse_uuid(&id, "players.id")?,
        user_id: parse_uuid_opt(user_id.as_deref(), "players.user_id")?,
        group_id: parse_uuid_opt(group_id.as_deref(), "players.group_id")?,
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        created_at: row.get("created_at"),
    })
}

fn row_to_coach(row: &SqliteRow) -> AppResult<CoachProfile> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");

    Ok(CoachProfile {
        id: parse_uuid(&id, "coaches.id")?,
        user_id: parse_uuid(&user_id, "coaches.user_id")?,
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        created_at: row.get("created_at"),
    })
}
