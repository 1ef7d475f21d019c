// ABOUTME: Shared helpers for integration tests
// ABOUTME: Creates in-memory databases and seeds groups, players, coaches, and events
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]
#![allow(missing_docs)]

use academy_server::database::Database;
use academy_server::models::{CoachProfile, Group, Match, Player, Training, User, UserRole};
use anyhow::Result;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Create a test database instance
///
/// # Errors
///
/// Returns an error if database initialization fails
pub async fn create_test_db() -> Result<Database> {
    // In-memory SQLite; the pool is capped at one connection so every
    // query sees the same database
    Database::new("sqlite::memory:").await
}

pub async fn seed_group(db: &Database) -> Group {
    db.create_group("U12", 2013).await.unwrap()
}

pub async fn seed_player(db: &Database, group_id: Option<Uuid>, name: &str) -> Player {
    db.create_player(name, "Tester", group_id).await.unwrap()
}

pub async fn seed_coach(db: &Database) -> (User, CoachProfile) {
    let user = db
        .create_user(
            &format!("coach-{}@academy.test", Uuid::new_v4()),
            Some("Coach Tester"),
            UserRole::Coach,
        )
        .await
        .unwrap();
    let coach = db.create_coach(user.id, "Coach", "Tester").await.unwrap();
    (user, coach)
}

pub async fn seed_training(
    db: &Database,
    group_id: Uuid,
    start_time: DateTime<Utc>,
) -> Training {
    db.create_training(
        group_id,
        start_time,
        start_time + chrono::Duration::minutes(90),
        "Main pitch",
        Some("Passing"),
    )
    .await
    .unwrap()
}

pub async fn seed_match(db: &Database, group_id: Uuid, start_time: DateTime<Utc>) -> Match {
    db.create_match(
        group_id,
        "Rival FC",
        start_time,
        start_time + chrono::Duration::minutes(120),
        "Away ground",
    )
    .await
    .unwrap()
}
