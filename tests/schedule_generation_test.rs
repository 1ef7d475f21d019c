// ABOUTME: Integration tests for schedule replacement, training generation, and cleanup
// ABOUTME: Validates idempotent expansion, date dedup, validation errors, and future cleanup
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use academy_server::database::groups::NewScheduleSlot;
use academy_server::errors::ErrorCode;
use academy_server::models::{AttendanceStatus, EventRef};
use academy_server::services::{attendance, schedule};
use chrono::{Datelike, NaiveDate, TimeZone, Utc};
use uuid::Uuid;

fn monday_slot() -> NewScheduleSlot {
    NewScheduleSlot {
        day_of_week: 1,
        start_time: "17:00".into(),
        end_time: "18:30".into(),
        location: "Main pitch".into(),
    }
}

#[tokio::test]
async fn generates_one_training_per_matching_weekday() {
    let db = common::create_test_db().await.unwrap();
    let group = common::seed_group(&db).await;

    schedule::update_schedule(&db, group.id, &[monday_slot()])
        .await
        .unwrap();

    // January 2024 has five Mondays: 1, 8, 15, 22, 29
    let summary = schedule::generate_trainings(
        &db,
        group.id,
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        Some("Possession"),
    )
    .await
    .unwrap();

    assert_eq!(summary.created, 5);
    assert_eq!(summary.skipped, 0);

    let from = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let until = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
    let trainings = db.trainings_in_range(group.id, from, until).await.unwrap();

    assert_eq!(trainings.len(), 5);
    for training in &trainings {
        assert_eq!(training.start_time.weekday(), chrono::Weekday::Mon);
        assert_eq!(training.start_time.time().to_string(), "17:00:00");
        assert_eq!(training.end_time.time().to_string(), "18:30:00");
        assert_eq!(training.location, "Main pitch");
        assert_eq!(training.topic.as_deref(), Some("Possession"));
        assert!(training.schedule_id.is_some());
    }
}

#[tokio::test]
async fn regeneration_skips_covered_dates() {
    let db = common::create_test_db().await.unwrap();
    let group = common::seed_group(&db).await;

    schedule::update_schedule(&db, group.id, &[monday_slot()])
        .await
        .unwrap();

    let from = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let to = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();

    let first = schedule::generate_trainings(&db, group.id, from, to, None)
        .await
        .unwrap();
    assert_eq!(first.created, 5);

    let second = schedule::generate_trainings(&db, group.id, from, to, None)
        .await
        .unwrap();
    assert_eq!(second.created, 0);
    assert_eq!(second.skipped, 5);
}

#[tokio::test]
async fn manual_training_on_a_scheduled_date_blocks_generation() {
    let db = common::create_test_db().await.unwrap();
    let group = common::seed_group(&db).await;

    schedule::update_schedule(&db, group.id, &[monday_slot()])
        .await
        .unwrap();

    // Manually created session on Monday January 8th, different time
    let manual_start = Utc.with_ymd_and_hms(2024, 1, 8, 9, 0, 0).unwrap();
    common::seed_training(&db, group.id, manual_start).await;

    let summary = schedule::generate_trainings(
        &db,
        group.id,
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        None,
    )
    .await
    .unwrap();

    assert_eq!(summary.created, 4);
    assert_eq!(summary.skipped, 1);
}

#[tokio::test]
async fn inverted_range_is_rejected() {
    let db = common::create_test_db().await.unwrap();
    let group = common::seed_group(&db).await;

    schedule::update_schedule(&db, group.id, &[monday_slot()])
        .await
        .unwrap();

    let err = schedule::generate_trainings(
        &db,
        group.id,
        NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        None,
    )
    .await
    .unwrap_err();

    assert_eq!(err.code, ErrorCode::InvalidInput);
}

#[tokio::test]
async fn generation_requires_a_schedule() {
    let db = common::create_test_db().await.unwrap();
    let group = common::seed_group(&db).await;

    let err = schedule::generate_trainings(
        &db,
        group.id,
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        None,
    )
    .await
    .unwrap_err();

    assert_eq!(err.code, ErrorCode::InvalidInput);
    assert!(err.message.contains("no training schedule"));
}

#[tokio::test]
async fn generation_rejects_unknown_group() {
    let db = common::create_test_db().await.unwrap();

    let err = schedule::generate_trainings(
        &db,
        Uuid::new_v4(),
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        None,
    )
    .await
    .unwrap_err();

    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn schedule_update_rejects_duplicate_weekday() {
    let db = common::create_test_db().await.unwrap();
    let group = common::seed_group(&db).await;

    let err = schedule::update_schedule(&db, group.id, &[monday_slot(), monday_slot()])
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::InvalidInput);
    assert!(err.message.contains("Duplicate"));
}

#[tokio::test]
async fn schedule_update_rejects_inverted_time_window() {
    let db = common::create_test_db().await.unwrap();
    let group = common::seed_group(&db).await;

    let slot = NewScheduleSlot {
        day_of_week: 3,
        start_time: "18:00".into(),
        end_time: "17:00".into(),
        location: "Main pitch".into(),
    };

    let err = schedule::update_schedule(&db, group.id, &[slot])
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
}

#[tokio::test]
async fn schedule_update_rejects_bad_weekday() {
    let db = common::create_test_db().await.unwrap();
    let group = common::seed_group(&db).await;

    let slot = NewScheduleSlot {
        day_of_week: 7,
        start_time: "17:00".into(),
        end_time: "18:00".into(),
        location: "Main pitch".into(),
    };

    let err = schedule::update_schedule(&db, group.id, &[slot])
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
}

#[tokio::test]
async fn schedule_update_replaces_rather_than_merges() {
    let db = common::create_test_db().await.unwrap();
    let group = common::seed_group(&db).await;

    schedule::update_schedule(&db, group.id, &[monday_slot()])
        .await
        .unwrap();

    let wednesday = NewScheduleSlot {
        day_of_week: 3,
        start_time: "16:00".into(),
        end_time: "17:30".into(),
        location: "Gym".into(),
    };
    let stored = schedule::update_schedule(&db, group.id, &[wednesday])
        .await
        .unwrap();

    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].day_of_week, 3);

    let slots = schedule::get_schedule(&db, group.id).await.unwrap();
    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].day_of_week, 3);
}

#[tokio::test]
async fn cleanup_deletes_future_generated_trainings_without_attendance() {
    let db = common::create_test_db().await.unwrap();
    let group = common::seed_group(&db).await;
    let player = common::seed_player(&db, Some(group.id), "Kim").await;

    schedule::update_schedule(&db, group.id, &[monday_slot()])
        .await
        .unwrap();

    // Far-future range so every generated training is ahead of now
    let summary = schedule::generate_trainings(
        &db,
        group.id,
        NaiveDate::from_ymd_opt(2030, 6, 1).unwrap(),
        NaiveDate::from_ymd_opt(2030, 6, 30).unwrap(),
        None,
    )
    .await
    .unwrap();
    assert_eq!(summary.created, 4);

    // Mark attendance on one of them; that training must survive
    let trainings = db
        .trainings_in_range(
            group.id,
            Utc.with_ymd_and_hms(2030, 6, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2030, 7, 1, 0, 0, 0).unwrap(),
        )
        .await
        .unwrap();
    let kept_id = trainings[0].id;
    attendance::mark_batch(
        &db,
        EventRef::Training(kept_id),
        &[attendance::AttendanceRecordInput {
            player_id: player.id,
            status: AttendanceStatus::Present,
            notes: None,
        }],
    )
    .await
    .unwrap();

    let cleanup = schedule::delete_future_generated_trainings(&db, group.id)
        .await
        .unwrap();
    assert_eq!(cleanup.deleted, 3);
    assert_eq!(cleanup.kept, 1);

    assert!(db.get_training(kept_id).await.unwrap().is_some());
}

#[tokio::test]
async fn cleanup_keeps_manual_trainings() {
    let db = common::create_test_db().await.unwrap();
    let group = common::seed_group(&db).await;

    let manual_start = Utc.with_ymd_and_hms(2030, 6, 3, 17, 0, 0).unwrap();
    let manual = common::seed_training(&db, group.id, manual_start).await;

    let cleanup = schedule::delete_future_generated_trainings(&db, group.id)
        .await
        .unwrap();
    assert_eq!(cleanup.deleted, 0);
    assert_eq!(cleanup.kept, 0);

    assert!(db.get_training(manual.id).await.unwrap().is_some());
}

#[tokio::test]
async fn generation_rejects_range_end_without_a_successor_day() {
    let db = common::create_test_db().await.unwrap();
    let group = common::seed_group(&db).await;

    schedule::update_schedule(&db, group.id, &[monday_slot()])
        .await
        .unwrap();

    // NaiveDate::MAX has no next day, so the dedup scan cannot cover it
    let err = schedule::generate_trainings(&db, group.id, NaiveDate::MAX, NaiveDate::MAX, None)
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::InvalidInput);
    assert!(err.message.contains("date range"));
}
