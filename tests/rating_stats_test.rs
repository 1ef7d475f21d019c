// ABOUTME: Integration tests for the rating aggregator
// ABOUTME: Covers event grouping, averages, the date window, and sparse category handling
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use academy_server::errors::ErrorCode;
use academy_server::models::{EvaluationCategory, EventType};
use academy_server::services::evaluations::{
    self, EvaluationBatchRequest, EvaluationRecordInput,
};
use academy_server::services::ratings;
use chrono::{NaiveDate, TimeZone, Utc};
use uuid::Uuid;

fn entry(player_id: Uuid, category: EvaluationCategory, rating: i64) -> EvaluationRecordInput {
    EvaluationRecordInput {
        player_id,
        category,
        rating,
        comment: None,
    }
}

#[tokio::test]
async fn history_groups_per_event_with_averages() {
    let db = common::create_test_db().await.unwrap();
    let group = common::seed_group(&db).await;
    let player = common::seed_player(&db, Some(group.id), "Alex").await;
    let (coach_user, _) = common::seed_coach(&db).await;

    let first_start = Utc.with_ymd_and_hms(2024, 3, 4, 17, 0, 0).unwrap();
    let second_start = Utc.with_ymd_and_hms(2024, 3, 11, 17, 0, 0).unwrap();
    let training_a = common::seed_training(&db, group.id, first_start).await;
    let training_b = common::seed_training(&db, group.id, second_start).await;

    evaluations::create_batch(
        &db,
        &EvaluationBatchRequest {
            training_id: Some(training_a.id),
            match_id: None,
            records: vec![
                entry(player.id, EvaluationCategory::Technique, 8),
                entry(player.id, EvaluationCategory::Tactics, 7),
            ],
        },
        coach_user.id,
    )
    .await
    .unwrap();

    evaluations::create_batch(
        &db,
        &EvaluationBatchRequest {
            training_id: Some(training_b.id),
            match_id: None,
            records: vec![entry(player.id, EvaluationCategory::Physical, 4)],
        },
        coach_user.id,
    )
    .await
    .unwrap();

    let stats = ratings::get_rating_stats(&db, player.id, None, None)
        .await
        .unwrap();

    assert_eq!(stats.total_events, 2);
    assert_eq!(stats.history.len(), 2);

    // Oldest first
    assert_eq!(stats.history[0].date, "2024-03-04");
    assert_eq!(stats.history[0].event_type, EventType::Training);
    assert_eq!(stats.history[0].event_id, training_a.id);
    assert!((stats.history[0].average_rating - 7.5).abs() < f64::EPSILON);
    assert_eq!(stats.history[0].ratings.technical, Some(8));
    assert_eq!(stats.history[0].ratings.tactical, Some(7));
    assert_eq!(stats.history[0].ratings.physical, None);

    assert_eq!(stats.history[1].date, "2024-03-11");
    assert!((stats.history[1].average_rating - 4.0).abs() < f64::EPSILON);

    // Overall is the mean of per-event averages: (7.5 + 4.0) / 2 = 5.75 -> 5.8
    assert_eq!(stats.average_rating, Some(5.8));
    assert_eq!(stats.by_category.technical, Some(8.0));
    assert_eq!(stats.by_category.tactical, Some(7.0));
    assert_eq!(stats.by_category.physical, Some(4.0));
    assert_eq!(stats.by_category.psychological, None);
}

#[tokio::test]
async fn date_window_drops_whole_events() {
    let db = common::create_test_db().await.unwrap();
    let group = common::seed_group(&db).await;
    let player = common::seed_player(&db, Some(group.id), "Alex").await;
    let (coach_user, _) = common::seed_coach(&db).await;

    let inside = common::seed_training(
        &db,
        group.id,
        Utc.with_ymd_and_hms(2024, 3, 11, 17, 0, 0).unwrap(),
    )
    .await;
    let outside = common::seed_training(
        &db,
        group.id,
        Utc.with_ymd_and_hms(2024, 2, 5, 17, 0, 0).unwrap(),
    )
    .await;

    for (training_id, rating) in [(inside.id, 9), (outside.id, 2)] {
        evaluations::create_batch(
            &db,
            &EvaluationBatchRequest {
                training_id: Some(training_id),
                match_id: None,
                records: vec![entry(player.id, EvaluationCategory::Technique, rating)],
            },
            coach_user.id,
        )
        .await
        .unwrap();
    }

    let stats = ratings::get_rating_stats(
        &db,
        player.id,
        Some(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()),
        Some(NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()),
    )
    .await
    .unwrap();

    // The February event drops entirely; its rating never dilutes the averages
    assert_eq!(stats.total_events, 1);
    assert_eq!(stats.history[0].event_id, inside.id);
    assert_eq!(stats.average_rating, Some(9.0));
    assert_eq!(stats.by_category.technical, Some(9.0));
}

#[tokio::test]
async fn window_bounds_are_inclusive() {
    let db = common::create_test_db().await.unwrap();
    let group = common::seed_group(&db).await;
    let player = common::seed_player(&db, Some(group.id), "Alex").await;
    let (coach_user, _) = common::seed_coach(&db).await;

    let training = common::seed_training(
        &db,
        group.id,
        Utc.with_ymd_and_hms(2024, 3, 15, 17, 0, 0).unwrap(),
    )
    .await;
    evaluations::create_batch(
        &db,
        &EvaluationBatchRequest {
            training_id: Some(training.id),
            match_id: None,
            records: vec![entry(player.id, EvaluationCategory::Technique, 6)],
        },
        coach_user.id,
    )
    .await
    .unwrap();

    let day = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    let stats = ratings::get_rating_stats(&db, player.id, Some(day), Some(day))
        .await
        .unwrap();
    assert_eq!(stats.total_events, 1);
}

#[tokio::test]
async fn mixed_trainings_and_matches_each_form_a_group() {
    let db = common::create_test_db().await.unwrap();
    let group = common::seed_group(&db).await;
    let player = common::seed_player(&db, Some(group.id), "Alex").await;
    let (coach_user, _) = common::seed_coach(&db).await;

    let training = common::seed_training(
        &db,
        group.id,
        Utc.with_ymd_and_hms(2024, 3, 4, 17, 0, 0).unwrap(),
    )
    .await;
    let fixture = common::seed_match(
        &db,
        group.id,
        Utc.with_ymd_and_hms(2024, 3, 9, 11, 0, 0).unwrap(),
    )
    .await;

    evaluations::create_batch(
        &db,
        &EvaluationBatchRequest {
            training_id: Some(training.id),
            match_id: None,
            records: vec![entry(player.id, EvaluationCategory::Technique, 6)],
        },
        coach_user.id,
    )
    .await
    .unwrap();
    evaluations::create_batch(
        &db,
        &EvaluationBatchRequest {
            training_id: None,
            match_id: Some(fixture.id),
            records: vec![entry(player.id, EvaluationCategory::Technique, 8)],
        },
        coach_user.id,
    )
    .await
    .unwrap();

    let stats = ratings::get_rating_stats(&db, player.id, None, None)
        .await
        .unwrap();

    assert_eq!(stats.total_events, 2);
    assert_eq!(stats.history[0].event_type, EventType::Training);
    assert_eq!(stats.history[1].event_type, EventType::Match);
    assert_eq!(stats.average_rating, Some(7.0));
    assert_eq!(stats.by_category.technical, Some(7.0));
}

#[tokio::test]
async fn empty_history_yields_zeroes() {
    let db = common::create_test_db().await.unwrap();
    let group = common::seed_group(&db).await;
    let player = common::seed_player(&db, Some(group.id), "Alex").await;

    let stats = ratings::get_rating_stats(&db, player.id, None, None)
        .await
        .unwrap();

    assert_eq!(stats.total_events, 0);
    assert!(stats.history.is_empty());
    assert_eq!(stats.average_rating, None);
    assert_eq!(stats.by_category.technical, None);
}

#[tokio::test]
async fn unknown_player_is_not_found() {
    let db = common::create_test_db().await.unwrap();

    let err = ratings::get_rating_stats(&db, Uuid::new_v4(), None, None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}
