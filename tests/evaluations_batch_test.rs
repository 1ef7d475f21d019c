// ABOUTME: Integration tests for the evaluation batch-upsert engine
// ABOUTME: Covers category-scoped upserts, validation, coach resolution, and event reads
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use academy_server::errors::ErrorCode;
use academy_server::models::{EvaluationCategory, UserRole};
use academy_server::services::evaluations::{
    self, EvaluationBatchRequest, EvaluationRecordInput,
};
use chrono::Utc;
use uuid::Uuid;

fn training_batch(
    training_id: Uuid,
    records: Vec<EvaluationRecordInput>,
) -> EvaluationBatchRequest {
    EvaluationBatchRequest {
        training_id: Some(training_id),
        match_id: None,
        records,
    }
}

fn entry(player_id: Uuid, category: EvaluationCategory, rating: i64) -> EvaluationRecordInput {
    EvaluationRecordInput {
        player_id,
        category,
        rating,
        comment: None,
    }
}

#[tokio::test]
async fn distinct_categories_coexist() {
    let db = common::create_test_db().await.unwrap();
    let group = common::seed_group(&db).await;
    let player = common::seed_player(&db, Some(group.id), "Alex").await;
    let (coach_user, _) = common::seed_coach(&db).await;
    let training = common::seed_training(&db, group.id, Utc::now()).await;

    let rows = evaluations::create_batch(
        &db,
        &training_batch(
            training.id,
            vec![
                entry(player.id, EvaluationCategory::Technique, 8),
                entry(player.id, EvaluationCategory::Tactics, 6),
            ],
        ),
        coach_user.id,
    )
    .await
    .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(
        evaluations::find_by_player(&db, player.id).await.unwrap().len(),
        2
    );
}

#[tokio::test]
async fn resubmitting_a_category_updates_in_place() {
    let db = common::create_test_db().await.unwrap();
    let group = common::seed_group(&db).await;
    let player = common::seed_player(&db, Some(group.id), "Alex").await;
    let (coach_user, coach) = common::seed_coach(&db).await;
    let training = common::seed_training(&db, group.id, Utc::now()).await;

    let first = evaluations::create_batch(
        &db,
        &training_batch(
            training.id,
            vec![entry(player.id, EvaluationCategory::Technique, 5)],
        ),
        coach_user.id,
    )
    .await
    .unwrap();

    let second = evaluations::create_batch(
        &db,
        &training_batch(
            training.id,
            vec![EvaluationRecordInput {
                player_id: player.id,
                category: EvaluationCategory::Technique,
                rating: 9,
                comment: Some("Much improved".into()),
            }],
        ),
        coach_user.id,
    )
    .await
    .unwrap();

    assert_eq!(second[0].id, first[0].id);
    assert_eq!(second[0].rating, 9);
    assert_eq!(second[0].comment.as_deref(), Some("Much improved"));
    assert_eq!(second[0].coach_id, coach.id);

    let stored = evaluations::find_by_player(&db, player.id).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].rating, 9);
}

#[tokio::test]
async fn both_event_ids_are_rejected() {
    let db = common::create_test_db().await.unwrap();
    let group = common::seed_group(&db).await;
    let player = common::seed_player(&db, Some(group.id), "Alex").await;
    let (coach_user, _) = common::seed_coach(&db).await;
    let training = common::seed_training(&db, group.id, Utc::now()).await;
    let fixture = common::seed_match(&db, group.id, Utc::now()).await;

    let err = evaluations::create_batch(
        &db,
        &EvaluationBatchRequest {
            training_id: Some(training.id),
            match_id: Some(fixture.id),
            records: vec![entry(player.id, EvaluationCategory::Technique, 5)],
        },
        coach_user.id,
    )
    .await
    .unwrap_err();

    assert_eq!(err.code, ErrorCode::InvalidInput);
}

#[tokio::test]
async fn neither_event_id_is_rejected() {
    let db = common::create_test_db().await.unwrap();
    let group = common::seed_group(&db).await;
    let player = common::seed_player(&db, Some(group.id), "Alex").await;
    let (coach_user, _) = common::seed_coach(&db).await;

    let err = evaluations::create_batch(
        &db,
        &EvaluationBatchRequest {
            training_id: None,
            match_id: None,
            records: vec![entry(player.id, EvaluationCategory::Technique, 5)],
        },
        coach_user.id,
    )
    .await
    .unwrap_err();

    assert_eq!(err.code, ErrorCode::InvalidInput);
}

#[tokio::test]
async fn rating_out_of_range_is_rejected() {
    let db = common::create_test_db().await.unwrap();
    let group = common::seed_group(&db).await;
    let player = common::seed_player(&db, Some(group.id), "Alex").await;
    let (coach_user, _) = common::seed_coach(&db).await;
    let training = common::seed_training(&db, group.id, Utc::now()).await;

    for rating in [0, 11, -3] {
        let err = evaluations::create_batch(
            &db,
            &training_batch(
                training.id,
                vec![entry(player.id, EvaluationCategory::Technique, rating)],
            ),
            coach_user.id,
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueOutOfRange);
    }
}

#[tokio::test]
async fn user_without_coach_profile_is_rejected() {
    let db = common::create_test_db().await.unwrap();
    let group = common::seed_group(&db).await;
    let player = common::seed_player(&db, Some(group.id), "Alex").await;
    let training = common::seed_training(&db, group.id, Utc::now()).await;

    let user = db
        .create_user("admin@academy.test", None, UserRole::Admin)
        .await
        .unwrap();

    let err = evaluations::create_batch(
        &db,
        &training_batch(
            training.id,
            vec![entry(player.id, EvaluationCategory::Technique, 5)],
        ),
        user.id,
    )
    .await
    .unwrap_err();

    assert_eq!(err.code, ErrorCode::ResourceNotFound);
    assert!(err.message.contains("Coach profile"));
}

#[tokio::test]
async fn missing_player_aborts_the_whole_batch() {
    let db = common::create_test_db().await.unwrap();
    let group = common::seed_group(&db).await;
    let player = common::seed_player(&db, Some(group.id), "Alex").await;
    let (coach_user, _) = common::seed_coach(&db).await;
    let training = common::seed_training(&db, group.id, Utc::now()).await;

    let err = evaluations::create_batch(
        &db,
        &training_batch(
            training.id,
            vec![
                entry(player.id, EvaluationCategory::Technique, 5),
                entry(Uuid::new_v4(), EvaluationCategory::Tactics, 5),
            ],
        ),
        coach_user.id,
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);

    assert!(evaluations::find_by_player(&db, player.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn reads_require_an_existing_event() {
    let db = common::create_test_db().await.unwrap();

    let err = evaluations::find_by_training(&db, Uuid::new_v4())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);

    let err = evaluations::find_by_match(&db, Uuid::new_v4())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn event_read_joins_player_and_coach() {
    let db = common::create_test_db().await.unwrap();
    let group = common::seed_group(&db).await;
    let player = common::seed_player(&db, Some(group.id), "Alex").await;
    let (coach_user, coach) = common::seed_coach(&db).await;
    let training = common::seed_training(&db, group.id, Utc::now()).await;

    evaluations::create_batch(
        &db,
        &training_batch(
            training.id,
            vec![entry(player.id, EvaluationCategory::Psychological, 7)],
        ),
        coach_user.id,
    )
    .await
    .unwrap();

    let entries = evaluations::find_by_training(&db, training.id).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].player.id, player.id);
    assert_eq!(entries[0].coach.id, coach.id);
    assert_eq!(entries[0].evaluation.rating, 7);
}

#[tokio::test]
async fn persistence_failure_becomes_a_generic_bad_request() {
    let db = common::create_test_db().await.unwrap();
    let group = common::seed_group(&db).await;
    let player = common::seed_player(&db, Some(group.id), "Alex").await;
    let (coach_user, _) = common::seed_coach(&db).await;
    let training = common::seed_training(&db, group.id, Utc::now()).await;

    sqlx::query("DROP TABLE evaluations")
        .execute(db.pool())
        .await
        .unwrap();

    let err = evaluations::create_batch(
        &db,
        &training_batch(
            training.id,
            vec![entry(player.id, EvaluationCategory::Technique, 5)],
        ),
        coach_user.id,
    )
    .await
    .unwrap_err();

    assert_eq!(err.code, ErrorCode::InvalidInput);
    assert_eq!(err.message, "Failed to save evaluations");
}
