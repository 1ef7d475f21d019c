// ABOUTME: Schedule expander turning weekly recurring slots into concrete training sessions
// ABOUTME: Also validates schedule replacement and cleans up future generated trainings
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Schedule expansion.
//!
//! A group's weekly schedule (one slot per weekday) is expanded over an
//! inclusive calendar date range into concrete [`Training`] rows. Dates
//! that already carry a training are skipped, so generation is idempotent
//! and safe to re-run over overlapping ranges.

use crate::database::{groups::NewScheduleSlot, Database};
use crate::errors::{AppError, AppResult};
use crate::models::{ScheduleSlot, Training};
use chrono::{Datelike, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::info;
use uuid::Uuid;

/// Outcome of a schedule generation run
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GenerationSummary {
    /// Trainings newly created
    pub created: u32,
    /// Dates skipped because a training already existed
    pub skipped: u32,
}

/// Outcome of a future-training cleanup run
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CleanupSummary {
    /// Trainings deleted
    pub deleted: u32,
    /// Trainings kept because attendance was already recorded
    pub kept: u32,
}

/// Get a group's weekly schedule, ordered by day of week
///
/// # Errors
///
/// Returns `NotFound` if the group does not exist
pub async fn get_schedule(db: &Database, group_id: Uuid) -> AppResult<Vec<ScheduleSlot>> {
    require_group(db, group_id).await?;
    db.get_schedule_slots(group_id).await
}

/// Replace a group's entire weekly schedule.
///
/// Replace, not merge: slots stored previously that are absent from
/// `slots` are deleted. At most one slot per weekday is accepted, and
/// every time window must be forward.
///
/// # Errors
///
/// Returns `NotFound` if the group does not exist, `InvalidInput` if any
/// slot is malformed or two slots share a weekday
pub async fn update_schedule(
    db: &Database,
    group_id: Uuid,
    slots: &[NewScheduleSlot],
) -> AppResult<Vec<ScheduleSlot>> {
    require_group(db, group_id).await?;

    let mut seen_days = HashSet::new();
    for slot in slots {
        if slot.day_of_week > 6 {
            return Err(AppError::invalid_input(format!(
                "dayOfWeek must be between 0 and 6, got {}",
                slot.day_of_week
            )));
        }

        let start = parse_wall_time(&slot.start_time)?;
        let end = parse_wall_time(&slot.end_time)?;
        if end <= start {
            return Err(AppError::invalid_input(format!(
                "endTime {} must be after startTime {}",
                slot.end_time, slot.start_time
            )));
        }

        if !seen_days.insert(slot.day_of_week) {
            return Err(AppError::invalid_input(format!(
                "Duplicate schedule entry for day of week {}",
                slot.day_of_week
            )));
        }
    }

    db.replace_schedule_slots(group_id, slots).await
}

/// Expand the group's weekly schedule into concrete trainings over the
/// inclusive `[from_date, to_date]` range.
///
/// Dates already covered by an existing training (generated or manual)
/// are skipped; everything newly constructed is persisted in one bulk
/// insert.
///
/// # Errors
///
/// Returns `NotFound` if the group does not exist, `InvalidInput` if the
/// group has no schedule or the range is inverted
pub async fn generate_trainings(
    db: &Database,
    group_id: Uuid,
    from_date: NaiveDate,
    to_date: NaiveDate,
    default_topic: Option<&str>,
) -> AppResult<GenerationSummary> {
    require_group(db, group_id).await?;

    if to_date < from_date {
        return Err(AppError::invalid_input(
            "toDate must not precede fromDate",
        ));
    }

    let slots = db.get_schedule_slots(group_id).await?;
    if slots.is_empty() {
        return Err(AppError::invalid_input(
            "Group has no training schedule defined",
        ));
    }

    // Last write wins on duplicate weekdays; update_schedule prevents
    // duplicates from being stored in the first place
    let mut by_weekday: HashMap<u8, &ScheduleSlot> = HashMap::new();
    for slot in &slots {
        by_weekday.insert(slot.day_of_week, slot);
    }

    // The existing-training scan is half-open, so it needs the day after
    // to_date to cover to_date itself
    let day_after_range = to_date
        .succ_opt()
        .ok_or_else(|| AppError::invalid_input("toDate is beyond the supported date range"))?;
    let range_start = Utc.from_utc_datetime(&from_date.and_time(NaiveTime::MIN));
    let range_until = Utc.from_utc_datetime(&day_after_range.and_time(NaiveTime::MIN));
    let existing = db
        .trainings_in_range(group_id, range_start, range_until)
        .await?;
    let covered: HashSet<NaiveDate> = existing
        .iter()
        .map(|training| training.start_time.date_naive())
        .collect();

    let now = Utc::now();
    let mut new_trainings = Vec::new();
    let mut skipped = 0u32;

    for day in from_date.iter_days() {
        if day > to_date {
            break;
        }

        // 0 = Sunday .. 6 = Saturday
        let weekday = u8::try_from(day.weekday().num_days_from_sunday()).unwrap_or(0);
        let Some(slot) = by_weekday.get(&weekday) else {
            continue;
        };

        if covered.contains(&day) {
            skipped += 1;
            continue;
        }

        let start_time = Utc.from_utc_datetime(&day.and_time(parse_wall_time(&slot.start_time)?));
        let end_time = Utc.from_utc_datetime(&day.and_time(parse_wall_time(&slot.end_time)?));

        new_trainings.push(Training {
            id: Uuid::new_v4(),
            group_id,
            start_time,
            end_time,
            location: slot.location.clone(),
            topic: default_topic.map(ToOwned::to_owned),
            schedule_id: Some(slot.id),
            created_at: now,
        });
    }

    db.insert_trainings(&new_trainings).await?;

    let summary = GenerationSummary {
        created: u32::try_from(new_trainings.len()).unwrap_or(u32::MAX),
        skipped,
    };

    info!(
        "Generated {} trainings for group {} ({} dates skipped, range {} to {})",
        summary.created, group_id, summary.skipped, from_date, to_date
    );

    Ok(summary)
}

/// Delete the group's future schedule-generated trainings that carry no
/// attendance yet.
///
/// Trainings with attendance rows are kept: data entered by mistake on a
/// future-dated training is still data someone chose to record.
///
/// # Errors
///
/// Returns `NotFound` if the group does not exist
pub async fn delete_future_generated_trainings(
    db: &Database,
    group_id: Uuid,
) -> AppResult<CleanupSummary> {
    require_group(db, group_id).await?;

    let candidates = db.future_generated_trainings(group_id, Utc::now()).await?;

    let mut deleted = 0u32;
    let mut kept = 0u32;
    for training in &candidates {
        let attendance_count = db.attendance_count_for_training(training.id).await?;
        if attendance_count == 0 {
            db.delete_training(training.id).await?;
            deleted += 1;
        } else {
            kept += 1;
        }
    }

    info!(
        "Cleaned up future generated trainings for group {}: {} deleted, {} kept",
        group_id, deleted, kept
    );

    Ok(CleanupSummary { deleted, kept })
}

async fn require_group(db: &Database, group_id: Uuid) -> AppResult<()> {
    db.get_group(group_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Group {group_id}")))?;
    Ok(())
}

/// Parse an "HH:MM" wall-clock time
fn parse_wall_time(value: &str) -> AppResult<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| AppError::invalid_input(format!("Invalid time '{value}', expected HH:MM")))
}
