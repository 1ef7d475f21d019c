// ABOUTME: Attendance batch-upsert engine with the evaluation-invalidation cascade
// ABOUTME: All-or-nothing transactional marking, per-event reads, and attendance statistics
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Attendance marking.
//!
//! `mark_batch` is the write path: one transaction per batch, records
//! processed in list order, upsert keyed by (player, event). When a
//! training attendance status moves out of the present-equivalent set
//! {PRESENT, LATE}, the player's evaluations for that training are deleted
//! inside the same transaction; the cascade never applies to matches.

use crate::database::{self, Database};
use crate::errors::{AppError, AppResult};
use crate::models::{Attendance, AttendanceStatus, EventRef, EventType, Player};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{Sqlite, Transaction};
use tracing::{debug, warn};
use uuid::Uuid;

/// One record in an attendance batch
#[derive(Debug, Clone, Deserialize)]
pub struct AttendanceRecordInput {
    /// Player being marked
    pub player_id: Uuid,
    /// New status
    pub status: AttendanceStatus,
    /// Optional notes; empty strings are normalized to null
    pub notes: Option<String>,
}

/// An attendance row with its player populated, as returned by the reads
#[derive(Debug, Clone, Serialize)]
pub struct AttendanceEntry {
    /// The attendance record
    #[serde(flatten)]
    pub attendance: Attendance,
    /// The player the record belongs to
    pub player: Player,
}

/// Attendance counters for one or more players
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct AttendanceStats {
    /// Total rows counted
    pub total: u32,
    /// Rows with status PRESENT
    pub present: u32,
    /// Rows with status ABSENT
    pub absent: u32,
    /// Rows with status SICK
    pub sick: u32,
    /// Rows with status LATE
    pub late: u32,
    /// Rows with status EXCUSED
    pub excused: u32,
    /// Percentage of present-equivalent rows, `round((present + late) / total * 100)`
    pub rate: u32,
    /// Rows attached to trainings
    pub total_trainings: u32,
    /// Rows attached to matches
    pub total_matches: u32,
}

/// Per-player attendance statistics
#[derive(Debug, Clone, Serialize)]
pub struct PlayerAttendanceStats {
    /// The player the stats belong to
    pub player_id: Uuid,
    /// Display name, `first_name + " " + last_name`
    pub player_name: String,
    /// The counters
    #[serde(flatten)]
    pub stats: AttendanceStats,
}

/// Mark attendance for a batch of players against one event.
///
/// All-or-nothing: a single missing player (or a missing event) aborts
/// the whole batch, including records already processed, via transaction
/// rollback. Returns the created/updated rows in record order.
///
/// # Errors
///
/// Returns `NotFound` for a missing event or player, `InvalidInput` for
/// an empty batch, and a generic `InvalidInput` ("Failed to mark
/// attendance") for any unexpected persistence failure
pub async fn mark_batch(
    db: &Database,
    event: EventRef,
    records: &[AttendanceRecordInput],
) -> AppResult<Vec<Attendance>> {
    if records.is_empty() {
        return Err(AppError::invalid_input(
            "Attendance batch requires at least one record",
        ));
    }

    let mut tx = db
        .pool()
        .begin()
        .await
        .map_err(|err| super::wrap_batch_error(err.into(), "Failed to mark attendance"))?;

    match mark_batch_in_tx(&mut tx, event, records).await {
        Ok(rows) => match tx.commit().await {
            Ok(()) => Ok(rows),
            Err(err) => Err(super::wrap_batch_error(
                err.into(),
                "Failed to mark attendance",
            )),
        },
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!("attendance batch rollback failed: {rollback_err}");
            }
            Err(super::wrap_batch_error(err, "Failed to mark attendance"))
        }
    }
}

/// The batch body, running entirely inside the caller's transaction
async fn mark_batch_in_tx(
    tx: &mut Transaction<'_, Sqlite>,
    event: EventRef,
    records: &[AttendanceRecordInput],
) -> AppResult<Vec<Attendance>> {
    resolve_event(tx, event).await?;

    let mut results = Vec::with_capacity(records.len());
    for record in records {
        database::players::get_player(&mut *tx, record.player_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Player {}", record.player_id)))?;

        let notes = normalize_notes(record.notes.as_deref());
        let now = Utc::now();

        let row = if let Some(existing) =
            database::attendance::find_attendance(&mut *tx, record.player_id, event).await?
        {
            database::attendance::update_attendance(
                &mut *tx,
                existing.id,
                record.status,
                notes.as_deref(),
                now,
            )
            .await?;

            // Evaluations are only meaningful for players who attended:
            // a training status change away from present-equivalent
            // invalidates them. Matches are exempt.
            if let EventRef::Training(training_id) = event {
                if !record.status.counts_as_present() {
                    let removed = database::evaluations::delete_for_player_training(
                        &mut *tx,
                        record.player_id,
                        training_id,
                    )
                    .await?;
                    if removed > 0 {
                        debug!(
                            "Deleted {removed} evaluations for player {} on training {training_id} after status change",
                            record.player_id
                        );
                    }
                }
            }

            Attendance {
                status: record.status,
                notes: notes.clone(),
                updated_at: now,
                ..existing
            }
        } else {
            let row = Attendance {
                id: Uuid::new_v4(),
                player_id: record.player_id,
                event,
                status: record.status,
                notes: notes.clone(),
                created_at: now,
                updated_at: now,
            };
            database::attendance::insert_attendance(&mut *tx, &row).await?;
            row
        };

        results.push(row);
    }

    Ok(results)
}

/// Get all attendance rows for an event with players populated, newest
/// first
///
/// # Errors
///
/// Returns an error if the database query fails
pub async fn find_by_event(db: &Database, event: EventRef) -> AppResult<Vec<AttendanceEntry>> {
    let rows = db.attendance_by_event(event).await?;

    Ok(rows
        .into_iter()
        .map(|(attendance, player)| AttendanceEntry { attendance, player })
        .collect())
}

/// Same as [`find_by_event`], filtered to a player-id allowlist.
///
/// Used to scope results to the players a coach or parent is allowed to
/// see.
///
/// # Errors
///
/// Returns an error if the database query fails
pub async fn find_by_event_for_players(
    db: &Database,
    event: EventRef,
    player_ids: &[Uuid],
) -> AppResult<Vec<AttendanceEntry>> {
    let mut entries = find_by_event(db, event).await?;
    entries.retain(|entry| player_ids.contains(&entry.attendance.player_id));
    Ok(entries)
}

/// Aggregate attendance counters across one or many players
///
/// # Errors
///
/// Returns an error if a database query fails
pub async fn get_player_stats(db: &Database, player_ids: &[Uuid]) -> AppResult<AttendanceStats> {
    let mut counters = Counters::default();
    for player_id in player_ids {
        for row in db.attendance_for_player(*player_id).await? {
            counters.add(&row);
        }
    }
    Ok(counters.finalize())
}

/// Per-player attendance counters, one stats object per input player
///
/// # Errors
///
/// Returns an error if a database query fails
pub async fn get_stats_per_player(
    db: &Database,
    players: &[Player],
) -> AppResult<Vec<PlayerAttendanceStats>> {
    let mut results = Vec::with_capacity(players.len());
    for player in players {
        let mut counters = Counters::default();
        for row in db.attendance_for_player(player.id).await? {
            counters.add(&row);
        }
        results.push(PlayerAttendanceStats {
            player_id: player.id,
            player_name: player.full_name(),
            stats: counters.finalize(),
        });
    }
    Ok(results)
}

async fn resolve_event(tx: &mut Transaction<'_, Sqlite>, event: EventRef) -> AppResult<()> {
    match event {
        EventRef::Training(id) => {
            database::events::get_training(&mut *tx, id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Training {id}")))?;
        }
        EventRef::Match(id) => {
            database::events::get_match(&mut *tx, id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Match {id}")))?;
        }
    }
    Ok(())
}

fn normalize_notes(notes: Option<&str>) -> Option<String> {
    notes
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
}

#[derive(Default)]
struct Counters {
    stats: AttendanceStats,
}

impl Counters {
    fn add(&mut self, row: &Attendance) {
        self.stats.total += 1;
        match row.status {
            AttendanceStatus::Present => self.stats.present += 1,
            AttendanceStatus::Absent => self.stats.absent += 1,
            AttendanceStatus::Sick => self.stats.sick += 1,
            AttendanceStatus::Late => self.stats.late += 1,
            AttendanceStatus::Excused => self.stats.excused += 1,
        }
        match row.event.event_type() {
            EventType::Training => self.stats.total_trainings += 1,
            EventType::Match => self.stats.total_matches += 1,
        }
    }

    fn finalize(mut self) -> AttendanceStats {
        if self.stats.total > 0 {
            let attended = f64::from(self.stats.present + self.stats.late);
            let rate = attended / f64::from(self.stats.total) * 100.0;
            // Safe: rate is within 0..=100
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            {
                self.stats.rate = rate.round() as u32;
            }
        }
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_notes() {
        assert_eq!(normalize_notes(None), None);
        assert_eq!(normalize_notes(Some("")), None);
        assert_eq!(normalize_notes(Some("   ")), None);
        assert_eq!(normalize_notes(Some("left early")), Some("left early".into()));
    }

    #[test]
    fn test_rate_rounds_to_nearest_percent() {
        let mut counters = Counters::default();
        let training = EventRef::Training(Uuid::new_v4());
        for status in [
            AttendanceStatus::Present,
            AttendanceStatus::Late,
            AttendanceStatus::Absent,
        ] {
            counters.add(&Attendance {
                id: Uuid::new_v4(),
                player_id: Uuid::new_v4(),
                event: training,
                status,
                notes: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            });
        }
        let stats = counters.finalize();
        // 2/3 -> 66.67 -> 67
        assert_eq!(stats.rate, 67);
        assert_eq!(stats.total_trainings, 3);
        assert_eq!(stats.total_matches, 0);
    }

    #[test]
    fn test_rate_is_zero_without_rows() {
        let stats = Counters::default().finalize();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.rate, 0);
    }
}
