// ABOUTME: Rating aggregator building per-player history and category averages from evaluations
// ABOUTME: Groups evaluations per event, applies the optional date window, and computes means
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Rating statistics.
//!
//! A player's evaluations are grouped per event into history entries,
//! one slot per category. The optional date window filters at the group
//! level: an event outside the window drops with all of its category
//! ratings, even ones submitted inside the window.

use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{EvaluationCategory, EventRef, EventType};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

/// Ratings of one event, one slot per category.
///
/// The wire keys `technical`/`tactical` are the established client
/// contract and differ from the category enum's names.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CategoryRatings {
    /// Technique rating, if evaluated
    pub technical: Option<i64>,
    /// Tactics rating, if evaluated
    pub tactical: Option<i64>,
    /// Physical rating, if evaluated
    pub physical: Option<i64>,
    /// Psychological rating, if evaluated
    pub psychological: Option<i64>,
}

impl CategoryRatings {
    fn set(&mut self, category: EvaluationCategory, rating: i64) {
        match category {
            EvaluationCategory::Technique => self.technical = Some(rating),
            EvaluationCategory::Tactics => self.tactical = Some(rating),
            EvaluationCategory::Physical => self.physical = Some(rating),
            EvaluationCategory::Psychological => self.psychological = Some(rating),
        }
    }

    const fn get(&self, category: EvaluationCategory) -> Option<i64> {
        match category {
            EvaluationCategory::Technique => self.technical,
            EvaluationCategory::Tactics => self.tactical,
            EvaluationCategory::Physical => self.physical,
            EvaluationCategory::Psychological => self.psychological,
        }
    }
}

/// One event's worth of ratings in a player's history
#[derive(Debug, Clone, Serialize)]
pub struct RatingHistoryEntry {
    /// Event date, `YYYY-MM-DD`
    pub date: String,
    /// Kind of event
    pub event_type: EventType,
    /// The event's id
    pub event_id: Uuid,
    /// Mean of the set categories, rounded to one decimal
    pub average_rating: f64,
    /// The per-category ratings
    pub ratings: CategoryRatings,
}

/// Per-category means across the (filtered) history
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CategoryAverages {
    /// Mean technique rating, if any event carried one
    pub technical: Option<f64>,
    /// Mean tactics rating, if any event carried one
    pub tactical: Option<f64>,
    /// Mean physical rating, if any event carried one
    pub physical: Option<f64>,
    /// Mean psychological rating, if any event carried one
    pub psychological: Option<f64>,
}

/// A player's full rating statistics
#[derive(Debug, Clone, Serialize)]
pub struct RatingStats {
    /// Player the stats belong to
    pub player_id: Uuid,
    /// Mean of the per-event averages, `None` when the history is empty
    pub average_rating: Option<f64>,
    /// Per-category means
    pub by_category: CategoryAverages,
    /// Events with at least one rating in the window, oldest first
    pub history: Vec<RatingHistoryEntry>,
    /// Number of history entries
    pub total_events: u32,
}

/// Compute a player's rating statistics over an optional date window.
///
/// Evaluations are grouped by the event they attach to; resubmissions
/// within a category overwrite earlier values, so each entry reflects
/// the latest state. Window bounds are inclusive and apply to the
/// event's date, dropping whole events rather than individual ratings.
///
/// # Errors
///
/// Returns `NotFound` if the player does not exist
pub async fn get_rating_stats(
    db: &Database,
    player_id: Uuid,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> AppResult<RatingStats> {
    db.get_player(player_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Player {player_id}")))?;

    let rows = db.evaluations_with_event_start(player_id).await?;

    let mut groups = group_by_event(&rows);
    groups.retain(|group| in_window(group.event_start.date_naive(), start_date, end_date));
    groups.sort_by_key(|group| group.event_start);

    let mut history = Vec::with_capacity(groups.len());
    let mut category_sums: HashMap<EvaluationCategory, (i64, u32)> = HashMap::new();

    for group in &groups {
        let mut sum = 0i64;
        let mut count = 0u32;
        for category in EvaluationCategory::ALL {
            if let Some(rating) = group.ratings.get(category) {
                sum += rating;
                count += 1;
                let entry = category_sums.entry(category).or_default();
                entry.0 += rating;
                entry.1 += 1;
            }
        }

        history.push(RatingHistoryEntry {
            date: group.event_start.format("%Y-%m-%d").to_string(),
            event_type: group.event.event_type(),
            event_id: group.event.id(),
            average_rating: round1(mean(sum, count)),
            ratings: group.ratings,
        });
    }

    // Overall average is the mean of the per-event averages, so sparse
    // events weigh the same as fully evaluated ones
    let average_rating = if history.is_empty() {
        None
    } else {
        let sum: f64 = history.iter().map(|entry| entry.average_rating).sum();
        #[allow(clippy::cast_precision_loss)]
        let count = history.len() as f64;
        Some(round1(sum / count))
    };

    let average = |category| {
        category_sums
            .get(&category)
            .map(|&(sum, count)| round1(mean(sum, count)))
    };

    Ok(RatingStats {
        player_id,
        average_rating,
        by_category: CategoryAverages {
            technical: average(EvaluationCategory::Technique),
            tactical: average(EvaluationCategory::Tactics),
            physical: average(EvaluationCategory::Physical),
            psychological: average(EvaluationCategory::Psychological),
        },
        total_events: u32::try_from(history.len()).unwrap_or(u32::MAX),
        history,
    })
}

struct EventGroup {
    event: EventRef,
    event_start: DateTime<Utc>,
    ratings: CategoryRatings,
}

/// Fold the flat evaluation rows into one group per event. Rows arrive
/// in creation order, so a later row for the same category overwrites
/// the earlier value.
fn group_by_event(
    rows: &[(crate::models::Evaluation, DateTime<Utc>)],
) -> Vec<EventGroup> {
    let mut index: HashMap<EventRef, usize> = HashMap::new();
    let mut groups: Vec<EventGroup> = Vec::new();

    for (evaluation, event_start) in rows {
        let slot = *index.entry(evaluation.event).or_insert_with(|| {
            groups.push(EventGroup {
                event: evaluation.event,
                event_start: *event_start,
                ratings: CategoryRatings::default(),
            });
            groups.len() - 1
        });
        groups[slot].ratings.set(evaluation.category, evaluation.rating);
    }

    groups
}

fn in_window(date: NaiveDate, start: Option<NaiveDate>, end: Option<NaiveDate>) -> bool {
    if start.is_some_and(|s| date < s) {
        return false;
    }
    if end.is_some_and(|e| date > e) {
        return false;
    }
    true
}

fn mean(sum: i64, count: u32) -> f64 {
    if count == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    {
        sum as f64 / f64::from(count)
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
