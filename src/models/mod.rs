// ABOUTME: Core domain models for groups, players, events, attendance, and evaluations
// ABOUTME: Defines the enums and record structs shared by the storage, service, and route layers
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Domain models for the academy server.
//!
//! Enum types carry `as_str`/`parse` pairs for their database string
//! representation; the wire format uses SCREAMING_SNAKE_CASE via serde.
//! The polymorphic "training or match" reference is the tagged union
//! [`EventRef`], so a record can never point at both event kinds at once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role assigned to an authenticated user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// Full administrative access
    Admin,
    /// Coach with access to their groups' data
    Coach,
    /// Player with read access to their own data
    Player,
    /// Parent with read access to their children's data
    Parent,
}

impl UserRole {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Coach => "coach",
            Self::Player => "player",
            Self::Parent => "parent",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "admin" => Self::Admin,
            "coach" => Self::Coach,
            "parent" => Self::Parent,
            _ => Self::Player,
        }
    }
}

/// Attendance status for a player at an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    /// Player attended
    Present,
    /// Player did not attend
    Absent,
    /// Player was sick
    Sick,
    /// Player arrived late
    Late,
    /// Absence was excused in advance
    Excused,
}

impl AttendanceStatus {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
            Self::Sick => "sick",
            Self::Late => "late",
            Self::Excused => "excused",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "present" => Self::Present,
            "sick" => Self::Sick,
            "late" => Self::Late,
            "excused" => Self::Excused,
            _ => Self::Absent,
        }
    }

    /// Whether this status counts as "present-equivalent" for evaluation
    /// purposes. Evaluations only make sense for players who took part in
    /// the session, so a move out of this set invalidates them.
    #[must_use]
    pub const fn counts_as_present(&self) -> bool {
        matches!(self, Self::Present | Self::Late)
    }
}

/// Evaluation category (classification axis, independent per player/event)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvaluationCategory {
    /// Ball technique and individual skill
    Technique,
    /// Tactical understanding and positioning
    Tactics,
    /// Physical condition and athleticism
    Physical,
    /// Mental strength and attitude
    Psychological,
}

impl EvaluationCategory {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Technique => "technique",
            Self::Tactics => "tactics",
            Self::Physical => "physical",
            Self::Psychological => "psychological",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "tactics" => Self::Tactics,
            "physical" => Self::Physical,
            "psychological" => Self::Psychological,
            _ => Self::Technique,
        }
    }

    /// All categories, in reporting order
    pub const ALL: [Self; 4] = [
        Self::Technique,
        Self::Tactics,
        Self::Physical,
        Self::Psychological,
    ];
}

/// Kind of event an attendance or evaluation row attaches to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    /// A training session
    Training,
    /// A match against another club
    Match,
}

impl EventType {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Training => "training",
            Self::Match => "match",
        }
    }
}

/// Polymorphic reference to the event an attendance/evaluation row belongs to.
///
/// Storage keeps two nullable foreign keys; the domain layer only ever sees
/// this tagged union, so "forgot to null the other one" bugs cannot occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "event_type", content = "event_id")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventRef {
    /// Reference to a training session
    Training(Uuid),
    /// Reference to a match
    Match(Uuid),
}

impl EventRef {
    /// The event kind
    #[must_use]
    pub const fn event_type(&self) -> EventType {
        match self {
            Self::Training(_) => EventType::Training,
            Self::Match(_) => EventType::Match,
        }
    }

    /// The referenced event id
    #[must_use]
    pub const fn id(&self) -> Uuid {
        match self {
            Self::Training(id) | Self::Match(id) => *id,
        }
    }

    /// Training id when this references a training, `None` for matches
    #[must_use]
    pub const fn training_id(&self) -> Option<Uuid> {
        match self {
            Self::Training(id) => Some(*id),
            Self::Match(_) => None,
        }
    }

    /// Match id when this references a match, `None` for trainings
    #[must_use]
    pub const fn match_id(&self) -> Option<Uuid> {
        match self {
            Self::Match(id) => Some(*id),
            Self::Training(_) => None,
        }
    }

    /// Build a reference from the two nullable foreign-key columns.
    ///
    /// Returns `None` unless exactly one of the ids is set.
    #[must_use]
    pub const fn from_ids(training_id: Option<Uuid>, match_id: Option<Uuid>) -> Option<Self> {
        match (training_id, match_id) {
            (Some(id), None) => Some(Self::Training(id)),
            (None, Some(id)) => Some(Self::Match(id)),
            _ => None,
        }
    }
}

/// A minimal user record (collaborator shape; CRUD lives outside this service)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: Uuid,
    /// Email address (unique)
    pub email: String,
    /// Display name
    pub display_name: Option<String>,
    /// Assigned role
    pub role: UserRole,
    /// Whether the account is active
    pub is_active: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// An age group within the academy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    /// Unique identifier
    pub id: Uuid,
    /// Display name, e.g. "U12"
    pub name: String,
    /// Year of birth the group is built around
    pub year_of_birth: i32,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// A player profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Unique identifier
    pub id: Uuid,
    /// Linked user account, if any
    pub user_id: Option<Uuid>,
    /// Group the player belongs to
    pub group_id: Option<Uuid>,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Player {
    /// Full display name, `first_name + " " + last_name`
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A coach profile, resolved from the acting user's id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoachProfile {
    /// Unique identifier
    pub id: Uuid,
    /// Linked user account
    pub user_id: Uuid,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// A weekly recurring schedule slot for a group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSlot {
    /// Unique identifier
    pub id: Uuid,
    /// Group this slot belongs to
    pub group_id: Uuid,
    /// Day of week, 0 = Sunday .. 6 = Saturday
    pub day_of_week: u8,
    /// Start of the time window, "HH:MM"
    pub start_time: String,
    /// End of the time window, "HH:MM"
    pub end_time: String,
    /// Where the session takes place
    pub location: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// A concrete training session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Training {
    /// Unique identifier
    pub id: Uuid,
    /// Group this training belongs to
    pub group_id: Uuid,
    /// Session start
    pub start_time: DateTime<Utc>,
    /// Session end
    pub end_time: DateTime<Utc>,
    /// Where the session takes place
    pub location: String,
    /// Planned topic, if any
    pub topic: Option<String>,
    /// Schedule slot this training was generated from; manually created
    /// trainings have none
    pub schedule_id: Option<Uuid>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// A match against another club
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    /// Unique identifier
    pub id: Uuid,
    /// Group this match belongs to
    pub group_id: Uuid,
    /// Name of the opposing club
    pub opponent: String,
    /// Match start
    pub start_time: DateTime<Utc>,
    /// Match end
    pub end_time: DateTime<Utc>,
    /// Venue
    pub location: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// An attendance record for one player at one event.
///
/// At most one row exists per (player, training) and per (player, match);
/// batch marking upserts rather than duplicates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attendance {
    /// Unique identifier
    pub id: Uuid,
    /// Player this record belongs to
    pub player_id: Uuid,
    /// The event this record attaches to
    #[serde(flatten)]
    pub event: EventRef,
    /// Recorded status
    pub status: AttendanceStatus,
    /// Optional free-form notes
    pub notes: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// A performance evaluation for one player at one event in one category.
///
/// At most one row exists per (player, event, category); distinct
/// categories coexist independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    /// Unique identifier
    pub id: Uuid,
    /// Player being evaluated
    pub player_id: Uuid,
    /// Coach who submitted the evaluation
    pub coach_id: Uuid,
    /// The event this evaluation attaches to
    #[serde(flatten)]
    pub event: EventRef,
    /// Rating category
    #[serde(rename = "type")]
    pub category: EvaluationCategory,
    /// Rating on a 1-10 scale
    pub rating: i64,
    /// Optional free-form comment
    pub comment: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}
