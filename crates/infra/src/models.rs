use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub experience: i16,
    pub bio: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ClubRow {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct MembershipRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub club_id: Uuid,
    pub statement: String,
    pub role: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ApplicationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub club_id: Uuid,
    pub statement: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TournamentRow {
    pub id: Uuid,
    pub club_id: Uuid,
    pub organiser_id: Uuid,
    pub name: String,
    pub description: String,
    pub deadline: NaiveDate,
    pub capacity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TournamentEntryRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tournament_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Resolution state of a membership application. Stored as text with a
/// CHECK constraint; `pending` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<ApplicationStatus> {
        match s {
            "pending" => Some(ApplicationStatus::Pending),
            "accepted" => Some(ApplicationStatus::Accepted),
            "rejected" => Some(ApplicationStatus::Rejected),
            _ => None,
        }
    }
}

/// Self-reported playing strength, rank 1 (beginner) to 4 (grandmaster).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Experience {
    Beginner,
    Intermediate,
    Advanced,
    Grandmaster,
}

impl Experience {
    pub const fn level(self) -> i16 {
        match self {
            Experience::Beginner => 1,
            Experience::Intermediate => 2,
            Experience::Advanced => 3,
            Experience::Grandmaster => 4,
        }
    }

    pub const fn from_level(level: i16) -> Option<Experience> {
        match level {
            1 => Some(Experience::Beginner),
            2 => Some(Experience::Intermediate),
            3 => Some(Experience::Advanced),
            4 => Some(Experience::Grandmaster),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Experience::Beginner => "beginner",
            Experience::Intermediate => "intermediate",
            Experience::Advanced => "advanced",
            Experience::Grandmaster => "grandmaster",
        }
    }
}
