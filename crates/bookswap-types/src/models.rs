use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Physical condition of a listed book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BookCondition {
    LikeNew,
    Good,
    Fair,
}

impl BookCondition {
    pub fn as_str(self) -> &'static str {
        match self {
            BookCondition::LikeNew => "like-new",
            BookCondition::Good => "good",
            BookCondition::Fair => "fair",
        }
    }
}

impl FromStr for BookCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like-new" => Ok(BookCondition::LikeNew),
            "good" => Ok(BookCondition::Good),
            "fair" => Ok(BookCondition::Fair),
            other => Err(format!("unknown book condition: {other}")),
        }
    }
}

impl fmt::Display for BookCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub condition: BookCondition,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
    pub owner_id: Uuid,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookWithOwner {
    #[serde(flatten)]
    pub book: Book,
    pub owner: User,
}

/// Lifecycle of an exchange request.
///
/// `pending` is the initial state. The book owner moves a pending request
/// to `accepted`, `rejected`, or directly to `completed` (swap arranged
/// out of band); an accepted request can still be marked `completed`.
/// `rejected` and `completed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
    Completed,
}

impl RequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Accepted => "accepted",
            RequestStatus::Rejected => "rejected",
            RequestStatus::Completed => "completed",
        }
    }

    pub fn can_transition_to(self, next: RequestStatus) -> bool {
        use RequestStatus::*;
        matches!(
            (self, next),
            (Pending, Accepted) | (Pending, Rejected) | (Pending, Completed) | (Accepted, Completed)
        )
    }
}

impl FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RequestStatus::Pending),
            "accepted" => Ok(RequestStatus::Accepted),
            "rejected" => Ok(RequestStatus::Rejected),
            "completed" => Ok(RequestStatus::Completed),
            other => Err(format!("unknown request status: {other}")),
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeRequest {
    pub id: Uuid,
    pub requester_id: Uuid,
    pub book_id: Uuid,
    pub status: RequestStatus,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An exchange request joined with the people and book involved, as the
/// request-list views render it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeRequestWithDetails {
    #[serde(flatten)]
    pub request: ExchangeRequest,
    pub requester: User,
    pub book: BookWithOwner,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_can_reach_every_other_state() {
        use RequestStatus::*;
        assert!(Pending.can_transition_to(Accepted));
        assert!(Pending.can_transition_to(Rejected));
        assert!(Pending.can_transition_to(Completed));
    }

    #[test]
    fn accepted_only_completes() {
        use RequestStatus::*;
        assert!(Accepted.can_transition_to(Completed));
        assert!(!Accepted.can_transition_to(Rejected));
        assert!(!Accepted.can_transition_to(Pending));
    }

    #[test]
    fn terminal_states_stay_terminal() {
        use RequestStatus::*;
        for next in [Pending, Accepted, Rejected, Completed] {
            assert!(!Rejected.can_transition_to(next));
            assert!(!Completed.can_transition_to(next));
        }
    }

    #[test]
    fn no_state_transitions_to_itself() {
        use RequestStatus::*;
        for s in [Pending, Accepted, Rejected, Completed] {
            assert!(!s.can_transition_to(s));
        }
    }

    #[test]
    fn condition_round_trips_through_str() {
        for c in [BookCondition::LikeNew, BookCondition::Good, BookCondition::Fair] {
            assert_eq!(c.as_str().parse::<BookCondition>().unwrap(), c);
        }
        assert!("mint".parse::<BookCondition>().is_err());
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&RequestStatus::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!(
            serde_json::to_string(&BookCondition::LikeNew).unwrap(),
            "\"like-new\""
        );
    }
}
