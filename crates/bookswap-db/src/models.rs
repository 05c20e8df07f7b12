//! Database row types — these map directly to SQLite rows.
//! Distinct from the bookswap-types API models so the wire format never
//! leaks storage details (password hashes, string-typed ids).

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use bookswap_types::models::{
    Book, BookCondition, BookWithOwner, ExchangeRequest, ExchangeRequestWithDetails,
    RequestStatus, User,
};

pub struct UserRow {
    pub id: String,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl UserRow {
    pub fn into_model(self) -> User {
        User {
            id: parse_uuid(&self.id, "user id"),
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            profile_image_url: self.profile_image_url,
            created_at: parse_timestamp(&self.created_at),
            updated_at: parse_timestamp(&self.updated_at),
        }
    }
}

pub struct BookRow {
    pub id: String,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub condition: String,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
    pub owner_id: String,
    pub is_available: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl BookRow {
    pub fn into_model(self) -> Book {
        let condition = self.condition.parse::<BookCondition>().unwrap_or_else(|e| {
            warn!("Corrupt condition on book '{}': {}", self.id, e);
            BookCondition::Good
        });
        Book {
            id: parse_uuid(&self.id, "book id"),
            title: self.title,
            author: self.author,
            genre: self.genre,
            condition,
            description: self.description,
            cover_image_url: self.cover_image_url,
            owner_id: parse_uuid(&self.owner_id, "book owner_id"),
            is_available: self.is_available,
            created_at: parse_timestamp(&self.created_at),
            updated_at: parse_timestamp(&self.updated_at),
        }
    }
}

pub struct BookWithOwnerRow {
    pub book: BookRow,
    pub owner: UserRow,
}

impl BookWithOwnerRow {
    pub fn into_model(self) -> BookWithOwner {
        BookWithOwner {
            book: self.book.into_model(),
            owner: self.owner.into_model(),
        }
    }
}

pub struct ExchangeRequestRow {
    pub id: String,
    pub requester_id: String,
    pub book_id: String,
    pub status: String,
    pub message: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl ExchangeRequestRow {
    pub fn into_model(self) -> ExchangeRequest {
        let status = self.status.parse::<RequestStatus>().unwrap_or_else(|e| {
            warn!("Corrupt status on exchange request '{}': {}", self.id, e);
            RequestStatus::Pending
        });
        ExchangeRequest {
            id: parse_uuid(&self.id, "request id"),
            requester_id: parse_uuid(&self.requester_id, "request requester_id"),
            book_id: parse_uuid(&self.book_id, "request book_id"),
            status,
            message: self.message,
            created_at: parse_timestamp(&self.created_at),
            updated_at: parse_timestamp(&self.updated_at),
        }
    }
}

pub struct ExchangeRequestDetailRow {
    pub request: ExchangeRequestRow,
    pub requester: UserRow,
    pub book: BookRow,
    pub owner: UserRow,
}

impl ExchangeRequestDetailRow {
    pub fn into_model(self) -> ExchangeRequestWithDetails {
        ExchangeRequestWithDetails {
            request: self.request.into_model(),
            requester: self.requester.into_model(),
            book: BookWithOwner {
                book: self.book.into_model(),
                owner: self.owner.into_model(),
            },
        }
    }
}

fn parse_uuid(s: &str, what: &str) -> Uuid {
    s.parse().unwrap_or_else(|e| {
        warn!("Corrupt {} '{}': {}", what, s, e);
        Uuid::default()
    })
}

/// SQLite's datetime('now') stores "YYYY-MM-DD HH:MM:SS" without a
/// timezone; treat it as UTC. RFC 3339 is accepted too.
fn parse_timestamp(s: &str) -> DateTime<Utc> {
    s.parse::<DateTime<Utc>>()
        .or_else(|_| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}': {}", s, e);
            DateTime::default()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sqlite_datetime_format() {
        let ts = parse_timestamp("2025-06-01 12:30:00");
        assert_eq!(ts.to_rfc3339(), "2025-06-01T12:30:00+00:00");
    }

    #[test]
    fn parses_rfc3339() {
        let ts = parse_timestamp("2025-06-01T12:30:00Z");
        assert_eq!(ts.to_rfc3339(), "2025-06-01T12:30:00+00:00");
    }
}
