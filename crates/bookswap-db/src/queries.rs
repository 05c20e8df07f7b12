use crate::Database;
use crate::models::{
    BookRow, BookWithOwnerRow, ExchangeRequestDetailRow, ExchangeRequestRow, UserRow,
};
use anyhow::{Result, anyhow};
use rusqlite::{Connection, OptionalExtension};

use bookswap_types::models::{BookCondition, RequestStatus};

/// Fields for a new book listing. The id, owner, availability flag, and
/// timestamps are assigned at insert time.
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub condition: BookCondition,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
}

/// Partial update for a book listing. `None` leaves the column unchanged.
#[derive(Default)]
pub struct BookChanges {
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub condition: Option<BookCondition>,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
}

pub enum CreateUserOutcome {
    Created(UserRow),
    EmailTaken,
}

pub enum CreateRequestOutcome {
    Created(ExchangeRequestRow),
    BookNotFound,
    BookUnavailable,
    OwnBook,
}

pub enum TransitionOutcome {
    Updated(ExchangeRequestRow),
    NotFound,
    NotOwner,
    Illegal { from: RequestStatus },
}

impl Database {
    // -- Users --

    /// Insert a user unless the email is already registered. The existence
    /// check and the insert share one critical section so two concurrent
    /// registrations cannot both pass the check.
    pub fn create_user(
        &self,
        id: &str,
        email: &str,
        password_hash: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> Result<CreateUserOutcome> {
        self.with_conn_mut(|conn| {
            let taken: Option<String> = conn
                .query_row("SELECT id FROM users WHERE email = ?1", [email], |row| {
                    row.get(0)
                })
                .optional()?;
            if taken.is_some() {
                return Ok(CreateUserOutcome::EmailTaken);
            }

            conn.execute(
                "INSERT INTO users (id, email, password, first_name, last_name)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![id, email, password_hash, first_name, last_name],
            )?;

            let row = query_user_by_id(conn, id)?
                .ok_or_else(|| anyhow!("user row missing after insert"))?;
            Ok(CreateUserOutcome::Created(row))
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {USER_COLS} FROM users WHERE email = ?1"
            ))?;
            let row = stmt.query_row([email], |row| map_user_at(row, 0)).optional()?;
            Ok(row)
        })
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_id(conn, id))
    }

    // -- Books --

    pub fn create_book(&self, id: &str, owner_id: &str, book: &NewBook) -> Result<BookRow> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO books (id, title, author, genre, condition, description, cover_image_url, owner_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                rusqlite::params![
                    id,
                    book.title,
                    book.author,
                    book.genre,
                    book.condition.as_str(),
                    book.description,
                    book.cover_image_url,
                    owner_id,
                ],
            )?;

            query_book_by_id(conn, id)?.ok_or_else(|| anyhow!("book row missing after insert"))
        })
    }

    pub fn get_book(&self, id: &str) -> Result<Option<BookWithOwnerRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {BOOK_OWNER_COLS}
                 FROM books b
                 JOIN users u ON b.owner_id = u.id
                 WHERE b.id = ?1"
            ))?;
            let row = stmt
                .query_row([id], map_book_with_owner)
                .optional()?;
            Ok(row)
        })
    }

    /// All books currently open to exchange requests, newest first.
    pub fn list_available_books(&self) -> Result<Vec<BookWithOwnerRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {BOOK_OWNER_COLS}
                 FROM books b
                 JOIN users u ON b.owner_id = u.id
                 WHERE b.is_available = 1
                 ORDER BY b.created_at DESC, b.id"
            ))?;
            let rows = stmt
                .query_map([], map_book_with_owner)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Every book the user listed, available or not, newest first.
    pub fn list_books_by_owner(&self, owner_id: &str) -> Result<Vec<BookWithOwnerRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {BOOK_OWNER_COLS}
                 FROM books b
                 JOIN users u ON b.owner_id = u.id
                 WHERE b.owner_id = ?1
                 ORDER BY b.created_at DESC, b.id"
            ))?;
            let rows = stmt
                .query_map([owner_id], map_book_with_owner)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Apply a partial update. Returns the updated row, or None if the book
    /// does not exist.
    pub fn update_book(&self, id: &str, changes: &BookChanges) -> Result<Option<BookRow>> {
        self.with_conn_mut(|conn| {
            let affected = conn.execute(
                "UPDATE books SET
                     title = COALESCE(?2, title),
                     author = COALESCE(?3, author),
                     genre = COALESCE(?4, genre),
                     condition = COALESCE(?5, condition),
                     description = COALESCE(?6, description),
                     cover_image_url = COALESCE(?7, cover_image_url),
                     updated_at = datetime('now')
                 WHERE id = ?1",
                rusqlite::params![
                    id,
                    changes.title,
                    changes.author,
                    changes.genre,
                    changes.condition.map(|c| c.as_str()),
                    changes.description,
                    changes.cover_image_url,
                ],
            )?;
            if affected == 0 {
                return Ok(None);
            }
            query_book_by_id(conn, id)
        })
    }

    /// Delete a book and any exchange requests against it. Returns false if
    /// the book does not exist.
    pub fn delete_book(&self, id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM exchange_requests WHERE book_id = ?1", [id])?;
            let affected = tx.execute("DELETE FROM books WHERE id = ?1", [id])?;
            tx.commit()?;
            Ok(affected > 0)
        })
    }

    // -- Exchange requests --

    /// Create a pending request. Existence, availability, and the
    /// own-book rule are all checked in the same critical section as the
    /// insert, so the book cannot be accepted away between check and write.
    pub fn create_exchange_request(
        &self,
        id: &str,
        requester_id: &str,
        book_id: &str,
        message: Option<&str>,
    ) -> Result<CreateRequestOutcome> {
        self.with_conn_mut(|conn| {
            let book: Option<(String, bool)> = conn
                .query_row(
                    "SELECT owner_id, is_available FROM books WHERE id = ?1",
                    [book_id],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;

            let Some((owner_id, is_available)) = book else {
                return Ok(CreateRequestOutcome::BookNotFound);
            };
            if owner_id == requester_id {
                return Ok(CreateRequestOutcome::OwnBook);
            }
            if !is_available {
                return Ok(CreateRequestOutcome::BookUnavailable);
            }

            conn.execute(
                "INSERT INTO exchange_requests (id, requester_id, book_id, message)
                 VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![id, requester_id, book_id, message],
            )?;

            let row = query_request_by_id(conn, id)?
                .ok_or_else(|| anyhow!("request row missing after insert"))?;
            Ok(CreateRequestOutcome::Created(row))
        })
    }

    /// Requests the user has sent, newest first.
    pub fn list_requests_by_requester(&self, user_id: &str) -> Result<Vec<ExchangeRequestDetailRow>> {
        self.list_request_details("er.requester_id = ?1", user_id)
    }

    /// Requests against books the user owns, newest first.
    pub fn list_requests_for_owner(&self, owner_id: &str) -> Result<Vec<ExchangeRequestDetailRow>> {
        self.list_request_details("b.owner_id = ?1", owner_id)
    }

    fn list_request_details(
        &self,
        filter: &str,
        param: &str,
    ) -> Result<Vec<ExchangeRequestDetailRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {REQUEST_DETAIL_COLS}
                 FROM exchange_requests er
                 JOIN users r ON er.requester_id = r.id
                 JOIN books b ON er.book_id = b.id
                 JOIN users o ON b.owner_id = o.id
                 WHERE {filter}
                 ORDER BY er.created_at DESC, er.id"
            ))?;
            let rows = stmt
                .query_map([param], map_request_detail)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Move a request to a new status on behalf of `actor_id`.
    ///
    /// Only the owner of the requested book may transition, and only along
    /// the edges `RequestStatus::can_transition_to` allows. Accepting also
    /// flips the book unavailable; status change and flip commit in one
    /// transaction, so two racing accepts against the same book cannot
    /// both succeed.
    pub fn transition_request(
        &self,
        id: &str,
        actor_id: &str,
        next: RequestStatus,
    ) -> Result<TransitionOutcome> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let current: Option<(String, String, String, bool)> = tx
                .query_row(
                    "SELECT er.status, b.owner_id, b.id, b.is_available
                     FROM exchange_requests er
                     JOIN books b ON er.book_id = b.id
                     WHERE er.id = ?1",
                    [id],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
                )
                .optional()?;

            let Some((status, owner_id, book_id, is_available)) = current else {
                return Ok(TransitionOutcome::NotFound);
            };
            if owner_id != actor_id {
                return Ok(TransitionOutcome::NotOwner);
            }

            let from = status
                .parse::<RequestStatus>()
                .map_err(|e| anyhow!("corrupt status on request '{}': {}", id, e))?;
            if !from.can_transition_to(next) {
                return Ok(TransitionOutcome::Illegal { from });
            }
            // A pending request on a book another accept already claimed
            // cannot be accepted too.
            if next == RequestStatus::Accepted && !is_available {
                return Ok(TransitionOutcome::Illegal { from });
            }

            tx.execute(
                "UPDATE exchange_requests SET status = ?2, updated_at = datetime('now')
                 WHERE id = ?1",
                rusqlite::params![id, next.as_str()],
            )?;

            if next == RequestStatus::Accepted {
                tx.execute(
                    "UPDATE books SET is_available = 0, updated_at = datetime('now')
                     WHERE id = ?1",
                    [&book_id],
                )?;
            }

            let row = query_request_by_id(&tx, id)?
                .ok_or_else(|| anyhow!("request row missing after update"))?;
            tx.commit()?;
            Ok(TransitionOutcome::Updated(row))
        })
    }
}

// Column lists shared by the queries above. Order must match the
// map_*_at offsets.
const USER_COLS: &str =
    "id, email, password, first_name, last_name, profile_image_url, created_at, updated_at";

const BOOK_OWNER_COLS: &str = "b.id, b.title, b.author, b.genre, b.condition, b.description, \
     b.cover_image_url, b.owner_id, b.is_available, b.created_at, b.updated_at, \
     u.id, u.email, u.password, u.first_name, u.last_name, u.profile_image_url, \
     u.created_at, u.updated_at";

const REQUEST_DETAIL_COLS: &str = "er.id, er.requester_id, er.book_id, er.status, er.message, \
     er.created_at, er.updated_at, \
     r.id, r.email, r.password, r.first_name, r.last_name, r.profile_image_url, \
     r.created_at, r.updated_at, \
     b.id, b.title, b.author, b.genre, b.condition, b.description, \
     b.cover_image_url, b.owner_id, b.is_available, b.created_at, b.updated_at, \
     o.id, o.email, o.password, o.first_name, o.last_name, o.profile_image_url, \
     o.created_at, o.updated_at";

fn map_user_at(row: &rusqlite::Row, base: usize) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(base)?,
        email: row.get(base + 1)?,
        password: row.get(base + 2)?,
        first_name: row.get(base + 3)?,
        last_name: row.get(base + 4)?,
        profile_image_url: row.get(base + 5)?,
        created_at: row.get(base + 6)?,
        updated_at: row.get(base + 7)?,
    })
}

fn map_book_at(row: &rusqlite::Row, base: usize) -> rusqlite::Result<BookRow> {
    Ok(BookRow {
        id: row.get(base)?,
        title: row.get(base + 1)?,
        author: row.get(base + 2)?,
        genre: row.get(base + 3)?,
        condition: row.get(base + 4)?,
        description: row.get(base + 5)?,
        cover_image_url: row.get(base + 6)?,
        owner_id: row.get(base + 7)?,
        is_available: row.get(base + 8)?,
        created_at: row.get(base + 9)?,
        updated_at: row.get(base + 10)?,
    })
}

fn map_request_at(row: &rusqlite::Row, base: usize) -> rusqlite::Result<ExchangeRequestRow> {
    Ok(ExchangeRequestRow {
        id: row.get(base)?,
        requester_id: row.get(base + 1)?,
        book_id: row.get(base + 2)?,
        status: row.get(base + 3)?,
        message: row.get(base + 4)?,
        created_at: row.get(base + 5)?,
        updated_at: row.get(base + 6)?,
    })
}

fn map_book_with_owner(row: &rusqlite::Row) -> rusqlite::Result<BookWithOwnerRow> {
    Ok(BookWithOwnerRow {
        book: map_book_at(row, 0)?,
        owner: map_user_at(row, 11)?,
    })
}

fn map_request_detail(row: &rusqlite::Row) -> rusqlite::Result<ExchangeRequestDetailRow> {
    Ok(ExchangeRequestDetailRow {
        request: map_request_at(row, 0)?,
        requester: map_user_at(row, 7)?,
        book: map_book_at(row, 15)?,
        owner: map_user_at(row, 26)?,
    })
}

fn query_user_by_id(conn: &Connection, id: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(&format!("SELECT {USER_COLS} FROM users WHERE id = ?1"))?;
    let row = stmt.query_row([id], |row| map_user_at(row, 0)).optional()?;
    Ok(row)
}

fn query_book_by_id(conn: &Connection, id: &str) -> Result<Option<BookRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, title, author, genre, condition, description, cover_image_url,
                owner_id, is_available, created_at, updated_at
         FROM books WHERE id = ?1",
    )?;
    let row = stmt.query_row([id], |row| map_book_at(row, 0)).optional()?;
    Ok(row)
}

fn query_request_by_id(conn: &Connection, id: &str) -> Result<Option<ExchangeRequestRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, requester_id, book_id, status, message, created_at, updated_at
         FROM exchange_requests WHERE id = ?1",
    )?;
    let row = stmt
        .query_row([id], |row| map_request_at(row, 0))
        .optional()?;
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use uuid::Uuid;

    fn open_db() -> (Database, TempDir) {
        let dir = TempDir::new().expect("temp dir");
        let db = Database::open(&dir.path().join("test.db")).expect("open db");
        (db, dir)
    }

    fn add_user(db: &Database, email: &str) -> String {
        let id = Uuid::new_v4().to_string();
        match db
            .create_user(&id, email, "not-a-real-hash", Some("Test"), None)
            .unwrap()
        {
            CreateUserOutcome::Created(row) => row.id,
            CreateUserOutcome::EmailTaken => panic!("email unexpectedly taken"),
        }
    }

    fn add_book(db: &Database, owner_id: &str, title: &str) -> String {
        let id = Uuid::new_v4().to_string();
        db.create_book(
            &id,
            owner_id,
            &NewBook {
                title: title.into(),
                author: "A. Author".into(),
                genre: "Fiction".into(),
                condition: BookCondition::Good,
                description: None,
                cover_image_url: None,
            },
        )
        .unwrap();
        id
    }

    fn add_request(db: &Database, requester_id: &str, book_id: &str) -> String {
        let id = Uuid::new_v4().to_string();
        match db
            .create_exchange_request(&id, requester_id, book_id, Some("interested!"))
            .unwrap()
        {
            CreateRequestOutcome::Created(row) => row.id,
            _ => panic!("request unexpectedly refused"),
        }
    }

    #[test]
    fn duplicate_email_is_refused() {
        let (db, _dir) = open_db();
        add_user(&db, "a@example.com");
        let outcome = db
            .create_user(
                &Uuid::new_v4().to_string(),
                "a@example.com",
                "hash",
                None,
                None,
            )
            .unwrap();
        assert!(matches!(outcome, CreateUserOutcome::EmailTaken));
    }

    #[test]
    fn created_book_comes_back_with_owner() {
        let (db, _dir) = open_db();
        let owner = add_user(&db, "owner@example.com");
        let book_id = add_book(&db, &owner, "Dune");

        let found = db.get_book(&book_id).unwrap().expect("book exists");
        assert_eq!(found.book.title, "Dune");
        assert_eq!(found.owner.id, owner);
        assert!(found.book.is_available);
    }

    #[test]
    fn available_listing_hides_unavailable_books() {
        let (db, _dir) = open_db();
        let owner = add_user(&db, "owner@example.com");
        let requester = add_user(&db, "req@example.com");
        let b1 = add_book(&db, &owner, "Dune");
        let b2 = add_book(&db, &owner, "Emma");

        let req = add_request(&db, &requester, &b1);
        let outcome = db
            .transition_request(&req, &owner, RequestStatus::Accepted)
            .unwrap();
        assert!(matches!(outcome, TransitionOutcome::Updated(_)));

        let available = db.list_available_books().unwrap();
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].book.id, b2);

        // my-books still shows both
        let mine = db.list_books_by_owner(&owner).unwrap();
        assert_eq!(mine.len(), 2);
    }

    #[test]
    fn partial_update_only_touches_given_fields() {
        let (db, _dir) = open_db();
        let owner = add_user(&db, "owner@example.com");
        let book_id = add_book(&db, &owner, "Dune");

        let updated = db
            .update_book(
                &book_id,
                &BookChanges {
                    title: Some("Dune Messiah".into()),
                    condition: Some(BookCondition::Fair),
                    ..Default::default()
                },
            )
            .unwrap()
            .expect("book exists");

        assert_eq!(updated.title, "Dune Messiah");
        assert_eq!(updated.condition, "fair");
        assert_eq!(updated.author, "A. Author");
    }

    #[test]
    fn update_of_missing_book_is_none() {
        let (db, _dir) = open_db();
        let outcome = db
            .update_book(&Uuid::new_v4().to_string(), &BookChanges::default())
            .unwrap();
        assert!(outcome.is_none());
    }

    #[test]
    fn delete_removes_book_and_its_requests() {
        let (db, _dir) = open_db();
        let owner = add_user(&db, "owner@example.com");
        let requester = add_user(&db, "req@example.com");
        let book_id = add_book(&db, &owner, "Dune");
        add_request(&db, &requester, &book_id);

        assert!(db.delete_book(&book_id).unwrap());
        assert!(db.get_book(&book_id).unwrap().is_none());
        assert!(db.list_requests_by_requester(&requester).unwrap().is_empty());

        // Deleting again reports missing
        assert!(!db.delete_book(&book_id).unwrap());
    }

    #[test]
    fn own_book_cannot_be_requested() {
        let (db, _dir) = open_db();
        let owner = add_user(&db, "owner@example.com");
        let book_id = add_book(&db, &owner, "Dune");

        let outcome = db
            .create_exchange_request(&Uuid::new_v4().to_string(), &owner, &book_id, None)
            .unwrap();
        assert!(matches!(outcome, CreateRequestOutcome::OwnBook));
    }

    #[test]
    fn unavailable_book_cannot_be_requested() {
        let (db, _dir) = open_db();
        let owner = add_user(&db, "owner@example.com");
        let r1 = add_user(&db, "r1@example.com");
        let r2 = add_user(&db, "r2@example.com");
        let book_id = add_book(&db, &owner, "Dune");

        let req = add_request(&db, &r1, &book_id);
        db.transition_request(&req, &owner, RequestStatus::Accepted)
            .unwrap();

        let outcome = db
            .create_exchange_request(&Uuid::new_v4().to_string(), &r2, &book_id, None)
            .unwrap();
        assert!(matches!(outcome, CreateRequestOutcome::BookUnavailable));
    }

    #[test]
    fn missing_book_is_distinguished_from_unavailable() {
        let (db, _dir) = open_db();
        let requester = add_user(&db, "req@example.com");
        let outcome = db
            .create_exchange_request(
                &Uuid::new_v4().to_string(),
                &requester,
                &Uuid::new_v4().to_string(),
                None,
            )
            .unwrap();
        assert!(matches!(outcome, CreateRequestOutcome::BookNotFound));
    }

    #[test]
    fn only_the_book_owner_may_transition() {
        let (db, _dir) = open_db();
        let owner = add_user(&db, "owner@example.com");
        let requester = add_user(&db, "req@example.com");
        let book_id = add_book(&db, &owner, "Dune");
        let req = add_request(&db, &requester, &book_id);

        // The requester moving their own request is refused
        let outcome = db
            .transition_request(&req, &requester, RequestStatus::Accepted)
            .unwrap();
        assert!(matches!(outcome, TransitionOutcome::NotOwner));
    }

    #[test]
    fn rejected_request_cannot_complete() {
        let (db, _dir) = open_db();
        let owner = add_user(&db, "owner@example.com");
        let requester = add_user(&db, "req@example.com");
        let book_id = add_book(&db, &owner, "Dune");
        let req = add_request(&db, &requester, &book_id);

        db.transition_request(&req, &owner, RequestStatus::Rejected)
            .unwrap();
        let outcome = db
            .transition_request(&req, &owner, RequestStatus::Completed)
            .unwrap();
        assert!(matches!(
            outcome,
            TransitionOutcome::Illegal {
                from: RequestStatus::Rejected
            }
        ));
    }

    #[test]
    fn accept_then_complete_succeeds() {
        let (db, _dir) = open_db();
        let owner = add_user(&db, "owner@example.com");
        let requester = add_user(&db, "req@example.com");
        let book_id = add_book(&db, &owner, "Dune");
        let req = add_request(&db, &requester, &book_id);

        db.transition_request(&req, &owner, RequestStatus::Accepted)
            .unwrap();
        let outcome = db
            .transition_request(&req, &owner, RequestStatus::Completed)
            .unwrap();
        let TransitionOutcome::Updated(row) = outcome else {
            panic!("expected update");
        };
        assert_eq!(row.status, "completed");
    }

    #[test]
    fn second_accept_on_same_book_is_refused() {
        let (db, _dir) = open_db();
        let owner = add_user(&db, "owner@example.com");
        let r1 = add_user(&db, "r1@example.com");
        let r2 = add_user(&db, "r2@example.com");
        let book_id = add_book(&db, &owner, "Dune");

        let req1 = add_request(&db, &r1, &book_id);
        let req2 = add_request(&db, &r2, &book_id);

        db.transition_request(&req1, &owner, RequestStatus::Accepted)
            .unwrap();
        let outcome = db
            .transition_request(&req2, &owner, RequestStatus::Accepted)
            .unwrap();
        assert!(matches!(outcome, TransitionOutcome::Illegal { .. }));
    }

    #[test]
    fn request_listings_join_both_sides() {
        let (db, _dir) = open_db();
        let owner = add_user(&db, "owner@example.com");
        let requester = add_user(&db, "req@example.com");
        let book_id = add_book(&db, &owner, "Dune");
        add_request(&db, &requester, &book_id);

        let sent = db.list_requests_by_requester(&requester).unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].requester.id, requester);
        assert_eq!(sent[0].owner.id, owner);
        assert_eq!(sent[0].book.id, book_id);

        let incoming = db.list_requests_for_owner(&owner).unwrap();
        assert_eq!(incoming.len(), 1);
        assert_eq!(incoming[0].request.id, sent[0].request.id);

        // The requester has no incoming requests of their own
        assert!(db.list_requests_for_owner(&requester).unwrap().is_empty());
    }
}
