use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id                  TEXT PRIMARY KEY,
            email               TEXT NOT NULL UNIQUE,
            password            TEXT NOT NULL,
            first_name          TEXT,
            last_name           TEXT,
            profile_image_url   TEXT,
            created_at          TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at          TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS books (
            id                  TEXT PRIMARY KEY,
            title               TEXT NOT NULL,
            author              TEXT NOT NULL,
            genre               TEXT NOT NULL,
            condition           TEXT NOT NULL,
            description         TEXT,
            cover_image_url     TEXT,
            owner_id            TEXT NOT NULL REFERENCES users(id),
            is_available        INTEGER NOT NULL DEFAULT 1,
            created_at          TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at          TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_books_owner
            ON books(owner_id, created_at);

        CREATE TABLE IF NOT EXISTS exchange_requests (
            id              TEXT PRIMARY KEY,
            requester_id    TEXT NOT NULL REFERENCES users(id),
            book_id         TEXT NOT NULL REFERENCES books(id),
            status          TEXT NOT NULL DEFAULT 'pending',
            message         TEXT,
            created_at      TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_requests_book
            ON exchange_requests(book_id, created_at);

        CREATE INDEX IF NOT EXISTS idx_requests_requester
            ON exchange_requests(requester_id, created_at);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
