use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use axum_extra::extract::Multipart;
use anyhow::anyhow;
use uuid::Uuid;

use bookswap_db::queries::{BookChanges, NewBook};
use bookswap_types::models::{Book, BookCondition, BookWithOwner};

use crate::auth::{AppState, AppStateInner, extract_claims};
use crate::error::{ApiError, ApiResult};

/// 10 MiB cap for cover images; the router's body limit leaves headroom
/// for the other form parts.
const MAX_COVER_SIZE: usize = 10 * 1024 * 1024;

/// GET /api/books — every book currently open to exchange, newest first.
pub async fn list_books(State(state): State<AppState>) -> ApiResult<Json<Vec<BookWithOwner>>> {
    let db = state.clone();
    let rows = tokio::task::spawn_blocking(move || db.db.list_available_books()).await??;
    Ok(Json(rows.into_iter().map(|r| r.into_model()).collect()))
}

/// GET /api/books/{id}
pub async fn get_book(
    State(state): State<AppState>,
    Path(book_id): Path<Uuid>,
) -> ApiResult<Json<BookWithOwner>> {
    let db = state.clone();
    let bid = book_id.to_string();
    let row = tokio::task::spawn_blocking(move || db.db.get_book(&bid))
        .await??
        .ok_or_else(|| ApiError::NotFound("book not found".into()))?;
    Ok(Json(row.into_model()))
}

/// GET /api/my-books — the caller's listings, available or not.
pub async fn my_books(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<BookWithOwner>>> {
    let claims = extract_claims(&headers, &state.jwt_secret)?;

    let db = state.clone();
    let uid = claims.sub.to_string();
    let rows = tokio::task::spawn_blocking(move || db.db.list_books_by_owner(&uid)).await??;
    Ok(Json(rows.into_iter().map(|r| r.into_model()).collect()))
}

/// POST /api/books — multipart form with the listing fields and an
/// optional cover image.
pub async fn create_book(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let claims = extract_claims(&headers, &state.jwt_secret)?;
    let form = read_book_form(multipart).await?;

    let title = require_field(form.title, "title")?;
    let author = require_field(form.author, "author")?;
    let genre = require_field(form.genre, "genre")?;
    let condition = form
        .condition
        .ok_or_else(|| ApiError::field("condition", "condition is required"))?;

    let cover_image_url = match form.cover {
        Some(cover) => Some(save_cover(&state, &cover).await?),
        None => None,
    };

    let new_book = NewBook {
        title,
        author,
        genre,
        condition,
        description: form.description,
        cover_image_url,
    };

    let book_id = Uuid::new_v4();
    let db = state.clone();
    let bid = book_id.to_string();
    let oid = claims.sub.to_string();
    let row =
        tokio::task::spawn_blocking(move || db.db.create_book(&bid, &oid, &new_book)).await??;

    Ok((StatusCode::CREATED, Json(row.into_model())))
}

/// PUT /api/books/{id} — partial multipart update; a new cover replaces
/// the old URL. Owner only.
pub async fn update_book(
    State(state): State<AppState>,
    Path(book_id): Path<Uuid>,
    headers: HeaderMap,
    multipart: Multipart,
) -> ApiResult<Json<Book>> {
    let claims = extract_claims(&headers, &state.jwt_secret)?;
    let form = read_book_form(multipart).await?;

    owned_book(&state, book_id, &claims.sub, "update").await?;

    let cover_image_url = match form.cover {
        Some(cover) => Some(save_cover(&state, &cover).await?),
        None => None,
    };

    let changes = BookChanges {
        title: optional_field(form.title, "title")?,
        author: optional_field(form.author, "author")?,
        genre: optional_field(form.genre, "genre")?,
        condition: form.condition,
        description: form.description,
        cover_image_url,
    };

    let db = state.clone();
    let bid = book_id.to_string();
    let row = tokio::task::spawn_blocking(move || db.db.update_book(&bid, &changes))
        .await??
        .ok_or_else(|| ApiError::NotFound("book not found".into()))?;

    Ok(Json(row.into_model()))
}

/// DELETE /api/books/{id} — owner only; takes the book's open exchange
/// requests with it.
pub async fn delete_book(
    State(state): State<AppState>,
    Path(book_id): Path<Uuid>,
    headers: HeaderMap,
) -> ApiResult<StatusCode> {
    let claims = extract_claims(&headers, &state.jwt_secret)?;

    owned_book(&state, book_id, &claims.sub, "delete").await?;

    let db = state.clone();
    let bid = book_id.to_string();
    tokio::task::spawn_blocking(move || db.db.delete_book(&bid)).await??;

    Ok(StatusCode::NO_CONTENT)
}

// ── Multipart form ──────────────────────────────────────────────────────

#[derive(Default)]
struct BookForm {
    title: Option<String>,
    author: Option<String>,
    genre: Option<String>,
    condition: Option<BookCondition>,
    description: Option<String>,
    cover: Option<CoverUpload>,
}

struct CoverUpload {
    extension: &'static str,
    data: axum::body::Bytes,
}

async fn read_book_form(mut multipart: Multipart) -> Result<BookForm, ApiError> {
    let mut form = BookForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == "cover" {
            let content_type = field.content_type().unwrap_or_default().to_string();
            if !content_type.starts_with("image/") {
                return Err(ApiError::field("cover", "only image files are allowed"));
            }
            let extension = match content_type.as_str() {
                "image/png" => "png",
                "image/gif" => "gif",
                "image/webp" => "webp",
                _ => "jpg",
            };
            let data = field.bytes().await.map_err(|e| {
                ApiError::field("cover", format!("failed to read cover upload: {e}"))
            })?;
            if data.len() > MAX_COVER_SIZE {
                return Err(ApiError::field("cover", "cover image exceeds the 10 MiB limit"));
            }
            form.cover = Some(CoverUpload { extension, data });
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| ApiError::validation(format!("field {name} must be text: {e}")))?;

        match name.as_str() {
            "title" => form.title = Some(value),
            "author" => form.author = Some(value),
            "genre" => form.genre = Some(value),
            "description" => form.description = Some(value),
            "condition" => {
                let condition = value.parse::<BookCondition>().map_err(|_| {
                    ApiError::field("condition", "condition must be one of like-new, good, fair")
                })?;
                form.condition = Some(condition);
            }
            // Unknown parts are ignored
            _ => {}
        }
    }

    Ok(form)
}

fn require_field(value: Option<String>, name: &'static str) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiError::field(name, format!("{name} is required"))),
    }
}

/// Present-but-blank fields are rejected; absent fields mean "unchanged".
fn optional_field(
    value: Option<String>,
    name: &'static str,
) -> Result<Option<String>, ApiError> {
    match value {
        Some(v) if v.trim().is_empty() => {
            Err(ApiError::field(name, format!("{name} must not be blank")))
        }
        other => Ok(other),
    }
}

// ── Helpers ─────────────────────────────────────────────────────────────

/// 404 for an unknown book, 403 when the caller does not own it.
async fn owned_book(
    state: &AppState,
    book_id: Uuid,
    caller: &Uuid,
    action: &str,
) -> Result<(), ApiError> {
    let db = state.clone();
    let bid = book_id.to_string();
    let existing = tokio::task::spawn_blocking(move || db.db.get_book(&bid))
        .await??
        .ok_or_else(|| ApiError::NotFound("book not found".into()))?;

    if existing.book.owner_id != caller.to_string() {
        return Err(ApiError::Forbidden(format!(
            "not authorized to {action} this book"
        )));
    }
    Ok(())
}

/// Write the cover to the upload dir under a fresh name and return the
/// URL path it is served from.
async fn save_cover(state: &AppStateInner, cover: &CoverUpload) -> Result<String, ApiError> {
    tokio::fs::create_dir_all(&state.uploads_dir)
        .await
        .map_err(|e| anyhow!("failed to create uploads directory: {}", e))?;

    let filename = format!("cover-{}.{}", Uuid::new_v4(), cover.extension);
    let path = state.uploads_dir.join(&filename);
    tokio::fs::write(&path, &cover.data)
        .await
        .map_err(|e| anyhow!("failed to write {}: {}", path.display(), e))?;

    Ok(format!("/uploads/{filename}"))
}
