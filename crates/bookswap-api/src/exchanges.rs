use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use uuid::Uuid;

use bookswap_db::queries::{CreateRequestOutcome, TransitionOutcome};
use bookswap_types::api::{CreateExchangeRequest, UpdateRequestStatus};
use bookswap_types::models::{ExchangeRequest, ExchangeRequestWithDetails, RequestStatus};

use crate::auth::{AppState, extract_claims};
use crate::error::{ApiError, ApiResult};

/// POST /api/exchange-requests — propose a swap for someone else's
/// available book. The new request is always pending.
pub async fn create_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateExchangeRequest>,
) -> ApiResult<impl IntoResponse> {
    let claims = extract_claims(&headers, &state.jwt_secret)?;

    let request_id = Uuid::new_v4();
    let db = state.clone();
    let rid = request_id.to_string();
    let uid = claims.sub.to_string();
    let bid = req.book_id.to_string();
    let outcome = tokio::task::spawn_blocking(move || {
        db.db
            .create_exchange_request(&rid, &uid, &bid, req.message.as_deref())
    })
    .await??;

    match outcome {
        CreateRequestOutcome::Created(row) => Ok((StatusCode::CREATED, Json(row.into_model()))),
        CreateRequestOutcome::BookNotFound => Err(ApiError::NotFound("book not found".into())),
        CreateRequestOutcome::BookUnavailable => Err(ApiError::field(
            "book_id",
            "book is not available for exchange",
        )),
        CreateRequestOutcome::OwnBook => Err(ApiError::field(
            "book_id",
            "you cannot request your own book",
        )),
    }
}

/// GET /api/my-requests — requests the caller has sent.
pub async fn my_requests(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<ExchangeRequestWithDetails>>> {
    let claims = extract_claims(&headers, &state.jwt_secret)?;

    let db = state.clone();
    let uid = claims.sub.to_string();
    let rows = tokio::task::spawn_blocking(move || db.db.list_requests_by_requester(&uid)).await??;
    Ok(Json(rows.into_iter().map(|r| r.into_model()).collect()))
}

/// GET /api/incoming-requests — requests against the caller's books.
pub async fn incoming_requests(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<ExchangeRequestWithDetails>>> {
    let claims = extract_claims(&headers, &state.jwt_secret)?;

    let db = state.clone();
    let uid = claims.sub.to_string();
    let rows = tokio::task::spawn_blocking(move || db.db.list_requests_for_owner(&uid)).await??;
    Ok(Json(rows.into_iter().map(|r| r.into_model()).collect()))
}

/// PUT /api/exchange-requests/{id}/status — the book owner accepts,
/// rejects, or completes a request. Accepting takes the book off the
/// available list.
pub async fn update_status(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
    headers: HeaderMap,
    Json(req): Json<UpdateRequestStatus>,
) -> ApiResult<Json<ExchangeRequest>> {
    let claims = extract_claims(&headers, &state.jwt_secret)?;

    // `pending` is a valid status but never a valid destination
    let next = req
        .status
        .parse::<RequestStatus>()
        .ok()
        .filter(|s| *s != RequestStatus::Pending)
        .ok_or_else(|| {
            ApiError::field("status", "status must be one of accepted, rejected, completed")
        })?;

    let db = state.clone();
    let rid = request_id.to_string();
    let uid = claims.sub.to_string();
    let outcome =
        tokio::task::spawn_blocking(move || db.db.transition_request(&rid, &uid, next)).await??;

    match outcome {
        TransitionOutcome::Updated(row) => Ok(Json(row.into_model())),
        TransitionOutcome::NotFound => {
            Err(ApiError::NotFound("exchange request not found".into()))
        }
        TransitionOutcome::NotOwner => Err(ApiError::Forbidden(
            "only the book owner may update this request".into(),
        )),
        TransitionOutcome::Illegal { from } => Err(ApiError::Conflict(format!(
            "cannot move a {from} request to {next}"
        ))),
    }
}
