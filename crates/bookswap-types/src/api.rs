use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::User;

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub email: String,
    pub token: String,
    pub user: User,
}

// -- Exchange requests --

/// The requester never picks the initial status; new requests are always
/// `pending`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateExchangeRequest {
    pub book_id: Uuid,
    #[serde(default)]
    pub message: Option<String>,
}

/// Status arrives as a raw string so the handler can reject unknown values
/// with a field-level 400 instead of a deserialization error.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateRequestStatus {
    pub status: String,
}
