pub mod auth;
pub mod books;
pub mod error;
pub mod exchanges;

pub use auth::{AppState, AppStateInner};
pub use error::{ApiError, ApiResult};
