//! Response body shared by every outcome.
//!
//! All business outcomes travel as HTTP 200 with the distinction carried in
//! `code` and `msg`. Only a rejected method uses a transport-level status.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::executor::TriggerOutcome;

/// Business code for a successful run.
pub const OK: u16 = 201;
/// Business code for every failure.
pub const NOT_OK: u16 = 405;

pub const OK_MSG: &str = "execute successfully";
pub const NOT_OK_MSG: &str = "execute failed";
pub const TIMEOUT_MSG: &str = "the shell file executes timeout";
pub const ILLEGAL_METHOD_MSG: &str = "illegal request method";

/// `{"code": .., "data": .., "msg": ..}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub code: u16,
    pub data: Option<String>,
    pub msg: String,
}

impl ApiResponse {
    pub fn success(output: String) -> Self {
        Self {
            code: OK,
            data: Some(output),
            msg: OK_MSG.to_string(),
        }
    }

    pub fn failure(detail: impl std::fmt::Display) -> Self {
        Self {
            code: NOT_OK,
            data: None,
            msg: format!("{}:{}", NOT_OK_MSG, detail),
        }
    }

    pub fn timeout() -> Self {
        Self {
            code: NOT_OK,
            data: None,
            msg: TIMEOUT_MSG.to_string(),
        }
    }

    pub fn illegal_method() -> Self {
        Self {
            code: StatusCode::METHOD_NOT_ALLOWED.as_u16(),
            data: None,
            msg: ILLEGAL_METHOD_MSG.to_string(),
        }
    }
}

impl From<TriggerOutcome> for ApiResponse {
    fn from(outcome: TriggerOutcome) -> Self {
        match outcome {
            TriggerOutcome::Rejected(e) => ApiResponse::failure(e),
            TriggerOutcome::Completed(o) if o.succeeded => ApiResponse::success(o.combined_output),
            TriggerOutcome::Completed(o) => {
                ApiResponse::failure(o.error.unwrap_or_else(|| "unknown error".to_string()))
            }
            TriggerOutcome::TimedOut => ApiResponse::timeout(),
        }
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Transport-level rejection for anything but GET.
pub fn method_not_allowed() -> Response {
    (StatusCode::METHOD_NOT_ALLOWED, Json(ApiResponse::illegal_method())).into_response()
}
