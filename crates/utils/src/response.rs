use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use ts_rs::TS;

/// Closed set of error codes exposed to API callers. Internal failure detail
/// never travels with these; it stays in the server log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, EnumString, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorCode {
    MalformedBody,
    TitleRequired,
    InvalidStatus,
    InvalidDeadline,
    InvalidAssignee,
    IdRequired,
    NotFound,
    Forbidden,
    Internal,
}

impl ErrorCode {
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::MalformedBody => "Request body is not a valid project payload",
            Self::TitleRequired => "Title is required",
            Self::InvalidStatus => "Status must be one of planned, in-progress, completed",
            Self::InvalidDeadline => "Deadline must be a date (YYYY-MM-DD) or an RFC 3339 timestamp",
            Self::InvalidAssignee => "Assignees must be ids of existing users",
            Self::IdRequired => "Project ID is required",
            Self::NotFound => "Project not found",
            Self::Forbidden => "You must be logged in to add or edit projects",
            Self::Internal => "Something went wrong, please try again later",
        }
    }
}

/// Body of every non-2xx API response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct ErrorResponse {
    pub error: ErrorCode,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            error,
            message: message.into(),
        }
    }
}

impl From<ErrorCode> for ErrorResponse {
    fn from(code: ErrorCode) -> Self {
        Self::new(code, code.default_message())
    }
}
