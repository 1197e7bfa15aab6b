//! JSON bodies of the HTTP API.
//!
//! Shared by the server (which serializes them) and the client (which
//! deserializes them), so both sides agree on field names.

use serde::{Deserialize, Serialize};

use dynaform_core::store::SubmissionRecord;
use dynaform_core::validate::FieldErrors;

/// `400` with `{ success: false, error }`, `404`, and `500` bodies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

/// `400` body of `POST /api/submissions` when validation fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectedBody {
    pub success: bool,
    pub errors: FieldErrors,
}

/// `201` body of `POST /api/submissions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedBody {
    pub success: bool,
    pub id: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListBody {
    pub success: bool,
    pub data: Vec<SubmissionRecord>,
    pub pagination: PaginationInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub total_pages: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordBody {
    pub success: bool,
    pub data: SubmissionRecord,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthBody {
    /// Always `"ok"` when the server is running.
    pub status: String,
    pub timestamp: String,
    pub environment: String,
    /// Stored submissions; absent when the store could not be read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submissions: Option<usize>,
}
