// Copyright 2026
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Store-boundary errors (§7: "store failure propagates as 500; no
/// partial rollback is attempted").
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] sqlx::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("not found")]
    NotFound,
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Pager webhook boundary errors (§7: "notify failure is logged; alert
/// persists with empty pager fields").
#[derive(Debug, thiserror::Error)]
pub enum PagerError {
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("pager endpoint returned status {0}")]
    BadStatus(StatusCode),
}

pub type PagerResult<T> = std::result::Result<T, PagerError>;

/// Ingress-boundary errors mapped directly to the HTTP taxonomy in §7.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("malformed request body: {0}")]
    MalformedBody(String),
    #[error("invalid timestamp format: {0}")]
    InvalidTimestamp(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        let status = match &self {
            IngestError::MalformedBody(_) | IngestError::InvalidTimestamp(_) => StatusCode::BAD_REQUEST,
            IngestError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
