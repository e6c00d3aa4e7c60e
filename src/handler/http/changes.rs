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

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde_json::json;

use crate::meta::change::Change;
use crate::state::AppState;

/// Change-record upsert: keyed on `change_id`, validated, inserted or
/// replaced.
pub async fn upsert_change(State(state): State<AppState>, Json(mut change): Json<Change>) -> Response {
    if let Err(msg) = change.validate() {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response();
    }

    let now = Utc::now();
    if let Ok(Some(existing)) = state.store.get_change(&change.change_id).await {
        change.created_at = existing.created_at;
    } else {
        change.created_at = now;
    }
    change.updated_at = now;

    match state.store.upsert_change(change).await {
        Ok(saved) => (StatusCode::OK, Json(saved)).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "change upsert failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": err.to_string() }))).into_response()
        }
    }
}
