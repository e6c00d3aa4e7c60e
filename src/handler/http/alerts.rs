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

use crate::handler::http::extractors::AppJson;
use crate::meta::alert::AlertType;
use crate::meta::alert::IngressEvent;
use crate::service::ingress::{self, CreateOutcome};
use crate::state::AppState;

/// Ingress endpoint (§6: `POST /`). Dispatches create vs close based on
/// `alertType`. A new create gets back the persisted alert (201); a
/// duplicate create or a close echoes the original event (200).
#[tracing::instrument(skip_all, fields(alert_id = %event.alert_id))]
pub async fn ingest(State(state): State<AppState>, AppJson(event): AppJson<IngressEvent>) -> Response {
    let result = match event.alert_type {
        AlertType::Create => ingress::handle_create(&state, event).await.map(|outcome| match outcome {
            CreateOutcome::Created(alert) => (StatusCode::CREATED, Json(alert)).into_response(),
            CreateOutcome::Deduplicated(event) => (StatusCode::OK, Json(event)).into_response(),
        }),
        AlertType::Close => ingress::handle_close(&state, event).await.map(|maybe_event| {
            (StatusCode::OK, Json(maybe_event)).into_response()
        }),
    };

    match result {
        Ok(response) => response,
        Err(err) => {
            tracing::error!(error = %err, "ingress pipeline failed");
            err.into_response()
        }
    }
}
