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

//! Router-level tests: exercise the axum `Router` end to end via
//! `tower::ServiceExt::oneshot` rather than calling the service layer
//! directly, so status codes, JSON extraction, and routing are covered.

use std::sync::Arc;

use alertcorr::handler::http::router::build_router;
use alertcorr::infra::memory_store::MemoryStore;
use alertcorr::infra::pager::RecordingPagerBridge;
use alertcorr::state::AppState;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

fn router() -> axum::Router {
    let store = Arc::new(MemoryStore::new());
    let pager = Arc::new(RecordingPagerBridge::new());
    build_router(AppState::new(store, pager))
}

fn post_body(body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// S1 / invariant 1: repeated CREATE with the same alertId dedups, driven
/// through the actual HTTP router.
#[tokio::test]
async fn create_then_duplicate_via_router() {
    let app = router();
    let event = json!({
        "alertId": "router-a1",
        "alertType": "CREATE",
        "entity": "host-1",
        "alertTime": "2026-01-01 00:00:00",
        "alertSource": "nagios",
        "serviceName": "web",
        "alertSummary": "CPU high",
        "severity": "critical",
    });

    let first = app.clone().oneshot(post_body(event.clone())).await.unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app.oneshot(post_body(event)).await.unwrap();
    assert_eq!(second.status(), StatusCode::OK);
}

/// A syntactically valid JSON body missing a required field must reject
/// with 400, not axum's default 422.
#[tokio::test]
async fn missing_required_field_is_400() {
    let app = router();
    let event = json!({
        "alertId": "router-a2",
        "alertType": "CREATE",
        "entity": "host-1",
        "alertTime": "2026-01-01 00:00:00",
        "alertSource": "nagios",
        "serviceName": "web",
        // "alertSummary" and "severity" deliberately omitted
    });

    let response = app.oneshot(post_body(event)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// GET / isn't a registered route+method combination.
#[tokio::test]
async fn get_root_is_405() {
    let app = router();
    let request = Request::builder().method(Method::GET).uri("/").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
