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

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::meta::alert::Alert;

#[derive(Clone, Debug, Serialize)]
struct CreatePayload<'a> {
    alert: &'a Alert,
    pagerduty_service: &'a str,
    pagerduty_escalation_policy: &'a str,
}

#[derive(Clone, Debug, Serialize)]
struct NotePayload<'a> {
    incident_id: &'a str,
    content: &'a str,
}

#[derive(Clone, Debug, Serialize)]
struct ClosePayload<'a> {
    incident_id: &'a str,
}

/// Fields extracted from the pager's create-webhook response (§4.6, §6).
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CreatedIncident {
    pub incident_number: Option<i64>,
    pub id: Option<String>,
    pub urgency: Option<String>,
    pub html_url: Option<String>,
    #[serde(default)]
    pub priority: Option<SummaryField>,
    #[serde(default)]
    pub service: Option<SummaryField>,
    #[serde(default)]
    pub escalation_policy: Option<SummaryField>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SummaryField {
    pub summary: Option<String>,
}

/// Webhook client interface to the external pager: create, note, close.
#[async_trait]
pub trait PagerBridge: Send + Sync {
    async fn create_incident(
        &self,
        alert: &Alert,
        pagerduty_service: &str,
        pagerduty_escalation_policy: &str,
    ) -> Option<CreatedIncident>;

    async fn send_note(&self, incident_id: &str, content: &str);

    async fn close_incident(&self, incident_id: &str);
}

pub struct HttpPagerBridge {
    client: reqwest::Client,
    create_url: String,
    note_url: String,
    close_url: String,
}

impl HttpPagerBridge {
    pub fn new(create_url: String, note_url: String, close_url: String, timeout: Duration) -> HttpPagerBridge {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("reqwest client builds");
        HttpPagerBridge {
            client,
            create_url,
            note_url,
            close_url,
        }
    }
}

#[async_trait]
impl PagerBridge for HttpPagerBridge {
    async fn create_incident(
        &self,
        alert: &Alert,
        pagerduty_service: &str,
        pagerduty_escalation_policy: &str,
    ) -> Option<CreatedIncident> {
        let payload = CreatePayload {
            alert,
            pagerduty_service,
            pagerduty_escalation_policy,
        };
        let resp = match self.client.post(&self.create_url).json(&payload).send().await {
            Ok(resp) => resp,
            Err(err) => {
                tracing::error!(error = %err, "pager create request failed");
                return None;
            }
        };
        if !resp.status().is_success() {
            tracing::error!(status = %resp.status(), "pager create returned non-2xx");
            return None;
        }
        match resp.json::<CreatedIncident>().await {
            Ok(created) => Some(created),
            Err(err) => {
                tracing::error!(error = %err, "pager create response parse failed");
                None
            }
        }
    }

    async fn send_note(&self, incident_id: &str, content: &str) {
        if incident_id.is_empty() {
            return;
        }
        let payload = NotePayload { incident_id, content };
        match self.client.post(&self.note_url).json(&payload).send().await {
            Ok(resp) if !resp.status().is_success() => {
                tracing::error!(status = %resp.status(), "pager note returned non-2xx");
            }
            Err(err) => tracing::error!(error = %err, "pager note request failed"),
            _ => {}
        }
    }

    async fn close_incident(&self, incident_id: &str) {
        if incident_id.is_empty() {
            return;
        }
        let payload = ClosePayload { incident_id };
        match self.client.post(&self.close_url).json(&payload).send().await {
            Ok(resp) if !resp.status().is_success() => {
                tracing::error!(status = %resp.status(), "pager close returned non-2xx");
            }
            Err(err) => tracing::error!(error = %err, "pager close request failed"),
            _ => {}
        }
    }
}

/// In-process recording fake used by the pipeline's integration tests
/// (§8 scenarios S4, S5) — no network available under test.
#[derive(Default)]
pub struct RecordingPagerBridge {
    pub creates: std::sync::Mutex<Vec<(String, String)>>,
    pub notes: std::sync::Mutex<Vec<(String, String)>>,
    pub closes: std::sync::Mutex<Vec<String>>,
    pub next_incident: std::sync::Mutex<Option<CreatedIncident>>,
}

impl RecordingPagerBridge {
    pub fn new() -> RecordingPagerBridge {
        RecordingPagerBridge::default()
    }

    pub fn queue_incident(&self, incident: CreatedIncident) {
        *self.next_incident.lock().unwrap() = Some(incident);
    }
}

#[async_trait]
impl PagerBridge for RecordingPagerBridge {
    async fn create_incident(
        &self,
        alert: &Alert,
        pagerduty_service: &str,
        pagerduty_escalation_policy: &str,
    ) -> Option<CreatedIncident> {
        self.creates.lock().unwrap().push((
            alert.alert_id.clone(),
            format!("{pagerduty_service}/{pagerduty_escalation_policy}"),
        ));
        let queued = self.next_incident.lock().unwrap().take();
        Some(queued.unwrap_or_else(|| CreatedIncident {
            id: Some(format!("inc-{}", alert.alert_id)),
            ..Default::default()
        }))
    }

    async fn send_note(&self, incident_id: &str, content: &str) {
        if incident_id.is_empty() {
            return;
        }
        self.notes
            .lock()
            .unwrap()
            .push((incident_id.to_string(), content.to_string()));
    }

    async fn close_incident(&self, incident_id: &str) {
        if incident_id.is_empty() {
            return;
        }
        self.closes.lock().unwrap().push(incident_id.to_string());
    }
}
