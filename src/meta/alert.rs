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

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Fields excluded from automatic tag capture during enrichment.
pub const TAG_EXCLUDE: &[&str] = &[
    "entity",
    "alertTime",
    "alertNotes",
    "severity",
    "alertId",
    "ipAddress",
    "alertType",
    "serviceName",
    "alertSummary",
];

/// Top-level fields considered for case-insensitive tag lookup before
/// falling back to `additional_details`.
pub const TOP_LEVEL_LOOKUP_FIELDS: &[&str] = &[
    "entity",
    "alertsource",
    "servicename",
    "alertsummary",
    "severity",
    "alertid",
    "alertpriority",
    "alertstatus",
    "ipaddress",
];

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertStatus {
    Open,
    Closed,
}

impl Default for AlertStatus {
    fn default() -> Self {
        AlertStatus::Open
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertAcked {
    Yes,
    No,
}

impl Default for AlertAcked {
    fn default() -> Self {
        AlertAcked::No
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertType {
    Create,
    Close,
}

/// Persistent alert entity, §3 of the engine's data model. Both standalone
/// alerts and parent incidents use this same shape: a parent is just an
/// alert with `parent = true`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Alert {
    pub id: Uuid,

    pub alert_id: String,
    pub entity: String,
    pub alert_source: String,
    pub service_name: String,
    pub alert_summary: String,
    pub severity: String,
    pub ip_address: Option<String>,
    pub alert_notes: Option<String>,

    pub alert_first_time: DateTime<Utc>,
    pub alert_last_time: DateTime<Utc>,
    pub alert_clear_time: Option<DateTime<Utc>>,

    pub alert_status: AlertStatus,
    pub alert_acked: AlertAcked,
    pub alert_count: u64,
    pub alert_priority: String,

    pub additional_details: BTreeMap<String, Value>,

    pub parent: bool,
    pub grouped: bool,
    pub group_incident_id: Option<Uuid>,
    pub group_alerts: Vec<Uuid>,
    pub group_identifier: Option<String>,

    pub pager_duty_incident_id: Option<String>,
    pub pager_duty_incident_number: Option<i64>,
    pub pager_duty_urgency: Option<String>,
    pub pager_duty_html_url: Option<String>,
    pub pager_duty_priority: Option<String>,
    pub pager_duty_service: Option<String>,
    pub pager_duty_escalation_policy: Option<String>,
    pub alert_destination: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Alert {
    /// True if this alert is attached as a child and has a parent incident
    /// id to mirror notifications against (§4.6 classification).
    pub fn is_notify_child(&self) -> bool {
        self.grouped && !self.parent && self.group_incident_id.is_some()
    }

    /// Case-insensitive lookup across top-level fields then
    /// `additional_details`, per §4.3.1.
    pub fn lookup(&self, name: &str) -> Option<String> {
        let key = name.to_ascii_lowercase();
        if TOP_LEVEL_LOOKUP_FIELDS.contains(&key.as_str()) {
            let value = match key.as_str() {
                "entity" => Some(self.entity.clone()),
                "alertsource" => Some(self.alert_source.clone()),
                "servicename" => Some(self.service_name.clone()),
                "alertsummary" => Some(self.alert_summary.clone()),
                "severity" => Some(self.severity.clone()),
                "alertid" => Some(self.alert_id.clone()),
                "alertpriority" => Some(self.alert_priority.clone()),
                "alertstatus" => Some(match self.alert_status {
                    AlertStatus::Open => "OPEN".to_string(),
                    AlertStatus::Closed => "CLOSED".to_string(),
                }),
                "ipaddress" => self.ip_address.clone(),
                _ => None,
            };
            if value.is_some() {
                return value;
            }
        }
        for (k, v) in &self.additional_details {
            if k.to_ascii_lowercase() == key {
                return Some(value_to_string(v));
            }
        }
        None
    }

    /// Builds the flat fact map the rule evaluator consumes (§4, DESIGN NOTE
    /// on dynamic field access — an explicit mapping rather than reflection).
    pub fn facts(&self) -> BTreeMap<String, Value> {
        let mut facts = BTreeMap::new();
        facts.insert("entity".into(), Value::String(self.entity.clone()));
        facts.insert("alertSource".into(), Value::String(self.alert_source.clone()));
        facts.insert("serviceName".into(), Value::String(self.service_name.clone()));
        facts.insert("alertSummary".into(), Value::String(self.alert_summary.clone()));
        facts.insert("severity".into(), Value::String(self.severity.clone()));
        facts.insert("alertId".into(), Value::String(self.alert_id.clone()));
        facts.insert("alertPriority".into(), Value::String(self.alert_priority.clone()));
        facts.insert(
            "alertStatus".into(),
            Value::String(
                match self.alert_status {
                    AlertStatus::Open => "OPEN",
                    AlertStatus::Closed => "CLOSED",
                }
                .to_string(),
            ),
        );
        if let Some(ip) = &self.ip_address {
            facts.insert("ipAddress".into(), Value::String(ip.clone()));
        }
        for (k, v) in &self.additional_details {
            facts.insert(k.clone(), v.clone());
        }
        facts
    }

    /// Deep-copies an alert into a fresh parent shell per §4.4: new id,
    /// `parent = true`, `grouped = false`, `additional_details` cloned so
    /// later tag mutation on the child can never leak into the parent.
    pub fn spawn_parent(&self, synthetic_alert_id: String, group_identifier: String, now: DateTime<Utc>) -> Alert {
        Alert {
            id: Uuid::new_v4(),
            alert_id: synthetic_alert_id,
            entity: self.entity.clone(),
            alert_source: self.alert_source.clone(),
            service_name: self.service_name.clone(),
            alert_summary: self.alert_summary.clone(),
            severity: self.severity.clone(),
            ip_address: self.ip_address.clone(),
            alert_notes: None,
            alert_first_time: self.alert_first_time,
            alert_last_time: self.alert_last_time,
            alert_clear_time: None,
            alert_status: AlertStatus::Open,
            alert_acked: AlertAcked::No,
            alert_count: 1,
            alert_priority: self.alert_priority.clone(),
            additional_details: self.additional_details.clone(),
            parent: true,
            grouped: false,
            group_incident_id: None,
            group_alerts: vec![self.id],
            group_identifier: Some(group_identifier),
            pager_duty_incident_id: None,
            pager_duty_incident_number: None,
            pager_duty_urgency: None,
            pager_duty_html_url: None,
            pager_duty_priority: None,
            pager_duty_service: None,
            pager_duty_escalation_policy: None,
            alert_destination: None,
            created_at: now,
            updated_at: now,
        }
    }
}

pub fn value_to_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Inbound ingress payload, §4.1 and §6. Loosely typed: any field not in
/// the fixed set becomes a tag, so unrecognized keys are captured via
/// `#[serde(flatten)]`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngressEvent {
    pub alert_id: String,
    pub alert_type: AlertType,
    pub entity: String,
    pub alert_time: String,
    pub alert_source: String,
    pub service_name: String,
    pub alert_summary: String,
    pub severity: String,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub alert_notes: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}
