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

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A change record: tracks deploys/config/infra changes alongside alerts
/// for correlation and audit purposes. Upserted keyed on `change_id`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeStatus {
    Scheduled,
    InProgress,
    Completed,
    Failed,
    RolledBack,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    Deployment,
    Config,
    Infrastructure,
    Other,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Change {
    pub change_id: String,
    pub source: String,
    pub change_type: ChangeType,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub status: ChangeStatus,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub implemented_by: Option<String>,
    #[serde(default)]
    pub affected_entities: Vec<String>,
    #[serde(default)]
    pub raw_payload: Option<serde_json::Value>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Change {
    pub fn validate(&self) -> Result<(), String> {
        if self.change_id.trim().is_empty() {
            return Err("change_id is required".into());
        }
        if self.source.trim().is_empty() {
            return Err("source is required".into());
        }
        Ok(())
    }
}
