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

use serde::{Deserialize, Serialize};

use crate::rules_engine::RuleGroup;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CorrelationMode {
    TagWindow,
    Similarity,
}

fn default_threshold() -> f64 {
    0.8
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SimilaritySpec {
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

/// Correlation rule, §3 / §4.3. `group_window` is in seconds; similarity
/// rules sort after all tag-window rules (§9 DESIGN NOTE: no window, so
/// treated as +infinity).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CorrelationRule {
    pub group_name: String,
    #[serde(default)]
    pub group_tags: Vec<String>,
    #[serde(default)]
    pub group_window: i64,
    #[serde(default)]
    pub scope_tags: Vec<String>,
    pub correlation_mode: CorrelationMode,
    #[serde(default)]
    pub similarity: SimilaritySpec,
}

impl CorrelationRule {
    /// Sort key for rule evaluation order (§4.3: ascending `group_window`,
    /// similarity rules evaluated last).
    pub fn sort_key(&self) -> i64 {
        match self.correlation_mode {
            CorrelationMode::TagWindow => self.group_window,
            CorrelationMode::Similarity => i64::MAX,
        }
    }
}

/// Alert-rule: condition -> assign a constant to a fixed alert field (§4.2).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AlertRule {
    pub rule_name: String,
    pub condition: RuleGroup,
    pub set_field: String,
    pub set_value: String,
}

/// Tag-rule: condition -> set a tag directly, or extract it via regex
/// capture group 1 from an existing field (§4.2).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TagRule {
    pub rule_name: String,
    pub condition: RuleGroup,
    pub tag_name: String,
    #[serde(default)]
    pub tag_value: String,
    #[serde(default)]
    pub field_name: String,
    #[serde(default)]
    pub field_extraction: String,
}

/// Notify-rule: condition -> select a paging destination template (§4.6).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NotifyRule {
    pub rule_name: String,
    pub condition: RuleGroup,
    pub pagerduty_service: String,
    pub pagerduty_escalation_policy: String,
}
