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

use regex::Regex;
use serde_json::Value;

use crate::meta::alert::Alert;
use crate::meta::rules::{AlertRule, TagRule};
use crate::rules_engine;

/// Runs alert-rules then tag-rules against `alert`, in that order (§4.2).
/// All rules are evaluated; a rule whose condition is false is skipped.
pub fn enrich(alert: &mut Alert, alert_rules: &[AlertRule], tag_rules: &[TagRule]) {
    for rule in alert_rules {
        if rules_engine::evaluate(&rule.condition, &alert.facts()) {
            apply_alert_rule(alert, rule);
        }
    }
    for rule in tag_rules {
        if rules_engine::evaluate(&rule.condition, &alert.facts()) {
            apply_tag_rule(alert, rule);
        }
    }
}

/// Assigns a constant to a fixed alert field. Unknown or empty fields are
/// skipped silently (§4.2).
fn apply_alert_rule(alert: &mut Alert, rule: &AlertRule) {
    if rule.set_field.is_empty() {
        return;
    }
    match rule.set_field.as_str() {
        "alertSummary" => alert.alert_summary = rule.set_value.clone(),
        "severity" => alert.severity = rule.set_value.clone(),
        "alertPriority" => alert.alert_priority = rule.set_value.clone(),
        "alertNotes" => alert.alert_notes = Some(rule.set_value.clone()),
        "serviceName" => alert.service_name = rule.set_value.clone(),
        "entity" => alert.entity = rule.set_value.clone(),
        "alertSource" => alert.alert_source = rule.set_value.clone(),
        "ipAddress" => alert.ip_address = Some(rule.set_value.clone()),
        _ => tracing::debug!(field = %rule.set_field, "alert-rule targets unknown field, skipped"),
    }
}

/// Sets a tag directly, or extracts it via regex capture group 1 from an
/// existing field (§4.2). Invalid regex aborts only this rule.
fn apply_tag_rule(alert: &mut Alert, rule: &TagRule) {
    if !rule.tag_value.is_empty() {
        alert
            .additional_details
            .insert(rule.tag_name.clone(), Value::String(rule.tag_value.clone()));
        return;
    }
    if rule.field_extraction.is_empty() {
        return;
    }
    let Ok(re) = Regex::new(&rule.field_extraction) else {
        tracing::warn!(rule = %rule.rule_name, "invalid tag-rule regex, skipping");
        return;
    };
    let Some(field_value) = alert.lookup(&rule.field_name) else {
        return;
    };
    if let Some(captures) = re.captures(&field_value) {
        if let Some(group) = captures.get(1) {
            alert
                .additional_details
                .insert(rule.tag_name.clone(), Value::String(group.as_str().to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::alert::{AlertAcked, AlertStatus};
    use crate::rules_engine::{Combinator, Operator, Rule, RuleGroup, RuleNode};
    use chrono::Utc;
    use std::collections::BTreeMap;
    use uuid::Uuid;

    fn base_alert() -> Alert {
        let now = Utc::now();
        Alert {
            id: Uuid::new_v4(),
            alert_id: "a1".into(),
            entity: "host-1".into(),
            alert_source: "nagios".into(),
            service_name: "web".into(),
            alert_summary: "CPU high".into(),
            severity: "critical".into(),
            ip_address: Some("10.0.0.5".into()),
            alert_notes: None,
            alert_first_time: now,
            alert_last_time: now,
            alert_clear_time: None,
            alert_status: AlertStatus::Open,
            alert_acked: AlertAcked::No,
            alert_count: 1,
            alert_priority: "NORMAL".into(),
            additional_details: BTreeMap::new(),
            parent: false,
            grouped: false,
            group_incident_id: None,
            group_alerts: vec![],
            group_identifier: None,
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

    fn always_true() -> crate::rules_engine::RuleGroup {
        RuleGroup { condition: Combinator::And, rules: vec![] }
    }

    #[test]
    fn alert_rule_sets_known_field() {
        let mut alert = base_alert();
        let rule = AlertRule {
            rule_name: "bump-priority".into(),
            condition: always_true(),
            set_field: "alertPriority".into(),
            set_value: "P1".into(),
        };
        enrich(&mut alert, &[rule], &[]);
        assert_eq!(alert.alert_priority, "P1");
    }

    #[test]
    fn alert_rule_unknown_field_skipped() {
        let mut alert = base_alert();
        let rule = AlertRule {
            rule_name: "bogus".into(),
            condition: always_true(),
            set_field: "notAField".into(),
            set_value: "x".into(),
        };
        enrich(&mut alert, &[rule], &[]);
        assert_eq!(alert.alert_summary, "CPU high");
    }

    #[test]
    fn tag_rule_sets_direct_value() {
        let mut alert = base_alert();
        let rule = TagRule {
            rule_name: "dc-tag".into(),
            condition: always_true(),
            tag_name: "datacenter".into(),
            tag_value: "dc1".into(),
            field_name: String::new(),
            field_extraction: String::new(),
        };
        enrich(&mut alert, &[], &[rule]);
        assert_eq!(alert.additional_details.get("datacenter").unwrap(), "dc1");
    }

    #[test]
    fn tag_rule_extracts_via_regex() {
        let mut alert = base_alert();
        alert.alert_summary = "node-42 is overloaded".into();
        let rule = TagRule {
            rule_name: "node-extract".into(),
            condition: always_true(),
            tag_name: "node".into(),
            tag_value: String::new(),
            field_name: "alertSummary".into(),
            field_extraction: r"node-(\d+)".into(),
        };
        enrich(&mut alert, &[], &[rule]);
        assert_eq!(alert.additional_details.get("node").unwrap(), "42");
    }

    #[test]
    fn tag_rule_skipped_on_condition_false() {
        let mut alert = base_alert();
        let rule = TagRule {
            rule_name: "never".into(),
            condition: RuleGroup {
                condition: Combinator::And,
                rules: vec![RuleNode::Leaf(Rule {
                    field: "severity".into(),
                    operator: Operator::Equal,
                    value: serde_json::json!("low"),
                })],
            },
            tag_name: "unused".into(),
            tag_value: "x".into(),
            field_name: String::new(),
            field_extraction: String::new(),
        };
        enrich(&mut alert, &[], &[rule]);
        assert!(!alert.additional_details.contains_key("unused"));
    }
}
