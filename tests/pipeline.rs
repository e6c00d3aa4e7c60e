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

//! Integration tests for the invariants and scenarios in the engine's
//! testable-properties section: dedup, tag-window grouping, similarity
//! grouping, notify bifurcation, close cascade, and priority roll-up.

use std::sync::Arc;

use alertcorr::infra::memory_store::MemoryStore;
use alertcorr::infra::pager::RecordingPagerBridge;
use alertcorr::infra::store::AlertStore;
use alertcorr::meta::alert::IngressEvent;
use alertcorr::meta::rules::{AlertRule, CorrelationMode, CorrelationRule, NotifyRule, SimilaritySpec};
use alertcorr::rules_engine::{Combinator, Operator, Rule, RuleGroup, RuleNode};
use alertcorr::service::ingress::{handle_close, handle_create, CreateOutcome};
use alertcorr::state::AppState;
use serde_json::json;

fn always_true() -> RuleGroup {
    RuleGroup { condition: Combinator::And, rules: vec![] }
}

fn event(alert_id: &str, alert_type: &str, time: &str, extra: serde_json::Value) -> IngressEvent {
    let mut body = json!({
        "alertId": alert_id,
        "alertType": alert_type,
        "entity": "host-1",
        "alertTime": time,
        "alertSource": "nagios",
        "serviceName": "web",
        "alertSummary": "CPU high",
        "severity": "critical",
    });
    body.as_object_mut().unwrap().extend(extra.as_object().unwrap().clone());
    serde_json::from_value(body).unwrap()
}

fn state_with(
    correlation_rules: Vec<CorrelationRule>,
    notify_rules: Vec<NotifyRule>,
) -> (AppState, Arc<MemoryStore>, Arc<RecordingPagerBridge>) {
    state_with_alert_rules(correlation_rules, vec![], notify_rules)
}

fn state_with_alert_rules(
    correlation_rules: Vec<CorrelationRule>,
    alert_rules: Vec<AlertRule>,
    notify_rules: Vec<NotifyRule>,
) -> (AppState, Arc<MemoryStore>, Arc<RecordingPagerBridge>) {
    let store = Arc::new(MemoryStore::with_rules(correlation_rules, alert_rules, vec![], notify_rules));
    let pager = Arc::new(RecordingPagerBridge::new());
    let state = AppState::new(store.clone(), pager.clone());
    (state, store, pager)
}

fn priority_rule(tag_value: &str, priority: &str) -> AlertRule {
    AlertRule {
        rule_name: format!("set-{priority}"),
        condition: RuleGroup {
            condition: Combinator::And,
            rules: vec![RuleNode::Leaf(Rule {
                field: "p".into(),
                operator: Operator::Equal,
                value: json!(tag_value),
            })],
        },
        set_field: "alertPriority".into(),
        set_value: priority.into(),
    }
}

/// S1 / invariant 1: repeated CREATE with the same alertId dedups.
#[tokio::test]
async fn s1_simple_dedup() {
    let (state, store, _pager) = state_with(vec![], vec![]);

    let first = handle_create(&state, event("a1", "CREATE", "2026-01-01 00:00:00", json!({})))
        .await
        .unwrap();
    assert!(matches!(first, CreateOutcome::Created(_)));

    let second = handle_create(&state, event("a1", "CREATE", "2026-01-01 00:00:00", json!({})))
        .await
        .unwrap();
    assert!(matches!(second, CreateOutcome::Deduplicated(_)));

    let all = store.snapshot_all();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].alert_count, 2);
}

fn tag_window_rule() -> CorrelationRule {
    CorrelationRule {
        group_name: "dc-window".into(),
        group_tags: vec!["datacenter".into()],
        group_window: 300,
        scope_tags: vec![],
        correlation_mode: CorrelationMode::TagWindow,
        similarity: SimilaritySpec::default(),
    }
}

/// S2: tag-window grouping within and outside the window.
#[tokio::test]
async fn s2_tag_window_grouping() {
    let (state, store, _pager) = state_with(vec![tag_window_rule()], vec![]);

    handle_create(&state, event("a", "CREATE", "2026-01-01 00:00:00", json!({"datacenter": "dc1"})))
        .await
        .unwrap();
    handle_create(&state, event("b", "CREATE", "2026-01-01 00:01:40", json!({"datacenter": "dc1"})))
        .await
        .unwrap();
    handle_create(&state, event("c", "CREATE", "2026-01-01 00:08:20", json!({"datacenter": "dc1"})))
        .await
        .unwrap();

    let all = store.snapshot_all();
    let parents: Vec<_> = all.iter().filter(|a| a.parent).collect();
    assert_eq!(parents.len(), 2, "expected two parents: one absorbing b, one fresh for c");

    let b = all.iter().find(|a| a.alert_id == "b").unwrap();
    assert!(b.grouped);
    let a_parent_id = b.group_incident_id.unwrap();
    let a_parent = all.iter().find(|p| p.id == a_parent_id).unwrap();
    assert!(a_parent.group_alerts.iter().any(|id| all.iter().any(|x| x.id == *id && x.alert_id == "a")));

    let c = all.iter().find(|a| a.alert_id == "c").unwrap();
    assert!(c.grouped);
    assert_ne!(c.group_incident_id.unwrap(), a_parent_id, "C must land in a different parent, window exceeded");
}

/// S3: similarity grouping via edit-distance scope matching.
#[tokio::test]
async fn s3_similarity_grouping() {
    let rule = CorrelationRule {
        group_name: "summary-sim".into(),
        group_tags: vec![],
        group_window: 0,
        scope_tags: vec!["serviceName".into()],
        correlation_mode: CorrelationMode::Similarity,
        similarity: SimilaritySpec { fields: vec!["alertSummary".into()], threshold: 0.7 },
    };
    let (state, store, _pager) = state_with(vec![rule], vec![]);

    handle_create(
        &state,
        event("a", "CREATE", "2026-01-01 00:00:00", json!({"alertSummary": "CPU high on node-1"})),
    )
    .await
    .unwrap();
    handle_create(
        &state,
        event("b", "CREATE", "2026-01-01 00:00:05", json!({"alertSummary": "CPU high on node-2"})),
    )
    .await
    .unwrap();

    let all = store.snapshot_all();
    let a = all.iter().find(|x| x.alert_id == "a").unwrap();
    let b = all.iter().find(|x| x.alert_id == "b").unwrap();
    assert!(a.parent, "first alert with no candidate must become a parent");
    assert!(b.grouped);
    assert_eq!(b.group_incident_id, Some(a.id));
}

/// S4: children never create a new incident; they note the parent's.
#[tokio::test]
async fn s4_notify_bifurcation() {
    let notify_rule = NotifyRule {
        rule_name: "page-everything".into(),
        condition: always_true(),
        pagerduty_service: "svc".into(),
        pagerduty_escalation_policy: "ep".into(),
    };
    let (state, store, pager) = state_with(vec![tag_window_rule()], vec![notify_rule]);

    handle_create(&state, event("a", "CREATE", "2026-01-01 00:00:00", json!({"datacenter": "dc1"})))
        .await
        .unwrap();
    handle_create(&state, event("b", "CREATE", "2026-01-01 00:01:00", json!({"datacenter": "dc1"})))
        .await
        .unwrap();

    assert_eq!(pager.creates.lock().unwrap().len(), 1, "create webhook only for the parent");
    assert_eq!(pager.notes.lock().unwrap().len(), 1, "one note for the attached child");

    let all = store.snapshot_all();
    let b = all.iter().find(|x| x.alert_id == "b").unwrap();
    assert!(b.pager_duty_incident_id.is_none());
    let parent = all.iter().find(|x| x.parent).unwrap();
    assert!(parent.pager_duty_incident_id.is_some());
}

/// S5 / invariant 5: parent closes only once the last open child closes.
#[tokio::test]
async fn s5_close_cascade() {
    let (state, store, pager) = state_with(vec![tag_window_rule()], vec![]);

    handle_create(&state, event("a", "CREATE", "2026-01-01 00:00:00", json!({"datacenter": "dc1"})))
        .await
        .unwrap();
    handle_create(&state, event("b", "CREATE", "2026-01-01 00:00:10", json!({"datacenter": "dc1"})))
        .await
        .unwrap();
    handle_create(&state, event("c", "CREATE", "2026-01-01 00:00:20", json!({"datacenter": "dc1"})))
        .await
        .unwrap();

    handle_close(&state, event("a", "CLOSE", "2026-01-01 00:10:00", json!({"datacenter": "dc1"})))
        .await
        .unwrap();
    let parent_open = store.snapshot_all().into_iter().find(|x| x.parent).unwrap();
    assert_eq!(parent_open.alert_status, alertcorr::meta::alert::AlertStatus::Open);

    handle_close(&state, event("b", "CLOSE", "2026-01-01 00:10:10", json!({"datacenter": "dc1"})))
        .await
        .unwrap();
    let parent_still_open = store.snapshot_all().into_iter().find(|x| x.parent).unwrap();
    assert_eq!(parent_still_open.alert_status, alertcorr::meta::alert::AlertStatus::Open);

    handle_close(&state, event("c", "CLOSE", "2026-01-01 00:10:20", json!({"datacenter": "dc1"})))
        .await
        .unwrap();
    let parent_closed = store.snapshot_all().into_iter().find(|x| x.parent).unwrap();
    assert_eq!(parent_closed.alert_status, alertcorr::meta::alert::AlertStatus::Closed);
    assert!(pager.closes.lock().unwrap().is_empty(), "no incident id was ever assigned, close webhook not called");
}

/// Invariant 2: closing an unknown or already-closed alertId is a no-op.
#[tokio::test]
async fn close_idempotency() {
    let (state, store, _pager) = state_with(vec![], vec![]);
    let result = handle_close(&state, event("ghost", "CLOSE", "2026-01-01 00:00:00", json!({})))
        .await
        .unwrap();
    assert!(result.is_none());
    assert!(store.snapshot_all().is_empty());
}

/// S6 / invariant 6: parent priority tracks the min ordinal among open
/// children and recomputes on close.
#[tokio::test]
async fn s6_priority_rollup() {
    let alert_rules = vec![priority_rule("3", "P3"), priority_rule("1", "P1"), priority_rule("4", "P4")];
    let (state, store, _pager) = state_with_alert_rules(vec![tag_window_rule()], alert_rules, vec![]);

    handle_create(&state, event("p3", "CREATE", "2026-01-01 00:00:00", json!({"datacenter": "dc1", "p": "3"})))
        .await
        .unwrap();
    handle_create(&state, event("p1", "CREATE", "2026-01-01 00:00:05", json!({"datacenter": "dc1", "p": "1"})))
        .await
        .unwrap();
    handle_create(&state, event("p4", "CREATE", "2026-01-01 00:00:10", json!({"datacenter": "dc1", "p": "4"})))
        .await
        .unwrap();

    let parent = store.snapshot_all().into_iter().find(|x| x.parent).unwrap();
    assert_eq!(parent.alert_priority, "P1");

    handle_close(&state, event("p1", "CLOSE", "2026-01-01 01:00:00", json!({"datacenter": "dc1"})))
        .await
        .unwrap();
    let parent = store.snapshot_all().into_iter().find(|x| x.parent).unwrap();
    assert_eq!(parent.alert_priority, "P3");
}
