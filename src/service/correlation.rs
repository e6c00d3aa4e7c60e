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

use chrono::Utc;
use itertools::Itertools;
use uuid::Uuid;

use crate::errors::StoreResult;
use crate::infra::store::AlertStore;
use crate::meta::alert::Alert;
use crate::meta::rules::{CorrelationMode, CorrelationRule};
use crate::service::lifecycle::recompute_parent_priority;
use crate::util::similarity::compute_similarity;

/// Outcome of a single alert's pass through the correlation engine.
/// `new_parent` is set only when a fresh parent was just created, so the
/// caller can trigger its own notify pass (§4.4).
#[derive(Debug)]
pub struct CorrelationOutcome {
    pub attached_to: Uuid,
    pub new_parent: Option<Uuid>,
}

/// Loads correlation rules sorted ascending by `group_window` (similarity
/// rules sort last, §9), evaluates in order, and stops at the first rule
/// that successfully attaches or creates a parent (§4.3).
pub async fn correlate(store: &dyn AlertStore, alert: &Alert) -> StoreResult<Option<CorrelationOutcome>> {
    let mut rules = store.correlation_rules().await?;
    rules.sort_by_key(|r| r.sort_key());

    for rule in &rules {
        let outcome = match rule.correlation_mode {
            CorrelationMode::TagWindow => tag_window_attempt(store, alert, rule).await?,
            CorrelationMode::Similarity => similarity_attempt(store, alert, rule).await?,
        };
        if let Some(outcome) = outcome {
            recompute_parent_priority(store, outcome.attached_to).await?;
            return Ok(Some(outcome));
        }
    }
    Ok(None)
}

async fn tag_window_attempt(
    store: &dyn AlertStore,
    alert: &Alert,
    rule: &CorrelationRule,
) -> StoreResult<Option<CorrelationOutcome>> {
    if rule.group_tags.is_empty() {
        return Ok(None);
    }
    let mut values = Vec::with_capacity(rule.group_tags.len());
    for tag in &rule.group_tags {
        match alert.additional_details.get(tag) {
            Some(v) => values.push(crate::meta::alert::value_to_string(v)),
            None => return Ok(None),
        }
    }
    let group_identifier = format!("--{}", values.iter().join("--"));

    let candidates = store.find_open_by_group_identifier(&group_identifier).await?;
    let anchor = candidates.last();

    if let Some(anchor) = anchor {
        let within_window = (alert.alert_first_time - anchor.alert_first_time).num_seconds() <= rule.group_window;
        if within_window {
            attach_child(store, anchor.id, alert.id).await?;
            return Ok(Some(CorrelationOutcome { attached_to: anchor.id, new_parent: None }));
        }
    }

    let synthetic_id = format!("grouped-{group_identifier}");
    let parent = alert.spawn_parent(synthetic_id, group_identifier, Utc::now());
    store.insert_alert(&parent).await?;
    link_child_to_parent(store, alert, parent.id).await?;
    Ok(Some(CorrelationOutcome { attached_to: parent.id, new_parent: Some(parent.id) }))
}

async fn similarity_attempt(
    store: &dyn AlertStore,
    alert: &Alert,
    rule: &CorrelationRule,
) -> StoreResult<Option<CorrelationOutcome>> {
    if rule.scope_tags.is_empty() {
        return Ok(None);
    }
    let mut scope = Vec::with_capacity(rule.scope_tags.len());
    for tag in &rule.scope_tags {
        match alert.lookup(tag) {
            Some(v) => scope.push((tag.clone(), v)),
            None => return Ok(None),
        }
    }

    let candidates = store.find_similarity_candidates(&scope, alert.id).await?;

    let mut best: Option<(&Alert, f64)> = None;
    for candidate in &candidates {
        let mut attempted = 0usize;
        let mut total = 0.0f64;
        for field in &rule.similarity.fields {
            attempted += 1;
            if let (Some(a), Some(b)) = (alert.lookup(field), candidate.lookup(field)) {
                total += compute_similarity(&a, &b);
            }
            // A field neither side resolves still counts toward `attempted`
            // (divides by attempted, not matched — §4.3 step 3, preserved
            // per the open question in §9).
        }
        let score = if attempted == 0 { 0.0 } else { total / attempted as f64 };
        if best.map(|(_, best_score)| score > best_score).unwrap_or(true) {
            best = Some((candidate, score));
        }
    }

    let threshold = if rule.similarity.threshold > 0.0 { rule.similarity.threshold } else { 0.8 };

    if let Some((candidate, score)) = best {
        if score >= threshold {
            let parent_id = candidate.id;
            attach_child(store, parent_id, alert.id).await?;
            return Ok(Some(CorrelationOutcome { attached_to: parent_id, new_parent: None }));
        }
    }

    let synthetic_id = format!("group-{}-{}", rule.group_name, alert.alert_id);
    let identifier = scope.iter().map(|(_, v)| v.clone()).join("--");
    let parent = alert.spawn_parent(synthetic_id, identifier, Utc::now());
    store.insert_alert(&parent).await?;
    link_child_to_parent(store, alert, parent.id).await?;
    Ok(Some(CorrelationOutcome { attached_to: parent.id, new_parent: Some(parent.id) }))
}

async fn attach_child(store: &dyn AlertStore, parent_id: Uuid, child_id: Uuid) -> StoreResult<()> {
    store.append_child(parent_id, child_id).await?;
    if let Some(mut child) = store.get_alert(child_id).await? {
        child.grouped = true;
        child.group_incident_id = Some(parent_id);
        child.updated_at = Utc::now();
        store.update_alert(&child).await?;
    }
    Ok(())
}

async fn link_child_to_parent(store: &dyn AlertStore, alert: &Alert, parent_id: Uuid) -> StoreResult<()> {
    let mut child = alert.clone();
    child.grouped = true;
    child.group_incident_id = Some(parent_id);
    child.updated_at = Utc::now();
    store.update_alert(&child).await?;
    Ok(())
}
