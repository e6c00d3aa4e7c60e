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

use chrono::Utc;
use uuid::Uuid;

use crate::errors::IngestError;
use crate::meta::alert::{Alert, AlertAcked, AlertStatus, IngressEvent, TAG_EXCLUDE};
use crate::service::{correlation, enrichment, lifecycle, notify};
use crate::state::AppState;
use crate::util::time::parse_alert_time;

/// Result of a create-event: whether a fresh alert was made (201, with the
/// persisted alert in the response) or an existing one was deduplicated
/// (200, echoing the original event back per §4.1 / §6).
pub enum CreateOutcome {
    Created(Alert),
    Deduplicated(IngressEvent),
}

/// Orchestrates the create pipeline: dedup -> enrichment -> persist ->
/// correlation -> reload -> notify (§5: "within a single request the
/// pipeline is strictly sequential").
pub async fn handle_create(state: &AppState, event: IngressEvent) -> Result<CreateOutcome, IngestError> {
    let _guard = state.locks.acquire(&event.alert_id).await;

    if let Some(existing) = state.store.find_open_by_alert_id(&event.alert_id).await? {
        state.store.increment_alert_count(existing.id).await?;
        return Ok(CreateOutcome::Deduplicated(event));
    }

    let first_time = parse_alert_time(&event.alert_time)
        .ok_or_else(|| IngestError::InvalidTimestamp(event.alert_time.clone()))?;
    let now = Utc::now();

    let tags: BTreeMap<_, _> = event
        .extra
        .iter()
        .filter(|(k, _)| !TAG_EXCLUDE.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    let mut alert = Alert {
        id: Uuid::new_v4(),
        alert_id: event.alert_id.clone(),
        entity: event.entity.clone(),
        alert_source: event.alert_source.clone(),
        service_name: event.service_name.clone(),
        alert_summary: event.alert_summary.clone(),
        severity: event.severity.clone(),
        ip_address: event.ip_address.clone(),
        alert_notes: event.alert_notes.clone(),
        alert_first_time: first_time,
        alert_last_time: first_time,
        alert_clear_time: None,
        alert_status: AlertStatus::Open,
        alert_acked: AlertAcked::No,
        alert_count: 1,
        alert_priority: "NORMAL".into(),
        additional_details: tags,
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
    };

    let alert_rules = state.store.alert_rules().await?;
    let tag_rules = state.store.tag_rules().await?;
    enrichment::enrich(&mut alert, &alert_rules, &tag_rules);

    state.store.insert_alert(&alert).await?;

    let outcome = correlation::correlate(state.store.as_ref(), &alert).await?;

    // §9: correlation writes grouping state to the store only; reload
    // before notify rather than threading a single mutable reference.
    let mut reloaded = state
        .store
        .get_alert(alert.id)
        .await?
        .expect("just-inserted alert must exist");

    notify::notify(state.store.as_ref(), state.pager.as_ref(), &mut reloaded).await?;

    if let Some(outcome) = &outcome {
        if let Some(parent_id) = outcome.new_parent {
            if let Some(mut parent) = state.store.get_alert(parent_id).await? {
                notify::notify(state.store.as_ref(), state.pager.as_ref(), &mut parent).await?;
            }
        }
    }

    Ok(CreateOutcome::Created(reloaded))
}

/// Orchestrates the close pipeline (§4.1, §4.7). Closing an unknown or
/// already-closed `alertId` is a success no-op (invariant 2). Echoes the
/// original event back on success, per §4.1 / §6.
pub async fn handle_close(state: &AppState, event: IngressEvent) -> Result<Option<IngressEvent>, IngestError> {
    let _guard = state.locks.acquire(&event.alert_id).await;

    let Some(alert) = state.store.find_open_by_alert_id(&event.alert_id).await? else {
        return Ok(None);
    };

    let close_time = parse_alert_time(&event.alert_time).unwrap_or_else(Utc::now);
    lifecycle::close_alert(state.store.as_ref(), state.pager.as_ref(), alert, close_time).await?;

    Ok(Some(event))
}
