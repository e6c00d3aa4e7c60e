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

use crate::errors::StoreResult;
use crate::infra::pager::PagerBridge;
use crate::infra::store::AlertStore;
use crate::meta::alert::Alert;
use crate::rules_engine;

/// Evaluates notify-rules against `alert` and dispatches to the pager
/// (§4.6). Children never create a new incident — they append a note to
/// the parent's existing one, or are skipped (logged) if the parent has
/// none yet.
pub async fn notify(store: &dyn AlertStore, pager: &dyn PagerBridge, alert: &mut Alert) -> StoreResult<()> {
    let notify_rules = store.notify_rules().await?;
    let facts = alert.facts();

    let Some(rule) = notify_rules.iter().find(|r| rules_engine::evaluate(&r.condition, &facts)) else {
        return Ok(());
    };

    alert.alert_destination = Some(rule.rule_name.clone());

    if alert.is_notify_child() {
        let parent_id = alert.group_incident_id.expect("checked by is_notify_child");
        match store.get_alert(parent_id).await? {
            Some(parent) => {
                if let Some(incident_id) = &parent.pager_duty_incident_id {
                    pager
                        .send_note(incident_id, &format!("{}:{} is OPENED", alert.entity, alert.alert_summary))
                        .await;
                } else {
                    tracing::info!(parent_id = %parent_id, "parent has no incident yet, skipping child note");
                }
            }
            None => tracing::warn!(parent_id = %parent_id, "dangling groupIncidentId, skipping notify"),
        }
        alert.updated_at = Utc::now();
        store.update_alert(alert).await?;
        return Ok(());
    }

    let Some(created) = pager
        .create_incident(alert, &rule.pagerduty_service, &rule.pagerduty_escalation_policy)
        .await
    else {
        return Ok(());
    };

    apply_created_incident(alert, &created);
    alert.updated_at = Utc::now();
    store.update_alert(alert).await?;

    Ok(())
}

fn apply_created_incident(alert: &mut Alert, created: &crate::infra::pager::CreatedIncident) {
    alert.pager_duty_incident_number = created.incident_number;
    alert.pager_duty_incident_id = created.id.clone();
    alert.pager_duty_urgency = created.urgency.clone();
    alert.pager_duty_html_url = created.html_url.clone();
    alert.pager_duty_priority = created.priority.as_ref().and_then(|s| s.summary.clone());
    alert.pager_duty_service = created.service.as_ref().and_then(|s| s.summary.clone());
    alert.pager_duty_escalation_policy = created
        .escalation_policy
        .as_ref()
        .and_then(|s| s.summary.clone());
}
