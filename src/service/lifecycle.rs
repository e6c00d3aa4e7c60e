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
use uuid::Uuid;

use crate::errors::StoreResult;
use crate::infra::pager::PagerBridge;
use crate::infra::store::AlertStore;
use crate::meta::alert::AlertStatus;
use crate::util::priority::{int_to_priority, priority_to_int};

/// Recomputes a parent's priority from its currently OPEN children (§4.5).
/// Applied after every attach AND every child close — the original only
/// invokes this from the similarity attach path; §9 flags that as an
/// inconsistency and recommends applying it uniformly, which this does.
pub async fn recompute_parent_priority(store: &dyn AlertStore, parent_id: Uuid) -> StoreResult<()> {
    let Some(mut parent) = store.get_alert(parent_id).await? else {
        return Ok(());
    };

    let mut open_children = Vec::new();
    for child_id in parent.group_alerts.clone() {
        if let Some(child) = store.get_alert(child_id).await? {
            if child.alert_status == AlertStatus::Open {
                open_children.push(child);
            }
        }
    }

    if open_children.is_empty() {
        // Empty open-set preserves the prior value (§4.5 step 3, invariant 6).
        return Ok(());
    }

    let min_ordinal = open_children
        .iter()
        .map(|c| priority_to_int(&c.alert_priority))
        .min()
        .expect("non-empty children checked above");
    let new_priority = int_to_priority(min_ordinal);

    if parent.alert_priority != new_priority {
        parent.alert_priority = new_priority;
        parent.updated_at = Utc::now();
        store.update_alert(&parent).await?;
    }
    Ok(())
}

/// Close cascade (§4.7): closes `alert` (already located as OPEN by the
/// caller), and if it was a child, notes the parent and closes it when the
/// last open sibling has gone.
pub async fn close_alert(
    store: &dyn AlertStore,
    pager: &dyn PagerBridge,
    mut alert: crate::meta::alert::Alert,
    close_time: DateTime<Utc>,
) -> StoreResult<()> {
    alert.alert_status = AlertStatus::Closed;
    alert.alert_clear_time = Some(close_time);
    alert.updated_at = Utc::now();
    let child_link = if alert.is_notify_child() {
        alert.group_incident_id
    } else {
        None
    };
    store.update_alert(&alert).await?;

    let Some(parent_id) = child_link else {
        return Ok(());
    };
    let Some(mut parent) = store.get_alert(parent_id).await? else {
        tracing::warn!(alert_id = %alert.alert_id, "dangling groupIncidentId on close, skipping cascade");
        return Ok(());
    };

    if let Some(incident_id) = &parent.pager_duty_incident_id {
        pager
            .send_note(
                incident_id,
                &format!("{}:{} is CLOSED", alert.entity, alert.alert_summary),
            )
            .await;
    }

    recompute_parent_priority(store, parent_id).await?;
    // Re-fetch: recompute just wrote a new priority, and the closed-parent
    // update below must not clobber it with the pre-recompute snapshot.
    parent = store
        .get_alert(parent_id)
        .await?
        .expect("parent fetched above still exists");

    let mut open_siblings = 0usize;
    for child_id in &parent.group_alerts {
        if let Some(child) = store.get_alert(*child_id).await? {
            if child.alert_status == AlertStatus::Open {
                open_siblings += 1;
            }
        }
    }

    if open_siblings == 0 {
        parent.alert_status = AlertStatus::Closed;
        parent.alert_clear_time = Some(close_time);
        parent.updated_at = Utc::now();
        store.update_alert(&parent).await?;
        if let Some(incident_id) = &parent.pager_duty_incident_id {
            pager.close_incident(incident_id).await;
        }
    }

    Ok(())
}
