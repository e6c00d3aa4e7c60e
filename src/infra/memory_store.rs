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

//! In-memory `AlertStore` used by the pipeline's integration tests (§8),
//! avoiding a real sqlite file per test while exercising identical
//! call-by-call semantics as `SqliteStore`.

use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::{StoreError, StoreResult};
use crate::infra::store::AlertStore;
use crate::meta::alert::{Alert, AlertStatus};
use crate::meta::change::Change;
use crate::meta::rules::{AlertRule, CorrelationRule, NotifyRule, TagRule};

#[derive(Default)]
struct Inner {
    alerts: Vec<Alert>,
    correlation_rules: Vec<CorrelationRule>,
    alert_rules: Vec<AlertRule>,
    tag_rules: Vec<TagRule>,
    notify_rules: Vec<NotifyRule>,
    changes: Vec<Change>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    pub fn with_rules(
        correlation_rules: Vec<CorrelationRule>,
        alert_rules: Vec<AlertRule>,
        tag_rules: Vec<TagRule>,
        notify_rules: Vec<NotifyRule>,
    ) -> MemoryStore {
        let store = MemoryStore::new();
        {
            let mut inner = store.inner.lock().unwrap();
            inner.correlation_rules = correlation_rules;
            inner.alert_rules = alert_rules;
            inner.tag_rules = tag_rules;
            inner.notify_rules = notify_rules;
        }
        store
    }

    pub fn snapshot_all(&self) -> Vec<Alert> {
        self.inner.lock().unwrap().alerts.clone()
    }
}

#[async_trait]
impl AlertStore for MemoryStore {
    async fn find_open_by_alert_id(&self, alert_id: &str) -> StoreResult<Option<Alert>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .alerts
            .iter()
            .find(|a| a.alert_id == alert_id && a.alert_status == AlertStatus::Open)
            .cloned())
    }

    async fn get_alert(&self, id: Uuid) -> StoreResult<Option<Alert>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.alerts.iter().find(|a| a.id == id).cloned())
    }

    async fn insert_alert(&self, alert: &Alert) -> StoreResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.alerts.push(alert.clone());
        Ok(())
    }

    async fn update_alert(&self, alert: &Alert) -> StoreResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let slot = inner
            .alerts
            .iter_mut()
            .find(|a| a.id == alert.id)
            .ok_or(StoreError::NotFound)?;
        *slot = alert.clone();
        Ok(())
    }

    async fn increment_alert_count(&self, id: Uuid) -> StoreResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let slot = inner
            .alerts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(StoreError::NotFound)?;
        slot.alert_count += 1;
        Ok(())
    }

    async fn find_open_by_group_identifier(&self, identifier: &str) -> StoreResult<Vec<Alert>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .alerts
            .iter()
            .filter(|a| {
                a.alert_status == AlertStatus::Open
                    && a.group_identifier.as_deref() == Some(identifier)
            })
            .cloned()
            .collect())
    }

    async fn find_similarity_candidates(
        &self,
        scope: &[(String, String)],
        exclude_id: Uuid,
    ) -> StoreResult<Vec<Alert>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .alerts
            .iter()
            .filter(|a| {
                a.alert_status == AlertStatus::Open && a.parent && a.id != exclude_id
            })
            .filter(|a| {
                scope
                    .iter()
                    .all(|(tag, value)| a.lookup(tag).as_deref() == Some(value.as_str()))
            })
            .cloned()
            .collect())
    }

    async fn append_child(&self, parent_id: Uuid, child_id: Uuid) -> StoreResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let slot = inner
            .alerts
            .iter_mut()
            .find(|a| a.id == parent_id)
            .ok_or(StoreError::NotFound)?;
        if !slot.group_alerts.contains(&child_id) {
            slot.group_alerts.push(child_id);
        }
        Ok(())
    }

    async fn correlation_rules(&self) -> StoreResult<Vec<CorrelationRule>> {
        Ok(self.inner.lock().unwrap().correlation_rules.clone())
    }

    async fn alert_rules(&self) -> StoreResult<Vec<AlertRule>> {
        Ok(self.inner.lock().unwrap().alert_rules.clone())
    }

    async fn tag_rules(&self) -> StoreResult<Vec<TagRule>> {
        Ok(self.inner.lock().unwrap().tag_rules.clone())
    }

    async fn notify_rules(&self) -> StoreResult<Vec<NotifyRule>> {
        Ok(self.inner.lock().unwrap().notify_rules.clone())
    }

    async fn get_change(&self, change_id: &str) -> StoreResult<Option<Change>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.changes.iter().find(|c| c.change_id == change_id).cloned())
    }

    async fn upsert_change(&self, change: Change) -> StoreResult<Change> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(slot) = inner
            .changes
            .iter_mut()
            .find(|c| c.change_id == change.change_id)
        {
            *slot = change.clone();
        } else {
            inner.changes.push(change.clone());
        }
        Ok(change)
    }
}
