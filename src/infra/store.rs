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

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::StoreResult;
use crate::meta::alert::Alert;
use crate::meta::change::Change;
use crate::meta::rules::{AlertRule, CorrelationRule, NotifyRule, TagRule};

/// Persistence abstraction over the alert collection and its companion
/// rule collections (§3, §6 "persisted state layout"). The database is the
/// single source of truth (§5); callers never hold a pipeline-lifetime
/// mutable alert reference across a persistence boundary (§9: "reload
/// after correlation").
#[async_trait]
pub trait AlertStore: Send + Sync {
    async fn find_open_by_alert_id(&self, alert_id: &str) -> StoreResult<Option<Alert>>;

    async fn get_alert(&self, id: Uuid) -> StoreResult<Option<Alert>>;

    async fn insert_alert(&self, alert: &Alert) -> StoreResult<()>;

    async fn update_alert(&self, alert: &Alert) -> StoreResult<()>;

    async fn increment_alert_count(&self, id: Uuid) -> StoreResult<()>;

    /// OPEN alerts sharing `group_identifier`, ordered oldest-to-newest so
    /// the caller can pick the most recently inserted as the anchor.
    async fn find_open_by_group_identifier(&self, identifier: &str) -> StoreResult<Vec<Alert>>;

    /// OPEN parent alerts (candidates for similarity grouping), excluding
    /// `exclude_id`, whose `additional_details`/top-level fields match every
    /// `(tag, value)` pair in `scope` exactly.
    async fn find_similarity_candidates(
        &self,
        scope: &[(String, String)],
        exclude_id: Uuid,
    ) -> StoreResult<Vec<Alert>>;

    /// Atomically appends `child_id` to the parent's `group_alerts` at the
    /// store layer (§5: "must be an atomic array-push, not read-modify-write").
    async fn append_child(&self, parent_id: Uuid, child_id: Uuid) -> StoreResult<()>;

    async fn correlation_rules(&self) -> StoreResult<Vec<CorrelationRule>>;
    async fn alert_rules(&self) -> StoreResult<Vec<AlertRule>>;
    async fn tag_rules(&self) -> StoreResult<Vec<TagRule>>;
    async fn notify_rules(&self) -> StoreResult<Vec<NotifyRule>>;

    async fn get_change(&self, change_id: &str) -> StoreResult<Option<Change>>;
    async fn upsert_change(&self, change: Change) -> StoreResult<Change>;
}
