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
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::errors::{StoreError, StoreResult};
use crate::infra::store::AlertStore;
use crate::meta::alert::Alert;
use crate::meta::change::Change;
use crate::meta::rules::{AlertRule, CorrelationRule, NotifyRule, TagRule};

/// Alerts and rule collections are stored as JSON blobs with a handful of
/// indexed columns for the query shapes the correlation engine actually
/// needs (dedup probe, group-identifier lookup, parent scan). This trades
/// relational purity for a schema that does not have to evolve alongside
/// the alert struct, at the cost of typed columns (see DESIGN.md).
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(path: &str) -> StoreResult<SqliteStore> {
        let url = format!("sqlite://{path}?mode=rwc");
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(&url)
            .await?;
        let store = SqliteStore { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> StoreResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS alerts (
                id TEXT PRIMARY KEY,
                alert_id TEXT NOT NULL,
                status TEXT NOT NULL,
                parent INTEGER NOT NULL,
                group_identifier TEXT,
                inserted_seq INTEGER NOT NULL,
                body TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;
        sqlx::query("CREATE TABLE IF NOT EXISTS alert_seq (n INTEGER);")
            .execute(&self.pool)
            .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_alerts_alert_id ON alerts(alert_id, status);",
        )
        .execute(&self.pool)
        .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_alerts_group_identifier ON alerts(group_identifier, status);",
        )
        .execute(&self.pool)
        .await?;
        for table in ["correlation_rules", "alert_rules", "tag_rules", "notify_rules"] {
            sqlx::query(&format!(
                "CREATE TABLE IF NOT EXISTS {table} (rule_name TEXT PRIMARY KEY, body TEXT NOT NULL);"
            ))
            .execute(&self.pool)
            .await?;
        }
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS changes (change_id TEXT PRIMARY KEY, body TEXT NOT NULL);",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn next_seq(&self) -> StoreResult<i64> {
        let row = sqlx::query("SELECT COALESCE(MAX(inserted_seq), 0) + 1 AS n FROM alerts")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get::<i64, _>("n")?)
    }

    fn row_to_alert(row: &sqlx::sqlite::SqliteRow) -> StoreResult<Alert> {
        let body: String = row.try_get("body")?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl AlertStore for SqliteStore {
    async fn find_open_by_alert_id(&self, alert_id: &str) -> StoreResult<Option<Alert>> {
        let row = sqlx::query(
            "SELECT body FROM alerts WHERE alert_id = ?1 AND status = 'OPEN' LIMIT 1",
        )
        .bind(alert_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(Self::row_to_alert).transpose()
    }

    async fn get_alert(&self, id: Uuid) -> StoreResult<Option<Alert>> {
        let row = sqlx::query("SELECT body FROM alerts WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::row_to_alert).transpose()
    }

    async fn insert_alert(&self, alert: &Alert) -> StoreResult<()> {
        let body = serde_json::to_string(alert)?;
        let status = match alert.alert_status {
            crate::meta::alert::AlertStatus::Open => "OPEN",
            crate::meta::alert::AlertStatus::Closed => "CLOSED",
        };
        let seq = self.next_seq().await?;
        sqlx::query(
            "INSERT INTO alerts (id, alert_id, status, parent, group_identifier, inserted_seq, body)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(alert.id.to_string())
        .bind(&alert.alert_id)
        .bind(status)
        .bind(alert.parent as i64)
        .bind(alert.group_identifier.clone())
        .bind(seq)
        .bind(body)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_alert(&self, alert: &Alert) -> StoreResult<()> {
        let body = serde_json::to_string(alert)?;
        let status = match alert.alert_status {
            crate::meta::alert::AlertStatus::Open => "OPEN",
            crate::meta::alert::AlertStatus::Closed => "CLOSED",
        };
        sqlx::query(
            "UPDATE alerts SET alert_id = ?2, status = ?3, parent = ?4, group_identifier = ?5, body = ?6
             WHERE id = ?1",
        )
        .bind(alert.id.to_string())
        .bind(&alert.alert_id)
        .bind(status)
        .bind(alert.parent as i64)
        .bind(alert.group_identifier.clone())
        .bind(body)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn increment_alert_count(&self, id: Uuid) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query("SELECT body FROM alerts WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::NotFound)?;
        let mut alert: Alert = serde_json::from_str(row.try_get::<String, _>("body")?.as_str())?;
        alert.alert_count += 1;
        let body = serde_json::to_string(&alert)?;
        sqlx::query("UPDATE alerts SET body = ?2 WHERE id = ?1")
            .bind(id.to_string())
            .bind(body)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn find_open_by_group_identifier(&self, identifier: &str) -> StoreResult<Vec<Alert>> {
        let rows = sqlx::query(
            "SELECT body FROM alerts WHERE group_identifier = ?1 AND status = 'OPEN'
             ORDER BY inserted_seq ASC",
        )
        .bind(identifier)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(Self::row_to_alert).collect()
    }

    async fn find_similarity_candidates(
        &self,
        scope: &[(String, String)],
        exclude_id: Uuid,
    ) -> StoreResult<Vec<Alert>> {
        let rows = sqlx::query(
            "SELECT body FROM alerts WHERE status = 'OPEN' AND parent = 1 AND id != ?1",
        )
        .bind(exclude_id.to_string())
        .fetch_all(&self.pool)
        .await?;
        let mut out = Vec::new();
        for row in &rows {
            let alert = Self::row_to_alert(row)?;
            if scope
                .iter()
                .all(|(tag, value)| alert.lookup(tag).as_deref() == Some(value.as_str()))
            {
                out.push(alert);
            }
        }
        Ok(out)
    }

    async fn append_child(&self, parent_id: Uuid, child_id: Uuid) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query("SELECT body FROM alerts WHERE id = ?1")
            .bind(parent_id.to_string())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::NotFound)?;
        let mut parent: Alert = serde_json::from_str(row.try_get::<String, _>("body")?.as_str())?;
        if !parent.group_alerts.contains(&child_id) {
            parent.group_alerts.push(child_id);
        }
        let body = serde_json::to_string(&parent)?;
        sqlx::query("UPDATE alerts SET body = ?2 WHERE id = ?1")
            .bind(parent_id.to_string())
            .bind(body)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn correlation_rules(&self) -> StoreResult<Vec<CorrelationRule>> {
        let rows = sqlx::query("SELECT body FROM correlation_rules")
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|r| Ok(serde_json::from_str(&r.try_get::<String, _>("body")?)?))
            .collect()
    }

    async fn alert_rules(&self) -> StoreResult<Vec<AlertRule>> {
        let rows = sqlx::query("SELECT body FROM alert_rules")
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|r| Ok(serde_json::from_str(&r.try_get::<String, _>("body")?)?))
            .collect()
    }

    async fn tag_rules(&self) -> StoreResult<Vec<TagRule>> {
        let rows = sqlx::query("SELECT body FROM tag_rules")
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|r| Ok(serde_json::from_str(&r.try_get::<String, _>("body")?)?))
            .collect()
    }

    async fn notify_rules(&self) -> StoreResult<Vec<NotifyRule>> {
        let rows = sqlx::query("SELECT body FROM notify_rules")
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|r| Ok(serde_json::from_str(&r.try_get::<String, _>("body")?)?))
            .collect()
    }

    async fn get_change(&self, change_id: &str) -> StoreResult<Option<Change>> {
        let row = sqlx::query("SELECT body FROM changes WHERE change_id = ?1")
            .bind(change_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| Ok(serde_json::from_str(&r.try_get::<String, _>("body")?)?))
            .transpose()
    }

    async fn upsert_change(&self, change: Change) -> StoreResult<Change> {
        let body = serde_json::to_string(&change)?;
        sqlx::query(
            "INSERT INTO changes (change_id, body) VALUES (?1, ?2)
             ON CONFLICT(change_id) DO UPDATE SET body = excluded.body",
        )
        .bind(&change.change_id)
        .bind(body)
        .execute(&self.pool)
        .await?;
        Ok(change)
    }
}
