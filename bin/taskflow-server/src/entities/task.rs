use crate::entities::{AnyStore, dao::TaskRecord};

use chrono::{NaiveDateTime, Utc};
use std::future::Future;

/// Storage format for the zone-less `deadline` column.
const DEADLINE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

pub trait TaskStore: Send + Sync + 'static {
    /// Insert the record when it has no id yet, otherwise overwrite the row
    /// with the same id. Returns the record as stored (with its id).
    /// Overwriting a row that no longer exists fails with
    /// [`sqlx::Error::RowNotFound`].
    fn save_task(
        &self,
        record: TaskRecord,
    ) -> impl Future<Output = Result<TaskRecord, sqlx::Error>> + Send;
    fn list_tasks(&self) -> impl Future<Output = Result<Vec<TaskRecord>, sqlx::Error>> + Send;
    fn get_task(
        &self,
        id: i64,
    ) -> impl Future<Output = Result<Option<TaskRecord>, sqlx::Error>> + Send;
    fn task_exists(&self, id: i64) -> impl Future<Output = Result<bool, sqlx::Error>> + Send;
    fn delete_task(&self, id: i64) -> impl Future<Output = Result<(), sqlx::Error>> + Send;
}

type TaskRow = (
    i64,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<i64>,
    String,
    Option<String>,
);

impl TaskStore for AnyStore {
    async fn save_task(&self, mut record: TaskRecord) -> Result<TaskRecord, sqlx::Error> {
        let deadline = record
            .deadline
            .map(|d| d.format(DEADLINE_FORMAT).to_string());
        let priority = record.priority.map(i64::from);
        let created_on = record.created_on.to_rfc3339();
        let updated_on = record.updated_on.map(|t| t.to_rfc3339());

        match record.id {
            Some(id) => {
                let updated = sqlx::query(
                    "UPDATE tasks SET title = ?1, description = ?2, status = ?3, assignee = ?4, \
                     deadline = ?5, priority = ?6, created_on = ?7, updated_on = ?8 WHERE id = ?9",
                )
                .bind(&record.title)
                .bind(&record.description)
                .bind(&record.status)
                .bind(&record.assignee)
                .bind(&deadline)
                .bind(priority)
                .bind(&created_on)
                .bind(&updated_on)
                .bind(id)
                .execute(&self.pool)
                .await?;
                if updated.rows_affected() == 0 {
                    return Err(sqlx::Error::RowNotFound);
                }
            }
            None => {
                let (id,): (i64,) = sqlx::query_as(
                    "INSERT INTO tasks (title, description, status, assignee, deadline, priority, created_on, updated_on) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8) RETURNING id",
                )
                .bind(&record.title)
                .bind(&record.description)
                .bind(&record.status)
                .bind(&record.assignee)
                .bind(&deadline)
                .bind(priority)
                .bind(&created_on)
                .bind(&updated_on)
                .fetch_one(&self.pool)
                .await?;
                record.id = Some(id);
            }
        }
        Ok(record)
    }

    async fn list_tasks(&self) -> Result<Vec<TaskRecord>, sqlx::Error> {
        let rows: Vec<TaskRow> = sqlx::query_as(
            "SELECT id, title, description, status, assignee, deadline, priority, created_on, updated_on \
             FROM tasks ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(row_to_record).collect())
    }

    async fn get_task(&self, id: i64) -> Result<Option<TaskRecord>, sqlx::Error> {
        let row: Option<TaskRow> = sqlx::query_as(
            "SELECT id, title, description, status, assignee, deadline, priority, created_on, updated_on \
             FROM tasks WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(row_to_record))
    }

    async fn task_exists(&self, id: i64) -> Result<bool, sqlx::Error> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM tasks WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    async fn delete_task(&self, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM tasks WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn row_to_record(
    (id, title, description, status, assignee, deadline, priority, created_on, updated_on): TaskRow,
) -> TaskRecord {
    TaskRecord {
        id: Some(id),
        title,
        description,
        status,
        assignee,
        deadline: deadline.and_then(|raw| {
            NaiveDateTime::parse_from_str(&raw, DEADLINE_FORMAT)
                .map_err(|e| tracing::warn!(task_id = id, raw = %raw, error = %e, "failed to parse task deadline; dropping it"))
                .ok()
        }),
        priority: priority.and_then(|p| {
            i32::try_from(p)
                .map_err(|e| tracing::warn!(task_id = id, raw = p, error = %e, "task priority out of range; dropping it"))
                .ok()
        }),
        created_on: created_on.parse().unwrap_or_else(|e: chrono::ParseError| {
            tracing::warn!(task_id = id, raw = %created_on, error = %e, "failed to parse task created_on; using now");
            Utc::now()
        }),
        updated_on: updated_on.and_then(|raw| {
            raw.parse()
                .map_err(|e: chrono::ParseError| tracing::warn!(task_id = id, raw = %raw, error = %e, "failed to parse task updated_on; dropping it"))
                .ok()
        }),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::NaiveDate;

    async fn store() -> AnyStore {
        AnyStore::connect("sqlite::memory:", 1)
            .await
            .expect("in-memory store")
    }

    fn new_record(title: &str) -> TaskRecord {
        TaskRecord {
            id: None,
            title: Some(title.to_owned()),
            description: Some("quarterly numbers".into()),
            status: Some("Pending".into()),
            assignee: Some("sam".into()),
            deadline: NaiveDate::from_ymd_opt(2030, 1, 15)
                .and_then(|d| d.and_hms_milli_opt(9, 30, 0, 250)),
            priority: Some(2),
            created_on: Utc::now(),
            updated_on: None,
        }
    }

    #[tokio::test]
    async fn save_assigns_id_and_round_trips() {
        let store = store().await;
        let saved = store.save_task(new_record("report")).await.expect("insert");
        let id = saved.id.expect("id assigned");

        let loaded = store.get_task(id).await.expect("select").expect("row exists");
        assert_eq!(loaded, saved);
    }

    #[tokio::test]
    async fn save_with_id_updates_in_place() {
        let store = store().await;
        let mut saved = store.save_task(new_record("report")).await.expect("insert");
        saved.description = None;
        saved.touch();
        store.save_task(saved.clone()).await.expect("update");

        let all = store.list_tasks().await.expect("list");
        assert_eq!(all, vec![saved]);
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let store = store().await;
        let first = store.save_task(new_record("a")).await.expect("insert").id;
        let first = first.expect("id");
        store.delete_task(first).await.expect("delete");
        assert!(!store.task_exists(first).await.expect("exists"));

        let second = store.save_task(new_record("b")).await.expect("insert").id;
        assert!(second.expect("id") > first);
    }

    #[tokio::test]
    async fn list_is_ordered_by_id() {
        let store = store().await;
        for title in ["one", "two", "three"] {
            store.save_task(new_record(title)).await.expect("insert");
        }
        let titles: Vec<_> = store
            .list_tasks()
            .await
            .expect("list")
            .into_iter()
            .filter_map(|r| r.title)
            .collect();
        assert_eq!(titles, ["one", "two", "three"]);
    }

    #[tokio::test]
    async fn overwriting_a_deleted_row_is_row_not_found() {
        let store = store().await;
        let saved = store.save_task(new_record("gone")).await.expect("insert");
        store.delete_task(saved.id.expect("id")).await.expect("delete");

        let err = store.save_task(saved).await.expect_err("row is gone");
        assert!(matches!(err, sqlx::Error::RowNotFound));
        assert!(store.list_tasks().await.expect("list").is_empty());
    }
}
