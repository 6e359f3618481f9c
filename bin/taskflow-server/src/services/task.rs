//! Task orchestration on top of a [`TaskStore`].
//!
//! `replace` and `patch` take the same request shape but apply different
//! policies: replace overwrites every mutable field (absent ones become
//! null), patch only overwrites the fields that are present.

use std::sync::Arc;

use tracing::info;

use crate::entities::{TaskRecord, TaskStore};
use crate::error::ServerError;
use crate::schemas::task::UpdateTaskRequest;

#[derive(Debug)]
pub struct TaskService<S> {
    store: Arc<S>,
}

impl<S> Clone for TaskService<S> {
    fn clone(&self) -> Self {
        Self { store: Arc::clone(&self.store) }
    }
}

fn missing(id: i64) -> ServerError {
    ServerError::NotFound(format!("Task with id {id} does not exist."))
}

/// A row deleted between the read and the write is reported as missing.
fn missing_on_write(id: i64) -> impl FnOnce(sqlx::Error) -> ServerError {
    move |e| match e {
        sqlx::Error::RowNotFound => missing(id),
        e => ServerError::Database(e),
    }
}

impl<S: TaskStore> TaskService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Persist a new record; the store assigns its id.
    pub async fn create(&self, record: TaskRecord) -> Result<TaskRecord, ServerError> {
        let saved = self.store.save_task(record).await?;
        info!(task_id = ?saved.id, "task created");
        Ok(saved)
    }

    pub async fn list_all(&self) -> Result<Vec<TaskRecord>, ServerError> {
        Ok(self.store.list_tasks().await?)
    }

    /// Absence is not an error here; the caller decides how to report it.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<TaskRecord>, ServerError> {
        Ok(self.store.get_task(id).await?)
    }

    /// Full replace: every mutable field takes the request's value, present
    /// or not.
    pub async fn replace(
        &self,
        id: i64,
        req: UpdateTaskRequest,
    ) -> Result<TaskRecord, ServerError> {
        let mut record = self.store.get_task(id).await?.ok_or_else(|| missing(id))?;

        record.title = req.title;
        record.description = req.description;
        record.status = req.status;
        record.assignee = req.assignee;
        record.deadline = req.deadline;
        record.priority = req.priority;
        record.touch();

        let saved = self.store.save_task(record).await.map_err(missing_on_write(id))?;
        info!(task_id = id, "task replaced");
        Ok(saved)
    }

    /// Partial merge: only fields present in the request change.
    pub async fn patch(&self, id: i64, req: UpdateTaskRequest) -> Result<TaskRecord, ServerError> {
        let mut record = self.store.get_task(id).await?.ok_or_else(|| missing(id))?;
        req.merge_into(&mut record);

        let saved = self.store.save_task(record).await.map_err(missing_on_write(id))?;
        info!(task_id = id, "task patched");
        Ok(saved)
    }

    /// Hard delete. Returns the confirmation message sent to the client.
    pub async fn delete(&self, id: i64) -> Result<String, ServerError> {
        if !self.store.task_exists(id).await? {
            return Err(missing(id));
        }
        self.store.delete_task(id).await?;
        info!(task_id = id, "task deleted");
        Ok(format!("SUCCESS: Task with id {id} has been deleted."))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::entities::AnyStore;
    use crate::schemas::task::CreateTaskRequest;

    async fn service() -> TaskService<AnyStore> {
        let store = AnyStore::connect("sqlite::memory:", 1)
            .await
            .expect("in-memory store");
        TaskService::new(Arc::new(store))
    }

    fn full_request() -> CreateTaskRequest {
        CreateTaskRequest {
            title: Some("Prepare release".into()),
            description: Some("Tag and publish".into()),
            status: Some("Pending".into()),
            assignee: Some("kim".into()),
            deadline: None,
            priority: Some(3),
        }
    }

    async fn created(service: &TaskService<AnyStore>) -> TaskRecord {
        service.create(full_request().to_record()).await.expect("create")
    }

    #[tokio::test]
    async fn create_assigns_id_and_leaves_updated_on_unset() {
        let service = service().await;
        let task = created(&service).await;
        assert!(task.id.is_some());
        assert!(task.updated_on.is_none());
    }

    #[tokio::test]
    async fn get_by_id_missing_is_none() {
        let service = service().await;
        assert!(service.get_by_id(99999).await.expect("query").is_none());
    }

    #[tokio::test]
    async fn list_all_empty_store() {
        let service = service().await;
        assert!(service.list_all().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn replace_clears_absent_fields() {
        let service = service().await;
        let task = created(&service).await;
        let id = task.id.expect("id");

        let replaced = service
            .replace(id, UpdateTaskRequest { title: Some("Renamed".into()), ..Default::default() })
            .await
            .expect("replace");

        assert_eq!(replaced.title.as_deref(), Some("Renamed"));
        assert_eq!(replaced.description, None);
        assert_eq!(replaced.status, None);
        assert_eq!(replaced.assignee, None);
        assert_eq!(replaced.priority, None);
        assert_eq!(replaced.created_on, task.created_on);
        assert!(replaced.updated_on.is_some_and(|u| u >= task.created_on));

        let stored = service.get_by_id(id).await.expect("get").expect("exists");
        assert_eq!(stored, replaced);
    }

    #[tokio::test]
    async fn patch_keeps_absent_fields() {
        let service = service().await;
        let task = created(&service).await;
        let id = task.id.expect("id");

        let patched = service
            .patch(id, UpdateTaskRequest { status: Some("Done".into()), ..Default::default() })
            .await
            .expect("patch");

        assert_eq!(patched.status.as_deref(), Some("Done"));
        assert_eq!(patched.title, task.title);
        assert_eq!(patched.description, task.description);
        assert_eq!(patched.assignee, task.assignee);
        assert_eq!(patched.priority, task.priority);
        assert!(patched.updated_on.is_some_and(|u| u >= task.created_on));
    }

    /// Deletes the row right before every overwrite, as a concurrent DELETE
    /// landing between read and write would.
    struct VanishingStore(AnyStore);

    impl TaskStore for VanishingStore {
        async fn save_task(&self, record: TaskRecord) -> Result<TaskRecord, sqlx::Error> {
            if let Some(id) = record.id {
                self.0.delete_task(id).await?;
            }
            self.0.save_task(record).await
        }

        async fn list_tasks(&self) -> Result<Vec<TaskRecord>, sqlx::Error> {
            self.0.list_tasks().await
        }

        async fn get_task(&self, id: i64) -> Result<Option<TaskRecord>, sqlx::Error> {
            self.0.get_task(id).await
        }

        async fn task_exists(&self, id: i64) -> Result<bool, sqlx::Error> {
            self.0.task_exists(id).await
        }

        async fn delete_task(&self, id: i64) -> Result<(), sqlx::Error> {
            self.0.delete_task(id).await
        }
    }

    #[tokio::test]
    async fn write_after_concurrent_delete_is_not_found() {
        let store = AnyStore::connect("sqlite::memory:", 1)
            .await
            .expect("in-memory store");
        let service = TaskService::new(Arc::new(VanishingStore(store)));

        for full_replace in [true, false] {
            let id = service
                .create(full_request().to_record())
                .await
                .expect("create")
                .id
                .expect("id");
            let result = if full_replace {
                service.replace(id, UpdateTaskRequest::default()).await
            } else {
                service.patch(id, UpdateTaskRequest::default()).await
            };
            let expected = format!("Task with id {id} does not exist.");
            assert!(
                matches!(&result, Err(ServerError::NotFound(m)) if *m == expected),
                "{result:?}"
            );
            assert!(service.get_by_id(id).await.expect("get").is_none());
        }
    }

    #[tokio::test]
    async fn mutations_on_missing_id_are_not_found() {
        let service = service().await;
        let replace = service.replace(99999, UpdateTaskRequest::default()).await;
        let patch = service.patch(99999, UpdateTaskRequest::default()).await;
        let delete = service.delete(99999).await;

        for result in [replace.map(|_| ()), patch.map(|_| ()), delete.map(|_| ())] {
            match result {
                Err(ServerError::NotFound(m)) => {
                    assert_eq!(m, "Task with id 99999 does not exist.")
                }
                other => panic!("expected NotFound, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn delete_twice_fails_second_time() {
        let service = service().await;
        let id = created(&service).await.id.expect("id");

        let message = service.delete(id).await.expect("first delete");
        assert_eq!(message, format!("SUCCESS: Task with id {id} has been deleted."));
        assert!(matches!(service.delete(id).await, Err(ServerError::NotFound(_))));
        assert!(service.get_by_id(id).await.expect("get").is_none());
    }

    #[tokio::test]
    async fn store_failure_is_database_error() {
        let store = Arc::new(
            AnyStore::connect("sqlite::memory:", 1)
                .await
                .expect("in-memory store"),
        );
        store.close().await;
        let service = TaskService::new(store);
        assert!(matches!(service.list_all().await, Err(ServerError::Database(_))));
    }
}
