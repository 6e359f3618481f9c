use utoipa::OpenApi;

use crate::routes::{health, tasks};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "taskflow-server",
        description = "Task tracking REST API",
        version = "0.1.0"
    ),
    tags(
        (name = "tasks", description = "Create, read, replace, patch and delete tasks"),
        (name = "health", description = "Liveness probe")
    )
)]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(health::HealthApi::openapi());
    root.merge(tasks::TasksApi::openapi());
    root
}
