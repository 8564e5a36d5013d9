use utoipa::OpenApi;

pub const TASK_TAG: &str = "Tasks";
pub const HEALTH_TAG: &str = "Health";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Chime",
        description = "A task scheduling service for one-time and recurring tasks",
    ),
    components(
        schemas(
            crate::api::dto::ErrorResponse,
        )
    ),
    tags(
        (name = TASK_TAG, description = "Task scheduling endpoints"),
        (name = HEALTH_TAG, description = "Health check endpoints"),
    )
)]
pub struct ApiDoc;
