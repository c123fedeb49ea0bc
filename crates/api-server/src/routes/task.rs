//! Task API endpoints
//!
//! CRUD, status changes, assignment, listing and keyword search.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use taskboard_core::query::{paginate, Page, TaskQuery, TaskSortField};
use taskboard_core::task::{parse_task_id, Task, TaskStatus};

use super::{error_response, json_body, map_core_error, parse_pagination, present, ApiResult};
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ListTasksQuery {
    pub filter_status: Option<String>,
    pub sort_by: Option<String>,
    pub ascending: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchTasksQuery {
    #[serde(default)]
    pub keyword: String,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AssignTaskRequest {
    /// `None` when the field is absent, `Some(None)` for an explicit null
    #[serde(default, deserialize_with = "present")]
    pub user_id: Option<Option<u64>>,
}

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub created_at: String,
    pub assigned_user_id: Option<u64>,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            status: task.status,
            created_at: task.created_at.to_rfc3339(),
            assigned_user_id: task.assigned_user_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TaskListResponse {
    pub tasks: Vec<TaskResponse>,
    pub total_tasks: usize,
    pub total_pages: usize,
    pub current_page: usize,
    pub page_size: usize,
}

impl From<Page<Task>> for TaskListResponse {
    fn from(page: Page<Task>) -> Self {
        Self {
            tasks: page.items.into_iter().map(TaskResponse::from).collect(),
            total_tasks: page.total_items,
            total_pages: page.total_pages,
            current_page: page.page,
            page_size: page.page_size,
        }
    }
}

impl ListTasksQuery {
    fn to_task_query(&self) -> ApiResult<TaskQuery> {
        let status = self
            .filter_status
            .as_deref()
            .map(|raw| {
                raw.parse::<TaskStatus>().map_err(|_| {
                    error_response(
                        StatusCode::BAD_REQUEST,
                        "Invalid filter_status. Allowed values: TODO, ONGOING, DONE",
                    )
                })
            })
            .transpose()?;

        let sort_by = match self.sort_by.as_deref() {
            Some(raw) => raw.parse::<TaskSortField>().map_err(map_core_error)?,
            None => TaskSortField::default(),
        };

        let ascending = self
            .ascending
            .as_deref()
            .is_some_and(|raw| raw.eq_ignore_ascii_case("true"));

        Ok(TaskQuery {
            status,
            sort_by,
            ascending,
        })
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /tasks - Filtered, sorted, paginated listing
async fn list_tasks(
    State(state): State<AppState>,
    Query(params): Query<ListTasksQuery>,
) -> ApiResult<Json<TaskListResponse>> {
    let query = params.to_task_query()?;
    let (page, page_size) = parse_pagination(params.page.as_deref(), params.page_size.as_deref())?;

    let tasks = query.apply(state.task_store().list().await);
    let page = paginate(tasks, page, page_size).map_err(map_core_error)?;
    Ok(Json(page.into()))
}

/// GET /tasks/search - Keyword search
async fn search_tasks(
    State(state): State<AppState>,
    Query(params): Query<SearchTasksQuery>,
) -> ApiResult<Json<TaskListResponse>> {
    let (page, page_size) = parse_pagination(params.page.as_deref(), params.page_size.as_deref())?;

    let tasks = state.task_store().search(&params.keyword).await;
    let page = paginate(tasks, page, page_size).map_err(map_core_error)?;
    Ok(Json(page.into()))
}

/// POST /tasks - Create a new task
async fn create_task(
    State(state): State<AppState>,
    body: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    let req = json_body(body)?;
    let created = state
        .task_store()
        .add(&req.title, req.description.as_deref().unwrap_or_default())
        .await
        .map_err(map_core_error)?;

    Ok((StatusCode::CREATED, Json(TaskResponse::from(created))))
}

/// GET /tasks/{id} - Get a single task
async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<TaskResponse>> {
    let id = parse_task_id(&id).map_err(map_core_error)?;
    let task = state.task_store().get_by_id(id).await.map_err(map_core_error)?;
    Ok(Json(task.into()))
}

/// PUT /tasks/{id} - Replace title and/or description
async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> ApiResult<Json<TaskResponse>> {
    let id = parse_task_id(&id).map_err(map_core_error)?;
    let req = json_body(body)?;
    if req.title.is_none() && req.description.is_none() {
        return Err(error_response(StatusCode::BAD_REQUEST, "Missing JSON body"));
    }

    let updated = state
        .task_store()
        .update(id, req.title.as_deref(), req.description.as_deref())
        .await
        .map_err(map_core_error)?;
    Ok(Json(updated.into()))
}

/// PATCH /tasks/{id}/status - Change status
async fn update_task_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> ApiResult<Json<TaskResponse>> {
    let id = parse_task_id(&id).map_err(map_core_error)?;
    let status = json_body(body)?.status.ok_or_else(|| {
        error_response(
            StatusCode::BAD_REQUEST,
            "Missing 'status' field in request body",
        )
    })?;

    let updated = state
        .task_store()
        .update_status(id, &status)
        .await
        .map_err(map_core_error)?;
    Ok(Json(updated.into()))
}

/// PATCH /tasks/{id}/assign - Assign to a user, or unassign with null
async fn assign_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<AssignTaskRequest>, JsonRejection>,
) -> ApiResult<Json<TaskResponse>> {
    let id = parse_task_id(&id).map_err(map_core_error)?;
    let user_id = json_body(body)?.user_id.ok_or_else(|| {
        error_response(
            StatusCode::BAD_REQUEST,
            "Missing 'user_id' in request body",
        )
    })?;

    let updated = state
        .task_store()
        .assign(id, user_id, state.user_store())
        .await
        .map_err(map_core_error)?;
    Ok(Json(updated.into()))
}

/// DELETE /tasks/{id} - Delete a task
async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_task_id(&id).map_err(map_core_error)?;
    state.task_store().delete(id).await.map_err(map_core_error)?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Router
// ============================================================================

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/search", get(search_tasks))
        .route(
            "/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/tasks/{id}/status", patch(update_task_status))
        .route("/tasks/{id}/assign", patch(assign_task))
}
