//! User API endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use taskboard_core::query::{paginate, sort_users_by_name, Page};
use taskboard_core::user::{parse_user_id, User};

use super::{json_body, map_core_error, parse_pagination, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub page: Option<String>,
    pub page_size: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<UserResponse>,
    pub total_users: usize,
    pub total_pages: usize,
    pub current_page: usize,
    pub page_size: usize,
}

impl From<Page<User>> for UserListResponse {
    fn from(page: Page<User>) -> Self {
        Self {
            users: page.items.into_iter().map(UserResponse::from).collect(),
            total_users: page.total_items,
            total_pages: page.total_pages,
            current_page: page.page,
            page_size: page.page_size,
        }
    }
}

/// POST /users - Create a user
async fn create_user(
    State(state): State<AppState>,
    body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let req = json_body(body)?;
    let user = state
        .user_store()
        .create(&req.name, &req.email)
        .await
        .map_err(map_core_error)?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// GET /users - Users sorted by name, paginated
async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<ListUsersQuery>,
) -> ApiResult<Json<UserListResponse>> {
    let (page, page_size) = parse_pagination(params.page.as_deref(), params.page_size.as_deref())?;

    let mut users = state.user_store().list().await;
    sort_users_by_name(&mut users);
    let page = paginate(users, page, page_size).map_err(map_core_error)?;
    Ok(Json(page.into()))
}

/// GET /users/{id} - Get a single user
async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<UserResponse>> {
    let id = parse_user_id(&id).map_err(map_core_error)?;
    let user = state.user_store().get_by_id(id).await.map_err(map_core_error)?;
    Ok(Json(user.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", get(get_user))
}
