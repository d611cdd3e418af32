//! JSON REST handlers for users.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::{Map, Value};

use userbook_app::ports::UserRepository;
use userbook_domain::page::{Page, PageToken};
use userbook_domain::user::{User, UserDraft};

use crate::error::ApiError;
use crate::state::AppState;

/// Query string of the list endpoint.
#[derive(Deserialize)]
pub struct ListQuery {
    #[serde(rename = "pageToken")]
    pub page_token: Option<String>,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Page<User>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get, create and update endpoints.
pub enum UserResponse {
    Ok(Json<User>),
}

impl IntoResponse for UserResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the delete endpoint.
pub enum DeleteResponse {
    Ok,
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok => StatusCode::OK.into_response(),
        }
    }
}

/// `GET /api/users?pageToken=...`
pub async fn list<R>(
    State(state): State<AppState<R>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<ListResponse, ApiError>
where
    R: UserRepository + Send + Sync + 'static,
{
    let Query(query) = query?;
    let token = PageToken::from_raw(query.page_token);
    let page = state
        .user_service
        .list(state.page_size, token.as_ref())
        .await?;
    Ok(ListResponse::Ok(Json(page)))
}

/// `POST /api/users`
pub async fn create<R>(
    State(state): State<AppState<R>>,
    body: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<UserResponse, ApiError>
where
    R: UserRepository + Send + Sync + 'static,
{
    let Json(body) = body?;
    let draft = UserDraft::from_json(body)?;
    let created = state.user_service.create(draft).await?;
    Ok(UserResponse::Ok(Json(created)))
}

/// `GET /api/users/:id`
pub async fn get<R>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
) -> Result<UserResponse, ApiError>
where
    R: UserRepository + Send + Sync + 'static,
{
    let user = state.user_service.read(&id).await?;
    Ok(UserResponse::Ok(Json(user)))
}

/// `PUT /api/users/:id`
pub async fn update<R>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
    body: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<UserResponse, ApiError>
where
    R: UserRepository + Send + Sync + 'static,
{
    let Json(body) = body?;
    let draft = UserDraft::from_json(body)?;
    let updated = state.user_service.update(&id, draft).await?;
    Ok(UserResponse::Ok(Json(updated)))
}

/// `DELETE /api/users/:id`
pub async fn delete<R>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
) -> Result<DeleteResponse, ApiError>
where
    R: UserRepository + Send + Sync + 'static,
{
    state.user_service.delete(&id).await?;
    Ok(DeleteResponse::Ok)
}
