//! HTML pages for users.
//!
//! Redirect targets are built from the [`NestedPath`] the router was mounted
//! at, so the pages work under any base path.

use askama::Template;
use axum::extract::rejection::{FormRejection, QueryRejection};
use axum::extract::{Form, NestedPath, Path, Query, State};
use axum::response::{IntoResponse, Redirect, Response};

use userbook_app::ports::UserRepository;
use userbook_domain::error::ValidationError;
use userbook_domain::page::PageToken;
use userbook_domain::user::{User, UserDraft};

use super::render;
use crate::api::users::ListQuery;
use crate::error::PageError;
use crate::state::AppState;

/// Form key naming a field to add.
pub const NEW_FIELD_NAME: &str = "_new_field_name";
/// Form key carrying the value of the field to add.
pub const NEW_FIELD_VALUE: &str = "_new_field_value";

/// One line of the user list.
pub struct UserRow {
    pub id: String,
    pub summary: String,
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        let summary = user
            .fields
            .iter()
            .map(|(name, value)| format!("{name}: {value}"))
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            id: user.id.to_string(),
            summary,
        }
    }
}

/// One field as displayed on the detail page or in the form.
pub struct FieldRow {
    pub name: String,
    pub value: String,
}

fn field_rows(user: &User) -> Vec<FieldRow> {
    user.fields
        .iter()
        .map(|(name, value)| FieldRow {
            name: name.clone(),
            value: value.to_string(),
        })
        .collect()
}

/// User list page template.
#[derive(Template)]
#[template(path = "user_list.html")]
pub struct UserListTemplate {
    base: String,
    rows: Vec<UserRow>,
    next_page_token: Option<String>,
}

impl IntoResponse for UserListTemplate {
    fn into_response(self) -> Response {
        render(&self)
    }
}

/// User detail page template.
#[derive(Template)]
#[template(path = "user_detail.html")]
pub struct UserDetailTemplate {
    base: String,
    id: String,
    fields: Vec<FieldRow>,
}

impl IntoResponse for UserDetailTemplate {
    fn into_response(self) -> Response {
        render(&self)
    }
}

/// Add/edit form template.
#[derive(Template)]
#[template(path = "user_form.html")]
pub struct UserFormTemplate {
    base: String,
    action: &'static str,
    target: String,
    fields: Vec<FieldRow>,
    new_name_key: &'static str,
    new_value_key: &'static str,
}

impl UserFormTemplate {
    fn new(base: &str, action: &'static str, target: String, fields: Vec<FieldRow>) -> Self {
        Self {
            base: base.to_string(),
            action,
            target,
            fields,
            new_name_key: NEW_FIELD_NAME,
            new_value_key: NEW_FIELD_VALUE,
        }
    }
}

impl IntoResponse for UserFormTemplate {
    fn into_response(self) -> Response {
        render(&self)
    }
}

/// Response from the form and delete handlers (PRG pattern).
pub enum FormResponse {
    Redirect(Redirect),
}

impl IntoResponse for FormResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Redirect(redirect) => redirect.into_response(),
        }
    }
}

/// Turn submitted form pairs into a draft.
///
/// Blank values are dropped, which is how a field is removed from the form.
/// The extra name/value pair adds one new field.
fn draft_from_form(pairs: Vec<(String, String)>) -> Result<UserDraft, ValidationError> {
    let mut new_name = String::new();
    let mut new_value = String::new();
    let mut fields = Vec::with_capacity(pairs.len());

    for (name, value) in pairs {
        match name.as_str() {
            NEW_FIELD_NAME => new_name = value,
            NEW_FIELD_VALUE => new_value = value,
            _ if value.is_empty() => {}
            _ => fields.push((name, value)),
        }
    }
    if !new_name.trim().is_empty() && !new_value.is_empty() {
        fields.push((new_name, new_value));
    }

    UserDraft::from_form(fields)
}

/// `GET /users?pageToken=...` — one page of users.
pub async fn list<R>(
    State(state): State<AppState<R>>,
    nested: NestedPath,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<UserListTemplate, PageError>
where
    R: UserRepository + Send + Sync + 'static,
{
    let Query(query) = query?;
    let token = PageToken::from_raw(query.page_token);
    let page = state
        .user_service
        .list(state.page_size, token.as_ref())
        .await?;

    Ok(UserListTemplate {
        base: nested.as_str().to_string(),
        rows: page.items.iter().map(UserRow::from).collect(),
        next_page_token: page.next_page_token.map(|token| token.to_string()),
    })
}

/// `GET /users/add` — empty form.
pub async fn add_form(nested: NestedPath) -> UserFormTemplate {
    let base = nested.as_str();
    UserFormTemplate::new(base, "Add", format!("{base}/add"), Vec::new())
}

/// `POST /users/add` — create, then redirect to the new user (PRG).
pub async fn add<R>(
    State(state): State<AppState<R>>,
    nested: NestedPath,
    form: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> Result<FormResponse, PageError>
where
    R: UserRepository + Send + Sync + 'static,
{
    let Form(pairs) = form?;
    let draft = draft_from_form(pairs)?;
    let created = state.user_service.create(draft).await?;

    Ok(FormResponse::Redirect(Redirect::to(&format!(
        "{}/{}",
        nested.as_str(),
        created.id
    ))))
}

/// `GET /users/:id/edit` — form pre-filled with the current fields.
pub async fn edit_form<R>(
    State(state): State<AppState<R>>,
    nested: NestedPath,
    Path(id): Path<String>,
) -> Result<UserFormTemplate, PageError>
where
    R: UserRepository + Send + Sync + 'static,
{
    let user = state.user_service.read(&id).await?;
    let base = nested.as_str();

    Ok(UserFormTemplate::new(
        base,
        "Edit",
        format!("{base}/{}/edit", user.id),
        field_rows(&user),
    ))
}

/// `POST /users/:id/edit` — replace, then redirect to the user (PRG).
pub async fn edit<R>(
    State(state): State<AppState<R>>,
    nested: NestedPath,
    Path(id): Path<String>,
    form: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> Result<FormResponse, PageError>
where
    R: UserRepository + Send + Sync + 'static,
{
    let Form(pairs) = form?;
    let draft = draft_from_form(pairs)?;
    let updated = state.user_service.update(&id, draft).await?;

    Ok(FormResponse::Redirect(Redirect::to(&format!(
        "{}/{}",
        nested.as_str(),
        updated.id
    ))))
}

/// `GET /users/:id` — user detail.
pub async fn detail<R>(
    State(state): State<AppState<R>>,
    nested: NestedPath,
    Path(id): Path<String>,
) -> Result<UserDetailTemplate, PageError>
where
    R: UserRepository + Send + Sync + 'static,
{
    let user = state.user_service.read(&id).await?;

    Ok(UserDetailTemplate {
        base: nested.as_str().to_string(),
        id: user.id.to_string(),
        fields: field_rows(&user),
    })
}

/// `GET /users/:id/delete` — delete, then redirect to the list.
pub async fn delete<R>(
    State(state): State<AppState<R>>,
    nested: NestedPath,
    Path(id): Path<String>,
) -> Result<FormResponse, PageError>
where
    R: UserRepository + Send + Sync + 'static,
{
    state.user_service.delete(&id).await?;
    Ok(FormResponse::Redirect(Redirect::to(nested.as_str())))
}
