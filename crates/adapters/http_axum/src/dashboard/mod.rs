//! Server-side rendered HTML pages (no JavaScript).

#[allow(clippy::missing_errors_doc)]
pub mod users;

use askama::Template;
use axum::Router;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use tower_http::set_header::SetResponseHeaderLayer;

use userbook_app::ports::UserRepository;

use crate::state::AppState;

/// Build the HTML sub-router. Mounted under the page base (e.g. `/users`).
///
/// Every response defaults to `text/html`, redirects included.
pub fn routes<R>() -> Router<AppState<R>>
where
    R: UserRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(users::list::<R>))
        .route("/add", get(users::add_form).post(users::add::<R>))
        .route("/{id}", get(users::detail::<R>))
        .route(
            "/{id}/edit",
            get(users::edit_form::<R>).post(users::edit::<R>),
        )
        .route("/{id}/delete", get(users::delete::<R>))
        .layer(SetResponseHeaderLayer::if_not_present(
            CONTENT_TYPE,
            HeaderValue::from_static("text/html; charset=utf-8"),
        ))
}

/// Render a page template, turning a template failure into a bare 500.
fn render(template: &impl Template) -> Response {
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "failed to render page");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
