//! Axum router assembly.

use axum::Router;
use axum::middleware;
use axum::response::Redirect;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use userbook_app::ports::UserRepository;

use crate::error;
use crate::state::AppState;

/// Base paths the two presentations are mounted at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mounts {
    /// Base of the JSON API.
    pub api: String,
    /// Base of the HTML pages.
    pub html: String,
}

impl Default for Mounts {
    fn default() -> Self {
        Self {
            api: "/api/users".to_string(),
            html: "/users".to_string(),
        }
    }
}

/// Build the top-level axum [`Router`].
///
/// Nests the JSON API and the HTML pages under their [`Mounts`], redirects
/// `/` to the HTML pages, and installs the shared error boundary plus a
/// [`TraceLayer`] that logs each HTTP request/response at the `DEBUG` level.
pub fn build<R>(state: AppState<R>, mounts: &Mounts) -> Router
where
    R: UserRepository + Send + Sync + 'static,
{
    let home = mounts.html.clone();

    Router::new()
        .route("/health", get(health_check))
        .route(
            "/",
            get(move || {
                let home = home.clone();
                async move { Redirect::to(&home) }
            }),
        )
        .nest(&mounts.api, crate::api::routes())
        .nest(&mounts.html, crate::dashboard::routes())
        .layer(middleware::from_fn(error::boundary))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
