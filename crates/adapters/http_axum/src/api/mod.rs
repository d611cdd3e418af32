//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod users;

use axum::Router;
use axum::routing::get;

use userbook_app::ports::UserRepository;

use crate::state::AppState;

/// Build the JSON sub-router. Mounted under the API base (e.g. `/api/users`).
pub fn routes<R>() -> Router<AppState<R>>
where
    R: UserRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(users::list::<R>).post(users::create::<R>))
        .route(
            "/{id}",
            get(users::get::<R>)
                .put(users::update::<R>)
                .delete(users::delete::<R>),
        )
}
