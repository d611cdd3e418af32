//! Shared application state for axum handlers.

use std::sync::Arc;

use userbook_app::ports::UserRepository;
use userbook_app::services::user_service::UserService;
use userbook_domain::page::PageSize;

/// Application state shared across all axum handlers.
///
/// Generic over the repository type to avoid dynamic dispatch. Both the JSON
/// API and the HTML pages hold the same service instance. `Clone` is
/// implemented manually so the repository itself does not need to be `Clone`.
pub struct AppState<R> {
    /// User CRUD and listing service.
    pub user_service: Arc<UserService<R>>,
    /// Number of users per listing page, for both presentations.
    pub page_size: PageSize,
}

impl<R> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            user_service: Arc::clone(&self.user_service),
            page_size: self.page_size,
        }
    }
}

impl<R> AppState<R>
where
    R: UserRepository + Send + Sync + 'static,
{
    /// Create a new application state from a service instance.
    pub fn new(user_service: UserService<R>, page_size: PageSize) -> Self {
        Self::from_arc(Arc::new(user_service), page_size)
    }

    /// Create a new application state from a pre-wrapped `Arc` service.
    ///
    /// Use this when the service is also shared outside the HTTP layer.
    pub fn from_arc(user_service: Arc<UserService<R>>, page_size: PageSize) -> Self {
        Self {
            user_service,
            page_size,
        }
    }
}
