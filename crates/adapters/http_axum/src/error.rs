//! Error forwarding and the shared error boundary.
//!
//! Handlers never build error responses themselves. [`ApiError`] and
//! [`PageError`] wrap the one canonical [`UserbookError`] and tag it with a
//! presentation [`Profile`]; their `IntoResponse` only attaches a
//! [`ForwardedError`] to an otherwise empty response. The [`boundary`]
//! middleware, installed once on the top-level router, picks the status code,
//! logs, normalizes the error into an [`ErrorReport`], and renders it in the
//! requested profile.

use std::sync::Arc;

use askama::Template;
use axum::Json;
use axum::extract::Request;
use axum::extract::rejection::{FormRejection, JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{Html, IntoResponse, Response};

use userbook_domain::error::{ErrorKind, ErrorReport, UserbookError, ValidationError};

/// How a normalized error is shown to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// `{"message": ..., "internalCode": ...}` as JSON.
    Structured,
    /// The message alone, inside an HTML page.
    Flattened,
}

/// Error attached to a response for the boundary to finish.
#[derive(Debug, Clone)]
pub struct ForwardedError {
    pub error: Arc<UserbookError>,
    pub profile: Profile,
}

impl ForwardedError {
    fn into_placeholder(self) -> Response {
        let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
        response.extensions_mut().insert(self);
        response
    }
}

/// Error page template for the flattened profile.
#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate<'a> {
    message: &'a str,
}

impl Profile {
    /// Render a normalized report in this profile.
    fn present(self, report: ErrorReport) -> Response {
        match self {
            Self::Structured => Json(report).into_response(),
            Self::Flattened => {
                let rendered = ErrorTemplate {
                    message: &report.message,
                }
                .render();
                match rendered {
                    Ok(html) => Html(html).into_response(),
                    Err(err) => {
                        tracing::error!(error = %err, "failed to render error page");
                        report.message.into_response()
                    }
                }
            }
        }
    }
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Storage => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Top-level error boundary middleware.
///
/// Responses without a [`ForwardedError`] pass through untouched.
pub async fn boundary(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let mut response = next.run(request).await;
    let Some(forwarded) = response.extensions_mut().remove::<ForwardedError>() else {
        return response;
    };

    let error = forwarded.error.as_ref();
    let status = status_for(error.kind());
    match error.kind() {
        ErrorKind::Storage => {
            tracing::error!(%method, %uri, error = ?error, "request failed");
        }
        ErrorKind::Validation | ErrorKind::NotFound => {
            tracing::warn!(%method, %uri, %status, error = %error, "request rejected");
        }
    }

    let mut response = forwarded.profile.present(error.report());
    *response.status_mut() = status;
    response
}

/// Error from a JSON API handler, presented as a structured body.
#[derive(Debug)]
pub struct ApiError(UserbookError);

impl From<UserbookError> for ApiError {
    fn from(err: UserbookError) -> Self {
        Self(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self(err.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::from(ValidationError::MalformedBody(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::from(ValidationError::MalformedBody(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        ForwardedError {
            error: Arc::new(self.0),
            profile: Profile::Structured,
        }
        .into_placeholder()
    }
}

/// Error from an HTML page handler, presented as a flattened message.
#[derive(Debug)]
pub struct PageError(UserbookError);

impl From<UserbookError> for PageError {
    fn from(err: UserbookError) -> Self {
        Self(err)
    }
}

impl From<ValidationError> for PageError {
    fn from(err: ValidationError) -> Self {
        Self(err.into())
    }
}

impl From<FormRejection> for PageError {
    fn from(rejection: FormRejection) -> Self {
        Self::from(ValidationError::MalformedBody(rejection.body_text()))
    }
}

impl From<QueryRejection> for PageError {
    fn from(rejection: QueryRejection) -> Self {
        Self::from(ValidationError::MalformedBody(rejection.body_text()))
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        ForwardedError {
            error: Arc::new(self.0),
            profile: Profile::Flattened,
        }
        .into_placeholder()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::header::CONTENT_TYPE;
    use axum::middleware;
    use axum::routing::get;
    use tower::ServiceExt;
    use userbook_domain::error::{NotFoundError, StorageFailure};

    fn app() -> Router {
        Router::new()
            .route(
                "/api",
                get(|| async {
                    Err::<(), _>(ApiError::from(ValidationError::IdNotAssignable))
                }),
            )
            .route(
                "/page",
                get(|| async {
                    Err::<(), _>(PageError::from(UserbookError::from(NotFoundError {
                        entity: "User",
                        id: "abc".to_string(),
                    })))
                }),
            )
            .route(
                "/broken",
                get(|| async {
                    let io = std::io::Error::other("disk full");
                    Err::<(), _>(ApiError::from(UserbookError::from(StorageFailure::new(io))))
                }),
            )
            .route("/fine", get(|| async { "fine" }))
            .layer(middleware::from_fn(boundary))
    }

    async fn call(uri: &str) -> Response {
        app()
            .oneshot(
                axum::http::Request::builder()
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn should_render_structured_profile_as_json() {
        let response = call("/api").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.extensions().get::<ForwardedError>().is_none());

        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "message": "id is assigned by the store and cannot be supplied",
                "internalCode": "id_not_assignable",
            })
        );
    }

    #[tokio::test]
    async fn should_render_flattened_profile_as_html_message() {
        let response = call("/page").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let content_type = response.headers()[CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.starts_with("text/html"));

        let body = body_text(response).await;
        assert!(body.contains("User abc not found"));
        assert!(!body.contains("internalCode"));
    }

    #[tokio::test]
    async fn should_map_storage_errors_to_500_without_leaking_source() {
        let response = call("/broken").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_text(response).await;
        assert!(body.contains("storage error"));
        assert!(!body.contains("disk full"));
    }

    #[tokio::test]
    async fn should_pass_successful_responses_through() {
        let response = call("/fine").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "fine");
    }
}
