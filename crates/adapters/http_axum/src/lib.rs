//! # userbook-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a **REST-ish JSON API** for programmatic access (`/api/users` by default)
//! - Serve **server-side-rendered HTML pages** that work with **zero JavaScript**,
//!   pure HTML forms and links (`/users` by default)
//! - Map HTTP requests into calls on the one shared `UserService` (driving adapter)
//! - Map results into HTTP responses (JSON, HTML, or redirects)
//! - Forward every failure to a single error boundary that picks the status
//!   code, logs, and renders the body in the caller's presentation profile
//!
//! ## No-JS approach
//! - Every page is rendered server-side as complete HTML (askama templates).
//! - Create and edit are `<form>` POSTs answered with a redirect (PRG pattern).
//! - Pagination is a plain link carrying the next page token.
//!
//! ## Dependency rule
//! Depends on `userbook-app` (for port traits and services) and `userbook-domain`
//! (for domain types used in request/response mapping). Never leaks axum types
//! into the domain.

pub mod api;
pub mod dashboard;
pub mod error;
pub mod router;
pub mod state;
