//! # userbook-domain
//!
//! Pure domain model for the userbook service.
//!
//! ## Responsibilities
//! - Foundational types: the typed [`UserId`](id::UserId) and error conventions
//! - Define **Users** (an identity plus an open set of scalar fields)
//! - Define **Drafts** (the id-less payload callers submit on create/update)
//! - Define the **pagination vocabulary** (page size, opaque page token, page)
//! - Normalize every failure into a transport-neutral report
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod page;
pub mod user;
