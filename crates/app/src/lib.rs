//! # userbook-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define the **port trait** storage backends implement (driven/outbound):
//!   - `UserRepository` — insert, fetch, ordered listing, replace, delete
//! - Define the **driving/inbound** use-case struct:
//!   - `UserService` — list, create, read, update, delete; the one contract
//!     both HTTP presentations share
//! - Assign identities and encode/decode page tokens, so no adapter has to
//! - Provide an **in-process backend** (`InMemoryUserRepository`) that needs no IO
//!
//! ## Dependency rule
//! Depends on `userbook-domain` only.
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod cursor;
pub mod memory;
pub mod ports;
pub mod services;
