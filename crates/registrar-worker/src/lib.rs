//! Registration vetting service.
//!
//! Requesters submit identity and institution details, staff review the pending queue,
//! and approving a request mails the requester a registration link. The core is
//! target-independent: on wasm32 the Worker serves it over D1, elsewhere [`server`]
//! serves it with axum over SQLite.

pub mod api;
pub mod brevo;
pub mod config;
pub mod error;
pub mod logging;
pub mod notify;
pub mod service;
pub mod store;
pub mod submission;

#[cfg(not(target_arch = "wasm32"))]
pub mod db;
#[cfg(not(target_arch = "wasm32"))]
pub mod server;

#[cfg(target_arch = "wasm32")]
mod worker_wasm;

#[cfg(target_arch = "wasm32")]
pub use worker_wasm::*;

pub use entity::verification_request::Model as VerificationRequest;
