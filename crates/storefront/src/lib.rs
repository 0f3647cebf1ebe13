//! Relux Storefront library.
//!
//! Client side of the Relux luxury-watch storefront: the REST client,
//! durable session storage, cart operations, debounced search and the
//! application shell that performs the effects computed by `relux-core`.
//!
//! # Modules
//!
//! - [`config`] - Configuration from environment variables
//! - [`api`] - Relux REST API client
//! - [`storage`] - Durable key-value storage
//! - [`session`] - Session persistence
//! - [`cart`] - Cart operations
//! - [`search`] - Debounced search coordination
//! - [`shell`] - Application shell
//! - [`error`] - Error type and Sentry helpers
//! - [`telemetry`] - Tracing and Sentry setup

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod config;
pub mod error;
pub mod search;
pub mod session;
pub mod shell;
pub mod storage;
pub mod telemetry;

pub use api::{ApiClient, ApiError};
pub use config::StorefrontConfig;
pub use error::ClientError;
pub use shell::Storefront;
