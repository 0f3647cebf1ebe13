//! Relux Core - Shared types and state transitions.
//!
//! This crate is the client-side model of the Relux storefront, shared by:
//! - `relux-storefront` - API client, session persistence and the application shell
//! - `relux-cli` - Terminal front end driving the shell
//!
//! # Architecture
//!
//! The core crate contains only types and pure transition functions - no I/O,
//! no storage access, no HTTP clients. Every state change goes through
//! [`state::reduce`], which returns the side effects the shell must perform.
//!
//! # Modules
//!
//! - [`types`] - IDs, prices, products, cart snapshots, orders and forms
//! - [`route`] - Hash-fragment routing
//! - [`filters`] - Search/filter record shared by the shop and header
//! - [`catalog`] - Brand grouping for the unfiltered shop listing
//! - [`overlay`] - The single active modal
//! - [`cart`] - Cart fetch state machine
//! - [`session`] - Authenticated session
//! - [`state`] - Application state container, actions and effects

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod filters;
pub mod overlay;
pub mod route;
pub mod session;
pub mod state;
pub mod types;

pub use cart::CartState;
pub use filters::{SearchFilters, SortOrder};
pub use overlay::Overlay;
pub use route::Route;
pub use session::Session;
pub use state::{Action, AppState, Effect, Notice, NoticeLevel, reduce};
pub use types::*;
