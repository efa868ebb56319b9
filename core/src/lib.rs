//! # Webnovel Core
//!
//! Domain types, business rules and storage traits for the serialized
//! web-novel platform backend.
//!
//! This crate has no I/O. It provides:
//!
//! - **Types**: entities, identifiers and tag enums for every table
//! - **Errors**: the error taxonomy and the stable wire codes of the API
//! - **Environment**: the `Clock` abstraction injected into services
//! - **Calendar**: ISO-week arithmetic in the platform's time zone
//! - **Rules**: pure decision functions (ticket selection, gift expiry,
//!   interest decay, promotion and contract-offer state machines, reactions)
//! - **Store**: the transactional storage traits implemented by the
//!   `PostgreSQL` crate and the in-memory test database
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │  platform (HTTP + command services)      │
//! ├──────────────────────────────────────────┤
//! │  core::rules   (pure decisions)          │
//! │  core::store   (Database / Transaction)  │
//! ├──────────────────────────────────────────┤
//! │  postgres  |  testing::InMemoryDatabase  │
//! └──────────────────────────────────────────┘
//! ```
//!
//! Services read the clock once per operation, then pass `now` down to the
//! rules and the store. Storage never consults its own clock, so weekly
//! windows and expirations are reproducible in tests.

pub mod calendar;
pub mod environment;
pub mod error;
pub mod rules;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use error::{ErrorCode, ErrorKind, PlatformError, PlatformResult};
