//! HTTP handlers, grouped by resource.
//!
//! Handlers are generic over the [`Database`](webnovel_core::store::Database)
//! so the same router serves Postgres in production and the in-memory store
//! in tests.

pub mod auth;
pub mod cash;
pub mod catalog;
pub mod contracts;
pub mod engagement;
pub mod episodes;
pub mod gifts;
pub mod me;
pub mod notifications;
pub mod products;
pub mod promotions;

pub use auth::{AuthUser, MaybeUser, VerifiedUser};
