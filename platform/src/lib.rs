//! Monetization and engagement backend of the web-novel platform.
//!
//! - [`services`]: component services (ledger, inventory, gift box,
//!   promotions, library, engagement, contracts, notifications, composer)
//!   generic over the store traits in `webnovel_core::store`
//! - [`app::Platform`]: the command facade; one transaction per command
//! - [`api`] and [`server`]: the axum surface over the facade
//! - [`identity`]: bearer-token introspection against the external provider
//! - [`config`]: environment configuration

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod app;
pub mod config;
pub mod identity;
pub mod server;
pub mod services;

pub use app::Platform;
