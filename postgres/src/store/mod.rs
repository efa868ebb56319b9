//! Store trait implementations for [`PostgresTransaction`](crate::PostgresTransaction).
//!
//! Queries are built at runtime (no offline query cache) and decoded through
//! [`crate::rows`]. Every method runs on the transaction's connection.

mod account;
mod catalog;
mod contract;
mod engagement;
mod gift;
mod ledger;
mod library;
mod notification;
mod promotion;
mod ticket;

