//! # Retail Analytics Engine
//!
//! The reporting core of the workspace: inventory health, sales and profitability, and
//! customer behaviour, all computed from one in-memory `Snapshot` of the shop's records.
//!
//! ## Architectural Principles
//!
//! - **Pure logic:** no I/O and no runtime. Inputs are `core-types` records, tunables come
//!   from `configuration::Settings`, outputs are plain row structs from `report`.
//! - **Stateless calculation:** `AnalyticsEngine` only holds its settings. Every report is
//!   a `&self` method over a `&Snapshot`, so the same inputs always produce the same rows.
//! - **Exact money:** amounts are `Decimal` and rounded half away from zero at the edge
//!   (`money`).
//!
//! ## Public API
//!
//! - `Snapshot`: validated, indexed input tables.
//! - `AnalyticsEngine`: the report methods (`inventory`, `sales`, `customers`).
//! - `report`: the result row types.
//! - `AnalyticsError`: the error type of this crate.

pub mod customers;
pub mod engine;
pub mod error;
pub mod inventory;
pub mod money;
pub mod report;
pub mod sales;
pub mod snapshot;
pub mod window;

#[cfg(test)]
mod fixtures;

pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use report::*;
pub use snapshot::Snapshot;
