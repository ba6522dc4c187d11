//! Filtering and aggregation of merchant sales transactions into KPIs and daily, monthly and
//! annual buckets.
//!
//! The core is pure: [`sales::Filter`] describes which transactions to keep, and the reductions in
//! [`sales`] turn the kept rows into totals. [`sales::SalesStore`] bundles a collection with a
//! filter. The remaining modules load data from a configured home directory and drive the `sales`
//! CLI.

pub mod args;
pub mod commands;
mod config;
mod error;
pub mod model;
pub mod render;
pub mod sales;
mod utils;

#[cfg(test)]
mod test;

pub use config::Config;
pub use error::{Error, ErrorType, Result};
