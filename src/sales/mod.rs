//! Filtering and aggregation of sales transactions.
//!
//! [`Filter`] is the filter-criteria value, [`Kpis`] and [`aggregate`] are the reductions, and
//! [`SalesStore`] bundles a collection with a filter for callers that want a stateful view.

mod aggregate;
mod filter;
mod scope;
mod store;

pub use aggregate::{aggregate, Bucket, Granularity, Kpis, DEFAULT_CURRENCY};
pub use filter::{Dated, Filter, Filtered, Scope};
pub use scope::{counterparties, Counterparty};
pub use store::SalesStore;
