//! Types that represent the data model: transactions, amounts, dates and periods.
mod amount;
mod date;
mod period;
mod transaction;

pub use amount::{Amount, AmountError};
pub use date::parse_transaction_date;
pub use period::{parse_bound, Bound, Period};
pub use transaction::{DataFormat, SalesTransaction, Transactions};
