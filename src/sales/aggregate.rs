//! KPI and time-bucket reductions over a filtered transaction set.
//!
//! All reductions go through [`Totals`], so the KPI sums and the sums of the buckets at any
//! granularity are computed the same way and always agree.

use crate::model::{Amount, SalesTransaction};
use crate::sales::filter::{Dated, Filtered};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Reported when there are no rows to take a currency from.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Running sums of sales, fees and row count.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
struct Totals {
    sales_amount: Amount,
    fee_amount: Amount,
    transaction_count: u64,
}

impl Totals {
    fn add(&mut self, transaction: &SalesTransaction) {
        self.sales_amount = self.sales_amount.saturating_add(transaction.sales_amount());
        self.fee_amount = self.fee_amount.saturating_add(transaction.fee_amount());
        self.transaction_count += 1;
    }
}

/// Summary totals over a filtered set.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Kpis {
    pub sales_amount: Amount,
    pub fee_amount: Amount,
    pub transaction_count: u64,
    /// Taken from the first row. Rows are not checked for a common currency.
    pub currency: String,
}

impl Kpis {
    /// Sums the filtered rows. `default_currency` is reported when there are none.
    pub fn compute(filtered: &Filtered<'_>, default_currency: &str) -> Self {
        let mut totals = Totals::default();
        filtered.transactions().for_each(|t| totals.add(t));
        let currency = filtered
            .transactions()
            .next()
            .map_or(default_currency, |t| t.currency())
            .to_string();
        Self {
            sales_amount: totals.sales_amount,
            fee_amount: totals.fee_amount,
            transaction_count: totals.transaction_count,
            currency,
        }
    }
}

/// The time granularity of an aggregation.
#[derive(
    Debug,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// One bucket per calendar day, keyed `YYYY-MM-DD`.
    #[default]
    Daily,
    /// One bucket per calendar month, keyed `YYYY-MM`.
    Monthly,
    /// One bucket per calendar year, keyed `YYYY`.
    Annual,
}

serde_plain::derive_display_from_serialize!(Granularity);
serde_plain::derive_fromstr_from_deserialize!(Granularity);

impl Granularity {
    fn key_format(&self) -> &'static str {
        match self {
            Granularity::Daily => "%Y-%m-%d",
            Granularity::Monthly => "%Y-%m",
            Granularity::Annual => "%Y",
        }
    }

    /// The bucket key for `date`. Keys are zero-padded, so lexicographic order is chronological.
    pub fn key(&self, date: &DateTime<Utc>) -> String {
        date.format(self.key_format()).to_string()
    }
}

/// One time bucket of an aggregation.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Bucket {
    pub key: String,
    pub sales_amount: Amount,
    pub fee_amount: Amount,
    pub transaction_count: u64,
}

/// Groups the filtered rows by `granularity`, returning one bucket per distinct key in ascending
/// key order.
pub fn aggregate(filtered: &Filtered<'_>, granularity: Granularity) -> Vec<Bucket> {
    let mut buckets: BTreeMap<String, Totals> = BTreeMap::new();
    for Dated { transaction, date } in filtered.rows() {
        buckets
            .entry(granularity.key(date))
            .or_default()
            .add(transaction);
    }
    buckets
        .into_iter()
        .map(|(key, totals)| Bucket {
            key,
            sales_amount: totals.sales_amount,
            fee_amount: totals.fee_amount,
            transaction_count: totals.transaction_count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sales::filter::{Filter, Scope};
    use crate::model::Period;

    fn jpy_example() -> Vec<SalesTransaction> {
        vec![
            SalesTransaction::new("m1", "2024-01-05", 100, 5, "JPY"),
            SalesTransaction::new("m1", "2024-01-20", 200, 10, "JPY"),
            SalesTransaction::new("m2", "2024-02-01", 50, 2, "JPY"),
        ]
    }

    fn bucket(key: &str, sales: i64, fee: i64, count: u64) -> Bucket {
        Bucket {
            key: key.to_string(),
            sales_amount: Amount::from(sales),
            fee_amount: Amount::from(fee),
            transaction_count: count,
        }
    }

    #[test]
    fn kpis_for_example() {
        let data = jpy_example();
        let kpis = Kpis::compute(&Filter::default().apply(&data), DEFAULT_CURRENCY);
        assert_eq!(
            kpis,
            Kpis {
                sales_amount: Amount::from(350),
                fee_amount: Amount::from(17),
                transaction_count: 3,
                currency: "JPY".to_string(),
            }
        );
    }

    #[test]
    fn kpis_for_empty_set() {
        let data: Vec<SalesTransaction> = Vec::new();
        let kpis = Kpis::compute(&Filter::default().apply(&data), DEFAULT_CURRENCY);
        assert_eq!(kpis.sales_amount, Amount::ZERO);
        assert_eq!(kpis.fee_amount, Amount::ZERO);
        assert_eq!(kpis.transaction_count, 0);
        assert_eq!(kpis.currency, "USD");
    }

    #[test]
    fn kpi_currency_comes_from_first_filtered_row() {
        let data = vec![
            SalesTransaction::new("m1", "bad", 1, 0, "EUR"),
            SalesTransaction::new("m1", "2024-01-01", 1, 0, "GBP"),
            SalesTransaction::new("m1", "2024-01-02", 1, 0, "USD"),
        ];
        let kpis = Kpis::compute(&Filter::default().apply(&data), DEFAULT_CURRENCY);
        assert_eq!(kpis.currency, "GBP");
    }

    #[test]
    fn monthly_for_example() {
        let data = jpy_example();
        let buckets = aggregate(&Filter::default().apply(&data), Granularity::Monthly);
        assert_eq!(
            buckets,
            vec![bucket("2024-01", 300, 15, 2), bucket("2024-02", 50, 2, 1)]
        );
    }

    #[test]
    fn daily_and_annual_keys() {
        let data = jpy_example();
        let filtered = Filter::default().apply(&data);
        let daily: Vec<String> = aggregate(&filtered, Granularity::Daily)
            .into_iter()
            .map(|b| b.key)
            .collect();
        assert_eq!(daily, vec!["2024-01-05", "2024-01-20", "2024-02-01"]);
        assert_eq!(
            aggregate(&filtered, Granularity::Annual),
            vec![bucket("2024", 350, 17, 3)]
        );
    }

    #[test]
    fn buckets_sum_to_kpis_and_keys_are_sorted_unique() {
        // Deliberately out of order, spanning years, with duplicates on the same day
        let data = vec![
            SalesTransaction::new("m1", "2025-03-01T10:00:00Z", 7, 1, "USD"),
            SalesTransaction::new("m1", "2023-12-31", 11, 2, "USD"),
            SalesTransaction::new("m2", "2024-06-15 08:00:00", 13, 3, "USD"),
            SalesTransaction::new("m1", "2025-03-01", 17, 4, "USD"),
            SalesTransaction::new("m2", "garbage", 1000, 1000, "USD"),
            SalesTransaction::new("m1", "2024-06-30", 19, 5, "USD"),
        ];
        let filtered = Filter::default().apply(&data);
        let kpis = Kpis::compute(&filtered, DEFAULT_CURRENCY);
        for granularity in [Granularity::Daily, Granularity::Monthly, Granularity::Annual] {
            let buckets = aggregate(&filtered, granularity);
            let sales: Amount = buckets.iter().map(|b| b.sales_amount).sum();
            let fees: Amount = buckets.iter().map(|b| b.fee_amount).sum();
            let count: u64 = buckets.iter().map(|b| b.transaction_count).sum();
            assert_eq!(sales, kpis.sales_amount, "{granularity}");
            assert_eq!(fees, kpis.fee_amount, "{granularity}");
            assert_eq!(count, kpis.transaction_count, "{granularity}");
            assert!(
                buckets.windows(2).all(|w| w[0].key < w[1].key),
                "{granularity} keys not strictly ascending"
            );
        }
        assert_eq!(kpis.sales_amount, Amount::from(67));
    }

    #[test]
    fn malformed_rows_contribute_to_no_bucket() {
        let data = vec![
            SalesTransaction::new("m1", "not-a-date", 500, 50, "USD"),
            SalesTransaction::new("m1", "2024-01-01", 1, 0, "USD"),
        ];
        let filtered = Filter::new(Period::unbounded(), Scope::merchant("m1")).apply(&data);
        for granularity in [Granularity::Daily, Granularity::Monthly, Granularity::Annual] {
            let buckets = aggregate(&filtered, granularity);
            assert_eq!(buckets.len(), 1);
            assert_eq!(buckets[0].sales_amount, Amount::from(1));
        }
    }

    #[test]
    fn offset_dates_are_bucketed_by_utc_calendar_date() {
        let data = vec![SalesTransaction::new(
            "m1",
            "2024-02-01T08:00:00+09:00",
            100,
            5,
            "JPY",
        )];
        let filtered = Filter::default().apply(&data);
        let keys = |g| {
            aggregate(&filtered, g)
                .into_iter()
                .map(|b| b.key)
                .collect::<Vec<_>>()
        };
        assert_eq!(keys(Granularity::Daily), vec!["2024-01-31"]);
        assert_eq!(keys(Granularity::Monthly), vec!["2024-01"]);
        assert_eq!(keys(Granularity::Annual), vec!["2024"]);
    }

    #[test]
    fn totals_saturate_instead_of_panicking() {
        let max = Amount::new(rust_decimal::Decimal::MAX);
        let data = vec![
            SalesTransaction::new("m1", "2024-01-05", max, 1, "JPY"),
            SalesTransaction::new("m1", "2024-01-06", 1, 1, "JPY"),
        ];
        let filtered = Filter::default().apply(&data);
        let kpis = Kpis::compute(&filtered, DEFAULT_CURRENCY);
        assert_eq!(kpis.sales_amount, max);
        assert_eq!(kpis.fee_amount, Amount::from(2));
        assert_eq!(kpis.transaction_count, 2);
        let daily = aggregate(&filtered, Granularity::Daily);
        assert_eq!(daily.len(), 2);
        assert_eq!(aggregate(&filtered, Granularity::Annual)[0].sales_amount, max);
    }

    #[test]
    fn granularity_parses() {
        use std::str::FromStr;
        assert_eq!(Granularity::from_str("monthly").unwrap(), Granularity::Monthly);
        assert_eq!(Granularity::Annual.to_string(), "annual");
    }
}
