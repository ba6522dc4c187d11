//! Filter criteria and the pure filtering query over a transaction collection.

use crate::model::{Period, SalesTransaction};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The merchant and client selection.
///
/// A client only has meaning within a merchant, so the two are held and replaced together. Empty
/// identifiers are normalized to "not set".
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Scope {
    #[serde(skip_serializing_if = "Option::is_none")]
    merchant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_id: Option<String>,
}

impl Scope {
    pub fn new(merchant_id: Option<String>, client_id: Option<String>) -> Self {
        Self {
            merchant_id: non_empty(merchant_id),
            client_id: non_empty(client_id),
        }
    }

    /// Every merchant and every client.
    pub fn all() -> Self {
        Self::default()
    }

    /// A single merchant with no client selected.
    pub fn merchant(merchant_id: impl Into<String>) -> Self {
        Self::new(Some(merchant_id.into()), None)
    }

    /// Narrows this scope to one client, keeping the merchant.
    pub fn with_client(self, client_id: impl Into<String>) -> Self {
        Self::new(self.merchant_id, Some(client_id.into()))
    }

    pub fn merchant_id(&self) -> Option<&str> {
        self.merchant_id.as_deref()
    }

    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    pub fn matches(&self, transaction: &SalesTransaction) -> bool {
        let merchant_ok = self
            .merchant_id()
            .map_or(true, |id| transaction.merchant_id() == id);
        let client_ok = self
            .client_id()
            .map_or(true, |id| transaction.client_id() == Some(id));
        merchant_ok && client_ok
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// The full set of filter criteria applied to a transaction collection.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Filter {
    period: Period,
    scope: Scope,
}

impl Filter {
    pub fn new(period: Period, scope: Scope) -> Self {
        Self { period, scope }
    }

    pub fn period(&self) -> &Period {
        &self.period
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn set_period(&mut self, period: Period) {
        self.period = period;
    }

    /// Selects a merchant and always clears the client, whatever it was before. A client picked
    /// under a different merchant would match nothing.
    pub fn set_merchant_id(&mut self, merchant_id: Option<String>) {
        self.scope = Scope::new(merchant_id, None);
    }

    pub fn set_client_id(&mut self, client_id: Option<String>) {
        self.scope = Scope::new(self.scope.merchant_id.take(), client_id);
    }

    /// Replaces merchant and client in one step.
    pub fn set_scope(&mut self, scope: Scope) {
        self.scope = scope;
    }

    /// Applies the filter to `transactions`, preserving their order.
    ///
    /// A row is kept only if it matches the scope and its date parses and lies within the
    /// period. An unparseable date excludes the row even when the period is unbounded. Such rows
    /// are not an error; they are counted in [`Filtered::malformed`].
    pub fn apply<'a, I>(&self, transactions: I) -> Filtered<'a>
    where
        I: IntoIterator<Item = &'a SalesTransaction>,
    {
        let mut rows = Vec::new();
        let mut malformed = 0;
        for transaction in transactions {
            let Some(date) = transaction.date() else {
                malformed += 1;
                continue;
            };
            if self.scope.matches(transaction) && self.period.contains(&date) {
                rows.push(Dated { transaction, date });
            }
        }
        Filtered { rows, malformed }
    }
}

/// A transaction that passed the filter, with its parsed date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dated<'a> {
    pub transaction: &'a SalesTransaction,
    pub date: DateTime<Utc>,
}

/// The result of applying a [`Filter`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Filtered<'a> {
    rows: Vec<Dated<'a>>,
    malformed: usize,
}

impl<'a> Filtered<'a> {
    pub fn rows(&self) -> &[Dated<'a>] {
        &self.rows
    }

    pub fn transactions(&self) -> impl Iterator<Item = &'a SalesTransaction> + '_ {
        self.rows.iter().map(|d| d.transaction)
    }

    /// The number of rows in the backing collection that were dropped because their date could
    /// not be parsed. This counts every such row, including those outside the scope.
    pub fn malformed(&self) -> usize {
        self.malformed
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::parse_bound;
    use crate::model::Bound;

    fn sample() -> Vec<SalesTransaction> {
        vec![
            SalesTransaction::new("m1", "2024-01-05", 100, 5, "JPY").with_client("c1"),
            SalesTransaction::new("m1", "2024-01-20", 200, 10, "JPY").with_client("c2"),
            SalesTransaction::new("m2", "2024-02-01", 50, 2, "JPY").with_client("c1"),
            SalesTransaction::new("m1", "not-a-date", 999, 99, "JPY").with_client("c1"),
        ]
    }

    #[test]
    fn no_filter_keeps_all_dated_rows_in_order() {
        let data = sample();
        let filtered = Filter::default().apply(&data);
        assert_eq!(filtered.len(), 3);
        assert_eq!(filtered.malformed(), 1);
        let dates: Vec<&str> = filtered.transactions().map(|t| t.transaction_date()).collect();
        assert_eq!(dates, vec!["2024-01-05", "2024-01-20", "2024-02-01"]);
    }

    #[test]
    fn merchant_filter() {
        let data = sample();
        let mut filter = Filter::default();
        filter.set_merchant_id(Some("m1".into()));
        let filtered = filter.apply(&data);
        assert_eq!(filtered.len(), 2);
        assert!(filtered.transactions().all(|t| t.merchant_id() == "m1"));
    }

    #[test]
    fn client_filter_without_merchant() {
        let data = sample();
        let mut filter = Filter::default();
        filter.set_client_id(Some("c1".into()));
        let merchants: Vec<&str> = filter.apply(&data).transactions().map(|t| t.merchant_id()).collect();
        assert_eq!(merchants, vec!["m1", "m2"]);
    }

    #[test]
    fn set_merchant_always_clears_client() {
        let mut filter = Filter::default();
        filter.set_merchant_id(Some("m1".into()));
        filter.set_client_id(Some("c2".into()));
        assert_eq!(filter.scope().client_id(), Some("c2"));

        filter.set_merchant_id(Some("m2".into()));
        assert_eq!(filter.scope().merchant_id(), Some("m2"));
        assert_eq!(filter.scope().client_id(), None);

        filter.set_client_id(Some("c1".into()));
        filter.set_merchant_id(Some("m2".into()));
        assert_eq!(filter.scope().client_id(), None);

        filter.set_client_id(Some("c1".into()));
        filter.set_merchant_id(None);
        assert_eq!(filter.scope(), &Scope::all());
    }

    #[test]
    fn set_client_keeps_merchant() {
        let mut filter = Filter::default();
        filter.set_merchant_id(Some("m1".into()));
        filter.set_client_id(Some("c1".into()));
        assert_eq!(filter.scope(), &Scope::merchant("m1").with_client("c1"));
    }

    #[test]
    fn empty_ids_mean_unset() {
        let scope = Scope::new(Some(String::new()), Some(String::new()));
        assert_eq!(scope, Scope::all());
    }

    #[test]
    fn period_filter_is_inclusive() {
        let data = sample();
        let period = Period::new(
            Some(parse_bound("2024-01-05", Bound::Start).unwrap()),
            Some(parse_bound("2024-01-20", Bound::End).unwrap()),
        );
        let filter = Filter::new(period, Scope::all());
        let filtered = filter.apply(&data);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered.malformed(), 1);
    }

    #[test]
    fn malformed_dates_never_pass() {
        let data = vec![
            SalesTransaction::new("m1", "not-a-date", 1, 0, "USD"),
            SalesTransaction::new("m1", "", 1, 0, "USD"),
        ];
        for filter in [
            Filter::default(),
            Filter::new(Period::unbounded(), Scope::merchant("m1")),
        ] {
            let filtered = filter.apply(&data);
            assert!(filtered.is_empty());
            assert_eq!(filtered.malformed(), 2);
        }
    }
}
