use crate::model::{Period, Transactions};
use crate::sales::aggregate::{aggregate, Bucket, Granularity, Kpis, DEFAULT_CURRENCY};
use crate::sales::filter::{Filter, Filtered, Scope};
use crate::sales::scope::{counterparties, Counterparty};
use tracing::trace;

/// Holds a transaction collection together with the current filter criteria and answers queries
/// against them.
///
/// The collection is never modified after construction; only the filter changes. Every query is a
/// pure function of `(transactions, filter)`, see [`Filter::apply`], [`Kpis::compute`] and
/// [`aggregate`].
#[derive(Debug, Clone)]
pub struct SalesStore {
    transactions: Transactions,
    filter: Filter,
    default_currency: String,
}

impl SalesStore {
    pub fn new(transactions: impl Into<Transactions>) -> Self {
        Self {
            transactions: transactions.into(),
            filter: Filter::default(),
            default_currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    /// Overrides the currency reported by [`SalesStore::kpis`] when no rows match.
    pub fn with_default_currency(mut self, currency: impl Into<String>) -> Self {
        self.default_currency = currency.into();
        self
    }

    /// Replaces the whole filter at once.
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    pub fn transactions(&self) -> &Transactions {
        &self.transactions
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn default_currency(&self) -> &str {
        &self.default_currency
    }

    pub fn set_period(&mut self, period: Period) {
        trace!("period set to {period:?}");
        self.filter.set_period(period);
    }

    /// Selects a merchant. The client selection is always reset.
    pub fn set_merchant_id(&mut self, merchant_id: Option<String>) {
        trace!("merchant set to {merchant_id:?}, client cleared");
        self.filter.set_merchant_id(merchant_id);
    }

    pub fn set_client_id(&mut self, client_id: Option<String>) {
        trace!("client set to {client_id:?}");
        self.filter.set_client_id(client_id);
    }

    pub fn set_scope(&mut self, scope: Scope) {
        trace!("scope set to {scope:?}");
        self.filter.set_scope(scope);
    }

    pub fn filtered(&self) -> Filtered<'_> {
        self.filter.apply(&self.transactions)
    }

    pub fn kpis(&self) -> Kpis {
        Kpis::compute(&self.filtered(), &self.default_currency)
    }

    pub fn aggregation(&self, granularity: Granularity) -> Vec<Bucket> {
        aggregate(&self.filtered(), granularity)
    }

    pub fn daily_aggregation(&self) -> Vec<Bucket> {
        self.aggregation(Granularity::Daily)
    }

    pub fn monthly_aggregation(&self) -> Vec<Bucket> {
        self.aggregation(Granularity::Monthly)
    }

    pub fn annual_aggregation(&self) -> Vec<Bucket> {
        self.aggregation(Granularity::Annual)
    }

    /// The merchant/client pairs available under the currently selected merchant.
    pub fn counterparties(&self) -> Vec<Counterparty> {
        counterparties(&self.transactions, self.filter.scope().merchant_id())
    }
}
