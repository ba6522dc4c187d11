//! Reporting commands: KPIs, time-bucket aggregations, filtered rows and available scopes.

use crate::args::{AggregateArgs, FilterArgs, ReportArgs, ScopeArgs};
use crate::commands::{plural, Out};
use crate::error::{ErrorType, IntoResult};
use crate::render::Rows;
use crate::sales::{aggregate as aggregate_rows, counterparties, Filtered, Kpis, SalesStore};
use crate::{Config, Result};
use tracing::{debug, warn};

/// Computes total sales, total fees, the transaction count and the currency of the transactions
/// passing the filter.
pub async fn kpis(config: Config, args: ReportArgs) -> Result<Out<Rows>> {
    let store = filtered_store(&config, args.filter()).await?;
    let filtered = store.filtered();
    warn_malformed(&filtered);
    let kpis = Kpis::compute(&filtered, store.default_currency());
    let message = format!(
        "{} {} in sales across {}",
        kpis.sales_amount,
        kpis.currency,
        plural(filtered.len(), "transaction")
    );
    let rows = Rows::render_one(&kpis, args.format()).pub_result(ErrorType::Render)?;
    Ok(Out::new(message, rows))
}

/// Groups the transactions passing the filter into daily, monthly or annual buckets.
pub async fn aggregate(config: Config, args: AggregateArgs) -> Result<Out<Rows>> {
    let report = args.report();
    let store = filtered_store(&config, report.filter()).await?;
    let filtered = store.filtered();
    warn_malformed(&filtered);
    let buckets = aggregate_rows(&filtered, args.granularity());
    let message = format!(
        "{} from {}",
        plural(buckets.len(), &format!("{} bucket", args.granularity())),
        plural(filtered.len(), "transaction")
    );
    let rows = Rows::render(&buckets, report.format()).pub_result(ErrorType::Render)?;
    Ok(Out::new(message, rows))
}

/// Lists the transactions passing the filter, in their original order.
pub async fn filter(config: Config, args: ReportArgs) -> Result<Out<Rows>> {
    let store = filtered_store(&config, args.filter()).await?;
    let filtered = store.filtered();
    warn_malformed(&filtered);
    let transactions: Vec<_> = filtered.transactions().cloned().collect();
    let message = format!(
        "{} of {} matched",
        transactions.len(),
        plural(store.transactions().len(), "transaction")
    );
    let rows = Rows::render(&transactions, args.format()).pub_result(ErrorType::Render)?;
    Ok(Out::new(message, rows))
}

/// Lists the merchant/client pairs present in the data, optionally for a single merchant.
pub async fn scope(config: Config, args: ScopeArgs) -> Result<Out<Rows>> {
    let store = config.load_store().await.pub_result(ErrorType::Data)?;
    let pairs = counterparties(store.transactions(), args.merchant());
    let message = plural(pairs.len(), "merchant/client pair");
    let rows = Rows::render(&pairs, args.format()).pub_result(ErrorType::Render)?;
    Ok(Out::new(message, rows))
}

/// Loads the configured transactions and applies the filter from the command line.
async fn filtered_store(config: &Config, args: &FilterArgs) -> Result<SalesStore> {
    let filter = args.filter().pub_result(ErrorType::Input)?;
    if filter.period().is_inverted() {
        warn!("The period starts after it ends, no transactions can match");
    }
    debug!("Filtering with {filter:?}");
    let store = config.load_store().await.pub_result(ErrorType::Data)?;
    Ok(store.with_filter(filter))
}

fn warn_malformed(filtered: &Filtered<'_>) {
    match filtered.malformed() {
        0 => {}
        1 => warn!("1 transaction was excluded because its date could not be parsed"),
        n => warn!("{n} transactions were excluded because their dates could not be parsed"),
    }
}
