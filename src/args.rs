//! These structs provide the CLI interface for the sales CLI.

use crate::model::Period;
use crate::render::OutputFormat;
use crate::sales::{Filter, Granularity, Scope};
use crate::Result;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// sales: A command-line tool for summarizing merchant sales.
///
/// The purpose of this program is to load a file of sales transactions (JSON or CSV) into a data
/// directory and report on it: totals of sales and fees, and daily, monthly or annual breakdowns,
/// optionally narrowed to a period, a merchant and a client.
///
/// Transactions whose date cannot be parsed are left out of every report. The number left out is
/// logged as a warning.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and import a transactions file.
    ///
    /// The file must be `.json` (an array of transaction objects, or an object with a
    /// `transactions` array) or `.csv` (with a header row). Field names are `merchantId`,
    /// `clientId`, `transactionDate`, `salesAmount`, `feeAmount` and `currency`. The file is copied
    /// into --sales-home and a `config.json` is written next to it.
    Init(InitArgs),
    /// Print total sales, total fees, the transaction count and the currency.
    Kpis(ReportArgs),
    /// Print sales and fees grouped into daily, monthly or annual buckets.
    Aggregate(AggregateArgs),
    /// Print the transactions that pass the filter.
    Filter(ReportArgs),
    /// Print the merchant and client pairs available for filtering.
    Scope(ScopeArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where sales data and configuration is held. Defaults to ~/sales
    #[arg(long, env = "SALES_HOME", default_value_t = default_sales_home())]
    sales_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, sales_home: PathBuf) -> Self {
        Self {
            log_level,
            sales_home: sales_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn sales_home(&self) -> &DisplayPath {
        &self.sales_home
    }
}

/// Args for the `sales init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The path to the transactions file to import.
    #[arg(long)]
    transactions: PathBuf,
}

impl InitArgs {
    pub fn new(transactions: impl Into<PathBuf>) -> Self {
        Self {
            transactions: transactions.into(),
        }
    }

    pub fn transactions(&self) -> &Path {
        &self.transactions
    }
}

/// The filter options shared by the reporting commands.
#[derive(Debug, Default, Parser, Clone)]
pub struct FilterArgs {
    /// Only include transactions on or after this date (YYYY-MM-DD) or RFC 3339 date-time.
    #[arg(long)]
    from: Option<String>,

    /// Only include transactions on or before this date (YYYY-MM-DD, the whole day is included) or
    /// RFC 3339 date-time.
    #[arg(long)]
    to: Option<String>,

    /// Only include transactions of this merchant.
    #[arg(long)]
    merchant: Option<String>,

    /// Only include transactions with this client.
    #[arg(long)]
    client: Option<String>,
}

impl FilterArgs {
    pub fn new(
        from: Option<String>,
        to: Option<String>,
        merchant: Option<String>,
        client: Option<String>,
    ) -> Self {
        Self {
            from,
            to,
            merchant,
            client,
        }
    }

    /// Builds the filter criteria, validating the period bounds.
    pub fn filter(&self) -> Result<Filter> {
        let period = Period::parse(self.from.as_deref(), self.to.as_deref())?;
        let scope = Scope::new(self.merchant.clone(), self.client.clone());
        Ok(Filter::new(period, scope))
    }
}

/// Args for the `sales kpis` and `sales filter` commands.
#[derive(Debug, Default, Parser, Clone)]
pub struct ReportArgs {
    #[clap(flatten)]
    filter: FilterArgs,

    /// The output format.
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
}

impl ReportArgs {
    pub fn new(filter: FilterArgs, format: OutputFormat) -> Self {
        Self { filter, format }
    }

    pub fn filter(&self) -> &FilterArgs {
        &self.filter
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

/// Args for the `sales aggregate` command.
#[derive(Debug, Parser, Clone)]
pub struct AggregateArgs {
    /// The bucket size: daily, monthly or annual.
    #[arg(value_enum)]
    granularity: Granularity,

    #[clap(flatten)]
    report: ReportArgs,
}

impl AggregateArgs {
    pub fn new(granularity: Granularity, report: ReportArgs) -> Self {
        Self {
            granularity,
            report,
        }
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn report(&self) -> &ReportArgs {
        &self.report
    }
}

/// Args for the `sales scope` command.
#[derive(Debug, Default, Parser, Clone)]
pub struct ScopeArgs {
    /// Only list the clients of this merchant.
    #[arg(long)]
    merchant: Option<String>,

    /// The output format.
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
}

impl ScopeArgs {
    pub fn new(merchant: Option<String>, format: OutputFormat) -> Self {
        Self { merchant, format }
    }

    pub fn merchant(&self) -> Option<&str> {
        self.merchant.as_deref().filter(|m| !m.is_empty())
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

fn default_sales_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("sales"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --sales-home or SALES_HOME instead of relying on the default \
                sales home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("sales")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}
