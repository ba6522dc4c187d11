use crate::model::date::parse_transaction_date;
use crate::model::{Amount, AmountError};
use crate::{utils, Result};
use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// A single sales transaction as supplied by the data source.
///
/// The record is read-only for the purposes of this crate: it is loaded once and then filtered
/// and aggregated, never changed. Keys are camelCase because that is what the data source emits.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesTransaction {
    /// The owning tenant.
    #[serde(default)]
    merchant_id: String,
    /// The counterparty client. Absent on some rows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    client_id: Option<String>,
    /// A date-like string. It may be malformed, see [`SalesTransaction::date`].
    #[serde(default)]
    transaction_date: String,
    #[serde(default)]
    sales_amount: Amount,
    #[serde(default)]
    fee_amount: Amount,
    #[serde(default)]
    currency: String,
}

impl SalesTransaction {
    pub fn new(
        merchant_id: impl Into<String>,
        transaction_date: impl Into<String>,
        sales_amount: impl Into<Amount>,
        fee_amount: impl Into<Amount>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            merchant_id: merchant_id.into(),
            client_id: None,
            transaction_date: transaction_date.into(),
            sales_amount: sales_amount.into(),
            fee_amount: fee_amount.into(),
            currency: currency.into(),
        }
    }

    pub fn with_client(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn merchant_id(&self) -> &str {
        &self.merchant_id
    }

    /// The client, treating an empty identifier the same as an absent one.
    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref().filter(|s| !s.is_empty())
    }

    /// The raw, unparsed date string.
    pub fn transaction_date(&self) -> &str {
        &self.transaction_date
    }

    /// The transaction date as a UTC instant, or `None` if it cannot be parsed.
    pub fn date(&self) -> Option<DateTime<Utc>> {
        parse_transaction_date(&self.transaction_date)
    }

    pub fn sales_amount(&self) -> Amount {
        self.sales_amount
    }

    pub fn fee_amount(&self) -> Amount {
        self.fee_amount
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }
}

/// A row of a transactions CSV file. Amounts are kept as the raw field text so that they are parsed
/// by `Amount::from_str` and never pass through a float.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CsvRecord {
    #[serde(default)]
    merchant_id: String,
    #[serde(default)]
    client_id: Option<String>,
    #[serde(default)]
    transaction_date: String,
    #[serde(default)]
    sales_amount: String,
    #[serde(default)]
    fee_amount: String,
    #[serde(default)]
    currency: String,
}

impl TryFrom<CsvRecord> for SalesTransaction {
    type Error = AmountError;

    fn try_from(record: CsvRecord) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            merchant_id: record.merchant_id,
            client_id: record.client_id,
            transaction_date: record.transaction_date,
            sales_amount: Amount::from_str(&record.sales_amount)?,
            fee_amount: Amount::from_str(&record.fee_amount)?,
            currency: record.currency,
        })
    }
}

/// The supported encodings of a transactions file, chosen by file extension.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataFormat {
    Json,
    Csv,
}

serde_plain::derive_display_from_serialize!(DataFormat);
serde_plain::derive_fromstr_from_deserialize!(DataFormat);

impl DataFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "json" => Ok(DataFormat::Json),
            "csv" => Ok(DataFormat::Csv),
            _ => bail!(
                "Unsupported transactions file '{}', expected a .json or .csv extension",
                path.display()
            ),
        }
    }
}

/// A JSON transactions file is either a bare array or an object with a `transactions` array.
#[derive(Deserialize)]
#[serde(untagged)]
enum JsonFile {
    Bare(Vec<SalesTransaction>),
    Wrapped { transactions: Vec<SalesTransaction> },
}

/// The full backing collection of transactions.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transactions {
    data: Vec<SalesTransaction>,
}

impl Transactions {
    pub fn new(data: Vec<SalesTransaction>) -> Self {
        Self { data }
    }

    /// Loads and parses the transactions file at `path`, choosing the parser by extension.
    pub async fn load(path: &Path) -> Result<Self> {
        let format = DataFormat::from_path(path)?;
        let content = utils::read(path).await?;
        Self::parse(&content, format)
            .with_context(|| format!("Failed to parse transactions file at {}", path.display()))
    }

    pub fn parse(content: &str, format: DataFormat) -> Result<Self> {
        match format {
            DataFormat::Json => Self::from_json(content),
            DataFormat::Csv => Self::from_csv(content),
        }
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let file: JsonFile =
            serde_json::from_str(content).context("The JSON is not a list of transactions")?;
        let data = match file {
            JsonFile::Bare(data) => data,
            JsonFile::Wrapped { transactions } => transactions,
        };
        check_totals(&data)?;
        Ok(Self { data })
    }

    /// Parses CSV with a header row naming the camelCase fields, e.g.
    /// `merchantId,clientId,transactionDate,salesAmount,feeAmount,currency`.
    pub fn from_csv(content: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let mut data = Vec::new();
        for (ix, record) in reader.deserialize::<CsvRecord>().enumerate() {
            let transaction = record
                .map_err(anyhow::Error::from)
                .and_then(|r| SalesTransaction::try_from(r).map_err(anyhow::Error::from))
                .with_context(|| format!("Invalid CSV record at data row {}", ix + 1))?;
            data.push(transaction);
        }
        check_totals(&data)?;
        Ok(Self { data })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SalesTransaction> {
        self.data.iter()
    }

    pub fn as_slice(&self) -> &[SalesTransaction] {
        &self.data
    }
}

/// Rejects data whose amounts cannot all be totalled. If the sum of the absolute values fits in a
/// `Decimal`, then so does the sum over any subset, so no filter or bucket can overflow.
fn check_totals(data: &[SalesTransaction]) -> Result<()> {
    let mut sales = Amount::ZERO;
    let mut fees = Amount::ZERO;
    for (ix, t) in data.iter().enumerate() {
        let overflow = || {
            format!(
                "Amounts overflow when totalled at transaction {} (merchant '{}')",
                ix + 1,
                t.merchant_id()
            )
        };
        sales = sales
            .checked_add(Amount::new(t.sales_amount().value().abs()))
            .with_context(overflow)?;
        fees = fees
            .checked_add(Amount::new(t.fee_amount().value().abs()))
            .with_context(overflow)?;
    }
    Ok(())
}

impl From<Vec<SalesTransaction>> for Transactions {
    fn from(data: Vec<SalesTransaction>) -> Self {
        Self::new(data)
    }
}

impl<'a> IntoIterator for &'a Transactions {
    type Item = &'a SalesTransaction;
    type IntoIter = std::slice::Iter<'a, SalesTransaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
