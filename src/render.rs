//! Rendering of report rows as JSON, a Markdown table or CSV.

use crate::model::{Amount, SalesTransaction};
use crate::sales::{Bucket, Counterparty, Kpis};
use crate::Result;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

/// The output format for report rows.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    serde::Serialize,
    serde::Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// A Markdown table with human-friendly amounts.
    #[default]
    Table,
    /// Pretty-printed JSON.
    Json,
    /// CSV with a header row and plain decimal amounts.
    Csv,
}

serde_plain::derive_display_from_serialize!(OutputFormat);
serde_plain::derive_fromstr_from_deserialize!(OutputFormat);

/// A row type that can be laid out as table or CSV columns.
pub trait Tabular {
    fn headers() -> &'static [&'static str];

    /// The cell values in `headers()` order. `format` decides how amounts are written.
    fn cells(&self, format: OutputFormat) -> Vec<String>;
}

/// Rendered rows in the requested output format.
#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Rows {
    /// A JSON array of row objects, or a single object for one-row reports.
    Json(serde_json::Value),
    /// Markdown table as a single formatted string.
    Table(String),
    /// CSV data as a properly escaped string.
    Csv(String),
}

impl Rows {
    /// Renders a list of rows.
    pub fn render<T>(items: &[T], format: OutputFormat) -> Result<Self>
    where
        T: Tabular + Serialize,
    {
        match format {
            OutputFormat::Json => serde_json::to_value(items)
                .map(Rows::Json)
                .context("Unable to serialize rows as JSON"),
            OutputFormat::Table => Ok(Rows::Table(markdown_table(items))),
            OutputFormat::Csv => csv_string(items).map(Rows::Csv),
        }
    }

    /// Renders a single row. In JSON this is an object rather than a one-element array.
    pub fn render_one<T>(item: &T, format: OutputFormat) -> Result<Self>
    where
        T: Tabular + Serialize,
    {
        match format {
            OutputFormat::Json => serde_json::to_value(item)
                .map(Rows::Json)
                .context("Unable to serialize row as JSON"),
            _ => Self::render(std::slice::from_ref(item), format),
        }
    }
}

impl Debug for Rows {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Rows::Json(v) => write!(f, "Rows::Json({:?})", v),
            Rows::Table(s) => write!(f, "Rows::Table({} chars)", s.len()),
            Rows::Csv(s) => write!(f, "Rows::Csv({} chars)", s.len()),
        }
    }
}

impl Display for Rows {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Rows::Json(v) => {
                if let Ok(s) = serde_json::to_string_pretty(v) {
                    write!(f, "{}", s)
                } else {
                    write!(f, "{:?}", v)
                }
            }
            Rows::Table(s) => write!(f, "{}", s.trim_end()),
            Rows::Csv(s) => write!(f, "{}", s.trim_end()),
        }
    }
}

fn markdown_table<T: Tabular>(items: &[T]) -> String {
    let headers = T::headers();
    let rows: Vec<Vec<String>> = items
        .iter()
        .map(|item| item.cells(OutputFormat::Table))
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (ix, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(ix) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let line = |cells: &[String]| -> String {
        let padded: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(ix, &w)| {
                let cell = cells.get(ix).map(String::as_str).unwrap_or_default();
                format!("{cell:<w$}")
            })
            .collect();
        format!("| {} |\n", padded.join(" | "))
    };

    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let mut out = line(&header_cells);
    out.push_str(&line(&separator));
    for row in &rows {
        out.push_str(&line(row));
    }
    out
}

fn csv_string<T: Tabular>(items: &[T]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(T::headers())
        .context("Unable to write CSV header")?;
    for item in items {
        writer
            .write_record(item.cells(OutputFormat::Csv))
            .context("Unable to write CSV record")?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Unable to flush CSV output: {e}"))?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

fn amount_cell(amount: Amount, format: OutputFormat) -> String {
    match format {
        OutputFormat::Table => amount.to_string(),
        OutputFormat::Json | OutputFormat::Csv => amount.value().normalize().to_string(),
    }
}

impl Tabular for Kpis {
    fn headers() -> &'static [&'static str] {
        &["sales_amount", "fee_amount", "transaction_count", "currency"]
    }

    fn cells(&self, format: OutputFormat) -> Vec<String> {
        vec![
            amount_cell(self.sales_amount, format),
            amount_cell(self.fee_amount, format),
            self.transaction_count.to_string(),
            self.currency.clone(),
        ]
    }
}

impl Tabular for Bucket {
    fn headers() -> &'static [&'static str] {
        &["key", "sales_amount", "fee_amount", "transaction_count"]
    }

    fn cells(&self, format: OutputFormat) -> Vec<String> {
        vec![
            self.key.clone(),
            amount_cell(self.sales_amount, format),
            amount_cell(self.fee_amount, format),
            self.transaction_count.to_string(),
        ]
    }
}

impl Tabular for SalesTransaction {
    fn headers() -> &'static [&'static str] {
        &[
            "merchantId",
            "clientId",
            "transactionDate",
            "salesAmount",
            "feeAmount",
            "currency",
        ]
    }

    fn cells(&self, format: OutputFormat) -> Vec<String> {
        vec![
            self.merchant_id().to_string(),
            self.client_id().unwrap_or_default().to_string(),
            self.transaction_date().to_string(),
            amount_cell(self.sales_amount(), format),
            amount_cell(self.fee_amount(), format),
            self.currency().to_string(),
        ]
    }
}

impl Tabular for Counterparty {
    fn headers() -> &'static [&'static str] {
        &["merchant_id", "client_id", "transaction_count"]
    }

    fn cells(&self, _format: OutputFormat) -> Vec<String> {
        vec![
            self.merchant_id.clone(),
            self.client_id.clone().unwrap_or_default(),
            self.transaction_count.to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn buckets() -> Vec<Bucket> {
        vec![
            Bucket {
                key: "2024-01".to_string(),
                sales_amount: Amount::from(1300),
                fee_amount: Amount::new(Decimal::from_str("15.5").unwrap()),
                transaction_count: 2,
            },
            Bucket {
                key: "2024-02".to_string(),
                sales_amount: Amount::from(50),
                fee_amount: Amount::from(2),
                transaction_count: 1,
            },
        ]
    }

    #[test]
    fn table() {
        let rows = Rows::render(&buckets(), OutputFormat::Table).unwrap();
        let expected = "\
| key     | sales_amount | fee_amount | transaction_count |
| ------- | ------------ | ---------- | ----------------- |
| 2024-01 | 1,300.00     | 15.50      | 2                 |
| 2024-02 | 50.00        | 2.00       | 1                 |";
        assert_eq!(rows.to_string(), expected);
    }

    #[test]
    fn csv() {
        let rows = Rows::render(&buckets(), OutputFormat::Csv).unwrap();
        let expected = "\
key,sales_amount,fee_amount,transaction_count
2024-01,1300,15.5,2
2024-02,50,2,1";
        assert_eq!(rows.to_string(), expected);
    }

    #[test]
    fn csv_empty_still_has_header() {
        let rows = Rows::render::<Bucket>(&[], OutputFormat::Csv).unwrap();
        assert_eq!(
            rows.to_string(),
            "key,sales_amount,fee_amount,transaction_count"
        );
    }

    #[test]
    fn json_one_is_an_object() {
        let kpis = Kpis {
            sales_amount: Amount::from(350),
            fee_amount: Amount::from(17),
            transaction_count: 3,
            currency: "JPY".to_string(),
        };
        let Rows::Json(value) = Rows::render_one(&kpis, OutputFormat::Json).unwrap() else {
            panic!("expected JSON rows");
        };
        assert_eq!(
            value,
            serde_json::json!({
                "sales_amount": "350",
                "fee_amount": "17",
                "transaction_count": 3,
                "currency": "JPY"
            })
        );
    }

    #[test]
    fn transaction_cells_with_missing_client() {
        let t = SalesTransaction::new("m1", "2024-01-05", 100, 5, "JPY");
        let rows = Rows::render(&[t], OutputFormat::Csv).unwrap();
        assert!(rows
            .to_string()
            .ends_with("m1,,2024-01-05,100,5,JPY"));
    }
}
