//! Listing of the merchants and clients present in a transaction collection, for building
//! merchant and client pickers.

use crate::model::SalesTransaction;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A distinct merchant/client pair and how many transactions carry it.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Counterparty {
    pub merchant_id: String,
    pub client_id: Option<String>,
    pub transaction_count: u64,
}

/// Lists the distinct merchant/client pairs, sorted by merchant then client (rows without a client
/// first). When `merchant_id` is given only that merchant's clients are listed.
///
/// Rows are counted regardless of whether their date parses: this is the set of choices, not a
/// report.
pub fn counterparties<'a, I>(transactions: I, merchant_id: Option<&str>) -> Vec<Counterparty>
where
    I: IntoIterator<Item = &'a SalesTransaction>,
{
    let mut counts: BTreeMap<(&str, Option<&str>), u64> = BTreeMap::new();
    for t in transactions {
        if merchant_id.is_some_and(|m| m != t.merchant_id()) {
            continue;
        }
        *counts.entry((t.merchant_id(), t.client_id())).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|((merchant, client), transaction_count)| Counterparty {
            merchant_id: merchant.to_string(),
            client_id: client.map(str::to_string),
            transaction_count,
        })
        .collect()
}
