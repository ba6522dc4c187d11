use crate::model::date::{parse_naive_date, parse_transaction_date};
use crate::Result;
use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An optional, inclusive `[from, to]` window of instants. Either side may be open.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Period {
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    to: Option<DateTime<Utc>>,
}

impl Period {
    pub fn new(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        Self { from, to }
    }

    /// A period with neither bound set; it contains every instant.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Parses the textual bounds given on the command line. See [`Bound`] for how date-only
    /// values are widened.
    pub fn parse(from: Option<&str>, to: Option<&str>) -> Result<Self> {
        let from = from.map(|s| parse_bound(s, Bound::Start)).transpose()?;
        let to = to.map(|s| parse_bound(s, Bound::End)).transpose()?;
        Ok(Self { from, to })
    }

    pub fn from(&self) -> Option<DateTime<Utc>> {
        self.from
    }

    pub fn to(&self) -> Option<DateTime<Utc>> {
        self.to
    }

    /// True when both bounds are set and `from` is after `to`, so nothing can match.
    pub fn is_inverted(&self) -> bool {
        matches!((self.from, self.to), (Some(from), Some(to)) if from > to)
    }

    /// Whether `instant` falls within whichever bounds are set, inclusive on both ends.
    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        self.from.map_or(true, |from| *instant >= from) && self.to.map_or(true, |to| *instant <= to)
    }
}

/// Which side of a period a textual bound is for.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Bound {
    /// A date-only value means the first instant of that day.
    Start,
    /// A date-only value means the last instant of that day.
    End,
}

/// Parses a period bound. Date-times are taken as given (UTC when no offset is present), a plain
/// date is widened according to `bound` so that `--to 2024-01-31` includes all of January 31st.
pub fn parse_bound(s: &str, bound: Bound) -> Result<DateTime<Utc>> {
    let s = s.trim();
    if let Some(date) = parse_naive_date(s) {
        let ndt = match bound {
            Bound::Start => date.and_hms_opt(0, 0, 0),
            Bound::End => date.and_hms_nano_opt(23, 59, 59, 999_999_999),
        }
        .with_context(|| format!("Unable to expand the date '{s}' into a time"))?;
        return Ok(ndt.and_utc());
    }
    match parse_transaction_date(s) {
        Some(instant) => Ok(instant),
        None => bail!("'{s}' is not a valid date, expected YYYY-MM-DD or an RFC 3339 date-time"),
    }
}
