//! Aggregations over the ledger: the business rules deciding which
//! transactions count toward revenue, expense and cash metrics.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};

use super::query;
use super::{Flow, Transaction};

/// Description tokens that exempt a transaction from net income and expense
/// metrics. Matching is exact per token, after lower-casing.
const EXEMPT_TOKENS: [&str; 1] = ["spaarrekening"];

/// Token marking a transfer to or from the linked savings account.
const SAVINGS_MARKER: &str = "spaarrekening";

/// Category excluded from revenue and expenses.
const INTERNAL_TRANSFERS: &str = "Internal transfers";

/// Errors raised by the aggregation functions. Deterministic for a given
/// subset and arguments; never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricError {
    /// A range query was given a start date after its end date.
    InvalidRange { start: NaiveDate, end: NaiveDate },
    /// An argument outside the accepted set.
    InvalidArgument(String),
    /// An average or ratio whose denominator is zero.
    DivisionUndefined(&'static str),
}

impl std::fmt::Display for MetricError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricError::InvalidRange { start, end } => {
                write!(f, "start date {start} is after end date {end}")
            }
            MetricError::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            MetricError::DivisionUndefined(what) => write!(f, "division undefined: {what}"),
        }
    }
}

impl std::error::Error for MetricError {}

fn epoch_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).expect("literal date")
}

/// Sentinel meaning "include the entire ledger".
fn far_future() -> NaiveDate {
    NaiveDate::from_ymd_opt(2100, 1, 1).expect("literal date")
}

/// True when the description does not exempt the transaction from net
/// income and expense metrics. Exemption is all-or-nothing per transaction:
/// one matching token exempts it, substring hits on other tokens do not.
pub fn is_includable(description: &str) -> bool {
    !description
        .to_lowercase()
        .split_whitespace()
        .any(|word| EXEMPT_TOKENS.contains(&word))
}

/// True when the description marks a transfer to or from the linked savings
/// account. Evaluated independently of [`is_includable`]; the two serve
/// different metrics even though their vocabularies currently coincide.
pub fn is_bank_transfer(description: &str) -> bool {
    description
        .to_lowercase()
        .split_whitespace()
        .any(|word| word == SAVINGS_MARKER)
}

fn counts_toward(tx: &Transaction, flow: Flow) -> bool {
    tx.flow == Some(flow) && is_includable(&tx.description) && tx.category != INTERNAL_TRANSFERS
}

/// Sum of inflow amounts that count toward net income.
pub fn revenue(txs: &[&Transaction]) -> f64 {
    txs.iter()
        .filter(|t| counts_toward(t, Flow::Inflow))
        .map(|t| t.amount)
        .sum()
}

/// Sum of outflow amounts that count toward net income.
pub fn expenses(txs: &[&Transaction]) -> f64 {
    txs.iter()
        .filter(|t| counts_toward(t, Flow::Outflow))
        .map(|t| t.amount)
        .sum()
}

/// Defined as revenue minus expenses, exactly.
pub fn net_profit(txs: &[&Transaction]) -> f64 {
    revenue(txs) - expenses(txs)
}

/// Net movement into the savings account: outflows marked as bank transfers
/// minus inflows marked as bank transfers. The exemption and category rules
/// used for profit do not apply here.
pub fn net_bank_flow(txs: &[&Transaction]) -> f64 {
    let to_bank: f64 = txs
        .iter()
        .filter(|t| t.flow == Some(Flow::Outflow) && is_bank_transfer(&t.description))
        .map(|t| t.amount)
        .sum();
    let from_bank: f64 = txs
        .iter()
        .filter(|t| t.flow == Some(Flow::Inflow) && is_bank_transfer(&t.description))
        .map(|t| t.amount)
        .sum();
    to_bank - from_bank
}

/// Cash on hand as of the given date: all inflows minus all outflows dated
/// up to and including `as_of`, plus the net bank flow of the whole subset.
/// `None` means the entire ledger.
pub fn cash_on_hand(txs: &[&Transaction], as_of: Option<NaiveDate>) -> Result<f64, MetricError> {
    let end = as_of.unwrap_or_else(far_future);
    let ranged = query::by_date_range(txs, epoch_start(), end)?;
    let total_in: f64 = ranged
        .iter()
        .filter(|t| t.flow == Some(Flow::Inflow))
        .map(|t| t.amount)
        .sum();
    let total_out: f64 = ranged
        .iter()
        .filter(|t| t.flow == Some(Flow::Outflow))
        .map(|t| t.amount)
        .sum();
    Ok(total_in - total_out + net_bank_flow(txs))
}

/// Direction of money flow for counterparty rankings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
}

impl FromStr for Direction {
    type Err = MetricError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in" => Ok(Direction::In),
            "out" => Ok(Direction::Out),
            other => Err(MetricError::InvalidArgument(format!(
                "unknown direction {other:?}, accepted: \"in\", \"out\""
            ))),
        }
    }
}

/// Groups the subset by `key` in first-seen order, totals the amounts that
/// count toward net income for `flow` per group, truncates to whole units
/// and sorts descending. The sort is stable, so ties keep first-seen order.
fn ranked_totals<'a, F>(txs: &[&'a Transaction], flow: Flow, key: F) -> Vec<(String, i64)>
where
    F: Fn(&'a Transaction) -> &'a str,
{
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut totals: Vec<(String, f64)> = Vec::new();
    for &tx in txs {
        let k = key(tx);
        let slot = *index.entry(k).or_insert_with(|| {
            totals.push((k.to_string(), 0.0));
            totals.len() - 1
        });
        if counts_toward(tx, flow) {
            totals[slot].1 += tx.amount;
        }
    }
    let mut ranked: Vec<(String, i64)> = totals
        .into_iter()
        .map(|(k, total)| (k, total as i64))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

/// The top `n` counterparties by money flow in the given direction, as an
/// ordered account → whole-unit amount ranking.
pub fn top_accounts_by_flow<'a>(
    txs: &[&'a Transaction],
    direction: Direction,
    n: usize,
) -> Vec<(String, i64)> {
    let flow = match direction {
        Direction::In => Flow::Inflow,
        Direction::Out => Flow::Outflow,
    };
    let mut ranked = ranked_totals(txs, flow, |t| t.relation_iban.as_str());
    ranked.truncate(n);
    ranked
}

/// Total expenses per category, ranked descending, in whole units. Returns
/// the full ranking.
pub fn expenses_by_category(txs: &[&Transaction]) -> Vec<(String, i64)> {
    ranked_totals(txs, Flow::Outflow, |t| t.category.as_str())
}

/// Average of per-month expense totals over `[start, end]`.
///
/// Buckets the date-filtered subset by calendar month, truncates each
/// bucket's expenses to whole units and averages over the months that
/// actually contain transactions; empty months do not pull the average
/// toward zero. Fails with [`MetricError::DivisionUndefined`] when the
/// filtered subset spans no month at all.
pub fn average_monthly_expenses(
    txs: &[&Transaction],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<f64, MetricError> {
    let start = start.unwrap_or_else(epoch_start);
    let end = end.unwrap_or_else(far_future);
    let subset = query::by_date_range(txs, start, end)?;

    let mut index: HashMap<(i32, u32), usize> = HashMap::new();
    let mut buckets: Vec<Vec<&Transaction>> = Vec::new();
    for tx in subset {
        let month = (tx.booking_date.year(), tx.booking_date.month());
        let slot = *index.entry(month).or_insert_with(|| {
            buckets.push(Vec::new());
            buckets.len() - 1
        });
        buckets[slot].push(tx);
    }

    if buckets.is_empty() {
        return Err(MetricError::DivisionUndefined(
            "average monthly expenses over zero months",
        ));
    }
    let total: i64 = buckets.iter().map(|bucket| expenses(bucket) as i64).sum();
    Ok(total as f64 / buckets.len() as f64)
}
