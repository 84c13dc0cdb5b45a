//! Core logic: the normalized transaction ledger and its analytics.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub mod metrics;
pub mod query;

pub use metrics::{Direction, MetricError};
pub use query::Column;

/// Errors that can occur while normalizing raw rows into a [`Ledger`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// A booking date could not be parsed; range queries depend on every
    /// date being comparable, so this aborts the load.
    MalformedInput { value: String },
}

impl std::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerError::MalformedInput { value } => {
                write!(f, "malformed booking date: {value:?}")
            }
        }
    }
}

impl std::error::Error for LedgerError {}

/// Direction of money movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flow {
    Inflow,
    Outflow,
}

impl Flow {
    fn parse(raw: &str) -> Option<Flow> {
        match raw.trim().to_lowercase().as_str() {
            "inflow" => Some(Flow::Inflow),
            "outflow" => Some(Flow::Outflow),
            _ => None,
        }
    }
}

/// A raw ledger row as supplied by the importer, before normalization.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTransaction {
    pub booking_date: String,
    pub description: Option<String>,
    pub amount: f64,
    pub flow: String,
    pub category: String,
    pub relation_iban: String,
}

/// One normalized ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub booking_date: NaiveDate,
    /// Never absent; a blank raw description normalizes to the empty string.
    pub description: String,
    /// Non-negative magnitude; direction is carried by `flow`.
    pub amount: f64,
    /// `None` when the raw flow tag was neither `inflow` nor `outflow`.
    /// Such rows never contribute to flow-keyed sums.
    pub flow: Option<Flow>,
    pub category: String,
    pub relation_iban: String,
}

/// In-memory collection of normalized transactions, read-only after
/// construction. Insertion order is preserved; duplicates are legal and
/// summed as-is.
#[derive(Debug, Default, Clone)]
pub struct Ledger {
    transactions: Vec<Transaction>,
}

impl Ledger {
    /// Normalizes raw rows into a ledger. Dates are parsed exactly once
    /// here; queries never re-derive or mutate them.
    pub fn from_rows(rows: Vec<RawTransaction>) -> Result<Self, LedgerError> {
        let mut transactions = Vec::with_capacity(rows.len());
        for row in rows {
            let booking_date = match NaiveDate::parse_from_str(row.booking_date.trim(), "%Y-%m-%d")
            {
                Ok(date) => date,
                Err(_) => {
                    return Err(LedgerError::MalformedInput {
                        value: row.booking_date,
                    });
                }
            };
            transactions.push(Transaction {
                booking_date,
                description: row.description.unwrap_or_default(),
                amount: row.amount,
                flow: Flow::parse(&row.flow),
                category: row.category,
                relation_iban: row.relation_iban,
            });
        }
        Ok(Self { transactions })
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// The full ledger as a borrowed subset, the default input to the query
    /// and aggregation functions.
    pub fn all(&self) -> Vec<&Transaction> {
        self.transactions.iter().collect()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}
