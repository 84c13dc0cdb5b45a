//! Read-only filters and text matching over a transaction subset.
//!
//! Every function takes the subset explicitly; pass [`Ledger::all`] for the
//! whole ledger.
//!
//! [`Ledger::all`]: super::Ledger::all

use chrono::NaiveDate;

use super::metrics::MetricError;
use super::{Flow, Transaction};

/// Filters to transactions dated within `[start, end]`, inclusive on both
/// bounds.
pub fn by_date_range<'a>(
    txs: &[&'a Transaction],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<&'a Transaction>, MetricError> {
    if start > end {
        return Err(MetricError::InvalidRange { start, end });
    }
    Ok(txs
        .iter()
        .copied()
        .filter(|t| t.booking_date >= start && t.booking_date <= end)
        .collect())
}

/// True when every whitespace token of the lower-cased query occurs as a
/// substring of the lower-cased description.
pub fn description_matches(description: &str, query: &str) -> bool {
    let text = description.to_lowercase();
    query
        .to_lowercase()
        .split_whitespace()
        .all(|word| text.contains(word))
}

pub fn by_description<'a>(txs: &[&'a Transaction], query: &str) -> Vec<&'a Transaction> {
    txs.iter()
        .copied()
        .filter(|t| description_matches(&t.description, query))
        .collect()
}

/// Exact match on the counterparty account.
pub fn by_account<'a>(txs: &[&'a Transaction], relation_iban: &str) -> Vec<&'a Transaction> {
    txs.iter()
        .copied()
        .filter(|t| t.relation_iban == relation_iban)
        .collect()
}

/// Exact match on the category tag.
pub fn by_category<'a>(txs: &[&'a Transaction], category: &str) -> Vec<&'a Transaction> {
    txs.iter()
        .copied()
        .filter(|t| t.category == category)
        .collect()
}

/// One transaction field viewed as text, for ad-hoc matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    BookingDate,
    Description,
    Amount,
    Flow,
    Category,
    RelationIban,
}

impl Column {
    fn text(self, tx: &Transaction) -> String {
        match self {
            Column::BookingDate => tx.booking_date.to_string(),
            Column::Description => tx.description.clone(),
            Column::Amount => tx.amount.to_string(),
            Column::Flow => match tx.flow {
                Some(Flow::Inflow) => "inflow".into(),
                Some(Flow::Outflow) => "outflow".into(),
                None => String::new(),
            },
            Column::Category => tx.category.clone(),
            Column::RelationIban => tx.relation_iban.clone(),
        }
    }
}

/// Whether any row's value in `column` matches the query: case-insensitive
/// equality when `strict`, the all-tokens-substring rule otherwise.
pub fn column_has_match(txs: &[&Transaction], column: Column, query: &str, strict: bool) -> bool {
    let query = query.to_lowercase();
    if strict {
        txs.iter().any(|t| column.text(t).to_lowercase() == query)
    } else {
        txs.iter().any(|t| {
            let text = column.text(t).to_lowercase();
            query.split_whitespace().all(|word| text.contains(word))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(date: &str, description: &str) -> Transaction {
        Transaction {
            booking_date: date.parse().unwrap(),
            description: description.into(),
            amount: 1.0,
            flow: Some(Flow::Inflow),
            category: "Misc".into(),
            relation_iban: "NL01".into(),
        }
    }

    #[test]
    fn date_range_includes_both_bounds() {
        let a = tx("2024-01-01", "start");
        let b = tx("2024-01-15", "middle");
        let c = tx("2024-01-31", "end");
        let d = tx("2024-02-01", "outside");
        let all = vec![&a, &b, &c, &d];

        let hit = by_date_range(
            &all,
            "2024-01-01".parse().unwrap(),
            "2024-01-31".parse().unwrap(),
        )
        .unwrap();
        assert_eq!(hit.len(), 3);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let a = tx("2024-01-01", "x");
        let start: NaiveDate = "2024-02-01".parse().unwrap();
        let end: NaiveDate = "2024-01-01".parse().unwrap();
        let err = by_date_range(&[&a], start, end).unwrap_err();
        assert_eq!(err, MetricError::InvalidRange { start, end });
    }

    #[test]
    fn description_match_requires_every_token() {
        assert!(description_matches("Payment for Badkamer BV", "badkamer payment"));
        assert!(!description_matches("Payment for Badkamer BV", "badkamer rent"));
        assert!(description_matches("anything", ""));
    }

    #[test]
    fn strict_column_match_is_equality() {
        let a = tx("2024-01-01", "coffee beans");
        assert!(column_has_match(&[&a], Column::Description, "Coffee Beans", true));
        assert!(!column_has_match(&[&a], Column::Description, "coffee", true));
        assert!(column_has_match(&[&a], Column::Description, "coffee", false));
    }
}
