//! Report assembly: composes the ordered monthly KPI cards consumed by the
//! presentation layer.

use chrono::NaiveDate;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::core::metrics::{self, Direction, MetricError};
use crate::core::{Ledger, query};

/// Dutch display names, indexed by month number minus one.
const MONTH_NAMES_NL: [&str; 12] = [
    "Januari",
    "Februari",
    "Maart",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Augustus",
    "September",
    "Oktober",
    "November",
    "December",
];

/// Statutory-style rate applied to the tax card.
const TAX_RATE: f64 = 0.21;

/// Fixed multiplier converting runway months into days of cash.
const DAYS_PER_MONTH: f64 = 31.0;

/// Errors raised while assembling a report. Any one of them aborts the whole
/// assembly; no partial card array is ever produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    /// The reporting month was not in `YYYY-MM` form.
    MalformedMonth(String),
    /// Month number outside 1..=12. Defensive; unreachable through
    /// [`assemble`], which validates the month during parsing.
    UnknownMonth(u32),
    /// An aggregation failed.
    Metric(MetricError),
}

impl std::fmt::Display for ReportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportError::MalformedMonth(raw) => {
                write!(f, "malformed reporting month {raw:?}, expected YYYY-MM")
            }
            ReportError::UnknownMonth(month) => write!(f, "unknown month number: {month}"),
            ReportError::Metric(e) => write!(f, "metric error: {e}"),
        }
    }
}

impl std::error::Error for ReportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReportError::Metric(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MetricError> for ReportError {
    fn from(e: MetricError) -> Self {
        ReportError::Metric(e)
    }
}

/// Visualization kind of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Graph {
    Circle,
    Line,
    Bar,
    HorizontalBar,
    DoubleLine,
}

/// A ranked account → whole-unit amount mapping, serialized as a JSON object
/// whose keys appear in ranked order.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountTotals(pub Vec<(String, i64)>);

impl Serialize for AccountTotals {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (account, amount) in &self.0 {
            map.serialize_entry(account, amount)?;
        }
        map.end()
    }
}

/// One point of the expenses series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostPoint {
    pub name: String,
    pub kosten: f64,
}

/// One point of the runway series, truncated to whole months and days.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunwayPoint {
    pub name: String,
    pub runway: i64,
    pub days: i64,
}

/// Chart payload of a card; its shape follows the card's graph kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CardData {
    Costs(Vec<CostPoint>),
    Runway(Vec<RunwayPoint>),
    Flows(AccountTotals),
}

/// One unit of the assembled report. Optional fields are omitted from the
/// JSON entirely, so each card is a flat object carrying only its own keys.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Card {
    pub id: u32,
    pub title: String,
    pub subtitle: String,
    #[serde(rename = "isWelcome", skip_serializing_if = "Option::is_none")]
    pub is_welcome: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph: Option<Graph>,
    #[serde(rename = "dataKey", skip_serializing_if = "Option::is_none")]
    pub data_key: Option<&'static str>,
    #[serde(rename = "dataKey2", skip_serializing_if = "Option::is_none")]
    pub data_key2: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<CardData>,
    #[serde(
        rename = "invertPerformanceColors",
        skip_serializing_if = "Option::is_none"
    )]
    pub invert_performance_colors: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<&'static str>,
    #[serde(rename = "screenType", skip_serializing_if = "Option::is_none")]
    pub screen_type: Option<&'static str>,
}

impl Card {
    fn new(id: u32, title: impl Into<String>, subtitle: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            subtitle: subtitle.into(),
            is_welcome: None,
            graph: None,
            data_key: None,
            data_key2: None,
            value: None,
            data: None,
            invert_performance_colors: None,
            icon: None,
            prefix: None,
            screen_type: None,
        }
    }
}

/// Localized display name for a month number (1-12).
pub fn month_name(month: u32) -> Result<&'static str, ReportError> {
    month
        .checked_sub(1)
        .and_then(|i| MONTH_NAMES_NL.get(i as usize))
        .copied()
        .ok_or(ReportError::UnknownMonth(month))
}

fn parse_reporting_month(raw: &str) -> Result<(i32, u32), ReportError> {
    let malformed = || ReportError::MalformedMonth(raw.to_string());
    let (year, month) = raw.split_once('-').ok_or_else(malformed)?;
    let year: i32 = year.parse().map_err(|_| malformed())?;
    let month: u32 = month.parse().map_err(|_| malformed())?;
    if !(1..=12).contains(&month) {
        return Err(malformed());
    }
    Ok((year, month))
}

fn first_of_month(year: i32, month: u32) -> Result<NaiveDate, ReportError> {
    NaiveDate::from_ymd_opt(year, month, 1).ok_or(ReportError::UnknownMonth(month))
}

fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 { (year + 1, 1) } else { (year, month + 1) }
}

fn prev_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 { (year - 1, 12) } else { (year, month - 1) }
}

/// Assembles the eight-card monthly report for `reporting_month`
/// (`"YYYY-MM"`).
///
/// The current-month window runs from the first day of the month to the
/// first day of the next month, inclusive on both ends, so the boundary day
/// is shared with the following window. The previous-month window ends where
/// the current one starts.
pub fn assemble(ledger: &Ledger, reporting_month: &str) -> Result<Vec<Card>, ReportError> {
    let (year, month) = parse_reporting_month(reporting_month)?;
    let (next_year, next_mon) = next_month(year, month);
    let (prev_year, prev_mon) = prev_month(year, month);

    let current_start = first_of_month(year, month)?;
    let current_end = first_of_month(next_year, next_mon)?;
    let prev_start = first_of_month(prev_year, prev_mon)?;
    let prev_end = current_start;

    let curr_name = month_name(month)?;
    let prev_name = month_name(prev_mon)?;

    let all = ledger.all();
    let current = query::by_date_range(&all, current_start, current_end)?;
    let previous = query::by_date_range(&all, prev_start, prev_end)?;

    // Standing metric over the full ledger, not the reporting window.
    let average = metrics::average_monthly_expenses(&all, None, None)?;
    if average == 0.0 {
        return Err(MetricError::DivisionUndefined("runway with zero average monthly expenses").into());
    }
    let prev_runway = metrics::cash_on_hand(&all, Some(prev_start))? / average;
    let curr_runway = metrics::cash_on_hand(&all, Some(current_start))? / average;

    let cards = vec![
        Card {
            is_welcome: Some(true),
            ..Card::new(0, "Hey, [Naam],", "Het is weer zo ver!")
        },
        Card {
            graph: Some(Graph::Circle),
            value: Some(metrics::net_profit(&current)),
            ..Card::new(1, "Jouw netto winst", "Dit is jouw nette winst deze maand.")
        },
        Card {
            graph: Some(Graph::Line),
            data_key: Some("kosten"),
            data: Some(CardData::Costs(vec![
                CostPoint {
                    name: prev_name.to_string(),
                    kosten: metrics::expenses(&previous),
                },
                CostPoint {
                    name: curr_name.to_string(),
                    kosten: metrics::expenses(&current),
                },
            ])),
            invert_performance_colors: Some(true),
            ..Card::new(2, "Jouw totale kosten", "")
        },
        Card {
            graph: Some(Graph::Bar),
            data: Some(CardData::Flows(AccountTotals(
                metrics::top_accounts_by_flow(&current, Direction::In, 3),
            ))),
            ..Card::new(
                3,
                "Jouw omzet toppers",
                format!("Dit zijn jouw drie grootste partners in {curr_name}"),
            )
        },
        Card {
            graph: Some(Graph::HorizontalBar),
            data: Some(CardData::Flows(AccountTotals(
                metrics::top_accounts_by_flow(&current, Direction::Out, 3),
            ))),
            ..Card::new(
                4,
                "Jouw grootste partnerkosten",
                format!("Dit is een overzicht van jouw drie duurste partners in {curr_name}."),
            )
        },
        Card {
            graph: Some(Graph::DoubleLine),
            data: Some(CardData::Runway(vec![
                RunwayPoint {
                    name: prev_name.to_string(),
                    runway: prev_runway as i64,
                    days: (prev_runway * DAYS_PER_MONTH) as i64,
                },
                RunwayPoint {
                    name: curr_name.to_string(),
                    runway: curr_runway as i64,
                    days: (curr_runway * DAYS_PER_MONTH) as i64,
                },
            ])),
            data_key: Some("runway"),
            data_key2: Some("days"),
            ..Card::new(5, "Jouw cashbuffer deze maand", "")
        },
        Card {
            graph: Some(Graph::Circle),
            value: Some(metrics::revenue(&current) * TAX_RATE),
            icon: Some("money-bag"),
            prefix: Some("+€"),
            ..Card::new(
                6,
                "Jouw belasting deze maand",
                "Zoveel belasting krijg jij/ moet je betalen",
            )
        },
        Card {
            screen_type: Some("nextSteps"),
            ..Card::new(7, "Wat nu?", "Volgende stappen en aanbevelingen.")
        },
    ];

    Ok(cards)
}
