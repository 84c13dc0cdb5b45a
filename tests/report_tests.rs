use bank_wrapped::core::{Ledger, MetricError, RawTransaction};
use bank_wrapped::report::{self, CardData, ReportError};

fn raw(
    date: &str,
    description: &str,
    amount: f64,
    flow: &str,
    category: &str,
    iban: &str,
) -> RawTransaction {
    RawTransaction {
        booking_date: date.into(),
        description: Some(description.into()),
        amount,
        flow: flow.into(),
        category: category.into(),
        relation_iban: iban.into(),
    }
}

fn ledger(rows: Vec<RawTransaction>) -> Ledger {
    Ledger::from_rows(rows).unwrap()
}

fn october_ledger() -> Ledger {
    ledger(vec![
        raw("2025-10-05", "invoice", 1000.0, "inflow", "Sales", "NL01A"),
        raw("2025-10-10", "office", 200.0, "outflow", "Rent", "NL02B"),
    ])
}

#[test]
fn assemble_yields_eight_cards_in_fixed_order() {
    let cards = report::assemble(&october_ledger(), "2025-10").unwrap();

    assert_eq!(cards.len(), 8);
    let ids: Vec<u32> = cards.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![0, 1, 2, 3, 4, 5, 6, 7]);
    assert_eq!(cards[0].is_welcome, Some(true));
    assert_eq!(cards[7].screen_type, Some("nextSteps"));
}

#[test]
fn current_month_profit_and_tax_cards() {
    let cards = report::assemble(&october_ledger(), "2025-10").unwrap();

    assert_eq!(cards[1].value, Some(800.0));
    assert_eq!(cards[6].value, Some(1000.0 * 0.21));
    assert!(cards[3].subtitle.contains("Oktober"));
}

#[test]
fn costs_card_compares_previous_and_current_month() {
    let led = ledger(vec![
        raw("2025-09-12", "office", 150.0, "outflow", "Rent", "NL02B"),
        raw("2025-10-10", "office", 200.0, "outflow", "Rent", "NL02B"),
    ]);
    let cards = report::assemble(&led, "2025-10").unwrap();

    match cards[2].data.as_ref().unwrap() {
        CardData::Costs(points) => {
            assert_eq!(points.len(), 2);
            assert_eq!(points[0].name, "September");
            assert_eq!(points[0].kosten, 150.0);
            assert_eq!(points[1].name, "Oktober");
            assert_eq!(points[1].kosten, 200.0);
        }
        other => panic!("expected a costs series, got {other:?}"),
    }
    assert_eq!(cards[2].data_key, Some("kosten"));
    assert_eq!(cards[2].invert_performance_colors, Some(true));
}

#[test]
fn runway_card_truncates_months_and_days() {
    let led = ledger(vec![
        raw("2025-08-01", "invoice", 1000.0, "inflow", "Sales", "NL01A"),
        raw("2025-09-15", "office", 100.0, "outflow", "Rent", "NL02B"),
    ]);
    let cards = report::assemble(&led, "2025-10").unwrap();

    // Average monthly expenses: (0 + 100) / 2 = 50.
    // Cash at 2025-09-01 is 1000 (runway 20), at 2025-10-01 it is 900
    // (runway 18).
    match cards[5].data.as_ref().unwrap() {
        CardData::Runway(points) => {
            assert_eq!(points[0].name, "September");
            assert_eq!(points[0].runway, 20);
            assert_eq!(points[0].days, 620);
            assert_eq!(points[1].name, "Oktober");
            assert_eq!(points[1].runway, 18);
            assert_eq!(points[1].days, 558);
        }
        other => panic!("expected a runway series, got {other:?}"),
    }
    assert_eq!(cards[5].data_key, Some("runway"));
    assert_eq!(cards[5].data_key2, Some("days"));
}

#[test]
fn top_counterparty_cards_rank_the_current_window() {
    let led = ledger(vec![
        raw("2025-10-01", "a", 300.0, "inflow", "Sales", "A"),
        raw("2025-10-02", "b", 500.0, "inflow", "Sales", "B"),
        raw("2025-10-03", "c", 100.0, "inflow", "Sales", "C"),
        raw("2025-10-04", "d", 50.0, "inflow", "Sales", "D"),
        raw("2025-10-05", "rent", 80.0, "outflow", "Rent", "E"),
    ]);
    let cards = report::assemble(&led, "2025-10").unwrap();

    match cards[3].data.as_ref().unwrap() {
        CardData::Flows(totals) => {
            assert_eq!(
                totals.0,
                vec![("B".to_string(), 500), ("A".to_string(), 300), ("C".to_string(), 100)]
            );
        }
        other => panic!("expected account totals, got {other:?}"),
    }
    match cards[4].data.as_ref().unwrap() {
        CardData::Flows(totals) => {
            assert_eq!(totals.0[0], ("E".to_string(), 80));
        }
        other => panic!("expected account totals, got {other:?}"),
    }
}

#[test]
fn boundary_day_belongs_to_both_adjacent_windows() {
    // The window for a month ends on the first day of the next month,
    // inclusive, so a transaction dated exactly there counts twice.
    let led = ledger(vec![
        raw("2025-11-01", "invoice", 1000.0, "inflow", "Sales", "NL01A"),
        raw("2025-09-15", "office", 100.0, "outflow", "Rent", "NL02B"),
    ]);

    let october = report::assemble(&led, "2025-10").unwrap();
    let november = report::assemble(&led, "2025-11").unwrap();
    assert_eq!(october[1].value, Some(1000.0));
    assert_eq!(november[1].value, Some(1000.0));
}

#[test]
fn assembly_is_deterministic() {
    let led = october_ledger();
    let first = serde_json::to_string_pretty(&report::assemble(&led, "2025-10").unwrap()).unwrap();
    let second = serde_json::to_string_pretty(&report::assemble(&led, "2025-10").unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn cards_serialize_with_presentation_layer_keys() {
    let cards = report::assemble(&october_ledger(), "2025-10").unwrap();
    let value = serde_json::to_value(&cards).unwrap();

    let welcome = value[0].as_object().unwrap();
    let mut keys: Vec<&str> = welcome.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["id", "isWelcome", "subtitle", "title"]);

    assert_eq!(value[2]["dataKey"], "kosten");
    assert_eq!(value[2]["invertPerformanceColors"], true);
    assert!(value[3]["data"].is_object());
    assert_eq!(value[5]["dataKey2"], "days");
    assert_eq!(value[6]["icon"], "money-bag");
    assert_eq!(value[6]["prefix"], "+€");
    assert_eq!(value[7]["screenType"], "nextSteps");
    // Non-chart cards carry no graph key at all.
    assert!(value[0].get("graph").is_none());
    assert!(value[7].get("graph").is_none());
}

#[test]
fn zero_average_expenses_makes_runway_undefined() {
    let led = ledger(vec![raw(
        "2025-10-05",
        "invoice",
        1000.0,
        "inflow",
        "Sales",
        "NL01A",
    )]);
    let err = report::assemble(&led, "2025-10").unwrap_err();
    assert!(matches!(
        err,
        ReportError::Metric(MetricError::DivisionUndefined(_))
    ));
}

#[test]
fn empty_ledger_cannot_produce_a_report() {
    let err = report::assemble(&Ledger::default(), "2025-10").unwrap_err();
    assert!(matches!(
        err,
        ReportError::Metric(MetricError::DivisionUndefined(_))
    ));
}

#[test]
fn malformed_reporting_month_aborts_assembly() {
    let led = october_ledger();
    for raw_month in ["2025/10", "oktober", "2025-00", "2025-13"] {
        assert!(matches!(
            report::assemble(&led, raw_month),
            Err(ReportError::MalformedMonth(_))
        ));
    }
}

#[test]
fn january_report_compares_against_december_of_the_previous_year() {
    let led = ledger(vec![
        raw("2024-12-10", "office", 300.0, "outflow", "Rent", "NL02B"),
        raw("2025-01-10", "office", 100.0, "outflow", "Rent", "NL02B"),
    ]);
    let cards = report::assemble(&led, "2025-01").unwrap();

    match cards[2].data.as_ref().unwrap() {
        CardData::Costs(points) => {
            assert_eq!(points[0].name, "December");
            assert_eq!(points[0].kosten, 300.0);
            assert_eq!(points[1].name, "Januari");
            assert_eq!(points[1].kosten, 100.0);
        }
        other => panic!("expected a costs series, got {other:?}"),
    }
}
