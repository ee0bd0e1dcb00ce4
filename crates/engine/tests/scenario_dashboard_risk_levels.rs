mod common;

use common::*;
use commitment::CommitmentError;
use core_types::{ActionPriority, RiskLevel};
use engine::{ReconciliationEngine, Snapshot};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn snapshot() -> Snapshot {
    Snapshot {
        positions: vec![
            // Two months of interest owed, delivered 50% above.
            position("P1", "CORE", dec!(10000), "2024-01-15"),
            // Still incubating: owed exactly the principal.
            position("P2", "CORE", dec!(10000), "2024-04-01T09:30:00Z"),
            position("P3", "SHADOW", dec!(10000), "2024-01-15"),
            // No brokerage account linked.
            position("P4", "BALANCED", dec!(50000), "2024-01-15"),
            position("P5", "DYNAMIC", dec!(250000), "not a date"),
            // Performance-share fund, 30% behind its principal.
            position("P6", "UNLIMITED", dec!(250000), "2023-12-01"),
        ],
        accounts: vec![
            linked_account("A1", "P1", dec!(10000), dec!(15000), dec!(450)),
            linked_account("A2", "P2", dec!(10000), dec!(10050), Decimal::ZERO),
            linked_account("A3", "P3", dec!(10000), dec!(10000), Decimal::ZERO),
            linked_account("A5", "P5", dec!(250000), dec!(250000), Decimal::ZERO),
            linked_account("A6a", "P6", dec!(125000), dec!(80000), dec!(5000)),
            linked_account("A6b", "P6", dec!(125000), dec!(90000), Decimal::ZERO),
        ],
        trades: vec![],
        managers: vec![],
    }
}

#[test]
fn scenario_dashboard_risk_levels() {
    let engine = ReconciliationEngine::from_settings(&settings()).unwrap();
    let dashboard = engine.dashboard(&snapshot(), day(2024, 5, 15));

    let p1 = &dashboard.gaps_at(RiskLevel::Critical)[0];
    assert_eq!(p1.position_id, "P1");
    assert_eq!(p1.expected_value, dec!(10300));
    assert_eq!(p1.actual_value, dec!(15450));
    assert_eq!(p1.gap_amount, dec!(5150));
    assert_eq!(p1.gap_pct, dec!(50));

    let low: Vec<&str> = dashboard
        .gaps_at(RiskLevel::Low)
        .iter()
        .map(|g| g.position_id.as_str())
        .collect();
    assert_eq!(low, vec!["P2", "P5"]);
    assert_eq!(dashboard.gaps_at(RiskLevel::Low)[0].expected_value, dec!(10000));

    let degraded = &dashboard.gaps_at(RiskLevel::Low)[1];
    assert!(degraded.deposit_date_fallback);
    assert_eq!(degraded.expected_value, dec!(250000));

    let p6 = &dashboard.gaps_at(RiskLevel::High)[0];
    assert_eq!(p6.position_id, "P6");
    assert_eq!(p6.expected_value, dec!(250000));
    assert_eq!(p6.actual_value, dec!(175000));
    assert_eq!(p6.gap_pct, dec!(-30));
    assert!(p6.recommendation.starts_with("Underperforming"));

    let errors: Vec<&str> = dashboard
        .gaps_at(RiskLevel::Error)
        .iter()
        .map(|g| g.position_id.as_str())
        .collect();
    assert_eq!(errors, vec!["P3", "P4"]);

    let summary = &dashboard.summary;
    assert_eq!(summary.positions, 6);
    assert_eq!(summary.counts[&RiskLevel::Medium], 0);
    assert_eq!(summary.degraded, 1);
    assert_eq!(summary.total_expected, dec!(520300));
    assert_eq!(summary.total_actual, dec!(450500));
    assert_eq!(summary.total_gap, dec!(-69800));
}

#[test]
fn scenario_dashboard_action_items() {
    let engine = ReconciliationEngine::from_settings(&settings()).unwrap();
    let dashboard = engine.dashboard(&snapshot(), day(2024, 5, 15));

    let items: Vec<(&str, RiskLevel, ActionPriority)> = dashboard
        .action_items
        .iter()
        .map(|item| (item.position_id.as_str(), item.risk_level, item.priority))
        .collect();

    // Snapshot order, one entry per position needing action.
    assert_eq!(
        items,
        vec![
            ("P1", RiskLevel::Critical, ActionPriority::High),
            ("P3", RiskLevel::Error, ActionPriority::Medium),
            ("P4", RiskLevel::Error, ActionPriority::Medium),
            ("P6", RiskLevel::High, ActionPriority::Medium),
        ]
    );
    assert_eq!(dashboard.summary.action_required, 4);
    assert!(dashboard.action_items.iter().all(|item| !item.recommendation.is_empty()));
}

#[test]
fn scenario_dashboard_is_reproducible() {
    let engine = ReconciliationEngine::from_settings(&settings()).unwrap();
    let snapshot = snapshot();

    let first = serde_json::to_string(&engine.dashboard(&snapshot, day(2024, 5, 15))).unwrap();
    let second = serde_json::to_string(&engine.dashboard(&snapshot, day(2024, 5, 15))).unwrap();

    assert_eq!(first, second);
}

#[test]
fn scenario_position_becomes_fully_redeemable() {
    let engine = ReconciliationEngine::from_settings(&settings()).unwrap();
    let snapshot = Snapshot {
        positions: vec![position("P1", "CORE", dec!(10000), "2024-01-15")],
        ..Snapshot::default()
    };

    let expected = engine.expected_performance(&snapshot, day(2025, 3, 20));

    assert_eq!(expected.len(), 1);
    let expected = expected[0].as_ref().unwrap();
    assert_eq!(expected.state, core_types::EligibilityState::FullyRedeemable);
    assert_eq!(expected.next_principal_redemption_date, day(2025, 4, 15));
}

#[test]
fn scenario_expected_performance_reports_unknown_funds() {
    let engine = ReconciliationEngine::from_settings(&settings()).unwrap();
    let snapshot = Snapshot {
        positions: vec![
            position("P1", "CORE", dec!(10000), "2024-01-15"),
            position("P2", "SHADOW", dec!(10000), "2024-01-15"),
            position("P3", "BALANCED", dec!(50000), "2024-01-15"),
        ],
        ..Snapshot::default()
    };

    let expected = engine.expected_performance(&snapshot, day(2024, 5, 15));

    assert_eq!(expected.len(), 3);
    assert_eq!(expected[0].as_ref().unwrap().position_id, "P1");
    assert_eq!(
        expected[1],
        Err(CommitmentError::UnknownFund("SHADOW".to_string()))
    );
    assert_eq!(expected[2].as_ref().unwrap().position_id, "P3");
}
