//! 性質測試：低階碼、冪等、淨需求與提前期偏移

use chrono::NaiveDate;
use mrp::*;
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::HashSet;

const PERIODS: u32 = 10;

fn horizon() -> PlanningHorizon {
    PlanningHorizon::new(NaiveDate::from_ymd_opt(2024, 6, 13).unwrap(), PERIODS).unwrap()
}

/// 隨機無環 BOM：關係只從較小編號指向較大編號，需求只放在不會成為子件的 I0
fn snapshot_strategy() -> impl Strategy<Value = PlanningSnapshot> {
    (2usize..8)
        .prop_flat_map(|n| {
            (
                prop::collection::vec((0u32..4, 0i64..60), n),
                prop::collection::vec((0..n, 0..n, 1i64..4), 0..n * 2),
                prop::collection::vec((1u32..=PERIODS, 0i64..40), 1..6),
                prop::collection::vec((0..n, 1u32..=PERIODS, 0i64..20), 0..3),
            )
        })
        .prop_map(|(items, edges, demand, receipts)| {
            let mut snapshot =
                PlanningSnapshot::new(horizon()).with_parameters(PlanningParameters::lot_for_lot());

            for (i, (lead_time, on_hand)) in items.iter().enumerate() {
                snapshot = snapshot
                    .with_item(Item::new(format!("I{i}"), format!("Item {i}"), *lead_time).with_on_hand(Decimal::from(*on_hand)));
            }
            for (a, b, qty) in edges {
                if a != b {
                    let (parent, child) = (a.min(b), a.max(b));
                    snapshot = snapshot.with_relation(&format!("I{parent}"), &format!("I{child}"), Decimal::from(qty));
                }
            }
            for (period, qty) in demand {
                snapshot = snapshot.with_demand("I0", period, Decimal::from(qty));
            }
            for (i, period, qty) in receipts {
                snapshot = snapshot.with_receipt(ScheduledReceipt::new(format!("I{i}"), period, Decimal::from(qty)));
            }
            snapshot
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn level_invariant_holds_after_every_mutation(
        edges in prop::collection::vec((0usize..8, 0usize..8, 1i64..5), 0..24)
    ) {
        let mut graph = BomGraph::new();
        let mut accepted = Vec::new();

        for (a, b) in edges.iter().map(|(a, b, _)| (format!("I{a}"), format!("I{b}"))) {
            if graph.add_relation(&a, &b, Decimal::ONE).is_ok() {
                accepted.push((a, b));
            }
            for (parent, child) in &accepted {
                let parent_level = graph.level_of(parent).unwrap();
                let child_level = graph.level_of(child).unwrap();
                prop_assert!(child_level >= parent_level + 1, "{parent} → {child}");
            }
        }
    }

    #[test]
    fn planning_is_idempotent(snapshot in snapshot_strategy()) {
        let first = run_planning(&snapshot).unwrap();
        let second = run_planning(&snapshot).unwrap();
        prop_assert_eq!(first.rows, second.rows);
        prop_assert_eq!(first.warnings, second.warnings);
    }

    #[test]
    fn netting_law(snapshot in snapshot_strategy()) {
        let result = run_planning(&snapshot).unwrap();

        for item in &snapshot.items {
            let mut carry_in = item.on_hand;
            for row in result.rows_for(&item.id) {
                let expected = (row.gross_requirement - row.scheduled_receipt - carry_in).max(Decimal::ZERO);
                prop_assert_eq!(row.net_requirement, expected, "{} 期別 {}", item.id, row.period);
                prop_assert!(row.projected_inventory >= Decimal::ZERO);
                carry_in = row.projected_inventory;
            }
        }
    }

    #[test]
    fn offset_law(snapshot in snapshot_strategy()) {
        let result = run_planning(&snapshot).unwrap();
        let master_scheduled: HashSet<String> = snapshot.mps.items().into_iter().collect();

        for item in snapshot.items.iter().filter(|i| !master_scheduled.contains(&i.id)) {
            let rows: Vec<&MrpRow> = result.rows_for(&item.id).collect();

            for row in rows.iter().filter(|r| r.has_release()) {
                let receipt = row.period + item.lead_time;
                prop_assert!(receipt <= PERIODS);
                let target = rows[receipt as usize - 1];
                prop_assert!(target.net_requirement > Decimal::ZERO);
                prop_assert_eq!(target.planned_order_receipt, row.planned_order_release);
            }

            for row in rows.iter().filter(|r| r.net_requirement > Decimal::ZERO) {
                if row.period > item.lead_time {
                    let release = rows[(row.period - item.lead_time) as usize - 1];
                    prop_assert_eq!(release.planned_order_release, row.net_requirement);
                } else {
                    prop_assert!(result
                        .warnings_of(WarningKind::UnplannableRequirement)
                        .any(|w| w.item_id == item.id && w.period == row.period));
                }
            }
        }
    }
}
