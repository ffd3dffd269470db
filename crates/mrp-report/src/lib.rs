//! # MRP Report
//!
//! 計劃結果與訂單的彙總報表。全部是純函數，不修改輸入。

pub mod inventory;
pub mod orders;
pub mod series;

pub use inventory::{inventory_snapshot, items_by_level, InventoryPosition};
pub use orders::{order_counts, purchase_value, purchase_value_by_supplier, OrderCounts};
pub use series::{item_series, mps_series, release_totals, PeriodPoint};

use mrp_calc::MrpResult;
use mrp_core::{MpsRow, PlanningSnapshot, Result};
use mrp_orders::Order;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// 計劃執行總覽
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanningReport {
    /// 各成品 MPS 序列
    pub mps: BTreeMap<String, Vec<MpsRow>>,
    pub inventory: Vec<InventoryPosition>,
    pub items_by_level: BTreeMap<u32, Vec<String>>,
    pub release_totals: BTreeMap<String, Decimal>,
    pub orders: OrderCounts,
    pub purchase_value: Decimal,
    pub warning_count: usize,
}

impl PlanningReport {
    pub fn build(snapshot: &PlanningSnapshot, result: &MrpResult, orders: &[Order]) -> Result<Self> {
        let mps = snapshot
            .mps
            .items()
            .into_iter()
            .map(|item_id| {
                let series = mps_series(snapshot, &item_id)?;
                Ok((item_id, series))
            })
            .collect::<Result<BTreeMap<_, _>>>()?;

        Ok(Self {
            mps,
            inventory: inventory_snapshot(snapshot, &result.rows),
            items_by_level: items_by_level(&result.rows),
            release_totals: release_totals(&result.rows)?,
            orders: order_counts(orders),
            purchase_value: purchase_value(orders)?,
            warning_count: result.warnings.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use mrp_calc::MrpCalculator;
    use mrp_core::{Item, PlanningHorizon, PlanningParameters};
    use mrp_orders::{OrderGenerator, RoutingBook};

    #[test]
    fn test_build_report() {
        let horizon = PlanningHorizon::new(NaiveDate::from_ymd_opt(2024, 6, 13).unwrap(), 12).unwrap();
        let snap = PlanningSnapshot::new(horizon)
            .with_parameters(PlanningParameters::lot_for_lot())
            .with_item(Item::new("BK-2", "Bicicleta", 0).with_on_hand(Decimal::from(50)))
            .with_item(
                Item::new("Sa-1", "Selim", 3)
                    .with_on_hand(Decimal::from(5))
                    .purchased_from("Fornecedor A", Decimal::new(4590, 2)),
            )
            .with_relation("BK-2", "Sa-1", Decimal::ONE)
            .with_demand("BK-2", 11, Decimal::from(18));

        let result = MrpCalculator::run(&snap).unwrap();
        let routings = RoutingBook::new();
        let orders = OrderGenerator::new(&snap, &routings)
            .unwrap()
            .generate(&result.rows)
            .unwrap();
        let report = PlanningReport::build(&snap, &result, &orders).unwrap();

        assert_eq!(report.mps["BK-2"].len(), 12);
        assert_eq!(report.release_totals["Sa-1"], Decimal::from(13));
        assert_eq!(report.orders.purchase_total(), 1);
        assert_eq!(report.orders.production_total(), 1);
        assert_eq!(report.purchase_value, Decimal::new(59670, 2));
        assert_eq!(report.items_by_level[&1], vec!["Sa-1"]);
        assert_eq!(report.warning_count, 0);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["orders"]["purchase"]["pending"], 1);
    }
}
