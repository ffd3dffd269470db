//! 逐期序列

use chrono::NaiveDate;
use mrp_core::{MpsRow, MrpError, MrpRow, Period, PlanningSnapshot, Result};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// 單一物料單期的需求、供給與庫存
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodPoint {
    pub period: Period,
    pub date: NaiveDate,
    /// 毛需求
    pub demand: Decimal,
    /// 預計收貨 + 計劃收貨
    pub production: Decimal,
    pub inventory: Decimal,
}

/// 成品 MPS 序列（依快照的 MPS 策略）
pub fn mps_series(snapshot: &PlanningSnapshot, item_id: &str) -> Result<Vec<MpsRow>> {
    let item = snapshot
        .item(item_id)
        .ok_or_else(|| MrpError::UnknownItem(item_id.to_string()))?;
    snapshot.mps.rows(
        item_id,
        item.on_hand,
        &snapshot.horizon,
        snapshot.parameters.mps_policy,
    )
}

/// 由 MRP 結果列取出單一物料序列
pub fn item_series(rows: &[MrpRow], item_id: &str) -> Vec<PeriodPoint> {
    let mut points: Vec<PeriodPoint> = rows
        .iter()
        .filter(|r| r.item_id == item_id)
        .map(|r| PeriodPoint {
            period: r.period,
            date: r.date,
            demand: r.gross_requirement,
            production: r.scheduled_receipt + r.planned_order_receipt,
            inventory: r.projected_inventory,
        })
        .collect();
    points.sort_by_key(|p| p.period);
    points
}

/// 每個物料的計劃下達總量（只列有下達的物料）
pub fn release_totals(rows: &[MrpRow]) -> Result<BTreeMap<String, Decimal>> {
    let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();
    for row in rows.iter().filter(|r| r.has_release()) {
        let total = totals.entry(row.item_id.clone()).or_insert(Decimal::ZERO);
        *total = total.checked_add(row.planned_order_release).ok_or_else(|| {
            MrpError::InvalidQuantity(format!("物料 {} 計劃下達總量溢位", row.item_id))
        })?;
    }
    Ok(totals)
}
