//! MRP 計算結果列

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Period;

/// MRP 結果列：每個 (物料, 期別) 一列
///
/// 每次計劃執行整批重算，不做增量修補。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MrpRow {
    /// 物料代碼
    pub item_id: String,
    /// 低階碼
    pub level: u32,
    /// 期別
    pub period: Period,
    /// 期別日期
    pub date: NaiveDate,
    /// 毛需求
    pub gross_requirement: Decimal,
    /// 預計收貨
    pub scheduled_receipt: Decimal,
    /// 預計庫存（已取下限 0）
    pub projected_inventory: Decimal,
    /// 淨需求
    pub net_requirement: Decimal,
    /// 計劃訂單收貨
    pub planned_order_receipt: Decimal,
    /// 計劃訂單下達（比收貨提前一個提前期）
    pub planned_order_release: Decimal,
}

impl MrpRow {
    /// 創建空白列
    pub fn new(item_id: impl Into<String>, level: u32, period: Period, date: NaiveDate) -> Self {
        Self {
            item_id: item_id.into(),
            level,
            period,
            date,
            gross_requirement: Decimal::ZERO,
            scheduled_receipt: Decimal::ZERO,
            projected_inventory: Decimal::ZERO,
            net_requirement: Decimal::ZERO,
            planned_order_receipt: Decimal::ZERO,
            planned_order_release: Decimal::ZERO,
        }
    }

    /// 此期是否有計劃下達
    pub fn has_release(&self) -> bool {
        self.planned_order_release > Decimal::ZERO
    }
}
