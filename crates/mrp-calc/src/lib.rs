//! # MRP Calculation Engine
//!
//! 核心 MRP 計算引擎：逐層展開 BOM，逐期做淨需求計算與提前期偏移

pub mod calculator;
pub mod lead_time;
pub mod lot_sizing;
pub mod netting;

// Re-export 主要類型
pub use calculator::MrpCalculator;
pub use netting::{ItemPlan, ReceiptSource};

use mrp_core::{MrpError, MrpRow, Period};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 數量運算溢位時轉為 [`MrpError::InvalidQuantity`]
pub(crate) fn checked_quantity(
    value: Option<Decimal>,
    item_id: &str,
    period: Period,
) -> mrp_core::Result<Decimal> {
    value.ok_or_else(|| {
        MrpError::InvalidQuantity(format!("物料 {item_id} 第 {period} 期數量超出可表示範圍"))
    })
}

/// MRP 計算結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MrpResult {
    /// 所有 (物料, 期別) 結果列，按低階碼、物料代碼、期別排序
    pub rows: Vec<MrpRow>,

    /// 警告信息
    pub warnings: Vec<MrpWarning>,

    /// 計算耗時（毫秒），不屬於結果列
    #[serde(skip)]
    pub calculation_time_ms: Option<u128>,
}

impl MrpResult {
    /// 創建空的計算結果
    pub fn empty() -> Self {
        Self {
            rows: Vec::new(),
            warnings: Vec::new(),
            calculation_time_ms: None,
        }
    }

    /// 添加警告
    pub fn add_warning(&mut self, warning: MrpWarning) {
        self.warnings.push(warning);
    }

    /// 單一物料的結果列
    pub fn rows_for<'a>(&'a self, item_id: &'a str) -> impl Iterator<Item = &'a MrpRow> + 'a {
        self.rows.iter().filter(move |r| r.item_id == item_id)
    }

    /// 單一 (物料, 期別) 結果列
    pub fn row(&self, item_id: &str, period: Period) -> Option<&MrpRow> {
        self.rows
            .iter()
            .find(|r| r.item_id == item_id && r.period == period)
    }

    /// 有計劃下達的結果列
    pub fn releases(&self) -> impl Iterator<Item = &MrpRow> {
        self.rows.iter().filter(|r| r.has_release())
    }

    /// 指定種類的警告
    pub fn warnings_of(&self, kind: WarningKind) -> impl Iterator<Item = &MrpWarning> {
        self.warnings.iter().filter(move |w| w.kind == kind)
    }
}

/// 警告種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// 下達期別落在時界之前，計劃訂單被捨棄
    UnplannableRequirement,
    /// 預計庫存在取下限前為負（需求未滿足）
    UnmetDemand,
}

/// MRP 警告
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MrpWarning {
    pub item_id: String,
    /// 需求（收貨）期別
    pub period: Period,
    /// 受影響數量
    pub quantity: Decimal,
    pub kind: WarningKind,
    pub severity: WarningSeverity,
    pub message: String,
}

impl MrpWarning {
    /// 無法排入時界的需求
    pub fn unplannable(item_id: &str, period: Period, lead_time: u32, quantity: Decimal) -> Self {
        Self {
            item_id: item_id.to_string(),
            period,
            quantity,
            kind: WarningKind::UnplannableRequirement,
            severity: WarningSeverity::Error,
            message: format!(
                "{item_id} 期別 {period} 需要 {quantity}，提前期 {lead_time} 使下達期別落在時界之前"
            ),
        }
    }

    /// 未滿足需求
    pub fn unmet_demand(item_id: &str, period: Period, shortfall: Decimal) -> Self {
        Self {
            item_id: item_id.to_string(),
            period,
            quantity: shortfall,
            kind: WarningKind::UnmetDemand,
            severity: WarningSeverity::Warning,
            message: format!("{item_id} 期別 {period} 缺料 {shortfall}，預計庫存取下限為 0"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningSeverity {
    Info,
    Warning,
    Error,
}
