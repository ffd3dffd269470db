//! # MRP Core
//!
//! 核心資料模型與類型定義

pub mod access;
pub mod bom;
pub mod config;
pub mod horizon;
pub mod item;
pub mod mps;
pub mod plan;
pub mod snapshot;
pub mod supply;

// Re-export 主要類型
pub use access::{Capability, CapabilitySet, Role};
pub use bom::{BomGraph, BomRelation};
pub use config::{MpsPolicy, ParameterUpdate, PlanningParameters};
pub use horizon::{BucketSize, PlanningHorizon};
pub use item::{Item, LotSizingRule, ProcurementType};
pub use mps::{MpsEntry, MpsLedger, MpsRow};
pub use plan::MrpRow;
pub use snapshot::PlanningSnapshot;
pub use supply::ScheduledReceipt;

/// 期別編號（1..=N）
pub type Period = u32;

/// MRP 錯誤類型
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MrpError {
    #[error("BOM 循環：加入 {parent} → {child} 會使 {parent} 成為自身的子件")]
    Cycle { parent: String, child: String },

    #[error("期別 {0} 超出計劃時界")]
    PeriodOutOfHorizon(Period),

    #[error("日期 {0} 超出計劃時界")]
    DateOutOfHorizon(chrono::NaiveDate),

    #[error("訂單 {order_id} 狀態 {from} 不允許執行 {action}")]
    InvalidTransition {
        order_id: String,
        from: String,
        action: String,
    },

    #[error("權限不足：缺少 {0:?}")]
    PermissionDenied(Capability),

    #[error("找不到物料: {0}")]
    UnknownItem(String),

    #[error("找不到訂單: {0}")]
    OrderNotFound(String),

    #[error("訂單編號重複: {0}")]
    DuplicateOrder(String),

    #[error("訂單 {order_id} 找不到作業: {operation_id}")]
    OperationNotFound {
        order_id: String,
        operation_id: String,
    },

    #[error("無效的數量: {0}")]
    InvalidQuantity(String),

    #[error("計劃輸入無效（{} 項）: {}", .0.len(), .0.join("; "))]
    InvalidInput(Vec<String>),

    #[error("無效的參數: {0}")]
    InvalidParameter(String),

    #[error("輸入解析錯誤: {0}")]
    Parse(String),
}

impl MrpError {
    /// 是否為時界外錯誤（期別或日期）
    pub fn is_out_of_horizon(&self) -> bool {
        matches!(
            self,
            MrpError::PeriodOutOfHorizon(_) | MrpError::DateOutOfHorizon(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, MrpError>;
