//! 預計收貨模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Period;

/// 預計收貨（已下達、尚未到貨的外部供應）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledReceipt {
    /// 收貨ID
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    /// 物料代碼
    pub item_id: String,
    /// 到貨期別
    pub period: Period,
    /// 收貨數量
    pub quantity: Decimal,
    /// 來源單據（如採購單號）
    #[serde(default)]
    pub source_ref: Option<String>,
}

impl ScheduledReceipt {
    /// 創建新的預計收貨
    pub fn new(item_id: impl Into<String>, period: Period, quantity: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            item_id: item_id.into(),
            period,
            quantity,
            source_ref: None,
        }
    }

    /// 建構器模式：設置來源單據
    pub fn with_source_ref(mut self, source_ref: impl Into<String>) -> Self {
        self.source_ref = Some(source_ref.into());
        self
    }
}
