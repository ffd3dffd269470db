//! 供應商通知

use crate::order::PurchaseOrder;

/// 通知失敗
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotificationError {
    #[error("採購單 {0} 未指定供應商")]
    MissingSupplier(String),

    #[error("通知供應商 {supplier} 失敗: {reason}")]
    Delivery { supplier: String, reason: String },
}

/// 發送採購單時呼叫的外部通知（例如電子郵件）
pub trait SupplierNotifier: Send + Sync {
    fn notify_supplier(&self, order: &PurchaseOrder) -> Result<(), NotificationError>;
}

impl<F> SupplierNotifier for F
where
    F: Fn(&PurchaseOrder) -> Result<(), NotificationError> + Send + Sync,
{
    fn notify_supplier(&self, order: &PurchaseOrder) -> Result<(), NotificationError> {
        self(order)
    }
}

/// 只寫入日誌的通知器
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl SupplierNotifier for TracingNotifier {
    fn notify_supplier(&self, order: &PurchaseOrder) -> Result<(), NotificationError> {
        let supplier = order
            .supplier
            .as_deref()
            .ok_or_else(|| NotificationError::MissingSupplier(order.id.clone()))?;
        tracing::info!(
            "通知供應商 {}: 採購單 {} 物料 {} 數量 {} 到貨 {}",
            supplier,
            order.id,
            order.item_id,
            order.quantity,
            order.due_date
        );
        Ok(())
    }
}

/// 發送結果：狀態轉換已提交，通知結果另外回報
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchOutcome {
    /// 已轉為 sent 的採購單
    pub order: PurchaseOrder,
    pub notification: Result<(), NotificationError>,
}

impl DispatchOutcome {
    pub fn is_notified(&self) -> bool {
        self.notification.is_ok()
    }
}
