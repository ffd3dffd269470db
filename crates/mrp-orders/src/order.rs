//! 採購單、生產工單與作業

use chrono::NaiveDate;
use mrp_core::{MrpError, Period, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 採購單狀態（只能前進）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseOrderStatus {
    Pending,
    Approved,
    Sent,
    Received,
}

impl PurchaseOrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Sent => "sent",
            Self::Received => "received",
        }
    }
}

impl fmt::Display for PurchaseOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 採購單
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: String,
    pub item_id: String,
    pub quantity: Decimal,
    pub supplier: Option<String>,
    pub unit_price: Option<Decimal>,

    /// 下達期別與日期
    pub release_period: Period,
    pub release_date: NaiveDate,

    /// 到貨期別與日期（下達期別 + 提前期）
    pub due_period: Period,
    pub due_date: NaiveDate,

    status: PurchaseOrderStatus,
}

/// 採購單修改內容（未指定的欄位保持不變）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrderEdit {
    pub quantity: Option<Decimal>,
    pub supplier: Option<String>,
    pub unit_price: Option<Decimal>,
    pub due_date: Option<NaiveDate>,
}

impl PurchaseOrder {
    pub fn new(
        id: impl Into<String>,
        item_id: impl Into<String>,
        quantity: Decimal,
        (release_period, release_date): (Period, NaiveDate),
        (due_period, due_date): (Period, NaiveDate),
    ) -> Self {
        Self {
            id: id.into(),
            item_id: item_id.into(),
            quantity,
            supplier: None,
            unit_price: None,
            release_period,
            release_date,
            due_period,
            due_date,
            status: PurchaseOrderStatus::Pending,
        }
    }

    pub fn with_supplier(mut self, supplier: Option<String>, unit_price: Option<Decimal>) -> Self {
        self.supplier = supplier;
        self.unit_price = unit_price;
        self
    }

    pub fn status(&self) -> PurchaseOrderStatus {
        self.status
    }

    /// 訂單金額（未設定單價時為 0）
    pub fn total_value(&self) -> Result<Decimal> {
        self.unit_price
            .unwrap_or(Decimal::ZERO)
            .checked_mul(self.quantity)
            .ok_or_else(|| MrpError::InvalidQuantity(format!("採購單 {} 金額溢位", self.id)))
    }

    /// pending → approved
    pub fn approve(&mut self) -> Result<()> {
        self.transition(PurchaseOrderStatus::Pending, PurchaseOrderStatus::Approved, "approve")
    }

    /// approved → sent
    pub fn send(&mut self) -> Result<()> {
        self.transition(PurchaseOrderStatus::Approved, PurchaseOrderStatus::Sent, "send")
    }

    /// sent → received
    pub fn receive(&mut self) -> Result<()> {
        self.transition(PurchaseOrderStatus::Sent, PurchaseOrderStatus::Received, "receive")
    }

    /// 尚未發送給供應商前可修改
    pub fn is_editable(&self) -> bool {
        matches!(
            self.status,
            PurchaseOrderStatus::Pending | PurchaseOrderStatus::Approved
        )
    }

    /// 套用修改；驗證失敗時訂單保持不變
    pub fn apply_edit(&mut self, edit: PurchaseOrderEdit) -> Result<()> {
        if !self.is_editable() {
            return Err(self.invalid("edit"));
        }
        if let Some(quantity) = edit.quantity {
            if quantity <= Decimal::ZERO {
                return Err(MrpError::InvalidQuantity(format!(
                    "採購單 {} 數量必須大於 0，收到 {}",
                    self.id, quantity
                )));
            }
        }
        if let Some(price) = edit.unit_price {
            if price < Decimal::ZERO {
                return Err(MrpError::InvalidQuantity(format!(
                    "採購單 {} 單價不可為負，收到 {}",
                    self.id, price
                )));
            }
        }

        if let Some(quantity) = edit.quantity {
            self.quantity = quantity;
        }
        if edit.supplier.is_some() {
            self.supplier = edit.supplier;
        }
        if edit.unit_price.is_some() {
            self.unit_price = edit.unit_price;
        }
        if let Some(due_date) = edit.due_date {
            self.due_date = due_date;
        }
        Ok(())
    }

    fn transition(
        &mut self,
        from: PurchaseOrderStatus,
        to: PurchaseOrderStatus,
        action: &str,
    ) -> Result<()> {
        if self.status != from {
            return Err(self.invalid(action));
        }
        self.status = to;
        Ok(())
    }

    fn invalid(&self, action: &str) -> MrpError {
        MrpError::InvalidTransition {
            order_id: self.id.clone(),
            from: self.status.to_string(),
            action: action.to_string(),
        }
    }
}

/// 作業狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    Pending,
    InProgress,
    Completed,
}

impl OperationStatus {
    /// 下一個狀態，已完成時為 None
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::InProgress),
            Self::InProgress => Some(Self::Completed),
            Self::Completed => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 生產作業
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub id: String,
    pub name: String,
    /// 途程中的順序（1 起算）
    pub sequence: u32,
    /// 標準工時（小時）
    pub duration_hours: Decimal,
    status: OperationStatus,
}

impl Operation {
    pub fn new(id: impl Into<String>, name: impl Into<String>, sequence: u32, duration_hours: Decimal) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            sequence,
            duration_hours,
            status: OperationStatus::Pending,
        }
    }

    pub fn status(&self) -> OperationStatus {
        self.status
    }

    /// 推進到下一個狀態，不可跳階
    fn set_status(&mut self, target: OperationStatus) -> std::result::Result<(), OperationStatus> {
        if self.status.next() == Some(target) {
            self.status = target;
            Ok(())
        } else {
            Err(self.status)
        }
    }
}

/// 生產工單狀態，由作業狀態推導
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductionOrderStatus {
    Planned,
    InProgress,
    Completed,
}

impl ProductionOrderStatus {
    /// 全部完成 → Completed；任一作業已開始 → InProgress；否則 Planned。
    /// 沒有作業的工單維持 Planned。
    pub fn derive(operations: &[Operation]) -> Self {
        if operations.is_empty() {
            return Self::Planned;
        }
        if operations.iter().all(|op| op.status == OperationStatus::Completed) {
            Self::Completed
        } else if operations.iter().any(|op| op.status != OperationStatus::Pending) {
            Self::InProgress
        } else {
            Self::Planned
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for ProductionOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 生產工單
///
/// 狀態欄位只在作業變動時重新推導，外部無法直接設定；
/// 反序列化時也一律由作業重新推導。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ProductionOrderRecord")]
pub struct ProductionOrder {
    pub id: String,
    pub item_id: String,
    pub quantity: Decimal,
    pub release_period: Period,
    pub release_date: NaiveDate,
    pub due_period: Period,
    pub due_date: NaiveDate,
    operations: Vec<Operation>,
    status: ProductionOrderStatus,
}

/// 載入用的工單資料；其中的狀態欄位不採信
#[derive(Deserialize)]
struct ProductionOrderRecord {
    id: String,
    item_id: String,
    quantity: Decimal,
    release_period: Period,
    release_date: NaiveDate,
    due_period: Period,
    due_date: NaiveDate,
    #[serde(default)]
    operations: Vec<Operation>,
}

impl From<ProductionOrderRecord> for ProductionOrder {
    fn from(record: ProductionOrderRecord) -> Self {
        ProductionOrder::new(
            record.id,
            record.item_id,
            record.quantity,
            (record.release_period, record.release_date),
            (record.due_period, record.due_date),
            record.operations,
        )
    }
}

impl ProductionOrder {
    pub fn new(
        id: impl Into<String>,
        item_id: impl Into<String>,
        quantity: Decimal,
        (release_period, release_date): (Period, NaiveDate),
        (due_period, due_date): (Period, NaiveDate),
        operations: Vec<Operation>,
    ) -> Self {
        let status = ProductionOrderStatus::derive(&operations);
        Self {
            id: id.into(),
            item_id: item_id.into(),
            quantity,
            release_period,
            release_date,
            due_period,
            due_date,
            operations,
            status,
        }
    }

    pub fn status(&self) -> ProductionOrderStatus {
        self.status
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn operation(&self, operation_id: &str) -> Option<&Operation> {
        self.operations.iter().find(|op| op.id == operation_id)
    }

    /// 完成進度（已完成作業百分比，取兩位小數）
    pub fn progress(&self) -> Decimal {
        if self.operations.is_empty() {
            return Decimal::ZERO;
        }
        let done = self
            .operations
            .iter()
            .filter(|op| op.status == OperationStatus::Completed)
            .count();
        (Decimal::from(done as u64) * Decimal::ONE_HUNDRED / Decimal::from(self.operations.len() as u64))
            .round_dp(2)
    }

    /// 推進作業一個狀態並重新推導工單狀態
    pub fn advance_operation(&mut self, operation_id: &str) -> Result<ProductionOrderStatus> {
        let current = self.find(operation_id)?.status;
        let target = current.next().ok_or_else(|| self.invalid_operation(operation_id, current, "advance"))?;
        self.set_operation_status(operation_id, target)
    }

    /// 將作業設為指定狀態（必須是下一個狀態）並重新推導工單狀態
    pub fn set_operation_status(
        &mut self,
        operation_id: &str,
        target: OperationStatus,
    ) -> Result<ProductionOrderStatus> {
        let order_id = self.id.clone();
        let operation = self
            .operations
            .iter_mut()
            .find(|op| op.id == operation_id)
            .ok_or_else(|| MrpError::OperationNotFound {
                order_id: order_id.clone(),
                operation_id: operation_id.to_string(),
            })?;

        operation.set_status(target).map_err(|from| MrpError::InvalidTransition {
            order_id: format!("{order_id}/{operation_id}"),
            from: from.to_string(),
            action: format!("set {target}"),
        })?;

        self.status = ProductionOrderStatus::derive(&self.operations);
        Ok(self.status)
    }

    fn find(&self, operation_id: &str) -> Result<&Operation> {
        self.operation(operation_id).ok_or_else(|| MrpError::OperationNotFound {
            order_id: self.id.clone(),
            operation_id: operation_id.to_string(),
        })
    }

    fn invalid_operation(&self, operation_id: &str, from: OperationStatus, action: &str) -> MrpError {
        MrpError::InvalidTransition {
            order_id: format!("{}/{}", self.id, operation_id),
            from: from.to_string(),
            action: action.to_string(),
        }
    }
}

/// 訂單（採購或生產）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Order {
    Purchase(PurchaseOrder),
    Production(ProductionOrder),
}

impl Order {
    pub fn id(&self) -> &str {
        match self {
            Order::Purchase(po) => &po.id,
            Order::Production(mo) => &mo.id,
        }
    }

    pub fn item_id(&self) -> &str {
        match self {
            Order::Purchase(po) => &po.item_id,
            Order::Production(mo) => &mo.item_id,
        }
    }

    pub fn quantity(&self) -> Decimal {
        match self {
            Order::Purchase(po) => po.quantity,
            Order::Production(mo) => mo.quantity,
        }
    }

    pub fn release_period(&self) -> Period {
        match self {
            Order::Purchase(po) => po.release_period,
            Order::Production(mo) => mo.release_period,
        }
    }

    /// 狀態名稱（pending / in_progress ...）
    pub fn status_label(&self) -> &'static str {
        match self {
            Order::Purchase(po) => po.status.as_str(),
            Order::Production(mo) => mo.status.as_str(),
        }
    }

    pub fn as_purchase(&self) -> Option<&PurchaseOrder> {
        match self {
            Order::Purchase(po) => Some(po),
            Order::Production(_) => None,
        }
    }

    pub fn as_production(&self) -> Option<&ProductionOrder> {
        match self {
            Order::Production(mo) => Some(mo),
            Order::Purchase(_) => None,
        }
    }
}
