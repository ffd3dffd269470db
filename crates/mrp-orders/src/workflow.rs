//! 訂單簿：訂單狀態流轉
//!
//! 每張訂單一把鎖；同一訂單的轉換互斥，不同訂單之間互不影響。

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use mrp_core::{Capability, CapabilitySet, MrpError, Result};
use parking_lot::Mutex;
use std::sync::Arc;

use crate::notify::{DispatchOutcome, SupplierNotifier};
use crate::order::{OperationStatus, Order, ProductionOrder, PurchaseOrder, PurchaseOrderEdit};

/// 訂單簿
#[derive(Debug, Clone, Default)]
pub struct OrderBook {
    orders: Arc<DashMap<String, Arc<Mutex<Order>>>>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_orders(orders: impl IntoIterator<Item = Order>) -> Result<Self> {
        let book = Self::new();
        for order in orders {
            book.insert(order)?;
        }
        Ok(book)
    }

    /// 加入訂單
    ///
    /// 訂單只會轉換狀態、不會被取代；編號已存在時回傳
    /// [`MrpError::DuplicateOrder`]，原訂單不變。
    pub fn insert(&self, order: Order) -> Result<()> {
        match self.orders.entry(order.id().to_string()) {
            Entry::Occupied(existing) => Err(MrpError::DuplicateOrder(existing.key().clone())),
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(Mutex::new(order)));
                Ok(())
            }
        }
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// 訂單目前狀態的複本
    pub fn get(&self, order_id: &str) -> Result<Order> {
        Ok(self.entry(order_id)?.lock().clone())
    }

    /// 所有訂單複本（依編號排序）
    pub fn orders(&self) -> Vec<Order> {
        let entries: Vec<Arc<Mutex<Order>>> = self.orders.iter().map(|e| Arc::clone(e.value())).collect();
        let mut orders: Vec<Order> = entries.iter().map(|o| o.lock().clone()).collect();
        orders.sort_by(|a, b| a.id().cmp(b.id()));
        orders
    }

    /// 核准採購單
    pub fn approve(&self, order_id: &str, capabilities: &CapabilitySet) -> Result<PurchaseOrder> {
        capabilities.require(Capability::ApproveOrder)?;
        let po = self.with_purchase(order_id, "approve", |po| po.approve())?;
        tracing::info!("採購單 {} 已核准", order_id);
        Ok(po)
    }

    /// 發送採購單並通知供應商
    ///
    /// 狀態轉換先提交；通知失敗只回報在 [`DispatchOutcome`]，不回滾。
    pub fn send(
        &self,
        order_id: &str,
        capabilities: &CapabilitySet,
        notifier: &dyn SupplierNotifier,
    ) -> Result<DispatchOutcome> {
        capabilities.require(Capability::SendOrder)?;
        let po = self.with_purchase(order_id, "send", |po| po.send())?;
        tracing::info!("採購單 {} 已發送", order_id);

        let notification = notifier.notify_supplier(&po);
        if let Err(e) = &notification {
            tracing::warn!("採購單 {} 已發送，但供應商通知失敗: {}", order_id, e);
        }
        Ok(DispatchOutcome {
            order: po,
            notification,
        })
    }

    /// 登記採購單收貨
    pub fn receive(&self, order_id: &str, capabilities: &CapabilitySet) -> Result<PurchaseOrder> {
        capabilities.require(Capability::ReceiveOrder)?;
        let po = self.with_purchase(order_id, "receive", |po| po.receive())?;
        tracing::info!("採購單 {} 已收貨", order_id);
        Ok(po)
    }

    /// 修改尚未發送的採購單
    pub fn edit_purchase_order(
        &self,
        order_id: &str,
        edit: PurchaseOrderEdit,
        capabilities: &CapabilitySet,
    ) -> Result<PurchaseOrder> {
        capabilities.require(Capability::EditOrder)?;
        let po = self.with_purchase(order_id, "edit", |po| po.apply_edit(edit))?;
        tracing::info!("採購單 {} 已修改", order_id);
        Ok(po)
    }

    /// 推進生產作業一個狀態
    pub fn advance_operation(
        &self,
        order_id: &str,
        operation_id: &str,
        capabilities: &CapabilitySet,
    ) -> Result<ProductionOrder> {
        capabilities.require(Capability::AdvanceOperation)?;
        self.with_production(order_id, |mo| mo.advance_operation(operation_id))
    }

    /// 將生產作業設為指定狀態（必須是下一個狀態）
    pub fn set_operation_status(
        &self,
        order_id: &str,
        operation_id: &str,
        status: OperationStatus,
        capabilities: &CapabilitySet,
    ) -> Result<ProductionOrder> {
        capabilities.require(Capability::AdvanceOperation)?;
        self.with_production(order_id, |mo| mo.set_operation_status(operation_id, status))
    }

    fn entry(&self, order_id: &str) -> Result<Arc<Mutex<Order>>> {
        self.orders
            .get(order_id)
            .map(|e| Arc::clone(e.value()))
            .ok_or_else(|| MrpError::OrderNotFound(order_id.to_string()))
    }

    /// 在訂單鎖內執行採購單轉換，成功後回傳新狀態的複本
    fn with_purchase<T>(
        &self,
        order_id: &str,
        action: &str,
        f: impl FnOnce(&mut PurchaseOrder) -> Result<T>,
    ) -> Result<PurchaseOrder> {
        let entry = self.entry(order_id)?;
        let mut guard = entry.lock();
        match &mut *guard {
            Order::Purchase(po) => {
                f(po)?;
                Ok(po.clone())
            }
            Order::Production(mo) => Err(MrpError::InvalidTransition {
                order_id: order_id.to_string(),
                from: format!("production order ({})", mo.status()),
                action: action.to_string(),
            }),
        }
    }

    /// 在訂單鎖內變更作業並重新推導工單狀態
    fn with_production<T>(
        &self,
        order_id: &str,
        f: impl FnOnce(&mut ProductionOrder) -> Result<T>,
    ) -> Result<ProductionOrder> {
        let entry = self.entry(order_id)?;
        let mut guard = entry.lock();
        match &mut *guard {
            Order::Production(mo) => {
                f(mo)?;
                tracing::info!("工單 {} 狀態 {}，進度 {}%", mo.id, mo.status(), mo.progress());
                Ok(mo.clone())
            }
            Order::Purchase(po) => Err(MrpError::InvalidTransition {
                order_id: order_id.to_string(),
                from: format!("purchase order ({})", po.status()),
                action: "update operation".to_string(),
            }),
        }
    }
}
