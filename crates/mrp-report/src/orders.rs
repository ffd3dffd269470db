//! 訂單統計

use mrp_core::{MrpError, Result};
use mrp_orders::{Order, ProductionOrderStatus, PurchaseOrderStatus};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// 各狀態訂單數
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OrderCounts {
    pub purchase: BTreeMap<PurchaseOrderStatus, usize>,
    pub production: BTreeMap<ProductionOrderStatus, usize>,
}

impl OrderCounts {
    pub fn purchase_total(&self) -> usize {
        self.purchase.values().sum()
    }

    pub fn production_total(&self) -> usize {
        self.production.values().sum()
    }
}

pub fn order_counts(orders: &[Order]) -> OrderCounts {
    let mut counts = OrderCounts::default();
    for order in orders {
        match order {
            Order::Purchase(po) => *counts.purchase.entry(po.status()).or_insert(0) += 1,
            Order::Production(mo) => *counts.production.entry(mo.status()).or_insert(0) += 1,
        }
    }
    counts
}

/// 採購單總金額
pub fn purchase_value(orders: &[Order]) -> Result<Decimal> {
    orders
        .iter()
        .filter_map(Order::as_purchase)
        .try_fold(Decimal::ZERO, |total, po| add_value(total, po.total_value()?))
}

/// 各供應商採購金額（未指定供應商的訂單不計）
pub fn purchase_value_by_supplier(orders: &[Order]) -> Result<BTreeMap<String, Decimal>> {
    let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();
    for po in orders.iter().filter_map(Order::as_purchase) {
        if let Some(supplier) = &po.supplier {
            let total = totals.entry(supplier.clone()).or_insert(Decimal::ZERO);
            *total = add_value(*total, po.total_value()?)?;
        }
    }
    Ok(totals)
}

fn add_value(total: Decimal, value: Decimal) -> Result<Decimal> {
    total
        .checked_add(value)
        .ok_or_else(|| MrpError::InvalidQuantity("採購金額合計溢位".to_string()))
}
