//! 物料主檔模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 物料主檔
///
/// 物料在一次計劃執行中不可變；庫存只在引擎內部以工作副本形式變動。
/// 低階碼不存放在物料上，由 [`crate::BomGraph`] 依結構推導。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// 物料代碼（唯一）
    pub id: String,
    /// 顯示名稱
    pub name: String,
    /// 計量單位
    #[serde(default = "default_unit")]
    pub unit: String,
    /// 提前期（期數）
    pub lead_time: u32,
    /// 現有庫存
    #[serde(default)]
    pub on_hand: Decimal,
    /// 批量規則
    #[serde(default)]
    pub lot_sizing_rule: LotSizingRule,
    /// 固定批量（FixedOrderQuantity 時必填）
    pub fixed_lot_size: Option<Decimal>,
    /// 最小訂購量
    pub minimum_order_qty: Option<Decimal>,
    /// 訂購倍數
    pub order_multiple: Option<Decimal>,
    /// 採購/生產標記
    #[serde(default)]
    pub procurement_type: ProcurementType,
    /// 預設供應商
    pub supplier: Option<String>,
    /// 採購單價
    pub unit_price: Option<Decimal>,
}

fn default_unit() -> String {
    "un".to_string()
}

impl Item {
    /// 創建新的物料（批對批、自製）
    pub fn new(id: impl Into<String>, name: impl Into<String>, lead_time: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            unit: default_unit(),
            lead_time,
            on_hand: Decimal::ZERO,
            lot_sizing_rule: LotSizingRule::LotForLot,
            fixed_lot_size: None,
            minimum_order_qty: None,
            order_multiple: None,
            procurement_type: ProcurementType::Make,
            supplier: None,
            unit_price: None,
        }
    }

    /// 建構器模式：設置現有庫存
    pub fn with_on_hand(mut self, on_hand: Decimal) -> Self {
        self.on_hand = on_hand;
        self
    }

    /// 建構器模式：設置計量單位
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    /// 建構器模式：設置批量規則
    pub fn with_lot_sizing_rule(mut self, rule: LotSizingRule) -> Self {
        self.lot_sizing_rule = rule;
        self
    }

    /// 建構器模式：設置固定批量
    pub fn with_fixed_lot_size(mut self, size: Decimal) -> Self {
        self.fixed_lot_size = Some(size);
        self
    }

    /// 建構器模式：設置最小訂購量
    pub fn with_minimum_order_qty(mut self, qty: Decimal) -> Self {
        self.minimum_order_qty = Some(qty);
        self
    }

    /// 建構器模式：設置訂購倍數
    pub fn with_order_multiple(mut self, multiple: Decimal) -> Self {
        self.order_multiple = Some(multiple);
        self
    }

    /// 建構器模式：標記為外購件，並設置供應商與單價
    pub fn purchased_from(mut self, supplier: impl Into<String>, unit_price: Decimal) -> Self {
        self.procurement_type = ProcurementType::Buy;
        self.supplier = Some(supplier.into());
        self.unit_price = Some(unit_price);
        self
    }

    /// 建構器模式：設置採購/生產標記
    pub fn with_procurement_type(mut self, procurement_type: ProcurementType) -> Self {
        self.procurement_type = procurement_type;
        self
    }

    /// 是否標記為外購
    pub fn is_externally_sourced(&self) -> bool {
        self.procurement_type == ProcurementType::Buy
    }

    /// 檢查物料參數，回傳所有違規描述
    pub fn violations(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.id.trim().is_empty() {
            problems.push("物料代碼不可為空".to_string());
        }
        if self.on_hand < Decimal::ZERO {
            problems.push(format!("物料 {} 現有庫存為負: {}", self.id, self.on_hand));
        }
        if self.lot_sizing_rule == LotSizingRule::FixedOrderQuantity {
            match self.fixed_lot_size {
                Some(size) if size > Decimal::ZERO => {}
                _ => problems.push(format!("物料 {} 使用固定批量但未設置正數批量", self.id)),
            }
        }
        for (label, value) in [
            ("最小訂購量", self.minimum_order_qty),
            ("訂購倍數", self.order_multiple),
        ] {
            if let Some(v) = value {
                if v <= Decimal::ZERO {
                    problems.push(format!("物料 {} {}必須為正數: {}", self.id, label, v));
                }
            }
        }
        problems
    }
}

/// 採購類型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProcurementType {
    /// 採購
    Buy,
    /// 生產
    #[default]
    Make,
}

/// 批量規則
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LotSizingRule {
    /// 批對批（Lot for Lot）- 按實際淨需求訂購
    #[default]
    LotForLot,
    /// 固定訂購量（Fixed Order Quantity）- 以固定批量的整數倍訂購
    FixedOrderQuantity,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_item() {
        let item = Item::new("BK-2", "Bicicleta BK-2", 0);

        assert_eq!(item.id, "BK-2");
        assert_eq!(item.lead_time, 0);
        assert_eq!(item.lot_sizing_rule, LotSizingRule::LotForLot);
        assert_eq!(item.on_hand, Decimal::ZERO);
        assert!(!item.is_externally_sourced());
        assert!(item.violations().is_empty());
    }

    #[test]
    fn test_item_builder() {
        let item = Item::new("Sa-1", "Selim Sa-1", 3)
            .with_on_hand(Decimal::from(5))
            .with_minimum_order_qty(Decimal::from(10))
            .purchased_from("Fornecedor A", Decimal::new(4590, 2));

        assert_eq!(item.on_hand, Decimal::from(5));
        assert_eq!(item.minimum_order_qty, Some(Decimal::from(10)));
        assert_eq!(item.supplier.as_deref(), Some("Fornecedor A"));
        assert_eq!(item.unit_price, Some(Decimal::new(4590, 2)));
        assert!(item.is_externally_sourced());
    }

    #[test]
    fn test_minimal_json() {
        let item: Item = serde_json::from_str(r#"{"id": "TU-1", "name": "Tubo", "lead_time": 1}"#).unwrap();

        assert_eq!(item, Item::new("TU-1", "Tubo", 1));
    }

    #[test]
    fn test_fixed_lot_without_size_is_rejected() {
        let item = Item::new("TU-1", "Tubo", 1)
            .with_lot_sizing_rule(LotSizingRule::FixedOrderQuantity)
            .with_on_hand(Decimal::from(-1));

        let problems = item.violations();
        assert_eq!(problems.len(), 2);
    }
}
