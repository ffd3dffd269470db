//! 批量規則實現

use mrp_core::{Item, LotSizingRule, MrpError};
use rust_decimal::Decimal;

/// 批量規則計算器
pub struct LotSizingCalculator;

impl LotSizingCalculator {
    /// 將單期淨需求轉為計劃訂單數量
    ///
    /// `fallback_minimum` 只在物料本身沒有最小訂購量時套用（外購件的系統最小採購批量）。
    pub fn order_quantity(
        item: &Item,
        net_requirement: Decimal,
        fallback_minimum: Option<Decimal>,
    ) -> mrp_core::Result<Decimal> {
        if net_requirement <= Decimal::ZERO {
            return Ok(Decimal::ZERO);
        }

        let quantity = match item.lot_sizing_rule {
            LotSizingRule::LotForLot => net_requirement,
            LotSizingRule::FixedOrderQuantity => {
                let lot = item
                    .fixed_lot_size
                    .filter(|size| *size > Decimal::ZERO)
                    .ok_or_else(|| {
                        MrpError::InvalidParameter(format!("物料 {} 缺少固定批量", item.id))
                    })?;
                // 以整批數補足淨需求
                let batches = net_requirement
                    .checked_div(lot)
                    .map(|batches| batches.ceil())
                    .and_then(|batches| batches.checked_mul(lot));
                Self::within_range(item, batches)?
            }
        };

        Self::adjust(item, quantity, fallback_minimum)
    }

    /// 套用最小訂購量與訂購倍數
    fn adjust(
        item: &Item,
        mut quantity: Decimal,
        fallback_minimum: Option<Decimal>,
    ) -> mrp_core::Result<Decimal> {
        if let Some(min_qty) = item.minimum_order_qty.or(fallback_minimum) {
            if quantity < min_qty {
                quantity = min_qty;
            }
        }

        if let Some(multiple) = item.order_multiple {
            if multiple > Decimal::ZERO {
                let remainder = Self::within_range(item, quantity.checked_rem(multiple))?;
                if remainder > Decimal::ZERO {
                    quantity = Self::within_range(item, (quantity - remainder).checked_add(multiple))?;
                }
            }
        }

        Ok(quantity)
    }

    fn within_range(item: &Item, quantity: Option<Decimal>) -> mrp_core::Result<Decimal> {
        quantity.ok_or_else(|| MrpError::InvalidQuantity(format!("物料 {} 批量調整後數量溢位", item.id)))
    }
}
