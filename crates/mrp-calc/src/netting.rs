//! 淨需求計算（單一物料逐期）

use mrp_core::{Item, MrpRow, Period, PlanningHorizon};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::lead_time::LeadTimeCalculator;
use crate::lot_sizing::LotSizingCalculator;
use crate::{checked_quantity, MrpWarning};

/// 計劃收貨來源
#[derive(Debug, Clone, Copy)]
pub enum ReceiptSource<'a> {
    /// 依淨需求與批量規則產生計劃收貨
    Netting { fallback_minimum: Option<Decimal> },
    /// 成品直接採用 MPS 生產計劃
    MasterSchedule(&'a BTreeMap<Period, Decimal>),
}

/// 單一物料計算結果
#[derive(Debug, Clone)]
pub struct ItemPlan {
    pub rows: Vec<MrpRow>,
    pub warnings: Vec<MrpWarning>,
}

impl ItemPlan {
    /// 計劃下達 (期別, 數量)
    pub fn releases(&self) -> impl Iterator<Item = (Period, Decimal)> + '_ {
        self.rows
            .iter()
            .filter(|r| r.has_release())
            .map(|r| (r.period, r.planned_order_release))
    }
}

/// 淨需求計算器
pub struct NettingCalculator;

impl NettingCalculator {
    /// 計算單一物料所有期別
    ///
    /// 每期：
    /// - 淨需求 = max(0, 毛需求 − 預計收貨 − 期初預計庫存)
    /// - 計劃收貨落在淨需求期別，下達期別 = 收貨期別 − 提前期；
    ///   下達期別早於第 1 期時捨棄並記錄 `UnplannableRequirement`
    /// - 預計庫存 = 期初 + 預計收貨 + 計劃收貨 − 毛需求，負值記錄 `UnmetDemand` 後取 0
    ///
    /// `gross` 與 `receipts` 以期別 1 為索引 0。
    pub fn calculate(
        item: &Item,
        level: u32,
        horizon: &PlanningHorizon,
        gross: &[Decimal],
        receipts: &[Decimal],
        source: ReceiptSource<'_>,
    ) -> mrp_core::Result<ItemPlan> {
        let mut rows: Vec<MrpRow> = horizon
            .dates()
            .into_iter()
            .map(|(period, date)| MrpRow::new(item.id.clone(), level, period, date))
            .collect();
        let mut warnings = Vec::new();
        let mut carry_in = item.on_hand;

        for idx in 0..rows.len() {
            let period = rows[idx].period;
            let gross_req = gross.get(idx).copied().unwrap_or(Decimal::ZERO);
            let scheduled = receipts.get(idx).copied().unwrap_or(Decimal::ZERO);

            let checked = |value: Option<Decimal>| checked_quantity(value, &item.id, period);

            let available = checked(scheduled.checked_add(carry_in))?;
            let net = checked(gross_req.checked_sub(available))?.max(Decimal::ZERO);

            let wanted = match source {
                ReceiptSource::Netting { fallback_minimum } => {
                    LotSizingCalculator::order_quantity(item, net, fallback_minimum)?
                }
                ReceiptSource::MasterSchedule(plan) => {
                    plan.get(&period).copied().unwrap_or(Decimal::ZERO)
                }
            };

            let mut planned_receipt = Decimal::ZERO;
            if wanted > Decimal::ZERO {
                match LeadTimeCalculator::release_period(period, item.lead_time) {
                    Ok(release) => {
                        if let Some(row) = rows.get_mut(release as usize - 1) {
                            row.planned_order_release =
                                checked(row.planned_order_release.checked_add(wanted))?;
                            planned_receipt = wanted;
                        }
                    }
                    Err(_) => {
                        let warning = MrpWarning::unplannable(&item.id, period, item.lead_time, wanted);
                        tracing::warn!("{}", warning.message);
                        warnings.push(warning);
                    }
                }
            }

            let raw = checked(available.checked_add(planned_receipt))?;
            let raw = checked(raw.checked_sub(gross_req))?;
            let projected = if raw < Decimal::ZERO {
                let warning = MrpWarning::unmet_demand(&item.id, period, -raw);
                tracing::warn!("{}", warning.message);
                warnings.push(warning);
                Decimal::ZERO
            } else {
                raw
            };

            let row = &mut rows[idx];
            row.gross_requirement = gross_req;
            row.scheduled_receipt = scheduled;
            row.net_requirement = net;
            row.planned_order_receipt = planned_receipt;
            row.projected_inventory = projected;

            carry_in = projected;
        }

        Ok(ItemPlan { rows, warnings })
    }
}
