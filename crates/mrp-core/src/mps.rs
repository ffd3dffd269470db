//! 主生產排程（MPS）帳本

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{MpsPolicy, Period, PlanningHorizon, Result};

/// MPS 需求項目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MpsEntry {
    /// 成品代碼（必須是頂層物料）
    pub item_id: String,
    /// 期別
    pub period: Period,
    /// 需求數量
    pub demand: Decimal,
}

impl MpsEntry {
    /// 創建新的 MPS 項目
    pub fn new(item_id: impl Into<String>, period: Period, demand: Decimal) -> Self {
        Self {
            item_id: item_id.into(),
            period,
            demand,
        }
    }
}

/// MPS 單期檢視
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MpsRow {
    pub period: Period,
    pub date: NaiveDate,
    /// 毛需求
    pub demand: Decimal,
    /// 計劃生產
    pub production: Decimal,
    /// 預計庫存
    pub projected_inventory: Decimal,
}

/// MPS 帳本：每個 (成品, 期別) 最多一筆需求，後寫入者取代先寫入者
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<MpsEntry>", into = "Vec<MpsEntry>")]
pub struct MpsLedger {
    entries: BTreeMap<(String, Period), Decimal>,
}

impl MpsLedger {
    /// 創建空帳本
    pub fn new() -> Self {
        Self::default()
    }

    /// 寫入需求（取代同一物料同一期的舊值，不合併）
    pub fn set_demand(&mut self, item_id: impl Into<String>, period: Period, demand: Decimal) {
        self.entries.insert((item_id.into(), period), demand);
    }

    /// 查詢需求（無記錄為 0）
    pub fn demand(&self, item_id: &str, period: Period) -> Decimal {
        self.entries
            .get(&(item_id.to_string(), period))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// 所有項目（按物料、期別排序）
    pub fn entries(&self) -> impl Iterator<Item = MpsEntry> + '_ {
        self.entries
            .iter()
            .map(|((item_id, period), demand)| MpsEntry::new(item_id.clone(), *period, *demand))
    }

    /// 帳本中出現的成品（排序、去重）
    pub fn items(&self) -> Vec<String> {
        let mut items: Vec<String> = self.entries.keys().map(|(id, _)| id.clone()).collect();
        items.dedup();
        items
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 計劃生產量（按期別）
    ///
    /// - `Chase`：每期生產量等於需求，現有庫存不動用
    /// - `Net`：只補足扣除預計庫存後的缺口
    pub fn production_plan(
        &self,
        item_id: &str,
        on_hand: Decimal,
        horizon: &PlanningHorizon,
        policy: MpsPolicy,
    ) -> BTreeMap<Period, Decimal> {
        let mut inventory = on_hand;
        let mut plan = BTreeMap::new();

        for period in horizon.periods() {
            let demand = self.demand(item_id, period);
            let production = match policy {
                MpsPolicy::Chase => demand,
                MpsPolicy::Net => (demand - inventory).max(Decimal::ZERO),
            };
            inventory += production - demand;
            plan.insert(period, production);
        }

        plan
    }

    /// 逐期 MPS 檢視（需求、生產、預計庫存）
    pub fn rows(
        &self,
        item_id: &str,
        on_hand: Decimal,
        horizon: &PlanningHorizon,
        policy: MpsPolicy,
    ) -> Result<Vec<MpsRow>> {
        let plan = self.production_plan(item_id, on_hand, horizon, policy);
        let mut inventory = on_hand;

        plan.into_iter()
            .map(|(period, production)| {
                let demand = self.demand(item_id, period);
                inventory += production - demand;
                Ok(MpsRow {
                    period,
                    date: horizon.date_of(period)?,
                    demand,
                    production,
                    projected_inventory: inventory,
                })
            })
            .collect()
    }
}

impl From<Vec<MpsEntry>> for MpsLedger {
    fn from(entries: Vec<MpsEntry>) -> Self {
        let mut ledger = Self::new();
        for entry in entries {
            ledger.set_demand(entry.item_id, entry.period, entry.demand);
        }
        ledger
    }
}

impl From<MpsLedger> for Vec<MpsEntry> {
    fn from(ledger: MpsLedger) -> Self {
        ledger.entries().collect()
    }
}
