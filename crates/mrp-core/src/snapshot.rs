//! 計劃快照：一次計劃執行的完整不可變輸入

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::{
    BomGraph, BomRelation, Item, MpsLedger, MrpError, Period, PlanningHorizon, PlanningParameters,
    Result, ScheduledReceipt,
};

/// 計劃快照
///
/// 由外部資料載入者提供；每次計劃執行只讀取自己的快照，
/// 因此多個快照可以平行計算互不干擾。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningSnapshot {
    pub horizon: PlanningHorizon,
    pub items: Vec<Item>,
    #[serde(default)]
    pub relations: Vec<BomRelation>,
    #[serde(default)]
    pub mps: MpsLedger,
    #[serde(default)]
    pub scheduled_receipts: Vec<ScheduledReceipt>,
    #[serde(default)]
    pub parameters: PlanningParameters,
}

impl PlanningSnapshot {
    /// 創建空快照（參數期數取自時界）
    pub fn new(horizon: PlanningHorizon) -> Self {
        let parameters = PlanningParameters {
            horizon_periods: horizon.len(),
            ..PlanningParameters::default()
        };
        Self {
            horizon,
            items: Vec::new(),
            relations: Vec::new(),
            mps: MpsLedger::new(),
            scheduled_receipts: Vec::new(),
            parameters,
        }
    }

    /// 從 JSON 載入
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| MrpError::Parse(e.to_string()))
    }

    /// 輸出為 JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| MrpError::Parse(e.to_string()))
    }

    /// 建構器模式：加入物料
    pub fn with_item(mut self, item: Item) -> Self {
        self.items.push(item);
        self
    }

    /// 建構器模式：加入 BOM 關係
    pub fn with_relation(mut self, parent_id: &str, child_id: &str, quantity_per: Decimal) -> Self {
        self.relations.push(BomRelation::new(parent_id, child_id, quantity_per));
        self
    }

    /// 建構器模式：寫入 MPS 需求
    pub fn with_demand(mut self, item_id: &str, period: Period, demand: Decimal) -> Self {
        self.mps.set_demand(item_id, period, demand);
        self
    }

    /// 建構器模式：加入預計收貨
    pub fn with_receipt(mut self, receipt: ScheduledReceipt) -> Self {
        self.scheduled_receipts.push(receipt);
        self
    }

    /// 建構器模式：設置計劃參數
    ///
    /// 快照已有時界，`horizon_periods` 一律改為時界期數。
    pub fn with_parameters(mut self, parameters: PlanningParameters) -> Self {
        self.parameters = PlanningParameters {
            horizon_periods: self.horizon.len(),
            ..parameters
        };
        self
    }

    /// 以代碼查詢物料
    pub fn item(&self, item_id: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.id == item_id)
    }

    /// 驗證快照並建立 BOM 圖
    ///
    /// BOM 循環是載入期結構錯誤，立即回傳 [`MrpError::Cycle`]；
    /// 其他輸入問題全部收集後以單一 [`MrpError::InvalidInput`] 回報。
    pub fn validate(&self) -> Result<BomGraph> {
        let mut problems = Vec::new();

        if let Err(e) = self.horizon.validate() {
            problems.push(e.to_string());
        }
        if self.parameters.horizon_periods != self.horizon.len() {
            problems.push(format!(
                "參數時界 {} 期與快照時界 {} 期不一致",
                self.parameters.horizon_periods,
                self.horizon.len()
            ));
        }

        let mut known: HashSet<&str> = HashSet::new();
        for item in &self.items {
            if !known.insert(item.id.as_str()) {
                problems.push(format!("物料代碼重複: {}", item.id));
            }
            problems.extend(item.violations());
        }

        let mut bom = BomGraph::new();
        for item in &self.items {
            bom.add_item(&item.id);
        }
        for relation in &self.relations {
            for id in [&relation.parent_id, &relation.child_id] {
                if !known.contains(id.as_str()) {
                    problems.push(format!(
                        "BOM 關係 {} → {} 引用不存在的物料 {}",
                        relation.parent_id, relation.child_id, id
                    ));
                }
            }
            match bom.add_relation(&relation.parent_id, &relation.child_id, relation.quantity_per) {
                Ok(()) => {}
                Err(e @ MrpError::Cycle { .. }) => return Err(e),
                Err(e) => problems.push(e.to_string()),
            }
        }

        for entry in self.mps.entries() {
            if !known.contains(entry.item_id.as_str()) {
                problems.push(format!("MPS 引用不存在的物料 {}", entry.item_id));
            } else if !bom.parents(&entry.item_id).is_empty() {
                problems.push(format!("MPS 物料 {} 不是頂層成品", entry.item_id));
            }
            if !self.horizon.contains(entry.period) {
                problems.push(format!("MPS {} 期別 {} 超出計劃時界", entry.item_id, entry.period));
            }
            if entry.demand < Decimal::ZERO {
                problems.push(format!("MPS {} 期別 {} 需求為負", entry.item_id, entry.period));
            }
        }

        for receipt in &self.scheduled_receipts {
            if !known.contains(receipt.item_id.as_str()) {
                problems.push(format!("預計收貨引用不存在的物料 {}", receipt.item_id));
            }
            if !self.horizon.contains(receipt.period) {
                problems.push(format!(
                    "預計收貨 {} 期別 {} 超出計劃時界",
                    receipt.item_id, receipt.period
                ));
            }
            if receipt.quantity < Decimal::ZERO {
                problems.push(format!("預計收貨 {} 數量為負", receipt.item_id));
            }
        }

        if problems.is_empty() {
            Ok(bom)
        } else {
            tracing::warn!("計劃快照驗證失敗：{} 項問題", problems.len());
            Err(MrpError::InvalidInput(problems))
        }
    }

    /// 物料代碼 → 物料
    pub fn item_map(&self) -> HashMap<&str, &Item> {
        self.items.iter().map(|i| (i.id.as_str(), i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn base() -> PlanningSnapshot {
        let horizon = PlanningHorizon::new(NaiveDate::from_ymd_opt(2024, 6, 13).unwrap(), 12).unwrap();
        PlanningSnapshot::new(horizon)
            .with_item(Item::new("BK-2", "Bicicleta", 0).with_on_hand(Decimal::from(50)))
            .with_item(Item::new("FR-2", "Quadro", 2).with_on_hand(Decimal::from(10)))
            .with_relation("BK-2", "FR-2", Decimal::ONE)
            .with_demand("BK-2", 11, Decimal::from(18))
    }

    #[test]
    fn test_valid_snapshot() {
        let bom = base().validate().unwrap();
        assert_eq!(bom.level_of("FR-2"), Some(1));
    }

    #[test]
    fn test_all_violations_reported() {
        let snapshot = base()
            .with_relation("FR-2", "GHOST", Decimal::ONE)
            .with_demand("FR-2", 3, Decimal::ONE)
            .with_demand("BK-2", 40, Decimal::ONE)
            .with_receipt(ScheduledReceipt::new("FR-2", 0, Decimal::ONE));

        match snapshot.validate() {
            Err(MrpError::InvalidInput(problems)) => {
                assert_eq!(problems.len(), 4, "{problems:?}");
            }
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_horizon_length_must_match_parameters() {
        let mut snapshot = base();
        assert_eq!(snapshot.parameters.horizon_periods, 12);

        snapshot.parameters.horizon_periods = 8;
        match snapshot.validate() {
            Err(MrpError::InvalidInput(problems)) => {
                assert_eq!(problems.len(), 1);
                assert!(problems[0].contains("不一致"), "{problems:?}");
            }
            other => panic!("expected InvalidInput, got {other:?}"),
        }

        // 建構器會把參數期數對齊時界
        let aligned = base().with_parameters(PlanningParameters {
            horizon_periods: 8,
            ..PlanningParameters::lot_for_lot()
        });
        assert_eq!(aligned.parameters.horizon_periods, 12);
        assert!(aligned.validate().is_ok());
    }

    #[test]
    fn test_cycle_is_fatal() {
        let snapshot = base().with_relation("FR-2", "BK-2", Decimal::ONE);
        assert!(matches!(snapshot.validate(), Err(MrpError::Cycle { .. })));
    }

    #[test]
    fn test_json_round_trip() {
        let snapshot = base();
        let json = snapshot.to_json().unwrap();
        let loaded = PlanningSnapshot::from_json(&json).unwrap();

        assert_eq!(loaded, snapshot);
        assert!(matches!(
            PlanningSnapshot::from_json("{"),
            Err(MrpError::Parse(_))
        ));
    }
}
