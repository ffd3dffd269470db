//! MRP 主計算器

use mrp_core::{BomGraph, Item, MpsPolicy, PlanningSnapshot};
use rayon::prelude::*;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

use crate::netting::{NettingCalculator, ReceiptSource};
use crate::{checked_quantity, MrpResult};

/// MRP 計算器
///
/// 只持有一份已驗證的快照與其 BOM 圖；兩次執行之間不保留任何狀態。
pub struct MrpCalculator<'a> {
    snapshot: &'a PlanningSnapshot,

    /// BOM 圖（由快照關係建立，已含低階碼）
    bom_graph: BomGraph,

    items: HashMap<&'a str, &'a Item>,
}

impl<'a> MrpCalculator<'a> {
    /// 驗證快照並建立計算器
    pub fn new(snapshot: &'a PlanningSnapshot) -> mrp_core::Result<Self> {
        let bom_graph = snapshot.validate()?;
        Ok(Self {
            snapshot,
            bom_graph,
            items: snapshot.item_map(),
        })
    }

    /// 單次計劃執行入口
    pub fn run(snapshot: &PlanningSnapshot) -> mrp_core::Result<MrpResult> {
        MrpCalculator::new(snapshot)?.calculate()
    }

    /// 平行計算多個互相獨立的快照
    pub fn run_many(snapshots: &[PlanningSnapshot]) -> Vec<mrp_core::Result<MrpResult>> {
        snapshots.par_iter().map(MrpCalculator::run).collect()
    }

    /// 主 MRP 計算
    pub fn calculate(&self) -> mrp_core::Result<MrpResult> {
        let snapshot = self.snapshot;
        let horizon = &snapshot.horizon;
        let periods = horizon.len() as usize;

        tracing::info!(
            "開始 MRP 計算：物料 {} 筆，BOM 關係 {} 筆，MPS {} 筆，時界 {} 期",
            snapshot.items.len(),
            self.bom_graph.edge_count(),
            snapshot.mps.len(),
            periods
        );
        let start_time = std::time::Instant::now();

        // Step 1: 毛需求表歸零
        let mut gross: HashMap<&str, Vec<Decimal>> = self
            .items
            .keys()
            .map(|&id| (id, vec![Decimal::ZERO; periods]))
            .collect();

        // Step 2: 以 MPS 需求作為頂層毛需求
        for entry in snapshot.mps.entries() {
            if let Some(bucket) = gross.get_mut(entry.item_id.as_str()) {
                bucket[entry.period as usize - 1] = entry.demand;
            }
        }

        let mut receipts: HashMap<&str, Vec<Decimal>> = HashMap::new();
        for receipt in &snapshot.scheduled_receipts {
            let slot = &mut receipts
                .entry(receipt.item_id.as_str())
                .or_insert_with(|| vec![Decimal::ZERO; periods])[receipt.period as usize - 1];
            *slot = checked_quantity(slot.checked_add(receipt.quantity), &receipt.item_id, receipt.period)?;
        }

        let master_scheduled = snapshot.mps.items();
        let mut result = MrpResult::empty();

        // Step 3: 依低階碼由小到大逐層處理
        for (level, item_ids) in self.bom_graph.items_by_level() {
            tracing::debug!("處理第 {} 層：{:?}", level, item_ids);

            for item_id in &item_ids {
                let item = *self
                    .items
                    .get(item_id.as_str())
                    .ok_or_else(|| mrp_core::MrpError::UnknownItem(item_id.clone()))?;

                let production: BTreeMap<_, _>;
                let source = if snapshot.parameters.mps_policy == MpsPolicy::Chase
                    && master_scheduled.contains(item_id)
                {
                    production = snapshot
                        .mps
                        .production_plan(item_id, item.on_hand, horizon, MpsPolicy::Chase);
                    ReceiptSource::MasterSchedule(&production)
                } else {
                    ReceiptSource::Netting {
                        fallback_minimum: self.fallback_minimum(item),
                    }
                };

                // Step 4: 逐期淨需求、提前期偏移
                let item_gross = gross.remove(item_id.as_str()).unwrap_or_default();
                let item_receipts = receipts.get(item_id.as_str()).map(Vec::as_slice).unwrap_or(&[]);
                let plan = NettingCalculator::calculate(
                    item,
                    level,
                    horizon,
                    &item_gross,
                    item_receipts,
                    source,
                )?;

                // Step 5: 計劃下達展開為子件同期毛需求
                for (period, quantity) in plan.releases() {
                    for (child_id, child_qty) in self.bom_graph.explode(item_id, quantity)? {
                        if let Some(bucket) = gross.get_mut(child_id.as_str()) {
                            let slot = &mut bucket[period as usize - 1];
                            *slot = checked_quantity(slot.checked_add(child_qty), &child_id, period)?;
                        }
                        tracing::debug!(
                            "BOM 展開: {} → {} (數量: {}, 期別: {})",
                            item_id,
                            child_id,
                            child_qty,
                            period
                        );
                    }
                }

                result.rows.extend(plan.rows);
                result.warnings.extend(plan.warnings);
            }
        }

        result.calculation_time_ms = Some(start_time.elapsed().as_millis());

        tracing::info!("MRP 計算完成，耗時 {:?}", start_time.elapsed());
        tracing::info!(
            "計劃下達 {} 筆，警告 {} 筆",
            result.releases().count(),
            result.warnings.len()
        );

        Ok(result)
    }

    /// 外購件（無子件或標記外購）在未設置最小訂購量時套用系統最小採購批量
    fn fallback_minimum(&self, item: &Item) -> Option<Decimal> {
        let purchased = item.is_externally_sourced() || !self.bom_graph.has_children(&item.id);
        let lot = self.snapshot.parameters.minimum_purchase_lot;
        (purchased && lot > Decimal::ZERO).then_some(lot)
    }

    /// 獲取 BOM 圖引用
    pub fn bom_graph(&self) -> &BomGraph {
        &self.bom_graph
    }
}
