//! 庫存快照與產品結構摘要

use mrp_core::{MrpRow, PlanningSnapshot};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// 單一物料的庫存位置
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryPosition {
    pub item_id: String,
    pub name: String,
    pub level: u32,
    /// 期初現有庫存
    pub on_hand: Decimal,
    /// 時界末預計庫存
    pub ending_inventory: Decimal,
    /// 時界內最低預計庫存
    pub lowest_inventory: Decimal,
}

/// 各物料庫存快照，依 (低階碼, 物料代碼) 排序
///
/// 沒有結果列的物料不列出。
pub fn inventory_snapshot(snapshot: &PlanningSnapshot, rows: &[MrpRow]) -> Vec<InventoryPosition> {
    let mut by_item: BTreeMap<(u32, &str), Vec<&MrpRow>> = BTreeMap::new();
    for row in rows {
        by_item.entry((row.level, row.item_id.as_str())).or_default().push(row);
    }

    by_item
        .into_iter()
        .filter_map(|((level, item_id), item_rows)| {
            let item = snapshot.item(item_id)?;
            let ending = item_rows.iter().max_by_key(|r| r.period)?.projected_inventory;
            let lowest = item_rows.iter().map(|r| r.projected_inventory).min()?;
            Some(InventoryPosition {
                item_id: item_id.to_string(),
                name: item.name.clone(),
                level,
                on_hand: item.on_hand,
                ending_inventory: ending,
                lowest_inventory: lowest,
            })
        })
        .collect()
}

/// 依低階碼分組的物料（組內依代碼排序）
pub fn items_by_level(rows: &[MrpRow]) -> BTreeMap<u32, Vec<String>> {
    let mut levels: BTreeMap<u32, Vec<String>> = BTreeMap::new();
    for row in rows {
        let ids = levels.entry(row.level).or_default();
        if !ids.contains(&row.item_id) {
            ids.push(row.item_id.clone());
        }
    }
    for ids in levels.values_mut() {
        ids.sort();
    }
    levels
}
