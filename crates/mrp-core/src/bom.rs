//! BOM 結構圖與低階碼計算

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::OnceLock;

use crate::{MrpError, Result};

/// BOM 關係（父件 → 子件 × 單位用量）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BomRelation {
    /// 父件代碼
    pub parent_id: String,
    /// 子件代碼
    pub child_id: String,
    /// 單位用量（每個父件需要的子件數量）
    pub quantity_per: Decimal,
}

impl BomRelation {
    /// 創建新的 BOM 關係
    pub fn new(parent_id: impl Into<String>, child_id: impl Into<String>, quantity_per: Decimal) -> Self {
        Self {
            parent_id: parent_id.into(),
            child_id: child_id.into(),
            quantity_per,
        }
    }
}

/// 產品結構有向無環圖
///
/// 節點按加入順序保存，所有查詢結果的順序都是確定的。
/// 低階碼在第一次查詢時計算並快取，任何 `add_relation` 都會使快取失效。
#[derive(Debug, Clone, Default)]
pub struct BomGraph {
    nodes: Vec<String>,
    index: HashMap<String, usize>,
    /// 父件索引 → [(子件索引, 單位用量)]
    children: Vec<Vec<(usize, Decimal)>>,
    /// 子件索引 → [父件索引]
    parents: Vec<Vec<usize>>,
    levels: OnceLock<Vec<u32>>,
}

impl BomGraph {
    /// 創建空的 BOM 圖
    pub fn new() -> Self {
        Self::default()
    }

    /// 由關係列表建立 BOM 圖，遇到循環立即失敗
    pub fn from_relations<'a>(relations: impl IntoIterator<Item = &'a BomRelation>) -> Result<Self> {
        let mut graph = Self::new();
        for relation in relations {
            graph.add_relation(&relation.parent_id, &relation.child_id, relation.quantity_per)?;
        }
        Ok(graph)
    }

    /// 登記物料節點（無父件也無子件的物料也會出現在層級中）
    pub fn add_item(&mut self, item_id: &str) {
        if self.index.contains_key(item_id) {
            return;
        }
        self.levels = OnceLock::new();
        self.intern(item_id);
    }

    /// 加入 BOM 關係
    ///
    /// 若子件已可到達父件（含自我參照），回傳 [`MrpError::Cycle`] 且圖不變。
    /// 重複的 (父件, 子件) 關係以新用量取代舊用量。
    pub fn add_relation(&mut self, parent_id: &str, child_id: &str, quantity_per: Decimal) -> Result<()> {
        if quantity_per <= Decimal::ZERO {
            return Err(MrpError::InvalidQuantity(format!(
                "{parent_id} → {child_id} 單位用量必須為正數: {quantity_per}"
            )));
        }

        if parent_id == child_id || self.reaches(child_id, parent_id) {
            tracing::debug!("拒絕 BOM 關係 {} → {}：形成循環", parent_id, child_id);
            return Err(MrpError::Cycle {
                parent: parent_id.to_string(),
                child: child_id.to_string(),
            });
        }

        let parent = self.intern(parent_id);
        let child = self.intern(child_id);

        match self.children[parent].iter_mut().find(|(c, _)| *c == child) {
            Some(edge) => edge.1 = quantity_per,
            None => {
                self.children[parent].push((child, quantity_per));
                self.parents[child].push(parent);
            }
        }

        self.levels = OnceLock::new();
        Ok(())
    }

    /// 是否包含此物料
    pub fn contains(&self, item_id: &str) -> bool {
        self.index.contains_key(item_id)
    }

    /// 所有物料（加入順序）
    pub fn items(&self) -> &[String] {
        &self.nodes
    }

    /// 節點數
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// 邊數
    pub fn edge_count(&self) -> usize {
        self.children.iter().map(Vec::len).sum()
    }

    /// 直接子件與單位用量
    pub fn children(&self, item_id: &str) -> Vec<(&str, Decimal)> {
        self.index
            .get(item_id)
            .map(|&idx| {
                self.children[idx]
                    .iter()
                    .map(|&(c, qty)| (self.nodes[c].as_str(), qty))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// 直接父件
    pub fn parents(&self, item_id: &str) -> Vec<&str> {
        self.index
            .get(item_id)
            .map(|&idx| self.parents[idx].iter().map(|&p| self.nodes[p].as_str()).collect())
            .unwrap_or_default()
    }

    /// 是否有子件（有子件的物料需自製）
    pub fn has_children(&self, item_id: &str) -> bool {
        self.index
            .get(item_id)
            .is_some_and(|&idx| !self.children[idx].is_empty())
    }

    /// 低階碼：物料在所有 BOM 路徑中出現的最大深度
    pub fn level_of(&self, item_id: &str) -> Option<u32> {
        self.index.get(item_id).map(|&idx| self.levels()[idx])
    }

    /// 最大低階碼
    pub fn max_level(&self) -> u32 {
        self.levels().iter().copied().max().unwrap_or(0)
    }

    /// 按低階碼分組的物料，組內按物料代碼排序
    pub fn items_by_level(&self) -> BTreeMap<u32, Vec<String>> {
        let levels = self.levels();
        let mut grouped: BTreeMap<u32, Vec<String>> = BTreeMap::new();
        for (idx, id) in self.nodes.iter().enumerate() {
            grouped.entry(levels[idx]).or_default().push(id.clone());
        }
        for ids in grouped.values_mut() {
            ids.sort();
        }
        grouped
    }

    /// 單層展開：每個直接子件需求 = 數量 × 單位用量
    ///
    /// 乘積超出 `Decimal` 範圍時回傳 [`MrpError::InvalidQuantity`]。
    pub fn explode(&self, item_id: &str, quantity: Decimal) -> Result<Vec<(String, Decimal)>> {
        self.children(item_id)
            .into_iter()
            .map(|(child, qty_per)| {
                let required = quantity.checked_mul(qty_per).ok_or_else(|| {
                    MrpError::InvalidQuantity(format!(
                        "{item_id} → {child} 展開數量溢位: {quantity} × {qty_per}"
                    ))
                })?;
                Ok((child.to_string(), required))
            })
            .collect()
    }

    fn intern(&mut self, item_id: &str) -> usize {
        if let Some(&idx) = self.index.get(item_id) {
            return idx;
        }
        let idx = self.nodes.len();
        self.nodes.push(item_id.to_string());
        self.index.insert(item_id.to_string(), idx);
        self.children.push(Vec::new());
        self.parents.push(Vec::new());
        idx
    }

    /// 從 `from` 沿子件方向是否可到達 `to`
    fn reaches(&self, from: &str, to: &str) -> bool {
        let (Some(&start), Some(&target)) = (self.index.get(from), self.index.get(to)) else {
            return false;
        };

        let mut visited = vec![false; self.nodes.len()];
        let mut stack = vec![start];
        while let Some(node) = stack.pop() {
            if node == target {
                return true;
            }
            if std::mem::replace(&mut visited[node], true) {
                continue;
            }
            stack.extend(self.children[node].iter().map(|&(c, _)| c));
        }
        false
    }

    fn levels(&self) -> &[u32] {
        self.levels.get_or_init(|| self.compute_levels())
    }

    /// 以拓撲順序（Kahn）計算最長路徑深度
    fn compute_levels(&self) -> Vec<u32> {
        let mut levels = vec![0u32; self.nodes.len()];
        let mut in_degree: Vec<usize> = self.parents.iter().map(Vec::len).collect();
        let mut queue: VecDeque<usize> = (0..self.nodes.len()).filter(|&i| in_degree[i] == 0).collect();

        while let Some(node) = queue.pop_front() {
            for &(child, _) in &self.children[node] {
                levels[child] = levels[child].max(levels[node] + 1);
                in_degree[child] -= 1;
                if in_degree[child] == 0 {
                    queue.push_back(child);
                }
            }
        }

        tracing::debug!("低階碼重新計算完成：{} 個物料", self.nodes.len());
        levels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn bike() -> BomGraph {
        let mut bom = BomGraph::new();
        bom.add_relation("BK-2", "FR-2", Decimal::ONE).unwrap();
        bom.add_relation("BK-2", "Sa-1", Decimal::ONE).unwrap();
        bom.add_relation("BK-2", "WH-1", Decimal::from(2)).unwrap();
        bom.add_relation("FR-2", "TU-1", Decimal::from(6)).unwrap();
        bom.add_relation("WH-1", "SP-1", Decimal::from(32)).unwrap();
        bom
    }

    #[rstest]
    #[case("BK-2", 0)]
    #[case("FR-2", 1)]
    #[case("WH-1", 1)]
    #[case("TU-1", 2)]
    #[case("SP-1", 2)]
    fn test_levels(#[case] item: &str, #[case] level: u32) {
        assert_eq!(bike().level_of(item), Some(level));
    }

    #[test]
    fn test_shared_component_takes_deepest_level() {
        let mut bom = bike();
        assert_eq!(bom.level_of("Sa-1"), Some(1));

        // Sa-1 同時被 TU-1（第 2 層）使用後應下移到第 3 層
        bom.add_relation("TU-1", "Sa-1", Decimal::ONE).unwrap();
        assert_eq!(bom.level_of("Sa-1"), Some(3));
        assert_eq!(bom.max_level(), 3);
    }

    #[test]
    fn test_cycle_rejected() {
        let mut bom = bike();
        let err = bom.add_relation("TU-1", "BK-2", Decimal::ONE).unwrap_err();
        assert_eq!(
            err,
            MrpError::Cycle {
                parent: "TU-1".to_string(),
                child: "BK-2".to_string()
            }
        );
        assert!(bom.add_relation("FR-2", "FR-2", Decimal::ONE).is_err());
        assert_eq!(bom.edge_count(), 5);
    }

    #[test]
    fn test_non_positive_quantity_rejected() {
        let mut bom = BomGraph::new();
        assert!(matches!(
            bom.add_relation("A", "B", Decimal::ZERO),
            Err(MrpError::InvalidQuantity(_))
        ));
    }

    #[test]
    fn test_explode() {
        let exploded = bike().explode("BK-2", Decimal::from(18)).unwrap();
        assert_eq!(
            exploded,
            vec![
                ("FR-2".to_string(), Decimal::from(18)),
                ("Sa-1".to_string(), Decimal::from(18)),
                ("WH-1".to_string(), Decimal::from(36)),
            ]
        );
        assert!(bike().explode("SP-1", Decimal::TEN).unwrap().is_empty());
    }

    #[test]
    fn test_explode_overflow_is_an_error() {
        let mut bom = BomGraph::new();
        bom.add_relation("A", "B", Decimal::from(1_000_000_000_000_000i64)).unwrap();

        let err = bom.explode("A", Decimal::from(10_000_000_000_000_000i64)).unwrap_err();
        assert!(matches!(err, MrpError::InvalidQuantity(_)));
    }

    #[test]
    fn test_items_by_level_sorted() {
        let grouped = bike().items_by_level();
        assert_eq!(grouped[&0], vec!["BK-2"]);
        assert_eq!(grouped[&1], vec!["FR-2", "Sa-1", "WH-1"]);
        assert_eq!(grouped[&2], vec!["SP-1", "TU-1"]);
    }

    #[test]
    fn test_duplicate_relation_replaces_quantity() {
        let mut bom = bike();
        bom.add_relation("BK-2", "WH-1", Decimal::from(3)).unwrap();
        assert_eq!(bom.edge_count(), 5);
        assert_eq!(bom.parents("WH-1"), vec!["BK-2"]);
        assert!(bom.children("BK-2").contains(&("WH-1", Decimal::from(3))));
    }
}
