//! 途程範本（由外部提供，用於建立生產作業）

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::order::Operation;

/// 途程步驟
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingStep {
    pub name: String,
    pub duration_hours: Decimal,
}

/// 物料的途程範本
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutingTemplate {
    pub steps: Vec<RoutingStep>,
}

impl RoutingTemplate {
    pub fn new() -> Self {
        Self::default()
    }

    /// 加入一個步驟（依加入順序排序）
    pub fn step(mut self, name: impl Into<String>, duration_hours: Decimal) -> Self {
        self.steps.push(RoutingStep {
            name: name.into(),
            duration_hours,
        });
        self
    }

    /// 為工單建立作業，編號為 `<工單>-OP<n>`
    pub fn operations(&self, order_id: &str) -> Vec<Operation> {
        self.steps
            .iter()
            .zip(1u32..)
            .map(|(step, seq)| {
                Operation::new(
                    format!("{order_id}-OP{seq}"),
                    step.name.clone(),
                    seq,
                    step.duration_hours,
                )
            })
            .collect()
    }
}

/// 途程來源
pub trait RoutingProvider: Send + Sync {
    fn routing_for(&self, item_id: &str) -> Option<RoutingTemplate>;
}

/// 以物料代碼索引的途程表
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoutingBook(HashMap<String, RoutingTemplate>);

impl RoutingBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_routing(mut self, item_id: impl Into<String>, template: RoutingTemplate) -> Self {
        self.0.insert(item_id.into(), template);
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl RoutingProvider for RoutingBook {
    fn routing_for(&self, item_id: &str) -> Option<RoutingTemplate> {
        self.0.get(item_id).cloned()
    }
}
