//! 訂單產生器：每個有計劃下達的 (物料, 期別) 產生一張訂單

use mrp_calc::lead_time::LeadTimeCalculator;
use mrp_core::{BomGraph, Item, MrpError, MrpRow, PlanningSnapshot, Result};

use crate::order::{Order, ProductionOrder, PurchaseOrder};
use crate::routing::RoutingProvider;

/// 訂單產生器
pub struct OrderGenerator<'a> {
    snapshot: &'a PlanningSnapshot,
    bom_graph: BomGraph,
    routings: &'a dyn RoutingProvider,
}

impl<'a> OrderGenerator<'a> {
    pub fn new(snapshot: &'a PlanningSnapshot, routings: &'a dyn RoutingProvider) -> Result<Self> {
        Ok(Self {
            snapshot,
            bom_graph: snapshot.validate()?,
            routings,
        })
    }

    /// 由 MRP 結果列產生訂單
    ///
    /// 無子件或標記外購的物料產生採購單，其餘產生生產工單。
    /// 訂單依 (低階碼, 物料, 期別) 排序編號：`PO-0001`、`MO-0001`。
    pub fn generate(&self, rows: &[MrpRow]) -> Result<Vec<Order>> {
        let mut releases: Vec<&MrpRow> = rows.iter().filter(|r| r.has_release()).collect();
        releases.sort_by(|a, b| {
            (a.level, &a.item_id, a.period).cmp(&(b.level, &b.item_id, b.period))
        });

        let mut purchase_seq = 0u32;
        let mut production_seq = 0u32;
        let mut orders = Vec::with_capacity(releases.len());

        for row in releases {
            let item = self
                .snapshot
                .item(&row.item_id)
                .ok_or_else(|| MrpError::UnknownItem(row.item_id.clone()))?;

            let horizon = &self.snapshot.horizon;
            let due_period = LeadTimeCalculator::receipt_period(row.period, item.lead_time, horizon)?;
            let release = (row.period, row.date);
            let due = (due_period, horizon.date_of(due_period)?);

            let order = if self.is_purchased(item) {
                purchase_seq += 1;
                let id = format!("PO-{purchase_seq:04}");
                Order::Purchase(
                    PurchaseOrder::new(id, &item.id, row.planned_order_release, release, due)
                        .with_supplier(item.supplier.clone(), item.unit_price),
                )
            } else {
                production_seq += 1;
                let id = format!("MO-{production_seq:04}");
                let operations = match self.routings.routing_for(&item.id) {
                    Some(template) => template.operations(&id),
                    None => {
                        tracing::warn!("物料 {} 沒有途程範本，工單 {} 不含作業", item.id, id);
                        Vec::new()
                    }
                };
                Order::Production(ProductionOrder::new(
                    id,
                    &item.id,
                    row.planned_order_release,
                    release,
                    due,
                    operations,
                ))
            };

            tracing::debug!(
                "產生訂單 {}：{} 數量 {} 下達期別 {}",
                order.id(),
                item.id,
                row.planned_order_release,
                row.period
            );
            orders.push(order);
        }

        tracing::info!(
            "訂單產生完成：採購單 {} 張，生產工單 {} 張",
            purchase_seq,
            production_seq
        );
        Ok(orders)
    }

    fn is_purchased(&self, item: &Item) -> bool {
        item.is_externally_sourced() || !self.bom_graph.has_children(&item.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{OperationStatus, ProductionOrderStatus, PurchaseOrderStatus};
    use crate::routing::{RoutingBook, RoutingTemplate};
    use chrono::NaiveDate;
    use mrp_calc::MrpCalculator;
    use mrp_core::{PlanningHorizon, PlanningParameters};
    use rust_decimal::Decimal;

    fn snapshot() -> PlanningSnapshot {
        let horizon = PlanningHorizon::new(NaiveDate::from_ymd_opt(2024, 6, 13).unwrap(), 12).unwrap();
        PlanningSnapshot::new(horizon)
            .with_parameters(PlanningParameters::lot_for_lot())
            .with_item(Item::new("BK-2", "Bicicleta BK-2", 0).with_on_hand(Decimal::from(50)))
            .with_item(Item::new("FR-2", "Quadro FR-2", 2).with_on_hand(Decimal::from(10)))
            .with_item(
                Item::new("Sa-1", "Selim Sa-1", 3)
                    .with_on_hand(Decimal::from(5))
                    .purchased_from("Fornecedor A", Decimal::new(4590, 2)),
            )
            .with_item(Item::new("TU-1", "Tubo TU-1", 1).with_on_hand(Decimal::from(100)))
            .with_relation("BK-2", "FR-2", Decimal::ONE)
            .with_relation("BK-2", "Sa-1", Decimal::ONE)
            .with_relation("FR-2", "TU-1", Decimal::from(6))
            .with_demand("BK-2", 11, Decimal::from(18))
    }

    fn routings() -> RoutingBook {
        RoutingBook::new().with_routing(
            "FR-2",
            RoutingTemplate::new()
                .step("Corte", Decimal::ONE)
                .step("Solda", Decimal::from(2))
                .step("Teste", Decimal::new(5, 1)),
        )
    }

    #[test]
    fn test_one_order_per_release() {
        let snap = snapshot();
        let result = MrpCalculator::run(&snap).unwrap();
        let book = routings();
        let orders = OrderGenerator::new(&snap, &book).unwrap().generate(&result.rows).unwrap();

        let ids: Vec<_> = orders.iter().map(|o| (o.id(), o.item_id())).collect();
        assert_eq!(ids, vec![("MO-0001", "BK-2"), ("MO-0002", "FR-2"), ("PO-0001", "Sa-1")]);
        assert_eq!(orders.len(), result.releases().count());
    }

    #[test]
    fn test_purchase_order_carries_sourcing() {
        let snap = snapshot();
        let result = MrpCalculator::run(&snap).unwrap();
        let book = routings();
        let orders = OrderGenerator::new(&snap, &book).unwrap().generate(&result.rows).unwrap();

        let po = orders.iter().find_map(Order::as_purchase).unwrap();
        assert_eq!(po.quantity, Decimal::from(13));
        assert_eq!(po.release_period, 8);
        assert_eq!(po.due_period, 11);
        assert_eq!(po.due_date, NaiveDate::from_ymd_opt(2024, 6, 23).unwrap());
        assert_eq!(po.supplier.as_deref(), Some("Fornecedor A"));
        assert_eq!(po.status(), PurchaseOrderStatus::Pending);
    }

    #[test]
    fn test_production_order_uses_routing() {
        let snap = snapshot();
        let result = MrpCalculator::run(&snap).unwrap();
        let book = routings();
        let orders = OrderGenerator::new(&snap, &book).unwrap().generate(&result.rows).unwrap();

        let frame = orders[1].as_production().unwrap();
        assert_eq!(frame.quantity, Decimal::from(8));
        assert_eq!(frame.release_period, 9);
        assert_eq!(frame.due_period, 11);
        assert_eq!(frame.status(), ProductionOrderStatus::Planned);

        let ops: Vec<_> = frame.operations().iter().map(|op| op.id.as_str()).collect();
        assert_eq!(ops, vec!["MO-0002-OP1", "MO-0002-OP2", "MO-0002-OP3"]);
        assert!(frame.operations().iter().all(|op| op.status() == OperationStatus::Pending));

        // 沒有途程的成品工單不含作業
        assert!(orders[0].as_production().unwrap().operations().is_empty());
    }

    #[test]
    fn test_unknown_item_in_rows() {
        let snap = snapshot();
        let book = RoutingBook::new();
        let mut row = MrpRow::new("GHOST", 0, 3, NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
        row.planned_order_release = Decimal::ONE;

        let generator = OrderGenerator::new(&snap, &book).unwrap();
        assert!(matches!(generator.generate(&[row]), Err(MrpError::UnknownItem(_))));
    }
}
