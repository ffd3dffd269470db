//! # MRP
//!
//! 物料需求計劃引擎：MPS → 逐層 BOM 展開 → 淨需求 → 計劃訂單 → 採購單／生產工單
//!
//! ```
//! use chrono::NaiveDate;
//! use mrp::{run_planning, Item, PlanningHorizon, PlanningParameters, PlanningSnapshot};
//! use rust_decimal::Decimal;
//!
//! let horizon = PlanningHorizon::new(NaiveDate::from_ymd_opt(2024, 6, 13).unwrap(), 12)?;
//! let snapshot = PlanningSnapshot::new(horizon)
//!     .with_parameters(PlanningParameters::lot_for_lot())
//!     .with_item(Item::new("BK-2", "Bicicleta", 0).with_on_hand(Decimal::from(50)))
//!     .with_item(Item::new("FR-2", "Quadro", 2).with_on_hand(Decimal::from(10)))
//!     .with_relation("BK-2", "FR-2", Decimal::ONE)
//!     .with_demand("BK-2", 11, Decimal::from(18));
//!
//! let result = run_planning(&snapshot)?;
//! assert_eq!(result.row("FR-2", 9).unwrap().planned_order_release, Decimal::from(8));
//! # Ok::<(), mrp::MrpError>(())
//! ```

pub use mrp_calc::{MrpCalculator, MrpResult, MrpWarning, WarningKind, WarningSeverity};
pub use mrp_core::*;
pub use mrp_orders::{
    DispatchOutcome, NotificationError, Order, OrderBook, OrderGenerator, RoutingBook,
    RoutingProvider, RoutingTemplate, SupplierNotifier, TracingNotifier,
};
pub use mrp_report::PlanningReport;

/// 單次計劃執行：驗證快照後回傳所有 MRP 結果列與警告
///
/// 輸入有誤時整次執行失敗，錯誤列出所有問題。
pub fn run_planning(snapshot: &PlanningSnapshot) -> Result<MrpResult> {
    MrpCalculator::run(snapshot)
}

/// 計劃執行結果與其產生的訂單
#[derive(Debug, Clone)]
pub struct PlanningRun {
    pub result: MrpResult,
    pub orders: Vec<Order>,
}

impl PlanningRun {
    /// 將訂單放入訂單簿以進行後續流轉
    pub fn order_book(&self) -> Result<OrderBook> {
        OrderBook::from_orders(self.orders.iter().cloned())
    }

    pub fn report(&self, snapshot: &PlanningSnapshot) -> Result<PlanningReport> {
        PlanningReport::build(snapshot, &self.result, &self.orders)
    }
}

/// 執行計劃並產生訂單（需要 `RunPlanning` 權限）
pub fn plan_and_generate(
    snapshot: &PlanningSnapshot,
    routings: &dyn RoutingProvider,
    capabilities: &CapabilitySet,
) -> Result<PlanningRun> {
    capabilities.require(Capability::RunPlanning)?;

    let result = run_planning(snapshot)?;
    let orders = OrderGenerator::new(snapshot, routings)?.generate(&result.rows)?;
    tracing::info!(
        "計劃執行完成：結果列 {} 筆，訂單 {} 張，警告 {} 筆",
        result.rows.len(),
        orders.len(),
        result.warnings.len()
    );

    Ok(PlanningRun { result, orders })
}
