//! # MRP Orders
//!
//! 由計劃下達產生採購單與生產工單，並管理其狀態流轉

pub mod generator;
pub mod notify;
pub mod order;
pub mod routing;
pub mod workflow;

// Re-export 主要類型
pub use generator::OrderGenerator;
pub use notify::{DispatchOutcome, NotificationError, SupplierNotifier, TracingNotifier};
pub use order::{
    Operation, OperationStatus, Order, ProductionOrder, ProductionOrderStatus, PurchaseOrder,
    PurchaseOrderEdit, PurchaseOrderStatus,
};
pub use routing::{RoutingBook, RoutingProvider, RoutingStep, RoutingTemplate};
pub use workflow::OrderBook;
