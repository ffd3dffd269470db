//! # 腳踏車 MRP 計算完整範例
//!
//! 從 BK-2 的 MPS 需求出發：
//! - 逐層展開 BOM，計算各物料淨需求與計劃下達
//! - 產生採購單與生產工單
//! - 核准、發送採購單，推進生產作業
//! - 輸出彙總報表
//!
//! 執行：`cargo run --example bike_mrp [snapshot.json]`

use anyhow::Context;
use mrp::{
    plan_and_generate, Order, PlanningSnapshot, Role, RoutingBook, TracingNotifier, WarningKind,
};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("🚲 ===== 腳踏車 MRP 計算範例 =====\n");

    // ========== 1. 載入計劃快照 ==========
    let snapshot = match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path).with_context(|| format!("無法讀取 {path}"))?;
            PlanningSnapshot::from_json(&json)?
        }
        None => PlanningSnapshot::from_json(include_str!("bike.json"))?,
    };
    let routings: RoutingBook =
        serde_json::from_str(include_str!("routings.json")).context("途程資料格式錯誤")?;

    println!("📅 時界：{} 起 {} 期", snapshot.horizon.start_date(), snapshot.horizon.len());
    println!("🔧 物料 {} 筆，BOM 關係 {} 筆\n", snapshot.items.len(), snapshot.relations.len());

    // ========== 2. 執行 MRP ==========
    let manager = Role::Manager.capabilities();
    let run = plan_and_generate(&snapshot, &routings, &manager)?;

    println!("📊 MRP 結果（只列有需求或下達的期別）");
    println!(
        "   {:<6} {:>3} {:>4} {:>8} {:>8} {:>8} {:>8} {:>8}",
        "物料", "階", "期別", "毛需求", "預計收貨", "預計庫存", "淨需求", "計劃下達"
    );
    for row in run
        .result
        .rows
        .iter()
        .filter(|r| !r.gross_requirement.is_zero() || r.has_release())
    {
        println!(
            "   {:<6} {:>3} {:>4} {:>8} {:>8} {:>8} {:>8} {:>8}",
            row.item_id,
            row.level,
            row.period,
            row.gross_requirement,
            row.scheduled_receipt,
            row.projected_inventory,
            row.net_requirement,
            row.planned_order_release
        );
    }
    println!();

    for warning in run.result.warnings_of(WarningKind::UnplannableRequirement) {
        println!("   ⚠ {}", warning.message);
    }

    // ========== 3. 訂單 ==========
    println!("📦 產生訂單 {} 張", run.orders.len());
    for order in &run.orders {
        match order {
            Order::Purchase(po) => println!(
                "   {} {:<5} 數量 {:>4} 供應商 {:<14} 到貨 {} 金額 {}",
                po.id,
                po.item_id,
                po.quantity,
                po.supplier.as_deref().unwrap_or("-"),
                po.due_date,
                po.total_value()?
            ),
            Order::Production(mo) => println!(
                "   {} {:<5} 數量 {:>4} 作業 {} 道 下達 {} 完工 {}",
                mo.id,
                mo.item_id,
                mo.quantity,
                mo.operations().len(),
                mo.release_date,
                mo.due_date
            ),
        }
    }
    println!();

    // ========== 4. 訂單流轉 ==========
    let book = run.order_book()?;
    let buyer = Role::Buyer.capabilities();
    let operator = Role::Operator.capabilities();

    if let Some(po) = run.orders.iter().find_map(Order::as_purchase) {
        book.approve(&po.id, &manager)?;
        let outcome = book.send(&po.id, &buyer, &TracingNotifier)?;
        println!(
            "✉️  {} 狀態 {}，通知{}",
            outcome.order.id,
            outcome.order.status(),
            if outcome.is_notified() { "成功" } else { "失敗" }
        );
    }

    if let Some(mo) = run
        .orders
        .iter()
        .filter_map(Order::as_production)
        .find(|mo| !mo.operations().is_empty())
    {
        let first = &mo.operations()[0].id;
        book.advance_operation(&mo.id, first, &operator)?;
        let updated = book.advance_operation(&mo.id, first, &operator)?;
        println!(
            "🏭 {} 狀態 {}，進度 {}%",
            updated.id,
            updated.status(),
            updated.progress()
        );
    }
    println!();

    // ========== 5. 報表 ==========
    let report = run.report(&snapshot)?;
    println!("📈 報表");
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
