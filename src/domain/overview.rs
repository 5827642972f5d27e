// ==========================================
// 藻类养殖 ATP 系统 - 日历与看板视图模型
// ==========================================
// 用途: 交付/收获日历, 运营看板指标
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// CalendarEvent - 日历事件
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarEventKind {
    Delivery, // 订单交付 (未取消)
    Harvest,  // 养殖中批次的预计收获
}

impl CalendarEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CalendarEventKind::Delivery => "pedido",
            CalendarEventKind::Harvest => "cosecha",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub kind: CalendarEventKind,
    pub date: NaiveDate,
    pub title: String,
    pub source_id: i64,        // pedido.id 或 lote.id
    pub quantity: f64,         // 交付: 吨; 收获: 公顷
    pub product: Option<String>, // 仅交付事件
}

// ==========================================
// DashboardSummary - 运营看板
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyDelivery {
    pub month: String, // YYYY-MM
    pub delivered_tons: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub active_batches: i64,
    pub pending_orders: i64,
    pub recent_weighings: i64, // 近 7 天称重次数
    pub delivered_by_month: Vec<MonthlyDelivery>,
}
