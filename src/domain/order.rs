// ==========================================
// 藻类养殖 ATP 系统 - 客户订单领域模型
// ==========================================
// 对齐: pedidos 表
// 用途: ATP 需求侧 (已承诺数量)
// ==========================================

use crate::domain::types::OrderStatus;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// Order - 客户订单 (Pedido)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: i64,           // 订单ID
    pub client: String,          // 客户
    pub product: String,         // 产品
    pub quantity_tons: f64,      // 数量 (吨)
    pub delivery_date: NaiveDate, // 交货日期
    pub status: OrderStatus,     // 订单状态
}

impl Order {
    /// 目标日期前是否占用库存
    pub fn commits_by(&self, target_date: NaiveDate) -> bool {
        self.status.is_committed() && self.delivery_date <= target_date
    }
}

// ==========================================
// NewOrder - 新建订单请求
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub client: String,
    pub product: String,
    pub quantity_tons: f64,
    pub delivery_date: NaiveDate,
    pub status: OrderStatus,
}

/// 未指定产品时的默认产品名
pub const DEFAULT_PRODUCT: &str = "Pellet Estándar";

impl NewOrder {
    /// 创建待交付订单
    pub fn new(client: &str, quantity_tons: f64, delivery_date: NaiveDate) -> Self {
        Self {
            client: client.to_string(),
            product: DEFAULT_PRODUCT.to_string(),
            quantity_tons,
            delivery_date,
            status: OrderStatus::Pending,
        }
    }

    pub fn with_product(mut self, product: &str) -> Self {
        self.product = product.to_string();
        self
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = status;
        self
    }
}
