// ==========================================
// 藻类养殖 ATP 系统 - 领域类型定义
// ==========================================
// 存储格式: 西班牙语小写字符串 (与 lotes / pedidos 表一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 批次状态 (Batch Status)
// ==========================================
// activo: 养殖中, 预计收获日期有效
// cosechado: 已收获, 实物库存
// perdido: 损失/报废, 不计入供给
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BatchStatus {
    #[serde(rename = "activo")]
    Active,
    #[serde(rename = "cosechado")]
    Harvested,
    #[serde(rename = "perdido")]
    Lost,
}

impl BatchStatus {
    /// 转换为数据库存储值
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchStatus::Active => "activo",
            BatchStatus::Harvested => "cosechado",
            BatchStatus::Lost => "perdido",
        }
    }

    /// 从数据库存储值解析（大小写不敏感）
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "activo" => Some(BatchStatus::Active),
            "cosechado" => Some(BatchStatus::Harvested),
            "perdido" => Some(BatchStatus::Lost),
            _ => None,
        }
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 订单状态 (Order Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    #[serde(rename = "pendiente")]
    Pending,
    #[serde(rename = "entregado")]
    Delivered,
    #[serde(rename = "cancelado")]
    Cancelled,
}

impl OrderStatus {
    /// 转换为数据库存储值
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pendiente",
            OrderStatus::Delivered => "entregado",
            OrderStatus::Cancelled => "cancelado",
        }
    }

    /// 从数据库存储值解析（大小写不敏感）
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pendiente" => Some(OrderStatus::Pending),
            "entregado" => Some(OrderStatus::Delivered),
            "cancelado" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    /// 是否占用库存（未取消的订单都算已承诺需求）
    pub fn is_committed(&self) -> bool {
        !matches!(self, OrderStatus::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 结果展示颜色 (Result Color)
// ==========================================
// green: 库存充足, 可立即交付
// warning: 存在缺口, 需要完整养殖周期
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultColor {
    Green,
    Warning,
}

impl fmt::Display for ResultColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultColor::Green => write!(f, "green"),
            ResultColor::Warning => write!(f, "warning"),
        }
    }
}
