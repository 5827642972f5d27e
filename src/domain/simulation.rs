// ==========================================
// 藻类养殖 ATP 系统 - 模拟请求与结果
// ==========================================
// 生命周期: 每次调用构造一次, 不持久化 (仅审计日志引用)
// 精度: 吨 2 位小数, 天数 1 位小数, 金额取整
// ==========================================

use crate::domain::economics::EconomicParameters;
use crate::domain::season::{SeasonTable, SeasonTableWarning, SeasonalFactors};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// StockSnapshot - ATP 库存快照
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StockSnapshot {
    pub supplied_tons: f64,      // 供给 (已收获 + 即将收获)
    pub committed_tons: f64,     // 已承诺需求
    pub net_available_tons: f64, // 净可承诺量 = max(0, 供给 - 需求)
}

impl StockSnapshot {
    pub fn new(supplied_tons: f64, committed_tons: f64) -> Self {
        Self {
            supplied_tons,
            committed_tons,
            net_available_tons: (supplied_tons - committed_tons).max(0.0),
        }
    }
}

// ==========================================
// SimulationRequest - 模拟请求
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub requested_quantity_tons: f64,
    pub target_date: NaiveDate,
    pub available_stock_tons: f64,
    pub economic_parameters: EconomicParameters,
    pub season_table: SeasonTable,
}

// ==========================================
// SimulationResult - 模拟结果 (嵌套文档结构)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub scenario: ScenarioInfo,
    pub stock: StockOutcome,
    pub lead_time: LeadTimeBreakdown,
    pub cost: CostEstimate,
    /// 被跳过的季节配置行 (非致命)
    #[serde(default)]
    pub warnings: Vec<SeasonTableWarning>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioInfo {
    pub target_date: NaiveDate,
    pub requested_quantity_tons: f64,
    pub detected_season: String,
    pub applied_factors: SeasonalFactors,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockOutcome {
    pub available_stock_tons: f64,
    pub projected_stock_tons: f64,
    pub deficit_tons: f64,
    pub requires_cultivation: bool,
    /// 业务政策: 始终可达成, 缺口只影响周期与成本
    pub is_feasible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadTimeBreakdown {
    pub total_days: f64,
    pub cultivation_days: f64,
    pub manufacturing_days: f64,
    pub logistics_days: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    pub total: f64,
    pub subtotal: f64,
    pub surcharge: f64,
    pub breakdown: CostBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub water: f64,
    pub energy: f64,
    pub diesel: f64,
    pub labor: f64,
    pub consumables: f64,
}

impl SimulationResult {
    pub fn deficit_tons(&self) -> f64 {
        self.stock.deficit_tons
    }

    pub fn projected_stock_tons(&self) -> f64 {
        self.stock.projected_stock_tons
    }

    pub fn total_lead_time_days(&self) -> f64 {
        self.lead_time.total_days
    }

    pub fn total_cost_estimate(&self) -> f64 {
        self.cost.total
    }

    pub fn detected_season(&self) -> &SeasonalFactors {
        &self.scenario.applied_factors
    }

    /// 转换为嵌套 JSON 文档
    pub fn to_document(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }

    /// 从嵌套 JSON 文档还原
    pub fn from_document(doc: serde_json::Value) -> serde_json::Result<Self> {
        serde_json::from_value(doc)
    }
}
