// ==========================================
// 藻类养殖 ATP 系统 - 操作日志领域模型
// ==========================================
// 用途: 审计追踪 (模拟场景、配置变更、数据导入、业务数据维护)
// 对齐: action_log 表
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

// ==========================================
// ActionLog - 操作日志
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLog {
    pub action_id: String,        // 日志ID (UUID)
    pub action_type: String,      // 操作类型 (存储为字符串)
    pub action_ts: NaiveDateTime, // 操作时间戳 (UTC)
    pub actor: String,            // 操作人 (由调用方显式传入)

    // ===== 操作负载 =====
    pub payload_json: Option<JsonValue>, // 输入参数 (JSON)

    // ===== 结果摘要 =====
    pub impact_summary_json: Option<JsonValue>, // 输出摘要 (JSON)

    pub detail: Option<String>, // 详细描述
}

// ==========================================
// ActionType - 操作类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionType {
    SimulationScenario, // 订单可行性模拟
    ParameterUpdate,    // 经济参数变更
    SeasonUpdate,       // 季节配置变更
    DataImport,         // 批量导入
    BatchRegistered,    // 登记批次
    BatchHarvested,     // 批次标记为已收获
    BatchDeleted,       // 删除批次
    HarvestWeighed,     // 收获称重
    OrderRegistered,    // 登记订单
    OrderStatusChange,  // 订单状态变更
    OrderDeleted,       // 删除订单
    ClientChange,       // 客户新增/修改/删除
}

impl ActionType {
    /// 转换为字符串 (用于数据库存储)
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::SimulationScenario => "SimulationScenario",
            ActionType::ParameterUpdate => "ParameterUpdate",
            ActionType::SeasonUpdate => "SeasonUpdate",
            ActionType::DataImport => "DataImport",
            ActionType::BatchRegistered => "BatchRegistered",
            ActionType::BatchHarvested => "BatchHarvested",
            ActionType::BatchDeleted => "BatchDeleted",
            ActionType::HarvestWeighed => "HarvestWeighed",
            ActionType::OrderRegistered => "OrderRegistered",
            ActionType::OrderStatusChange => "OrderStatusChange",
            ActionType::OrderDeleted => "OrderDeleted",
            ActionType::ClientChange => "ClientChange",
        }
    }

    /// 从字符串解析
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SimulationScenario" => Some(ActionType::SimulationScenario),
            "ParameterUpdate" => Some(ActionType::ParameterUpdate),
            "SeasonUpdate" => Some(ActionType::SeasonUpdate),
            "DataImport" => Some(ActionType::DataImport),
            "BatchRegistered" => Some(ActionType::BatchRegistered),
            "BatchHarvested" => Some(ActionType::BatchHarvested),
            "BatchDeleted" => Some(ActionType::BatchDeleted),
            "HarvestWeighed" => Some(ActionType::HarvestWeighed),
            "OrderRegistered" => Some(ActionType::OrderRegistered),
            "OrderStatusChange" => Some(ActionType::OrderStatusChange),
            "OrderDeleted" => Some(ActionType::OrderDeleted),
            "ClientChange" => Some(ActionType::ClientChange),
            _ => None,
        }
    }
}

// ==========================================
// ActionLog 辅助方法
// ==========================================
impl ActionLog {
    /// 创建新的操作日志
    ///
    /// # 参数
    /// - `action_type`: 操作类型
    /// - `actor`: 操作人
    pub fn new(action_type: ActionType, actor: &str) -> Self {
        Self {
            action_id: uuid::Uuid::new_v4().to_string(),
            action_type: action_type.as_str().to_string(),
            action_ts: chrono::Utc::now().naive_utc(),
            actor: actor.to_string(),
            payload_json: None,
            impact_summary_json: None,
            detail: None,
        }
    }

    /// 设置操作负载 (转换为JSON)
    pub fn with_payload<T: Serialize>(mut self, payload: &T) -> Self {
        self.payload_json = serde_json::to_value(payload).ok();
        self
    }

    /// 设置结果摘要 (转换为JSON)
    pub fn with_impact_summary<T: Serialize>(mut self, summary: &T) -> Self {
        self.impact_summary_json = serde_json::to_value(summary).ok();
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// 生成短ID (用于显示)
    pub fn get_display_id(&self) -> String {
        let short: String = self.action_id.chars().take(8).collect();
        format!("{}_{}", self.action_type, short)
    }
}
