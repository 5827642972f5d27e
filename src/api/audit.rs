// ==========================================
// 藻类养殖 ATP 系统 - 模拟审计归档
// ==========================================
// 职责: 定义模拟场景归档 trait, 由操作日志仓储实现
// 说明: 归档失败不影响模拟结果, 调用方只记录告警
// ==========================================

use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::simulation::{SimulationResult, StockSnapshot};
use crate::repository::ActionLogRepository;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::error::Error;
use std::sync::Arc;

/// 一次模拟的归档内容
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationAuditEntry {
    /// 发起模拟的用户 (显式传入)
    pub requesting_user: String,
    pub requested_quantity_tons: f64,
    pub target_date: NaiveDate,
    pub stock: StockSnapshot,
    pub result: SimulationResult,
}

impl SimulationAuditEntry {
    /// 转换为操作日志: 输入 → payload, 成本摘要 → impact summary
    pub fn to_action_log(&self) -> ActionLog {
        ActionLog::new(ActionType::SimulationScenario, &self.requesting_user)
            .with_payload(&json!({
                "cantidad_ton": self.requested_quantity_tons,
                "fecha_objetivo": self.target_date.format("%Y-%m-%d").to_string(),
                "stock": self.stock,
            }))
            .with_impact_summary(&json!({
                "costo": self.result.cost,
                "dias_totales": self.result.total_lead_time_days(),
                "deficit_ton": self.result.deficit_tons(),
                "estacion": self.result.scenario.detected_season,
            }))
            .with_detail(format!("es_factible={}", self.result.stock.is_feasible))
    }
}

// ==========================================
// 归档 Trait
// ==========================================
pub trait SimulationAuditSink: Send + Sync {
    /// 归档一次模拟
    ///
    /// # 返回
    /// - `Ok(record_id)`: 归档记录 ID, 不支持时为空字符串
    fn archive(&self, entry: &SimulationAuditEntry) -> Result<String, Box<dyn Error + Send + Sync>>;
}

impl SimulationAuditSink for ActionLogRepository {
    fn archive(&self, entry: &SimulationAuditEntry) -> Result<String, Box<dyn Error + Send + Sync>> {
        Ok(self.insert(&entry.to_action_log())?)
    }
}

/// 空操作归档 (单元测试 / 只读场景)
#[derive(Debug, Clone, Default)]
pub struct NoOpAuditSink;

impl SimulationAuditSink for NoOpAuditSink {
    fn archive(&self, entry: &SimulationAuditEntry) -> Result<String, Box<dyn Error + Send + Sync>> {
        tracing::debug!(user = %entry.requesting_user, "NoOpAuditSink: 跳过模拟归档");
        Ok(String::new())
    }
}

/// 可选的归档包装
pub struct OptionalAuditSink {
    inner: Option<Arc<dyn SimulationAuditSink>>,
}

impl OptionalAuditSink {
    pub fn with_sink(sink: Arc<dyn SimulationAuditSink>) -> Self {
        Self { inner: Some(sink) }
    }

    pub fn none() -> Self {
        Self { inner: None }
    }

    pub fn archive(&self, entry: &SimulationAuditEntry) -> Result<String, Box<dyn Error + Send + Sync>> {
        match &self.inner {
            Some(sink) => sink.archive(entry),
            None => {
                tracing::debug!(user = %entry.requesting_user, "未配置归档, 跳过");
                Ok(String::new())
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        self.inner.is_some()
    }
}

impl Default for OptionalAuditSink {
    fn default() -> Self {
        Self::none()
    }
}
