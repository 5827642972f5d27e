// ==========================================
// 藻类养殖 ATP 系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 模拟引擎错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// 输入非法: 数量非正、日期缺失或无法解析
    #[error("无效输入: {0}")]
    InvalidInput(String),

    /// 必需经济参数缺失且无默认值 (或值非法)
    #[error("配置不完整 (key={key}): {reason}")]
    ConfigurationIncomplete { key: String, reason: String },

    /// 季节配置行无法解析 (本地恢复: 跳过该行)
    #[error("季节配置行格式错误 (season={season}): {reason}")]
    MalformedSeasonEntry { season: String, reason: String },
}

/// Result 类型别名
pub type SimulationOutcome<T> = Result<T, SimulationError>;
