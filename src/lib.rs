// ==========================================
// 藻类养殖 ATP 系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 订单可行性决策支持 (人工最终决定是否接单)
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 经济参数与季节表
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA/建表）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 用例门面
pub mod api;

// 应用层 - 状态组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{BatchStatus, OrderStatus, ResultColor};

// 领域实体
pub use domain::{
    ActionLog, ActionType, Batch, CalendarEvent, Client, DashboardSummary, EconomicParameters,
    HarvestWeighing, Order, SeasonTable, SeasonalFactors, SimulationRequest, SimulationResult,
    StockSnapshot,
};

// 引擎
pub use engine::{
    HarvestEstimator, SeasonResolver, SimulationEngine, SimulationError,
    StockAvailabilityCalculator,
};

// API
pub use api::{
    ApiError, ApiResult, ClientApi, ConfigApi, FarmApi, ResultPresenter, SimulationApi,
    SimulationSummary,
};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "AlgaTrack";

// 数据库结构版本
pub const DB_VERSION: i64 = db::CURRENT_SCHEMA_VERSION;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert!(DB_VERSION >= 1);
    }
}
