// ==========================================
// 藻类养殖 ATP 系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、值对象、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod action_log;
pub mod batch;
pub mod client;
pub mod economics;
pub mod order;
pub mod overview;
pub mod season;
pub mod simulation;
pub mod types;

// 重导出核心类型
pub use action_log::{ActionLog, ActionType};
pub use batch::{Batch, HarvestWeighing, NewBatch};
pub use client::{Client, ClientInput};
pub use economics::EconomicParameters;
pub use order::{NewOrder, Order};
pub use overview::{CalendarEvent, CalendarEventKind, DashboardSummary, MonthlyDelivery};
pub use season::{
    RawSeasonRow, SeasonDefinition, SeasonTable, SeasonTableWarning, SeasonalFactors,
    StoredSeasonRow,
};
pub use simulation::{
    CostBreakdown, CostEstimate, LeadTimeBreakdown, ScenarioInfo, SimulationRequest,
    SimulationResult, StockOutcome, StockSnapshot,
};
pub use types::{BatchStatus, OrderStatus, ResultColor};
