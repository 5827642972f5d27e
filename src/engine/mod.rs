// ==========================================
// 藻类养殖 ATP 系统 - 引擎层
// ==========================================
// 职责: 实现业务规则引擎, 不拼 SQL
// 红线: Engine 无 I/O, 相同输入必得相同输出
// ==========================================

pub mod error;
pub mod harvest_estimator;
pub mod season_resolver;
pub mod simulation;
pub mod stock_availability;

// 重导出核心引擎
pub use error::{SimulationError, SimulationOutcome};
pub use harvest_estimator::HarvestEstimator;
pub use season_resolver::{
    build_season_table, build_season_table_from_stored, parse_season_row, SeasonResolver,
};
pub use simulation::{
    parse_target_date, validate_quantity, SimulationEngine, CULTIVATION_SURCHARGE_RATE,
    LOGISTICS_BUFFER_DAYS,
};
pub use stock_availability::{StockAvailabilityCalculator, DEFAULT_YIELD_TONS_PER_HECTARE};
