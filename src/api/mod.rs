// ==========================================
// 藻类养殖 ATP 系统 - API 层
// ==========================================
// 职责: 用例门面, 供二进制入口或上层界面调用
// ==========================================

pub mod audit;
pub mod client_api;
pub mod config_api;
pub mod error;
pub mod farm_api;
pub mod import_api;
pub mod presenter;
pub mod simulation_api;

// 重导出核心类型
pub use audit::{NoOpAuditSink, OptionalAuditSink, SimulationAuditEntry, SimulationAuditSink};
pub use client_api::ClientApi;
pub use config_api::ConfigApi;
pub use error::{ApiError, ApiResult};
pub use farm_api::FarmApi;
pub use import_api::{ImportApi, ImportApiResponse};
pub use presenter::{ResultPresenter, SimulationSummary};
pub use simulation_api::SimulationApi;
