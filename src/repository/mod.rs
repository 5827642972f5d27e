// ==========================================
// 藻类养殖 ATP 系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod action_log_repo;
pub mod batch_repo;
pub mod client_repo;
pub mod error;
pub mod order_repo;
pub(crate) mod row_mapping;
pub mod weighing_repo;

// 重导出核心仓储
pub use action_log_repo::ActionLogRepository;
pub use batch_repo::BatchRepository;
pub use client_repo::ClientRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use order_repo::OrderRepository;
pub use weighing_repo::WeighingRepository;
