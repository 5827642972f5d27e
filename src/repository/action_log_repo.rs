// ==========================================
// 藻类养殖 ATP 系统 - 操作日志数据仓储
// ==========================================
// 对齐: action_log 表
// 红线: 模拟场景、参数变更、导入均需留痕
// ==========================================

mod core;
mod queries;


pub use core::ActionLogRepository;
