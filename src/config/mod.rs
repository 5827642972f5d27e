// ==========================================
// 藻类养殖 ATP 系统 - 配置层
// ==========================================
// 职责: 经济参数与季节表的类型化读写
// 存储: parametros_sistema / configuracion_estacional 表
// ==========================================

pub mod config_manager;
pub mod error;
pub mod simulation_config_trait;

// 重导出核心配置管理器
pub use config_manager::{
    config_keys, parse_economic_parameters, ConfigManager, ParameterRow, SeedReport,
    DEFAULT_PARAMETERS, DEFAULT_SEASONS,
};
pub use error::{ConfigError, ConfigResult};
pub use simulation_config_trait::SimulationConfigReader;
