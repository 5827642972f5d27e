// ==========================================
// 藻类养殖 ATP 系统 - 配置层错误类型
// ==========================================

use crate::engine::error::SimulationError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// 存储读写失败
    #[error("配置存储错误: {0}")]
    Storage(#[from] RepositoryError),

    /// 参数缺失/非法, 或季节行格式错误
    #[error(transparent)]
    Invalid(#[from] SimulationError),
}

impl From<rusqlite::Error> for ConfigError {
    fn from(err: rusqlite::Error) -> Self {
        ConfigError::Storage(err.into())
    }
}

/// Result 类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
