// ==========================================
// 藻类养殖 ATP 系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use crate::config::error::ConfigError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
///
/// 行级映射问题不走错误通道, 而是记入 `ImportSummary::rejections`;
/// 这里只保留会中断整个文件导入的错误
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xls/.csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    #[error("缺少必需列: {0}")]
    MissingColumn(String),

    // ===== 写入错误 =====
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("配置写入失败: {0}")]
    Config(String),

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

impl From<rusqlite::Error> for ImportError {
    fn from(err: rusqlite::Error) -> Self {
        ImportError::Repository(err.into())
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

impl From<calamine::XlsxError> for ImportError {
    fn from(err: calamine::XlsxError) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

impl From<ConfigError> for ImportError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Storage(e) => ImportError::Repository(e),
            ConfigError::Invalid(e) => ImportError::Config(e.to_string()),
        }
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
