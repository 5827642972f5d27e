// ==========================================
// 藻类养殖 ATP 系统 - 导入层
// ==========================================
// 职责: 外部文件批量导入 (批次 / 订单 / 季节 / 参数)
// 支持: Excel, CSV
// ==========================================

pub mod data_importer;
pub mod error;
pub mod file_parser;
pub mod record_mapper;

pub use data_importer::{DataImporter, ImportKind, ImportSummary};
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelParser, FileParser, RawRecord, UniversalFileParser};
pub use record_mapper::{RecordMapper, RowRejection};
