// ==========================================
// 藻类养殖 ATP 系统 - 数据导入器
// ==========================================
// 职责: 批次/订单/季节/参数的批量导入
// 流程: 解析 → 映射 (逐行接受/拒绝) → 单事务落库 → 审计
// ==========================================

use crate::config::ConfigManager;
use crate::domain::action_log::{ActionLog, ActionType};
use crate::importer::error::ImportResult;
use crate::importer::file_parser::{RawRecord, UniversalFileParser};
use crate::importer::record_mapper::{MappedRow, RecordMapper, RowRejection};
use crate::repository::{ActionLogRepository, BatchRepository, OrderRepository};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// 导入目标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportKind {
    Batches,
    Orders,
    Seasons,
    Parameters,
}

impl ImportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportKind::Batches => "lotes",
            ImportKind::Orders => "pedidos",
            ImportKind::Seasons => "configuracion_estacional",
            ImportKind::Parameters => "parametros_sistema",
        }
    }
}

/// 导入汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub import_id: String,
    pub kind: ImportKind,
    pub file_name: String,
    pub total_rows: usize,
    pub imported: usize,
    pub rejections: Vec<RowRejection>,
    pub elapsed_ms: u64,
}

impl ImportSummary {
    pub fn rejected(&self) -> usize {
        self.rejections.len()
    }
}

// ==========================================
// DataImporter
// ==========================================
pub struct DataImporter {
    batch_repo: Arc<BatchRepository>,
    order_repo: Arc<OrderRepository>,
    config_manager: Arc<ConfigManager>,
    action_log_repo: Arc<ActionLogRepository>,
    parser: UniversalFileParser,
}

impl DataImporter {
    pub fn new(
        batch_repo: Arc<BatchRepository>,
        order_repo: Arc<OrderRepository>,
        config_manager: Arc<ConfigManager>,
        action_log_repo: Arc<ActionLogRepository>,
    ) -> Self {
        Self {
            batch_repo,
            order_repo,
            config_manager,
            action_log_repo,
            parser: UniversalFileParser,
        }
    }

    /// 导入单个文件
    ///
    /// # 参数
    /// - kind: 导入目标表
    /// - file_path: CSV 或 XLSX 文件
    /// - actor: 操作人 (写入审计日志)
    ///
    /// # 返回
    /// - Ok(ImportSummary): 行级拒绝不视为失败
    /// - Err: 文件无法解析, 或落库失败 (此时整个文件均未写入)
    #[instrument(skip(self, file_path), fields(kind = kind.as_str()))]
    pub fn import_file<P: AsRef<Path>>(
        &self,
        kind: ImportKind,
        file_path: P,
        actor: &str,
    ) -> ImportResult<ImportSummary> {
        let start_time = Instant::now();
        let path = file_path.as_ref();
        let import_id = Uuid::new_v4().to_string();
        info!(import_id = %import_id, file = %path.display(), "开始导入");

        let records = self.parser.parse(path)?;
        let total_rows = records.len();

        let (imported, rejections) = match kind {
            ImportKind::Batches => {
                let (rows, rejections) = partition(&records, RecordMapper::map_batch);
                if !rows.is_empty() {
                    self.batch_repo.insert_many(&rows)?;
                }
                (rows.len(), rejections)
            }
            ImportKind::Orders => {
                let (rows, rejections) = partition(&records, RecordMapper::map_order);
                if !rows.is_empty() {
                    self.order_repo.insert_many(&rows)?;
                }
                (rows.len(), rejections)
            }
            ImportKind::Seasons => {
                let (rows, rejections) = partition(&records, RecordMapper::map_season);
                if !rows.is_empty() {
                    self.config_manager.batch_upsert_seasons(&rows)?;
                }
                (rows.len(), rejections)
            }
            ImportKind::Parameters => {
                let (rows, rejections) = partition(&records, RecordMapper::map_parameter);
                if !rows.is_empty() {
                    self.config_manager.batch_update_parameters(&rows)?;
                }
                (rows.len(), rejections)
            }
        };

        for rejection in &rejections {
            warn!(row = rejection.row_number, reason = %rejection.reason, "行被拒绝");
        }

        let summary = ImportSummary {
            import_id,
            kind,
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            total_rows,
            imported,
            rejections,
            elapsed_ms: start_time.elapsed().as_millis() as u64,
        };

        info!(
            imported = summary.imported,
            rejected = summary.rejected(),
            elapsed_ms = summary.elapsed_ms,
            "导入完成"
        );

        self.record_audit(&summary, actor);
        Ok(summary)
    }

    /// 写入 DataImport 审计; 失败只告警
    fn record_audit(&self, summary: &ImportSummary, actor: &str) {
        let log = ActionLog::new(ActionType::DataImport, actor)
            .with_payload(&json!({
                "import_id": summary.import_id,
                "tabla": summary.kind.as_str(),
                "archivo": summary.file_name,
            }))
            .with_impact_summary(&json!({
                "total_rows": summary.total_rows,
                "imported": summary.imported,
                "rejected": summary.rejected(),
            }))
            .with_detail(format!(
                "导入 {}: {} 行成功, {} 行拒绝",
                summary.kind.as_str(),
                summary.imported,
                summary.rejected()
            ));

        if let Err(e) = self.action_log_repo.insert(&log) {
            warn!(error = %e, import_id = %summary.import_id, "导入审计写入失败");
        }
    }
}

/// 逐行映射, 分离接受行与拒绝行
fn partition<T>(
    records: &[RawRecord],
    mapper: fn(&RawRecord) -> MappedRow<T>,
) -> (Vec<T>, Vec<RowRejection>) {
    let mut accepted = Vec::with_capacity(records.len());
    let mut rejected = Vec::new();
    for record in records {
        match mapper(record) {
            Ok(row) => accepted.push(row),
            Err(rejection) => rejected.push(rejection),
        }
    }
    (accepted, rejected)
}
