// ==========================================
// 藻类养殖 ATP 系统 - 数据导入 API
// ==========================================
// 职责: 封装批量导入, 转换导入错误为 API 错误
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::i18n;
use crate::importer::{DataImporter, ImportKind, ImportSummary};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// 导入API响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportApiResponse {
    /// 本地化的结果描述
    pub message: String,
    pub summary: ImportSummary,
}

pub struct ImportApi {
    importer: Arc<DataImporter>,
}

impl ImportApi {
    pub fn new(importer: Arc<DataImporter>) -> Self {
        Self { importer }
    }

    /// 导入文件
    ///
    /// # 参数
    /// - kind: 目标 (批次/订单/季节/参数)
    /// - file_path: CSV 或 XLSX 文件路径
    /// - operator: 操作人
    pub fn import_file(
        &self,
        kind: ImportKind,
        file_path: &str,
        operator: &str,
    ) -> ApiResult<ImportApiResponse> {
        if file_path.trim().is_empty() {
            return Err(ApiError::InvalidInput("文件路径不能为空".to_string()));
        }
        if operator.trim().is_empty() {
            return Err(ApiError::InvalidInput("操作人不能为空".to_string()));
        }
        if !Path::new(file_path).exists() {
            return Err(ApiError::ImportError(i18n::t_with_args(
                "import.file_not_found",
                &[("path", file_path)],
            )));
        }

        let summary = self.importer.import_file(kind, file_path, operator)?;
        let message = i18n::t_with_args(
            "import.completed",
            &[
                ("imported", &summary.imported.to_string()),
                ("rejected", &summary.rejected().to_string()),
            ],
        );

        Ok(ImportApiResponse { message, summary })
    }
}
