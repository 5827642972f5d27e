// ==========================================
// 藻类养殖 ATP 系统 - 养殖批次数据仓储
// ==========================================
// 对齐: lotes 表
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::batch::{Batch, NewBatch};
use crate::domain::types::BatchStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_mapping::{
    conversion_error, format_date, parse_date_column, parse_optional_date_column,
};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str = r#"
    SELECT id, tipo_alga, superficie, fecha_inicio, fecha_cosecha_estimada, estado
    FROM lotes
"#;

// ==========================================
// BatchRepository - 养殖批次仓储
// ==========================================
pub struct BatchRepository {
    conn: Arc<Mutex<Connection>>,
}

impl BatchRepository {
    /// 从已有连接创建仓储实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 新增批次
    ///
    /// # 返回
    /// - `Ok(id)`: 自增主键
    pub fn insert(&self, batch: &NewBatch) -> RepositoryResult<i64> {
        validate_new_batch(batch)?;
        let conn = self.get_conn()?;
        insert_row(&conn, batch)?;
        Ok(conn.last_insert_rowid())
    }

    /// 批量新增 (单事务)
    pub fn insert_many(&self, batches: &[NewBatch]) -> RepositoryResult<Vec<i64>> {
        for batch in batches {
            validate_new_batch(batch)?;
        }

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let mut ids = Vec::with_capacity(batches.len());
        for batch in batches {
            insert_row(&tx, batch)?;
            ids.push(tx.last_insert_rowid());
        }

        tx.commit()?;
        Ok(ids)
    }

    /// 标记为已收获 (库存实物可用)
    ///
    /// 仅允许 activo → cosechado
    pub fn mark_harvested(&self, batch_id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let current: Option<String> = conn
            .query_row(
                "SELECT estado FROM lotes WHERE id = ?1",
                params![batch_id],
                |row| row.get(0),
            )
            .optional()?;

        let current = current.ok_or_else(|| RepositoryError::NotFound {
            entity: "Batch".to_string(),
            id: batch_id.to_string(),
        })?;

        if BatchStatus::parse(&current) != Some(BatchStatus::Active) {
            return Err(RepositoryError::InvalidStateTransition {
                from: current,
                to: BatchStatus::Harvested.to_string(),
            });
        }

        conn.execute(
            "UPDATE lotes SET estado = ?1 WHERE id = ?2",
            params![BatchStatus::Harvested.as_str(), batch_id],
        )?;
        Ok(())
    }

    /// 删除批次
    pub fn delete(&self, batch_id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM lotes WHERE id = ?1", params![batch_id])?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Batch".to_string(),
                id: batch_id.to_string(),
            });
        }
        Ok(())
    }

    // ==========================================
    // 查询操作
    // ==========================================

    pub fn find_by_id(&self, batch_id: i64) -> RepositoryResult<Option<Batch>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE id = ?1", SELECT_COLUMNS);
        let batch = conn
            .query_row(&sql, params![batch_id], map_row)
            .optional()?;
        Ok(batch)
    }

    /// 全部批次 (按预计收获日期排序, 无日期的排最后)
    pub fn find_all(&self) -> RepositoryResult<Vec<Batch>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "{} ORDER BY fecha_cosecha_estimada IS NULL, fecha_cosecha_estimada, id",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let batches = stmt
            .query_map([], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(batches)
    }

    /// ATP 供给侧批次
    ///
    /// 已收获, 或养殖中且预计收获日 <= 目标日 (状态不区分大小写)
    pub fn find_for_atp(&self, target_date: NaiveDate) -> RepositoryResult<Vec<Batch>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"{} WHERE LOWER(TRIM(estado)) = ?1
                 OR (LOWER(TRIM(estado)) = ?2 AND fecha_cosecha_estimada <= ?3)
               ORDER BY id"#,
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let batches = stmt
            .query_map(
                params![
                    BatchStatus::Harvested.as_str(),
                    BatchStatus::Active.as_str(),
                    format_date(target_date),
                ],
                map_row,
            )?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(batches)
    }

    /// 按状态统计批次数量
    pub fn count_by_status(&self) -> RepositoryResult<HashMap<BatchStatus, i64>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT estado, COUNT(*) FROM lotes GROUP BY estado")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
            .collect::<SqliteResult<Vec<_>>>()?;

        let mut counts = HashMap::new();
        for (raw, count) in rows {
            match BatchStatus::parse(&raw) {
                Some(status) => {
                    *counts.entry(status).or_insert(0) += count;
                }
                None => tracing::warn!(estado = %raw, count, "未知批次状态, 不计入统计"),
            }
        }
        Ok(counts)
    }
}

// ==========================================
// 辅助方法
// ==========================================

fn validate_new_batch(batch: &NewBatch) -> RepositoryResult<()> {
    if batch.algae_type.trim().is_empty() {
        return Err(RepositoryError::FieldValueError {
            field: "tipo_alga".to_string(),
            message: "不能为空".to_string(),
        });
    }
    if !batch.area_hectares.is_finite() || batch.area_hectares < 0.0 {
        return Err(RepositoryError::FieldValueError {
            field: "superficie".to_string(),
            message: format!("面积非法: {}", batch.area_hectares),
        });
    }
    Ok(())
}

fn insert_row(conn: &Connection, batch: &NewBatch) -> SqliteResult<usize> {
    conn.execute(
        r#"
        INSERT INTO lotes (tipo_alga, superficie, fecha_inicio, fecha_cosecha_estimada, estado)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
        params![
            batch.algae_type.trim(),
            batch.area_hectares,
            format_date(batch.sowing_date),
            batch.estimated_harvest_date.map(format_date),
            batch.status.as_str(),
        ],
    )
}

/// 将数据库行映射为 Batch 实体
fn map_row(row: &Row) -> SqliteResult<Batch> {
    let estado: String = row.get(5)?;
    let status = BatchStatus::parse(&estado)
        .ok_or_else(|| conversion_error(5, format!("未知批次状态: {}", estado)))?;

    Ok(Batch {
        batch_id: row.get(0)?,
        algae_type: row.get(1)?,
        area_hectares: row.get(2)?,
        sowing_date: parse_date_column(3, &row.get::<_, String>(3)?)?,
        estimated_harvest_date: parse_optional_date_column(4, row.get(4)?)?,
        status,
    })
}
