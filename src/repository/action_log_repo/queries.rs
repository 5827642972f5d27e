use super::core::ActionLogRepository;
use crate::domain::action_log::{ActionLog, ActionType};
use crate::repository::error::RepositoryResult;
use crate::repository::row_mapping::DATETIME_FORMAT;
use chrono::NaiveDateTime;
use rusqlite::{params, OptionalExtension, Result as SqliteResult, Row};

const SELECT_COLUMNS: &str = r#"
    SELECT action_id, action_type, action_ts, actor,
           payload_json, impact_summary_json, detail
    FROM action_log
"#;

impl ActionLogRepository {
    // ==========================================
    // 查询操作
    // ==========================================

    /// 按 action_id 查询单个日志
    pub fn find_by_id(&self, action_id: &str) -> RepositoryResult<Option<ActionLog>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE action_id = ?", SELECT_COLUMNS);

        let log = conn
            .query_row(&sql, params![action_id], map_row)
            .optional()?;
        Ok(log)
    }

    /// 查询指定操作人的日志
    pub fn find_by_actor(&self, actor: &str, limit: i32) -> RepositoryResult<Vec<ActionLog>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "{} WHERE actor = ? ORDER BY action_ts DESC, rowid DESC LIMIT ?",
            SELECT_COLUMNS
        );

        let mut stmt = conn.prepare(&sql)?;
        let logs = stmt
            .query_map(params![actor, limit], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(logs)
    }

    /// 查询指定操作类型的日志
    pub fn find_by_action_type(
        &self,
        action_type: ActionType,
        limit: i32,
    ) -> RepositoryResult<Vec<ActionLog>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "{} WHERE action_type = ? ORDER BY action_ts DESC, rowid DESC LIMIT ?",
            SELECT_COLUMNS
        );

        let mut stmt = conn.prepare(&sql)?;
        let logs = stmt
            .query_map(params![action_type.as_str(), limit], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(logs)
    }

    /// 查询最近的 N 条日志
    pub fn find_recent(&self, limit: i32) -> RepositoryResult<Vec<ActionLog>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "{} ORDER BY action_ts DESC, rowid DESC LIMIT ?",
            SELECT_COLUMNS
        );

        let mut stmt = conn.prepare(&sql)?;
        let logs = stmt
            .query_map(params![limit], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(logs)
    }

    /// 统计指定操作人的操作总数
    pub fn count_by_actor(&self, actor: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM action_log WHERE actor = ?",
            params![actor],
            |row| row.get(0),
        )?;

        Ok(count)
    }
}

// ==========================================
// 辅助方法
// ==========================================

/// 将数据库行映射为 ActionLog 实体
fn map_row(row: &Row) -> SqliteResult<ActionLog> {
    let action_ts_str: String = row.get(2)?;
    let action_ts = NaiveDateTime::parse_from_str(&action_ts_str, DATETIME_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;

    // JSON 字段损坏时按缺失处理
    let payload_json = row
        .get::<_, Option<String>>(4)?
        .and_then(|s| serde_json::from_str(&s).ok());
    let impact_summary_json = row
        .get::<_, Option<String>>(5)?
        .and_then(|s| serde_json::from_str(&s).ok());

    Ok(ActionLog {
        action_id: row.get(0)?,
        action_type: row.get(1)?,
        action_ts,
        actor: row.get(3)?,
        payload_json,
        impact_summary_json,
        detail: row.get(6)?,
    })
}
