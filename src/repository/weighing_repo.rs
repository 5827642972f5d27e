// ==========================================
// 藻类养殖 ATP 系统 - 收获称重数据仓储
// ==========================================
// 对齐: pesajes 表
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::batch::HarvestWeighing;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_mapping::{format_date, parse_date_column};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str = r#"
    SELECT id, lote_id, peso_humedo, peso_seco, fecha_pesaje, registrado_por
    FROM pesajes
"#;

// ==========================================
// WeighingRepository - 称重仓储
// ==========================================
pub struct WeighingRepository {
    conn: Arc<Mutex<Connection>>,
}

impl WeighingRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新增称重记录
    ///
    /// # 返回
    /// - `Ok(id)`: 自增主键
    pub fn insert(&self, weighing: &HarvestWeighing) -> RepositoryResult<i64> {
        if !weighing.wet_weight_kg.is_finite() || weighing.wet_weight_kg <= 0.0 {
            return Err(RepositoryError::FieldValueError {
                field: "peso_humedo".to_string(),
                message: format!("湿重必须大于 0: {}", weighing.wet_weight_kg),
            });
        }

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO pesajes (lote_id, peso_humedo, peso_seco, fecha_pesaje, registrado_por)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                weighing.batch_id,
                weighing.wet_weight_kg,
                weighing.dry_weight_kg,
                format_date(weighing.weighing_date),
                weighing.recorded_by.trim(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 最近的称重记录 (按称重日期倒序)
    pub fn find_recent(&self, limit: usize) -> RepositoryResult<Vec<HarvestWeighing>> {
        let conn = self.get_conn()?;
        let sql = format!("{} ORDER BY fecha_pesaje DESC, id DESC LIMIT ?1", SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let weighings = stmt
            .query_map(params![limit as i64], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(weighings)
    }

    /// 某批次的全部称重记录
    pub fn find_by_batch(&self, batch_id: i64) -> RepositoryResult<Vec<HarvestWeighing>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE lote_id = ?1 ORDER BY fecha_pesaje, id", SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let weighings = stmt
            .query_map(params![batch_id], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(weighings)
    }

    /// 称重日期 >= since 的记录数
    pub fn count_since(&self, since: NaiveDate) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM pesajes WHERE fecha_pesaje >= ?1",
            params![format_date(since)],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

fn map_row(row: &Row) -> SqliteResult<HarvestWeighing> {
    Ok(HarvestWeighing {
        weighing_id: Some(row.get(0)?),
        batch_id: row.get(1)?,
        wet_weight_kg: row.get(2)?,
        dry_weight_kg: row.get(3)?,
        weighing_date: parse_date_column(4, &row.get::<_, String>(4)?)?,
        recorded_by: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_repo() -> WeighingRepository {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::ensure_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO lotes (tipo_alga, superficie, fecha_inicio, estado)
             VALUES ('Gracilaria', 1.0, '2025-01-01', 'cosechado')",
            [],
        )
        .unwrap();
        WeighingRepository::new(Arc::new(Mutex::new(conn)))
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn weighing(wet: f64, day: NaiveDate) -> HarvestWeighing {
        HarvestWeighing::from_wet_weight(1, wet, day, "campo").unwrap()
    }

    #[test]
    fn test_insert_and_find_recent() {
        let repo = setup_repo();
        repo.insert(&weighing(100.0, date(2025, 3, 1))).unwrap();
        let latest = repo.insert(&weighing(400.0, date(2025, 3, 9))).unwrap();
        repo.insert(&weighing(200.0, date(2025, 3, 5))).unwrap();

        let recent = repo.find_recent(2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].weighing_id, Some(latest));
        assert_eq!(recent[0].dry_weight_kg, 60.0);
        assert_eq!(recent[1].weighing_date, date(2025, 3, 5));

        assert_eq!(repo.find_by_batch(1).unwrap().len(), 3);
        assert_eq!(repo.count_since(date(2025, 3, 5)).unwrap(), 2);
    }

    #[test]
    fn test_unknown_batch_violates_foreign_key() {
        let repo = setup_repo();
        let orphan = HarvestWeighing::from_wet_weight(99, 10.0, date(2025, 3, 1), "campo").unwrap();
        let err = repo.insert(&orphan).unwrap_err();
        assert!(matches!(err, RepositoryError::ForeignKeyViolation(_)));
    }
}
