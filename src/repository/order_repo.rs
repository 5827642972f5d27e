// ==========================================
// 藻类养殖 ATP 系统 - 客户订单数据仓储
// ==========================================
// 对齐: pedidos 表
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::order::{NewOrder, Order};
use crate::domain::types::OrderStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_mapping::{conversion_error, format_date, parse_date_column};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};
use tracing::warn;

const SELECT_COLUMNS: &str = r#"
    SELECT id, cliente, producto, cantidad_ton, fecha_entrega, estado
    FROM pedidos
"#;

// ==========================================
// OrderRepository - 订单仓储
// ==========================================
pub struct OrderRepository {
    conn: Arc<Mutex<Connection>>,
}

impl OrderRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新增订单
    pub fn insert(&self, order: &NewOrder) -> RepositoryResult<i64> {
        validate_new_order(order)?;
        let conn = self.get_conn()?;
        insert_row(&conn, order)?;
        Ok(conn.last_insert_rowid())
    }

    /// 批量新增 (单事务)
    pub fn insert_many(&self, orders: &[NewOrder]) -> RepositoryResult<Vec<i64>> {
        for order in orders {
            validate_new_order(order)?;
        }

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let mut ids = Vec::with_capacity(orders.len());
        for order in orders {
            insert_row(&tx, order)?;
            ids.push(tx.last_insert_rowid());
        }

        tx.commit()?;
        Ok(ids)
    }

    /// 更新订单状态
    ///
    /// 已取消的订单不可恢复
    ///
    /// # 返回
    /// - `Ok(previous)`: 变更前的状态
    pub fn update_status(&self, order_id: i64, status: OrderStatus) -> RepositoryResult<OrderStatus> {
        let conn = self.get_conn()?;

        let current: Option<String> = conn
            .query_row(
                "SELECT estado FROM pedidos WHERE id = ?1",
                params![order_id],
                |row| row.get(0),
            )
            .optional()?;

        let current = current.ok_or_else(|| RepositoryError::NotFound {
            entity: "Order".to_string(),
            id: order_id.to_string(),
        })?;

        let previous = OrderStatus::parse(&current).ok_or_else(|| RepositoryError::FieldValueError {
            field: "estado".to_string(),
            message: format!("未知订单状态: {}", current),
        })?;

        if previous == OrderStatus::Cancelled && status != OrderStatus::Cancelled {
            return Err(RepositoryError::InvalidStateTransition {
                from: previous.to_string(),
                to: status.to_string(),
            });
        }

        conn.execute(
            "UPDATE pedidos SET estado = ?1 WHERE id = ?2",
            params![status.as_str(), order_id],
        )?;
        Ok(previous)
    }

    /// 删除订单
    pub fn delete(&self, order_id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM pedidos WHERE id = ?1", params![order_id])?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Order".to_string(),
                id: order_id.to_string(),
            });
        }
        Ok(())
    }

    pub fn find_by_id(&self, order_id: i64) -> RepositoryResult<Option<Order>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE id = ?1", SELECT_COLUMNS);
        let order = conn
            .query_row(&sql, params![order_id], map_row)
            .optional()?;
        Ok(order)
    }

    /// 全部订单 (按交货日期排序)
    pub fn find_all(&self) -> RepositoryResult<Vec<Order>> {
        let conn = self.get_conn()?;
        let sql = format!("{} ORDER BY fecha_entrega, id", SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let orders = stmt
            .query_map([], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(orders)
    }

    /// 未取消的订单 (按交货日排序, 用于日历)
    ///
    /// 未知状态的订单同样视为未取消
    pub fn find_not_cancelled(&self) -> RepositoryResult<Vec<Order>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "{} WHERE LOWER(TRIM(estado)) != ?1 ORDER BY fecha_entrega, id",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let orders = stmt
            .query_map(params![OrderStatus::Cancelled.as_str()], map_committed_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(orders)
    }

    /// 某客户 (公司名精确匹配) 名下的订单数
    pub fn count_by_client(&self, client: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM pedidos WHERE TRIM(cliente) = ?1",
            params![client.trim()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// 指定状态的订单数 (不区分大小写)
    pub fn count_with_status(&self, status: OrderStatus) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM pedidos WHERE LOWER(TRIM(estado)) = ?1",
            params![status.as_str()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// 已交付吨数按交货月份 (YYYY-MM) 汇总, 月份升序
    pub fn delivered_tons_by_month(&self) -> RepositoryResult<Vec<(String, f64)>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT substr(TRIM(fecha_entrega), 1, 7) AS mes, SUM(cantidad_ton)
            FROM pedidos
            WHERE LOWER(TRIM(estado)) = ?1
            GROUP BY mes
            ORDER BY mes
            "#,
        )?;
        let rows = stmt
            .query_map(params![OrderStatus::Delivered.as_str()], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
            })?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    /// ATP 需求侧订单: 未取消且交货日 <= 目标日
    ///
    /// 状态不区分大小写; 未知状态的订单仍计入需求
    pub fn find_committed_until(&self, target_date: NaiveDate) -> RepositoryResult<Vec<Order>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "{} WHERE LOWER(TRIM(estado)) != ?1 AND fecha_entrega <= ?2 ORDER BY fecha_entrega, id",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let orders = stmt
            .query_map(
                params![OrderStatus::Cancelled.as_str(), format_date(target_date)],
                map_committed_row,
            )?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(orders)
    }
}

fn validate_new_order(order: &NewOrder) -> RepositoryResult<()> {
    if order.client.trim().is_empty() {
        return Err(RepositoryError::FieldValueError {
            field: "cliente".to_string(),
            message: "不能为空".to_string(),
        });
    }
    if !order.quantity_tons.is_finite() || order.quantity_tons <= 0.0 {
        return Err(RepositoryError::FieldValueError {
            field: "cantidad_ton".to_string(),
            message: format!("数量必须大于 0: {}", order.quantity_tons),
        });
    }
    Ok(())
}

fn insert_row(conn: &Connection, order: &NewOrder) -> SqliteResult<usize> {
    conn.execute(
        r#"
        INSERT INTO pedidos (cliente, producto, cantidad_ton, fecha_entrega, estado)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
        params![
            order.client.trim(),
            order.product.trim(),
            order.quantity_tons,
            format_date(order.delivery_date),
            order.status.as_str(),
        ],
    )
}

fn map_row(row: &Row) -> SqliteResult<Order> {
    let estado: String = row.get(5)?;
    let status = OrderStatus::parse(&estado)
        .ok_or_else(|| conversion_error(5, format!("未知订单状态: {}", estado)))?;
    map_row_with_status(row, status)
}

/// 需求侧映射: 未知但未取消的状态按已承诺 (pendiente) 计入
fn map_committed_row(row: &Row) -> SqliteResult<Order> {
    let estado: String = row.get(5)?;
    let status = match OrderStatus::parse(&estado) {
        Some(status) => status,
        None => {
            let order_id: i64 = row.get(0)?;
            warn!(order_id, estado = %estado, "未知订单状态, 按已承诺需求计入");
            OrderStatus::Pending
        }
    };
    map_row_with_status(row, status)
}

fn map_row_with_status(row: &Row, status: OrderStatus) -> SqliteResult<Order> {
    Ok(Order {
        order_id: row.get(0)?,
        client: row.get(1)?,
        product: row.get(2)?,
        quantity_tons: row.get(3)?,
        delivery_date: parse_date_column(4, &row.get::<_, String>(4)?)?,
        status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_repo() -> OrderRepository {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::ensure_schema(&conn).unwrap();
        OrderRepository::new(Arc::new(Mutex::new(conn)))
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_find_committed_until() {
        let repo = setup_repo();
        let target = date(2025, 6, 1);

        repo.insert(&NewOrder::new("Salmonera Sur", 10.0, date(2025, 5, 1))).unwrap();
        repo.insert(&NewOrder::new("AgroNorte", 4.0, date(2025, 6, 1)).with_status(OrderStatus::Delivered))
            .unwrap();
        repo.insert(&NewOrder::new("AgroNorte", 40.0, date(2025, 5, 20)).with_status(OrderStatus::Cancelled))
            .unwrap();
        repo.insert(&NewOrder::new("Export SpA", 25.0, date(2025, 6, 2))).unwrap();

        let committed = repo.find_committed_until(target).unwrap();
        let tons: f64 = committed.iter().map(|o| o.quantity_tons).sum();
        assert_eq!(committed.len(), 2);
        assert_eq!(tons, 14.0);
        assert_eq!(committed[0].product, "Pellet Estándar");
    }

    #[test]
    fn test_unknown_state_still_counts_as_committed() {
        let repo = setup_repo();
        {
            let conn = repo.get_conn().unwrap();
            conn.execute(
                "INSERT INTO pedidos (cliente, producto, cantidad_ton, fecha_entrega, estado)
                 VALUES ('Acme', 'Agar', 3.0, '2025-05-01', 'en_proceso'),
                        ('Beta', 'Agar', 9.0, '2025-05-01', 'Cancelado')",
                [],
            )
            .unwrap();
        }

        let committed = repo.find_committed_until(date(2025, 6, 1)).unwrap();
        assert_eq!(committed.len(), 1);
        assert_eq!(committed[0].client, "Acme");
        assert_eq!(committed[0].status, OrderStatus::Pending);
    }

    #[test]
    fn test_overview_queries() {
        let repo = setup_repo();
        repo.insert(&NewOrder::new("Acme", 4.0, date(2025, 3, 10)).with_status(OrderStatus::Delivered))
            .unwrap();
        repo.insert(&NewOrder::new("Acme", 6.0, date(2025, 3, 28)).with_status(OrderStatus::Delivered))
            .unwrap();
        repo.insert(&NewOrder::new("Beta", 2.5, date(2025, 1, 5)).with_status(OrderStatus::Delivered))
            .unwrap();
        repo.insert(&NewOrder::new("Beta", 9.0, date(2025, 2, 1))).unwrap();
        repo.insert(&NewOrder::new("Gamma", 1.0, date(2025, 2, 2)).with_status(OrderStatus::Cancelled))
            .unwrap();

        assert_eq!(repo.count_by_client("Acme").unwrap(), 2);
        assert_eq!(repo.count_by_client(" Gamma ").unwrap(), 1);
        assert_eq!(repo.count_by_client("Delta").unwrap(), 0);
        assert_eq!(repo.count_with_status(OrderStatus::Pending).unwrap(), 1);

        let months = repo.delivered_tons_by_month().unwrap();
        assert_eq!(
            months,
            vec![("2025-01".to_string(), 2.5), ("2025-03".to_string(), 10.0)]
        );

        let scheduled = repo.find_not_cancelled().unwrap();
        assert_eq!(scheduled.len(), 4);
        assert_eq!(scheduled[0].delivery_date, date(2025, 1, 5));
    }

    #[test]
    fn test_update_status() {
        let repo = setup_repo();
        let id = repo.insert(&NewOrder::new("Salmonera Sur", 10.0, date(2025, 5, 1))).unwrap();

        let previous = repo.update_status(id, OrderStatus::Delivered).unwrap();
        assert_eq!(previous, OrderStatus::Pending);

        repo.update_status(id, OrderStatus::Cancelled).unwrap();
        let err = repo.update_status(id, OrderStatus::Pending).unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidStateTransition { .. }));

        assert!(matches!(
            repo.update_status(404, OrderStatus::Delivered),
            Err(RepositoryError::NotFound { .. })
        ));
    }

    #[test]
    fn test_find_all_sorted_and_delete() {
        let repo = setup_repo();
        let late = repo.insert(&NewOrder::new("B", 1.0, date(2025, 9, 1))).unwrap();
        repo.insert(&NewOrder::new("A", 2.0, date(2025, 3, 1)).with_product("Harina"))
            .unwrap();

        let all = repo.find_all().unwrap();
        assert_eq!(all[0].client, "A");
        assert_eq!(all[0].product, "Harina");

        repo.delete(late).unwrap();
        assert_eq!(repo.find_all().unwrap().len(), 1);
        assert!(repo.find_by_id(late).unwrap().is_none());
    }

    #[test]
    fn test_invalid_quantity_rejected() {
        let repo = setup_repo();
        let err = repo.insert(&NewOrder::new("A", 0.0, date(2025, 3, 1))).unwrap_err();
        assert!(matches!(err, RepositoryError::FieldValueError { ref field, .. } if field == "cantidad_ton"));
    }
}
