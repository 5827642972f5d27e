// ==========================================
// 藻类养殖 ATP 系统 - 客户数据仓储
// ==========================================
// 对齐: clientes 表
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::client::{Client, ClientInput};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str = r#"
    SELECT id, empresa, contacto, email, telefono, direccion
    FROM clientes
"#;

// ==========================================
// ClientRepository - 客户仓储
// ==========================================
pub struct ClientRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ClientRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新增客户
    ///
    /// # 错误
    /// - 公司名为空 → FieldValueError
    /// - 公司名重复 → UniqueConstraintViolation
    pub fn insert(&self, input: &ClientInput) -> RepositoryResult<i64> {
        let input = input.normalized();
        validate_input(&input)?;

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO clientes (empresa, contacto, email, telefono, direccion)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![input.company, input.contact, input.email, input.phone, input.address],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 修改客户 (整行覆盖)
    pub fn update(&self, client_id: i64, input: &ClientInput) -> RepositoryResult<()> {
        let input = input.normalized();
        validate_input(&input)?;

        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE clientes
            SET empresa = ?1, contacto = ?2, email = ?3, telefono = ?4, direccion = ?5
            WHERE id = ?6
            "#,
            params![
                input.company,
                input.contact,
                input.email,
                input.phone,
                input.address,
                client_id
            ],
        )?;
        if affected == 0 {
            return Err(not_found(client_id));
        }
        Ok(())
    }

    pub fn delete(&self, client_id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM clientes WHERE id = ?1", params![client_id])?;
        if affected == 0 {
            return Err(not_found(client_id));
        }
        Ok(())
    }

    pub fn find_by_id(&self, client_id: i64) -> RepositoryResult<Option<Client>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE id = ?1", SELECT_COLUMNS);
        let client = conn
            .query_row(&sql, params![client_id], map_row)
            .optional()?;
        Ok(client)
    }

    /// 全部客户 (按公司名排序)
    pub fn find_all(&self) -> RepositoryResult<Vec<Client>> {
        let conn = self.get_conn()?;
        let sql = format!("{} ORDER BY empresa COLLATE NOCASE, id", SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let clients = stmt
            .query_map([], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(clients)
    }
}

fn validate_input(input: &ClientInput) -> RepositoryResult<()> {
    if input.company.is_empty() {
        return Err(RepositoryError::FieldValueError {
            field: "empresa".to_string(),
            message: "不能为空".to_string(),
        });
    }
    Ok(())
}

fn not_found(client_id: i64) -> RepositoryError {
    RepositoryError::NotFound {
        entity: "Client".to_string(),
        id: client_id.to_string(),
    }
}

fn map_row(row: &Row) -> SqliteResult<Client> {
    Ok(Client {
        client_id: row.get(0)?,
        company: row.get(1)?,
        contact: row.get(2)?,
        email: row.get(3)?,
        phone: row.get(4)?,
        address: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_repo() -> ClientRepository {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::ensure_schema(&conn).unwrap();
        ClientRepository::new(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn test_crud() {
        let repo = setup_repo();
        let id = repo
            .insert(&ClientInput::new("Salmonera Sur").with_contact("Rosa"))
            .unwrap();
        repo.insert(&ClientInput::new("agro Norte")).unwrap();

        let names: Vec<String> = repo.find_all().unwrap().into_iter().map(|c| c.company).collect();
        assert_eq!(names, vec!["agro Norte", "Salmonera Sur"]);

        repo.update(id, &ClientInput::new("Salmonera Sur").with_phone("+56 9 1234"))
            .unwrap();
        let client = repo.find_by_id(id).unwrap().unwrap();
        assert_eq!(client.contact, None);
        assert_eq!(client.phone.as_deref(), Some("+56 9 1234"));

        repo.delete(id).unwrap();
        assert!(repo.find_by_id(id).unwrap().is_none());
        assert!(matches!(repo.delete(id), Err(RepositoryError::NotFound { .. })));
        assert!(matches!(
            repo.update(id, &ClientInput::new("X")),
            Err(RepositoryError::NotFound { .. })
        ));
    }

    #[test]
    fn test_duplicate_and_blank_company_rejected() {
        let repo = setup_repo();
        repo.insert(&ClientInput::new("Acme")).unwrap();

        let err = repo.insert(&ClientInput::new(" Acme ")).unwrap_err();
        assert!(matches!(err, RepositoryError::UniqueConstraintViolation(_)));

        let err = repo.insert(&ClientInput::new("   ")).unwrap_err();
        assert!(matches!(err, RepositoryError::FieldValueError { .. }));
    }
}
