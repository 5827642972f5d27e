// ==========================================
// 藻类养殖 ATP 系统 - 客户管理 API
// ==========================================
// 职责: 客户增删改查
// 规则: 名下仍有订单的客户不可删除, 也不可改名
// 审计: 每次写入记录 ActionLog (ClientChange)
// ==========================================

use crate::api::error::{ensure_operator, ApiError, ApiResult};
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::client::{Client, ClientInput};
use crate::repository::{ActionLogRepository, ClientRepository, OrderRepository};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

pub struct ClientApi {
    client_repo: Arc<ClientRepository>,
    order_repo: Arc<OrderRepository>,
    action_log_repo: Arc<ActionLogRepository>,
}

impl ClientApi {
    pub fn new(
        client_repo: Arc<ClientRepository>,
        order_repo: Arc<OrderRepository>,
        action_log_repo: Arc<ActionLogRepository>,
    ) -> Self {
        Self {
            client_repo,
            order_repo,
            action_log_repo,
        }
    }

    /// 全部客户 (按公司名排序)
    pub fn list_clients(&self) -> ApiResult<Vec<Client>> {
        Ok(self.client_repo.find_all()?)
    }

    pub fn get_client(&self, client_id: i64) -> ApiResult<Client> {
        self.client_repo
            .find_by_id(client_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Client(id={})不存在", client_id)))
    }

    /// 新增客户
    ///
    /// # 错误
    /// - 公司名为空 → InvalidInput
    /// - 公司名重复 → BusinessRuleViolation
    pub fn create_client(&self, input: &ClientInput, operator: &str) -> ApiResult<Client> {
        ensure_operator(operator)?;
        let client_id = self.client_repo.insert(input)?;
        let client = self.get_client(client_id)?;
        info!(client_id, company = %client.company, "客户已登记");

        self.audit(
            ActionLog::new(ActionType::ClientChange, operator)
                .with_payload(&json!({ "operacion": "crear", "cliente": client }))
                .with_detail(format!("新增客户 {}", client.company)),
        );
        Ok(client)
    }

    /// 修改客户
    ///
    /// # 错误
    /// - 名下有订单时改名 → BusinessRuleViolation (订单按公司名关联)
    pub fn update_client(
        &self,
        client_id: i64,
        input: &ClientInput,
        operator: &str,
    ) -> ApiResult<Client> {
        ensure_operator(operator)?;
        let current = self.get_client(client_id)?;
        let renamed = current.company != input.company.trim();
        if renamed && self.order_repo.count_by_client(&current.company)? > 0 {
            return Err(ApiError::BusinessRuleViolation(format!(
                "客户 {} 名下仍有订单, 不可改名",
                current.company
            )));
        }

        self.client_repo.update(client_id, input)?;
        let client = self.get_client(client_id)?;

        self.audit(
            ActionLog::new(ActionType::ClientChange, operator)
                .with_payload(&json!({ "operacion": "modificar", "anterior": current, "cliente": client }))
                .with_detail(format!("修改客户 {}", client.company)),
        );
        Ok(client)
    }

    /// 删除客户
    ///
    /// # 错误
    /// - 名下仍有订单 (含已取消) → BusinessRuleViolation
    pub fn delete_client(&self, client_id: i64, operator: &str) -> ApiResult<()> {
        ensure_operator(operator)?;
        let client = self.get_client(client_id)?;
        let orders = self.order_repo.count_by_client(&client.company)?;
        if orders > 0 {
            return Err(ApiError::BusinessRuleViolation(format!(
                "客户 {} 名下仍有 {} 个订单, 不可删除",
                client.company, orders
            )));
        }

        self.client_repo.delete(client_id)?;
        self.audit(
            ActionLog::new(ActionType::ClientChange, operator)
                .with_payload(&json!({ "operacion": "eliminar", "cliente": client }))
                .with_detail(format!("删除客户 {}", client.company)),
        );
        Ok(())
    }

    fn audit(&self, log: ActionLog) {
        if let Err(e) = self.action_log_repo.insert(&log) {
            warn!(error = %e, action_type = %log.action_type, "操作日志写入失败");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{configure_sqlite_connection, ensure_schema};
    use crate::domain::order::NewOrder;
    use chrono::NaiveDate;
    use rusqlite::Connection;
    use std::sync::Mutex;

    struct Fixture {
        api: ClientApi,
        order_repo: Arc<OrderRepository>,
        logs: Arc<ActionLogRepository>,
    }

    fn setup() -> Fixture {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        ensure_schema(&conn).unwrap();
        let conn = Arc::new(Mutex::new(conn));
        let order_repo = Arc::new(OrderRepository::new(conn.clone()));
        let logs = Arc::new(ActionLogRepository::new(conn.clone()));
        let api = ClientApi::new(
            Arc::new(ClientRepository::new(conn)),
            order_repo.clone(),
            logs.clone(),
        );
        Fixture {
            api,
            order_repo,
            logs,
        }
    }

    fn due() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 1).unwrap()
    }

    #[test]
    fn test_create_update_delete_are_audited() {
        let fx = setup();
        let client = fx
            .api
            .create_client(&ClientInput::new("Salmonera Sur").with_email("a@sur.cl"), "admin")
            .unwrap();
        assert_eq!(client.email.as_deref(), Some("a@sur.cl"));

        let updated = fx
            .api
            .update_client(
                client.client_id,
                &ClientInput::new("Salmonera del Sur").with_contact("Rosa"),
                "admin",
            )
            .unwrap();
        assert_eq!(updated.company, "Salmonera del Sur");
        assert_eq!(updated.email, None);

        fx.api.delete_client(client.client_id, "admin").unwrap();
        assert!(fx.api.list_clients().unwrap().is_empty());
        assert_eq!(
            fx.api.get_client(client.client_id).unwrap_err().code(),
            "NOT_FOUND"
        );

        let entries = fx.logs.find_by_action_type(ActionType::ClientChange, 10).unwrap();
        assert_eq!(entries.len(), 3);
    }

    #[test]
    fn test_client_with_orders_cannot_be_deleted_or_renamed() {
        let fx = setup();
        let client = fx.api.create_client(&ClientInput::new("Acme"), "admin").unwrap();
        fx.order_repo.insert(&NewOrder::new("Acme", 3.0, due())).unwrap();

        let err = fx.api.delete_client(client.client_id, "admin").unwrap_err();
        assert_eq!(err.code(), "BUSINESS_RULE_VIOLATION");

        let err = fx
            .api
            .update_client(client.client_id, &ClientInput::new("Acme SpA"), "admin")
            .unwrap_err();
        assert_eq!(err.code(), "BUSINESS_RULE_VIOLATION");

        // 不改名的修改仍允许
        fx.api
            .update_client(client.client_id, &ClientInput::new("Acme").with_phone("123"), "admin")
            .unwrap();
        assert_eq!(fx.api.list_clients().unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_writes_rejected() {
        let fx = setup();
        fx.api.create_client(&ClientInput::new("Acme"), "admin").unwrap();

        let err = fx.api.create_client(&ClientInput::new("Acme"), "admin").unwrap_err();
        assert_eq!(err.code(), "BUSINESS_RULE_VIOLATION");
        let err = fx.api.create_client(&ClientInput::new(" "), "admin").unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");
        let err = fx.api.create_client(&ClientInput::new("Beta"), "").unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");
        let err = fx.api.delete_client(999, "admin").unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");

        assert_eq!(fx.logs.count_by_actor("admin").unwrap(), 1);
    }
}
