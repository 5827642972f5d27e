// ==========================================
// 藻类养殖 ATP 系统 - 配置管理 API
// ==========================================
// 职责: 经济参数与季节表的查询、更新、快照
// 审计: 每次写入记录 ActionLog (ParameterUpdate / SeasonUpdate)
// ==========================================

use crate::api::error::{ensure_operator, ApiError, ApiResult};
use crate::config::{ConfigManager, ParameterRow};
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::season::RawSeasonRow;
use crate::repository::ActionLogRepository;
use serde_json::json;
use std::sync::Arc;

// ==========================================
// ConfigApi - 配置管理 API
// ==========================================

/// 配置管理API
///
/// 职责：
/// 1. 参数/季节查询
/// 2. 参数更新（单个、批量）与季节维护
/// 3. 配置快照
/// 4. ActionLog记录
pub struct ConfigApi {
    config_manager: Arc<ConfigManager>,
    action_log_repo: Arc<ActionLogRepository>,
}

impl ConfigApi {
    pub fn new(config_manager: Arc<ConfigManager>, action_log_repo: Arc<ActionLogRepository>) -> Self {
        Self {
            config_manager,
            action_log_repo,
        }
    }

    /// 查询所有参数 (按类别、键排序)
    pub fn list_parameters(&self) -> ApiResult<Vec<ParameterRow>> {
        Ok(self.config_manager.list_parameters()?)
    }

    /// 查询所有季节行 (按存储顺序)
    pub fn list_seasons(&self) -> ApiResult<Vec<RawSeasonRow>> {
        Ok(self.config_manager.list_season_rows()?)
    }

    /// 更新单个参数
    ///
    /// # 参数
    /// - key: 参数键
    /// - value: 新值 (必须为正)
    /// - operator: 操作人
    pub fn update_parameter(&self, key: &str, value: f64, operator: &str) -> ApiResult<()> {
        ensure_operator(operator)?;
        let previous = self.config_manager.get_parameter_value(key)?;
        self.config_manager.update_parameter(key, value)?;

        let log = ActionLog::new(ActionType::ParameterUpdate, operator)
            .with_payload(&json!({
                "clave": key,
                "valor_anterior": previous,
                "valor": value,
            }))
            .with_detail(format!("更新参数: {}={}", key, value));
        self.action_log_repo.insert(&log)?;
        Ok(())
    }

    /// 批量更新参数 (单事务)
    ///
    /// # 返回
    /// - Ok(usize): 更新的参数数量
    pub fn batch_update_parameters(
        &self,
        updates: &[(String, f64)],
        operator: &str,
    ) -> ApiResult<usize> {
        ensure_operator(operator)?;
        if updates.is_empty() {
            return Err(ApiError::InvalidInput("参数列表不能为空".to_string()));
        }

        let count = self.config_manager.batch_update_parameters(updates)?;

        let log = ActionLog::new(ActionType::ParameterUpdate, operator)
            .with_payload(&json!({ "parametros": updates }))
            .with_impact_summary(&json!({ "updated_count": count }))
            .with_detail(format!("批量更新{}个参数", count));
        self.action_log_repo.insert(&log)?;
        Ok(count)
    }

    /// 新增或更新季节
    ///
    /// # 返回
    /// - Ok(id): 季节行 id
    /// - Err(ValidationError): 名称为空、月份非法或系数非正
    pub fn upsert_season(&self, row: &RawSeasonRow, operator: &str) -> ApiResult<i64> {
        ensure_operator(operator)?;
        let id = self.config_manager.upsert_season(row)?;

        let log = ActionLog::new(ActionType::SeasonUpdate, operator)
            .with_payload(row)
            .with_detail(format!("更新季节: {} ({})", row.season_name, row.months));
        self.action_log_repo.insert(&log)?;
        Ok(id)
    }

    /// 获取配置快照 (JSON)
    pub fn get_config_snapshot(&self) -> ApiResult<serde_json::Value> {
        Ok(self.config_manager.get_config_snapshot()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ensure_schema;
    use rusqlite::Connection;
    use std::sync::Mutex;

    fn setup() -> (ConfigApi, Arc<ActionLogRepository>) {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        let conn = Arc::new(Mutex::new(conn));
        let config = Arc::new(ConfigManager::from_connection(conn.clone()).unwrap());
        config.seed_defaults().unwrap();
        let action_log_repo = Arc::new(ActionLogRepository::new(conn));
        (ConfigApi::new(config, action_log_repo.clone()), action_log_repo)
    }

    #[test]
    fn test_update_parameter_writes_audit() {
        let (api, logs) = setup();

        api.update_parameter("precio_kwh", 175.0, "admin").unwrap();

        let entries = logs.find_by_action_type(ActionType::ParameterUpdate, 10).unwrap();
        assert_eq!(entries.len(), 1);
        let payload = entries[0].payload_json.as_ref().unwrap();
        assert_eq!(payload["clave"], "precio_kwh");
        assert_eq!(payload["valor_anterior"], "150");
    }

    #[test]
    fn test_update_parameter_rejects_non_positive() {
        let (api, logs) = setup();

        let err = api.update_parameter("precio_kwh", 0.0, "admin").unwrap_err();

        assert_eq!(err.code(), "INVALID_INPUT");
        assert_eq!(logs.count_by_actor("admin").unwrap(), 0);
    }

    #[test]
    fn test_batch_update_requires_operator_and_items() {
        let (api, _) = setup();
        assert!(api.batch_update_parameters(&[], "admin").is_err());
        assert!(api
            .batch_update_parameters(&[("precio_kwh".to_string(), 1.0)], " ")
            .is_err());
        assert_eq!(
            api.batch_update_parameters(
                &[
                    ("precio_kwh".to_string(), 160.0),
                    ("precio_diesel_L".to_string(), 1200.0)
                ],
                "admin"
            )
            .unwrap(),
            2
        );
    }

    #[test]
    fn test_upsert_season_validates_months() {
        let (api, _) = setup();
        let mut row = RawSeasonRow {
            id: None,
            season_name: "Invierno".to_string(),
            months: "5,6,7,8".to_string(),
            biomass_factor: 0.8,
            drying_factor: 0.6,
            energy_factor: 1.3,
            growth_factor: 0.7,
            description: None,
        };
        api.upsert_season(&row, "admin").unwrap();
        let stored = api
            .list_seasons()
            .unwrap()
            .into_iter()
            .find(|s| s.season_name == "Invierno")
            .unwrap();
        assert_eq!(stored.months, "5,6,7,8");

        row.months = "0,6".to_string();
        let err = api.upsert_season(&row, "admin").unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }
}
