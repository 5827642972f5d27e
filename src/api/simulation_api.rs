// ==========================================
// 藻类养殖 ATP 系统 - 订单可行性模拟 API
// ==========================================
// 职责: 收集快照 → 引擎计算 → 展示 → 审计归档
// 红线: 输入校验先于任何存储读取; 归档失败不影响结果
// ==========================================

use crate::api::audit::{OptionalAuditSink, SimulationAuditEntry};
use crate::api::error::{ApiError, ApiResult};
use crate::api::presenter::{ResultPresenter, SimulationSummary};
use crate::config::SimulationConfigReader;
use crate::domain::simulation::{SimulationRequest, StockSnapshot};
use crate::engine::{
    parse_target_date, validate_quantity, SimulationEngine, StockAvailabilityCalculator,
};
use crate::repository::{BatchRepository, OrderRepository};
use chrono::NaiveDate;
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use tracing::{info, instrument, warn};

// ==========================================
// SimulationApi
// ==========================================
pub struct SimulationApi {
    config_reader: Arc<dyn SimulationConfigReader>,
    batch_repo: Arc<BatchRepository>,
    order_repo: Arc<OrderRepository>,
    audit_sink: OptionalAuditSink,
    engine: SimulationEngine,
}

impl SimulationApi {
    pub fn new(
        config_reader: Arc<dyn SimulationConfigReader>,
        batch_repo: Arc<BatchRepository>,
        order_repo: Arc<OrderRepository>,
        audit_sink: OptionalAuditSink,
    ) -> Self {
        Self {
            config_reader,
            batch_repo,
            order_repo,
            audit_sink,
            engine: SimulationEngine::new(),
        }
    }

    /// 执行订单可行性模拟（同步入口）
    ///
    /// # 参数
    /// - quantity: 需求数量 (吨)
    /// - raw_target_date: 目标日期 `YYYY-MM-DD`
    /// - requesting_user: 发起人, 写入审计日志
    ///
    /// # 返回
    /// - Ok(SimulationSummary): { summary, color, data }
    /// - Err(InvalidInput): 数量/日期/用户非法 (不触发任何读取)
    /// - Err(ConfigurationIncomplete): 参数缺失或非法
    /// - Err(InternalError): 在 current_thread 运行时内调用 (请改用 `run_simulation_async`)
    pub fn run_simulation(
        &self,
        quantity: f64,
        raw_target_date: Option<&str>,
        requesting_user: &str,
    ) -> ApiResult<SimulationSummary> {
        block_on_bridge(self.run_simulation_async(quantity, raw_target_date, requesting_user))?
    }

    /// 执行订单可行性模拟（异步入口）
    #[instrument(skip(self))]
    pub async fn run_simulation_async(
        &self,
        quantity: f64,
        raw_target_date: Option<&str>,
        requesting_user: &str,
    ) -> ApiResult<SimulationSummary> {
        // 1. 输入校验
        validate_quantity(quantity)?;
        let target_date = parse_target_date(raw_target_date)?;
        if requesting_user.trim().is_empty() {
            return Err(ApiError::InvalidInput("发起用户不能为空".to_string()));
        }

        // 2. 配置快照
        let economic_parameters = self.config_reader.get_economic_parameters().await?;
        let season_table = self.config_reader.get_season_table().await?;
        let yield_tons_per_hectare = self.config_reader.get_yield_tons_per_hectare().await?;

        // 3. 库存快照
        let stock = self.compute_stock(target_date, yield_tons_per_hectare)?;

        // 4. 计算与展示
        let request = SimulationRequest {
            requested_quantity_tons: quantity,
            target_date,
            available_stock_tons: stock.net_available_tons,
            economic_parameters,
            season_table,
        };
        let result = self.engine.simulate(&request)?;
        let summary = ResultPresenter::present(&result);

        info!(
            user = requesting_user,
            color = %summary.color,
            deficit_tons = result.deficit_tons(),
            total_days = result.total_lead_time_days(),
            total_cost = result.total_cost_estimate(),
            "模拟完成"
        );

        // 5. 审计归档
        let entry = SimulationAuditEntry {
            requesting_user: requesting_user.to_string(),
            requested_quantity_tons: quantity,
            target_date,
            stock,
            result,
        };
        if let Err(e) = self.audit_sink.archive(&entry) {
            warn!(error = %e, user = requesting_user, "模拟归档失败");
        }

        Ok(summary)
    }

    /// 预览目标日期的 ATP 库存
    pub fn preview_stock(&self, target_date: NaiveDate) -> ApiResult<StockSnapshot> {
        let yield_tons_per_hectare =
            block_on_bridge(self.config_reader.get_yield_tons_per_hectare())??;
        self.compute_stock(target_date, yield_tons_per_hectare)
    }

    fn compute_stock(
        &self,
        target_date: NaiveDate,
        yield_tons_per_hectare: f64,
    ) -> ApiResult<StockSnapshot> {
        let batches = self.batch_repo.find_for_atp(target_date)?;
        let orders = self.order_repo.find_committed_until(target_date)?;
        let calculator = StockAvailabilityCalculator::new(yield_tons_per_hectare);
        Ok(calculator.compute_net_stock(target_date, &batches, &orders))
    }
}

// ==========================================
// 同步 → 异步桥接
// ==========================================

/// 在同步入口中驱动异步实现
///
/// - 多线程运行时内: block_in_place + block_on
/// - 运行时外: 临时创建运行时
/// - current_thread 运行时内无法 block_in_place, 返回 InternalError
fn block_on_bridge<F: Future>(future: F) -> ApiResult<F::Output> {
    match Handle::try_current() {
        Ok(handle) => {
            if handle.runtime_flavor() == RuntimeFlavor::CurrentThread {
                return Err(ApiError::InternalError(
                    "current_thread 运行时内不支持同步入口, 请调用异步入口".to_string(),
                ));
            }
            Ok(tokio::task::block_in_place(|| handle.block_on(future)))
        }
        Err(_) => {
            let runtime = Runtime::new()
                .map_err(|e| ApiError::InternalError(format!("创建运行时失败: {}", e)))?;
            Ok(runtime.block_on(future))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigManager;
    use crate::db::ensure_schema;
    use crate::domain::batch::NewBatch;
    use crate::domain::order::NewOrder;
    use crate::domain::types::{BatchStatus, ResultColor};
    use crate::repository::ActionLogRepository;
    use rusqlite::Connection;
    use std::sync::Mutex;

    struct Fixture {
        api: SimulationApi,
        batch_repo: Arc<BatchRepository>,
        order_repo: Arc<OrderRepository>,
        action_log_repo: Arc<ActionLogRepository>,
    }

    fn setup() -> Fixture {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        let conn = Arc::new(Mutex::new(conn));

        let config = Arc::new(ConfigManager::from_connection(conn.clone()).unwrap());
        config.seed_defaults().unwrap();
        let batch_repo = Arc::new(BatchRepository::new(conn.clone()));
        let order_repo = Arc::new(OrderRepository::new(conn.clone()));
        let action_log_repo = Arc::new(ActionLogRepository::new(conn));

        let api = SimulationApi::new(
            config,
            batch_repo.clone(),
            order_repo.clone(),
            OptionalAuditSink::with_sink(action_log_repo.clone()),
        );
        Fixture {
            api,
            batch_repo,
            order_repo,
            action_log_repo,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_invalid_quantity_rejected_before_lookup() {
        let fx = setup();
        let err = fx.api.run_simulation(0.0, Some("2025-10-15"), "ana").unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");

        let err = fx.api.run_simulation(5.0, Some("15/10/2025"), "ana").unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");

        let err = fx.api.run_simulation(5.0, None, "ana").unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");

        assert_eq!(fx.action_log_repo.count_by_actor("ana").unwrap(), 0);
    }

    #[test]
    fn test_empty_farm_requires_cultivation() {
        let fx = setup();

        let summary = fx.api.run_simulation(10.0, Some("2025-10-15"), "ana").unwrap();

        assert_eq!(summary.color, ResultColor::Warning);
        assert_eq!(summary.data.deficit_tons(), 10.0);
        assert_eq!(fx.action_log_repo.count_by_actor("ana").unwrap(), 1);
    }

    #[test]
    fn test_stock_net_of_committed_orders() {
        let fx = setup();
        // 5 ha × 10 t/ha = 50 t 供给
        fx.batch_repo
            .insert(
                &NewBatch::new("Gracilaria", 5.0, date(2025, 1, 1))
                    .with_status(BatchStatus::Harvested),
            )
            .unwrap();
        fx.order_repo
            .insert(&NewOrder::new("Acme", 20.0, date(2025, 9, 1)))
            .unwrap();

        let stock = fx.api.preview_stock(date(2025, 10, 15)).unwrap();
        assert_eq!(stock.supplied_tons, 50.0);
        assert_eq!(stock.committed_tons, 20.0);
        assert_eq!(stock.net_available_tons, 30.0);

        // 10 月落在默认季节表的 Primavera (9,10,11), 按其生物量系数投影
        let summary = fx.api.run_simulation(10.0, Some("2025-10-15"), "ana").unwrap();
        assert_eq!(summary.color, ResultColor::Green);
        assert_eq!(summary.data.deficit_tons(), 0.0);
    }

    #[test]
    fn test_blank_user_rejected() {
        let fx = setup();
        let err = fx.api.run_simulation(10.0, Some("2025-10-15"), "  ").unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");
    }

    #[tokio::test]
    async fn test_sync_entry_inside_current_thread_runtime_is_an_error() {
        let fx = setup();

        let err = fx.api.run_simulation(1.0, Some("2025-01-15"), "bot").unwrap_err();
        assert_eq!(err.code(), "INTERNAL_ERROR");
        let err = fx.api.preview_stock(date(2025, 1, 15)).unwrap_err();
        assert_eq!(err.code(), "INTERNAL_ERROR");
        assert_eq!(fx.action_log_repo.count_by_actor("bot").unwrap(), 0);

        // 异步入口不受影响
        let summary = fx
            .api
            .run_simulation_async(1.0, Some("2025-01-15"), "bot")
            .await
            .unwrap();
        assert_eq!(summary.data.scenario.target_date, date(2025, 1, 15));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_sync_entry_inside_multi_thread_runtime() {
        let fx = setup();
        let summary = fx.api.run_simulation(1.0, Some("2025-01-15"), "bot").unwrap();
        assert_eq!(summary.data.scenario.target_date, date(2025, 1, 15));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_async_entry() {
        let fx = setup();
        let summary = fx
            .api
            .run_simulation_async(1.0, Some("2025-01-15"), "bot")
            .await
            .unwrap();
        assert_eq!(summary.data.scenario.target_date, date(2025, 1, 15));
    }
}
