// ==========================================
// 藻类养殖 ATP 系统 - 养殖批次与订单 API
// ==========================================
// 职责: 批次/称重/订单登记与维护, 日历与看板, 为 ATP 提供供需数据
// 审计: 每次写操作记录 ActionLog (操作人必填)
// ==========================================

use crate::api::error::{ensure_operator, ApiError, ApiResult};
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::batch::{Batch, HarvestWeighing, NewBatch};
use crate::domain::order::{NewOrder, Order};
use crate::domain::overview::{CalendarEvent, CalendarEventKind, DashboardSummary, MonthlyDelivery};
use crate::domain::types::{BatchStatus, OrderStatus};
use crate::engine::HarvestEstimator;
use crate::i18n::t_with_args;
use crate::repository::{ActionLogRepository, BatchRepository, OrderRepository, WeighingRepository};
use chrono::{Duration, NaiveDate};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// 看板 "近期称重" 的回看天数
const RECENT_WEIGHING_DAYS: i64 = 7;

pub struct FarmApi {
    batch_repo: Arc<BatchRepository>,
    order_repo: Arc<OrderRepository>,
    weighing_repo: Arc<WeighingRepository>,
    action_log_repo: Arc<ActionLogRepository>,
}

impl FarmApi {
    pub fn new(
        batch_repo: Arc<BatchRepository>,
        order_repo: Arc<OrderRepository>,
        weighing_repo: Arc<WeighingRepository>,
        action_log_repo: Arc<ActionLogRepository>,
    ) -> Self {
        Self {
            batch_repo,
            order_repo,
            weighing_repo,
            action_log_repo,
        }
    }

    // ==========================================
    // 批次
    // ==========================================

    /// 登记养殖批次
    ///
    /// # 参数
    /// - estimated_harvest: 为 None 时按藻种与播种月份估算
    /// - operator: 操作人 (写入审计)
    ///
    /// # 返回
    /// - Ok(Batch): 已入库的批次
    pub fn register_batch(
        &self,
        algae_type: &str,
        area_hectares: f64,
        sowing_date: NaiveDate,
        estimated_harvest: Option<NaiveDate>,
        operator: &str,
    ) -> ApiResult<Batch> {
        ensure_operator(operator)?;
        let harvest_date = estimated_harvest
            .unwrap_or_else(|| HarvestEstimator::estimate(sowing_date, algae_type));
        let new_batch = NewBatch::new(algae_type.trim(), area_hectares, sowing_date)
            .with_estimated_harvest(harvest_date);

        let batch_id = self.batch_repo.insert(&new_batch)?;
        info!(batch_id, algae_type, %harvest_date, "批次已登记");

        let batch = self
            .batch_repo
            .find_by_id(batch_id)?
            .ok_or_else(|| ApiError::InternalError(format!("批次(id={})写入后无法读取", batch_id)))?;

        self.audit(
            ActionLog::new(ActionType::BatchRegistered, operator)
                .with_payload(&batch)
                .with_detail(format!("登记批次 {} ({} ha)", batch.algae_type, batch.area_hectares)),
        );
        Ok(batch)
    }

    pub fn list_batches(&self) -> ApiResult<Vec<Batch>> {
        Ok(self.batch_repo.find_all()?)
    }

    /// 各状态批次数
    pub fn batch_status_counts(&self) -> ApiResult<HashMap<BatchStatus, i64>> {
        Ok(self.batch_repo.count_by_status()?)
    }

    /// 标记批次为已收获
    pub fn mark_harvested(&self, batch_id: i64, operator: &str) -> ApiResult<()> {
        ensure_operator(operator)?;
        self.batch_repo.mark_harvested(batch_id)?;

        self.audit(
            ActionLog::new(ActionType::BatchHarvested, operator)
                .with_payload(&json!({ "lote_id": batch_id }))
                .with_detail(format!("批次 {} 标记为已收获", batch_id)),
        );
        Ok(())
    }

    /// 删除批次 (称重记录随之级联删除)
    pub fn delete_batch(&self, batch_id: i64, operator: &str) -> ApiResult<()> {
        ensure_operator(operator)?;
        self.batch_repo.delete(batch_id)?;

        self.audit(
            ActionLog::new(ActionType::BatchDeleted, operator)
                .with_payload(&json!({ "lote_id": batch_id }))
                .with_detail(format!("删除批次 {}", batch_id)),
        );
        Ok(())
    }

    // ==========================================
    // 称重
    // ==========================================

    /// 登记收获称重 (干重按湿重 15% 换算)
    ///
    /// # 错误
    /// - 批次不存在 → NotFound
    /// - 湿重非正 → InvalidInput
    pub fn record_weighing(
        &self,
        batch_id: i64,
        wet_weight_kg: f64,
        weighing_date: NaiveDate,
        recorded_by: &str,
    ) -> ApiResult<HarvestWeighing> {
        ensure_operator(recorded_by)?;
        if self.batch_repo.find_by_id(batch_id)?.is_none() {
            return Err(ApiError::NotFound(format!("Batch(id={})不存在", batch_id)));
        }
        let mut weighing =
            HarvestWeighing::from_wet_weight(batch_id, wet_weight_kg, weighing_date, recorded_by.trim())
                .ok_or_else(|| ApiError::InvalidInput(format!("湿重必须大于 0: {}", wet_weight_kg)))?;

        let weighing_id = self.weighing_repo.insert(&weighing)?;
        weighing.weighing_id = Some(weighing_id);
        info!(weighing_id, batch_id, wet_weight_kg, "称重已登记");

        self.audit(
            ActionLog::new(ActionType::HarvestWeighed, recorded_by)
                .with_payload(&weighing)
                .with_detail(format!(
                    "批次 {} 称重 {} kg (干重 {} kg)",
                    batch_id, weighing.wet_weight_kg, weighing.dry_weight_kg
                )),
        );
        Ok(weighing)
    }

    /// 最近的称重记录
    pub fn list_recent_weighings(&self, limit: usize) -> ApiResult<Vec<HarvestWeighing>> {
        Ok(self.weighing_repo.find_recent(limit)?)
    }

    pub fn list_batch_weighings(&self, batch_id: i64) -> ApiResult<Vec<HarvestWeighing>> {
        Ok(self.weighing_repo.find_by_batch(batch_id)?)
    }

    // ==========================================
    // 订单
    // ==========================================

    /// 登记订单 (状态: pendiente)
    pub fn register_order(
        &self,
        client: &str,
        product: Option<&str>,
        quantity_tons: f64,
        delivery_date: NaiveDate,
        operator: &str,
    ) -> ApiResult<Order> {
        ensure_operator(operator)?;
        let mut new_order = NewOrder::new(client.trim(), quantity_tons, delivery_date);
        if let Some(product) = product.map(str::trim).filter(|p| !p.is_empty()) {
            new_order = new_order.with_product(product);
        }

        let order_id = self.order_repo.insert(&new_order)?;
        info!(order_id, client, quantity_tons, "订单已登记");

        let order = self
            .order_repo
            .find_by_id(order_id)?
            .ok_or_else(|| ApiError::InternalError(format!("订单(id={})写入后无法读取", order_id)))?;

        self.audit(
            ActionLog::new(ActionType::OrderRegistered, operator)
                .with_payload(&order)
                .with_detail(format!("登记订单 {} {} t", order.client, order.quantity_tons)),
        );
        Ok(order)
    }

    pub fn list_orders(&self) -> ApiResult<Vec<Order>> {
        Ok(self.order_repo.find_all()?)
    }

    /// 更新订单状态
    ///
    /// # 错误
    /// - 已取消订单不可恢复 → InvalidStateTransition
    pub fn update_order_status(
        &self,
        order_id: i64,
        status: OrderStatus,
        operator: &str,
    ) -> ApiResult<()> {
        ensure_operator(operator)?;
        let previous = self.order_repo.update_status(order_id, status)?;

        self.audit(
            ActionLog::new(ActionType::OrderStatusChange, operator)
                .with_payload(&json!({
                    "pedido_id": order_id,
                    "estado_anterior": previous.as_str(),
                    "estado": status.as_str(),
                }))
                .with_detail(format!(
                    "订单 {} 状态 {} → {}",
                    order_id,
                    previous.as_str(),
                    status.as_str()
                )),
        );
        Ok(())
    }

    pub fn delete_order(&self, order_id: i64, operator: &str) -> ApiResult<()> {
        ensure_operator(operator)?;
        self.order_repo.delete(order_id)?;

        self.audit(
            ActionLog::new(ActionType::OrderDeleted, operator)
                .with_payload(&json!({ "pedido_id": order_id }))
                .with_detail(format!("删除订单 {}", order_id)),
        );
        Ok(())
    }

    // ==========================================
    // 日历与看板
    // ==========================================

    /// 日历事件: 未取消订单的交货日 + 养殖中批次的预计收获日
    ///
    /// 按日期排序, 同日交付在前
    pub fn calendar_events(&self) -> ApiResult<Vec<CalendarEvent>> {
        let mut events: Vec<CalendarEvent> = self
            .order_repo
            .find_not_cancelled()?
            .into_iter()
            .map(|order| CalendarEvent {
                kind: CalendarEventKind::Delivery,
                date: order.delivery_date,
                title: t_with_args(
                    "calendar.delivery",
                    &[
                        ("client", &order.client),
                        ("tons", &order.quantity_tons.to_string()),
                    ],
                ),
                source_id: order.order_id,
                quantity: order.quantity_tons,
                product: Some(order.product),
            })
            .collect();

        for batch in self.batch_repo.find_all()? {
            let Some(harvest_date) = batch.estimated_harvest_date else {
                continue;
            };
            if batch.status != BatchStatus::Active {
                continue;
            }
            events.push(CalendarEvent {
                kind: CalendarEventKind::Harvest,
                date: harvest_date,
                title: t_with_args(
                    "calendar.harvest",
                    &[
                        ("algae", &batch.algae_type),
                        ("area", &batch.area_hectares.to_string()),
                    ],
                ),
                source_id: batch.batch_id,
                quantity: batch.area_hectares,
                product: None,
            });
        }

        events.sort_by_key(|e| (e.date, e.kind != CalendarEventKind::Delivery, e.source_id));
        Ok(events)
    }

    /// 运营看板
    ///
    /// # 参数
    /// - today: 计算 "近 7 天称重" 的基准日
    pub fn dashboard_summary(&self, today: NaiveDate) -> ApiResult<DashboardSummary> {
        let active_batches = self
            .batch_repo
            .count_by_status()?
            .get(&BatchStatus::Active)
            .copied()
            .unwrap_or(0);
        let pending_orders = self.order_repo.count_with_status(OrderStatus::Pending)?;
        let recent_weighings = self
            .weighing_repo
            .count_since(today - Duration::days(RECENT_WEIGHING_DAYS))?;
        let delivered_by_month = self
            .order_repo
            .delivered_tons_by_month()?
            .into_iter()
            .map(|(month, delivered_tons)| MonthlyDelivery {
                month,
                delivered_tons,
            })
            .collect();

        Ok(DashboardSummary {
            active_batches,
            pending_orders,
            recent_weighings,
            delivered_by_month,
        })
    }

    /// 写入已生效, 审计失败只告警
    fn audit(&self, log: ActionLog) {
        if let Err(e) = self.action_log_repo.insert(&log) {
            warn!(error = %e, action_type = %log.action_type, "操作日志写入失败");
        }
    }
}
