// ==========================================
// 藻类养殖 ATP 系统 - 可承诺库存计算器
// ==========================================
// 职责: ATP 净额 = 供给 (批次面积 × 单产) - 已承诺需求
// 输入: 目标日期 + 批次 + 订单
// 输出: StockSnapshot (每次请求重新计算, 不持久化)
// ==========================================

use crate::domain::batch::Batch;
use crate::domain::order::Order;
use crate::domain::simulation::StockSnapshot;
use chrono::NaiveDate;
use tracing::instrument;

/// 默认单产 (吨/公顷)
pub const DEFAULT_YIELD_TONS_PER_HECTARE: f64 = 10.0;

// ==========================================
// StockAvailabilityCalculator - ATP 计算器
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct StockAvailabilityCalculator {
    yield_tons_per_hectare: f64,
}

impl Default for StockAvailabilityCalculator {
    fn default() -> Self {
        Self::new(DEFAULT_YIELD_TONS_PER_HECTARE)
    }
}

impl StockAvailabilityCalculator {
    /// 创建计算器
    ///
    /// 单产非正或非有限值时退回默认单产
    pub fn new(yield_tons_per_hectare: f64) -> Self {
        let yield_tons_per_hectare =
            if yield_tons_per_hectare.is_finite() && yield_tons_per_hectare > 0.0 {
                yield_tons_per_hectare
            } else {
                tracing::warn!(yield_tons_per_hectare, "单产非法, 使用默认单产");
                DEFAULT_YIELD_TONS_PER_HECTARE
            };
        Self {
            yield_tons_per_hectare,
        }
    }

    pub fn yield_tons_per_hectare(&self) -> f64 {
        self.yield_tons_per_hectare
    }

    /// 计算目标日期的净可承诺库存
    ///
    /// 供给: 已收获批次 + 预计收获日 <= 目标日的养殖中批次
    /// 需求: 交货日 <= 目标日且未取消的订单
    /// 空集合返回 0 供给 / 0 需求
    #[instrument(skip(self, batches, orders), fields(batches = batches.len(), orders = orders.len()))]
    pub fn compute_net_stock(
        &self,
        target_date: NaiveDate,
        batches: &[Batch],
        orders: &[Order],
    ) -> StockSnapshot {
        let supplied_area: f64 = batches
            .iter()
            .filter(|b| b.supplies_by(target_date))
            .map(|b| b.area_hectares)
            .sum();

        let committed_tons: f64 = orders
            .iter()
            .filter(|o| o.commits_by(target_date))
            .map(|o| o.quantity_tons)
            .sum();

        let snapshot = StockSnapshot::new(supplied_area * self.yield_tons_per_hectare, committed_tons);

        tracing::debug!(
            supplied_tons = snapshot.supplied_tons,
            committed_tons = snapshot.committed_tons,
            net_available_tons = snapshot.net_available_tons,
            "ATP 库存快照"
        );

        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{BatchStatus, OrderStatus};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn batch(id: i64, area: f64, harvest: Option<NaiveDate>, status: BatchStatus) -> Batch {
        Batch {
            batch_id: id,
            algae_type: "Gracilaria".to_string(),
            area_hectares: area,
            sowing_date: date(2025, 1, 1),
            estimated_harvest_date: harvest,
            status,
        }
    }

    fn order(id: i64, qty: f64, due: NaiveDate, status: OrderStatus) -> Order {
        Order {
            order_id: id,
            client: "Salmonera Sur".to_string(),
            product: "Pellet Premium".to_string(),
            quantity_tons: qty,
            delivery_date: due,
            status,
        }
    }

    #[test]
    fn test_empty_collaborators_yield_zero() {
        let snapshot = StockAvailabilityCalculator::default().compute_net_stock(date(2025, 6, 1), &[], &[]);
        assert_eq!(snapshot, StockSnapshot::new(0.0, 0.0));
    }

    #[test]
    fn test_supply_and_demand_netting() {
        let target = date(2025, 6, 1);
        let batches = vec![
            batch(1, 5.0, Some(date(2025, 1, 10)), BatchStatus::Harvested),
            batch(2, 3.0, None, BatchStatus::Harvested),
            batch(3, 10.0, Some(date(2025, 5, 15)), BatchStatus::Active),
            batch(4, 20.5, Some(date(2025, 6, 20)), BatchStatus::Active), // 目标日之后
            batch(5, 7.0, Some(date(2025, 5, 1)), BatchStatus::Lost),
        ];
        let orders = vec![
            order(1, 10.0, date(2025, 4, 20), OrderStatus::Pending),
            order(2, 5.0, date(2025, 5, 10), OrderStatus::Delivered),
            order(3, 40.0, date(2025, 5, 20), OrderStatus::Cancelled),
            order(4, 25.0, date(2025, 6, 30), OrderStatus::Pending), // 目标日之后
        ];

        let snapshot = StockAvailabilityCalculator::default().compute_net_stock(target, &batches, &orders);

        // (5 + 3 + 10) ha × 10 t/ha = 180 t; 10 + 5 = 15 t
        assert!((snapshot.supplied_tons - 180.0).abs() < 1e-9);
        assert!((snapshot.committed_tons - 15.0).abs() < 1e-9);
        assert!((snapshot.net_available_tons - 165.0).abs() < 1e-9);
    }

    #[test]
    fn test_net_clamped_at_zero() {
        let target = date(2025, 6, 1);
        let batches = vec![batch(1, 1.0, None, BatchStatus::Harvested)];
        let orders = vec![order(1, 50.0, target, OrderStatus::Pending)];

        let snapshot = StockAvailabilityCalculator::default().compute_net_stock(target, &batches, &orders);
        assert_eq!(snapshot.net_available_tons, 0.0);
        assert!((snapshot.committed_tons - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_configurable_yield() {
        let target = date(2025, 6, 1);
        let batches = vec![batch(1, 4.0, None, BatchStatus::Harvested)];

        let snapshot = StockAvailabilityCalculator::new(12.5).compute_net_stock(target, &batches, &[]);
        assert!((snapshot.supplied_tons - 50.0).abs() < 1e-9);

        assert_eq!(
            StockAvailabilityCalculator::new(0.0).yield_tons_per_hectare(),
            DEFAULT_YIELD_TONS_PER_HECTARE
        );
    }
}
