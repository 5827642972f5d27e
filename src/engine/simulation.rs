// ==========================================
// 藻类养殖 ATP 系统 - 订单可行性模拟引擎
// ==========================================
// 职责: 季节因子 + 库存 + 经济参数 → 缺口 / 交期 / 成本
// 输入: SimulationRequest (调用方负责读取一致的快照)
// 输出: SimulationResult
// 红线: 纯函数, 无 I/O, 不读时钟
// 红线: 始终报告可达成, 缺口只影响交期与成本
// ==========================================

use crate::domain::simulation::{
    CostBreakdown, CostEstimate, LeadTimeBreakdown, ScenarioInfo, SimulationRequest,
    SimulationResult, StockOutcome,
};
use crate::engine::error::{SimulationError, SimulationOutcome};
use crate::engine::season_resolver::SeasonResolver;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use tracing::instrument;

/// 物流缓冲 (天)
pub const LOGISTICS_BUFFER_DAYS: f64 = 2.0;

/// 存在缺口时的加急附加费率
pub const CULTIVATION_SURCHARGE_RATE: f64 = 0.15;

// ==========================================
// 输入解析
// ==========================================

/// 解析目标日期
///
/// 接受 `YYYY-MM-DD`, 以及带时间部分的 `YYYY-MM-DDTHH:MM:SS` (时间被忽略)
///
/// # 错误
/// - 缺失、空串或无法解析 → `InvalidInput`
pub fn parse_target_date(raw: Option<&str>) -> SimulationOutcome<NaiveDate> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| SimulationError::InvalidInput("目标日期缺失".to_string()))?;

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S").map(|dt| dt.date()))
        .map_err(|_| SimulationError::InvalidInput(format!("目标日期无法解析: '{}'", raw)))
}

/// 校验需求数量 (必须为正的有限值)
pub fn validate_quantity(requested_quantity_tons: f64) -> SimulationOutcome<()> {
    if !requested_quantity_tons.is_finite() || requested_quantity_tons <= 0.0 {
        return Err(SimulationError::InvalidInput(format!(
            "需求数量必须大于 0: {}",
            requested_quantity_tons
        )));
    }
    Ok(())
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

// ==========================================
// SimulationEngine - 可行性模拟引擎
// ==========================================
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulationEngine;

impl SimulationEngine {
    pub fn new() -> Self {
        Self
    }

    /// 执行一次订单可行性模拟
    ///
    /// # 参数
    /// - `request`: 需求数量、目标日期、可用库存、经济参数、季节表
    ///
    /// # 返回
    /// - `Ok(SimulationResult)`: 吨保留 2 位, 天数保留 1 位, 金额取整
    /// - `Err(InvalidInput)`: 数量非正, 或可用库存为负
    /// - `Err(ConfigurationIncomplete)`: 经济参数存在非正值
    #[instrument(skip(self, request), fields(
        quantity = request.requested_quantity_tons,
        target_date = %request.target_date
    ))]
    pub fn simulate(&self, request: &SimulationRequest) -> SimulationOutcome<SimulationResult> {
        validate_quantity(request.requested_quantity_tons)?;

        let available = request.available_stock_tons;
        if !available.is_finite() || available < 0.0 {
            return Err(SimulationError::InvalidInput(format!(
                "可用库存不能为负: {}",
                available
            )));
        }

        let params = &request.economic_parameters;
        if let Some(field) = params.first_invalid_field() {
            return Err(SimulationError::ConfigurationIncomplete {
                key: field.to_string(),
                reason: "参数必须为正的有限值".to_string(),
            });
        }

        let quantity = request.requested_quantity_tons;

        // 1. 季节因子
        let factors = SeasonResolver::resolve(request.target_date.month(), &request.season_table);

        // 2. 库存投影与缺口
        let projected_stock = round_to(available * factors.biomass_factor, 2);
        let deficit = round_to((quantity - projected_stock).max(0.0), 2);
        let requires_cultivation = deficit > 0.0;

        // 3. 交期
        let manufacturing_days =
            quantity / (params.plant_daily_capacity_tons * factors.drying_factor);
        let cultivation_days = if requires_cultivation {
            params.base_cultivation_cycle_days / factors.growth_factor
                + deficit / params.harvest_daily_capacity_tons
        } else {
            0.0
        };
        let total_days =
            round_to(cultivation_days + manufacturing_days + LOGISTICS_BUFFER_DAYS, 1);

        // 4. 成本
        let water = quantity * params.water_m3_per_ton * params.water_price_per_m3;
        let energy = quantity
            * params.energy_kwh_per_ton
            * params.energy_price_per_kwh
            * factors.energy_factor;
        let diesel = quantity * params.diesel_liters_per_ton * params.diesel_price_per_liter;
        let labor = quantity * params.labor_hours_per_ton * params.labor_cost_per_hour;
        let consumables = quantity * params.supplies_cost_per_ton;

        let subtotal = water + energy + diesel + labor + consumables;
        let total = if requires_cultivation {
            subtotal * (1.0 + CULTIVATION_SURCHARGE_RATE)
        } else {
            subtotal
        };

        tracing::debug!(
            season = %factors.name,
            projected_stock,
            deficit,
            total_days,
            total_cost = total,
            "模拟完成"
        );

        Ok(SimulationResult {
            scenario: ScenarioInfo {
                target_date: request.target_date,
                requested_quantity_tons: round_to(quantity, 2),
                detected_season: factors.name.clone(),
                applied_factors: factors,
            },
            stock: StockOutcome {
                available_stock_tons: round_to(available, 2),
                projected_stock_tons: projected_stock,
                deficit_tons: deficit,
                requires_cultivation,
                is_feasible: true,
            },
            lead_time: LeadTimeBreakdown {
                total_days,
                cultivation_days: round_to(cultivation_days, 1),
                manufacturing_days: round_to(manufacturing_days, 1),
                logistics_days: LOGISTICS_BUFFER_DAYS,
            },
            cost: CostEstimate {
                total: total.round(),
                subtotal: subtotal.round(),
                surcharge: (total - subtotal).round(),
                breakdown: CostBreakdown {
                    water: water.round(),
                    energy: energy.round(),
                    diesel: diesel.round(),
                    labor: labor.round(),
                    consumables: consumables.round(),
                },
            },
            warnings: request.season_table.warnings.clone(),
        })
    }
}
