// ==========================================
// 藻类养殖 ATP 系统 - 经济参数
// ==========================================
// 对齐: parametros_sistema 表 (clave → valor)
// 红线: 所有参数必须 > 0, 禁止以 0 代替缺失值
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// EconomicParameters - 经济与产能参数 (强类型)
// ==========================================
// 货币单位: CLP
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomicParameters {
    // ===== 单价 =====
    pub water_price_per_m3: f64,     // 水价 ($/m³)
    pub energy_price_per_kwh: f64,   // 电价 ($/kWh)
    pub diesel_price_per_liter: f64, // 柴油价 ($/L)

    // ===== 吨耗 =====
    pub water_m3_per_ton: f64,       // 吨耗水 (m³/t)
    pub energy_kwh_per_ton: f64,     // 吨耗电 (kWh/t)
    pub diesel_liters_per_ton: f64,  // 吨耗柴油 (L/t)
    pub labor_hours_per_ton: f64,    // 吨工时 (h/t)
    pub labor_cost_per_hour: f64,    // 操作工时薪 ($/h)
    pub supplies_cost_per_ton: f64,  // 杂项耗材 ($/t)

    // ===== 产能与周期 =====
    pub plant_daily_capacity_tons: f64,   // 工厂日产能 (t/天)
    pub base_cultivation_cycle_days: f64, // 基础养殖周期 (天)
    pub harvest_daily_capacity_tons: f64, // 日收获能力 (t/天)
}

impl Default for EconomicParameters {
    /// 内置默认参数集
    ///
    /// 用于参数表为空的演示/测试环境
    fn default() -> Self {
        Self {
            water_price_per_m3: 1_200.0,
            energy_price_per_kwh: 150.0,
            diesel_price_per_liter: 1_100.0,
            water_m3_per_ton: 15.0,
            energy_kwh_per_ton: 250.0,
            diesel_liters_per_ton: 8.0,
            labor_hours_per_ton: 6.0,
            labor_cost_per_hour: 5_500.0,
            supplies_cost_per_ton: 20_000.0,
            plant_daily_capacity_tons: 2.5,
            base_cultivation_cycle_days: 45.0,
            harvest_daily_capacity_tons: 5.0,
        }
    }
}

impl EconomicParameters {
    /// 返回第一个非法 (非有限或 <= 0) 字段名
    pub fn first_invalid_field(&self) -> Option<&'static str> {
        self.named_values()
            .into_iter()
            .find(|(_, v)| !v.is_finite() || *v <= 0.0)
            .map(|(name, _)| name)
    }

    fn named_values(&self) -> [(&'static str, f64); 12] {
        [
            ("water_price_per_m3", self.water_price_per_m3),
            ("energy_price_per_kwh", self.energy_price_per_kwh),
            ("diesel_price_per_liter", self.diesel_price_per_liter),
            ("water_m3_per_ton", self.water_m3_per_ton),
            ("energy_kwh_per_ton", self.energy_kwh_per_ton),
            ("diesel_liters_per_ton", self.diesel_liters_per_ton),
            ("labor_hours_per_ton", self.labor_hours_per_ton),
            ("labor_cost_per_hour", self.labor_cost_per_hour),
            ("supplies_cost_per_ton", self.supplies_cost_per_ton),
            ("plant_daily_capacity_tons", self.plant_daily_capacity_tons),
            ("base_cultivation_cycle_days", self.base_cultivation_cycle_days),
            ("harvest_daily_capacity_tons", self.harvest_daily_capacity_tons),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(EconomicParameters::default().first_invalid_field(), None);
    }

    #[test]
    fn test_first_invalid_field() {
        let mut p = EconomicParameters::default();
        p.labor_cost_per_hour = 0.0;
        assert_eq!(p.first_invalid_field(), Some("labor_cost_per_hour"));

        p.labor_cost_per_hour = 10.0;
        p.water_price_per_m3 = f64::INFINITY;
        assert_eq!(p.first_invalid_field(), Some("water_price_per_m3"));
    }
}
