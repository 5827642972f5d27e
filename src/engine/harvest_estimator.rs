// ==========================================
// 藻类养殖 ATP 系统 - 收获日期估算
// ==========================================
// 职责: 播种日期 + 藻种 → 预计收获日期
// 规则: 基础天数按藻种, 播种月份季节系数修正, 天数截断取整
// ==========================================

use chrono::{Datelike, Duration, NaiveDate};

/// 江蓠 (Gracilaria) 基础生长天数
pub const GRACILARIA_BASE_DAYS: f64 = 45.0;

/// 其他藻种基础生长天数
pub const OTHER_SPECIES_BASE_DAYS: f64 = 60.0;

const WINTER_MONTHS: [u32; 4] = [5, 6, 7, 8];
const SUMMER_MONTHS: [u32; 3] = [12, 1, 2];

// ==========================================
// HarvestEstimator - 收获日期估算器
// ==========================================
pub struct HarvestEstimator;

impl HarvestEstimator {
    /// 播种月份对应的生长系数
    ///
    /// 冬季生长慢 (×1.3), 夏季生长快 (×0.9)
    pub fn growth_multiplier(month: u32) -> f64 {
        if WINTER_MONTHS.contains(&month) {
            1.3
        } else if SUMMER_MONTHS.contains(&month) {
            0.9
        } else {
            1.0
        }
    }

    /// 预计生长天数 (截断取整)
    pub fn growth_days(sowing_date: NaiveDate, algae_type: &str) -> i64 {
        let base_days = if algae_type.trim() == "Gracilaria" {
            GRACILARIA_BASE_DAYS
        } else {
            OTHER_SPECIES_BASE_DAYS
        };
        (base_days * Self::growth_multiplier(sowing_date.month())).trunc() as i64
    }

    /// 估算收获日期
    pub fn estimate(sowing_date: NaiveDate, algae_type: &str) -> NaiveDate {
        sowing_date + Duration::days(Self::growth_days(sowing_date, algae_type))
    }
}
