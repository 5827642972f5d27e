// ==========================================
// 藻类养殖 ATP 系统 - 季节生物因子
// ==========================================
// 对齐: configuracion_estacional 表
// 红线: 因子必须 > 0, 中性值 1.0
// ==========================================

use serde::{Deserialize, Serialize};

/// 兜底季节名称
pub const FALLBACK_SEASON_NAME: &str = "Standard/Fallback";

// ==========================================
// SeasonalFactors - 季节因子 (值对象)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalFactors {
    pub name: String,         // 季节名称
    pub biomass_factor: f64,  // 生物量 (单产) 系数
    pub drying_factor: f64,   // 干燥产能系数
    pub energy_factor: f64,   // 能耗系数
    pub growth_factor: f64,   // 生长速度系数
}

impl SeasonalFactors {
    /// 无季节匹配时的兜底因子
    ///
    /// 能耗系数 1.1: 未知季节按偏保守的能耗估算
    pub fn fallback() -> Self {
        Self {
            name: FALLBACK_SEASON_NAME.to_string(),
            biomass_factor: 1.0,
            drying_factor: 1.0,
            energy_factor: 1.1,
            growth_factor: 1.0,
        }
    }

    /// 全部因子是否为正的有限值
    pub fn is_valid(&self) -> bool {
        [
            self.biomass_factor,
            self.drying_factor,
            self.energy_factor,
            self.growth_factor,
        ]
        .iter()
        .all(|f| f.is_finite() && *f > 0.0)
    }
}

// ==========================================
// RawSeasonRow - 季节配置原始行
// ==========================================
// 来源: configuracion_estacional 表 / 导入文件
// 月份以逗号分隔字符串存储, 如 "5,6,7,8"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSeasonRow {
    pub id: Option<i64>,
    pub season_name: String,
    pub months: String,
    pub biomass_factor: f64,
    pub drying_factor: f64,
    pub energy_factor: f64,
    pub growth_factor: f64,
    pub description: Option<String>,
}

// ==========================================
// StoredSeasonRow - 存储层读取结果
// ==========================================
// 列值类型不符 (如因子存为文本) 时无法构成 RawSeasonRow, 以 Unreadable 携带原因
#[derive(Debug, Clone, PartialEq)]
pub enum StoredSeasonRow {
    Readable(RawSeasonRow),
    Unreadable { season_name: String, reason: String },
}

// ==========================================
// SeasonDefinition - 解析后的季节定义
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonDefinition {
    pub months: Vec<u32>,
    pub factors: SeasonalFactors,
}

impl SeasonDefinition {
    pub fn covers(&self, month: u32) -> bool {
        self.months.contains(&month)
    }
}

// ==========================================
// SeasonTableWarning - 被跳过的季节行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonTableWarning {
    pub row_index: usize,    // 原始表中的位置 (0 起)
    pub season_name: String, // 季节名称 (可能为空)
    pub reason: String,      // 跳过原因
}

// ==========================================
// SeasonTable - 有序季节表
// ==========================================
// 顺序有意义: 解析器取第一个覆盖该月份的条目
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeasonTable {
    pub entries: Vec<SeasonDefinition>,
    pub warnings: Vec<SeasonTableWarning>,
}

impl SeasonTable {
    pub fn new(entries: Vec<SeasonDefinition>) -> Self {
        Self {
            entries,
            warnings: Vec::new(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
