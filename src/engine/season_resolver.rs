// ==========================================
// 藻类养殖 ATP 系统 - 季节因子解析器
// ==========================================
// 职责: 月份 → 生物因子 (生物量/干燥/能耗/生长)
// 输入: 目标月份 + 有序季节表
// 输出: SeasonalFactors (无匹配时返回兜底因子)
// 红线: 单行配置错误不得阻断整个模拟
// ==========================================

use crate::domain::season::{
    RawSeasonRow, SeasonDefinition, SeasonTable, SeasonTableWarning, SeasonalFactors,
    StoredSeasonRow,
};
use crate::engine::error::{SimulationError, SimulationOutcome};
use tracing::{debug, warn};

// ==========================================
// 季节表解析 (边界层)
// ==========================================

/// 解析单行季节配置
///
/// 规则:
/// - 月份串按逗号拆分, 每一项必须是 1..=12 的整数 (允许首尾空白)
/// - 空串/多余逗号视为格式错误
/// - 四个因子必须为正的有限值
pub fn parse_season_row(row: &RawSeasonRow) -> SimulationOutcome<SeasonDefinition> {
    let season = row.season_name.trim().to_string();
    let malformed = |reason: String| SimulationError::MalformedSeasonEntry {
        season: season.clone(),
        reason,
    };

    if season.is_empty() {
        return Err(malformed("季节名称为空".to_string()));
    }

    let mut months = Vec::new();
    for token in row.months.split(',') {
        let token = token.trim();
        let month: u32 = token
            .parse()
            .map_err(|_| malformed(format!("月份无法解析: '{}'", token)))?;
        if !(1..=12).contains(&month) {
            return Err(malformed(format!("月份超出范围: {}", month)));
        }
        months.push(month);
    }

    let factors = SeasonalFactors {
        name: season.clone(),
        biomass_factor: row.biomass_factor,
        drying_factor: row.drying_factor,
        energy_factor: row.energy_factor,
        growth_factor: row.growth_factor,
    };
    if !factors.is_valid() {
        return Err(malformed(format!(
            "因子必须为正: biomasa={}, secado={}, energia={}, crecimiento={}",
            row.biomass_factor, row.drying_factor, row.energy_factor, row.growth_factor
        )));
    }

    Ok(SeasonDefinition { months, factors })
}

/// 由原始行构建季节表
///
/// 格式错误的行被跳过, 并记录到 `warnings`
pub fn build_season_table(rows: &[RawSeasonRow]) -> SeasonTable {
    let mut table = SeasonTable::empty();

    for (row_index, row) in rows.iter().enumerate() {
        push_row(&mut table, row_index, row);
    }

    table
}

/// 由存储读取结果构建季节表
///
/// 列值无法读取的行与格式错误的行同样跳过并告警, 保持原始位置
pub fn build_season_table_from_stored(rows: &[StoredSeasonRow]) -> SeasonTable {
    let mut table = SeasonTable::empty();

    for (row_index, stored) in rows.iter().enumerate() {
        match stored {
            StoredSeasonRow::Readable(row) => push_row(&mut table, row_index, row),
            StoredSeasonRow::Unreadable {
                season_name,
                reason,
            } => skip_row(&mut table, row_index, season_name, reason.clone()),
        }
    }

    table
}

fn push_row(table: &mut SeasonTable, row_index: usize, row: &RawSeasonRow) {
    match parse_season_row(row) {
        Ok(definition) => table.entries.push(definition),
        Err(e) => skip_row(table, row_index, &row.season_name, e.to_string()),
    }
}

fn skip_row(table: &mut SeasonTable, row_index: usize, season_name: &str, reason: String) {
    warn!(row_index, season = %season_name, error = %reason, "跳过格式错误的季节配置行");
    table.warnings.push(SeasonTableWarning {
        row_index,
        season_name: season_name.to_string(),
        reason,
    });
}

// ==========================================
// SeasonResolver - 季节因子解析器
// ==========================================
pub struct SeasonResolver;

impl SeasonResolver {
    /// 解析目标月份的季节因子
    ///
    /// 顺序扫描, 返回第一个覆盖该月份的条目;
    /// 无匹配 (含空表) 时返回兜底因子。
    pub fn resolve(month: u32, table: &SeasonTable) -> SeasonalFactors {
        match table.entries.iter().find(|entry| entry.covers(month)) {
            Some(entry) => {
                debug!(month, season = %entry.factors.name, "季节匹配");
                entry.factors.clone()
            }
            None => {
                debug!(month, entries = table.entries.len(), "无季节匹配, 使用兜底因子");
                SeasonalFactors::fallback()
            }
        }
    }
}
