// ==========================================
// 藻类养殖 ATP 系统 - 记录映射器
// ==========================================
// 职责: 原始行 → 类型化记录 (批次 / 订单 / 季节 / 参数)
// 规则: 表头不区分大小写, 支持别名; 单行失败只拒绝该行
// ==========================================

use crate::domain::batch::NewBatch;
use crate::domain::order::NewOrder;
use crate::domain::season::RawSeasonRow;
use crate::domain::types::{BatchStatus, OrderStatus};
use crate::engine::harvest_estimator::HarvestEstimator;
use crate::engine::season_resolver::parse_season_row;
use crate::importer::file_parser::RawRecord;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// 列名别名表
// ==========================================
pub mod columns {
    pub const ALGAE_TYPE: &[&str] = &["tipo_alga", "especie", "alga"];
    pub const AREA: &[&str] = &["superficie", "superficie_ha", "hectareas"];
    pub const SOWING_DATE: &[&str] = &["fecha_inicio", "fecha_siembra"];
    pub const ESTIMATED_HARVEST: &[&str] = &["fecha_cosecha_estimada", "fecha_cosecha"];
    pub const STATUS: &[&str] = &["estado"];

    pub const CLIENT: &[&str] = &["cliente"];
    pub const PRODUCT: &[&str] = &["producto"];
    pub const QUANTITY: &[&str] = &["cantidad_ton", "cantidad", "toneladas"];
    pub const DELIVERY_DATE: &[&str] = &["fecha_entrega"];

    pub const SEASON_NAME: &[&str] = &["nombre_estacion", "estacion"];
    pub const MONTHS: &[&str] = &["meses_asociados", "meses"];
    pub const BIOMASS_FACTOR: &[&str] = &["factor_biomasa"];
    pub const DRYING_FACTOR: &[&str] = &["factor_secado"];
    pub const ENERGY_FACTOR: &[&str] = &["factor_energia"];
    pub const GROWTH_FACTOR: &[&str] = &["factor_crecimiento"];
    pub const DESCRIPTION: &[&str] = &["descripcion"];

    pub const PARAMETER_KEY: &[&str] = &["clave", "parametro"];
    pub const PARAMETER_VALUE: &[&str] = &["valor"];
}

/// 被拒绝的行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowRejection {
    pub row_number: usize,
    pub reason: String,
}

/// 单行映射结果
pub type MappedRow<T> = Result<T, RowRejection>;

pub struct RecordMapper;

impl RecordMapper {
    // ==========================================
    // 批次 (lotes)
    // ==========================================

    /// 映射批次行
    ///
    /// 缺少预计收获日期时按播种日期与藻种估算
    pub fn map_batch(record: &RawRecord) -> MappedRow<NewBatch> {
        let algae_type = required_text(record, columns::ALGAE_TYPE)?;
        let area = required_number(record, columns::AREA)?;
        if area < 0.0 {
            return Err(reject(record, format!("养殖面积不能为负: {}", area)));
        }
        let sowing_date = required_date(record, columns::SOWING_DATE)?;

        let estimated_harvest = match optional_text(record, columns::ESTIMATED_HARVEST) {
            Some(raw) => parse_date(&raw)
                .ok_or_else(|| reject(record, format!("预计收获日期格式错误: {}", raw)))?,
            None => HarvestEstimator::estimate(sowing_date, &algae_type),
        };

        let status = match optional_text(record, columns::STATUS) {
            Some(raw) => BatchStatus::parse(&raw.to_lowercase())
                .ok_or_else(|| reject(record, format!("未知批次状态: {}", raw)))?,
            None => BatchStatus::Active,
        };

        Ok(NewBatch::new(&algae_type, area, sowing_date)
            .with_estimated_harvest(estimated_harvest)
            .with_status(status))
    }

    // ==========================================
    // 订单 (pedidos)
    // ==========================================
    pub fn map_order(record: &RawRecord) -> MappedRow<NewOrder> {
        let client = required_text(record, columns::CLIENT)?;
        let quantity = required_number(record, columns::QUANTITY)?;
        if quantity <= 0.0 {
            return Err(reject(record, format!("订单数量必须大于 0: {}", quantity)));
        }
        let delivery_date = required_date(record, columns::DELIVERY_DATE)?;

        let mut order = NewOrder::new(&client, quantity, delivery_date);
        if let Some(product) = optional_text(record, columns::PRODUCT) {
            order = order.with_product(&product);
        }
        if let Some(raw) = optional_text(record, columns::STATUS) {
            let status = OrderStatus::parse(&raw.to_lowercase())
                .ok_or_else(|| reject(record, format!("未知订单状态: {}", raw)))?;
            order = order.with_status(status);
        }
        Ok(order)
    }

    // ==========================================
    // 季节 (configuracion_estacional)
    // ==========================================

    /// 映射季节行 (与入库时相同的校验)
    pub fn map_season(record: &RawRecord) -> MappedRow<RawSeasonRow> {
        let row = RawSeasonRow {
            id: None,
            season_name: required_text(record, columns::SEASON_NAME)?,
            months: required_text(record, columns::MONTHS)?,
            biomass_factor: required_number(record, columns::BIOMASS_FACTOR)?,
            drying_factor: required_number(record, columns::DRYING_FACTOR)?,
            energy_factor: required_number(record, columns::ENERGY_FACTOR)?,
            growth_factor: required_number(record, columns::GROWTH_FACTOR)?,
            description: optional_text(record, columns::DESCRIPTION),
        };
        parse_season_row(&row).map_err(|e| reject(record, e.to_string()))?;
        Ok(row)
    }

    // ==========================================
    // 参数 (parametros_sistema)
    // ==========================================
    pub fn map_parameter(record: &RawRecord) -> MappedRow<(String, f64)> {
        let key = required_text(record, columns::PARAMETER_KEY)?;
        let value = required_number(record, columns::PARAMETER_VALUE)?;
        if value <= 0.0 {
            return Err(reject(record, format!("参数 {} 必须大于 0: {}", key, value)));
        }
        Ok((key, value))
    }
}

// ==========================================
// 字段读取辅助
// ==========================================

fn reject(record: &RawRecord, reason: impl Into<String>) -> RowRejection {
    RowRejection {
        row_number: record.row_number,
        reason: reason.into(),
    }
}

/// 按别名顺序取第一个非空值 (表头不区分大小写)
fn optional_text(record: &RawRecord, aliases: &[&str]) -> Option<String> {
    aliases.iter().find_map(|alias| {
        record
            .fields
            .iter()
            .find(|(header, _)| header.eq_ignore_ascii_case(alias))
            .map(|(_, value)| value.trim())
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    })
}

fn required_text(record: &RawRecord, aliases: &[&str]) -> MappedRow<String> {
    optional_text(record, aliases)
        .ok_or_else(|| reject(record, format!("缺少字段: {}", aliases[0])))
}

/// 数值解析; 接受逗号小数点 ("2,5")
fn required_number(record: &RawRecord, aliases: &[&str]) -> MappedRow<f64> {
    let raw = required_text(record, aliases)?;
    raw.replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| reject(record, format!("字段 {} 无法解析为数值: {}", aliases[0], raw)))
}

fn required_date(record: &RawRecord, aliases: &[&str]) -> MappedRow<NaiveDate> {
    let raw = required_text(record, aliases)?;
    parse_date(&raw)
        .ok_or_else(|| reject(record, format!("字段 {} 日期格式错误: {}", aliases[0], raw)))
}

/// 日期解析: YYYY-MM-DD / YYYY/MM/DD / DD/MM/YYYY / DD-MM-YYYY, 或带时间部分
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(d);
        }
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.date());
        }
    }
    None
}
