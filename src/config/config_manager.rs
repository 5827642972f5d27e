// ==========================================
// 藻类养殖 ATP 系统 - 配置管理器
// ==========================================
// 职责: 参数/季节配置加载、校验、写入
// 存储: parametros_sistema (clave → valor), configuracion_estacional
// 红线: 松散的 key-value 行在此边界解析为强类型, 引擎只接收强类型
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::config::simulation_config_trait::SimulationConfigReader;
use crate::db::open_sqlite_connection;
use crate::domain::economics::EconomicParameters;
use crate::domain::season::{RawSeasonRow, SeasonTable, StoredSeasonRow};
use crate::engine::error::{SimulationError, SimulationOutcome};
use crate::engine::season_resolver::{build_season_table_from_stored, parse_season_row};
use crate::engine::stock_availability::DEFAULT_YIELD_TONS_PER_HECTARE;
use crate::repository::error::RepositoryError;
use async_trait::async_trait;
use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 单价
    pub const WATER_PRICE_PER_M3: &str = "precio_agua_m3";
    pub const ENERGY_PRICE_PER_KWH: &str = "precio_kwh";
    pub const DIESEL_PRICE_PER_LITER: &str = "precio_diesel_L";

    // 吨耗
    pub const WATER_M3_PER_TON: &str = "consumo_agua_ton";
    pub const ENERGY_KWH_PER_TON: &str = "consumo_energia_ton";
    pub const DIESEL_LITERS_PER_TON: &str = "consumo_diesel_ton";
    pub const LABOR_HOURS_PER_TON: &str = "horas_hombre_ton";
    pub const LABOR_COST_PER_HOUR: &str = "costo_hh_operario";
    pub const SUPPLIES_COST_PER_TON: &str = "insumos_varios_ton";

    // 产能与周期
    pub const PLANT_DAILY_CAPACITY: &str = "capacidad_planta_dia";
    pub const BASE_CULTIVATION_CYCLE_DAYS: &str = "dias_ciclo_base";
    pub const HARVEST_DAILY_CAPACITY: &str = "capacidad_cosecha_dia";
    pub const YIELD_TONS_PER_HECTARE: &str = "rendimiento_ton_ha";
}

// ==========================================
// 默认参数集
// ==========================================

/// 参数默认定义
#[derive(Debug, Clone, Copy)]
pub struct ParameterDefault {
    pub key: &'static str,
    pub value: f64,
    pub unit: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    /// 参数表非空时是否必须显式配置 (价格/吨耗类)
    pub required: bool,
}

const fn param(
    key: &'static str,
    value: f64,
    unit: &'static str,
    description: &'static str,
    category: &'static str,
    required: bool,
) -> ParameterDefault {
    ParameterDefault {
        key,
        value,
        unit,
        description,
        category,
        required,
    }
}

pub static DEFAULT_PARAMETERS: [ParameterDefault; 13] = [
    param(config_keys::WATER_PRICE_PER_M3, 1_200.0, "CLP/m3", "Precio del agua", "costos", true),
    param(config_keys::ENERGY_PRICE_PER_KWH, 150.0, "CLP/kWh", "Precio de la energía", "costos", true),
    param(config_keys::DIESEL_PRICE_PER_LITER, 1_100.0, "CLP/L", "Precio del diésel", "costos", true),
    param(config_keys::WATER_M3_PER_TON, 15.0, "m3/ton", "Consumo de agua por tonelada", "consumos", true),
    param(config_keys::ENERGY_KWH_PER_TON, 250.0, "kWh/ton", "Consumo de energía por tonelada", "consumos", true),
    param(config_keys::DIESEL_LITERS_PER_TON, 8.0, "L/ton", "Consumo de diésel por tonelada", "consumos", true),
    param(config_keys::LABOR_HOURS_PER_TON, 6.0, "HH/ton", "Horas hombre por tonelada", "consumos", true),
    param(config_keys::LABOR_COST_PER_HOUR, 5_500.0, "CLP/HH", "Costo hora hombre operario", "costos", true),
    param(config_keys::SUPPLIES_COST_PER_TON, 20_000.0, "CLP/ton", "Insumos varios por tonelada", "costos", true),
    param(config_keys::PLANT_DAILY_CAPACITY, 2.5, "ton/dia", "Capacidad diaria de planta", "operacion", false),
    param(config_keys::BASE_CULTIVATION_CYCLE_DAYS, 45.0, "dias", "Ciclo base de cultivo", "operacion", false),
    param(config_keys::HARVEST_DAILY_CAPACITY, 5.0, "ton/dia", "Capacidad diaria de cosecha", "operacion", false),
    param(
        config_keys::YIELD_TONS_PER_HECTARE,
        DEFAULT_YIELD_TONS_PER_HECTARE,
        "ton/ha",
        "Rendimiento por hectárea",
        "operacion",
        false,
    ),
];

/// 默认季节表 (南半球): (名称, 月份, 生物量, 干燥, 能耗, 生长, 描述)
pub const DEFAULT_SEASONS: [(&str, &str, f64, f64, f64, f64, &str); 4] = [
    ("Verano", "12,1,2", 1.2, 1.15, 0.9, 1.25, "Alta radiación, secado rápido"),
    ("Otoño", "3,4,5", 0.9, 0.95, 1.1, 0.9, "Transición, crecimiento moderado"),
    ("Invierno", "6,7,8", 0.8, 0.85, 1.3, 0.75, "Baja temperatura, secado lento"),
    ("Primavera", "9,10,11", 1.0, 1.0, 1.0, 1.0, "Condiciones de referencia"),
];

pub fn parameter_default(key: &str) -> Option<&'static ParameterDefault> {
    DEFAULT_PARAMETERS.iter().find(|p| p.key == key)
}

// ==========================================
// 参数解析 (边界层, 纯函数)
// ==========================================

fn parse_positive(key: &str, raw: &str) -> SimulationOutcome<f64> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| SimulationError::ConfigurationIncomplete {
            key: key.to_string(),
            reason: format!("无法解析为数值: '{}'", raw),
        })?;

    if !value.is_finite() || value <= 0.0 {
        return Err(SimulationError::ConfigurationIncomplete {
            key: key.to_string(),
            reason: format!("参数必须大于 0: {}", value),
        });
    }
    Ok(value)
}

/// 读取单个参数, 缺失时按默认规则处理
fn read_parameter(values: &HashMap<String, String>, key: &str) -> SimulationOutcome<f64> {
    if let Some(raw) = values.get(key) {
        return parse_positive(key, raw);
    }

    match parameter_default(key) {
        Some(default) if !default.required => {
            tracing::debug!(key, default = default.value, "参数缺失, 使用默认值");
            Ok(default.value)
        }
        _ => Err(SimulationError::ConfigurationIncomplete {
            key: key.to_string(),
            reason: "缺少必需参数".to_string(),
        }),
    }
}

/// 将 clave → valor 映射解析为强类型经济参数
///
/// # 规则
/// - 映射为空: 返回整套内置默认值 (演示/测试环境)
/// - 价格/吨耗类缺失: `ConfigurationIncomplete`
/// - 产能/周期类缺失: 单项默认值
/// - 任一值无法解析或 <= 0: `ConfigurationIncomplete`, 禁止以 0 代替
pub fn parse_economic_parameters(
    values: &HashMap<String, String>,
) -> SimulationOutcome<EconomicParameters> {
    use config_keys::*;

    if values.is_empty() {
        tracing::warn!("参数表为空, 使用内置默认经济参数");
        return Ok(EconomicParameters::default());
    }

    Ok(EconomicParameters {
        water_price_per_m3: read_parameter(values, WATER_PRICE_PER_M3)?,
        energy_price_per_kwh: read_parameter(values, ENERGY_PRICE_PER_KWH)?,
        diesel_price_per_liter: read_parameter(values, DIESEL_PRICE_PER_LITER)?,
        water_m3_per_ton: read_parameter(values, WATER_M3_PER_TON)?,
        energy_kwh_per_ton: read_parameter(values, ENERGY_KWH_PER_TON)?,
        diesel_liters_per_ton: read_parameter(values, DIESEL_LITERS_PER_TON)?,
        labor_hours_per_ton: read_parameter(values, LABOR_HOURS_PER_TON)?,
        labor_cost_per_hour: read_parameter(values, LABOR_COST_PER_HOUR)?,
        supplies_cost_per_ton: read_parameter(values, SUPPLIES_COST_PER_TON)?,
        plant_daily_capacity_tons: read_parameter(values, PLANT_DAILY_CAPACITY)?,
        base_cultivation_cycle_days: read_parameter(values, BASE_CULTIVATION_CYCLE_DAYS)?,
        harvest_daily_capacity_tons: read_parameter(values, HARVEST_DAILY_CAPACITY)?,
    })
}

// ==========================================
// 行结构
// ==========================================

/// parametros_sistema 行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterRow {
    pub key: String,
    pub value: String,
    pub unit: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
}

/// 默认值初始化结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub parameters_inserted: usize,
    pub seasons_inserted: usize,
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明: 为保证连接行为一致, 会对传入连接再次应用统一 PRAGMA (幂等)。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let conn_guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    fn get_conn(&self) -> ConfigResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| ConfigError::Storage(RepositoryError::LockError(e.to_string())))
    }

    // ==========================================
    // 读取
    // ==========================================

    /// 读取单个参数原始值
    pub fn get_parameter_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT valor FROM parametros_sistema WHERE clave = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 读取全部参数为 clave → valor 映射
    pub fn load_parameter_map(&self) -> ConfigResult<HashMap<String, String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT clave, valor FROM parametros_sistema")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut map = HashMap::new();
        for row in rows {
            let (key, value) = row?;
            map.insert(key, value);
        }
        Ok(map)
    }

    /// 参数列表 (按类别、键排序)
    pub fn list_parameters(&self) -> ConfigResult<Vec<ParameterRow>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT clave, valor, unidad, descripcion, categoria
             FROM parametros_sistema ORDER BY categoria, clave",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(ParameterRow {
                    key: row.get(0)?,
                    value: row.get(1)?,
                    unit: row.get(2)?,
                    description: row.get(3)?,
                    category: row.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// 季节配置原始行 (按 id 排序, 顺序即匹配优先级)
    ///
    /// 列值无法读取的行被跳过并告警
    pub fn list_season_rows(&self) -> ConfigResult<Vec<RawSeasonRow>> {
        let rows = self
            .load_stored_season_rows()?
            .into_iter()
            .filter_map(|stored| match stored {
                StoredSeasonRow::Readable(row) => Some(row),
                StoredSeasonRow::Unreadable {
                    season_name,
                    reason,
                } => {
                    tracing::warn!(season = %season_name, reason = %reason, "季节配置行无法读取");
                    None
                }
            })
            .collect();
        Ok(rows)
    }

    /// 逐行读取季节配置, 列值按动态类型取出后再转换
    fn load_stored_season_rows(&self) -> ConfigResult<Vec<StoredSeasonRow>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, nombre_estacion, meses_asociados, factor_biomasa, factor_secado,
                    factor_energia, factor_crecimiento, descripcion
             FROM configuracion_estacional ORDER BY id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                let values = (0..8)
                    .map(|idx| row.get::<_, Value>(idx))
                    .collect::<rusqlite::Result<Vec<Value>>>()?;
                Ok(stored_season_row(&values))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// 获取所有配置的快照 (JSON)
    ///
    /// # 用途
    /// - 写入审计日志, 记录模拟时生效的配置
    pub fn get_config_snapshot(&self) -> ConfigResult<serde_json::Value> {
        let parameters: BTreeMap<String, String> = self.load_parameter_map()?.into_iter().collect();
        let seasons = self.list_season_rows()?;

        Ok(json!({
            "parametros": parameters,
            "estaciones": seasons,
        }))
    }

    // ==========================================
    // 写入
    // ==========================================

    /// 更新单个参数 (不存在则插入)
    ///
    /// # 错误
    /// - 值非正或非有限 → `InvalidInput`
    pub fn update_parameter(&self, key: &str, value: f64) -> ConfigResult<()> {
        validate_parameter_update(key, value)?;
        let conn = self.get_conn()?;
        upsert_parameter(&conn, key, value)?;

        tracing::info!(key, value, "参数已更新");
        Ok(())
    }

    /// 批量更新参数 (单事务, 任一非法则全部不写)
    pub fn batch_update_parameters(&self, updates: &[(String, f64)]) -> ConfigResult<usize> {
        for (key, value) in updates {
            validate_parameter_update(key, *value)?;
        }

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        for (key, value) in updates {
            upsert_parameter(&tx, key, *value)?;
        }
        tx.commit()?;

        tracing::info!(count = updates.len(), "参数批量更新完成");
        Ok(updates.len())
    }

    /// 新增或更新季节 (按名称匹配)
    ///
    /// 写入前校验, 格式错误的行不入库
    ///
    /// # 返回
    /// - `Ok(id)`: 季节行 id
    pub fn upsert_season(&self, row: &RawSeasonRow) -> ConfigResult<i64> {
        let conn = self.get_conn()?;
        let id = upsert_season_row(&conn, row)?;
        tracing::info!(season = %row.season_name, id, "季节配置已保存");
        Ok(id)
    }

    /// 批量新增或更新季节 (单事务)
    pub fn batch_upsert_seasons(&self, rows: &[RawSeasonRow]) -> ConfigResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        for row in rows {
            upsert_season_row(&tx, row)?;
        }
        tx.commit()?;
        Ok(rows.len())
    }

    /// 安装默认配置
    ///
    /// - 参数: 逐项补齐缺失键, 已存在的值不覆盖
    /// - 季节: 仅当季节表为空时写入默认季节表
    pub fn seed_defaults(&self) -> ConfigResult<SeedReport> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let mut report = SeedReport::default();

        for p in DEFAULT_PARAMETERS.iter() {
            report.parameters_inserted += tx.execute(
                "INSERT OR IGNORE INTO parametros_sistema (clave, valor, unidad, descripcion, categoria)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![p.key, p.value.to_string(), p.unit, p.description, p.category],
            )?;
        }

        let season_count: i64 =
            tx.query_row("SELECT COUNT(*) FROM configuracion_estacional", [], |row| row.get(0))?;
        if season_count == 0 {
            for (name, months, biomass, drying, energy, growth, description) in DEFAULT_SEASONS {
                tx.execute(
                    "INSERT INTO configuracion_estacional (
                        nombre_estacion, meses_asociados, factor_biomasa, factor_secado,
                        factor_energia, factor_crecimiento, descripcion
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![name, months, biomass, drying, energy, growth, description],
                )?;
                report.seasons_inserted += 1;
            }
        }

        tx.commit()?;

        tracing::info!(
            parameters = report.parameters_inserted,
            seasons = report.seasons_inserted,
            "默认配置初始化完成"
        );
        Ok(report)
    }
}

// ==========================================
// 季节行列值转换
// ==========================================

fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::Text(s) => Some(s.clone()),
        Value::Integer(i) => Some(i.to_string()),
        Value::Real(f) => Some(f.to_string()),
        Value::Null | Value::Blob(_) => None,
    }
}

fn factor_value(column: &str, value: &Value) -> Result<f64, String> {
    match value {
        Value::Real(f) => Ok(*f),
        Value::Integer(i) => Ok(*i as f64),
        Value::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("{} 无法转换为数值: '{}'", column, s)),
        Value::Null => Err(format!("{} 为空", column)),
        Value::Blob(_) => Err(format!("{} 类型不支持", column)),
    }
}

fn column(values: &[Value], idx: usize) -> &Value {
    const NULL: &Value = &Value::Null;
    values.get(idx).unwrap_or(NULL)
}

/// 列顺序: id, nombre, meses, biomasa, secado, energia, crecimiento, descripcion
fn stored_season_row(values: &[Value]) -> StoredSeasonRow {
    let season_name = text_value(column(values, 1)).unwrap_or_default();

    match read_season_row(values, &season_name) {
        Ok(row) => StoredSeasonRow::Readable(row),
        Err(reason) => StoredSeasonRow::Unreadable {
            season_name,
            reason,
        },
    }
}

fn read_season_row(values: &[Value], season_name: &str) -> Result<RawSeasonRow, String> {
    let months =
        text_value(column(values, 2)).ok_or_else(|| "meses_asociados 为空".to_string())?;

    Ok(RawSeasonRow {
        id: match column(values, 0) {
            Value::Integer(id) => Some(*id),
            _ => None,
        },
        season_name: season_name.to_string(),
        months,
        biomass_factor: factor_value("factor_biomasa", column(values, 3))?,
        drying_factor: factor_value("factor_secado", column(values, 4))?,
        energy_factor: factor_value("factor_energia", column(values, 5))?,
        growth_factor: factor_value("factor_crecimiento", column(values, 6))?,
        description: text_value(column(values, 7)),
    })
}

fn validate_parameter_update(key: &str, value: f64) -> ConfigResult<()> {
    if key.trim().is_empty() {
        return Err(SimulationError::InvalidInput("参数键为空".to_string()).into());
    }
    if !value.is_finite() || value <= 0.0 {
        return Err(SimulationError::InvalidInput(format!(
            "参数 {} 必须大于 0: {}",
            key, value
        ))
        .into());
    }
    Ok(())
}

fn upsert_parameter(conn: &Connection, key: &str, value: f64) -> rusqlite::Result<usize> {
    let default = parameter_default(key);
    conn.execute(
        "INSERT INTO parametros_sistema (clave, valor, unidad, descripcion, categoria)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(clave) DO UPDATE SET valor = excluded.valor",
        params![
            key.trim(),
            value.to_string(),
            default.map(|d| d.unit),
            default.map(|d| d.description),
            default.map(|d| d.category),
        ],
    )
}

fn upsert_season_row(conn: &Connection, row: &RawSeasonRow) -> ConfigResult<i64> {
    let definition = parse_season_row(row)?;
    let months = definition
        .months
        .iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join(",");
    let factors = &definition.factors;

    conn.execute(
        "INSERT INTO configuracion_estacional (
            nombre_estacion, meses_asociados, factor_biomasa, factor_secado,
            factor_energia, factor_crecimiento, descripcion
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        ON CONFLICT(nombre_estacion) DO UPDATE SET
            meses_asociados = excluded.meses_asociados,
            factor_biomasa = excluded.factor_biomasa,
            factor_secado = excluded.factor_secado,
            factor_energia = excluded.factor_energia,
            factor_crecimiento = excluded.factor_crecimiento,
            descripcion = COALESCE(excluded.descripcion, descripcion)",
        params![
            factors.name,
            months,
            factors.biomass_factor,
            factors.drying_factor,
            factors.energy_factor,
            factors.growth_factor,
            row.description,
        ],
    )?;

    let id = conn.query_row(
        "SELECT id FROM configuracion_estacional WHERE nombre_estacion = ?1",
        params![factors.name],
        |r| r.get(0),
    )?;
    Ok(id)
}

// ==========================================
// SimulationConfigReader Trait 实现
// ==========================================
#[async_trait]
impl SimulationConfigReader for ConfigManager {
    async fn get_economic_parameters(&self) -> ConfigResult<EconomicParameters> {
        let values = self.load_parameter_map()?;
        Ok(parse_economic_parameters(&values)?)
    }

    async fn get_season_table(&self) -> ConfigResult<SeasonTable> {
        let rows = self.load_stored_season_rows()?;
        if rows.is_empty() {
            tracing::warn!("季节表为空, 所有月份使用兜底因子");
        }
        Ok(build_season_table_from_stored(&rows))
    }

    async fn get_yield_tons_per_hectare(&self) -> ConfigResult<f64> {
        match self.get_parameter_value(config_keys::YIELD_TONS_PER_HECTARE)? {
            Some(raw) => Ok(parse_positive(config_keys::YIELD_TONS_PER_HECTARE, &raw)?),
            None => Ok(DEFAULT_YIELD_TONS_PER_HECTARE),
        }
    }
}
