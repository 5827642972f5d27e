// ==========================================
// 藻类养殖 ATP 系统 - 模拟配置读取 Trait
// ==========================================
// 职责: 定义模拟用例所需的配置读取接口 (不包含实现)
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::error::ConfigResult;
use crate::domain::economics::EconomicParameters;
use crate::domain::season::SeasonTable;
use async_trait::async_trait;

// ==========================================
// SimulationConfigReader Trait
// ==========================================
// 实现者: ConfigManager (从 parametros_sistema / configuracion_estacional 读取)
#[async_trait]
pub trait SimulationConfigReader: Send + Sync {
    /// 获取强类型经济参数
    ///
    /// # 默认值
    /// - 参数表为空: 整套内置默认值
    /// - 产能/周期类参数缺失: 单项默认值
    ///
    /// # 错误
    /// - 价格/吨耗类参数缺失, 或任一参数非正 → `ConfigurationIncomplete`
    async fn get_economic_parameters(&self) -> ConfigResult<EconomicParameters>;

    /// 获取有序季节表
    ///
    /// 格式错误的行被跳过并记入 `SeasonTable::warnings`
    async fn get_season_table(&self) -> ConfigResult<SeasonTable>;

    /// 获取单产 (吨/公顷)
    ///
    /// # 默认值
    /// - 10.0
    async fn get_yield_tons_per_hectare(&self) -> ConfigResult<f64>;
}
