// ==========================================
// 藻类养殖 ATP 系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 约束: 所有仓储共享同一个 SQLite 连接
// ==========================================

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::api::{ClientApi, ConfigApi, FarmApi, ImportApi, OptionalAuditSink, SimulationApi};
use crate::config::ConfigManager;
use crate::db::{ensure_schema, open_sqlite_connection};
use crate::importer::DataImporter;
use crate::repository::{
    ActionLogRepository, BatchRepository, ClientRepository, OrderRepository, WeighingRepository,
};

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "ALGATRACK_DB_PATH";

const DB_FILE_NAME: &str = "algatrack.db";

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 订单可行性模拟API
    pub simulation_api: Arc<SimulationApi>,

    /// 批次/称重/订单/日历/看板API
    pub farm_api: Arc<FarmApi>,

    /// 客户管理API
    pub client_api: Arc<ClientApi>,

    /// 配置管理API
    pub config_api: Arc<ConfigApi>,

    /// 数据导入API
    pub import_api: Arc<ImportApi>,

    pub config_manager: Arc<ConfigManager>,

    pub action_log_repo: Arc<ActionLogRepository>,
}

impl AppState {
    /// 创建AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径 (不存在则创建并建表)
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        ensure_schema(&conn).map_err(|e| format!("数据库建表失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 仓储与配置
        // ==========================================
        let batch_repo = Arc::new(BatchRepository::new(conn.clone()));
        let order_repo = Arc::new(OrderRepository::new(conn.clone()));
        let weighing_repo = Arc::new(WeighingRepository::new(conn.clone()));
        let client_repo = Arc::new(ClientRepository::new(conn.clone()));
        let action_log_repo = Arc::new(ActionLogRepository::new(conn.clone()));
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn)
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        // ==========================================
        // API 实例
        // ==========================================
        let simulation_api = Arc::new(SimulationApi::new(
            config_manager.clone(),
            batch_repo.clone(),
            order_repo.clone(),
            OptionalAuditSink::with_sink(action_log_repo.clone()),
        ));
        let farm_api = Arc::new(FarmApi::new(
            batch_repo.clone(),
            order_repo.clone(),
            weighing_repo,
            action_log_repo.clone(),
        ));
        let client_api = Arc::new(ClientApi::new(
            client_repo,
            order_repo.clone(),
            action_log_repo.clone(),
        ));
        let config_api = Arc::new(ConfigApi::new(config_manager.clone(), action_log_repo.clone()));
        let importer = Arc::new(DataImporter::new(
            batch_repo,
            order_repo,
            config_manager.clone(),
            action_log_repo.clone(),
        ));
        let import_api = Arc::new(ImportApi::new(importer));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            simulation_api,
            farm_api,
            client_api,
            config_api,
            import_api,
            config_manager,
            action_log_repo,
        })
    }
}

/// 获取默认数据库路径
///
/// # 优先级
/// 1. 环境变量 ALGATRACK_DB_PATH
/// 2. 用户数据目录 (debug 构建使用 algatrack-dev 子目录)
/// 3. 当前目录 ./algatrack.db
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from(".").join(DB_FILE_NAME);

    if let Some(data_dir) = dirs::data_dir() {
        // 开发环境使用独立目录，避免污染生产数据
        #[cfg(debug_assertions)]
        let dir = data_dir.join("algatrack-dev");

        #[cfg(not(debug_assertions))]
        let dir = data_dir.join("algatrack");

        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join(DB_FILE_NAME);
        } else {
            tracing::warn!(dir = %dir.display(), "无法创建数据目录, 使用当前目录");
        }
    }

    path.to_string_lossy().to_string()
}
