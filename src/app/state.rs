// ==========================================
// 仓储作业核心 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 约束: 所有仓储共享同一个连接（Arc<Mutex<Connection>>），保证事务与外键行为一致
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{ContainerApi, LocationApi, PlanApi, ZoneApi};
use crate::config::config_manager::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection, read_schema_version};
use crate::repository::{
    ActionLogRepository, LocationRepository, PlanRepository, ZoneRepository,
};

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 库区API
    pub zone_api: Arc<ZoneApi>,

    /// 库位API
    pub location_api: Arc<LocationApi>,

    /// 箱号API
    pub container_api: Arc<ContainerApi>,

    /// 作业计划API
    pub plan_api: Arc<PlanApi>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    /// 操作日志仓储（用于审计追踪）
    pub action_log_repo: Arc<ActionLogRepository>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 说明
    /// 1. 打开数据库并应用统一 PRAGMA
    /// 2. 建表（幂等）
    /// 3. 初始化所有Repository与API实例
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("数据库建表失败: {}", e))?;
        let schema_version =
            read_schema_version(&conn).map_err(|e| format!("读取 schema_version 失败: {}", e))?;
        tracing::info!(?schema_version, "数据库已就绪");

        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let zone_repo = Arc::new(ZoneRepository::new(conn.clone()));
        let location_repo = Arc::new(LocationRepository::new(conn.clone()));
        let plan_repo = Arc::new(PlanRepository::new(conn.clone()));
        let action_log_repo = Arc::new(ActionLogRepository::new(conn.clone()));

        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        // ==========================================
        // 初始化API层
        // ==========================================
        let zone_api = Arc::new(ZoneApi::new(
            zone_repo.clone(),
            location_repo.clone(),
            action_log_repo.clone(),
        ));
        let location_api = Arc::new(LocationApi::new(
            zone_repo,
            location_repo,
            action_log_repo.clone(),
            config_manager.clone(),
        ));
        let container_api = Arc::new(ContainerApi::new());
        let plan_api = Arc::new(PlanApi::new(plan_repo, action_log_repo.clone()));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            zone_api,
            location_api,
            container_api,
            plan_api,
            config_manager,
            action_log_repo,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先级: 环境变量 WAREHOUSE_OPS_DB_PATH → 用户数据目录 → 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var("WAREHOUSE_OPS_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./warehouse_ops.db");

    if let Some(data_dir) = dirs::data_dir() {
        // 开发环境使用独立目录，避免污染生产数据
        #[cfg(debug_assertions)]
        let dir = data_dir.join("warehouse-ops-dev");

        #[cfg(not(debug_assertions))]
        let dir = data_dir.join("warehouse-ops");

        // 目录创建失败时退回当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("warehouse_ops.db");
        }
    }

    path.to_string_lossy().to_string()
}
