// ==========================================
// 仓储作业核心 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::warehouse_config_trait::{ConfigResult, WarehouseConfigReader};
use crate::db::open_sqlite_connection;
use crate::engine::layout_builder::{DEFAULT_MAX_TOTAL, DEFAULT_PREVIEW_LIMIT};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::HashMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

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
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(
        conn: Arc<Mutex<Connection>>,
    ) -> Result<Self, Box<dyn Error + Send + Sync>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（存在则覆盖）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        tracing::info!(key = key, value = value, "配置已更新");
        Ok(())
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> ConfigResult<String> {
        Ok(self
            .get_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// 单次批量生成库位上限（同步读取，供 API 层使用）
    ///
    /// 非法值或 0 回退到默认值
    pub fn layout_max_total(&self) -> ConfigResult<u64> {
        let default = DEFAULT_MAX_TOTAL.to_string();
        let value = self.get_config_or_default(config_keys::LAYOUT_MAX_TOTAL, &default)?;
        match value.trim().parse::<u64>() {
            Ok(v) if v > 0 => Ok(v),
            _ => {
                tracing::warn!("配置 {} 非法: {}，使用默认值", config_keys::LAYOUT_MAX_TOTAL, value);
                Ok(DEFAULT_MAX_TOTAL)
            }
        }
    }

    /// 布局预览条数（同步读取）
    pub fn layout_preview_limit(&self) -> ConfigResult<usize> {
        let default = DEFAULT_PREVIEW_LIMIT.to_string();
        let value = self.get_config_or_default(config_keys::LAYOUT_PREVIEW_LIMIT, &default)?;
        Ok(value.trim().parse::<usize>().unwrap_or(DEFAULT_PREVIEW_LIMIT))
    }

    /// 获取所有配置的快照（JSON格式）
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt = conn.prepare(
            "SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key",
        )?;

        let mut config_map: HashMap<String, String> = HashMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }

    /// 从配置快照恢复配置
    ///
    /// # 返回
    /// - Ok(usize): 恢复的配置项数量
    pub fn restore_config_from_snapshot(&self, snapshot_json: &str) -> ConfigResult<usize> {
        let config_map: HashMap<String, String> = serde_json::from_str(snapshot_json)?;

        let mut conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let tx = conn.transaction()?;

        let mut count = 0;
        for (key, value) in config_map.iter() {
            count += tx.execute(
                "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
                 ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
                params![key, value],
            )?;
        }

        tx.commit()?;
        Ok(count)
    }
}

// ==========================================
// 实现 WarehouseConfigReader Trait
// ==========================================
#[async_trait]
impl WarehouseConfigReader for ConfigManager {
    async fn get_layout_max_total(&self) -> ConfigResult<u64> {
        self.layout_max_total()
    }

    async fn get_layout_preview_limit(&self) -> ConfigResult<usize> {
        self.layout_preview_limit()
    }

    async fn get_default_locale(&self) -> ConfigResult<String> {
        let value = self.get_config_or_default(config_keys::UI_LOCALE, "zh-CN")?;
        match value.trim() {
            "en" => Ok("en".to_string()),
            _ => Ok("zh-CN".to_string()),
        }
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 批量布局
    pub const LAYOUT_MAX_TOTAL: &str = "layout.max_total_locations";
    pub const LAYOUT_PREVIEW_LIMIT: &str = "layout.preview_limit";

    // 界面
    pub const UI_LOCALE: &str = "ui.locale";
}
