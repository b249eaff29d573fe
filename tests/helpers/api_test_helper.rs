// ==========================================
// API集成测试辅助工具
// ==========================================
// 职责: 提供API层集成测试的通用辅助函数
// ==========================================

#![allow(dead_code)]

use std::error::Error;
use tempfile::NamedTempFile;

use warehouse_ops::app::AppState;
use warehouse_ops::domain::types::ZoneType;
use warehouse_ops::domain::zone::Zone;

/// 测试操作人
pub const OPERATOR: &str = "tester";

// ==========================================
// API测试环境
// ==========================================

/// API测试环境
///
/// 基于临时数据库文件构建完整 AppState
pub struct ApiTestEnv {
    pub state: AppState,

    // 临时文件（确保生命周期）
    _temp_file: NamedTempFile,
}

impl ApiTestEnv {
    pub fn new() -> Result<Self, Box<dyn Error>> {
        let temp_file = NamedTempFile::new()?;
        let db_path = temp_file
            .path()
            .to_str()
            .ok_or("临时文件路径非 UTF-8")?
            .to_string();
        let state = AppState::new(db_path)?;
        Ok(Self {
            state,
            _temp_file: temp_file,
        })
    }

    pub fn db_path(&self) -> &str {
        &self.state.db_path
    }

    /// 创建 RBS 库区
    pub fn create_rbs_zone(&self, code: &str) -> Zone {
        self.state
            .zone_api
            .create_zone(code, &format!("{}区", code), ZoneType::Rbs, OPERATOR)
            .expect("创建RBS库区失败")
    }

    /// 创建 CUSTOM 库区
    pub fn create_custom_zone(&self, code: &str) -> Zone {
        self.state
            .zone_api
            .create_zone(code, &format!("{}区", code), ZoneType::Custom, OPERATOR)
            .expect("创建自定义库区失败")
    }
}
