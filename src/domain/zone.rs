// ==========================================
// 仓储作业核心 - 库区领域模型
// ==========================================
// 红线: code 创建后不可修改; 名下有库位时不可删除（由持久层外键保证）
// ==========================================

use crate::domain::types::{ZoneStatus, ZoneType};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// Zone - 库区
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    pub zone_id: String,           // 库区ID
    pub code: String,              // 库区代码（1-2 位大写字母，唯一）
    pub name: String,              // 库区名称
    pub zone_type: ZoneType,       // 编址方式
    pub status: ZoneStatus,        // 启用状态
    pub created_at: NaiveDateTime, // 创建时间
}

impl Zone {
    pub fn is_active(&self) -> bool {
        self.status == ZoneStatus::Active
    }
}
