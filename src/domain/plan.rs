// ==========================================
// 仓储作业核心 - 作业计划领域模型
// ==========================================
// 计划类型: 收箱 (RECEIVING) / 拆箱 (DESTUFFING)
// 红线: 计划终态只能经由 PlanStateMachine 的守卫判定得出
// ==========================================

use crate::domain::types::{ContainerStatus, PlanKind, PlanStatus};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// PlanContainer - 计划内箱
// ==========================================
// 归属: 仅属于其父计划
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanContainer {
    pub container_id: String,    // 明细ID
    pub plan_id: String,         // 所属计划
    pub container_ref: String,   // 箱号（规范化后的 11 位）
    pub status: ContainerStatus, // 作业状态
}

// ==========================================
// Plan - 作业计划
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub plan_id: String,                // 计划ID
    pub code: String,                   // 计划编号
    pub kind: PlanKind,                 // 计划类型
    pub status: PlanStatus,             // 计划状态
    pub containers: Vec<PlanContainer>, // 明细
    pub created_by: String,             // 创建人
    pub created_at: NaiveDateTime,      // 创建时间
    pub updated_at: NaiveDateTime,      // 更新时间
    pub revision: i64,                  // 乐观锁版本（计划状态或任一箱状态变更时 +1）
}

impl Plan {
    /// 当前箱状态快照（守卫判定的输入）
    pub fn container_statuses(&self) -> Vec<ContainerStatus> {
        self.containers.iter().map(|c| c.status).collect()
    }

    pub fn find_container(&self, container_id: &str) -> Option<&PlanContainer> {
        self.containers
            .iter()
            .find(|c| c.container_id == container_id)
    }
}
