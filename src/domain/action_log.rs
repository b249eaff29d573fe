// ==========================================
// 仓储作业核心 - 操作日志领域模型
// ==========================================
// 红线: 所有写入必须记录
// 用途: 审计追踪
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

// ==========================================
// ActionLog - 操作日志
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLog {
    pub action_id: String,               // 日志ID
    pub action_type: String,             // 操作类型 (ActionType::as_str)
    pub target_id: Option<String>,       // 操作对象ID（库区/库位/计划）
    pub action_ts: NaiveDateTime,        // 操作时间戳
    pub actor: String,                   // 操作人
    pub payload_json: Option<JsonValue>, // 操作参数 (JSON)
    pub detail: Option<String>,          // 详细描述
}

impl ActionLog {
    pub fn new(
        action_type: ActionType,
        target_id: Option<String>,
        actor: &str,
        payload_json: Option<JsonValue>,
        detail: Option<String>,
    ) -> Self {
        Self {
            action_id: uuid::Uuid::new_v4().to_string(),
            action_type: action_type.as_str().to_string(),
            target_id,
            action_ts: chrono::Utc::now().naive_utc(),
            actor: actor.to_string(),
            payload_json,
            detail,
        }
    }
}

// ==========================================
// ActionType - 操作类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionType {
    CreateZone,            // 新建库区
    UpdateZoneStatus,      // 库区启停
    DeleteZone,            // 删除库区
    CreateLocation,        // 新建库位
    UpdateLocationStatus,  // 库位状态变更
    UpdateLocationAddress, // 库位改址
    CreateLayout,          // 批量生成库位
    CreatePlan,            // 新建作业计划
    StartPlan,             // 开始执行
    UpdateContainerStatus, // 箱状态变更
    CancelPlan,            // 撤销执行
    MarkPlanDone,          // 标记完成
    MarkPlanPending,       // 退回待处理
    AbandonPlan,           // 作废计划
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::CreateZone => "CreateZone",
            ActionType::UpdateZoneStatus => "UpdateZoneStatus",
            ActionType::DeleteZone => "DeleteZone",
            ActionType::CreateLocation => "CreateLocation",
            ActionType::UpdateLocationStatus => "UpdateLocationStatus",
            ActionType::UpdateLocationAddress => "UpdateLocationAddress",
            ActionType::CreateLayout => "CreateLayout",
            ActionType::CreatePlan => "CreatePlan",
            ActionType::StartPlan => "StartPlan",
            ActionType::UpdateContainerStatus => "UpdateContainerStatus",
            ActionType::CancelPlan => "CancelPlan",
            ActionType::MarkPlanDone => "MarkPlanDone",
            ActionType::MarkPlanPending => "MarkPlanPending",
            ActionType::AbandonPlan => "AbandonPlan",
        }
    }
}
