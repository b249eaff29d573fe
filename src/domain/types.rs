// ==========================================
// 仓储作业核心 - 领域类型定义
// ==========================================
// 依据: 库区/库位/作业计划 状态词表
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 库区类型 (Zone Type)
// ==========================================
// RBS: 行-贝-位 结构化编址; CUSTOM: 自定义标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ZoneType {
    Rbs,    // 行-贝-位
    Custom, // 自定义标签
}

impl fmt::Display for ZoneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl ZoneType {
    /// 从字符串解析库区类型
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "RBS" => Some(ZoneType::Rbs),
            "CUSTOM" => Some(ZoneType::Custom),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ZoneType::Rbs => "RBS",
            ZoneType::Custom => "CUSTOM",
        }
    }
}

// ==========================================
// 库区状态 (Zone Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ZoneStatus {
    Active,   // 启用
    Inactive, // 停用
}

impl fmt::Display for ZoneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl ZoneStatus {
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "ACTIVE" => Some(ZoneStatus::Active),
            "INACTIVE" => Some(ZoneStatus::Inactive),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            ZoneStatus::Active => "ACTIVE",
            ZoneStatus::Inactive => "INACTIVE",
        }
    }
}

// ==========================================
// 库位状态 (Location Status)
// ==========================================
// LOCKED: 编址字段不可修改
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocationStatus {
    Active,   // 启用
    Inactive, // 停用
    Locked,   // 锁定
}

impl fmt::Display for LocationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl LocationStatus {
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "ACTIVE" => Some(LocationStatus::Active),
            "INACTIVE" => Some(LocationStatus::Inactive),
            "LOCKED" => Some(LocationStatus::Locked),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            LocationStatus::Active => "ACTIVE",
            LocationStatus::Inactive => "INACTIVE",
            LocationStatus::Locked => "LOCKED",
        }
    }

    /// 编址字段（行/贝/位 或 标签）是否允许修改
    ///
    /// 仅停用库位允许改址；启用/锁定库位只能改状态
    pub fn allows_address_change(&self) -> bool {
        matches!(self, LocationStatus::Inactive)
    }
}

// ==========================================
// 作业计划类型 (Plan Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanKind {
    Receiving,  // 收箱计划
    Destuffing, // 拆箱计划
}

impl fmt::Display for PlanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl PlanKind {
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "RECEIVING" => Some(PlanKind::Receiving),
            "DESTUFFING" => Some(PlanKind::Destuffing),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            PlanKind::Receiving => "RECEIVING",
            PlanKind::Destuffing => "DESTUFFING",
        }
    }
}

// ==========================================
// 计划状态 (Plan Status)
// ==========================================
// 终态: DONE / CANCELLED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanStatus {
    Pending,    // 待处理
    Scheduled,  // 已排期
    InProgress, // 执行中
    Done,       // 已完成
    Cancelled,  // 已作废
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl PlanStatus {
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "PENDING" => Some(PlanStatus::Pending),
            "SCHEDULED" => Some(PlanStatus::Scheduled),
            "IN_PROGRESS" => Some(PlanStatus::InProgress),
            "DONE" => Some(PlanStatus::Done),
            "CANCELLED" => Some(PlanStatus::Cancelled),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            PlanStatus::Pending => "PENDING",
            PlanStatus::Scheduled => "SCHEDULED",
            PlanStatus::InProgress => "IN_PROGRESS",
            PlanStatus::Done => "DONE",
            PlanStatus::Cancelled => "CANCELLED",
        }
    }

    /// 是否为终态
    pub fn is_terminal(&self) -> bool {
        matches!(self, PlanStatus::Done | PlanStatus::Cancelled)
    }

    /// 本地化状态文案
    pub fn label(&self) -> String {
        crate::i18n::enum_label("plan_status", self.to_db_str())
    }
}

// ==========================================
// 计划内箱状态 (Container Status)
// ==========================================
// 收箱: WAITING → RECEIVED / REJECTED / DEFERRED
// 拆箱: WAITING → IN_PROGRESS → DONE / REJECTED / DEFERRED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContainerStatus {
    Waiting,    // 待作业
    Received,   // 已收箱
    Rejected,   // 拒收
    Deferred,   // 延后
    InProgress, // 作业中
    Done,       // 已完成
}

impl fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl ContainerStatus {
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "WAITING" => Some(ContainerStatus::Waiting),
            "RECEIVED" => Some(ContainerStatus::Received),
            "REJECTED" => Some(ContainerStatus::Rejected),
            "DEFERRED" => Some(ContainerStatus::Deferred),
            "IN_PROGRESS" => Some(ContainerStatus::InProgress),
            "DONE" => Some(ContainerStatus::Done),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            ContainerStatus::Waiting => "WAITING",
            ContainerStatus::Received => "RECEIVED",
            ContainerStatus::Rejected => "REJECTED",
            ContainerStatus::Deferred => "DEFERRED",
            ContainerStatus::InProgress => "IN_PROGRESS",
            ContainerStatus::Done => "DONE",
        }
    }

    /// 是否已离开 WAITING（即已被处理过）
    pub fn is_processed(&self) -> bool {
        !matches!(self, ContainerStatus::Waiting)
    }

    /// 本地化状态文案
    pub fn label(&self) -> String {
        crate::i18n::enum_label("container_status", self.to_db_str())
    }
}

// ==========================================
// 计划级操作 (Plan Action)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanAction {
    Cancel,      // 撤销执行
    MarkDone,    // 标记完成
    MarkPending, // 退回待处理
}

impl fmt::Display for PlanAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl PlanAction {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            PlanAction::Cancel => "CANCEL",
            PlanAction::MarkDone => "MARK_DONE",
            PlanAction::MarkPending => "MARK_PENDING",
        }
    }

    /// 本地化按钮文案
    pub fn label(&self) -> String {
        crate::i18n::enum_label("plan_action", self.to_db_str())
    }
}
