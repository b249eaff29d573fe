// ==========================================
// 仓储作业核心 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、值对象
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod action_log;
pub mod container;
pub mod location;
pub mod plan;
pub mod types;
pub mod zone;

// 重导出核心类型
pub use action_log::{ActionLog, ActionType};
pub use container::{ContainerNumber, EquipmentCategory};
pub use location::{CustomLabel, Location, LocationAddressing, LocationCodes, RbsIndex};
pub use plan::{Plan, PlanContainer};
pub use types::{
    ContainerStatus, LocationStatus, PlanAction, PlanKind, PlanStatus, ZoneStatus, ZoneType,
};
pub use zone::Zone;
