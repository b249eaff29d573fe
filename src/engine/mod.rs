// ==========================================
// 仓储作业核心 - 引擎层
// ==========================================
// 职责: 实现业务规则引擎,不拼 SQL
// 红线: 纯函数，无 I/O；失败以类型化错误返回
// ==========================================

pub mod container_number;
pub mod error;
pub mod layout_builder;
pub mod location_codec;
pub mod plan_state_machine;

// 重导出核心引擎
pub use container_number::{ContainerCheckResult, ContainerNumberValidator};
pub use error::{
    ContainerNumberError, LayoutValidationError, LocationCodeError, PlanTransitionError,
};
pub use layout_builder::{
    LayoutBay, LayoutBuilder, LayoutPreview, LayoutRow, LayoutSpec, LocationCreateRequest,
    ValidatedLayout,
};
pub use location_codec::{CodePreview, LocationCodec, LocationFields, RbsField};
pub use plan_state_machine::{PlanActions, PlanStateMachine};
