// ==========================================
// 仓储作业核心 - API 层
// ==========================================
// 职责: 业务用例门面，串联 引擎 → 仓储 → 操作日志
// 约束: 统一返回 ApiResult，错误带显式原因
// ==========================================

pub mod container_api;
pub mod error;
pub mod location_api;
pub mod plan_api;
pub mod zone_api;

// 重导出
pub use container_api::{ContainerApi, ContainerCheckView, ContainerNumberView};
pub use error::{ApiError, ApiResult};
pub use location_api::{LayoutCreateResult, LocationApi};
pub use plan_api::PlanApi;
pub use zone_api::ZoneApi;
