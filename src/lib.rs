// ==========================================
// 仓储作业核心 - 核心库
// ==========================================
// 范围: 箱号校验、库位编码、批量布局、作业计划状态机
// 技术栈: Rust + SQLite
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则（纯函数）
pub mod engine;

// 导入层 - 箱号清单
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 共享状态
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    ContainerStatus, LocationStatus, PlanAction, PlanKind, PlanStatus, ZoneStatus, ZoneType,
};

// 领域实体
pub use domain::{
    ActionLog, ActionType, ContainerNumber, Location, LocationAddressing, LocationCodes, Plan,
    PlanContainer, Zone,
};

// 引擎
pub use engine::{
    ContainerNumberValidator, LayoutBuilder, LayoutSpec, LocationCodec, LocationFields,
    PlanActions, PlanStateMachine,
};

// API
pub use api::{ApiError, ApiResult, ContainerApi, LocationApi, PlanApi, ZoneApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "仓储作业核心";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
