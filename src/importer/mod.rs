// ==========================================
// 仓储作业核心 - 导入层
// ==========================================
// 职责: 外部箱号清单导入,逐行校验后交给计划创建
// 支持: CSV, 纯文本
// ==========================================

pub mod container_list;
pub mod error;

// 重导出核心类型
pub use container_list::{ContainerImportReport, ContainerImportRow, ContainerListImporter};
pub use error::{ImportError, ImportResult};
