// ==========================================
// 仓储作业核心 - 引擎层错误类型
// ==========================================
// 红线: 引擎只返回类型化错误，不 panic，便于批量校验收集全部失败
// 工具: thiserror 派生宏
// ==========================================

use crate::domain::types::{ContainerStatus, PlanAction, PlanKind, PlanStatus};
use thiserror::Error;

// ==========================================
// 箱号校验错误
// ==========================================
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContainerNumberError {
    /// 形状不符: 需 4 位字母 + 7 位数字，类别字母为 U/J/Z
    #[error("箱号格式错误: {input}（{reason}）")]
    FormatError { input: String, reason: String },

    /// 形状正确但校验码不符
    #[error("箱号校验码错误: {input}（期望 {expected}，实际 {actual}）")]
    CheckDigitError {
        input: String,
        expected: u8,
        actual: u8,
    },
}

// ==========================================
// 库位编码错误
// ==========================================
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocationCodeError {
    #[error("缺少必填字段: {field}")]
    MissingFieldError { field: String },

    /// RBS 字段不满足 ^[RBS][0-9]{2}$
    #[error("RBS 字段格式错误 (field={field}): {value}，期望 {prefix}+两位数字")]
    BadRbsFormatError {
        field: String,
        value: String,
        prefix: char,
    },
}

// ==========================================
// 批量布局错误
// ==========================================
// 只报告按优先级找到的第一个违规
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutValidationError {
    #[error("布局至少需要一行")]
    NoRows,

    #[error("第 {row} 行没有任何贝")]
    EmptyRow { row: usize },

    #[error("第 {row} 行第 {bay} 贝的位数无效: {slots_count}（必须 >= 1）")]
    NonPositiveSlotCount {
        row: usize,
        bay: usize,
        slots_count: i64,
    },

    #[error("{axis} 序号超出两位编码上限: {count} > 99")]
    IndexOverflow { axis: char, count: u64 },

    #[error("布局生成库位数为 0")]
    ZeroTotal,

    #[error("布局生成库位数过多: {total} > 上限 {max}")]
    TooLarge { total: u64, max: u64 },
}

// ==========================================
// 作业计划状态转换错误
// ==========================================
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanTransitionError {
    #[error("箱状态转换非法 ({kind}): from={from} to={to}")]
    InvalidContainerTransition {
        kind: PlanKind,
        from: ContainerStatus,
        to: ContainerStatus,
    },

    #[error("计划操作守卫未通过: action={action}, plan_status={status}")]
    GuardRejected {
        action: PlanAction,
        status: PlanStatus,
    },

    #[error("计划状态转换非法: from={from} to={to}")]
    InvalidPlanTransition { from: PlanStatus, to: PlanStatus },
}
