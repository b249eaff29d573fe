// ==========================================
// 仓储作业核心 - 作业计划状态机
// ==========================================
// 职责: 箱级状态转换 + 计划级操作守卫（撤销/完成/退回）
// 红线: 纯函数，不访问网络/数据库；只返回"下一目标计划状态"，由调用方持久化
// ==========================================
// 箱级状态:
//   收箱: WAITING → {RECEIVED, REJECTED, DEFERRED}
//   拆箱: WAITING → IN_PROGRESS → {DONE, REJECTED, DEFERRED}
// 计划级守卫（三者每次独立求值，不假设互斥）:
//   can_cancel       箱集合非空且全部 WAITING
//   can_mark_done    箱集合非空且全部为该计划类型的完成状态
//   can_mark_pending 至少一箱已处理且至少一箱仍 WAITING
// ==========================================

use crate::domain::types::{ContainerStatus, PlanAction, PlanKind, PlanStatus};
use crate::engine::error::PlanTransitionError;
use serde::Serialize;

// ==========================================
// PlanActions - 计划级按钮可用性
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanActions {
    pub can_cancel: bool,
    pub can_mark_done: bool,
    pub can_mark_pending: bool,
}

impl PlanActions {
    pub fn allows(&self, action: PlanAction) -> bool {
        match action {
            PlanAction::Cancel => self.can_cancel,
            PlanAction::MarkDone => self.can_mark_done,
            PlanAction::MarkPending => self.can_mark_pending,
        }
    }
}

// ==========================================
// PlanStateMachine
// ==========================================
pub struct PlanStateMachine;

impl PlanStateMachine {
    /// 计划类型对应的箱完成状态
    pub fn done_status(kind: PlanKind) -> ContainerStatus {
        match kind {
            PlanKind::Receiving => ContainerStatus::Received,
            PlanKind::Destuffing => ContainerStatus::Done,
        }
    }

    /// 撤销执行后计划回到的状态
    pub fn cancel_target(kind: PlanKind) -> PlanStatus {
        match kind {
            PlanKind::Receiving => PlanStatus::Scheduled,
            PlanKind::Destuffing => PlanStatus::Pending,
        }
    }

    // ==========================================
    // 箱级状态转换
    // ==========================================

    /// 判断箱状态转换是否合法
    pub fn can_transition_container(
        kind: PlanKind,
        from: ContainerStatus,
        to: ContainerStatus,
    ) -> bool {
        use ContainerStatus::*;
        match kind {
            PlanKind::Receiving => matches!((from, to), (Waiting, Received | Rejected | Deferred)),
            PlanKind::Destuffing => matches!(
                (from, to),
                (Waiting, InProgress) | (InProgress, Done | Rejected | Deferred)
            ),
        }
    }

    /// 执行箱状态转换
    ///
    /// # 返回
    /// - Ok(to): 合法转换
    /// - Err(InvalidContainerTransition): 非法转换（含回到 WAITING）
    pub fn transition_container(
        kind: PlanKind,
        from: ContainerStatus,
        to: ContainerStatus,
    ) -> Result<ContainerStatus, PlanTransitionError> {
        if Self::can_transition_container(kind, from, to) {
            Ok(to)
        } else {
            Err(PlanTransitionError::InvalidContainerTransition { kind, from, to })
        }
    }

    // ==========================================
    // 计划级守卫
    // ==========================================

    /// 可撤销: 非空且没有任何箱被处理过
    pub fn can_cancel(statuses: &[ContainerStatus]) -> bool {
        !statuses.is_empty() && statuses.iter().all(|s| *s == ContainerStatus::Waiting)
    }

    /// 可标记完成: 非空且全部达到完成状态（部分完成不允许）
    pub fn can_mark_done(kind: PlanKind, statuses: &[ContainerStatus]) -> bool {
        let done = Self::done_status(kind);
        !statuses.is_empty() && statuses.iter().all(|s| *s == done)
    }

    /// 可退回待处理: 部分已处理、部分仍在等待
    pub fn can_mark_pending(statuses: &[ContainerStatus]) -> bool {
        statuses.iter().any(|s| s.is_processed())
            && statuses.iter().any(|s| *s == ContainerStatus::Waiting)
    }

    /// 一次性求值三个守卫
    pub fn evaluate(kind: PlanKind, statuses: &[ContainerStatus]) -> PlanActions {
        PlanActions {
            can_cancel: Self::can_cancel(statuses),
            can_mark_done: Self::can_mark_done(kind, statuses),
            can_mark_pending: Self::can_mark_pending(statuses),
        }
    }

    // ==========================================
    // 计划级转换（守卫通过后才给出目标状态）
    // ==========================================

    /// 执行计划级操作，返回下一目标计划状态
    ///
    /// # 规则
    /// - 终态计划（DONE/CANCELLED）不接受任何操作
    /// - cancel: 收箱计划回到 SCHEDULED，拆箱计划回到 PENDING，箱状态不变（均为 WAITING）
    /// - mark_done: DONE
    /// - mark_pending: PENDING，不修改箱状态
    pub fn apply(
        kind: PlanKind,
        action: PlanAction,
        current: PlanStatus,
        statuses: &[ContainerStatus],
    ) -> Result<PlanStatus, PlanTransitionError> {
        let actions = Self::evaluate(kind, statuses);
        if current.is_terminal() || !actions.allows(action) {
            return Err(PlanTransitionError::GuardRejected {
                action,
                status: current,
            });
        }

        let next = match action {
            PlanAction::Cancel => Self::cancel_target(kind),
            PlanAction::MarkDone => PlanStatus::Done,
            PlanAction::MarkPending => PlanStatus::Pending,
        };
        tracing::debug!(%kind, %action, from = %current, to = %next, "计划操作守卫通过");
        Ok(next)
    }

    pub fn cancel(
        kind: PlanKind,
        current: PlanStatus,
        statuses: &[ContainerStatus],
    ) -> Result<PlanStatus, PlanTransitionError> {
        Self::apply(kind, PlanAction::Cancel, current, statuses)
    }

    pub fn mark_done(
        kind: PlanKind,
        current: PlanStatus,
        statuses: &[ContainerStatus],
    ) -> Result<PlanStatus, PlanTransitionError> {
        Self::apply(kind, PlanAction::MarkDone, current, statuses)
    }

    pub fn mark_pending(
        kind: PlanKind,
        current: PlanStatus,
        statuses: &[ContainerStatus],
    ) -> Result<PlanStatus, PlanTransitionError> {
        Self::apply(kind, PlanAction::MarkPending, current, statuses)
    }

    /// 开始执行: PENDING/SCHEDULED → IN_PROGRESS，计划内至少一箱
    pub fn start(
        current: PlanStatus,
        statuses: &[ContainerStatus],
    ) -> Result<PlanStatus, PlanTransitionError> {
        match current {
            PlanStatus::Pending | PlanStatus::Scheduled if !statuses.is_empty() => {
                Ok(PlanStatus::InProgress)
            }
            _ => Err(PlanTransitionError::InvalidPlanTransition {
                from: current,
                to: PlanStatus::InProgress,
            }),
        }
    }

    /// 作废未开始的计划: PENDING/SCHEDULED 且没有箱被处理过 → CANCELLED
    pub fn abandon(
        current: PlanStatus,
        statuses: &[ContainerStatus],
    ) -> Result<PlanStatus, PlanTransitionError> {
        let untouched = statuses.iter().all(|s| *s == ContainerStatus::Waiting);
        match current {
            PlanStatus::Pending | PlanStatus::Scheduled if untouched => Ok(PlanStatus::Cancelled),
            _ => Err(PlanTransitionError::InvalidPlanTransition {
                from: current,
                to: PlanStatus::Cancelled,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ContainerStatus::*;

    #[test]
    fn test_can_cancel() {
        assert!(PlanStateMachine::can_cancel(&[Waiting]));
        assert!(PlanStateMachine::can_cancel(&[Waiting, Waiting, Waiting]));
        assert!(!PlanStateMachine::can_cancel(&[]));
        for processed in [Received, Rejected, Deferred, InProgress, Done] {
            assert!(!PlanStateMachine::can_cancel(&[Waiting, Waiting, processed]));
        }
    }

    #[test]
    fn test_can_mark_done() {
        let k = PlanKind::Destuffing;
        assert!(PlanStateMachine::can_mark_done(k, &[Done, Done]));
        assert!(!PlanStateMachine::can_mark_done(k, &[Done, Waiting]));
        assert!(!PlanStateMachine::can_mark_done(k, &[]));
        assert!(!PlanStateMachine::can_mark_done(k, &[Done, Rejected]));

        let r = PlanKind::Receiving;
        assert!(PlanStateMachine::can_mark_done(r, &[Received, Received]));
        assert!(!PlanStateMachine::can_mark_done(r, &[Done, Done]));
    }

    #[test]
    fn test_can_mark_pending() {
        assert!(PlanStateMachine::can_mark_pending(&[Waiting, Done]));
        assert!(PlanStateMachine::can_mark_pending(&[Deferred, Waiting, Waiting]));
        assert!(!PlanStateMachine::can_mark_pending(&[Waiting, Waiting]));
        assert!(!PlanStateMachine::can_mark_pending(&[Done, Done]));
        assert!(!PlanStateMachine::can_mark_pending(&[]));
    }

    #[test]
    fn test_guards_exclusive_for_well_formed_sets() {
        let sets: [&[ContainerStatus]; 5] = [
            &[Waiting, Waiting],
            &[Done, Done],
            &[Waiting, Done],
            &[InProgress, Waiting],
            &[Rejected, Done],
        ];
        for set in sets {
            let a = PlanStateMachine::evaluate(PlanKind::Destuffing, set);
            let enabled = [a.can_cancel, a.can_mark_done, a.can_mark_pending]
                .iter()
                .filter(|b| **b)
                .count();
            assert!(enabled <= 1, "{:?} enables {} actions", set, enabled);
        }
    }

    #[test]
    fn test_receiving_container_transitions() {
        let k = PlanKind::Receiving;
        for to in [Received, Rejected, Deferred] {
            assert_eq!(PlanStateMachine::transition_container(k, Waiting, to), Ok(to));
            // 离开 WAITING 后不可回退
            assert!(PlanStateMachine::transition_container(k, to, Waiting).is_err());
        }
        assert!(PlanStateMachine::transition_container(k, Waiting, InProgress).is_err());
        assert!(PlanStateMachine::transition_container(k, Received, Rejected).is_err());
    }

    #[test]
    fn test_destuffing_container_transitions() {
        let k = PlanKind::Destuffing;
        assert!(PlanStateMachine::can_transition_container(k, Waiting, InProgress));
        for to in [Done, Rejected, Deferred] {
            assert!(PlanStateMachine::can_transition_container(k, InProgress, to));
            assert!(!PlanStateMachine::can_transition_container(k, Waiting, to));
        }
        assert!(!PlanStateMachine::can_transition_container(k, Done, InProgress));
        assert!(!PlanStateMachine::can_transition_container(k, InProgress, Waiting));
    }

    #[test]
    fn test_cancel_targets() {
        assert_eq!(
            PlanStateMachine::cancel(PlanKind::Receiving, PlanStatus::InProgress, &[Waiting]),
            Ok(PlanStatus::Scheduled)
        );
        assert_eq!(
            PlanStateMachine::cancel(PlanKind::Destuffing, PlanStatus::InProgress, &[Waiting]),
            Ok(PlanStatus::Pending)
        );
        assert!(matches!(
            PlanStateMachine::cancel(PlanKind::Destuffing, PlanStatus::InProgress, &[Waiting, InProgress]),
            Err(PlanTransitionError::GuardRejected {
                action: PlanAction::Cancel,
                ..
            })
        ));
    }

    #[test]
    fn test_mark_done_and_pending() {
        assert_eq!(
            PlanStateMachine::mark_done(PlanKind::Destuffing, PlanStatus::InProgress, &[Done, Done]),
            Ok(PlanStatus::Done)
        );
        assert_eq!(
            PlanStateMachine::mark_pending(PlanKind::Receiving, PlanStatus::InProgress, &[Received, Waiting]),
            Ok(PlanStatus::Pending)
        );
        assert!(PlanStateMachine::mark_done(PlanKind::Destuffing, PlanStatus::InProgress, &[Done, Waiting]).is_err());
    }

    #[test]
    fn test_terminal_plans_reject_actions() {
        assert!(PlanStateMachine::mark_done(PlanKind::Destuffing, PlanStatus::Done, &[Done]).is_err());
        assert!(PlanStateMachine::cancel(PlanKind::Receiving, PlanStatus::Cancelled, &[Waiting]).is_err());
    }

    #[test]
    fn test_start_and_abandon() {
        assert_eq!(
            PlanStateMachine::start(PlanStatus::Scheduled, &[Waiting]),
            Ok(PlanStatus::InProgress)
        );
        assert_eq!(
            PlanStateMachine::start(PlanStatus::Pending, &[Received, Waiting]),
            Ok(PlanStatus::InProgress)
        );
        assert!(PlanStateMachine::start(PlanStatus::Pending, &[]).is_err());
        assert!(PlanStateMachine::start(PlanStatus::InProgress, &[Waiting]).is_err());

        assert_eq!(
            PlanStateMachine::abandon(PlanStatus::Pending, &[Waiting]),
            Ok(PlanStatus::Cancelled)
        );
        assert!(PlanStateMachine::abandon(PlanStatus::Pending, &[Received, Waiting]).is_err());
        assert!(PlanStateMachine::abandon(PlanStatus::InProgress, &[Waiting]).is_err());
    }
}
