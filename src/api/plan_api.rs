// ==========================================
// 仓储作业核心 - 作业计划 API
// ==========================================
// 职责: 计划创建、执行、箱状态更新、计划级操作（撤销/完成/退回/作废）
// 红线: 每次操作都基于刚读取的箱状态快照重新求值守卫；
//       目标状态只来自 PlanStateMachine，本层只负责持久化与留痕；
//       写入以快照为前置条件（乐观锁），快照过期返回 Conflict
// ==========================================

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::plan::{Plan, PlanContainer};
use crate::domain::types::{ContainerStatus, PlanAction, PlanKind, PlanStatus};
use crate::engine::container_number::ContainerNumberValidator;
use crate::engine::plan_state_machine::{PlanActions, PlanStateMachine};
use crate::importer::container_list::ContainerListImporter;
use crate::repository::action_log_repo::ActionLogRepository;
use crate::repository::plan_repo::PlanRepository;

// ==========================================
// PlanApi - 作业计划 API
// ==========================================
pub struct PlanApi {
    plan_repo: Arc<PlanRepository>,
    action_log_repo: Arc<ActionLogRepository>,
}

impl PlanApi {
    pub fn new(plan_repo: Arc<PlanRepository>, action_log_repo: Arc<ActionLogRepository>) -> Self {
        Self {
            plan_repo,
            action_log_repo,
        }
    }

    // ==========================================
    // 创建
    // ==========================================

    /// 创建作业计划
    ///
    /// # 参数
    /// - code: 计划编号（唯一）
    /// - kind: 收箱/拆箱
    /// - container_refs: 箱号列表（逐个规范化并校验）
    ///
    /// # 返回
    /// - Err(ContainerBatchValidation): 任一箱号不合法（列出全部失败项）
    /// - Err(InvalidInput): 计划编号为空、箱号为空、规范化后重复
    /// - Err(Conflict): 计划编号已存在
    pub fn create_plan(
        &self,
        code: &str,
        kind: PlanKind,
        container_refs: &[String],
        operator: &str,
    ) -> ApiResult<Plan> {
        let code = code.trim();
        if code.is_empty() {
            return Err(ApiError::InvalidInput("计划编号不能为空".to_string()));
        }
        if container_refs.is_empty() {
            return Err(ApiError::InvalidInput("计划至少需要一个箱号".to_string()));
        }

        let checks = ContainerNumberValidator::validate_batch(container_refs);
        let failures: Vec<_> = checks.iter().filter(|c| !c.is_valid()).cloned().collect();
        if !failures.is_empty() {
            return Err(ApiError::ContainerBatchValidation {
                reason: format!("{}/{}个箱号不合法", failures.len(), checks.len()),
                failures,
            });
        }

        let mut seen = HashSet::new();
        let mut normalized = Vec::with_capacity(checks.len());
        for check in checks {
            if let Ok(number) = check.result {
                if !seen.insert(number.as_str().to_string()) {
                    return Err(ApiError::InvalidInput(format!(
                        "箱号重复: {}（第{}项）",
                        number,
                        check.index + 1
                    )));
                }
                normalized.push(number.into_inner());
            }
        }

        self.persist_new_plan(code, kind, normalized, operator)
    }

    /// 从箱号清单文件创建计划
    ///
    /// 清单中重复的箱号只保留首次出现；存在不合法行时整体拒绝
    pub fn create_plan_from_file(
        &self,
        code: &str,
        kind: PlanKind,
        file_path: &Path,
        operator: &str,
    ) -> ApiResult<Plan> {
        let report = ContainerListImporter::import_file(file_path)?;
        if report.has_errors() {
            let rows: Vec<String> = report
                .rows
                .iter()
                .filter(|r| r.error.is_some())
                .map(|r| r.row_number.to_string())
                .collect();
            return Err(ApiError::InvalidInput(format!(
                "箱号清单存在{}行不合法（行号: {}）",
                report.invalid_count,
                rows.join(", ")
            )));
        }

        let refs: Vec<String> = report
            .containers
            .into_iter()
            .map(|n| n.into_inner())
            .collect();
        self.create_plan(code, kind, &refs, operator)
    }

    // ==========================================
    // 查询
    // ==========================================

    pub fn get_plan(&self, plan_id: &str) -> ApiResult<Plan> {
        self.plan_repo
            .find_by_id(plan_id)?
            .ok_or_else(|| ApiError::NotFound(format!("计划(id={})不存在", plan_id)))
    }

    pub fn list_plans(&self) -> ApiResult<Vec<Plan>> {
        Ok(self.plan_repo.list_all()?)
    }

    /// 求值三个计划级守卫（终态计划全部为 false）
    pub fn evaluate_actions(&self, plan_id: &str) -> ApiResult<PlanActions> {
        let plan = self.get_plan(plan_id)?;
        if plan.status.is_terminal() {
            return Ok(PlanActions::default());
        }
        Ok(PlanStateMachine::evaluate(plan.kind, &plan.container_statuses()))
    }

    // ==========================================
    // 执行
    // ==========================================

    /// 开始执行: PENDING/SCHEDULED → IN_PROGRESS
    pub fn start_plan(&self, plan_id: &str, operator: &str) -> ApiResult<Plan> {
        let plan = self.get_plan(plan_id)?;
        let next = PlanStateMachine::start(plan.status, &plan.container_statuses())?;
        self.persist_plan_status(plan, next, ActionType::StartPlan, operator)
    }

    /// 更新计划内箱状态
    ///
    /// 计划须处于 IN_PROGRESS；转换规则按计划类型判定
    pub fn update_container_status(
        &self,
        plan_id: &str,
        container_id: &str,
        to: ContainerStatus,
        operator: &str,
    ) -> ApiResult<Plan> {
        let mut plan = self.get_plan(plan_id)?;
        if plan.status != PlanStatus::InProgress {
            return Err(ApiError::BusinessRuleViolation(format!(
                "计划{}当前状态为{}，只有执行中的计划可以更新箱状态",
                plan.code, plan.status
            )));
        }

        let container = plan.find_container(container_id).ok_or_else(|| {
            ApiError::NotFound(format!("计划{}中不存在箱明细(id={})", plan.code, container_id))
        })?;
        let from = container.status;
        let container_ref = container.container_ref.clone();
        let to = PlanStateMachine::transition_container(plan.kind, from, to)?;

        // 写入以快照中的箱状态与计划状态为前置条件，并发修改时返回 Conflict
        let now = chrono::Utc::now().naive_utc();
        let revision = self.plan_repo.update_container_status(
            plan_id,
            container_id,
            plan.status,
            from,
            to,
            now,
        )?;

        info!(plan_id = %plan_id, container = %container_ref, from = %from, to = %to, "箱状态已更新");
        self.record(ActionLog::new(
            ActionType::UpdateContainerStatus,
            Some(plan_id.to_string()),
            operator,
            Some(serde_json::json!({
                "container_id": container_id,
                "container_ref": container_ref,
                "from": from.to_db_str(),
                "to": to.to_db_str(),
            })),
            None,
        ));

        if let Some(c) = plan.containers.iter_mut().find(|c| c.container_id == container_id) {
            c.status = to;
        }
        plan.updated_at = now;
        plan.revision = revision;
        Ok(plan)
    }

    // ==========================================
    // 计划级操作
    // ==========================================

    /// 撤销执行（所有箱仍在等待时）
    pub fn cancel_plan(&self, plan_id: &str, operator: &str) -> ApiResult<Plan> {
        self.apply_action(plan_id, PlanAction::Cancel, operator)
    }

    /// 标记完成（所有箱达到完成状态时）
    pub fn mark_plan_done(&self, plan_id: &str, operator: &str) -> ApiResult<Plan> {
        self.apply_action(plan_id, PlanAction::MarkDone, operator)
    }

    /// 退回待处理（部分已处理、部分仍等待时）
    pub fn mark_plan_pending(&self, plan_id: &str, operator: &str) -> ApiResult<Plan> {
        self.apply_action(plan_id, PlanAction::MarkPending, operator)
    }

    /// 作废未开始的计划 → CANCELLED
    pub fn abandon_plan(&self, plan_id: &str, operator: &str) -> ApiResult<Plan> {
        let plan = self.get_plan(plan_id)?;
        let next = PlanStateMachine::abandon(plan.status, &plan.container_statuses())?;
        self.persist_plan_status(plan, next, ActionType::AbandonPlan, operator)
    }

    /// 查询计划操作历史
    pub fn get_plan_history(&self, plan_id: &str) -> ApiResult<Vec<ActionLog>> {
        Ok(self.action_log_repo.find_by_target(plan_id)?)
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    fn apply_action(&self, plan_id: &str, action: PlanAction, operator: &str) -> ApiResult<Plan> {
        // 重新读取快照，避免基于过期状态判定
        let plan = self.get_plan(plan_id)?;
        let next = PlanStateMachine::apply(plan.kind, action, plan.status, &plan.container_statuses())?;
        let action_type = match action {
            PlanAction::Cancel => ActionType::CancelPlan,
            PlanAction::MarkDone => ActionType::MarkPlanDone,
            PlanAction::MarkPending => ActionType::MarkPlanPending,
        };
        self.persist_plan_status(plan, next, action_type, operator)
    }

    fn persist_plan_status(
        &self,
        mut plan: Plan,
        next: PlanStatus,
        action_type: ActionType,
        operator: &str,
    ) -> ApiResult<Plan> {
        let from = plan.status;
        let now = chrono::Utc::now().naive_utc();
        // revision 与快照不一致（期间有箱或计划状态变更）时返回 Conflict
        let revision = self
            .plan_repo
            .update_status(&plan.plan_id, plan.revision, next, now)?;

        info!(plan_id = %plan.plan_id, code = %plan.code, from = %from, to = %next, action = action_type.as_str(), "计划状态已变更");
        self.record(ActionLog::new(
            action_type,
            Some(plan.plan_id.clone()),
            operator,
            Some(serde_json::json!({
                "from": from.to_db_str(),
                "to": next.to_db_str(),
            })),
            None,
        ));

        plan.status = next;
        plan.updated_at = now;
        plan.revision = revision;
        Ok(plan)
    }

    fn persist_new_plan(
        &self,
        code: &str,
        kind: PlanKind,
        container_refs: Vec<String>,
        operator: &str,
    ) -> ApiResult<Plan> {
        let plan_id = uuid::Uuid::new_v4().to_string();
        let now = chrono::Utc::now().naive_utc();
        let containers = container_refs
            .into_iter()
            .map(|container_ref| PlanContainer {
                container_id: uuid::Uuid::new_v4().to_string(),
                plan_id: plan_id.clone(),
                container_ref,
                status: ContainerStatus::Waiting,
            })
            .collect();

        let plan = Plan {
            plan_id,
            code: code.to_string(),
            kind,
            status: PlanStatus::Pending,
            containers,
            created_by: operator.to_string(),
            created_at: now,
            updated_at: now,
            revision: 0,
        };
        self.plan_repo.insert(&plan)?;

        info!(plan_id = %plan.plan_id, code = %plan.code, kind = %plan.kind, containers = plan.containers.len(), "计划已创建");
        self.record(ActionLog::new(
            ActionType::CreatePlan,
            Some(plan.plan_id.clone()),
            operator,
            Some(serde_json::json!({
                "code": plan.code,
                "kind": plan.kind.to_db_str(),
                "containers": plan.containers.iter().map(|c| &c.container_ref).collect::<Vec<_>>(),
            })),
            None,
        ));
        Ok(plan)
    }

    // 记录ActionLog，失败时只记录警告（不影响主要操作）
    fn record(&self, log: ActionLog) {
        if let Err(e) = self.action_log_repo.insert(&log) {
            warn!(error = %e, action_type = %log.action_type, "记录操作日志失败");
        }
    }
}
