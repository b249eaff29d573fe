// ==========================================
// 并发控制测试
// ==========================================
// 职责: 验证计划/箱状态写入的乐观锁
// 场景:
// 1. 同一 WAITING 箱被并发改为 RECEIVED 与 REJECTED，只能有一方成功
// 2. 撤销计划与箱处理并发，只能有一方成功且结果自洽
// ==========================================

mod helpers;

use helpers::api_test_helper::*;
use std::sync::{Arc, Barrier};
use std::thread;
use warehouse_ops::api::{ApiError, ApiResult, PlanApi};
use warehouse_ops::domain::plan::Plan;
use warehouse_ops::domain::types::{ContainerStatus, PlanKind, PlanStatus};

const RUNS: usize = 50;

fn started_plan(api: &PlanApi, code: &str, containers: &[&str]) -> Plan {
    let refs: Vec<String> = containers.iter().map(|c| c.to_string()).collect();
    let plan = api
        .create_plan(code, PlanKind::Receiving, &refs, OPERATOR)
        .expect("创建计划失败");
    api.start_plan(&plan.plan_id, OPERATOR).expect("开始计划失败")
}

/// 两个线程在同一屏障后同时执行
fn race<A, B>(first: A, second: B) -> (ApiResult<Plan>, ApiResult<Plan>)
where
    A: FnOnce() -> ApiResult<Plan> + Send + 'static,
    B: FnOnce() -> ApiResult<Plan> + Send + 'static,
{
    let barrier = Arc::new(Barrier::new(2));

    let b1 = barrier.clone();
    let h1 = thread::spawn(move || {
        b1.wait();
        first()
    });
    let b2 = barrier;
    let h2 = thread::spawn(move || {
        b2.wait();
        second()
    });

    (
        h1.join().expect("线程1 panic"),
        h2.join().expect("线程2 panic"),
    )
}

// ==========================================
// 测试1: 同一箱的并发状态更新
// ==========================================

#[test]
fn test_concurrent_container_update_只有一方成功() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let api = env.state.plan_api.clone();

    for run in 0..RUNS {
        let plan = started_plan(&api, &format!("RP-{:03}", run), &["MSCU6639870"]);
        let container_id = plan.containers[0].container_id.clone();

        let (api1, plan_id1, cid1) = (api.clone(), plan.plan_id.clone(), container_id.clone());
        let (api2, plan_id2, cid2) = (api.clone(), plan.plan_id.clone(), container_id.clone());
        let (received, rejected) = race(
            move || api1.update_container_status(&plan_id1, &cid1, ContainerStatus::Received, OPERATOR),
            move || api2.update_container_status(&plan_id2, &cid2, ContainerStatus::Rejected, OPERATOR),
        );

        assert!(
            received.is_ok() != rejected.is_ok(),
            "第{}轮: 两次更新必须恰好一次成功 (received={:?}, rejected={:?})",
            run,
            received.as_ref().map(|_| ()),
            rejected.as_ref().map(|_| ())
        );

        // 落败方: 快照过期 (Conflict) 或读到新状态后被状态机拒绝
        let (winner, loser) = if received.is_ok() {
            (ContainerStatus::Received, rejected)
        } else {
            (ContainerStatus::Rejected, received)
        };
        assert!(matches!(
            loser,
            Err(ApiError::Conflict(_)) | Err(ApiError::PlanTransition(_))
        ));

        let stored = api.get_plan(&plan.plan_id).unwrap();
        assert_eq!(stored.containers[0].status, winner);
    }
}

// ==========================================
// 测试2: 撤销计划与箱处理并发
// ==========================================

#[test]
fn test_concurrent_cancel_and_container_update() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let api = env.state.plan_api.clone();

    for run in 0..RUNS {
        let plan = started_plan(
            &api,
            &format!("RP-{:03}", run),
            &["MSCU6639870", "TEMU9876540"],
        );
        let container_id = plan.containers[0].container_id.clone();

        let (api1, plan_id1) = (api.clone(), plan.plan_id.clone());
        let (api2, plan_id2) = (api.clone(), plan.plan_id.clone());
        let (cancelled, processed) = race(
            move || api1.cancel_plan(&plan_id1, OPERATOR),
            move || {
                api2.update_container_status(&plan_id2, &container_id, ContainerStatus::Received, OPERATOR)
            },
        );

        assert!(
            cancelled.is_ok() != processed.is_ok(),
            "第{}轮: 撤销与箱处理必须恰好一方成功",
            run
        );

        let stored = api.get_plan(&plan.plan_id).unwrap();
        if cancelled.is_ok() {
            // 撤销成功: 计划回到已排期，所有箱仍在等待
            assert_eq!(stored.status, PlanStatus::Scheduled);
            assert!(stored
                .containers
                .iter()
                .all(|c| c.status == ContainerStatus::Waiting));
            assert!(matches!(
                processed,
                Err(ApiError::Conflict(_)) | Err(ApiError::BusinessRuleViolation(_))
            ));
        } else {
            // 箱处理成功: 计划保持执行中
            assert_eq!(stored.status, PlanStatus::InProgress);
            assert_eq!(stored.containers[0].status, ContainerStatus::Received);
            assert!(matches!(
                cancelled,
                Err(ApiError::Conflict(_)) | Err(ApiError::PlanTransition(_))
            ));
        }
    }
}
