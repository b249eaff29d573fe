// ==========================================
// 箱号清单导入集成测试
// ==========================================
// 测试范围:
// 1. CSV（按表头定位箱号列）与 TXT（每行一个）导入
// 2. 不合法/重复行统计
// 3. 从清单文件创建计划
// 4. 不支持的格式、文件不存在、缺少箱号列
// ==========================================

mod helpers;

use helpers::api_test_helper::*;
use std::io::Write;
use std::path::Path;
use tempfile::{Builder, NamedTempFile};
use warehouse_ops::api::ApiError;
use warehouse_ops::domain::types::{PlanKind, PlanStatus};

fn write_temp(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("创建临时文件失败");
    file.write_all(content.as_bytes()).expect("写入临时文件失败");
    file.flush().expect("刷新临时文件失败");
    file
}

#[test]
fn test_import_csv_按表头定位箱号列() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let file = write_temp(
        ".csv",
        "seq,箱号,remark\n1,mscu6639870,a\n2,MSCU6639871,b\n3,TEMU9876540,c\n4,MSCU6639870,d\n",
    );

    let report = env
        .state
        .container_api
        .import_container_list(file.path())
        .unwrap();

    assert_eq!(report.total_rows, 4);
    assert_eq!(report.valid_count, 3);
    assert_eq!(report.invalid_count, 1);
    assert_eq!(report.duplicate_count, 1);
    assert!(report.has_errors());

    // 表头为第 1 行
    let bad = report.rows.iter().find(|r| r.error.is_some()).unwrap();
    assert_eq!(bad.row_number, 3);
    assert_eq!(bad.raw_value, "MSCU6639871");

    let containers: Vec<&str> = report.containers.iter().map(|c| c.as_str()).collect();
    assert_eq!(containers, vec!["MSCU6639870", "TEMU9876540"]);
}

#[test]
fn test_import_txt_每行一个() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let file = write_temp(".txt", "MSCU6639870\n  csqu3054383  \nTEMU9876540\n");

    let report = env
        .state
        .container_api
        .import_container_list(file.path())
        .unwrap();
    assert_eq!(report.total_rows, 3);
    assert_eq!(report.valid_count, 3);
    assert!(!report.has_errors());
    assert_eq!(report.containers[1].as_str(), "CSQU3054383");
}

#[test]
fn test_create_plan_from_file_去重() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let file = write_temp(
        ".csv",
        "container_no\nMSCU6639870\nTEMU9876540\nmscu6639870\n",
    );

    let plan = env
        .state
        .plan_api
        .create_plan_from_file("DP-001", PlanKind::Destuffing, file.path(), OPERATOR)
        .unwrap();
    assert_eq!(plan.status, PlanStatus::Pending);
    assert_eq!(plan.containers.len(), 2);
    assert_eq!(plan.containers[0].container_ref, "MSCU6639870");
    assert_eq!(plan.containers[1].container_ref, "TEMU9876540");
}

#[test]
fn test_create_plan_from_file_存在不合法行时拒绝() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let file = write_temp(".txt", "MSCU6639870\nMSCU6639871\n");

    let result = env.state.plan_api.create_plan_from_file(
        "RP-001",
        PlanKind::Receiving,
        file.path(),
        OPERATOR,
    );
    match result {
        Err(ApiError::InvalidInput(msg)) => assert!(msg.contains('2')),
        other => panic!("Expected InvalidInput, got {:?}", other),
    }
    assert!(env.state.plan_api.list_plans().unwrap().is_empty());
}

#[test]
fn test_import_不支持的格式() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let file = write_temp(".xlsx", "MSCU6639870\n");

    let result = env.state.container_api.import_container_list(file.path());
    assert!(matches!(result, Err(ApiError::ImportError(_))));
}

#[test]
fn test_import_文件不存在() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let result = env
        .state
        .container_api
        .import_container_list(Path::new("/nonexistent/containers.csv"));
    assert!(matches!(result, Err(ApiError::NotFound(_))));
}

#[test]
fn test_import_csv_缺少箱号列() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let file = write_temp(".csv", "seq,remark\n1,a\n");

    let result = env.state.container_api.import_container_list(file.path());
    match result {
        Err(ApiError::ImportError(msg)) => assert!(msg.contains("remark")),
        other => panic!("Expected ImportError, got {:?}", other),
    }
}
