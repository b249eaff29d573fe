// ==========================================
// ZoneApi 集成测试
// ==========================================
// 测试范围:
// 1. 库区代码规范化与唯一性
// 2. 启停状态
// 3. 删除保护（名下有库位时拒绝）
// ==========================================

mod helpers;

use helpers::api_test_helper::*;
use warehouse_ops::api::ApiError;
use warehouse_ops::domain::types::{ZoneStatus, ZoneType};
use warehouse_ops::engine::LocationFields;

#[test]
fn test_create_zone_代码规范化() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    let zone = env
        .state
        .zone_api
        .create_zone(" ge ", "通用区", ZoneType::Rbs, OPERATOR)
        .expect("创建库区失败");

    assert_eq!(zone.code, "GE");
    assert_eq!(zone.status, ZoneStatus::Active);

    let zones = env.state.zone_api.list_zones().unwrap();
    assert_eq!(zones.len(), 1);
}

#[test]
fn test_create_zone_非法代码() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    for bad in ["", "ABC", "1A", "G-"] {
        let result = env
            .state
            .zone_api
            .create_zone(bad, "坏代码", ZoneType::Rbs, OPERATOR);
        assert!(matches!(result, Err(ApiError::InvalidInput(_))), "{:?} 应被拒绝", bad);
    }
}

#[test]
fn test_create_zone_代码重复返回冲突() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    env.create_rbs_zone("GE");

    let result = env
        .state
        .zone_api
        .create_zone("ge", "重复", ZoneType::Custom, OPERATOR);
    assert!(matches!(result, Err(ApiError::Conflict(_))));
}

#[test]
fn test_set_zone_status() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let zone = env.create_rbs_zone("GE");

    let updated = env
        .state
        .zone_api
        .set_zone_status(&zone.zone_id, ZoneStatus::Inactive, OPERATOR)
        .unwrap();
    assert_eq!(updated.status, ZoneStatus::Inactive);

    // 停用库区不能新建库位
    let result = env.state.location_api.create_location(
        &zone.zone_id,
        &LocationFields::rbs("1", "1", "1"),
        OPERATOR,
    );
    assert!(matches!(result, Err(ApiError::BusinessRuleViolation(_))));
}

#[test]
fn test_delete_zone_有库位时拒绝() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let zone = env.create_rbs_zone("GE");
    let location = env
        .state
        .location_api
        .create_location(&zone.zone_id, &LocationFields::rbs("1", "1", "1"), OPERATOR)
        .unwrap();
    assert_eq!(location.codes().absolute_code, "GER-R01B01S01");

    let result = env.state.zone_api.delete_zone(&zone.zone_id, OPERATOR);
    assert!(matches!(result, Err(ApiError::BusinessRuleViolation(_))));

    let empty = env.create_custom_zone("DG");
    env.state.zone_api.delete_zone(&empty.zone_id, OPERATOR).unwrap();
    assert!(matches!(
        env.state.zone_api.get_zone(&empty.zone_id),
        Err(ApiError::NotFound(_))
    ));
}

#[test]
fn test_zone_操作留痕() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let zone = env.create_rbs_zone("GE");
    env.state
        .zone_api
        .set_zone_status(&zone.zone_id, ZoneStatus::Inactive, OPERATOR)
        .unwrap();

    let logs = env.state.action_log_repo.find_by_target(&zone.zone_id).unwrap();
    let types: Vec<_> = logs.iter().map(|l| l.action_type.as_str()).collect();
    assert_eq!(types, vec!["CreateZone", "UpdateZoneStatus"]);
    assert!(logs.iter().all(|l| l.actor == OPERATOR));
}
