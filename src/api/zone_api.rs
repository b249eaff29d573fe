// ==========================================
// 仓储作业核心 - 库区 API
// ==========================================
// 职责: 库区创建、启停、删除
// 红线: 库区代码创建后不可修改；名下有库位时不可删除
// ==========================================

use std::sync::Arc;
use tracing::{info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::types::{ZoneStatus, ZoneType};
use crate::domain::zone::Zone;
use crate::repository::action_log_repo::ActionLogRepository;
use crate::repository::error::RepositoryError;
use crate::repository::location_repo::LocationRepository;
use crate::repository::zone_repo::ZoneRepository;

// ==========================================
// ZoneApi - 库区 API
// ==========================================
pub struct ZoneApi {
    zone_repo: Arc<ZoneRepository>,
    location_repo: Arc<LocationRepository>,
    action_log_repo: Arc<ActionLogRepository>,
}

impl ZoneApi {
    pub fn new(
        zone_repo: Arc<ZoneRepository>,
        location_repo: Arc<LocationRepository>,
        action_log_repo: Arc<ActionLogRepository>,
    ) -> Self {
        Self {
            zone_repo,
            location_repo,
            action_log_repo,
        }
    }

    /// 规范化库区代码: 去首尾空白、转大写，必须为 1-2 位字母
    pub fn normalize_zone_code(raw: &str) -> ApiResult<String> {
        let code = raw.trim().to_uppercase();
        let len = code.chars().count();
        if !(1..=2).contains(&len) || !code.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ApiError::InvalidInput(format!(
                "库区代码必须为 1-2 位字母: '{}'",
                raw
            )));
        }
        Ok(code)
    }

    /// 创建库区
    ///
    /// # 返回
    /// - Err(Conflict): 库区代码已存在
    pub fn create_zone(
        &self,
        code: &str,
        name: &str,
        zone_type: ZoneType,
        operator: &str,
    ) -> ApiResult<Zone> {
        let code = Self::normalize_zone_code(code)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(ApiError::InvalidInput("库区名称不能为空".to_string()));
        }

        let zone = Zone {
            zone_id: uuid::Uuid::new_v4().to_string(),
            code,
            name: name.to_string(),
            zone_type,
            status: ZoneStatus::Active,
            created_at: chrono::Utc::now().naive_utc(),
        };
        self.zone_repo.insert(&zone)?;

        info!(zone_id = %zone.zone_id, code = %zone.code, zone_type = %zone.zone_type, "库区已创建");
        self.record(ActionLog::new(
            ActionType::CreateZone,
            Some(zone.zone_id.clone()),
            operator,
            Some(serde_json::json!({
                "code": zone.code,
                "name": zone.name,
                "zone_type": zone.zone_type.to_db_str(),
            })),
            None,
        ));
        Ok(zone)
    }

    /// 查询库区
    pub fn get_zone(&self, zone_id: &str) -> ApiResult<Zone> {
        self.zone_repo
            .find_by_id(zone_id)?
            .ok_or_else(|| ApiError::NotFound(format!("库区(id={})不存在", zone_id)))
    }

    /// 查询全部库区
    pub fn list_zones(&self) -> ApiResult<Vec<Zone>> {
        Ok(self.zone_repo.list_all()?)
    }

    /// 启用/停用库区
    pub fn set_zone_status(&self, zone_id: &str, status: ZoneStatus, operator: &str) -> ApiResult<Zone> {
        let mut zone = self.get_zone(zone_id)?;
        if zone.status == status {
            return Ok(zone);
        }

        self.zone_repo.update_status(zone_id, status)?;
        info!(zone_id = %zone_id, from = %zone.status, to = %status, "库区状态已变更");
        self.record(ActionLog::new(
            ActionType::UpdateZoneStatus,
            Some(zone_id.to_string()),
            operator,
            Some(serde_json::json!({
                "from": zone.status.to_db_str(),
                "to": status.to_db_str(),
            })),
            None,
        ));

        zone.status = status;
        Ok(zone)
    }

    /// 删除库区
    ///
    /// # 返回
    /// - Err(BusinessRuleViolation): 名下仍有库位
    pub fn delete_zone(&self, zone_id: &str, operator: &str) -> ApiResult<()> {
        let zone = self.get_zone(zone_id)?;

        let location_count = self.location_repo.count_by_zone(zone_id)?;
        if location_count > 0 {
            return Err(ApiError::BusinessRuleViolation(format!(
                "库区{}下仍有{}个库位，不能删除",
                zone.code, location_count
            )));
        }

        // 预检与删除之间若有新库位写入，外键约束兜底
        match self.zone_repo.delete(zone_id) {
            Ok(()) => {}
            Err(RepositoryError::ForeignKeyViolation(_)) => {
                return Err(ApiError::BusinessRuleViolation(format!(
                    "库区{}下仍有库位，不能删除",
                    zone.code
                )));
            }
            Err(e) => return Err(e.into()),
        }

        info!(zone_id = %zone_id, code = %zone.code, "库区已删除");
        self.record(ActionLog::new(
            ActionType::DeleteZone,
            Some(zone_id.to_string()),
            operator,
            Some(serde_json::json!({ "code": zone.code })),
            None,
        ));
        Ok(())
    }

    // 记录ActionLog，失败时只记录警告（不影响主要操作）
    fn record(&self, log: ActionLog) {
        if let Err(e) = self.action_log_repo.insert(&log) {
            warn!(error = %e, action_type = %log.action_type, "记录操作日志失败");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_zone_code() {
        assert_eq!(ZoneApi::normalize_zone_code(" ge ").unwrap(), "GE");
        assert_eq!(ZoneApi::normalize_zone_code("a").unwrap(), "A");
        assert!(ZoneApi::normalize_zone_code("").is_err());
        assert!(ZoneApi::normalize_zone_code("ABC").is_err());
        assert!(ZoneApi::normalize_zone_code("A1").is_err());
    }
}
