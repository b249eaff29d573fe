// ==========================================
// 仓储作业核心 - 库位 API
// ==========================================
// 职责: 库位编码预览、单个/批量建位、状态与编址变更
// 红线: 派生编码只由 LocationCodec 计算；唯一性以持久层为准
// ==========================================

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::config::config_manager::ConfigManager;
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::location::Location;
use crate::domain::types::{LocationStatus, ZoneType};
use crate::domain::zone::Zone;
use crate::engine::layout_builder::{LayoutBuilder, LayoutPreview, LayoutSpec};
use crate::engine::location_codec::{CodePreview, LocationCodec, LocationFields};
use crate::repository::action_log_repo::ActionLogRepository;
use crate::repository::location_repo::LocationRepository;
use crate::repository::zone_repo::ZoneRepository;

// ==========================================
// LayoutCreateResult - 批量建位结果
// ==========================================
#[derive(Debug, Clone, serde::Serialize)]
pub struct LayoutCreateResult {
    pub zone_id: String,
    pub created_count: usize,
    pub first_code: Option<String>,
    pub last_code: Option<String>,
}

// ==========================================
// LocationApi - 库位 API
// ==========================================
pub struct LocationApi {
    zone_repo: Arc<ZoneRepository>,
    location_repo: Arc<LocationRepository>,
    action_log_repo: Arc<ActionLogRepository>,
    config_manager: Arc<ConfigManager>,
}

impl LocationApi {
    pub fn new(
        zone_repo: Arc<ZoneRepository>,
        location_repo: Arc<LocationRepository>,
        action_log_repo: Arc<ActionLogRepository>,
        config_manager: Arc<ConfigManager>,
    ) -> Self {
        Self {
            zone_repo,
            location_repo,
            action_log_repo,
            config_manager,
        }
    }

    // ==========================================
    // 编码预览
    // ==========================================

    /// 实时预览库位编码（字段未填全时返回 Pending，不报错）
    pub fn preview_code(&self, zone_id: &str, fields: &LocationFields) -> ApiResult<CodePreview> {
        let zone = self.load_zone(zone_id)?;
        Ok(LocationCodec::preview(&zone.code, zone.zone_type, fields))
    }

    // ==========================================
    // 单个库位
    // ==========================================

    /// 创建库位
    ///
    /// # 返回
    /// - Err(LocationCode): 字段缺失或格式错误
    /// - Err(Conflict): 全局编码已被占用（含其他库区）
    pub fn create_location(
        &self,
        zone_id: &str,
        fields: &LocationFields,
        operator: &str,
    ) -> ApiResult<Location> {
        let zone = self.load_active_zone(zone_id)?;
        let addressing = LocationCodec::parse_fields(zone.zone_type, fields)?;

        let now = chrono::Utc::now().naive_utc();
        let location = Location {
            location_id: uuid::Uuid::new_v4().to_string(),
            zone_id: zone.zone_id.clone(),
            zone_code: zone.code.clone(),
            addressing,
            status: LocationStatus::Active,
            created_at: now,
            updated_at: now,
        };
        self.location_repo.insert(&location)?;

        let codes = location.codes();
        info!(location_id = %location.location_id, absolute_code = %codes.absolute_code, "库位已创建");
        self.record(ActionLog::new(
            ActionType::CreateLocation,
            Some(location.location_id.clone()),
            operator,
            Some(serde_json::json!({
                "zone_id": zone.zone_id,
                "absolute_code": codes.absolute_code,
            })),
            None,
        ));
        Ok(location)
    }

    /// 查询库位
    pub fn get_location(&self, location_id: &str) -> ApiResult<Location> {
        self.location_repo
            .find_by_id(location_id)?
            .ok_or_else(|| ApiError::NotFound(format!("库位(id={})不存在", location_id)))
    }

    /// 按全局编码查询库位
    pub fn find_by_absolute_code(&self, absolute_code: &str) -> ApiResult<Option<Location>> {
        Ok(self
            .location_repo
            .find_by_absolute_code(&absolute_code.trim().to_uppercase())?)
    }

    /// 查询库区下全部库位
    pub fn list_locations(&self, zone_id: &str) -> ApiResult<Vec<Location>> {
        self.load_zone(zone_id)?;
        Ok(self.location_repo.find_by_zone(zone_id)?)
    }

    /// 变更库位状态（启用/停用/锁定）
    pub fn update_location_status(
        &self,
        location_id: &str,
        status: LocationStatus,
        operator: &str,
    ) -> ApiResult<Location> {
        let mut location = self.get_location(location_id)?;
        if location.status == status {
            return Ok(location);
        }

        let now = chrono::Utc::now().naive_utc();
        self.location_repo.update_status(location_id, status, now)?;
        info!(location_id = %location_id, from = %location.status, to = %status, "库位状态已变更");
        self.record(ActionLog::new(
            ActionType::UpdateLocationStatus,
            Some(location_id.to_string()),
            operator,
            Some(serde_json::json!({
                "from": location.status.to_db_str(),
                "to": status.to_db_str(),
            })),
            None,
        ));

        location.status = status;
        location.updated_at = now;
        Ok(location)
    }

    /// 变更库位编址并重算编码
    ///
    /// 仅停用状态的库位允许修改编址；锁定或启用中的库位拒绝
    pub fn update_location_address(
        &self,
        location_id: &str,
        fields: &LocationFields,
        operator: &str,
    ) -> ApiResult<Location> {
        let mut location = self.get_location(location_id)?;
        if !location.status.allows_address_change() {
            return Err(ApiError::BusinessRuleViolation(format!(
                "库位{}当前状态为{}，需先停用才能修改编址",
                location.codes().absolute_code,
                location.status
            )));
        }

        let zone = self.load_zone(&location.zone_id)?;
        let addressing = LocationCodec::parse_fields(zone.zone_type, fields)?;
        let old_codes = location.codes();
        let new_codes = LocationCodec::codes_for(&zone.code, &addressing);
        if old_codes == new_codes {
            return Ok(location);
        }

        let now = chrono::Utc::now().naive_utc();
        // 以读取时的状态为前置条件，期间被重新启用/锁定时返回 Conflict
        self.location_repo.update_addressing(
            location_id,
            location.status,
            &addressing,
            &new_codes,
            now,
        )?;
        info!(
            location_id = %location_id,
            from = %old_codes.absolute_code,
            to = %new_codes.absolute_code,
            "库位编址已变更"
        );
        self.record(ActionLog::new(
            ActionType::UpdateLocationAddress,
            Some(location_id.to_string()),
            operator,
            Some(serde_json::json!({
                "from": old_codes.absolute_code,
                "to": new_codes.absolute_code,
            })),
            None,
        ));

        location.addressing = addressing;
        location.zone_code = zone.code;
        location.updated_at = now;
        Ok(location)
    }

    // ==========================================
    // 批量布局
    // ==========================================

    /// 预览布局: 前 N 个编码与总数
    ///
    /// # 参数
    /// - limit: 预览条数，None 时取配置 layout.preview_limit
    pub fn preview_layout(
        &self,
        zone_id: &str,
        spec: &LayoutSpec,
        limit: Option<usize>,
    ) -> ApiResult<LayoutPreview> {
        let zone = self.load_rbs_zone(zone_id)?;
        let limit = match limit {
            Some(v) => v,
            None => self.preview_limit()?,
        };
        let builder = LayoutBuilder::new(self.max_total()?);
        Ok(builder.preview(&zone.code, spec, limit)?)
    }

    /// 按布局批量建位
    ///
    /// # 流程
    /// 1. 校验布局（含配置上限），不通过则不生成任何单元格
    /// 2. 与库区已有编码比对，存在冲突时整体拒绝并列出冲突编码
    /// 3. 单事务批量写入（并发插入导致的唯一约束冲突同样整体回滚）
    pub fn create_layout(
        &self,
        zone_id: &str,
        spec: &LayoutSpec,
        operator: &str,
    ) -> ApiResult<LayoutCreateResult> {
        let zone = self.load_rbs_zone(zone_id)?;
        if !zone.is_active() {
            return Err(ApiError::BusinessRuleViolation(format!(
                "库区{}已停用，不能新建库位",
                zone.code
            )));
        }

        let builder = LayoutBuilder::new(self.max_total()?);
        let requests = builder.expand(&zone.code, spec)?;

        let existing = self.location_repo.list_location_codes(&zone.zone_id)?;
        let conflicts = LayoutBuilder::detect_conflicts(&requests, &existing);
        if !conflicts.is_empty() {
            warn!(zone_id = %zone.zone_id, conflict_count = conflicts.len(), "批量建位存在编码冲突");
            return Err(ApiError::Conflict(format!(
                "库区{}已存在{}个同编码库位: {}",
                zone.code,
                conflicts.len(),
                preview_list(&conflicts)
            )));
        }

        let now = chrono::Utc::now().naive_utc();
        let locations: Vec<Location> = requests
            .into_iter()
            .map(|req| Location {
                location_id: uuid::Uuid::new_v4().to_string(),
                zone_id: zone.zone_id.clone(),
                zone_code: req.zone_code,
                addressing: req.addressing,
                status: LocationStatus::Active,
                created_at: now,
                updated_at: now,
            })
            .collect();

        let created_count = self.location_repo.batch_insert(&locations)?;
        let first_code = locations.first().map(|l| l.codes().absolute_code);
        let last_code = locations.last().map(|l| l.codes().absolute_code);

        info!(zone_id = %zone.zone_id, created_count, "批量建位完成");
        self.record(ActionLog::new(
            ActionType::CreateLayout,
            Some(zone.zone_id.clone()),
            operator,
            Some(serde_json::json!({
                "layout": spec,
                "created_count": created_count,
            })),
            None,
        ));

        Ok(LayoutCreateResult {
            zone_id: zone.zone_id,
            created_count,
            first_code,
            last_code,
        })
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    fn load_zone(&self, zone_id: &str) -> ApiResult<Zone> {
        self.zone_repo
            .find_by_id(zone_id)?
            .ok_or_else(|| ApiError::NotFound(format!("库区(id={})不存在", zone_id)))
    }

    fn load_active_zone(&self, zone_id: &str) -> ApiResult<Zone> {
        let zone = self.load_zone(zone_id)?;
        if !zone.is_active() {
            return Err(ApiError::BusinessRuleViolation(format!(
                "库区{}已停用，不能新建库位",
                zone.code
            )));
        }
        Ok(zone)
    }

    fn load_rbs_zone(&self, zone_id: &str) -> ApiResult<Zone> {
        let zone = self.load_zone(zone_id)?;
        if zone.zone_type != ZoneType::Rbs {
            return Err(ApiError::InvalidInput(format!(
                "库区{}为{}编址，批量布局仅支持 RBS 库区",
                zone.code, zone.zone_type
            )));
        }
        Ok(zone)
    }

    fn max_total(&self) -> ApiResult<u64> {
        let max = self
            .config_manager
            .layout_max_total()
            .map_err(|e| ApiError::InternalError(format!("读取配置失败: {}", e)))?;
        debug!(max_total = max, "批量建位上限");
        Ok(max)
    }

    fn preview_limit(&self) -> ApiResult<usize> {
        self.config_manager
            .layout_preview_limit()
            .map_err(|e| ApiError::InternalError(format!("读取配置失败: {}", e)))
    }

    // 记录ActionLog，失败时只记录警告（不影响主要操作）
    fn record(&self, log: ActionLog) {
        if let Err(e) = self.action_log_repo.insert(&log) {
            warn!(error = %e, action_type = %log.action_type, "记录操作日志失败");
        }
    }
}

/// 冲突编码过多时只列出前 10 个
fn preview_list(codes: &[String]) -> String {
    const MAX_LISTED: usize = 10;
    let mut listed = codes
        .iter()
        .take(MAX_LISTED)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ");
    if codes.len() > MAX_LISTED {
        listed.push_str(" ...");
    }
    listed
}
