// ==========================================
// 仓储作业核心 - 批量布局生成器
// ==========================================
// 职责: 将 行×贝×位 矩阵展开为有序的库位创建请求
// 顺序: 行(外) → 贝(中) → 位(内)，均从 1 起编号并补零到两位
// 红线: 不与已有数据去重（唯一性由持久层保证）；超过上限时在生成前拒绝
// ==========================================

use crate::domain::location::{LocationAddressing, LocationCodes, RbsIndex};
use crate::engine::error::LayoutValidationError;
use crate::engine::location_codec::LocationCodec;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 单次布局默认生成上限
pub const DEFAULT_MAX_TOTAL: u64 = 10_000;

/// 预览默认条数
pub const DEFAULT_PREVIEW_LIMIT: usize = 5;

// ==========================================
// 布局请求结构: { rows: [{ bays: [{ slotsCount }] }] }
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutSpec {
    pub rows: Vec<LayoutRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutRow {
    pub bays: Vec<LayoutBay>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutBay {
    pub slots_count: i64,
}

impl LayoutSpec {
    /// 规则矩阵: rows 行，每行 bays 贝，每贝 slots 位
    pub fn uniform(rows: usize, bays: usize, slots: i64) -> Self {
        Self {
            rows: (0..rows)
                .map(|_| LayoutRow {
                    bays: vec![LayoutBay { slots_count: slots }; bays],
                })
                .collect(),
        }
    }
}

// ==========================================
// LocationCreateRequest - 单个库位创建请求
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationCreateRequest {
    pub zone_code: String,
    pub addressing: LocationAddressing,
    pub codes: LocationCodes,
}

impl LocationCreateRequest {
    pub fn new(zone_code: &str, addressing: LocationAddressing) -> Self {
        Self {
            codes: LocationCodec::codes_for(zone_code, &addressing),
            zone_code: zone_code.to_string(),
            addressing,
        }
    }
}

// ==========================================
// LayoutPreview - 布局预览
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutPreview {
    pub sample_codes: Vec<String>, // 前 N 个 absolute_code
    pub total: u64,                // 总生成数
    pub exceeds_limit: bool,       // 是否超过生成上限（提交时会被拒绝）
}

// ==========================================
// ValidatedLayout - 已通过校验的布局
// ==========================================
// 只有校验通过的布局才能枚举单元格
#[derive(Debug, Clone, Copy)]
pub struct ValidatedLayout<'a> {
    zone_code: &'a str,
    spec: &'a LayoutSpec,
    total: u64,
}

impl<'a> ValidatedLayout<'a> {
    pub fn total(&self) -> u64 {
        self.total
    }

    /// 按 行→贝→位 顺序惰性枚举创建请求
    pub fn cells(&self) -> impl Iterator<Item = LocationCreateRequest> + 'a {
        let zone_code = self.zone_code;
        let spec: &'a LayoutSpec = self.spec;
        spec.rows
            .iter()
            .enumerate()
            .flat_map(move |(r, row)| {
                row.bays.iter().enumerate().flat_map(move |(b, bay)| {
                    (1..=bay.slots_count.max(0) as u32).filter_map(move |s| {
                        let addressing = LocationAddressing::Rbs {
                            row: RbsIndex::new(r as u32 + 1)?,
                            bay: RbsIndex::new(b as u32 + 1)?,
                            slot: RbsIndex::new(s)?,
                        };
                        Some(LocationCreateRequest::new(zone_code, addressing))
                    })
                })
            })
    }
}

// ==========================================
// LayoutBuilder
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct LayoutBuilder {
    max_total: u64,
}

impl Default for LayoutBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TOTAL)
    }
}

impl LayoutBuilder {
    /// 创建生成器
    ///
    /// # 参数
    /// - max_total: 单次生成的库位数上限（来自配置 layout.max_total_locations）
    pub fn new(max_total: u64) -> Self {
        Self { max_total }
    }

    pub fn max_total(&self) -> u64 {
        self.max_total
    }

    /// 校验布局（含上限）
    ///
    /// # 优先级
    /// 无行 → 空行(无贝) → 位数非正 → 序号溢出 → 总数为 0 → 超上限
    pub fn validate<'a>(
        &self,
        zone_code: &'a str,
        spec: &'a LayoutSpec,
    ) -> Result<ValidatedLayout<'a>, LayoutValidationError> {
        let layout = Self::validate_structure(zone_code, spec)?;
        if layout.total > self.max_total {
            return Err(LayoutValidationError::TooLarge {
                total: layout.total,
                max: self.max_total,
            });
        }
        Ok(layout)
    }

    /// 展开为完整的创建请求列表
    pub fn expand(
        &self,
        zone_code: &str,
        spec: &LayoutSpec,
    ) -> Result<Vec<LocationCreateRequest>, LayoutValidationError> {
        let layout = self.validate(zone_code, spec)?;
        let requests: Vec<LocationCreateRequest> = layout.cells().collect();
        tracing::debug!(
            zone_code = zone_code,
            total = requests.len(),
            "布局展开完成"
        );
        Ok(requests)
    }

    /// 预览前 limit 个编码及总数，不生成完整列表
    ///
    /// 超过上限的布局仍可预览，exceeds_limit=true
    pub fn preview(
        &self,
        zone_code: &str,
        spec: &LayoutSpec,
        limit: usize,
    ) -> Result<LayoutPreview, LayoutValidationError> {
        let layout = Self::validate_structure(zone_code, spec)?;
        Ok(LayoutPreview {
            sample_codes: layout
                .cells()
                .take(limit)
                .map(|req| req.codes.absolute_code)
                .collect(),
            total: layout.total,
            exceeds_limit: layout.total > self.max_total,
        })
    }

    /// 找出将与已有库位编码冲突的请求（返回冲突的 location_code）
    ///
    /// 仅作提交前提示；最终唯一性以持久层为准
    pub fn detect_conflicts(
        requests: &[LocationCreateRequest],
        existing_location_codes: &HashSet<String>,
    ) -> Vec<String> {
        requests
            .iter()
            .filter(|req| existing_location_codes.contains(&req.codes.location_code))
            .map(|req| req.codes.location_code.clone())
            .collect()
    }

    fn validate_structure<'a>(
        zone_code: &'a str,
        spec: &'a LayoutSpec,
    ) -> Result<ValidatedLayout<'a>, LayoutValidationError> {
        if spec.rows.is_empty() {
            return Err(LayoutValidationError::NoRows);
        }

        if let Some(r) = spec.rows.iter().position(|row| row.bays.is_empty()) {
            return Err(LayoutValidationError::EmptyRow { row: r + 1 });
        }

        for (r, row) in spec.rows.iter().enumerate() {
            if let Some(b) = row.bays.iter().position(|bay| bay.slots_count < 1) {
                return Err(LayoutValidationError::NonPositiveSlotCount {
                    row: r + 1,
                    bay: b + 1,
                    slots_count: row.bays[b].slots_count,
                });
            }
        }

        let max_index = RbsIndex::MAX as u64;
        if spec.rows.len() as u64 > max_index {
            return Err(LayoutValidationError::IndexOverflow {
                axis: 'R',
                count: spec.rows.len() as u64,
            });
        }
        for row in &spec.rows {
            if row.bays.len() as u64 > max_index {
                return Err(LayoutValidationError::IndexOverflow {
                    axis: 'B',
                    count: row.bays.len() as u64,
                });
            }
            if let Some(bay) = row.bays.iter().find(|bay| bay.slots_count as u64 > max_index) {
                return Err(LayoutValidationError::IndexOverflow {
                    axis: 'S',
                    count: bay.slots_count as u64,
                });
            }
        }

        let total: u64 = spec
            .rows
            .iter()
            .flat_map(|row| row.bays.iter())
            .map(|bay| bay.slots_count as u64)
            .sum();
        if total == 0 {
            return Err(LayoutValidationError::ZeroTotal);
        }

        Ok(ValidatedLayout {
            zone_code,
            spec,
            total,
        })
    }
}
