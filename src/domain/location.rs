// ==========================================
// 仓储作业核心 - 库位领域模型
// ==========================================
// 编址: RBS（行-贝-位）或 CUSTOM（自定义标签），二者取其一
// 红线: location_code / absolute_code / display_code 只能由编址派生，不可单独设置
// ==========================================

use crate::domain::types::{LocationStatus, ZoneType};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;

// ==========================================
// RbsIndex - 行/贝/位 序号 (0-99)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RbsIndex(u8);

impl RbsIndex {
    /// 最大可编码序号（两位数字）
    pub const MAX: u32 = 99;

    pub fn new(value: u32) -> Option<Self> {
        if value <= Self::MAX {
            Some(Self(value as u8))
        } else {
            None
        }
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

// ==========================================
// CustomLabel - 自定义库位标签（已去空白、转大写、非空）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CustomLabel(String);

impl CustomLabel {
    pub(crate) fn new_unchecked(label: String) -> Self {
        Self(label)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ==========================================
// LocationAddressing - 库位编址（标签联合）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocationAddressing {
    Rbs {
        row: RbsIndex,
        bay: RbsIndex,
        slot: RbsIndex,
    },
    Custom {
        label: CustomLabel,
    },
}

impl LocationAddressing {
    /// 编址对应的库区类型
    pub fn zone_type(&self) -> ZoneType {
        match self {
            LocationAddressing::Rbs { .. } => ZoneType::Rbs,
            LocationAddressing::Custom { .. } => ZoneType::Custom,
        }
    }

    /// 行号文本，如 R01（CUSTOM 编址返回 None）
    pub fn row_code(&self) -> Option<String> {
        match self {
            LocationAddressing::Rbs { row, .. } => Some(format!("R{:02}", row.get())),
            LocationAddressing::Custom { .. } => None,
        }
    }

    /// 贝号文本，如 B02
    pub fn bay_code(&self) -> Option<String> {
        match self {
            LocationAddressing::Rbs { bay, .. } => Some(format!("B{:02}", bay.get())),
            LocationAddressing::Custom { .. } => None,
        }
    }

    /// 位号文本，如 S03
    pub fn slot_code(&self) -> Option<String> {
        match self {
            LocationAddressing::Rbs { slot, .. } => Some(format!("S{:02}", slot.get())),
            LocationAddressing::Custom { .. } => None,
        }
    }

    /// 自定义标签
    pub fn custom_label(&self) -> Option<&str> {
        match self {
            LocationAddressing::Rbs { .. } => None,
            LocationAddressing::Custom { label } => Some(label.as_str()),
        }
    }

    /// 库区内编码: R01B02S03 或 自定义标签
    pub fn location_code(&self) -> String {
        match self {
            LocationAddressing::Rbs { row, bay, slot } => {
                format!("R{:02}B{:02}S{:02}", row.get(), bay.get(), slot.get())
            }
            LocationAddressing::Custom { label } => label.as_str().to_string(),
        }
    }
}

// ==========================================
// LocationCodes - 派生编码三元组
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationCodes {
    pub location_code: String, // 库区内编码
    pub absolute_code: String, // 带库区前缀的全局编码
    pub display_code: String,  // 展示编码（目前与 absolute_code 相同）
}

impl LocationCodes {
    /// 由库区代码与编址派生编码
    ///
    /// - RBS: `{zone}R-{row}{bay}{slot}`，如 GER-R01B02S03
    /// - CUSTOM: `{zone}-{label}`，如 DG-DOCK1
    pub fn derive(zone_code: &str, addressing: &LocationAddressing) -> Self {
        let location_code = addressing.location_code();
        let absolute_code = match addressing {
            LocationAddressing::Rbs { .. } => format!("{}R-{}", zone_code, location_code),
            LocationAddressing::Custom { .. } => format!("{}-{}", zone_code, location_code),
        };
        Self {
            display_code: absolute_code.clone(),
            absolute_code,
            location_code,
        }
    }
}

// ==========================================
// Location - 库位
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct Location {
    pub location_id: String,          // 库位ID
    pub zone_id: String,              // 所属库区
    pub zone_code: String,            // 所属库区代码（派生编码用）
    pub addressing: LocationAddressing, // 编址
    pub status: LocationStatus,       // 状态
    pub created_at: NaiveDateTime,    // 创建时间
    pub updated_at: NaiveDateTime,    // 更新时间
}

impl Location {
    pub fn zone_type(&self) -> ZoneType {
        self.addressing.zone_type()
    }

    /// 派生编码（每次按编址重新计算）
    pub fn codes(&self) -> LocationCodes {
        LocationCodes::derive(&self.zone_code, &self.addressing)
    }

    pub fn is_locked(&self) -> bool {
        self.status == LocationStatus::Locked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rbs(row: u32, bay: u32, slot: u32) -> LocationAddressing {
        LocationAddressing::Rbs {
            row: RbsIndex::new(row).unwrap(),
            bay: RbsIndex::new(bay).unwrap(),
            slot: RbsIndex::new(slot).unwrap(),
        }
    }

    #[test]
    fn test_rbs_codes() {
        let codes = LocationCodes::derive("GE", &rbs(1, 2, 3));
        assert_eq!(codes.location_code, "R01B02S03");
        assert_eq!(codes.absolute_code, "GER-R01B02S03");
        assert_eq!(codes.display_code, codes.absolute_code);
    }

    #[test]
    fn test_custom_codes() {
        let addressing = LocationAddressing::Custom {
            label: CustomLabel::new_unchecked("DOCK1".to_string()),
        };
        let codes = LocationCodes::derive("DG", &addressing);
        assert_eq!(codes.location_code, "DOCK1");
        assert_eq!(codes.absolute_code, "DG-DOCK1");
        assert_eq!(addressing.zone_type(), ZoneType::Custom);
        assert_eq!(addressing.row_code(), None);
    }

    #[test]
    fn test_rbs_index_bounds() {
        assert!(RbsIndex::new(99).is_some());
        assert!(RbsIndex::new(100).is_none());
    }
}
