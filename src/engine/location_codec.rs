// ==========================================
// 仓储作业核心 - 库位编码器
// ==========================================
// 职责: 校验/规范化库位编址字段，计算 location_code / absolute_code / display_code
// 红线: 纯函数、幂等；同样输入必须得到逐字节相同的输出（用于与持久化数据比对）
// ==========================================

use crate::domain::location::{CustomLabel, LocationAddressing, LocationCodes, RbsIndex};
use crate::domain::types::ZoneType;
use crate::engine::error::LocationCodeError;
use serde::{Deserialize, Serialize};

// ==========================================
// LocationFields - 编址输入（可部分填写）
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationFields {
    pub row: Option<String>,
    pub bay: Option<String>,
    pub slot: Option<String>,
    pub custom_label: Option<String>,
}

impl LocationFields {
    pub fn rbs(row: &str, bay: &str, slot: &str) -> Self {
        Self {
            row: Some(row.to_string()),
            bay: Some(bay.to_string()),
            slot: Some(slot.to_string()),
            custom_label: None,
        }
    }

    pub fn custom(label: &str) -> Self {
        Self {
            custom_label: Some(label.to_string()),
            ..Default::default()
        }
    }
}

// ==========================================
// RbsField - 行/贝/位 字段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RbsField {
    Row,
    Bay,
    Slot,
}

impl RbsField {
    /// 字段前缀字母
    pub fn prefix(&self) -> char {
        match self {
            RbsField::Row => 'R',
            RbsField::Bay => 'B',
            RbsField::Slot => 'S',
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RbsField::Row => "row",
            RbsField::Bay => "bay",
            RbsField::Slot => "slot",
        }
    }
}

// ==========================================
// CodePreview - 预览结果
// ==========================================
// Pending: 必填字段未填完，界面显示"暂无预览"
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CodePreview {
    Pending,
    Ready { codes: LocationCodes },
    Invalid { message: String },
}

// ==========================================
// LocationCodec
// ==========================================
pub struct LocationCodec;

impl LocationCodec {
    /// 计算库位编码
    ///
    /// # 参数
    /// - zone_code: 库区代码（调用方保证为 1-2 位大写字母）
    /// - zone_type: 库区编址方式
    /// - fields: 编址字段
    ///
    /// # 返回
    /// - Ok(LocationCodes): 派生编码
    /// - Err(MissingFieldError / BadRbsFormatError)
    pub fn compute_codes(
        zone_code: &str,
        zone_type: ZoneType,
        fields: &LocationFields,
    ) -> Result<LocationCodes, LocationCodeError> {
        let addressing = Self::parse_fields(zone_type, fields)?;
        Ok(Self::codes_for(zone_code, &addressing))
    }

    /// 由已解析编址计算编码
    pub fn codes_for(zone_code: &str, addressing: &LocationAddressing) -> LocationCodes {
        LocationCodes::derive(zone_code, addressing)
    }

    /// 解析编址字段为标签联合
    ///
    /// RBS 库区只读取 row/bay/slot；CUSTOM 库区只读取 customLabel
    pub fn parse_fields(
        zone_type: ZoneType,
        fields: &LocationFields,
    ) -> Result<LocationAddressing, LocationCodeError> {
        match zone_type {
            ZoneType::Rbs => {
                let row = Self::required_rbs(RbsField::Row, fields.row.as_deref())?;
                let bay = Self::required_rbs(RbsField::Bay, fields.bay.as_deref())?;
                let slot = Self::required_rbs(RbsField::Slot, fields.slot.as_deref())?;
                Ok(LocationAddressing::Rbs { row, bay, slot })
            }
            ZoneType::Custom => {
                let raw = fields.custom_label.as_deref().unwrap_or("");
                Ok(LocationAddressing::Custom {
                    label: Self::normalize_custom_label(raw)?,
                })
            }
        }
    }

    /// 编码预览（允许字段未填完）
    pub fn preview(zone_code: &str, zone_type: ZoneType, fields: &LocationFields) -> CodePreview {
        if !Self::has_required_fields(zone_type, fields) {
            return CodePreview::Pending;
        }
        match Self::compute_codes(zone_code, zone_type, fields) {
            Ok(codes) => CodePreview::Ready { codes },
            Err(e) => CodePreview::Invalid {
                message: e.to_string(),
            },
        }
    }

    /// 规范化单个 RBS 字段
    ///
    /// 接受 "3" / "03" / "R3" / "r03"，输出序号；
    /// 补零后必须满足 `^[RBS][0-9]{2}$` 且前缀字母与字段对应
    pub fn normalize_rbs_field(field: RbsField, raw: &str) -> Result<RbsIndex, LocationCodeError> {
        let value = raw.trim().to_uppercase();
        if value.is_empty() {
            return Err(LocationCodeError::MissingFieldError {
                field: field.name().to_string(),
            });
        }

        let bad = || LocationCodeError::BadRbsFormatError {
            field: field.name().to_string(),
            value: raw.to_string(),
            prefix: field.prefix(),
        };

        let digits = match value.strip_prefix(field.prefix()) {
            Some(rest) => rest,
            None if value.starts_with(|c: char| c.is_ascii_digit()) => value.as_str(),
            None => return Err(bad()),
        };

        if digits.is_empty() || digits.len() > 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad());
        }

        let number: u32 = digits.parse().map_err(|_| bad())?;
        RbsIndex::new(number).ok_or_else(bad)
    }

    /// 规范化自定义标签（去首尾空白、转大写、非空）
    pub fn normalize_custom_label(raw: &str) -> Result<CustomLabel, LocationCodeError> {
        let label = raw.trim().to_uppercase();
        if label.is_empty() {
            return Err(LocationCodeError::MissingFieldError {
                field: "customLabel".to_string(),
            });
        }
        Ok(CustomLabel::new_unchecked(label))
    }

    fn required_rbs(field: RbsField, raw: Option<&str>) -> Result<RbsIndex, LocationCodeError> {
        match raw {
            Some(v) => Self::normalize_rbs_field(field, v),
            None => Err(LocationCodeError::MissingFieldError {
                field: field.name().to_string(),
            }),
        }
    }

    fn has_required_fields(zone_type: ZoneType, fields: &LocationFields) -> bool {
        let filled = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        match zone_type {
            ZoneType::Rbs => filled(&fields.row) && filled(&fields.bay) && filled(&fields.slot),
            ZoneType::Custom => filled(&fields.custom_label),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rbs_absolute_code() {
        let codes =
            LocationCodec::compute_codes("GE", ZoneType::Rbs, &LocationFields::rbs("R01", "B02", "S03"))
                .unwrap();
        assert_eq!(codes.location_code, "R01B02S03");
        assert_eq!(codes.absolute_code, "GER-R01B02S03");
        assert_eq!(codes.display_code, "GER-R01B02S03");
    }

    #[test]
    fn test_rbs_field_padding_variants() {
        for (row, bay, slot) in [("1", "2", "3"), ("01", "02", "03"), ("r1", "b02", " S3 ")] {
            let codes =
                LocationCodec::compute_codes("GE", ZoneType::Rbs, &LocationFields::rbs(row, bay, slot))
                    .unwrap();
            assert_eq!(codes.absolute_code, "GER-R01B02S03");
        }
    }

    #[test]
    fn test_compute_codes_is_idempotent() {
        let fields = LocationFields::rbs("7", "B11", "S09");
        let a = LocationCodec::compute_codes("A", ZoneType::Rbs, &fields).unwrap();
        let b = LocationCodec::compute_codes("A", ZoneType::Rbs, &fields).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_bad_rbs_format() {
        let cases = [
            ("B01", "B02", "S03"), // 行前缀错误
            ("R001", "B02", "S03"), // 三位数字
            ("R01", "BX", "S03"),
            ("R01", "B02", "S"),
            ("R01", "B02", "100"),
        ];
        for (row, bay, slot) in cases {
            let result =
                LocationCodec::compute_codes("GE", ZoneType::Rbs, &LocationFields::rbs(row, bay, slot));
            assert!(
                matches!(result, Err(LocationCodeError::BadRbsFormatError { .. })),
                "{:?} should be rejected",
                (row, bay, slot)
            );
        }
    }

    #[test]
    fn test_missing_fields() {
        let fields = LocationFields {
            row: Some("R01".to_string()),
            bay: None,
            slot: Some("S01".to_string()),
            custom_label: None,
        };
        match LocationCodec::compute_codes("GE", ZoneType::Rbs, &fields) {
            Err(LocationCodeError::MissingFieldError { field }) => assert_eq!(field, "bay"),
            other => panic!("Expected MissingFieldError, got {:?}", other),
        }

        let blank = LocationFields::custom("   ");
        assert!(matches!(
            LocationCodec::compute_codes("DG", ZoneType::Custom, &blank),
            Err(LocationCodeError::MissingFieldError { .. })
        ));
    }

    #[test]
    fn test_custom_label_normalized() {
        let codes =
            LocationCodec::compute_codes("DG", ZoneType::Custom, &LocationFields::custom("  dock1 "))
                .unwrap();
        assert_eq!(codes.location_code, "DOCK1");
        assert_eq!(codes.absolute_code, "DG-DOCK1");
    }

    #[test]
    fn test_zone_type_selects_fields() {
        // CUSTOM 库区忽略 row/bay/slot
        let mut fields = LocationFields::rbs("R01", "B01", "S01");
        fields.custom_label = Some("gate".to_string());
        let addressing = LocationCodec::parse_fields(ZoneType::Custom, &fields).unwrap();
        assert_eq!(addressing.custom_label(), Some("GATE"));
    }

    #[test]
    fn test_preview_states() {
        let partial = LocationFields {
            row: Some("R01".to_string()),
            bay: Some("".to_string()),
            ..Default::default()
        };
        assert_eq!(LocationCodec::preview("GE", ZoneType::Rbs, &partial), CodePreview::Pending);
        assert_eq!(
            LocationCodec::preview("DG", ZoneType::Custom, &LocationFields::default()),
            CodePreview::Pending
        );

        match LocationCodec::preview("GE", ZoneType::Rbs, &LocationFields::rbs("1", "2", "3")) {
            CodePreview::Ready { codes } => assert_eq!(codes.absolute_code, "GER-R01B02S03"),
            other => panic!("Expected Ready, got {:?}", other),
        }

        assert!(matches!(
            LocationCodec::preview("GE", ZoneType::Rbs, &LocationFields::rbs("X1", "2", "3")),
            CodePreview::Invalid { .. }
        ));
    }

    #[test]
    fn test_fields_serde_camel_case() {
        let fields: LocationFields =
            serde_json::from_str(r#"{"row":"R01","bay":"B01","slot":"S02"}"#).unwrap();
        assert_eq!(fields, LocationFields::rbs("R01", "B01", "S02"));
        let custom: LocationFields = serde_json::from_str(r#"{"customLabel":"DOCK1"}"#).unwrap();
        assert_eq!(custom.custom_label.as_deref(), Some("DOCK1"));
    }
}
