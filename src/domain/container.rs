// ==========================================
// 仓储作业核心 - 集装箱箱号领域模型
// ==========================================
// 依据: ISO 6346 箱号编码
// 格式: 3位箱主代码 + 1位设备类别 + 6位序列号 + 1位校验码
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 设备类别 (Equipment Category)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EquipmentCategory {
    U, // 货运集装箱
    J, // 可拆卸附属设备
    Z, // 拖车/底盘车
}

impl EquipmentCategory {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'U' => Some(EquipmentCategory::U),
            'J' => Some(EquipmentCategory::J),
            'Z' => Some(EquipmentCategory::Z),
            _ => None,
        }
    }
}

// ==========================================
// ContainerNumber - 规范化箱号
// ==========================================
// 红线: 只能由 ContainerNumberValidator 构造，保证已通过校验
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ContainerNumber(String);

impl ContainerNumber {
    /// 已校验的 11 位箱号
    pub(crate) fn new_unchecked(normalized: String) -> Self {
        Self(normalized)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 箱主代码（前 3 位）
    pub fn owner_code(&self) -> &str {
        &self.0[..3]
    }

    /// 设备类别（第 4 位）
    pub fn category(&self) -> EquipmentCategory {
        // 构造时已校验类别字母
        match &self.0[3..4] {
            "J" => EquipmentCategory::J,
            "Z" => EquipmentCategory::Z,
            _ => EquipmentCategory::U,
        }
    }

    /// 序列号（第 5-10 位）
    pub fn serial(&self) -> &str {
        &self.0[4..10]
    }

    /// 校验码（第 11 位）
    pub fn check_digit(&self) -> u8 {
        self.0.as_bytes()[10] - b'0'
    }

    /// 展示格式: 校验码前插入连字符，如 MSCU663987-0
    pub fn display_form(&self) -> String {
        format!("{}-{}", &self.0[..10], &self.0[10..])
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ContainerNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ContainerNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
