// ==========================================
// 仓储作业核心 - 箱号校验器
// ==========================================
// 依据: ISO 6346 校验码算法
// 职责: 规范化箱号（去空白、转大写）并校验格式与校验码
// 红线: 纯函数，无 I/O；错误以返回值形式给出，便于批量校验
// ==========================================

use crate::domain::container::{ContainerNumber, EquipmentCategory};
use crate::engine::error::ContainerNumberError;
use serde::Serialize;

/// 字母取值表 A..Z（从 10 起递增，跳过 11 的倍数 11/22/33）
const LETTER_VALUES: [u32; 26] = [
    10, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 23, 24, // A-M
    25, 26, 27, 28, 29, 30, 31, 32, 34, 35, 36, 37, 38, // N-Z
];

/// 规范化箱号长度
pub const CONTAINER_NUMBER_LEN: usize = 11;

// ==========================================
// ContainerCheckResult - 批量校验单条结果
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct ContainerCheckResult {
    pub index: usize, // 输入序号（0 起）
    pub input: String, // 原始输入
    #[serde(skip)]
    pub result: Result<ContainerNumber, ContainerNumberError>,
}

impl ContainerCheckResult {
    pub fn is_valid(&self) -> bool {
        self.result.is_ok()
    }
}

// ==========================================
// ContainerNumberValidator
// ==========================================
pub struct ContainerNumberValidator;

impl ContainerNumberValidator {
    /// 规范化并校验箱号
    ///
    /// # 步骤
    /// 1. 去除所有空白并转大写
    /// 2. 校验形状: 4 位字母 + 7 位数字，第 4 位类别为 U/J/Z
    /// 3. 按 ISO 6346 计算前 10 位的校验码
    /// 4. 比对第 11 位
    ///
    /// # 示例
    /// ```
    /// use warehouse_ops::engine::ContainerNumberValidator;
    /// let n = ContainerNumberValidator::normalize("mscu 663 987 0").unwrap();
    /// assert_eq!(n.as_str(), "MSCU6639870");
    /// ```
    pub fn normalize(raw: &str) -> Result<ContainerNumber, ContainerNumberError> {
        let cleaned: String = raw
            .chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(|c| c.to_uppercase())
            .collect();

        Self::check_shape(&cleaned, CONTAINER_NUMBER_LEN)?;

        let expected = Self::check_digit_of(&cleaned[..10]);
        let actual = cleaned.as_bytes()[10] - b'0';
        if expected != actual {
            return Err(ContainerNumberError::CheckDigitError {
                input: cleaned,
                expected,
                actual,
            });
        }

        Ok(ContainerNumber::new_unchecked(cleaned))
    }

    /// 计算 10 位前缀（箱主代码+类别+序列号）的校验码
    ///
    /// 前缀同样会先去空白、转大写
    pub fn compute_check_digit(prefix: &str) -> Result<u8, ContainerNumberError> {
        let cleaned: String = prefix
            .chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(|c| c.to_uppercase())
            .collect();
        Self::check_shape(&cleaned, 10)?;
        Ok(Self::check_digit_of(&cleaned))
    }

    /// 是否为合法箱号
    pub fn is_valid(raw: &str) -> bool {
        Self::normalize(raw).is_ok()
    }

    /// 批量校验，保留全部失败项
    pub fn validate_batch<I, S>(inputs: I) -> Vec<ContainerCheckResult>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        inputs
            .into_iter()
            .enumerate()
            .map(|(index, raw)| ContainerCheckResult {
                index,
                input: raw.as_ref().to_string(),
                result: Self::normalize(raw.as_ref()),
            })
            .collect()
    }

    /// 形状校验: 4 位字母 + (expected_len - 4) 位数字
    fn check_shape(cleaned: &str, expected_len: usize) -> Result<(), ContainerNumberError> {
        let format_error = |reason: String| ContainerNumberError::FormatError {
            input: cleaned.to_string(),
            reason,
        };

        if !cleaned.is_ascii() || cleaned.len() != expected_len {
            return Err(format_error(format!(
                "长度应为 {} 位，实际 {} 位",
                expected_len,
                cleaned.chars().count()
            )));
        }

        let bytes = cleaned.as_bytes();
        if !bytes[..4].iter().all(|b| b.is_ascii_uppercase()) {
            return Err(format_error("前 4 位必须为字母".to_string()));
        }
        if !bytes[4..].iter().all(|b| b.is_ascii_digit()) {
            return Err(format_error(format!("后 {} 位必须为数字", expected_len - 4)));
        }
        if EquipmentCategory::from_char(bytes[3] as char).is_none() {
            return Err(format_error(format!(
                "设备类别 {} 不在 U/J/Z 之内",
                bytes[3] as char
            )));
        }

        Ok(())
    }

    /// 对已校验形状的 10 位前缀计算校验码
    ///
    /// sum(value(c_i) * 2^i) mod 11 mod 10
    fn check_digit_of(prefix: &str) -> u8 {
        let sum: u32 = prefix
            .bytes()
            .take(10)
            .enumerate()
            .map(|(i, b)| Self::char_value(b) << i)
            .sum();
        ((sum % 11) % 10) as u8
    }

    fn char_value(b: u8) -> u32 {
        if b.is_ascii_digit() {
            (b - b'0') as u32
        } else {
            LETTER_VALUES[(b - b'A') as usize]
        }
    }
}
