// ==========================================
// 仓储作业核心 - 箱号 API
// ==========================================
// 职责: 单个/批量箱号校验、校验码计算、箱号清单文件导入
// 红线: 批量校验收集全部失败，不在首个错误处中断
// ==========================================

use serde::Serialize;
use std::path::Path;
use tracing::info;

use crate::api::error::ApiResult;
use crate::domain::container::{ContainerNumber, EquipmentCategory};
use crate::engine::container_number::{ContainerCheckResult, ContainerNumberValidator};
use crate::importer::container_list::{ContainerImportReport, ContainerListImporter};

// ==========================================
// ContainerNumberView - 校验通过的箱号明细
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerNumberView {
    pub normalized: String,   // MSCU6639870
    pub display_form: String, // MSCU663987-0
    pub owner_code: String,
    pub category: EquipmentCategory,
    pub serial: String,
    pub check_digit: u8,
}

impl From<&ContainerNumber> for ContainerNumberView {
    fn from(number: &ContainerNumber) -> Self {
        Self {
            normalized: number.as_str().to_string(),
            display_form: number.display_form(),
            owner_code: number.owner_code().to_string(),
            category: number.category(),
            serial: number.serial().to_string(),
            check_digit: number.check_digit(),
        }
    }
}

// ==========================================
// ContainerCheckView - 批量校验单条结果（可序列化）
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct ContainerCheckView {
    pub index: usize,
    pub input: String,
    pub valid: bool,
    pub number: Option<ContainerNumberView>,
    pub error: Option<String>,
}

impl From<&ContainerCheckResult> for ContainerCheckView {
    fn from(check: &ContainerCheckResult) -> Self {
        match &check.result {
            Ok(number) => Self {
                index: check.index,
                input: check.input.clone(),
                valid: true,
                number: Some(ContainerNumberView::from(number)),
                error: None,
            },
            Err(e) => Self {
                index: check.index,
                input: check.input.clone(),
                valid: false,
                number: None,
                error: Some(e.to_string()),
            },
        }
    }
}

// ==========================================
// ContainerApi - 箱号 API
// ==========================================
#[derive(Debug, Default, Clone, Copy)]
pub struct ContainerApi;

impl ContainerApi {
    pub fn new() -> Self {
        Self
    }

    /// 校验单个箱号
    ///
    /// # 返回
    /// - Err(ContainerNumber): FormatError / CheckDigitError
    pub fn validate_number(&self, raw: &str) -> ApiResult<ContainerNumberView> {
        let number = ContainerNumberValidator::normalize(raw)?;
        Ok(ContainerNumberView::from(&number))
    }

    /// 计算 10 位前缀的校验码
    pub fn compute_check_digit(&self, prefix: &str) -> ApiResult<u8> {
        Ok(ContainerNumberValidator::compute_check_digit(prefix)?)
    }

    /// 批量校验（每条结果带输入序号）
    pub fn validate_batch(&self, inputs: &[String]) -> Vec<ContainerCheckView> {
        ContainerNumberValidator::validate_batch(inputs)
            .iter()
            .map(ContainerCheckView::from)
            .collect()
    }

    /// 导入箱号清单文件（.csv 按表头定位箱号列，.txt 每行一个）
    pub fn import_container_list(&self, file_path: &Path) -> ApiResult<ContainerImportReport> {
        let report = ContainerListImporter::import_file(file_path)?;
        info!(
            file = %file_path.display(),
            total = report.total_rows,
            valid = report.valid_count,
            invalid = report.invalid_count,
            duplicate = report.duplicate_count,
            "箱号清单导入完成"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::ApiError;
    use crate::engine::error::ContainerNumberError;

    #[test]
    fn test_validate_number_view() {
        let view = ContainerApi::new().validate_number(" mscu6639870 ").unwrap();
        assert_eq!(view.normalized, "MSCU6639870");
        assert_eq!(view.display_form, "MSCU663987-0");
        assert_eq!(view.owner_code, "MSC");
        assert_eq!(view.category, EquipmentCategory::U);
        assert_eq!(view.check_digit, 0);
    }

    #[test]
    fn test_validate_number_check_digit_error() {
        let err = ContainerApi::new().validate_number("MSCU6639871").unwrap_err();
        assert!(matches!(
            err,
            ApiError::ContainerNumber(ContainerNumberError::CheckDigitError { expected: 0, actual: 1, .. })
        ));
    }

    #[test]
    fn test_validate_batch_keeps_indices() {
        let inputs = vec![
            "MSCU6639870".to_string(),
            "BAD".to_string(),
            "CSQU3054383".to_string(),
        ];
        let views = ContainerApi::new().validate_batch(&inputs);
        assert_eq!(views.len(), 3);
        assert!(views[0].valid);
        assert!(!views[1].valid);
        assert_eq!(views[1].index, 1);
        assert!(views[1].error.is_some());
        assert!(views[2].valid);
    }
}
