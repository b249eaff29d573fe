// ==========================================
// 仓储作业核心 - 箱号清单导入
// ==========================================
// 支持: CSV (.csv) / 纯文本 (.txt，每行一个箱号)
// 流程: 文件读取 → 定位箱号列 → 逐行校验（ContainerNumberValidator）→ 汇总
// 红线: 单行失败不中断整批，所有失败连同行号一并返回
// ==========================================

use crate::domain::container::ContainerNumber;
use crate::engine::container_number::{ContainerCheckResult, ContainerNumberValidator};
use crate::importer::error::{ImportError, ImportResult};
use csv::ReaderBuilder;
use serde::Serialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// 可识别的箱号列名（比较时忽略大小写与首尾空白）
pub const CONTAINER_COLUMN_ALIASES: [&str; 5] =
    ["container_no", "container_number", "container", "箱号", "集装箱号"];

// ==========================================
// ContainerImportRow - 单行结果
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct ContainerImportRow {
    pub row_number: usize,     // 文件行号（表头为第 1 行）
    pub raw_value: String,     // 原始单元格
    pub normalized: Option<String>, // 规范化箱号（校验通过时）
    pub error: Option<String>, // 失败原因
    pub duplicate: bool,       // 与前面的行重复
}

// ==========================================
// ContainerImportReport - 导入汇总
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct ContainerImportReport {
    pub total_rows: usize,
    pub valid_count: usize,
    pub invalid_count: usize,
    pub duplicate_count: usize,
    pub rows: Vec<ContainerImportRow>,
    #[serde(skip)]
    pub containers: Vec<ContainerNumber>, // 去重后的合法箱号（保持文件顺序）
}

impl ContainerImportReport {
    pub fn has_errors(&self) -> bool {
        self.invalid_count > 0
    }
}

// ==========================================
// ContainerListImporter
// ==========================================
pub struct ContainerListImporter;

impl ContainerListImporter {
    /// 从文件导入箱号清单
    pub fn import_file(file_path: &Path) -> ImportResult<ContainerImportReport> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }

        let ext = file_path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        let has_headers = match ext.as_str() {
            "csv" => true,
            "txt" => false,
            other => return Err(ImportError::UnsupportedFormat(other.to_string())),
        };

        let file = File::open(file_path)?;
        Self::import_reader(file, has_headers)
    }

    /// 从任意读取源导入
    ///
    /// - has_headers=true: 按表头定位箱号列，找不到别名时报 MissingColumn
    /// - has_headers=false: 取每行第一列
    pub fn import_reader<R: Read>(mut reader: R, has_headers: bool) -> ImportResult<ContainerImportReport> {
        // 整体读入，用于把记录的字节偏移换算成文件行号
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;

        let mut reader = ReaderBuilder::new()
            .has_headers(has_headers)
            .flexible(true) // 允许行长度不一致
            .trim(csv::Trim::All)
            .from_reader(buf.as_slice());

        let column = if has_headers {
            let headers: Vec<String> = reader
                .headers()?
                .iter()
                .map(|h| h.trim().to_string())
                .collect();
            Self::locate_column(&headers).ok_or_else(|| ImportError::MissingColumn {
                headers: headers.join(", "),
            })?
        } else {
            0
        };

        let mut raw_rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let value = record.get(column).unwrap_or("").to_string();
            // 跳过箱号为空的行
            if value.is_empty() {
                continue;
            }
            let start = record
                .position()
                .map(|p| p.byte() as usize)
                .ok_or_else(|| ImportError::InternalError("CSV 记录缺少位置信息".to_string()))?;
            raw_rows.push((line_of_record(&buf, start), value));
        }

        if raw_rows.is_empty() {
            return Err(ImportError::EmptyFile);
        }

        let checks = ContainerNumberValidator::validate_batch(raw_rows.iter().map(|(_, v)| v));
        Ok(Self::summarize(&raw_rows, checks))
    }

    fn locate_column(headers: &[String]) -> Option<usize> {
        headers.iter().position(|h| {
            CONTAINER_COLUMN_ALIASES
                .iter()
                .any(|alias| h.eq_ignore_ascii_case(alias))
        })
    }

    fn summarize(
        raw_rows: &[(usize, String)],
        checks: Vec<ContainerCheckResult>,
    ) -> ContainerImportReport {
        let mut seen = HashSet::new();
        let mut rows = Vec::with_capacity(checks.len());
        let mut containers = Vec::new();
        let (mut valid_count, mut invalid_count, mut duplicate_count) = (0, 0, 0);

        for check in checks {
            let row_number = raw_rows[check.index].0;
            match check.result {
                Ok(number) => {
                    valid_count += 1;
                    let duplicate = !seen.insert(number.as_str().to_string());
                    if duplicate {
                        duplicate_count += 1;
                    }
                    rows.push(ContainerImportRow {
                        row_number,
                        raw_value: check.input,
                        normalized: Some(number.as_str().to_string()),
                        error: None,
                        duplicate,
                    });
                    if !duplicate {
                        containers.push(number);
                    }
                }
                Err(e) => {
                    invalid_count += 1;
                    rows.push(ContainerImportRow {
                        row_number,
                        raw_value: check.input,
                        normalized: None,
                        error: Some(e.to_string()),
                        duplicate: false,
                    });
                }
            }
        }

        ContainerImportReport {
            total_rows: rows.len(),
            valid_count,
            invalid_count,
            duplicate_count,
            rows,
            containers,
        }
    }
}

/// 记录起始字节偏移 → 文件行号（1 起）
///
/// csv 记录的位置停在上一条记录之后，先跳过其间的空行
fn line_of_record(buf: &[u8], start: usize) -> usize {
    let start = start.min(buf.len());
    let skipped = buf[start..]
        .iter()
        .take_while(|b| matches!(b, b'\r' | b'\n'))
        .count();
    1 + buf[..start + skipped].iter().filter(|b| **b == b'\n').count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_csv_with_header_alias() {
        let data = "seq,Container_No,remark\n1,MSCU6639870,ok\n2,MSCU6639871,bad\n3,,\n4,temu 987 654 0,\n";
        let report = ContainerListImporter::import_reader(data.as_bytes(), true).unwrap();

        assert_eq!(report.total_rows, 3);
        assert_eq!(report.valid_count, 2);
        assert_eq!(report.invalid_count, 1);
        assert_eq!(report.rows[1].row_number, 3);
        assert!(report.rows[1].error.is_some());
        assert_eq!(report.rows[2].normalized.as_deref(), Some("TEMU9876540"));
        assert_eq!(report.rows[2].row_number, 5);
    }

    #[test]
    fn test_import_plain_lines_and_duplicates() {
        let data = "MSCU6639870\nmscu6639870\nCSQU3054383\n";
        let report = ContainerListImporter::import_reader(data.as_bytes(), false).unwrap();

        assert_eq!(report.valid_count, 3);
        assert_eq!(report.duplicate_count, 1);
        assert!(report.rows[1].duplicate);
        assert_eq!(report.containers.len(), 2);
        assert!(!report.has_errors());
    }

    #[test]
    fn test_row_number_空行与跨行字段() {
        let data = "箱号,remark\r\n\r\nMSCU6639870,\"第一行\n第二行\"\n\n\nBAD,x\nCSQU3054383,\n";
        let report = ContainerListImporter::import_reader(data.as_bytes(), true).unwrap();

        let lines: Vec<usize> = report.rows.iter().map(|r| r.row_number).collect();
        assert_eq!(lines, vec![3, 7, 8]);
        assert_eq!(report.rows[1].raw_value, "BAD");
    }

    #[test]
    fn test_row_number_纯文本空行() {
        let data = "\nMSCU6639870\n\nMSCU6639871\n";
        let report = ContainerListImporter::import_reader(data.as_bytes(), false).unwrap();

        assert_eq!(report.rows[0].row_number, 2);
        assert_eq!(report.rows[1].row_number, 4);
        assert!(report.rows[1].error.is_some());
    }

    #[test]
    fn test_missing_column() {
        let data = "a,b\n1,2\n";
        let err = ContainerListImporter::import_reader(data.as_bytes(), true).unwrap_err();
        assert!(matches!(err, ImportError::MissingColumn { .. }));
    }

    #[test]
    fn test_empty_file() {
        let data = "container_no\n\n";
        let err = ContainerListImporter::import_reader(data.as_bytes(), true).unwrap_err();
        assert!(matches!(err, ImportError::EmptyFile));
    }
}
