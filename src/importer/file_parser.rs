// ==========================================
// 藻类养殖 ATP 系统 - 文件解析器实现
// ==========================================
// 支持: Excel (.xlsx/.xls) / CSV (.csv)
// 输出: 按表头索引的原始行 (值均已 trim)
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook, Data, Reader, Xlsx};
use chrono::{Duration, NaiveDate};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// 原始行记录
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// 源文件中的行号 (表头为第 1 行)
    pub row_number: usize,
    pub fields: HashMap<String, String>,
}

impl RawRecord {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }
}

// ==========================================
// FileParser Trait
// ==========================================
pub trait FileParser: Send + Sync {
    /// 解析文件为原始行记录
    ///
    /// # 规则
    /// - 第一行为表头
    /// - 完全空白的行被跳过 (行号仍按源文件计)
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<RawRecord>>;
}

fn ensure_exists(path: &Path) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

fn lowercase_extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// 表头规范化: 去 BOM, 去首尾空白
fn normalize_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').trim().to_string()
}

fn build_record(
    headers: &[String],
    values: impl Iterator<Item = String>,
    row_number: usize,
) -> Option<RawRecord> {
    let mut fields = HashMap::new();
    for (header, value) in headers.iter().zip(values) {
        if header.is_empty() {
            continue;
        }
        fields.insert(header.clone(), value.trim().to_string());
    }

    // 跳过完全空白的行
    if fields.values().all(|v| v.is_empty()) {
        return None;
    }

    Some(RawRecord { row_number, fields })
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<RawRecord>> {
        ensure_exists(file_path)?;

        let ext = lowercase_extension(file_path);
        if !ext.is_empty() && ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let file = File::open(file_path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let headers: Vec<String> = reader.headers()?.iter().map(normalize_header).collect();

        let mut records = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            let row_number = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(idx + 2);
            if let Some(raw) =
                build_record(&headers, record.iter().map(str::to_string), row_number)
            {
                records.push(raw);
            }
        }

        Ok(records)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

/// Excel 序列日期起点 (1900 日期系统)
fn excel_epoch() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1899, 12, 30)
}

/// 单元格转文本; 日期单元格输出为 YYYY-MM-DD
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            excel_epoch()
                .and_then(|epoch| epoch.checked_add_signed(Duration::days(serial.trunc() as i64)))
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| serial.to_string())
        }
        Data::DateTimeIso(s) => s.chars().take(10).collect(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

impl FileParser for ExcelParser {
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<RawRecord>> {
        ensure_exists(file_path)?;

        let ext = lowercase_extension(file_path);
        if ext != "xlsx" && ext != "xls" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut workbook: Xlsx<_> = open_workbook(file_path)?;

        // 只读取第一个 sheet
        let sheet_names = workbook.sheet_names();
        let sheet_name = sheet_names
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;
        let range = workbook.worksheet_range(&sheet_name)?;

        let mut rows = range.rows();
        let header_row = rows
            .next()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无数据行".to_string()))?;
        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| normalize_header(&cell_to_string(cell)))
            .collect();

        let mut records = Vec::new();
        for (idx, data_row) in rows.enumerate() {
            if let Some(raw) = build_record(&headers, data_row.iter().map(cell_to_string), idx + 2)
            {
                records.push(raw);
            }
        }

        Ok(records)
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    pub fn parse<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<Vec<RawRecord>> {
        let path = file_path.as_ref();
        match lowercase_extension(path).as_str() {
            "csv" => CsvParser.parse_to_raw_records(path),
            "xlsx" | "xls" => ExcelParser.parse_to_raw_records(path),
            other => Err(ImportError::UnsupportedFormat(other.to_string())),
        }
    }
}
