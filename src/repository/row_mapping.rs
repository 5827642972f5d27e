// ==========================================
// 藻类养殖 ATP 系统 - 行映射辅助
// ==========================================
// 日期统一以 TEXT `YYYY-MM-DD` 存储
// ==========================================

use chrono::NaiveDate;
use rusqlite::types::Type;

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";
pub(crate) const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// 列值转换失败
pub(crate) fn conversion_error(column: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, message.into())
}

pub(crate) fn parse_date_column(column: usize, raw: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}

pub(crate) fn parse_optional_date_column(
    column: usize,
    raw: Option<String>,
) -> rusqlite::Result<Option<NaiveDate>> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_date_column(column, s).map(Some),
    }
}
