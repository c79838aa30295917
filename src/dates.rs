//! Date Normalizer Module
//!
//! 様々な表現の日付（日付セル、シリアル値、自由記述の文字列）を
//! `YYYY-MM-DD` 形式の文字列に統一するモジュール。
//!
//! 日付の解釈に失敗しても行の処理は中断しません。
//! 解釈できない文字列は元の文字列のまま返します。

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};

use crate::types::{format_number, Cell};

/// 出力形式
const ISO_DATE: &str = "%Y-%m-%d";

/// 日付のみの書式（月が先の慣例）
///
/// `%Y` は2桁の年も受理してしまうため、`%y` の書式を先に試します。
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%y",
    "%m-%d-%y",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%m.%d.%Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%d-%b-%y",
    "%d-%b-%Y",
];

/// 日時の書式
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M %p",
];

/// 日付ノーマライザー
///
/// Excelの1900年システム（1899年12月30日起算）でシリアル値を解釈します。
#[derive(Debug, Default, Clone, Copy)]
pub struct DateNormalizer;

impl DateNormalizer {
    /// セル値を `YYYY-MM-DD` 文字列に変換
    ///
    /// # 処理順序
    ///
    /// 1. 空セル・NaN・空白のみの文字列 → 空文字列
    /// 2. 日付セル → そのままフォーマット
    /// 3. 数値 → シリアル値として解釈（範囲外の場合は次へ）
    /// 4. 文字列 → 一般的な日付表現として解釈（月が先）
    /// 5. すべて失敗 → 元の文字列をそのまま返す
    pub fn normalize(&self, cell: &Cell) -> String {
        if cell.is_blank() {
            return String::new();
        }

        let text = match cell {
            Cell::Date(dt) => return dt.format(ISO_DATE).to_string(),
            Cell::Number(n) => {
                if let Some(date) = serial_to_date(*n) {
                    return date.format(ISO_DATE).to_string();
                }
                format_number(*n)
            }
            Cell::Text(s) => s.trim().to_string(),
            Cell::Empty => return String::new(),
        };

        match parse_date_text(&text) {
            Some(date) => date.format(ISO_DATE).to_string(),
            None => text,
        }
    }
}

/// シリアル値を日付に変換（1899-12-30起算、小数部は切り捨て）
///
/// 非有限値や表現可能範囲外の値は `None` を返します。
pub(crate) fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }
    let days = serial.floor();
    // chronoの表現範囲（約±26万年）を超える値はここで除外
    if days.abs() > 100_000_000.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(days as i64))
}

/// 日付文字列を解釈（月が先の慣例）
///
/// `%Y` は1桁の年も受理するため、年が先の書式は先頭が4桁の数字の場合のみ試します。
fn parse_date_text(text: &str) -> Option<NaiveDate> {
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }

    let year_first = text.chars().take_while(|c| c.is_ascii_digit()).count() == 4;
    let applicable = |fmt: &&&str| fmt.starts_with("%Y") == year_first;

    DATE_FORMATS
        .iter()
        .filter(applicable)
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .filter(applicable)
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
        })
}
