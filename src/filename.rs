//! Filename Module
//!
//! Windows/macOS/Linuxで安全に使用できるファイル名を生成するモジュール。

use once_cell::sync::Lazy;
use regex::Regex;

static ILLEGAL_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[\\/*?:"<>|]"#).expect("valid filename pattern"));

/// Windowsの予約デバイス名
const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// 文字列を安全なファイル名に変換
///
/// - 前後の空白を除去
/// - 使用できない文字（`\ / * ? : " < > |`）を `_` に置換
/// - 末尾の空白とドットを除去
/// - 予約デバイス名の先頭に `_` を付与
/// - 空の場合は `"file"`
pub fn safe_filename(name: &str) -> String {
    let replaced = ILLEGAL_CHARS.replace_all(name.trim(), "_");
    let mut safe = replaced.trim_end_matches([' ', '.']).to_string();

    if RESERVED_NAMES.contains(&safe.to_uppercase().as_str()) {
        safe.insert(0, '_');
    }

    if safe.is_empty() {
        "file".to_string()
    } else {
        safe
    }
}

/// ファイル名の語幹から見積タイトルを生成（`_` を空白に置換）
pub fn title_from_stem(stem: &str) -> String {
    stem.replace('_', " ")
}
