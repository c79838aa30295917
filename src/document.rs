//! Quote Document Module
//!
//! レンダリング側（HTMLテンプレート、PDF出力など）へ引き渡す見積ドキュメントを定義するモジュール。

use std::io::Write;

use serde::Serialize;

use crate::config::QuoteDefaults;
use crate::error::QuoteError;
use crate::filename::safe_filename;
use crate::headers::ColumnMapping;
use crate::types::{CategoryGroup, LineItem};

/// 正規化済みの明細データ（見積番号の発行前）
///
/// I/Oを伴わない正規化処理の結果です。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedQuote {
    /// 使用した列対応表
    pub mapping: ColumnMapping,

    /// 明細（元の行順）
    pub items: Vec<LineItem>,

    /// カテゴリ別グループ（初出順）
    pub groups: Vec<CategoryGroup>,

    /// 総計
    pub total: f64,
}

/// 見積ドキュメント
///
/// 見積番号・明細・カテゴリ別グループ・総計・既定値をまとめた、
/// レンダラー向けの受け渡しデータです。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteDocument {
    /// 見積番号（例: `Q-1024`）
    pub quote_number: String,

    /// 見積タイトル（通常は入力ファイル名から生成）
    pub title: String,

    /// 明細を読み込んだシート名
    pub sheet: Option<String>,

    /// 明細（元の行順）
    pub items: Vec<LineItem>,

    /// カテゴリ別グループ（初出順）
    pub items_by_category: Vec<CategoryGroup>,

    /// 総計
    pub total: f64,

    /// 担当者・会社情報などの既定値
    pub defaults: QuoteDefaults,

    /// 見積全体の備考
    pub notes: Vec<String>,
}

impl QuoteDocument {
    /// JSON文字列に変換（整形済み）
    pub fn to_json(&self) -> Result<String, QuoteError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// JSONとして書き出す
    pub fn write_json<W: Write>(&self, writer: W) -> Result<(), QuoteError> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// 既定の出力ファイル名（拡張子なし）
    ///
    /// `"<タイトル> - <見積番号>"` の形式で、各部分は安全なファイル名に変換されます。
    pub fn file_stem(&self) -> String {
        format!(
            "{} - {}",
            safe_filename(&self.title),
            safe_filename(&self.quote_number)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> QuoteDocument {
        QuoteDocument {
            quote_number: "Q-7".to_string(),
            title: "Acme: Renewal?".to_string(),
            sheet: Some("Items".to_string()),
            items: Vec::new(),
            items_by_category: Vec::new(),
            total: 0.0,
            defaults: QuoteDefaults::default(),
            notes: vec!["n".to_string()],
        }
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(document().file_stem(), "Acme_ Renewal_ - Q-7");
    }

    #[test]
    fn test_to_json() {
        let json = document().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["quote_number"], "Q-7");
        assert_eq!(value["sheet"], "Items");
        assert_eq!(value["defaults"]["currency"], "USD");
        assert!(value["items_by_category"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_write_json() {
        let mut buffer = Vec::new();
        document().write_json(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("\"title\": \"Acme: Renewal?\""));
    }
}
