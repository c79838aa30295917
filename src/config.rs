//! Quote Defaults Module
//!
//! 見積ドキュメントに付与する担当者・会社情報などの既定値を定義するモジュール。
//! グローバル状態ではなく、`QuoteBuilder::with_defaults()` で明示的に渡します。

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::QuoteError;

/// 備考が設定されていない場合に付与する備考
pub(crate) const MISSING_NOTES: &str =
    "This quote is missing notes. Please contact your account representative.";

/// 見積の既定値
///
/// すべての項目に既定値があり、JSONでは必要な項目のみを指定できます。
///
/// ```rust
/// use xlsxquote::QuoteDefaults;
///
/// let json = r#"{ "comp_name": "Acme Corp", "currency": "CAD" }"#;
/// let defaults = QuoteDefaults::from_reader(json.as_bytes()).unwrap();
/// assert_eq!(defaults.comp_name, "Acme Corp");
/// assert_eq!(defaults.currency, "CAD");
/// assert!(defaults.notes.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteDefaults {
    /// 見積日（空の場合は発行時のローカル日付）
    pub date: String,
    /// 有効期限
    pub expiry: String,
    /// 支払条件
    pub payment_terms: String,
    /// 通貨
    pub currency: String,

    /// 担当者名
    pub owner_name: String,
    /// 担当者メールアドレス
    pub owner_email: String,
    /// 担当者電話番号
    pub owner_phone: String,
    /// 営業窓口メールアドレス
    pub sales_desk_email: String,

    /// 顧客担当者名
    pub contact_name: String,
    /// 顧客会社名
    pub comp_name: String,
    /// 顧客住所
    pub comp_address: String,
    pub comp_city: String,
    pub comp_state: String,
    pub comp_zip: String,
    pub comp_phone: String,

    /// 契約期間
    pub term: String,
    pub incoterms: String,
    pub duty: String,
    pub taxes: String,

    /// 金額を整数に丸めて表示するか（レンダラー向けのフラグ）
    pub round_values: bool,

    /// 見積全体の備考
    pub notes: Vec<String>,
}

impl Default for QuoteDefaults {
    fn default() -> Self {
        Self {
            date: String::new(),
            expiry: String::new(),
            payment_terms: String::new(),
            currency: "USD".to_string(),
            owner_name: String::new(),
            owner_email: String::new(),
            owner_phone: String::new(),
            sales_desk_email: String::new(),
            contact_name: String::new(),
            comp_name: String::new(),
            comp_address: String::new(),
            comp_city: String::new(),
            comp_state: String::new(),
            comp_zip: String::new(),
            comp_phone: String::new(),
            term: String::new(),
            incoterms: String::new(),
            duty: String::new(),
            taxes: String::new(),
            round_values: false,
            notes: Vec::new(),
        }
    }
}

impl QuoteDefaults {
    /// JSONから読み込む
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, QuoteError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// JSONファイルから読み込む
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, QuoteError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// ドキュメントに載せる備考（未設定の場合は案内文1件）
    pub(crate) fn effective_notes(&self) -> Vec<String> {
        if self.notes.is_empty() {
            vec![MISSING_NOTES.to_string()]
        } else {
            self.notes.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let defaults = QuoteDefaults::default();
        assert_eq!(defaults.currency, "USD");
        assert!(!defaults.round_values);
        assert_eq!(defaults.effective_notes(), vec![MISSING_NOTES.to_string()]);
    }

    #[test]
    fn test_partial_json() {
        let json = r#"{
            "owner_name": "Dana",
            "round_values": true,
            "notes": ["Prices valid for 30 days"]
        }"#;
        let defaults = QuoteDefaults::from_reader(json.as_bytes()).unwrap();
        assert_eq!(defaults.owner_name, "Dana");
        assert!(defaults.round_values);
        assert_eq!(defaults.currency, "USD");
        assert_eq!(defaults.effective_notes(), vec!["Prices valid for 30 days".to_string()]);
    }

    #[test]
    fn test_invalid_json() {
        let result = QuoteDefaults::from_reader("[1, 2".as_bytes());
        assert!(matches!(result, Err(QuoteError::Json(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = QuoteDefaults::from_path("definitely/not/here.json");
        assert!(matches!(result, Err(QuoteError::Io(_))));
    }
}
