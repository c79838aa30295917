//! Public API Types
//!
//! 公開APIで使用する列挙型を定義するモジュール。

use serde::Serialize;

/// 明細シートの選択方式
///
/// 見積明細を読み込むシートを選択する方法を指定します。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum SheetSelector {
    /// 優先シート名による自動選択（デフォルト）
    ///
    /// `items`, `quote`, `lines`, `sheet1`, `my customer deal` の順に、
    /// 大文字小文字を区別せずシート名を照合します。
    /// いずれにも一致しない場合は先頭のシートを使用します。
    #[default]
    Preferred,

    /// インデックス指定（0始まり）
    ///
    /// 例: `SheetSelector::Index(0)` は最初のシートを選択
    Index(usize),

    /// シート名指定（完全一致）
    ///
    /// 例: `SheetSelector::Name("Items".to_string())`
    Name(String),
}

/// 優先的に明細シートとして扱うシート名（小文字、優先順）
pub(crate) const PREFERRED_SHEETS: &[&str] = &["items", "quote", "lines", "sheet1", "my customer deal"];

/// 正規フィールド
///
/// スプレッドシートの列ヘッダーを対応付ける、明細行の意味的な属性です。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    /// 品番
    Sku,
    /// 数量
    Qty,
    /// 品名・説明
    Description,
    /// 単価（定価系）
    UnitPrice,
    /// 割引率（0〜1）
    Discount,
    /// 割引後価格（行合計として扱う）
    DiscountPrice,
    /// 拡張価格（解決はするが金額計算には使用しない）
    Extended,
    /// 備考
    Notes,
    /// カテゴリ
    Category,
    /// 開始日
    StartDate,
    /// 終了日
    EndDate,
}

impl CanonicalField {
    /// すべての正規フィールド（定義順）
    pub const ALL: [CanonicalField; 11] = [
        CanonicalField::Sku,
        CanonicalField::Qty,
        CanonicalField::Description,
        CanonicalField::UnitPrice,
        CanonicalField::Discount,
        CanonicalField::DiscountPrice,
        CanonicalField::Extended,
        CanonicalField::Notes,
        CanonicalField::Category,
        CanonicalField::StartDate,
        CanonicalField::EndDate,
    ];

    /// フィールド名（snake_case）
    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::Sku => "sku",
            CanonicalField::Qty => "qty",
            CanonicalField::Description => "description",
            CanonicalField::UnitPrice => "unit_price",
            CanonicalField::Discount => "discount",
            CanonicalField::DiscountPrice => "discount_price",
            CanonicalField::Extended => "extended",
            CanonicalField::Notes => "notes",
            CanonicalField::Category => "category",
            CanonicalField::StartDate => "start_date",
            CanonicalField::EndDate => "end_date",
        }
    }
}

impl std::fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
