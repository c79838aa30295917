//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// カテゴリ未設定の明細に割り当てるカテゴリ名
pub const UNCATEGORIZED: &str = "Uncategorized";

/// セルの値を表す列挙型
///
/// 1つの列に数値・文字列・日付・空セルが混在し得るため、
/// 値はタグ付きで保持し、変換は明示的な関数で行います。
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// 数値（f64）
    Number(f64),

    /// 文字列
    Text(String),

    /// 日付・日時
    Date(NaiveDateTime),

    /// 空セル
    Empty,
}

impl Cell {
    /// 値が空白かどうかを判定
    ///
    /// 空セル、NaN、空白のみの文字列を空白として扱います。
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Number(n) => n.is_nan(),
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Date(_) => false,
        }
    }

    /// 値を表示用の文字列として取得（前後の空白は除去）
    ///
    /// 整数値の数値は `.0` を付けずに出力します（例: `1001.0` → `"1001"`）。
    /// 日付は `YYYY-MM-DD` 形式になります。
    pub fn to_text(&self) -> String {
        match self {
            Cell::Number(n) if n.is_nan() => String::new(),
            Cell::Number(n) => format_number(*n),
            Cell::Text(s) => s.trim().to_string(),
            Cell::Date(dt) => dt.format("%Y-%m-%d").to_string(),
            Cell::Empty => String::new(),
        }
    }
}

/// 数値を文字列化（整数値は小数点なし）
pub(crate) fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Number(value as f64)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<NaiveDate> for Cell {
    fn from(value: NaiveDate) -> Self {
        Cell::Date(value.and_hms_opt(0, 0, 0).unwrap_or_default())
    }
}

impl From<NaiveDateTime> for Cell {
    fn from(value: NaiveDateTime) -> Self {
        Cell::Date(value)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Cell::Empty)
    }
}

/// スプレッドシートから読み込んだ生の表データ
///
/// ヘッダー行と、ヘッダーに位置で対応するデータ行を保持します。
/// ヘッダーは一意である保証も、空でない保証もありません。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl RawTable {
    /// ヘッダーとデータ行から表を生成
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { headers, rows }
    }

    /// ヘッダー行
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// データ行
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// データ行数
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// データ行が存在しないかどうか
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 行を追加
    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    /// 指定位置のセルを取得（範囲外は空セル）
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&Cell::Empty)
    }
}

/// 正規化された見積明細
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItem {
    /// 品番（空の場合あり）
    pub sku: String,

    /// 数量（1以上）
    pub qty: u64,

    /// 品名・説明
    pub description: String,

    /// 定価（割引前、表示用）
    pub list_price: Option<f64>,

    /// 単価（割引後）
    ///
    /// 割引後価格列が存在する場合は `subtotal / qty` から逆算されます。
    pub unit_price: f64,

    /// 行合計
    ///
    /// 下流が信頼する金額はこの値です。どの導出経路でも常に行合計を表します。
    pub subtotal: f64,

    /// 備考
    pub notes: String,

    /// カテゴリ（空の場合は `Uncategorized`）
    pub category: String,

    /// 開始日（ISO形式、または空）
    pub start_date: String,

    /// 終了日（ISO形式、または空）
    pub end_date: String,
}

/// カテゴリごとの明細グループ
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryGroup {
    /// カテゴリ名
    pub category: String,

    /// 明細（元の行順）
    pub items: Vec<LineItem>,

    /// グループ内の行合計の和
    pub subtotal: f64,
}
