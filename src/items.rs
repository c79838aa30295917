//! Item Deriver Module
//!
//! 表の各行から正規化済みの見積明細を導出するモジュール。
//!
//! # 金額の導出順序
//!
//! 1. 割引後価格列（行合計として扱う）が数値の場合: `subtotal = V`, `unit_price = V / qty`
//! 2. 単価列が数値の場合: `unit_price = 定価 × (1 - 割引率)`, `subtotal = unit_price × qty`
//! 3. いずれも無い場合: `unit_price = 0`, `subtotal = 0`
//!
//! 入力の拡張価格列は信頼せず、常に再計算します。
//! 不正なセルは既定値にフォールバックし、バッチ全体を中断することはありません。

use tracing::debug;

use crate::api::CanonicalField;
use crate::dates::DateNormalizer;
use crate::headers::ColumnMapping;
use crate::types::{Cell, LineItem, RawTable, UNCATEGORIZED};

/// 合計行として扱う先頭列の値（小文字）
const TOTALS_MARKER: &str = "totals";

/// 先頭で除去する通貨記号
const CURRENCY_SYMBOLS: &[char] = &['$', '€', '£', '¥'];

/// 価格系セルを数値として解釈
///
/// 桁区切りのカンマと先頭の通貨記号を除去してから変換します。
/// 解釈できない場合は `None`（値なし）を返し、明示的な0とは区別します。
pub fn parse_number(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Number(n) if n.is_nan() => None,
        Cell::Number(n) => Some(*n),
        Cell::Text(s) => parse_number_text(s),
        Cell::Date(_) | Cell::Empty => None,
    }
}

fn parse_number_text(text: &str) -> Option<f64> {
    let cleaned: String = text.chars().filter(|c| *c != ',').collect();
    let trimmed = cleaned.trim();

    let (sign, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let digits = rest.strip_prefix(CURRENCY_SYMBOLS).unwrap_or(rest).trim_start();

    let value: f64 = format!("{}{}", sign, digits).parse().ok()?;
    if value.is_nan() {
        None
    } else {
        Some(value)
    }
}

/// 割引率セルを0〜1の小数として解釈
///
/// `%` で終わる文字列は百分率として100で割ります（例: `"15%"` → `0.15`）。
pub(crate) fn parse_fraction(cell: &Cell) -> Option<f64> {
    if let Cell::Text(s) = cell {
        if let Some(percent) = s.trim().strip_suffix('%') {
            return parse_number_text(percent).map(|p| p / 100.0);
        }
    }
    parse_number(cell)
}

/// 数量を解釈（欠落・非数値・0以下は1、整数に切り捨て、常に1以上）
///
/// `u64`の上限を超える値は上限に丸めます。金額の計算には丸めた後の数量を使用します。
pub(crate) fn parse_qty(cell: &Cell) -> u64 {
    match parse_number(cell) {
        Some(q) if q.is_finite() && q > 0.0 => (q.trunc() as u64).max(1),
        _ => 1,
    }
}

/// 文字列項目を取得（`"nan"` は空として扱う）
fn text_field(cell: &Cell) -> String {
    match cell.to_text() {
        t if t.eq_ignore_ascii_case("nan") => String::new(),
        t => t,
    }
}

/// 明細デリバー
///
/// 列対応表と日付ノーマライザーを使用して、表の各行を明細に変換します。
#[derive(Debug, Default, Clone)]
pub struct ItemDeriver {
    /// 日付ノーマライザー
    date_normalizer: DateNormalizer,
}

impl ItemDeriver {
    /// 新しいItemDeriverインスタンスを生成
    pub fn new() -> Self {
        Self {
            date_normalizer: DateNormalizer,
        }
    }

    /// 表全体から明細を導出（行順を維持）
    pub fn derive(&self, table: &RawTable, mapping: &ColumnMapping) -> Vec<LineItem> {
        let mut items = Vec::with_capacity(table.len());
        for (row_idx, row) in table.rows().iter().enumerate() {
            match self.derive_row(row, mapping) {
                Some(item) => items.push(item),
                None => debug!(row = row_idx, "skipped row"),
            }
        }
        items
    }

    /// 1行から明細を導出
    ///
    /// 品番・説明がともに空の行と、合計行は `None` を返します。
    pub fn derive_row(&self, row: &[Cell], mapping: &ColumnMapping) -> Option<LineItem> {
        let cell = |field: CanonicalField| {
            mapping
                .index(field)
                .and_then(|idx| row.get(idx))
                .unwrap_or(&Cell::Empty)
        };

        let sku = text_field(cell(CanonicalField::Sku));
        let description = text_field(cell(CanonicalField::Description));
        if sku.is_empty() && description.is_empty() {
            return None;
        }

        if let Some(Cell::Text(first)) = row.first() {
            if first.trim().eq_ignore_ascii_case(TOTALS_MARKER) {
                return None;
            }
        }

        let qty = parse_qty(cell(CanonicalField::Qty));
        let qty_f = qty as f64;
        let list_price = parse_number(cell(CanonicalField::UnitPrice));

        let (unit_price, subtotal) = match parse_number(cell(CanonicalField::DiscountPrice)) {
            Some(line_total) => (line_total / qty_f, line_total),
            None => match list_price {
                Some(list) => {
                    let discount = parse_fraction(cell(CanonicalField::Discount)).unwrap_or(0.0);
                    let effective = list * (1.0 - discount);
                    (effective, effective * qty_f)
                }
                None => (0.0, 0.0),
            },
        };

        let category = match cell(CanonicalField::Category).to_text() {
            c if c.is_empty() => UNCATEGORIZED.to_string(),
            c => c,
        };

        Some(LineItem {
            sku,
            qty,
            description,
            list_price,
            unit_price,
            subtotal,
            notes: cell(CanonicalField::Notes).to_text(),
            category,
            start_date: self.date_normalizer.normalize(cell(CanonicalField::StartDate)),
            end_date: self.date_normalizer.normalize(cell(CanonicalField::EndDate)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headers::{resolve_columns, FieldCandidates};

    fn table(headers: &[&str], rows: Vec<Vec<Cell>>) -> RawTable {
        RawTable::new(headers.iter().map(|s| s.to_string()).collect(), rows)
    }

    fn derive(table: &RawTable) -> Vec<LineItem> {
        let mapping = resolve_columns(table.headers(), &FieldCandidates::default());
        ItemDeriver::new().derive(table, &mapping)
    }

    // 数値解釈のテスト
    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(&Cell::Number(12.5)), Some(12.5));
        assert_eq!(parse_number(&Cell::from("$1,234.50")), Some(1234.5));
        assert_eq!(parse_number(&Cell::from(" € 99 ")), Some(99.0));
        assert_eq!(parse_number(&Cell::from("-$5")), Some(-5.0));
        assert_eq!(parse_number(&Cell::from("0")), Some(0.0));
        assert_eq!(parse_number(&Cell::from("n/a")), None);
        assert_eq!(parse_number(&Cell::from("")), None);
        assert_eq!(parse_number(&Cell::from("nan")), None);
        assert_eq!(parse_number(&Cell::Number(f64::NAN)), None);
        assert_eq!(parse_number(&Cell::Empty), None);
    }

    #[test]
    fn test_parse_fraction() {
        assert_eq!(parse_fraction(&Cell::Number(0.2)), Some(0.2));
        assert_eq!(parse_fraction(&Cell::from("15%")), Some(0.15));
        assert_eq!(parse_fraction(&Cell::from("0.1")), Some(0.1));
        assert_eq!(parse_fraction(&Cell::from("abc%")), None);
    }

    #[test]
    fn test_parse_qty() {
        assert_eq!(parse_qty(&Cell::Number(3.0)), 3);
        assert_eq!(parse_qty(&Cell::Number(2.7)), 2);
        assert_eq!(parse_qty(&Cell::Number(0.5)), 1);
        assert_eq!(parse_qty(&Cell::Number(0.0)), 1);
        assert_eq!(parse_qty(&Cell::Number(-4.0)), 1);
        assert_eq!(parse_qty(&Cell::from("1,000")), 1000);
        assert_eq!(parse_qty(&Cell::from("lots")), 1);
        assert_eq!(parse_qty(&Cell::Empty), 1);
        assert_eq!(parse_qty(&Cell::Number(f64::INFINITY)), 1);
        assert_eq!(parse_qty(&Cell::Number(5e9)), 5_000_000_000);
        assert_eq!(parse_qty(&Cell::Number(1e30)), u64::MAX);
    }

    #[test]
    fn test_quantity_beyond_u32() {
        let t = table(
            &["SKU", "Qty", "Your Price"],
            vec![vec![Cell::from("BULK"), Cell::Number(5e9), Cell::Number(5e9)]],
        );
        let items = derive(&t);
        assert_eq!(items[0].qty, 5_000_000_000);
        assert_eq!(items[0].subtotal, 5e9);
        assert_eq!(items[0].unit_price, 1.0);
    }

    #[test]
    fn test_nan_text_is_blank() {
        let t = table(
            &["SKU", "Description", "Your Price"],
            vec![
                vec![Cell::from("nan"), Cell::from(" NaN "), Cell::Number(5.0)],
                vec![Cell::from("NAN"), Cell::from("Widget"), Cell::Number(7.0)],
            ],
        );
        let items = derive(&t);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].sku, "");
        assert_eq!(items[0].description, "Widget");
    }

    // 金額導出のテスト
    #[test]
    fn test_discount_price_is_line_total() {
        let t = table(
            &["SKU", "Qty", "Description", "List Price", "Your Price"],
            vec![vec![
                Cell::from("A-1"),
                Cell::Number(4.0),
                Cell::from("Widget"),
                Cell::Number(100.0),
                Cell::from("$300"),
            ]],
        );
        let items = derive(&t);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].subtotal, 300.0);
        assert_eq!(items[0].unit_price, 75.0);
        assert_eq!(items[0].list_price, Some(100.0));
        assert_eq!(items[0].qty, 4);
    }

    #[test]
    fn test_fallback_list_price_with_discount() {
        let t = table(
            &["Part", "Quantity", "Desc", "Price", "Discount"],
            vec![vec![
                Cell::from("B-2"),
                Cell::Number(3.0),
                Cell::from("Gadget"),
                Cell::Number(200.0),
                Cell::Number(0.25),
            ]],
        );
        let items = derive(&t);
        assert_eq!(items[0].unit_price, 150.0);
        assert_eq!(items[0].subtotal, 450.0);
        assert_eq!(items[0].list_price, Some(200.0));
    }

    #[test]
    fn test_fallback_used_when_discount_price_not_numeric() {
        let t = table(
            &["SKU", "Qty", "Unit Price", "Net Price"],
            vec![vec![
                Cell::from("C-3"),
                Cell::Number(2.0),
                Cell::Number(10.0),
                Cell::from("TBD"),
            ]],
        );
        let items = derive(&t);
        assert_eq!(items[0].unit_price, 10.0);
        assert_eq!(items[0].subtotal, 20.0);
    }

    #[test]
    fn test_no_price_yields_zero_line() {
        let t = table(
            &["SKU", "Description"],
            vec![vec![Cell::from("D-4"), Cell::from("Mystery")]],
        );
        let items = derive(&t);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].unit_price, 0.0);
        assert_eq!(items[0].subtotal, 0.0);
        assert_eq!(items[0].list_price, None);
        assert_eq!(items[0].qty, 1);
    }

    #[test]
    fn test_extended_column_is_ignored() {
        let t = table(
            &["SKU", "Qty", "Price", "Extended"],
            vec![vec![
                Cell::from("E-5"),
                Cell::Number(2.0),
                Cell::Number(5.0),
                Cell::Number(9999.0),
            ]],
        );
        let items = derive(&t);
        assert_eq!(items[0].subtotal, 10.0);
    }

    // 行スキップのテスト
    #[test]
    fn test_skip_blank_sku_and_description() {
        let t = table(
            &["SKU", "Description", "Your Price"],
            vec![
                vec![Cell::Empty, Cell::from("  "), Cell::Number(500.0)],
                vec![Cell::from("F-6"), Cell::Empty, Cell::Number(5.0)],
            ],
        );
        let items = derive(&t);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].sku, "F-6");
    }

    #[test]
    fn test_skip_totals_row() {
        let t = table(
            &["Label", "SKU", "Description", "Your Price"],
            vec![
                vec![Cell::Empty, Cell::from("G-7"), Cell::from("Thing"), Cell::Number(5.0)],
                vec![Cell::from(" TOTALS "), Cell::Empty, Cell::from("sum"), Cell::Number(5.0)],
            ],
        );
        let items = derive(&t);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].sku, "G-7");
    }

    // メタデータのテスト
    #[test]
    fn test_metadata_fields() {
        let t = table(
            &["SKU", "Description", "Notes", "Product Type", "Start Date", "End Date"],
            vec![
                vec![
                    Cell::Number(1001.0),
                    Cell::from(" Support "),
                    Cell::from(" renew "),
                    Cell::from(" Services "),
                    Cell::Number(44197.0),
                    Cell::from("12/31/2021"),
                ],
                vec![
                    Cell::from("H-8"),
                    Cell::from("Cable"),
                    Cell::Empty,
                    Cell::from("   "),
                    Cell::from("soon"),
                    Cell::Empty,
                ],
            ],
        );
        let items = derive(&t);
        assert_eq!(items[0].sku, "1001");
        assert_eq!(items[0].description, "Support");
        assert_eq!(items[0].notes, "renew");
        assert_eq!(items[0].category, "Services");
        assert_eq!(items[0].start_date, "2021-01-01");
        assert_eq!(items[0].end_date, "2021-12-31");

        assert_eq!(items[1].notes, "");
        assert_eq!(items[1].category, UNCATEGORIZED);
        assert_eq!(items[1].start_date, "soon");
        assert_eq!(items[1].end_date, "");
    }

    // プロパティベーステスト
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// 割引後価格 V と数量 Q>0 があれば subtotal == V, unit_price == V/Q
            #[test]
            fn test_line_total_invariant(v in -1.0e10f64..1.0e10, q in 1u64..(1u64 << 53)) {
                let t = table(
                    &["SKU", "Qty", "Discount Price"],
                    vec![vec![Cell::from("P"), Cell::Number(q as f64), Cell::Number(v)]],
                );
                let items = derive(&t);
                prop_assert_eq!(items[0].qty, q);
                prop_assert_eq!(items[0].subtotal, v);
                prop_assert_eq!(items[0].unit_price, v / q as f64);
            }

            /// 数量が0以下の場合は常に1
            #[test]
            fn test_non_positive_qty_defaults_to_one(q in -1.0e6f64..=0.0) {
                let t = table(
                    &["SKU", "Qty"],
                    vec![vec![Cell::from("P"), Cell::Number(q)]],
                );
                prop_assert_eq!(derive(&t)[0].qty, 1);
            }
        }
    }
}
