//! Header Resolver Module
//!
//! 人が書いた任意の列ヘッダーを正規フィールドへ対応付けるモジュール。
//!
//! 照合はフィールドごとに次の順で行います。
//!
//! 1. 完全一致（大文字小文字を区別しない）: エイリアスの優先順、同順位は左側の列
//! 2. 部分一致: エイリアスがヘッダーに含まれる場合。優先順は完全一致と同じ
//! 3. いずれにも一致しない場合は未解決（任意列のため正常な結果）
//!
//! 部分一致は曖昧になり得ます（例: `discount` は `Discount Price` 列にも一致します）。
//! 照合規則を変えると受理されるシートが黙って変わるため、規則はこのまま維持します。

use std::collections::BTreeMap;

use serde::Serialize;

use crate::api::CanonicalField;

/// ヘッダー比較用の正規化（前後空白除去 + 小文字化）
pub(crate) fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase()
}

/// 正規フィールドごとのエイリアス候補表
///
/// 各リストは小文字で、先頭ほど優先されます。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCandidates {
    aliases: BTreeMap<CanonicalField, Vec<String>>,
}

impl Default for FieldCandidates {
    fn default() -> Self {
        let table: [(CanonicalField, &[&str]); 11] = [
            (
                CanonicalField::Sku,
                &["sku", "part", "item", "product", "pn", "part number", "mpn", "partner sku"],
            ),
            (CanonicalField::Qty, &["qty", "quantity", "qnty", "q'ty"]),
            (
                CanonicalField::Description,
                &["description", "desc", "product description", "item description"],
            ),
            (
                CanonicalField::UnitPrice,
                &["unit price", "price", "list price", "unitprice", "price ea", "each"],
            ),
            (CanonicalField::Discount, &["discount"]),
            (
                CanonicalField::DiscountPrice,
                &["discount price", "discounted price", "sell price", "your price", "net price"],
            ),
            (
                CanonicalField::Extended,
                &["extended", "extended price", "ext", "subtotal", "line total", "amount"],
            ),
            (CanonicalField::Notes, &["notes", "note", "comments", "line notes"]),
            (
                CanonicalField::Category,
                &["product type", "category", "product category", "type"],
            ),
            (
                CanonicalField::StartDate,
                &["start date", "start", "service start", "begin", "term start"],
            ),
            (
                CanonicalField::EndDate,
                &["end date", "end", "service end", "finish", "term end"],
            ),
        ];

        let aliases = table
            .into_iter()
            .map(|(field, names)| (field, names.iter().map(|s| s.to_string()).collect()))
            .collect();

        Self { aliases }
    }
}

impl FieldCandidates {
    /// 指定フィールドのエイリアスを置き換える
    ///
    /// エイリアスは正規化（前後空白除去 + 小文字化）して保持します。
    pub fn set<I, S>(&mut self, field: CanonicalField, aliases: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let normalized = aliases
            .into_iter()
            .map(|a| normalize_header(a.as_ref()))
            .collect();
        self.aliases.insert(field, normalized);
    }

    /// 指定フィールドのエイリアス（優先順）
    pub fn aliases(&self, field: CanonicalField) -> &[String] {
        self.aliases.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// エイリアス表の妥当性を検証
    ///
    /// 空文字のエイリアスはすべてのヘッダーに部分一致してしまうため拒否します。
    pub(crate) fn validate(&self) -> Result<(), String> {
        for field in CanonicalField::ALL {
            let aliases = self.aliases(field);
            if aliases.is_empty() {
                return Err(format!("No header aliases configured for field '{}'", field));
            }
            if aliases.iter().any(|a| a.is_empty()) {
                return Err(format!("Blank header alias configured for field '{}'", field));
            }
        }
        Ok(())
    }
}

/// 解決済みの列
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedColumn {
    /// 正規化済みヘッダー文字列
    pub header: String,

    /// 列インデックス（0始まり）
    pub index: usize,
}

/// 正規フィールド → 列の対応表
///
/// 各フィールドは高々1つの列に対応します。未解決のフィールドはエントリを持ちません。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnMapping {
    columns: BTreeMap<CanonicalField, ResolvedColumn>,
}

impl ColumnMapping {
    /// フィールドに対応する列
    pub fn get(&self, field: CanonicalField) -> Option<&ResolvedColumn> {
        self.columns.get(&field)
    }

    /// フィールドに対応するヘッダー文字列
    pub fn header(&self, field: CanonicalField) -> Option<&str> {
        self.get(field).map(|c| c.header.as_str())
    }

    /// フィールドに対応する列インデックス
    pub fn index(&self, field: CanonicalField) -> Option<usize> {
        self.get(field).map(|c| c.index)
    }

    /// 解決済みフィールドの数
    pub fn resolved_count(&self) -> usize {
        self.columns.len()
    }
}

/// ヘッダー行と候補表から列対応表を生成
///
/// 同じ入力に対しては常に同じ結果を返します。
pub fn resolve_columns<S: AsRef<str>>(headers: &[S], candidates: &FieldCandidates) -> ColumnMapping {
    let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h.as_ref())).collect();

    let mut columns = BTreeMap::new();
    for field in CanonicalField::ALL {
        if let Some(index) = pick_column(&normalized, candidates.aliases(field)) {
            columns.insert(
                field,
                ResolvedColumn {
                    header: normalized[index].clone(),
                    index,
                },
            );
        }
    }

    ColumnMapping { columns }
}

/// エイリアス候補から列を選択（完全一致 → 部分一致）
fn pick_column(headers: &[String], aliases: &[String]) -> Option<usize> {
    aliases
        .iter()
        .find_map(|alias| headers.iter().position(|h| h == alias))
        .or_else(|| {
            aliases.iter().filter(|a| !a.is_empty()).find_map(|alias| {
                headers.iter().position(|h| h.contains(alias.as_str()))
            })
        })
}
