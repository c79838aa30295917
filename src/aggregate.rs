//! Category Aggregator Module
//!
//! 明細をカテゴリごとにグループ化し、小計と総計を計算するモジュール。

use std::collections::HashMap;

use crate::types::{CategoryGroup, LineItem, UNCATEGORIZED};

/// カテゴリ名の正規化（前後空白除去、空の場合は `Uncategorized`）
pub(crate) fn category_name(raw: &str) -> &str {
    match raw.trim() {
        "" => UNCATEGORIZED,
        name => name,
    }
}

/// NaNを無視する総和
///
/// 1つの壊れた数値が合計全体をNaNにしないよう、NaNの項は加算しません。
pub fn nan_tolerant_sum<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    values.into_iter().filter(|v| !v.is_nan()).sum()
}

/// 明細をカテゴリごとにグループ化
///
/// グループの順序は各カテゴリが最初に現れた順、グループ内の明細は元の順序を維持します。
pub fn group_by_category(items: &[LineItem]) -> Vec<CategoryGroup> {
    let mut groups: Vec<CategoryGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for item in items {
        let name = category_name(&item.category);
        let slot = match index.get(name) {
            Some(&slot) => slot,
            None => {
                index.insert(name.to_string(), groups.len());
                groups.push(CategoryGroup {
                    category: name.to_string(),
                    items: Vec::new(),
                    subtotal: 0.0,
                });
                groups.len() - 1
            }
        };

        let group = &mut groups[slot];
        if !item.subtotal.is_nan() {
            group.subtotal += item.subtotal;
        }
        group.items.push(item.clone());
    }

    groups
}

/// 全明細の総計（NaNを無視）
pub fn grand_total(items: &[LineItem]) -> f64 {
    nan_tolerant_sum(items.iter().map(|item| item.subtotal))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(sku: &str, category: &str, subtotal: f64) -> LineItem {
        LineItem {
            sku: sku.to_string(),
            qty: 1,
            description: String::new(),
            list_price: None,
            unit_price: subtotal,
            subtotal,
            notes: String::new(),
            category: category.to_string(),
            start_date: String::new(),
            end_date: String::new(),
        }
    }

    #[test]
    fn test_first_seen_order() {
        let items = vec![item("1", "B", 1.0), item("2", "A", 2.0), item("3", "B", 3.0)];
        let groups = group_by_category(&items);

        let names: Vec<&str> = groups.iter().map(|g| g.category.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
        assert_eq!(groups[0].subtotal, 4.0);
        assert_eq!(groups[1].subtotal, 2.0);

        let skus: Vec<&str> = groups[0].items.iter().map(|i| i.sku.as_str()).collect();
        assert_eq!(skus, vec!["1", "3"]);
    }

    #[test]
    fn test_blank_category_is_uncategorized() {
        let items = vec![item("1", "  ", 1.0), item("2", UNCATEGORIZED, 2.0), item("3", " Hw ", 3.0)];
        let groups = group_by_category(&items);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].category, UNCATEGORIZED);
        assert_eq!(groups[0].items.len(), 2);
        assert_eq!(groups[1].category, "Hw");
    }

    #[test]
    fn test_nan_does_not_poison_totals() {
        let items = vec![item("1", "A", 10.0), item("2", "A", f64::NAN), item("3", "B", 5.0)];
        assert_eq!(grand_total(&items), 15.0);

        let groups = group_by_category(&items);
        assert_eq!(groups[0].subtotal, 10.0);
        assert_eq!(groups[0].items.len(), 2);
    }

    #[test]
    fn test_empty_items() {
        assert!(group_by_category(&[]).is_empty());
        assert_eq!(grand_total(&[]), 0.0);
    }

    // プロパティベーステスト
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// 総計 == カテゴリ小計の和 == 明細小計の和
            #[test]
            fn test_totals_agree_for_any_partition(
                entries in proptest::collection::vec((0usize..4, -1000i32..1000), 0..40)
            ) {
                let categories = ["A", "B", "", "C"];
                let items: Vec<LineItem> = entries
                    .iter()
                    .enumerate()
                    .map(|(i, (c, cents))| item(&i.to_string(), categories[*c], f64::from(*cents) / 4.0))
                    .collect();

                let groups = group_by_category(&items);
                let total = grand_total(&items);
                let by_group = nan_tolerant_sum(groups.iter().map(|g| g.subtotal));
                let by_item: f64 = items.iter().map(|i| i.subtotal).sum();

                prop_assert!((total - by_group).abs() < 1e-6);
                prop_assert!((total - by_item).abs() < 1e-6);
                prop_assert_eq!(groups.iter().map(|g| g.items.len()).sum::<usize>(), items.len());
            }
        }
    }
}
