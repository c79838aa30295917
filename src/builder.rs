//! Builder Module
//!
//! Fluent Builder APIを提供し、`QuoteEngine`インスタンスを段階的に構築する。

use std::io::{Read, Seek};
use std::path::PathBuf;

use chrono::Local;
use tracing::{debug, info};

use crate::aggregate::{grand_total, group_by_category};
use crate::api::{CanonicalField, SheetSelector};
use crate::config::QuoteDefaults;
use crate::counter::{QuoteCounter, DEFAULT_COUNTER_PATH, DEFAULT_PREFIX};
use crate::document::{NormalizedQuote, QuoteDocument};
use crate::error::QuoteError;
use crate::headers::{resolve_columns, FieldCandidates};
use crate::items::ItemDeriver;
use crate::parser::WorkbookReader;
use crate::types::RawTable;

/// 見積処理の設定を保持する内部構造体
#[derive(Debug, Clone)]
pub(crate) struct QuoteConfig {
    /// 明細シートの選択方式
    pub sheet_selector: SheetSelector,

    /// ヘッダーのエイリアス候補表
    pub candidates: FieldCandidates,

    /// カウンターファイルのパス
    pub counter_path: PathBuf,

    /// 見積番号のプレフィックス
    pub prefix: String,

    /// 担当者・会社情報などの既定値
    pub defaults: QuoteDefaults,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            sheet_selector: SheetSelector::Preferred,
            candidates: FieldCandidates::default(),
            counter_path: PathBuf::from(DEFAULT_COUNTER_PATH),
            prefix: DEFAULT_PREFIX.to_string(),
            defaults: QuoteDefaults::default(),
        }
    }
}

/// Fluent Builder APIを提供する構造体
///
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust,no_run
/// use xlsxquote::{QuoteBuilder, SheetSelector};
///
/// # fn main() -> Result<(), xlsxquote::QuoteError> {
/// let engine = QuoteBuilder::new()
///     .with_sheet_selector(SheetSelector::Name("Items".to_string()))
///     .with_counter_path("state/quote_number.txt")
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct QuoteBuilder {
    /// 内部設定（構築中）
    config: QuoteConfig,
}

impl QuoteBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - シート選択: 優先シート名による自動選択
    /// - エイリアス候補: 組み込みの候補表
    /// - カウンターファイル: `quote_number.txt`
    /// - プレフィックス: `Q-`
    pub fn new() -> Self {
        Self {
            config: QuoteConfig::default(),
        }
    }

    /// 明細シートの選択方式を指定する
    pub fn with_sheet_selector(mut self, selector: SheetSelector) -> Self {
        self.config.sheet_selector = selector;
        self
    }

    /// フィールドのヘッダーエイリアスを置き換える（先頭ほど優先）
    ///
    /// ```rust,no_run
    /// use xlsxquote::{CanonicalField, QuoteBuilder};
    ///
    /// let builder = QuoteBuilder::new()
    ///     .with_aliases(CanonicalField::Sku, ["artikel", "sku"]);
    /// ```
    pub fn with_aliases<I, S>(mut self, field: CanonicalField, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.config.candidates.set(field, aliases);
        self
    }

    /// カウンターファイルのパスを指定する
    pub fn with_counter_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.counter_path = path.into();
        self
    }

    /// 見積番号のプレフィックスを指定する
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.prefix = prefix.into();
        self
    }

    /// 担当者・会社情報などの既定値を指定する
    pub fn with_defaults(mut self, defaults: QuoteDefaults) -> Self {
        self.config.defaults = defaults;
        self
    }

    /// 設定を検証し、`QuoteEngine`インスタンスを生成する
    ///
    /// # 発生し得るエラー
    ///
    /// * `QuoteError::Config(String)`: 設定の検証に失敗した場合
    ///   * エイリアスが空、または空白のみのエイリアスを含む
    ///   * カウンターファイルのパスが空
    pub fn build(self) -> Result<QuoteEngine, QuoteError> {
        // 1. エイリアス候補表の検証
        self.config.candidates.validate().map_err(QuoteError::Config)?;

        // 2. カウンターファイルパスの検証
        if self.config.counter_path.as_os_str().is_empty() {
            return Err(QuoteError::Config("Counter path must not be empty".to_string()));
        }

        // 3. QuoteEngineインスタンス生成
        Ok(QuoteEngine::new(self.config))
    }
}

/// 見積処理のファサード
///
/// 表の読み込み → ヘッダー解決 → 明細導出 → カテゴリ集計 → 見積番号発行 の流れを束ねます。
///
/// # 使用例
///
/// ```rust,no_run
/// use std::fs::File;
/// use xlsxquote::QuoteBuilder;
///
/// # fn main() -> Result<(), xlsxquote::QuoteError> {
/// let engine = QuoteBuilder::new().build()?;
/// let input = File::open("Acme_Renewal.xlsx")?;
/// let document = engine.prepare(input, "Acme Renewal")?;
/// println!("{}", document.to_json()?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct QuoteEngine {
    /// 見積処理の設定
    config: QuoteConfig,

    /// 明細デリバー
    deriver: ItemDeriver,

    /// 見積番号カウンター
    counter: QuoteCounter,
}

impl QuoteEngine {
    pub(crate) fn new(config: QuoteConfig) -> Self {
        Self {
            deriver: ItemDeriver::new(),
            counter: QuoteCounter::new(config.counter_path.clone(), config.prefix.clone()),
            config,
        }
    }

    /// 見積番号カウンター
    pub fn counter(&self) -> &QuoteCounter {
        &self.counter
    }

    /// スプレッドシートから明細シートを読み込む
    ///
    /// # 戻り値
    ///
    /// * `Ok((String, RawTable))` - 選択されたシート名と表データ
    /// * `Err(QuoteError)` - 入力が読めない、またはシートの選択に失敗した場合
    pub fn read_table<R: Read + Seek>(&self, input: R) -> Result<(String, RawTable), QuoteError> {
        let mut reader = WorkbookReader::open(input)?;
        let sheet = reader.select_sheet(&self.config.sheet_selector)?;
        let table = reader.read_table(&sheet)?;
        Ok((sheet, table))
    }

    /// 表データを正規化する（I/Oなし）
    ///
    /// 不正な行・セルは既定値にフォールバックするため、この処理は失敗しません。
    pub fn normalize(&self, table: &RawTable) -> NormalizedQuote {
        let mapping = resolve_columns(table.headers(), &self.config.candidates);
        debug!(resolved = mapping.resolved_count(), ?mapping, "resolved columns");

        let items = self.deriver.derive(table, &mapping);
        let groups = group_by_category(&items);
        let total = grand_total(&items);

        NormalizedQuote {
            mapping,
            items,
            groups,
            total,
        }
    }

    /// 見積番号を発行し、見積ドキュメントを組み立てる
    ///
    /// 見積番号はカウンターファイルへの書き込みが成功してから使用されます。
    pub fn issue(
        &self,
        normalized: NormalizedQuote,
        title: &str,
        sheet: Option<String>,
    ) -> Result<QuoteDocument, QuoteError> {
        let quote_number = self.counter.issue_next()?;

        let mut defaults = self.config.defaults.clone();
        if defaults.date.trim().is_empty() {
            defaults.date = Local::now().date_naive().format("%Y-%m-%d").to_string();
        }
        let notes = defaults.effective_notes();

        info!(
            quote_number = %quote_number,
            items = normalized.items.len(),
            categories = normalized.groups.len(),
            total = normalized.total,
            "assembled quote document"
        );

        Ok(QuoteDocument {
            quote_number,
            title: title.to_string(),
            sheet,
            items: normalized.items,
            items_by_category: normalized.groups,
            total: normalized.total,
            defaults,
            notes,
        })
    }

    /// スプレッドシートから見積ドキュメントを生成する
    ///
    /// # 処理フロー
    ///
    /// 1. 明細シートの選択と読み込み
    /// 2. ヘッダー解決・明細導出・カテゴリ集計
    /// 3. 見積番号の発行
    pub fn prepare<R: Read + Seek>(&self, input: R, title: &str) -> Result<QuoteDocument, QuoteError> {
        let (sheet, table) = self.read_table(input)?;
        let normalized = self.normalize(&table);
        self.issue(normalized, title, Some(sheet))
    }
}
