//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。
//!
//! 行・セル単位の不正データはエラーにならず、既定値へフォールバックします。
//! ここで定義するエラーは、バッチ全体を中断すべき状況のみを表します。

use thiserror::Error;

/// xlsxquoteクレート全体で使用するエラー型
///
/// # エラーの種類
///
/// - `Io`: I/O操作中に発生したエラー（入力の読み込み失敗、カウンターファイルの書き込み失敗など）
/// - `Parse`: スプレッドシートの解析中に発生したエラー（calamine由来）
/// - `Json`: 見積ドキュメントまたは既定値ファイルのJSON処理エラー
/// - `Config`: 設定の検証に失敗したエラー（空のエイリアス、存在しないシートなど）
/// - `InputTooLarge`: 入力サイズが上限を超えたエラー
/// - `Counter`: 見積番号カウンターが継続できない状態
///
/// # 使用例
///
/// ```rust,no_run
/// use xlsxquote::QuoteError;
/// use std::fs::File;
///
/// fn open_sheet(path: &str) -> Result<(), QuoteError> {
///     let _file = File::open(path)?;  // Ioエラーが自動的に変換される
///     Ok(())
/// }
/// ```
#[derive(Error, Debug)]
pub enum QuoteError {
    /// I/O操作中に発生したエラー
    ///
    /// 見積番号カウンターの書き込みに失敗した場合もこのエラーになります。
    /// 番号の一意性が保証できなくなるため、呼び出し側では致命的エラーとして扱ってください。
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// スプレッドシートの解析中に発生したエラー
    ///
    /// `#[from]`属性により、`calamine::Error`から自動的に変換されます。
    #[error("Failed to parse spreadsheet: {0}")]
    Parse(#[from] calamine::Error),

    /// JSONのシリアライズ・デシリアライズエラー
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// 設定の検証に失敗したエラー
    ///
    /// `QuoteBuilder::build()`時の検証や、シート選択の解決に失敗した場合に発生します。
    ///
    /// ```rust,no_run
    /// use xlsxquote::{CanonicalField, QuoteBuilder, QuoteError};
    ///
    /// let result = QuoteBuilder::new()
    ///     .with_aliases(CanonicalField::Sku, Vec::<String>::new())
    ///     .build();
    ///
    /// if let Err(QuoteError::Config(msg)) = result {
    ///     println!("設定エラー: {}", msg);
    /// }
    /// ```
    #[error("Configuration error: {0}")]
    Config(String),

    /// 入力サイズが上限を超えたエラー
    #[error("Input size exceeds maximum: {size} bytes (max: {max} bytes)")]
    InputTooLarge {
        /// 実際の入力サイズ（バイト）
        size: u64,
        /// 許容される最大サイズ（バイト）
        max: u64,
    },

    /// 見積番号カウンターのエラー（オーバーフローなど）
    #[error("Quote counter error: {0}")]
    Counter(String),
}
