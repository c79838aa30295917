//! Security Module
//!
//! 入力データに対するリソース制限を定義するモジュール。

use crate::error::QuoteError;

/// セキュリティ設定
///
/// ファイル処理時のリソース制限を定義します。
#[derive(Debug, Clone)]
pub(crate) struct SecurityConfig {
    /// 入力ファイルの最大サイズ（バイト）
    /// デフォルト: 2GB (2_147_483_648 bytes)
    pub max_input_file_size: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_input_file_size: 2_147_483_648, // 2GB
        }
    }
}

impl SecurityConfig {
    /// 入力サイズが上限以内かを検証
    pub fn check_input_size(&self, size: u64) -> Result<(), QuoteError> {
        if size > self.max_input_file_size {
            return Err(QuoteError::InputTooLarge {
                size,
                max: self.max_input_file_size,
            });
        }
        Ok(())
    }
}
