//! Quote Counter Module
//!
//! ファイルに永続化された単調増加カウンターで、一意な見積番号を発行するモジュール。
//!
//! # 永続化
//!
//! 次の値は同じディレクトリの一時ファイルに書き込んでから、
//! カウンターファイルへアトミックにリネームします。書き込み途中でクラッシュしても、
//! カウンターファイルが中途半端な内容になることはありません。
//!
//! # 制限事項
//!
//! プロセス間ロックは行いません。別々のプロセスが同じカウンターファイルに対して
//! 同時に発行すると、同じ番号が重複して発行される可能性があります。

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::error::QuoteError;

/// 既定の見積番号プレフィックス
pub const DEFAULT_PREFIX: &str = "Q-";

/// 既定のカウンターファイルパス
pub const DEFAULT_COUNTER_PATH: &str = "quote_number.txt";

/// カウンターファイルが存在しない・解釈できない場合の初期値
const INITIAL_VALUE: u64 = 1;

static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid digit pattern"));

/// 見積番号カウンター
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteCounter {
    path: PathBuf,
    prefix: String,
}

impl Default for QuoteCounter {
    fn default() -> Self {
        Self::new(DEFAULT_COUNTER_PATH, DEFAULT_PREFIX)
    }
}

impl QuoteCounter {
    /// カウンターファイルのパスとプレフィックスを指定して生成
    pub fn new(path: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            prefix: prefix.into(),
        }
    }

    /// カウンターファイルのパス
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 見積番号のプレフィックス
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// 次に発行される値を読み取る（カウンターは進めない）
    ///
    /// 保存された数字列が`u64`に収まらない場合は`QuoteError::Counter`を返します。
    pub fn peek(&self) -> Result<u64, QuoteError> {
        read_current(&self.path)
    }

    /// 見積番号を発行し、カウンターを1つ進める
    ///
    /// # 戻り値
    ///
    /// * `Ok(String)` - `プレフィックス + 現在値`（インクリメント前の値）
    /// * `Err(QuoteError::Io)` - カウンターファイルに書き込めない場合
    /// * `Err(QuoteError::Counter)` - 保存値が`u64`に収まらない、またはカウンターがオーバーフローする場合
    pub fn issue_next(&self) -> Result<String, QuoteError> {
        let current = read_current(&self.path)?;
        let next = current.checked_add(1).ok_or_else(|| {
            QuoteError::Counter(format!(
                "counter at {} cannot advance past {}",
                self.path.display(),
                current
            ))
        })?;

        write_atomic(&self.path, next)?;

        let quote_number = format!("{}{}", self.prefix, current);
        info!(quote_number = %quote_number, path = %self.path.display(), "issued quote number");
        Ok(quote_number)
    }
}

/// 見積番号を発行する（`QuoteCounter::issue_next` の関数版）
///
/// ```rust,no_run
/// # fn main() -> Result<(), xlsxquote::QuoteError> {
/// let first = xlsxquote::issue_next("quote_number.txt", "Q-")?;
/// let second = xlsxquote::issue_next("quote_number.txt", "Q-")?;
/// assert_ne!(first, second);
/// # Ok(())
/// # }
/// ```
pub fn issue_next(path: impl AsRef<Path>, prefix: &str) -> Result<String, QuoteError> {
    QuoteCounter::new(path.as_ref(), prefix).issue_next()
}

/// 保存内容から最初の数字列を取り出す（`"Q-1234"` のような値も受理）
///
/// 数字列が無い場合は `None`。数字列が`u64`に収まらない場合は発行済み番号の
/// 再発行を避けるため初期値に戻さずエラーにします。
fn parse_counter(raw: &str) -> Result<Option<u64>, QuoteError> {
    match DIGITS.find(raw) {
        Some(m) => m.as_str().parse().map(Some).map_err(|_| {
            QuoteError::Counter(format!("stored counter value {} does not fit in u64", m.as_str()))
        }),
        None => Ok(None),
    }
}

/// 現在値を読み取る（存在しない・読めない・数字を含まない場合は初期値）
fn read_current(path: &Path) -> Result<u64, QuoteError> {
    match fs::read_to_string(path) {
        Ok(raw) => match parse_counter(&raw)? {
            Some(value) => Ok(value),
            None => {
                if !raw.trim().is_empty() {
                    warn!(path = %path.display(), "quote counter is unparsable, restarting at {}", INITIAL_VALUE);
                }
                Ok(INITIAL_VALUE)
            }
        },
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(INITIAL_VALUE),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "quote counter is unreadable, restarting at {}", INITIAL_VALUE);
            Ok(INITIAL_VALUE)
        }
    }
}

/// 一時ファイルに書き込んでからアトミックにリネーム
fn write_atomic(path: &Path, value: u64) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(value.to_string().as_bytes())?;
    // 既存ファイルの権限を引き継ぐ（一時ファイルは0600で作成されるため）
    if let Ok(metadata) = fs::metadata(path) {
        tmp.as_file().set_permissions(metadata.permissions())?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
