//! Parser Module
//!
//! calamineを使用したスプレッドシート読み込みの実装。
//! 明細シートを選択し、ヘッダー行とデータ行からなる`RawTable`を生成します。

mod workbook;

pub(crate) use workbook::WorkbookReader;
