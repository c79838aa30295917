//! Workbook Reader
//!
//! calamineのラッパーとして、明細シートの選択と`RawTable`への変換を提供します。

use calamine::{open_workbook_auto_from_rs, Data, DataType, Reader, Sheets};
use std::io::{Cursor, Read, Seek};
use tracing::debug;

use crate::api::{SheetSelector, PREFERRED_SHEETS};
use crate::error::QuoteError;
use crate::security::SecurityConfig;
use crate::types::{Cell, RawTable};

/// ワークブックリーダー
///
/// 入力全体をメモリに読み込み、calamineの自動判定（XLSX/XLSM/XLSB/XLS/ODS）で開きます。
/// 数式セルはキャッシュされた計算結果を読み込みます。
pub(crate) struct WorkbookReader {
    workbook: Sheets<Cursor<Vec<u8>>>,
}

impl WorkbookReader {
    /// ワークブックを開く
    ///
    /// # 引数
    ///
    /// * `reader` - スプレッドシートを読み込むためのリーダー（Read + Seekトレイトを実装）
    ///
    /// # 戻り値
    ///
    /// * `Ok(WorkbookReader)` - 読み込みに成功した場合
    /// * `Err(QuoteError::InputTooLarge)` - 入力サイズが上限を超えた場合
    /// * `Err(QuoteError::Parse)` - スプレッドシートとして解析できない場合
    pub fn open<R: Read + Seek>(mut reader: R) -> Result<Self, QuoteError> {
        let security_config = SecurityConfig::default();

        let mut buffer = Vec::new();
        let bytes_read = reader.read_to_end(&mut buffer)?;
        security_config.check_input_size(bytes_read as u64)?;

        let workbook = open_workbook_auto_from_rs(Cursor::new(buffer))?;
        Ok(Self { workbook })
    }

    /// すべてのシート名を取得
    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names()
    }

    /// シート選択方式に基づいて明細シートを選択
    ///
    /// # 戻り値
    ///
    /// * `Ok(String)` - 選択されたシート名
    /// * `Err(QuoteError::Config)` - シートが存在しない、またはインデックスが範囲外の場合
    pub fn select_sheet(&self, selector: &SheetSelector) -> Result<String, QuoteError> {
        let all_sheet_names = self.sheet_names();
        if all_sheet_names.is_empty() {
            return Err(QuoteError::Config("Workbook contains no sheets".to_string()));
        }

        match selector {
            SheetSelector::Preferred => Ok(preferred_sheet(&all_sheet_names)),

            SheetSelector::Index(index) => all_sheet_names.get(*index).cloned().ok_or_else(|| {
                QuoteError::Config(format!(
                    "Sheet index {} is out of range (total: {})",
                    index,
                    all_sheet_names.len()
                ))
            }),

            SheetSelector::Name(name) => {
                if !all_sheet_names.contains(name) {
                    return Err(QuoteError::Config(format!("Sheet '{}' not found", name)));
                }
                Ok(name.clone())
            }
        }
    }

    /// シートを読み込み、`RawTable`に変換
    ///
    /// 使用範囲の先頭行をヘッダー行として扱います。
    /// すべてのセルが空の行は読み飛ばします。
    pub fn read_table(&mut self, sheet_name: &str) -> Result<RawTable, QuoteError> {
        let range = self.workbook.worksheet_range(sheet_name)?;

        let mut rows = range.rows();
        let headers: Vec<String> = match rows.next() {
            Some(header_row) => header_row.iter().map(|c| convert_cell(c).to_text()).collect(),
            None => return Ok(RawTable::default()),
        };

        let mut table = RawTable::new(headers, Vec::new());
        for row in rows {
            if row.iter().all(|c| c.is_empty()) {
                continue;
            }
            table.push_row(row.iter().map(convert_cell).collect());
        }

        debug!(sheet = sheet_name, rows = table.len(), "read sheet");
        Ok(table)
    }
}

/// 優先シート名の順に照合し、見つからなければ先頭のシートを返す
fn preferred_sheet(sheet_names: &[String]) -> String {
    let lowers: Vec<String> = sheet_names.iter().map(|s| s.to_lowercase()).collect();
    PREFERRED_SHEETS
        .iter()
        .find_map(|want| lowers.iter().position(|s| s == want))
        .map(|idx| sheet_names[idx].clone())
        .unwrap_or_else(|| sheet_names[0].clone())
}

/// calamineのセル値を`Cell`に変換
fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::String(s) => Cell::Text(s.clone()),
        Data::Bool(b) => Cell::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) if dt.is_datetime() => Cell::Date(datetime),
            _ => Cell::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => Cell::Text(s.clone()),
        Data::DurationIso(s) => Cell::Text(s.clone()),
        // エラー値（#N/Aなど）は値を持たないものとして扱う
        Data::Error(_) | Data::Empty => Cell::Empty,
    }
}
