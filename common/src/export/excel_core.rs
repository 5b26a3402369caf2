//! Excel生成（共通ライブラリ）
//!
//! 点検履歴（優先度で色分け）と点検マスタのブックを作る。

use crate::aggregate::classify_summary;
use crate::history::row_fill;
use crate::types::{CatalogEntry, ResultRecord, CATALOG_HEADERS, RESULT_HEADERS};
use rust_xlsxwriter::*;

pub const HISTORY_SHEET: &str = "点検履歴";
pub const CATALOG_SHEET: &str = "点検マスタ";

const HISTORY_COL_WIDTHS: [f64; 6] = [20.0, 12.0, 18.0, 40.0, 30.0, 32.0];
const CATALOG_COL_WIDTHS: [f64; 4] = [12.0, 18.0, 14.0, 36.0];

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_font_color(Color::RGB(0x555555))
        .set_background_color(Color::RGB(0xF5F5F5))
        .set_align(FormatAlign::Center)
        .set_border(FormatBorder::Hair)
        .set_border_color(Color::RGB(0xAAAAAA))
}

fn value_format(fill: Option<u32>) -> Format {
    let format = Format::new()
        .set_align(FormatAlign::VerticalCenter)
        .set_text_wrap()
        .set_border(FormatBorder::Hair)
        .set_border_color(Color::RGB(0xCCCCCC));
    match fill {
        Some(rgb) => format.set_background_color(Color::RGB(rgb)),
        None => format,
    }
}

fn write_header(worksheet: &mut Worksheet, headers: &[&str], widths: &[f64]) -> Result<(), String> {
    let format = header_format();
    for (col, (header, width)) in headers.iter().zip(widths.iter()).enumerate() {
        let col = col as u16;
        worksheet
            .write_string_with_format(0, col, *header, &format)
            .map_err(|e| format!("ヘッダー書き込みエラー: {}", e))?;
        worksheet
            .set_column_width(col, *width)
            .map_err(|e| format!("列幅設定エラー: {}", e))?;
    }
    worksheet
        .set_freeze_panes(1, 0)
        .map_err(|e| format!("ウィンドウ枠固定エラー: {}", e))?;
    Ok(())
}

/// 点検履歴のExcelをバッファに生成
///
/// 異常ありの行は赤、未実施ありの行は黄色で塗る。
pub fn generate_history_buffer(records: &[ResultRecord]) -> Result<Vec<u8>, String> {
    let rows: Vec<Vec<String>> = records.iter().map(|r| r.to_row().to_vec()).collect();
    generate_history_rows_buffer(&rows)
}

/// 表形式の行（列順固定）から点検履歴のExcelを生成
///
/// 読み込めない行もそのまま書き戻す。結果列で塗り色を決める。
pub fn generate_history_rows_buffer(rows: &[Vec<String>]) -> Result<Vec<u8>, String> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(HISTORY_SHEET)
        .map_err(|e| format!("シート名設定エラー: {}", e))?;

    write_header(worksheet, &RESULT_HEADERS, &HISTORY_COL_WIDTHS)?;

    for (idx, values) in rows.iter().enumerate() {
        let row = idx as u32 + 1;
        let summary = values.get(3).map(String::as_str).unwrap_or_default();
        let format = value_format(row_fill(classify_summary(summary)));
        for (col, value) in values.iter().enumerate() {
            worksheet
                .write_string_with_format(row, col as u16, value, &format)
                .map_err(|e| format!("値書き込みエラー: {}", e))?;
        }
    }

    workbook
        .save_to_buffer()
        .map_err(|e| format!("Excel保存エラー: {}", e))
}

/// 点検マスタのExcelをバッファに生成
pub fn generate_catalog_buffer(rows: &[CatalogEntry]) -> Result<Vec<u8>, String> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(CATALOG_SHEET)
        .map_err(|e| format!("シート名設定エラー: {}", e))?;

    write_header(worksheet, &CATALOG_HEADERS, &CATALOG_COL_WIDTHS)?;

    let format = value_format(None);
    for (idx, entry) in rows.iter().enumerate() {
        let row = idx as u32 + 1;
        let values = [&entry.line, &entry.equipment, &entry.category, &entry.item];
        for (col, value) in values.iter().enumerate() {
            worksheet
                .write_string_with_format(row, col as u16, *value, &format)
                .map_err(|e| format!("値書き込みエラー: {}", e))?;
        }
    }

    workbook
        .save_to_buffer()
        .map_err(|e| format!("Excel保存エラー: {}", e))
}
