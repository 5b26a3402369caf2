//! 点検履歴のCSV入出力
//!
//! 列順は 点検日時・ライン・設備・結果・備考・写真 で固定。
//! 書き出しはExcelで文字化けしないよう BOM 付き UTF-8。

use crate::error::Result;
use crate::types::{ResultRecord, RESULT_HEADERS};
use csv::{ReaderBuilder, Trim, WriterBuilder};
use std::io::{Read, Write};

pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// 記録をCSVとして書く
pub fn write_records<W: Write>(writer: W, records: &[ResultRecord], with_header: bool) -> Result<()> {
    let mut writer = WriterBuilder::new().from_writer(writer);
    if with_header {
        writer.write_record(RESULT_HEADERS)?;
    }
    for record in records {
        writer.write_record(record.to_row())?;
    }
    writer.flush()?;
    Ok(())
}

/// CSVから記録を読む（1行目はヘッダー）
///
/// 日時が読めない行・列が足りない行は読み飛ばす。
pub fn read_records<R: Read>(reader: R) -> Result<Vec<ResultRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::None)
        .from_reader(reader);

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let fields: Vec<&str> = row.iter().collect();
        if let Some(record) = ResultRecord::from_row(&fields) {
            records.push(record);
        }
    }
    Ok(records)
}

/// ダウンロード用のCSV（BOM付き）
pub fn history_csv_bytes(records: &[ResultRecord]) -> Result<Vec<u8>> {
    let mut buf = UTF8_BOM.to_vec();
    write_records(&mut buf, records, true)?;
    Ok(buf)
}
