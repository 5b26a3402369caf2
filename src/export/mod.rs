use crate::error::{InspectionError, Result};
use inspection_common::export::{csv_core, excel_core, ExportFormat};
use inspection_common::ResultRecord;
use std::path::{Path, PathBuf};

/// 既定の書き出しファイル名（拡張子なし）
pub const DEFAULT_REPORT_NAME: &str = "inspection_report";

fn output_path_for_format(output: &Path, format: ExportFormat) -> PathBuf {
    if output.is_dir() || output.extension().is_none() {
        output.join(format!("{}.{}", DEFAULT_REPORT_NAME, format.extension()))
    } else {
        output.to_path_buf()
    }
}

/// 点検履歴を書き出して出力先を返す
pub fn write_history(records: &[ResultRecord], format: ExportFormat, output: &Path) -> Result<PathBuf> {
    if records.is_empty() {
        return Err(InspectionError::NoData);
    }

    let path = output_path_for_format(output, format);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let buf = match format {
        ExportFormat::Csv => csv_core::history_csv_bytes(records)?,
        ExportFormat::Excel => excel_core::generate_history_buffer(records).map_err(InspectionError::Spreadsheet)?,
    };
    std::fs::write(&path, buf)?;

    tracing::info!(path = %path.display(), records = records.len(), %format, "点検履歴を書き出しました");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use inspection_common::types::parse_timestamp;
    use tempfile::tempdir;

    fn records() -> Vec<ResultRecord> {
        vec![ResultRecord {
            timestamp: parse_timestamp("2026-10-19 08:00:00").unwrap(),
            line: "Aライン".into(),
            equipment: "プレス機".into(),
            summary: "Normal".into(),
            note: String::new(),
            photo_ref: None,
        }]
    }

    #[test]
    fn test_directory_gets_default_name() {
        let dir = tempdir().unwrap();
        let path = write_history(&records(), ExportFormat::Csv, dir.path()).unwrap();
        assert_eq!(path, dir.path().join("inspection_report.csv"));
        assert!(path.exists());
    }

    #[test]
    fn test_explicit_file_name() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("out").join("history.xlsx");
        let path = write_history(&records(), ExportFormat::Excel, &target).unwrap();
        assert_eq!(path, target);
        assert!(std::fs::read(&path).unwrap().starts_with(b"PK"));
    }

    #[test]
    fn test_empty_history_not_written() {
        let dir = tempdir().unwrap();
        let result = write_history(&[], ExportFormat::Csv, dir.path());
        assert!(matches!(result, Err(InspectionError::NoData)));
        assert!(!dir.path().join("inspection_report.csv").exists());
    }
}
