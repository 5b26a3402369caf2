//! Excel（xlsx）の保存先
//!
//! 読み込みは calamine、書き込みは rust_xlsxwriter。
//! xlsx は追記できないため、点検履歴は全件を書き直す。

use super::{CatalogStore, ResultLogStore};
use crate::error::{InspectionError, Result};
use calamine::{open_workbook, Data, Reader, Xlsx};
use inspection_common::export::excel_core;
use inspection_common::{CatalogEntry, ResultRecord};
use std::path::{Path, PathBuf};

/// 先頭シートの全行を文字列で読む（ヘッダー行を除く）
fn read_rows(path: &Path) -> Result<Vec<Vec<String>>> {
    if !path.exists() {
        return Err(InspectionError::FileNotFound(path.display().to_string()));
    }
    let mut workbook: Xlsx<_> = open_workbook(path)
        .map_err(|e| InspectionError::Spreadsheet(format!("{}: {}", path.display(), e)))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| InspectionError::Spreadsheet(format!("シートがありません: {}", path.display())))?
        .map_err(|e| InspectionError::Spreadsheet(e.to_string()))?;

    Ok(range
        .rows()
        .skip(1)
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect())
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn write_buffer(path: &Path, buf: Vec<u8>) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, buf)?;
    Ok(())
}

/// 点検マスタ（xlsx）
#[derive(Debug, Clone)]
pub struct XlsxCatalogStore {
    path: PathBuf,
}

impl XlsxCatalogStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl CatalogStore for XlsxCatalogStore {
    fn load_catalog(&self) -> Result<Vec<CatalogEntry>> {
        let rows = read_rows(&self.path)?;
        Ok(rows
            .into_iter()
            .filter(|r| r.len() >= 4)
            .map(|r| CatalogEntry::new(r[0].clone(), r[1].clone(), r[2].clone(), r[3].clone()))
            .collect())
    }

    fn replace_catalog(&self, rows: &[CatalogEntry]) -> Result<()> {
        let buf = excel_core::generate_catalog_buffer(rows).map_err(InspectionError::Spreadsheet)?;
        write_buffer(&self.path, buf)?;
        tracing::info!(path = %self.path.display(), rows = rows.len(), "点検マスタを保存しました");
        Ok(())
    }
}

/// 点検履歴（xlsx）
#[derive(Debug, Clone)]
pub struct XlsxResultLog {
    path: PathBuf,
}

impl XlsxResultLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl ResultLogStore for XlsxResultLog {
    fn append_results(&self, records: &[ResultRecord]) -> Result<()> {
        // 手で編集された行も含め、既存の行はそのまま書き戻す
        let mut rows = if self.path.exists() {
            read_rows(&self.path)
                .map_err(|e| InspectionError::StorageWrite(format!("既存の履歴を読めません: {}", e)))?
        } else {
            Vec::new()
        };
        rows.extend(records.iter().map(|r| r.to_row().to_vec()));

        let buf = excel_core::generate_history_rows_buffer(&rows).map_err(InspectionError::StorageWrite)?;
        write_buffer(&self.path, buf).map_err(|e| InspectionError::StorageWrite(e.to_string()))?;
        tracing::info!(path = %self.path.display(), records = records.len(), "点検結果を追記しました");
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<ResultRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        Ok(read_rows(&self.path)?
            .iter()
            .filter_map(|row| ResultRecord::from_row(row))
            .collect())
    }
}
