//! CSVファイルの保存先

use super::{CatalogStore, ResultLogStore};
use crate::error::{InspectionError, Result};
use inspection_common::export::csv_core;
use inspection_common::{Catalog, CatalogEntry, ResultRecord};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::PathBuf;

/// 末尾が改行で終わっていなければ改行を足す
fn ensure_trailing_newline(file: &mut File) -> std::io::Result<()> {
    if file.metadata()?.len() == 0 {
        return Ok(());
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    if last[0] != b'\n' {
        file.write_all(b"\n")?;
    }
    Ok(())
}

/// 点検マスタ（CSV）
#[derive(Debug, Clone)]
pub struct CsvCatalogStore {
    path: PathBuf,
}

impl CsvCatalogStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl CatalogStore for CsvCatalogStore {
    fn load_catalog(&self) -> Result<Vec<CatalogEntry>> {
        if !self.path.exists() {
            return Err(InspectionError::FileNotFound(self.path.display().to_string()));
        }
        let file = File::open(&self.path)?;
        let catalog = Catalog::from_csv_reader(BufReader::new(file))?;
        Ok(catalog.into_rows())
    }

    fn replace_catalog(&self, rows: &[CatalogEntry]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        // 一時ファイルに書いてから置き換える
        let tmp = self.path.with_extension("csv.tmp");
        {
            let file = File::create(&tmp)?;
            Catalog::new(rows.to_vec()).write_csv(BufWriter::new(file))?;
        }
        std::fs::rename(&tmp, &self.path)?;
        tracing::info!(path = %self.path.display(), rows = rows.len(), "点検マスタを保存しました");
        Ok(())
    }
}

/// 点検履歴（CSV・追記）
#[derive(Debug, Clone)]
pub struct CsvResultLog {
    path: PathBuf,
}

impl CsvResultLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl ResultLogStore for CsvResultLog {
    fn append_results(&self, records: &[ResultRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| InspectionError::StorageWrite(format!("{}: {}", self.path.display(), e)))?;
        let is_new = file
            .metadata()
            .map(|m| m.len() == 0)
            .map_err(|e| InspectionError::StorageWrite(e.to_string()))?;
        ensure_trailing_newline(&mut file).map_err(|e| InspectionError::StorageWrite(e.to_string()))?;

        csv_core::write_records(BufWriter::new(file), records, is_new)
            .map_err(|e| InspectionError::StorageWrite(e.to_string()))?;
        tracing::info!(path = %self.path.display(), records = records.len(), "点検結果を追記しました");
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<ResultRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let file = File::open(&self.path)?;
        Ok(csv_core::read_records(BufReader::new(file))?)
    }
}
