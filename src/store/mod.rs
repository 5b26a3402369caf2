//! 保存先の抽象化
//!
//! 点検マスタ・点検履歴・写真の保存先をトレイトで受け取り、
//! 起動時に設定（CSV / Excel）から実装を選ぶ。

pub mod csv_file;
pub mod memory;
pub mod photo;
pub mod spreadsheet;

use crate::config::{Backend, Config};
use crate::error::Result;
use chrono::NaiveDateTime;
use inspection_common::{Catalog, CatalogEntry, ResultRecord};
use std::path::Path;

pub use csv_file::{CsvCatalogStore, CsvResultLog};
pub use memory::{MemoryCatalogStore, MemoryPhotoStore, MemoryResultLog};
pub use photo::FilePhotoStore;
pub use spreadsheet::{XlsxCatalogStore, XlsxResultLog};

/// 点検マスタの保存先
pub trait CatalogStore {
    fn load_catalog(&self) -> Result<Vec<CatalogEntry>>;
    /// 全行を置き換える
    fn replace_catalog(&self, rows: &[CatalogEntry]) -> Result<()>;
}

/// 点検履歴の保存先（追記のみ）
pub trait ResultLogStore {
    fn append_results(&self, records: &[ResultRecord]) -> Result<()>;
    fn read_all(&self) -> Result<Vec<ResultRecord>>;
}

/// 写真の保存先
pub trait PhotoStore {
    /// 保存して参照名を返す
    fn store(&self, equipment: &str, timestamp: &NaiveDateTime, bytes: &[u8]) -> Result<String>;
}

/// 保存先一式
pub struct Stores {
    pub catalog: Box<dyn CatalogStore>,
    pub results: Box<dyn ResultLogStore>,
    pub photos: Box<dyn PhotoStore>,
}

impl Stores {
    pub fn from_config(config: &Config) -> Self {
        let photos = Box::new(FilePhotoStore::new(config.photo_dir()));
        match config.backend {
            Backend::Csv => Self {
                catalog: Box::new(CsvCatalogStore::new(config.catalog_path())),
                results: Box::new(CsvResultLog::new(config.results_path())),
                photos,
            },
            Backend::Xlsx => Self {
                catalog: Box::new(XlsxCatalogStore::new(config.catalog_path())),
                results: Box::new(XlsxResultLog::new(config.results_path())),
                photos,
            },
        }
    }

    pub fn in_memory() -> Self {
        Self {
            catalog: Box::new(MemoryCatalogStore::default()),
            results: Box::new(MemoryResultLog::default()),
            photos: Box::new(MemoryPhotoStore::default()),
        }
    }
}

/// ファイルの拡張子から点検マスタの読み書き先を選ぶ
pub fn catalog_store_for_path(path: &Path) -> Box<dyn CatalogStore> {
    let is_xlsx = path
        .extension()
        .map(|e| e.eq_ignore_ascii_case("xlsx"))
        .unwrap_or(false);
    if is_xlsx {
        Box::new(XlsxCatalogStore::new(path.to_path_buf()))
    } else {
        Box::new(CsvCatalogStore::new(path.to_path_buf()))
    }
}

/// 点検マスタを読み込む（失敗時・空のときは組み込みマスタ）
///
/// 戻り値の bool は組み込みマスタに切り替えたかどうか。
pub fn load_catalog_or_default(store: &dyn CatalogStore) -> (Catalog, bool) {
    match store.load_catalog() {
        Ok(rows) if !rows.is_empty() => {
            tracing::debug!(rows = rows.len(), "点検マスタを読み込みました");
            (Catalog::new(rows), false)
        }
        Ok(_) => {
            tracing::warn!("点検マスタが空のため組み込みマスタを使用します");
            (Catalog::builtin_default(), true)
        }
        Err(e) => {
            tracing::warn!(error = %e, "点検マスタを読み込めないため組み込みマスタを使用します");
            (Catalog::builtin_default(), true)
        }
    }
}

/// 点検履歴を読み込む（読めないときは空として扱う）
pub fn read_history(store: &dyn ResultLogStore) -> Vec<ResultRecord> {
    match store.read_all() {
        Ok(records) => {
            tracing::debug!(records = records.len(), "点検履歴を読み込みました");
            records
        }
        Err(e) => {
            tracing::info!(error = %e, "点検履歴を読み込めないため空として扱います");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InspectionError;

    struct BrokenStore;

    impl CatalogStore for BrokenStore {
        fn load_catalog(&self) -> Result<Vec<CatalogEntry>> {
            Err(InspectionError::StorageRead("broken".into()))
        }
        fn replace_catalog(&self, _rows: &[CatalogEntry]) -> Result<()> {
            Err(InspectionError::StorageWrite("broken".into()))
        }
    }

    impl ResultLogStore for BrokenStore {
        fn append_results(&self, _records: &[ResultRecord]) -> Result<()> {
            Err(InspectionError::StorageWrite("broken".into()))
        }
        fn read_all(&self) -> Result<Vec<ResultRecord>> {
            Err(InspectionError::StorageRead("broken".into()))
        }
    }

    #[test]
    fn test_catalog_falls_back_to_default() {
        let (catalog, fallback) = load_catalog_or_default(&BrokenStore);
        assert!(fallback);
        assert_eq!(catalog, Catalog::builtin_default());
    }

    #[test]
    fn test_empty_catalog_falls_back_to_default() {
        let (catalog, fallback) = load_catalog_or_default(&MemoryCatalogStore::default());
        assert!(fallback);
        assert!(!catalog.is_empty());
    }

    #[test]
    fn test_unreadable_history_is_empty() {
        assert!(read_history(&BrokenStore).is_empty());
    }

    #[test]
    fn test_catalog_store_for_path() {
        let dir = tempfile::tempdir().unwrap();
        let rows = vec![CatalogEntry::new("A", "Press", "body", "noise")];
        for name in ["master.csv", "master.xlsx"] {
            let store = catalog_store_for_path(&dir.path().join(name));
            store.replace_catalog(&rows).unwrap();
            assert_eq!(store.load_catalog().unwrap(), rows);
        }
    }
}
