//! メモリ上の保存先（テスト・組み込み用）

use super::{CatalogStore, PhotoStore, ResultLogStore};
use crate::error::{InspectionError, Result};
use chrono::NaiveDateTime;
use inspection_common::session::{numbered_reference, photo_reference};
use inspection_common::{CatalogEntry, ResultRecord};
use std::collections::BTreeMap;
use std::sync::Mutex;

fn poisoned<T>(_: T) -> InspectionError {
    InspectionError::StorageWrite("保存先のロックが壊れています".into())
}

#[derive(Debug, Default)]
pub struct MemoryCatalogStore {
    rows: Mutex<Vec<CatalogEntry>>,
}

impl MemoryCatalogStore {
    pub fn with_rows(rows: Vec<CatalogEntry>) -> Self {
        Self { rows: Mutex::new(rows) }
    }
}

impl CatalogStore for MemoryCatalogStore {
    fn load_catalog(&self) -> Result<Vec<CatalogEntry>> {
        Ok(self.rows.lock().map_err(poisoned)?.clone())
    }

    fn replace_catalog(&self, rows: &[CatalogEntry]) -> Result<()> {
        *self.rows.lock().map_err(poisoned)? = rows.to_vec();
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryResultLog {
    records: Mutex<Vec<ResultRecord>>,
}

impl ResultLogStore for MemoryResultLog {
    fn append_results(&self, records: &[ResultRecord]) -> Result<()> {
        self.records.lock().map_err(poisoned)?.extend_from_slice(records);
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<ResultRecord>> {
        Ok(self.records.lock().map_err(poisoned)?.clone())
    }
}

#[derive(Debug, Default)]
pub struct MemoryPhotoStore {
    photos: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemoryPhotoStore {
    pub fn get(&self, photo_ref: &str) -> Option<Vec<u8>> {
        self.photos.lock().ok()?.get(photo_ref).cloned()
    }
}

impl PhotoStore for MemoryPhotoStore {
    fn store(&self, equipment: &str, timestamp: &NaiveDateTime, bytes: &[u8]) -> Result<String> {
        let base = photo_reference(timestamp, equipment, "jpg");
        let mut photos = self.photos.lock().map_err(poisoned)?;
        let mut name = base.clone();
        let mut n = 2;
        while photos.contains_key(&name) {
            name = numbered_reference(&base, n);
            n += 1;
        }
        photos.insert(name.clone(), bytes.to_vec());
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inspection_common::types::parse_timestamp;

    #[test]
    fn test_memory_photo_store() {
        let store = MemoryPhotoStore::default();
        let ts = parse_timestamp("2026-10-19 08:00:00").unwrap();
        let name = store.store("プレス機", &ts, b"data").unwrap();
        assert_eq!(name, "20261019_080000_プレス機.jpg");
        assert_eq!(store.get(&name).as_deref(), Some(&b"data"[..]));
    }

    #[test]
    fn test_memory_photo_names_do_not_collide() {
        let store = MemoryPhotoStore::default();
        let ts = parse_timestamp("2026-10-19 08:00:00").unwrap();
        let first = store.store("A/B", &ts, b"one").unwrap();
        let second = store.store("A_B", &ts, b"two").unwrap();
        assert_ne!(first, second);
        assert_eq!(store.get(&first).as_deref(), Some(&b"one"[..]));
        assert_eq!(store.get(&second).as_deref(), Some(&b"two"[..]));
    }

    #[test]
    fn test_memory_catalog_replace() {
        let store = MemoryCatalogStore::with_rows(vec![CatalogEntry::new("A", "B", "C", "D")]);
        store.replace_catalog(&[]).unwrap();
        assert!(store.load_catalog().unwrap().is_empty());
    }
}
