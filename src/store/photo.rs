//! 写真の保存先（ファイル）

use super::PhotoStore;
use crate::error::{InspectionError, Result};
use chrono::NaiveDateTime;
use inspection_common::session::{numbered_reference, photo_reference};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct FilePhotoStore {
    dir: PathBuf,
}

impl FilePhotoStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn path_for(&self, photo_ref: &str) -> PathBuf {
        self.dir.join(photo_ref)
    }
}

/// 画像の形式から拡張子を決める（判定できないときは jpg）
pub fn detect_extension(bytes: &[u8]) -> &'static str {
    image::guess_format(bytes)
        .ok()
        .and_then(|f| f.extensions_str().first().copied())
        .unwrap_or("jpg")
}

impl PhotoStore for FilePhotoStore {
    fn store(&self, equipment: &str, timestamp: &NaiveDateTime, bytes: &[u8]) -> Result<String> {
        if bytes.is_empty() {
            return Err(InspectionError::Photo(format!("{} の写真が空です", equipment)));
        }
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| InspectionError::Photo(format!("{}: {}", self.dir.display(), e)))?;

        let base = photo_reference(timestamp, equipment, detect_extension(bytes));
        let mut name = base.clone();
        let mut n = 2;
        while self.path_for(&name).exists() {
            name = numbered_reference(&base, n);
            n += 1;
        }
        let path = self.path_for(&name);
        std::fs::write(&path, bytes)
            .map_err(|e| InspectionError::Photo(format!("{}: {}", path.display(), e)))?;

        tracing::debug!(path = %path.display(), "写真を保存しました");
        Ok(name)
    }
}
