//! 画面遷移の実行
//!
//! `inspection_common::flow::update` が返した Effect を保存先に対して実行し、
//! 結果を Action として状態に戻す。

use crate::error::{InspectionError, Result};
use crate::export::write_history;
use crate::store::{load_catalog_or_default, read_history, Stores};
use chrono::NaiveDateTime;
use inspection_common::flow::{self, Action, AppState, Effect};
use inspection_common::{ResultRecord, SubmissionBatch};
use std::collections::VecDeque;
use std::path::PathBuf;

pub struct App {
    state: AppState,
    stores: Stores,
    export_path: PathBuf,
    last_write_error: Option<String>,
}

impl App {
    /// 初期化してマスタを読み込む
    pub fn start(stores: Stores, requested_line: Option<String>) -> Self {
        let (state, effects) = flow::init(requested_line);
        let mut app = Self {
            state,
            stores,
            export_path: PathBuf::from("."),
            last_write_error: None,
        };
        app.run(effects);
        app
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    /// 書き出し先（ディレクトリまたはファイル）
    pub fn set_export_path(&mut self, path: PathBuf) {
        self.export_path = path;
    }

    pub fn dispatch(&mut self, action: Action) {
        let mut queue = VecDeque::from([action]);
        while let Some(action) = queue.pop_front() {
            let state = std::mem::take(&mut self.state);
            let (state, effects) = flow::update(state, action);
            self.state = state;
            queue.extend(effects.into_iter().map(|e| self.execute(e)));
        }
    }

    fn run(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            let action = self.execute(effect);
            self.dispatch(action);
        }
    }

    /// 登録して保存された記録を返す
    ///
    /// 入力不備は Validation、保存失敗は StorageWrite。
    pub fn submit(&mut self, timestamp: NaiveDateTime) -> Result<Vec<ResultRecord>> {
        self.last_write_error = None;
        self.state.last_saved.clear();
        self.dispatch(Action::Submit { timestamp });

        if let Some(message) = self.last_write_error.take() {
            return Err(InspectionError::StorageWrite(message));
        }
        if self.state.last_saved.is_empty() {
            let message = self
                .state
                .notice
                .as_ref()
                .map(|n| n.message.clone())
                .unwrap_or_else(|| "登録できませんでした".into());
            return Err(InspectionError::Validation(message));
        }
        Ok(self.state.last_saved.clone())
    }

    fn execute(&mut self, effect: Effect) -> Action {
        match effect {
            Effect::LoadCatalog => {
                let (catalog, fallback) = load_catalog_or_default(self.stores.catalog.as_ref());
                Action::CatalogLoaded { catalog, fallback }
            }
            Effect::LoadHistory => Action::HistoryLoaded(read_history(self.stores.results.as_ref())),
            Effect::AppendBatch(batch) => match self.append_batch(batch) {
                Ok(records) => Action::SubmitFinished(Ok(records)),
                Err(e) => {
                    tracing::error!(error = %e, "点検結果を保存できませんでした");
                    self.last_write_error = Some(e.to_string());
                    Action::SubmitFinished(Err(e.to_string()))
                }
            },
            Effect::ReplaceCatalog(rows) => {
                let result = self.stores.catalog.replace_catalog(&rows).map_err(|e| e.to_string());
                Action::CatalogSaved(result)
            }
            Effect::ExportHistory { format, records } => {
                let result = write_history(&records, format, &self.export_path)
                    .map(|path| path.display().to_string())
                    .map_err(|e| e.to_string());
                Action::ExportFinished(result)
            }
        }
    }

    /// 写真を保存してから記録を追記する
    fn append_batch(&self, mut batch: SubmissionBatch) -> Result<Vec<ResultRecord>> {
        let photos = std::mem::take(&mut batch.photos);
        for photo in photos {
            let photo_ref = self
                .stores
                .photos
                .store(&photo.equipment, &batch.timestamp, &photo.bytes)?;
            batch.set_photo_ref(&photo.equipment, photo_ref);
        }
        self.stores.results.append_results(&batch.records)?;
        Ok(batch.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryCatalogStore, MemoryPhotoStore, MemoryResultLog};
    use inspection_common::flow::{Mode, NoticeLevel};
    use inspection_common::types::parse_timestamp;
    use inspection_common::{CatalogEntry, ItemStatus};

    fn stores() -> Stores {
        Stores {
            catalog: Box::new(MemoryCatalogStore::with_rows(vec![
                CatalogEntry::new("A", "Press", "body", "ItemX"),
                CatalogEntry::new("A", "Conveyor", "body", "Belt"),
            ])),
            results: Box::new(MemoryResultLog::default()),
            photos: Box::new(MemoryPhotoStore::default()),
        }
    }

    #[test]
    fn test_submit_appends_batch_with_photo() {
        let mut app = App::start(stores(), Some("A".into()));
        app.dispatch(Action::SetAll { equipment: "Press".into(), status: ItemStatus::Normal });
        app.dispatch(Action::AttachPhoto { equipment: "Conveyor".into(), bytes: vec![0xFF, 0xD8] });

        let ts = parse_timestamp("2026-10-19 11:00:00").unwrap();
        let saved = app.submit(ts).unwrap();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[1].photo_ref.as_deref(), Some("20261019_110000_Conveyor.jpg"));

        let stored = app.stores().results.read_all().unwrap();
        assert_eq!(stored, saved);
    }

    #[test]
    fn test_history_roundtrip_through_flow() {
        let mut app = App::start(stores(), None);
        let ts = parse_timestamp("2026-10-19 11:00:00").unwrap();
        app.submit(ts).unwrap();

        app.dispatch(Action::SwitchMode(Mode::History));
        let view = app.state().history.as_ref().unwrap();
        assert_eq!(view.records().len(), 2);
    }

    #[test]
    fn test_failed_submit_in_same_second_is_error() {
        let mut rows = stores();
        rows.catalog = Box::new(MemoryCatalogStore::with_rows(vec![
            CatalogEntry::new("A", "Press", "body", "ItemX"),
            CatalogEntry::new("Z", " ", "body", "ItemY"),
        ]));
        let mut app = App::start(rows, Some("A".into()));
        let ts = parse_timestamp("2026-10-19 11:00:00").unwrap();
        assert_eq!(app.submit(ts).unwrap().len(), 1);

        app.dispatch(Action::SelectLine(Some("Z".into())));
        let result = app.submit(ts);
        assert!(matches!(result, Err(InspectionError::Validation(_))));
        assert!(app.state().last_saved.is_empty());
        assert_eq!(app.stores().results.read_all().unwrap().len(), 1);
    }

    #[test]
    fn test_empty_catalog_store_uses_default() {
        let stores = Stores::in_memory();
        let app = App::start(stores, None);
        assert_eq!(app.state().notice.as_ref().map(|n| n.level), Some(NoticeLevel::Warning));
        assert!(app.state().session.is_some());
    }
}
