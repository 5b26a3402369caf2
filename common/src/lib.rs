//! Inspection Common Library
//!
//! CLIと保存先で共有される型とロジック:
//! 点検マスタのグループ化、判定の集約、登録バッチ、履歴ビュー、画面遷移

pub mod types;
pub mod error;
pub mod aggregate;
pub mod catalog;
pub mod session;
pub mod history;
pub mod link;
pub mod flow;
pub mod export;

pub use types::{CatalogEntry, EquipmentResult, ItemJudgment, ItemStatus, ResultRecord};
pub use error::{Error, Result};
pub use aggregate::{classify, classify_summary, summarize, Priority};
pub use catalog::{Catalog, LineChecklist};
pub use session::{InspectionSession, JudgmentInput, PhotoUpload, SubmissionBatch};
pub use history::{HistoryFilter, HistoryView};
pub use link::{build_line_selector_url, line_from_url, resolve_line};
pub use flow::{Action, AppState, Effect, Mode, Notice, NoticeLevel};
pub use export::ExportFormat;
