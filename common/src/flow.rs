//! 画面遷移と入力処理
//!
//! 画面モード（点検入力・マスタ編集・履歴）ごとの処理を
//! `update(state, action) -> (state, effects)` の純粋関数で表す。
//! 保存・読み込み・書き出しは Effect として要求し、実行は呼び出し側が行う。

use crate::aggregate::{batch_priority, Priority};
use crate::catalog::Catalog;
use crate::export::ExportFormat;
use crate::history::{HistoryFilter, HistoryView};
use crate::link::resolve_line;
use crate::session::{InspectionSession, JudgmentInput, SubmissionBatch};
use crate::types::{CatalogEntry, ItemStatus, ResultRecord};
use chrono::NaiveDateTime;

/// 画面モード
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    DataEntry,
    CatalogEdit,
    History,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// 画面に出すメッセージ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self { level, message: message.into() }
    }

    /// 登録結果の通知（最優先の区分で決める）
    pub fn for_priority(priority: Priority) -> Self {
        let level = match priority {
            Priority::Abnormal => NoticeLevel::Error,
            Priority::NotDone => NoticeLevel::Warning,
            Priority::Normal => NoticeLevel::Success,
        };
        Self::new(level, priority.alert_message())
    }

    pub fn is_blocking(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

/// 画面全体の状態
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub mode: Mode,
    pub catalog: Catalog,
    /// リンクで指定されたライン（マスタ読み込み前に受け取る）
    pub requested_line: Option<String>,
    pub session: Option<InspectionSession>,
    pub catalog_draft: Vec<CatalogEntry>,
    /// None は未読み込み
    pub history: Option<HistoryView>,
    pub history_filter: HistoryFilter,
    pub notice: Option<Notice>,
    /// 直近に保存されたバッチ
    pub last_saved: Vec<ResultRecord>,
}

/// ユーザー操作と外部処理の完了通知
#[derive(Debug, Clone)]
pub enum Action {
    SwitchMode(Mode),
    CatalogLoaded { catalog: Catalog, fallback: bool },
    SelectLine(Option<String>),
    SetStatus { equipment: String, item_index: usize, status: ItemStatus },
    SetAll { equipment: String, status: ItemStatus },
    /// 項目名指定の一括入力
    ApplyInputs(Vec<JudgmentInput>),
    AttachPhoto { equipment: String, bytes: Vec<u8> },
    SetNote(String),
    Submit { timestamp: NaiveDateTime },
    SubmitFinished(Result<Vec<ResultRecord>, String>),
    EditRows(Vec<CatalogEntry>),
    AddRow(CatalogEntry),
    RemoveRow(usize),
    SaveCatalog,
    CatalogSaved(Result<(), String>),
    HistoryLoaded(Vec<ResultRecord>),
    SetHistoryFilter(HistoryFilter),
    Export(ExportFormat),
    ExportFinished(Result<String, String>),
}

/// 実行を要求する外部処理
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    LoadCatalog,
    LoadHistory,
    AppendBatch(SubmissionBatch),
    ReplaceCatalog(Vec<CatalogEntry>),
    ExportHistory { format: ExportFormat, records: Vec<ResultRecord> },
}

/// 初期状態（マスタ読み込みを要求）
pub fn init(requested_line: Option<String>) -> (AppState, Vec<Effect>) {
    let state = AppState {
        requested_line,
        ..Default::default()
    };
    (state, vec![Effect::LoadCatalog])
}

pub fn update(mut state: AppState, action: Action) -> (AppState, Vec<Effect>) {
    let mut effects = Vec::new();

    match action {
        Action::SwitchMode(mode) => {
            state.mode = mode;
            state.notice = None;
            match mode {
                Mode::DataEntry => {}
                Mode::CatalogEdit => state.catalog_draft = state.catalog.rows().to_vec(),
                Mode::History => effects.push(Effect::LoadHistory),
            }
        }

        Action::CatalogLoaded { catalog, fallback } => {
            state.catalog = catalog;
            if fallback {
                state.notice = Some(Notice::new(
                    NoticeLevel::Warning,
                    "点検マスタを読み込めませんでした。既定のマスタを使用します。",
                ));
            }
            let requested = state.requested_line.take();
            select_line(&mut state, requested.as_deref());
        }

        Action::SelectLine(line) => select_line(&mut state, line.as_deref()),

        Action::SetStatus { equipment, item_index, status } => {
            with_session(&mut state, |s| s.set_status(&equipment, item_index, status));
        }

        Action::SetAll { equipment, status } => {
            with_session(&mut state, |s| s.set_all(&equipment, status));
        }

        Action::ApplyInputs(inputs) => {
            with_session(&mut state, |s| s.apply_inputs(&inputs));
        }

        Action::AttachPhoto { equipment, bytes } => {
            with_session(&mut state, |s| s.attach_photo(&equipment, bytes));
        }

        Action::SetNote(note) => {
            if let Some(session) = state.session.as_mut() {
                session.set_note(note);
            }
        }

        Action::Submit { timestamp } => match state.session.as_ref() {
            None => {
                state.notice = Some(Notice::new(NoticeLevel::Error, "ラインが選択されていません"));
            }
            Some(session) => match session.submit(timestamp) {
                Ok(batch) => effects.push(Effect::AppendBatch(batch)),
                Err(e) => state.notice = Some(Notice::new(NoticeLevel::Error, e.to_string())),
            },
        },

        Action::SubmitFinished(Ok(records)) => {
            let priority = batch_priority(records.iter().map(|r| r.summary.as_str()));
            state.notice = Some(Notice::for_priority(priority));
            state.last_saved = records;
            state.history = None;
            // 登録後はフォームを初期化
            if let Some(session) = state.session.take() {
                let line = session.line().to_string();
                state.session = Some(InspectionSession::new(state.catalog.checklist(&line)));
            }
        }

        Action::SubmitFinished(Err(message)) => {
            // 入力内容は残して再登録できるようにする
            state.notice = Some(Notice::new(
                NoticeLevel::Error,
                format!("点検結果を保存できませんでした: {}", message),
            ));
        }

        Action::EditRows(rows) => state.catalog_draft = rows,

        Action::AddRow(row) => state.catalog_draft.push(row),

        Action::RemoveRow(index) => {
            if index < state.catalog_draft.len() {
                state.catalog_draft.remove(index);
            } else {
                state.notice = Some(Notice::new(NoticeLevel::Error, format!("行 {} はありません", index + 1)));
            }
        }

        Action::SaveCatalog => effects.push(Effect::ReplaceCatalog(state.catalog_draft.clone())),

        Action::CatalogSaved(Ok(())) => {
            state.catalog = Catalog::new(state.catalog_draft.clone());
            state.notice = Some(Notice::new(NoticeLevel::Success, "点検マスタを保存しました"));
            let current = state.session.as_ref().map(|s| s.line().to_string());
            select_line(&mut state, current.as_deref());
        }

        Action::CatalogSaved(Err(message)) => {
            state.notice = Some(Notice::new(
                NoticeLevel::Error,
                format!("点検マスタを保存できませんでした: {}", message),
            ));
        }

        Action::HistoryLoaded(records) => {
            let view = HistoryView::new(records).with_filter(state.history_filter.clone());
            if view.is_empty() {
                state.notice = Some(Notice::new(NoticeLevel::Info, "まだデータがありません。"));
            }
            state.history = Some(view);
        }

        Action::SetHistoryFilter(filter) => {
            if let Some(view) = state.history.as_mut() {
                view.set_filter(filter.clone());
            }
            state.history_filter = filter;
        }

        Action::Export(format) => match state.history.as_ref() {
            Some(view) if view.can_export() => effects.push(Effect::ExportHistory {
                format,
                records: view.filtered_records(),
            }),
            _ => state.notice = Some(Notice::new(NoticeLevel::Info, "まだデータがありません。")),
        },

        Action::ExportFinished(Ok(path)) => {
            state.notice = Some(Notice::new(NoticeLevel::Success, format!("書き出しました: {}", path)));
        }

        Action::ExportFinished(Err(message)) => {
            state.notice = Some(Notice::new(NoticeLevel::Error, format!("書き出しに失敗しました: {}", message)));
        }
    }

    (state, effects)
}

fn select_line(state: &mut AppState, requested: Option<&str>) {
    match resolve_line(requested, &state.catalog) {
        Some(line) => state.session = Some(InspectionSession::new(state.catalog.checklist(&line))),
        None => {
            state.session = None;
            state.notice = Some(Notice::new(NoticeLevel::Warning, "点検マスタにラインがありません"));
        }
    }
}

fn with_session<F>(state: &mut AppState, f: F)
where
    F: FnOnce(&mut InspectionSession) -> crate::error::Result<()>,
{
    let result = match state.session.as_mut() {
        Some(session) => f(session).map_err(|e| e.to_string()),
        None => Err("ラインが選択されていません".to_string()),
    };
    if let Err(message) = result {
        state.notice = Some(Notice::new(NoticeLevel::Error, message));
    }
}
