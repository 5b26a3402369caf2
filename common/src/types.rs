//! 点検データの型定義
//!
//! - CatalogEntry: 点検マスタの1行（ライン・設備・分類・点検項目）
//! - ItemJudgment: 1項目の判定（セッション内のみ）
//! - EquipmentResult: 設備ごとの集約結果（セッション内のみ）
//! - ResultRecord: 点検履歴の1行（追記のみ）

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// 点検日時の表記（CSV・JSON共通）
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 点検マスタの1行
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogEntry {
    pub line: String,      // ライン
    pub equipment: String, // 設備
    pub category: String,  // 分類
    pub item: String,      // 点検項目
}

impl CatalogEntry {
    pub fn new(
        line: impl Into<String>,
        equipment: impl Into<String>,
        category: impl Into<String>,
        item: impl Into<String>,
    ) -> Self {
        Self {
            line: line.into(),
            equipment: equipment.into(),
            category: category.into(),
            item: item.into(),
        }
    }
}

/// 点検項目の判定
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemStatus {
    /// 未実施（初期値）
    #[default]
    NotDone,
    /// 正常
    Normal,
    /// 異常
    Abnormal,
}

impl ItemStatus {
    pub const ALL: [ItemStatus; 3] = [ItemStatus::Normal, ItemStatus::Abnormal, ItemStatus::NotDone];

    /// 画面表示用ラベル
    pub fn label(&self) -> &'static str {
        match self {
            ItemStatus::NotDone => "未実施",
            ItemStatus::Normal => "正常",
            ItemStatus::Abnormal => "異常",
        }
    }
}

impl std::str::FromStr for ItemStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "normal" | "ok" | "正常" => Ok(ItemStatus::Normal),
            "abnormal" | "ng" | "異常" => Ok(ItemStatus::Abnormal),
            "notdone" | "not-done" | "not_done" | "未実施" => Ok(ItemStatus::NotDone),
            _ => Err(format!("Unknown status: {}. Use normal, abnormal, or not-done", s)),
        }
    }
}

/// 1項目の判定結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemJudgment {
    pub item: String,
    pub status: ItemStatus,
}

impl ItemJudgment {
    pub fn new(item: impl Into<String>, status: ItemStatus) -> Self {
        Self { item: item.into(), status }
    }
}

/// 設備ごとの集約結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentResult {
    pub equipment: String,
    pub summary: String,
}

/// 点検履歴の1行
///
/// 表形式で保存するときの列順は
/// 点検日時・ライン・設備・結果・備考・写真 で固定。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
    pub line: String,
    pub equipment: String,
    pub summary: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub photo_ref: Option<String>,
}

impl ResultRecord {
    /// 表形式の1行（列順固定）
    pub fn to_row(&self) -> [String; 6] {
        [
            format_timestamp(&self.timestamp),
            self.line.clone(),
            self.equipment.clone(),
            self.summary.clone(),
            self.note.clone(),
            self.photo_ref.clone().unwrap_or_default(),
        ]
    }

    /// 表形式の1行から復元
    ///
    /// 列が足りない行・日時が読めない行は None。
    pub fn from_row<S: AsRef<str>>(fields: &[S]) -> Option<Self> {
        if fields.len() < 4 {
            return None;
        }
        let field = |i: usize| fields.get(i).map(|f| f.as_ref().to_string()).unwrap_or_default();
        let timestamp = parse_timestamp(&field(0))?;
        let photo_ref = field(5);

        Some(Self {
            timestamp,
            line: field(1),
            equipment: field(2),
            summary: field(3),
            note: field(4),
            photo_ref: if photo_ref.trim().is_empty() { None } else { Some(photo_ref) },
        })
    }
}

/// 表形式のヘッダー
pub const RESULT_HEADERS: [&str; 6] = ["点検日時", "ライン", "設備", "結果", "備考", "写真"];

/// 点検マスタのヘッダー
pub const CATALOG_HEADERS: [&str; 4] = ["ライン", "設備", "分類", "点検項目"];

pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// 点検日時をパース
///
/// 日付のみの旧形式（`2026-01-18`）は 00:00:00 として読む。
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(ts) = NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT) {
        return Some(ts);
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(ts);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

mod timestamp_format {
    use super::{format_timestamp, parse_timestamp};
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_timestamp(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_timestamp(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", s)))
    }
}
