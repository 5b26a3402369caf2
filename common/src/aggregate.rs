//! 判定集約モジュール
//!
//! 1設備分の項目判定を1つの結果文字列にまとめ、
//! 表示色・通知メッセージ用の優先度を求める。

use crate::types::{EquipmentResult, ItemJudgment, ItemStatus};
use serde::{Deserialize, Serialize};

pub const NORMAL_SUMMARY: &str = "Normal";
pub const NG_PREFIX: &str = "NG: ";
pub const NOT_DONE_PREFIX: &str = "Not done: ";
pub const CLAUSE_SEPARATOR: &str = " / ";
const ITEM_SEPARATOR: &str = ", ";

/// 結果の優先度（異常 > 未実施 > 正常）
///
/// 派生の `Ord` は宣言順なので、`max()` がそのまま最優先の区分になる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Priority {
    Normal,
    NotDone,
    Abnormal,
}

impl Priority {
    pub fn label(&self) -> &'static str {
        match self {
            Priority::Normal => "正常",
            Priority::NotDone => "未実施あり",
            Priority::Abnormal => "異常あり",
        }
    }

    /// 登録後に表示する通知
    pub fn alert_message(&self) -> &'static str {
        match self {
            Priority::Abnormal => "異常が記録されました。保全担当へ連絡してください。",
            Priority::NotDone => "未実施の項目があります。後ほど点検を完了してください。",
            Priority::Normal => "点検結果を保存しました。すべて正常です。",
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ng" | "abnormal" => Ok(Priority::Abnormal),
            "not-done" | "notdone" | "not_done" => Ok(Priority::NotDone),
            "normal" | "ok" => Ok(Priority::Normal),
            _ => Err(format!("Unknown status: {}. Use ng, not-done, or normal", s)),
        }
    }
}

/// 判定列から結果文字列を組み立てる
///
/// 異常項目・未実施項目を出現順（重複もそのまま）に並べ、
/// `NG: a, b / Not done: c` の形にする。どちらも無ければ `Normal`。
pub fn summarize(judgments: &[ItemJudgment]) -> String {
    let abnormal = items_with(judgments, ItemStatus::Abnormal);
    let not_done = items_with(judgments, ItemStatus::NotDone);

    let mut clauses = Vec::with_capacity(2);
    if !abnormal.is_empty() {
        clauses.push(format!("{}{}", NG_PREFIX, abnormal.join(ITEM_SEPARATOR)));
    }
    if !not_done.is_empty() {
        clauses.push(format!("{}{}", NOT_DONE_PREFIX, not_done.join(ITEM_SEPARATOR)));
    }

    if clauses.is_empty() {
        NORMAL_SUMMARY.to_string()
    } else {
        clauses.join(CLAUSE_SEPARATOR)
    }
}

/// 判定列の優先度
pub fn classify(judgments: &[ItemJudgment]) -> Priority {
    judgments
        .iter()
        .map(|j| match j.status {
            ItemStatus::Abnormal => Priority::Abnormal,
            ItemStatus::NotDone => Priority::NotDone,
            ItemStatus::Normal => Priority::Normal,
        })
        .max()
        .unwrap_or(Priority::Normal)
}

/// 保存済みの結果文字列から優先度を復元
pub fn classify_summary(summary: &str) -> Priority {
    if summary.starts_with(NG_PREFIX) {
        Priority::Abnormal
    } else if summary.starts_with(NOT_DONE_PREFIX) {
        Priority::NotDone
    } else {
        Priority::Normal
    }
}

/// 1設備分の集約
pub fn aggregate(equipment: &str, judgments: &[ItemJudgment]) -> (EquipmentResult, Priority) {
    let result = EquipmentResult {
        equipment: equipment.to_string(),
        summary: summarize(judgments),
    };
    (result, classify(judgments))
}

/// バッチ全体の優先度（通知メッセージの選択に使う）
pub fn batch_priority<'a, I>(summaries: I) -> Priority
where
    I: IntoIterator<Item = &'a str>,
{
    summaries
        .into_iter()
        .map(classify_summary)
        .max()
        .unwrap_or(Priority::Normal)
}

fn items_with(judgments: &[ItemJudgment], status: ItemStatus) -> Vec<&str> {
    judgments
        .iter()
        .filter(|j| j.status == status)
        .map(|j| j.item.as_str())
        .collect()
}
