//! 点検履歴の表示用ビュー
//!
//! 日時の降順に並べ、条件で絞り込み、優先度ごとの色を付ける。

use crate::aggregate::{classify_summary, Priority};
use crate::types::ResultRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 行の塗り色（RGB）
pub fn row_fill(priority: Priority) -> Option<u32> {
    match priority {
        Priority::Abnormal => Some(0xFFC7CE),
        Priority::NotDone => Some(0xFFEB9C),
        Priority::Normal => None,
    }
}

/// 絞り込み条件（未指定は全件）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryFilter {
    pub line: Option<String>,
    pub equipment: Option<String>,
    pub priority: Option<Priority>,
    pub since: Option<NaiveDate>,
    pub until: Option<NaiveDate>,
}

impl HistoryFilter {
    pub fn matches(&self, record: &ResultRecord) -> bool {
        if let Some(line) = &self.line {
            if &record.line != line {
                return false;
            }
        }
        if let Some(equipment) = &self.equipment {
            if &record.equipment != equipment {
                return false;
            }
        }
        if let Some(priority) = self.priority {
            if classify_summary(&record.summary) != priority {
                return false;
            }
        }
        let date = record.timestamp.date();
        if self.since.is_some_and(|since| date < since) {
            return false;
        }
        if self.until.is_some_and(|until| date > until) {
            return false;
        }
        true
    }
}

/// 表示用の1行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRow<'a> {
    pub record: &'a ResultRecord,
    pub priority: Priority,
}

impl HistoryRow<'_> {
    pub fn fill(&self) -> Option<u32> {
        row_fill(self.priority)
    }
}

/// 点検履歴（日時の降順で保持）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryView {
    records: Vec<ResultRecord>,
    filter: HistoryFilter,
}

impl HistoryView {
    /// 日時の降順に並べる（同時刻は保存順を保つ）
    pub fn new(mut records: Vec<ResultRecord>) -> Self {
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Self {
            records,
            filter: HistoryFilter::default(),
        }
    }

    pub fn with_filter(mut self, filter: HistoryFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn set_filter(&mut self, filter: HistoryFilter) {
        self.filter = filter;
    }

    pub fn filter(&self) -> &HistoryFilter {
        &self.filter
    }

    /// 保存済みの記録が1件もない
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 書き出しは記録があるときだけ
    pub fn can_export(&self) -> bool {
        !self.is_empty()
    }

    /// 全件（降順）
    pub fn records(&self) -> &[ResultRecord] {
        &self.records
    }

    /// 絞り込み後の行
    pub fn rows(&self) -> Vec<HistoryRow<'_>> {
        self.records
            .iter()
            .filter(|r| self.filter.matches(r))
            .map(|record| HistoryRow {
                record,
                priority: classify_summary(&record.summary),
            })
            .collect()
    }

    /// 絞り込み後の記録（書き出し用）
    pub fn filtered_records(&self) -> Vec<ResultRecord> {
        self.rows().into_iter().map(|r| r.record.clone()).collect()
    }
}
