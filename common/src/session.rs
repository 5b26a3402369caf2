//! 点検セッション
//!
//! 1ライン分の入力（項目判定・写真・備考）を保持し、
//! 登録時に設備ごとの ResultRecord をまとめて作る。

use crate::aggregate::{self, batch_priority, Priority};
use crate::catalog::LineChecklist;
use crate::error::{Error, Result};
use crate::types::{EquipmentResult, ItemJudgment, ItemStatus, ResultRecord};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// 登録待ちの写真
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUpload {
    pub equipment: String,
    pub bytes: Vec<u8>,
}

/// 1回の登録で作られる記録一式
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionBatch {
    pub timestamp: NaiveDateTime,
    pub records: Vec<ResultRecord>,
    pub photos: Vec<PhotoUpload>,
}

impl SubmissionBatch {
    /// 写真保存後に参照名を設定
    pub fn set_photo_ref(&mut self, equipment: &str, photo_ref: String) {
        if let Some(record) = self.records.iter_mut().find(|r| r.equipment == equipment) {
            record.photo_ref = Some(photo_ref);
        }
    }

    pub fn priority(&self) -> Priority {
        batch_priority(self.records.iter().map(|r| r.summary.as_str()))
    }
}

/// スクリプト入力用の判定（設備・分類・項目で指定）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JudgmentInput {
    pub equipment: String,
    #[serde(default)]
    pub category: Option<String>,
    pub item: String,
    pub status: ItemStatus,
}

/// 写真ファイル名（点検日時 + 設備名）
pub fn photo_reference(timestamp: &NaiveDateTime, equipment: &str, extension: &str) -> String {
    let safe: String = equipment
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    format!("{}_{}.{}", timestamp.format("%Y%m%d_%H%M%S"), safe, extension)
}

/// 同名の写真があるときの参照名（拡張子の前に連番）
pub fn numbered_reference(reference: &str, n: usize) -> String {
    match reference.rsplit_once('.') {
        Some((stem, ext)) => format!("{}_{}.{}", stem, n, ext),
        None => format!("{}_{}", reference, n),
    }
}

/// 集約済み結果から登録用の記録を作る
///
/// 日時と備考はバッチ内で共通。写真の参照名は保存後に設定する。
pub fn build_batch(
    line: &str,
    results: &[EquipmentResult],
    photos: Vec<PhotoUpload>,
    note: &str,
    timestamp: NaiveDateTime,
) -> Result<SubmissionBatch> {
    if line.trim().is_empty() {
        return Err(Error::Validation("ラインが選択されていません".into()));
    }
    if results.is_empty() {
        return Err(Error::Validation(format!("{} に点検対象の設備がありません", line)));
    }
    if results.iter().any(|r| r.equipment.trim().is_empty()) {
        return Err(Error::Validation("設備名が空の行があります".into()));
    }

    let records = results
        .iter()
        .map(|r| ResultRecord {
            timestamp,
            line: line.to_string(),
            equipment: r.equipment.clone(),
            summary: r.summary.clone(),
            note: note.to_string(),
            photo_ref: None,
        })
        .collect();

    let photos = photos
        .into_iter()
        .filter(|p| results.iter().any(|r| r.equipment == p.equipment))
        .collect();

    Ok(SubmissionBatch { timestamp, records, photos })
}

/// 1ライン分の点検入力
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectionSession {
    checklist: LineChecklist,
    /// 設備ごとの判定（チェックリストの項目順）
    statuses: Vec<Vec<ItemStatus>>,
    photos: Vec<Option<Vec<u8>>>,
    note: String,
}

impl InspectionSession {
    /// 全項目を未実施で開始
    pub fn new(checklist: LineChecklist) -> Self {
        let statuses = checklist
            .equipment
            .iter()
            .map(|e| vec![ItemStatus::NotDone; e.item_count()])
            .collect();
        let photos = vec![None; checklist.equipment.len()];
        Self {
            checklist,
            statuses,
            photos,
            note: String::new(),
        }
    }

    pub fn line(&self) -> &str {
        &self.checklist.line
    }

    pub fn checklist(&self) -> &LineChecklist {
        &self.checklist
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    pub fn set_note(&mut self, note: impl Into<String>) {
        self.note = note.into();
    }

    fn equipment_index(&self, equipment: &str) -> Result<usize> {
        self.checklist
            .equipment
            .iter()
            .position(|e| e.name == equipment)
            .ok_or_else(|| Error::Validation(format!("設備が見つかりません: {}", equipment)))
    }

    /// 項目番号（設備内の通し番号）で判定を設定
    pub fn set_status(&mut self, equipment: &str, item_index: usize, status: ItemStatus) -> Result<()> {
        let idx = self.equipment_index(equipment)?;
        let slot = self.statuses[idx].get_mut(item_index).ok_or_else(|| {
            Error::Validation(format!("{} に項目番号 {} はありません", equipment, item_index + 1))
        })?;
        *slot = status;
        Ok(())
    }

    /// 項目名で判定を設定（同名項目はすべて更新）
    ///
    /// 分類を省略した場合は設備内の全分類が対象。
    pub fn set_status_by_item(
        &mut self,
        equipment: &str,
        category: Option<&str>,
        item: &str,
        status: ItemStatus,
    ) -> Result<usize> {
        let idx = self.equipment_index(equipment)?;
        let positions: Vec<usize> = self.checklist.equipment[idx]
            .items()
            .enumerate()
            .filter(|(_, (c, i))| *i == item && category.map_or(true, |cat| cat == *c))
            .map(|(pos, _)| pos)
            .collect();

        if positions.is_empty() {
            return Err(Error::Validation(format!("点検項目が見つかりません: {} / {}", equipment, item)));
        }
        for &pos in &positions {
            self.statuses[idx][pos] = status;
        }
        Ok(positions.len())
    }

    /// 設備の全項目を同じ判定にする
    pub fn set_all(&mut self, equipment: &str, status: ItemStatus) -> Result<()> {
        let idx = self.equipment_index(equipment)?;
        self.statuses[idx].iter_mut().for_each(|s| *s = status);
        Ok(())
    }

    pub fn apply_inputs(&mut self, inputs: &[JudgmentInput]) -> Result<()> {
        for input in inputs {
            self.set_status_by_item(&input.equipment, input.category.as_deref(), &input.item, input.status)?;
        }
        Ok(())
    }

    pub fn attach_photo(&mut self, equipment: &str, bytes: Vec<u8>) -> Result<()> {
        let idx = self.equipment_index(equipment)?;
        self.photos[idx] = Some(bytes);
        Ok(())
    }

    pub fn has_photo(&self, equipment: &str) -> bool {
        self.equipment_index(equipment)
            .map(|idx| self.photos[idx].is_some())
            .unwrap_or(false)
    }

    /// 設備の判定列（項目の表示順）
    pub fn judgments(&self, equipment: &str) -> Vec<ItemJudgment> {
        let Ok(idx) = self.equipment_index(equipment) else {
            return Vec::new();
        };
        self.checklist.equipment[idx]
            .items()
            .zip(self.statuses[idx].iter())
            .map(|((_, item), status)| ItemJudgment::new(item, *status))
            .collect()
    }

    /// 設備ごとの集約結果
    pub fn equipment_results(&self) -> Vec<(EquipmentResult, Priority)> {
        self.checklist
            .equipment
            .iter()
            .map(|e| aggregate::aggregate(&e.name, &self.judgments(&e.name)))
            .collect()
    }

    /// 登録用の記録を作る（日時は呼び出し側で1回だけ取得する）
    pub fn submit(&self, timestamp: NaiveDateTime) -> Result<SubmissionBatch> {
        let results: Vec<EquipmentResult> =
            self.equipment_results().into_iter().map(|(r, _)| r).collect();

        let photos = self
            .checklist
            .equipment
            .iter()
            .zip(self.photos.iter())
            .filter_map(|(e, photo)| {
                photo.as_ref().map(|bytes| PhotoUpload {
                    equipment: e.name.clone(),
                    bytes: bytes.clone(),
                })
            })
            .collect();

        build_batch(self.line(), &results, photos, &self.note, timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, CategoryChecklist, EquipmentChecklist};
    use crate::types::{parse_timestamp, CatalogEntry};

    fn catalog() -> Catalog {
        Catalog::new(vec![
            CatalogEntry::new("A", "Press", "body", "ItemX"),
            CatalogEntry::new("A", "Press", "body", "ItemY"),
            CatalogEntry::new("A", "Press", "wiring", "ItemZ"),
            CatalogEntry::new("A", "Conveyor", "body", "Belt"),
            CatalogEntry::new("B", "Robot", "body", "Torch"),
        ])
    }

    fn now() -> NaiveDateTime {
        parse_timestamp("2026-10-19 09:15:00").unwrap()
    }

    #[test]
    fn test_new_session_all_not_done() {
        let session = InspectionSession::new(catalog().checklist("A"));
        let js = session.judgments("Press");
        assert_eq!(js.len(), 3);
        assert!(js.iter().all(|j| j.status == ItemStatus::NotDone));
    }

    #[test]
    fn test_scenario_mixed_equipment() {
        let mut session = InspectionSession::new(catalog().checklist("A"));
        session.set_status("Press", 0, ItemStatus::Abnormal).unwrap();
        session.set_status("Press", 2, ItemStatus::Normal).unwrap();
        session.set_all("Conveyor", ItemStatus::Normal).unwrap();

        let results = session.equipment_results();
        assert_eq!(results[0].0.summary, "NG: ItemX / Not done: ItemY");
        assert_eq!(results[0].1, Priority::Abnormal);
        assert_eq!(results[1].0.summary, "Normal");
        assert_eq!(results[1].1, Priority::Normal);
    }

    #[test]
    fn test_submit_shares_timestamp_and_note() {
        let mut session = InspectionSession::new(catalog().checklist("A"));
        session.set_note("朝点検");
        let batch = session.submit(now()).unwrap();

        assert_eq!(batch.records.len(), 2);
        assert!(batch.records.iter().all(|r| r.timestamp == now()));
        assert!(batch.records.iter().all(|r| r.note == "朝点検"));
        assert!(batch.records.iter().all(|r| r.line == "A"));
        assert!(batch.records.iter().all(|r| r.photo_ref.is_none()));
        assert_eq!(batch.priority(), Priority::NotDone);
    }

    #[test]
    fn test_submit_carries_photos() {
        let mut session = InspectionSession::new(catalog().checklist("A"));
        session.attach_photo("Conveyor", vec![1, 2, 3]).unwrap();
        assert!(session.has_photo("Conveyor"));
        assert!(!session.has_photo("Press"));

        let mut batch = session.submit(now()).unwrap();
        assert_eq!(batch.photos.len(), 1);
        assert_eq!(batch.photos[0].equipment, "Conveyor");

        batch.set_photo_ref("Conveyor", "ref.jpg".into());
        assert_eq!(batch.records[1].photo_ref.as_deref(), Some("ref.jpg"));
        assert_eq!(batch.records[0].photo_ref, None);
    }

    #[test]
    fn test_equipment_without_items_is_normal() {
        let checklist = LineChecklist {
            line: "A".into(),
            equipment: vec![EquipmentChecklist {
                name: "Empty".into(),
                categories: vec![CategoryChecklist { name: "body".into(), items: vec![] }],
            }],
        };
        let session = InspectionSession::new(checklist);
        let batch = session.submit(now()).unwrap();
        assert_eq!(batch.records[0].summary, "Normal");
    }

    #[test]
    fn test_submit_rejects_blank_line() {
        let session = InspectionSession::new(catalog().checklist(""));
        let err = session.submit(now()).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_build_batch_rejects_blank_equipment() {
        let results = vec![EquipmentResult { equipment: " ".into(), summary: "Normal".into() }];
        let err = build_batch("A", &results, vec![], "", now()).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_set_status_unknown_targets() {
        let mut session = InspectionSession::new(catalog().checklist("A"));
        assert!(session.set_status("Robot", 0, ItemStatus::Normal).is_err());
        assert!(session.set_status("Press", 9, ItemStatus::Normal).is_err());
        assert!(session.set_status_by_item("Press", None, "Nothing", ItemStatus::Normal).is_err());
    }

    #[test]
    fn test_apply_inputs_by_name() {
        let mut session = InspectionSession::new(catalog().checklist("A"));
        let inputs: Vec<JudgmentInput> = serde_json::from_str(
            r#"[
                {"equipment": "Press", "item": "ItemX", "status": "normal"},
                {"equipment": "Press", "category": "body", "item": "ItemY", "status": "abnormal"},
                {"equipment": "Press", "category": "wiring", "item": "ItemZ", "status": "normal"}
            ]"#,
        )
        .unwrap();
        session.apply_inputs(&inputs).unwrap();

        let (result, priority) = &session.equipment_results()[0];
        assert_eq!(result.summary, "NG: ItemY");
        assert_eq!(*priority, Priority::Abnormal);
    }

    #[test]
    fn test_photo_reference_naming() {
        assert_eq!(
            photo_reference(&now(), "プレス機1号", "jpg"),
            "20261019_091500_プレス機1号.jpg"
        );
        assert_eq!(photo_reference(&now(), "A/B", "png"), "20261019_091500_A_B.png");
    }

    #[test]
    fn test_numbered_reference() {
        assert_eq!(numbered_reference("20261019_091500_A_B.png", 2), "20261019_091500_A_B_2.png");
        assert_eq!(numbered_reference("noext", 3), "noext_3");
    }
}
