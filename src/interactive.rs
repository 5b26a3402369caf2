//! 対話式の点検入力・マスタ編集

use crate::error::{InspectionError, Result};
use crate::runtime::App;
use dialoguer::{Confirm, Input, Select};
use inspection_common::catalog::EquipmentChecklist;
use inspection_common::flow::{Action, Mode};
use inspection_common::{CatalogEntry, ItemStatus};
use std::path::PathBuf;

/// 設備ごとの入力方法
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EquipmentAction {
    /// 1項目ずつ入力
    EachItem,
    /// すべて正常
    AllNormal,
    /// 未実施のまま次へ
    Skip,
}

impl EquipmentAction {
    const ALL: [EquipmentAction; 3] = [
        EquipmentAction::EachItem,
        EquipmentAction::AllNormal,
        EquipmentAction::Skip,
    ];

    fn label(&self) -> &'static str {
        match self {
            EquipmentAction::EachItem => "1項目ずつ入力",
            EquipmentAction::AllNormal => "すべて正常",
            EquipmentAction::Skip => "未実施のまま次へ",
        }
    }
}

/// `設備=写真パス` 形式の引数を分解
pub fn parse_photo_arg(arg: &str) -> Result<(String, PathBuf)> {
    match arg.split_once('=') {
        Some((equipment, path)) if !equipment.trim().is_empty() && !path.trim().is_empty() => {
            Ok((equipment.to_string(), PathBuf::from(path.trim())))
        }
        _ => Err(InspectionError::Validation(format!(
            "写真の指定は 設備名=ファイルパス の形式です: {}",
            arg
        ))),
    }
}

/// 写真ファイルを読み込んで添付
pub fn attach_photo_file(app: &mut App, equipment: &str, path: &PathBuf) -> Result<()> {
    if !path.exists() {
        return Err(InspectionError::FileNotFound(path.display().to_string()));
    }
    let bytes = std::fs::read(path)?;
    app.dispatch(Action::AttachPhoto {
        equipment: equipment.to_string(),
        bytes,
    });
    let attached = app.state().session.as_ref().is_some_and(|s| s.has_photo(equipment));
    if !attached {
        let message = app
            .state()
            .notice
            .as_ref()
            .filter(|n| n.is_blocking())
            .map(|n| n.message.clone())
            .unwrap_or_else(|| format!("写真を添付できませんでした: {}", equipment));
        return Err(InspectionError::Validation(message));
    }
    Ok(())
}

fn prompt_item(category: &str, item: &str) -> Result<ItemStatus> {
    let labels: Vec<&str> = ItemStatus::ALL.iter().map(|s| s.label()).collect();
    let idx = Select::new()
        .with_prompt(format!("  [{}] {}", category, item))
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(ItemStatus::ALL[idx])
}

fn walk_equipment(app: &mut App, equipment: &EquipmentChecklist) -> Result<()> {
    let labels: Vec<&str> = EquipmentAction::ALL.iter().map(|a| a.label()).collect();
    let choice = Select::new()
        .with_prompt("入力方法")
        .items(&labels)
        .default(0)
        .interact()?;

    match EquipmentAction::ALL[choice] {
        EquipmentAction::EachItem => {
            for (idx, (category, item)) in equipment.items().enumerate() {
                let status = prompt_item(category, item)?;
                app.dispatch(Action::SetStatus {
                    equipment: equipment.name.clone(),
                    item_index: idx,
                    status,
                });
            }
        }
        EquipmentAction::AllNormal => {
            app.dispatch(Action::SetAll {
                equipment: equipment.name.clone(),
                status: ItemStatus::Normal,
            });
            println!("  → すべて正常");
        }
        EquipmentAction::Skip => println!("  → 未実施"),
    }

    let photo: String = Input::new()
        .with_prompt("写真ファイル（省略可）")
        .allow_empty(true)
        .interact_text()?;
    if !photo.trim().is_empty() {
        attach_photo_file(app, &equipment.name, &PathBuf::from(photo.trim()))?;
    }
    Ok(())
}

/// 対話式でラインの点検を入力する
///
/// 登録まで進んだら true、取りやめたら false。
pub fn run_walkthrough(app: &mut App) -> Result<bool> {
    let checklist = match app.state().session.as_ref() {
        Some(session) => session.checklist().clone(),
        None => return Err(InspectionError::Validation("ラインが選択されていません".into())),
    };

    println!("🛠 {} の点検（設備 {}台）", checklist.line, checklist.equipment.len());
    println!("---");

    for (count, equipment) in checklist.equipment.iter().enumerate() {
        println!(
            "\n[{}/{}] {} ({}項目)",
            count + 1,
            checklist.equipment.len(),
            equipment.name,
            equipment.item_count()
        );
        walk_equipment(app, equipment)?;
    }

    let note: String = Input::new()
        .with_prompt("備考（全設備共通・省略可）")
        .allow_empty(true)
        .interact_text()?;
    app.dispatch(Action::SetNote(note));

    if let Some(session) = app.state().session.as_ref() {
        println!("\n--- 点検結果 ---");
        for (result, priority) in session.equipment_results() {
            println!("  {}: {} ({})", result.equipment, result.summary, priority.label());
        }
    }

    Ok(Confirm::new()
        .with_prompt("この内容で登録しますか?")
        .default(true)
        .interact()?)
}

fn prompt_row() -> Result<CatalogEntry> {
    let ask = |prompt: &str| -> Result<String> {
        Ok(Input::<String>::new().with_prompt(prompt).interact_text()?)
    };
    Ok(CatalogEntry::new(ask("ライン")?, ask("設備")?, ask("分類")?, ask("点検項目")?))
}

fn print_draft(rows: &[CatalogEntry]) {
    if rows.is_empty() {
        println!("  (行がありません)");
    }
    for (idx, row) in rows.iter().enumerate() {
        println!("  {:>3}: {} / {} / {} / {}", idx + 1, row.line, row.equipment, row.category, row.item);
    }
}

/// 対話式の点検マスタ編集
///
/// 保存したら true、破棄したら false。
pub fn run_catalog_editor(app: &mut App) -> Result<bool> {
    app.dispatch(Action::SwitchMode(Mode::CatalogEdit));
    let menu = ["一覧表示", "行を追加", "行を削除", "保存して終了", "破棄して終了"];

    loop {
        let choice = Select::new()
            .with_prompt("点検マスタ編集")
            .items(&menu)
            .default(0)
            .interact()?;

        match choice {
            0 => print_draft(&app.state().catalog_draft),
            1 => {
                let row = prompt_row()?;
                app.dispatch(Action::AddRow(row));
            }
            2 => {
                print_draft(&app.state().catalog_draft);
                let number: usize = Input::new().with_prompt("削除する行番号").interact_text()?;
                app.dispatch(Action::RemoveRow(number.saturating_sub(1)));
                if let Some(notice) = app.state().notice.as_ref() {
                    println!("⚠ {}", notice.message);
                }
            }
            3 => {
                app.dispatch(Action::SaveCatalog);
                return Ok(true);
            }
            _ => return Ok(false),
        }
    }
}
