//! 点検マスタモジュール
//!
//! ライン → 設備 → 分類 → 点検項目 の階層をマスタの行順のまま組み立てる。
//! グループ化は文字列の完全一致で行い、前後空白や大文字小文字は区別したまま扱う。

use crate::error::Result;
use crate::types::{CatalogEntry, CATALOG_HEADERS};
use csv::{ReaderBuilder, Trim, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{Read, Write};

/// 分類ごとの点検項目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryChecklist {
    pub name: String,
    pub items: Vec<String>,
}

/// 設備ごとのチェックリスト
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentChecklist {
    pub name: String,
    pub categories: Vec<CategoryChecklist>,
}

impl EquipmentChecklist {
    /// 分類順に並べた全項目 (分類, 項目)
    pub fn items(&self) -> impl Iterator<Item = (&str, &str)> {
        self.categories
            .iter()
            .flat_map(|c| c.items.iter().map(move |i| (c.name.as_str(), i.as_str())))
    }

    pub fn item_count(&self) -> usize {
        self.categories.iter().map(|c| c.items.len()).sum()
    }
}

/// 1ライン分のチェックリスト
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineChecklist {
    pub line: String,
    pub equipment: Vec<EquipmentChecklist>,
}

impl LineChecklist {
    pub fn equipment_names(&self) -> Vec<&str> {
        self.equipment.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn find(&self, equipment: &str) -> Option<&EquipmentChecklist> {
        self.equipment.iter().find(|e| e.name == equipment)
    }
}

/// 点検マスタ全体（行順を保持）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    rows: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(rows: Vec<CatalogEntry>) -> Self {
        Self { rows }
    }

    /// マスタが読めないときに使う組み込みマスタ
    pub fn builtin_default() -> Self {
        let rows = [
            ("Aライン", "プレス機1号", "本体", "異音がないこと"),
            ("Aライン", "プレス機1号", "本体", "油漏れがないこと"),
            ("Aライン", "プレス機1号", "安全装置", "非常停止が作動すること"),
            ("Aライン", "搬送コンベア", "本体", "ベルトに損傷がないこと"),
            ("Aライン", "搬送コンベア", "配線", "ケーブルに被覆破れがないこと"),
            ("Bライン", "溶接ロボット", "本体", "トーチ先端の摩耗"),
            ("Bライン", "溶接ロボット", "配線", "コネクタの緩み"),
        ];
        Self::new(
            rows.iter()
                .map(|(l, e, c, i)| CatalogEntry::new(*l, *e, *c, *i))
                .collect(),
        )
    }

    /// CSV文字列から読み込み（1行目はヘッダー）
    pub fn from_csv_str(content: &str) -> Result<Self> {
        Self::from_csv_reader(content.as_bytes())
    }

    /// CSVリーダーから読み込み
    ///
    /// 列が4つに満たない行は読み飛ばす。値の空白は加工しない。
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::None)
            .from_reader(reader);

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            if record.len() < 4 {
                continue;
            }
            let field = |i: usize| record.get(i).unwrap_or_default();
            rows.push(CatalogEntry::new(field(0), field(1), field(2), field(3)));
        }

        Ok(Self { rows })
    }

    /// CSVとして書き出し（ヘッダー付き）
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = WriterBuilder::new().from_writer(writer);
        writer.write_record(CATALOG_HEADERS)?;
        for row in &self.rows {
            writer.write_record([&row.line, &row.equipment, &row.category, &row.item])?;
        }
        writer.flush()?;
        Ok(())
    }

    /// 全行を取得
    pub fn rows(&self) -> &[CatalogEntry] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<CatalogEntry> {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// ライン一覧（初出順）
    pub fn lines(&self) -> Vec<&str> {
        let mut lines: Vec<&str> = Vec::new();
        for row in &self.rows {
            if !lines.contains(&row.line.as_str()) {
                lines.push(&row.line);
            }
        }
        lines
    }

    pub fn has_line(&self, line: &str) -> bool {
        self.rows.iter().any(|r| r.line == line)
    }

    /// ラインのチェックリストを組み立てる
    ///
    /// 設備・分類・項目はいずれもマスタの行順（初出順）で並ぶ。
    /// 同じ項目が複数行あればそのまま複数並ぶ。
    pub fn checklist(&self, line: &str) -> LineChecklist {
        let mut equipment: Vec<EquipmentChecklist> = Vec::new();
        let mut equipment_index: HashMap<&str, usize> = HashMap::new();
        let mut category_index: HashMap<(&str, &str), usize> = HashMap::new();

        for row in self.rows.iter().filter(|r| r.line == line) {
            let e_idx = *equipment_index.entry(row.equipment.as_str()).or_insert_with(|| {
                equipment.push(EquipmentChecklist {
                    name: row.equipment.clone(),
                    categories: Vec::new(),
                });
                equipment.len() - 1
            });

            let categories = &mut equipment[e_idx].categories;
            let c_idx = *category_index
                .entry((row.equipment.as_str(), row.category.as_str()))
                .or_insert_with(|| {
                    categories.push(CategoryChecklist {
                        name: row.category.clone(),
                        items: Vec::new(),
                    });
                    categories.len() - 1
                });

            categories[c_idx].items.push(row.item.clone());
        }

        LineChecklist {
            line: line.to_string(),
            equipment,
        }
    }

    /// ラインの設備一覧
    pub fn equipment(&self, line: &str) -> Vec<String> {
        self.checklist(line).equipment.into_iter().map(|e| e.name).collect()
    }

    /// (ライン, 設備)の分類一覧
    pub fn categories(&self, line: &str, equipment: &str) -> Vec<String> {
        self.checklist(line)
            .find(equipment)
            .map(|e| e.categories.iter().map(|c| c.name.clone()).collect())
            .unwrap_or_default()
    }

    /// (ライン, 設備, 分類)の点検項目
    pub fn items(&self, line: &str, equipment: &str, category: &str) -> Vec<String> {
        self.checklist(line)
            .find(equipment)
            .and_then(|e| e.categories.iter().find(|c| c.name == category))
            .map(|c| c.items.clone())
            .unwrap_or_default()
    }
}
