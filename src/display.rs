//! 端末表示
//!
//! 点検履歴は優先度で色分けする（異常あり: 赤、未実施あり: 黄）。
//! 列幅は全角文字を2桁として揃える。

use console::{measure_text_width, pad_str, style, Alignment};
use inspection_common::flow::{Notice, NoticeLevel};
use inspection_common::history::HistoryRow;
use inspection_common::types::{format_timestamp, RESULT_HEADERS};
use inspection_common::{LineChecklist, Priority};

const MAX_COL_WIDTH: usize = 40;

fn truncate(s: &str, width: usize) -> String {
    if measure_text_width(s) > width {
        console::truncate_str(s, width, "…").into_owned()
    } else {
        s.to_string()
    }
}

/// 履歴の表（色なし）を行ごとに組み立てる
pub fn history_lines(rows: &[HistoryRow<'_>]) -> Vec<String> {
    let cells: Vec<[String; 6]> = rows
        .iter()
        .map(|r| {
            let record = r.record;
            [
                format_timestamp(&record.timestamp),
                record.line.clone(),
                record.equipment.clone(),
                record.summary.clone(),
                record.note.replace('\n', " "),
                record.photo_ref.clone().unwrap_or_default(),
            ]
        })
        .collect();

    let mut widths: Vec<usize> = RESULT_HEADERS.iter().map(|h| measure_text_width(h)).collect();
    for row in &cells {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(measure_text_width(cell)).min(MAX_COL_WIDTH);
        }
    }

    let format_row = |cells: &[&str]| -> String {
        cells
            .iter()
            .zip(widths.iter())
            .map(|(cell, w)| pad_str(&truncate(cell, *w), *w, Alignment::Left, None).into_owned())
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut lines = Vec::with_capacity(cells.len() + 2);
    lines.push(format_row(&RESULT_HEADERS));
    lines.push(widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("-+-"));
    for row in &cells {
        let refs: Vec<&str> = row.iter().map(|s| s.as_str()).collect();
        lines.push(format_row(&refs));
    }
    lines
}

/// 履歴を色付きで表示
pub fn print_history(rows: &[HistoryRow<'_>]) {
    let lines = history_lines(rows);
    for (idx, line) in lines.iter().enumerate() {
        if idx < 2 {
            println!("{}", style(line).bold());
            continue;
        }
        match rows[idx - 2].priority {
            Priority::Abnormal => println!("{}", style(line).red()),
            Priority::NotDone => println!("{}", style(line).yellow()),
            Priority::Normal => println!("{}", line),
        }
    }
}

/// 通知を表示（エラーは標準エラーへ）
pub fn print_notice(notice: &Notice) {
    match notice.level {
        NoticeLevel::Info => println!("{}", notice.message),
        NoticeLevel::Success => println!("{} {}", style("✔").green(), notice.message),
        NoticeLevel::Warning => println!("{} {}", style("⚠").yellow(), style(&notice.message).yellow()),
        NoticeLevel::Error => eprintln!("{} {}", style("✖").red(), style(&notice.message).red()),
    }
}

/// チェックリストを表示
pub fn print_checklist(checklist: &LineChecklist) {
    println!("{}", style(format!("■ {}", checklist.line)).bold());
    for equipment in &checklist.equipment {
        println!("  {} ({}項目)", equipment.name, equipment.item_count());
        for category in &equipment.categories {
            println!("    [{}]", category.name);
            for item in &category.items {
                println!("      - {}", item);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inspection_common::types::parse_timestamp;
    use inspection_common::{HistoryView, ResultRecord};

    #[test]
    fn test_truncate_only_overlong() {
        assert_eq!(truncate("プレス機", 8), "プレス機");
        let cut = truncate("プレス機1号", 8);
        assert!(cut.ends_with('…'));
        assert!(measure_text_width(&cut) <= 8);
    }

    #[test]
    fn test_history_lines_aligned() {
        let view = HistoryView::new(vec![
            ResultRecord {
                timestamp: parse_timestamp("2026-10-19 08:00:00").unwrap(),
                line: "Aライン".into(),
                equipment: "プレス機1号".into(),
                summary: "NG: 異音".into(),
                note: "朝\n点検".into(),
                photo_ref: None,
            },
            ResultRecord {
                timestamp: parse_timestamp("2026-10-18 08:00:00").unwrap(),
                line: "B".into(),
                equipment: "Robot".into(),
                summary: "Normal".into(),
                note: String::new(),
                photo_ref: None,
            },
        ]);
        let rows = view.rows();
        let lines = history_lines(&rows);

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("点検日時"));
        assert!(lines[2].contains("朝 点検"));
        // 列幅ちょうどの値は省略しない
        assert!(lines[2].contains("2026-10-19 08:00:00"));
        assert!(lines[2].contains("NG: 異音"));
        assert!(!lines[2].contains('…'));
        // 結果列の開始位置が揃っている
        let col = |line: &str| measure_text_width(&line[..line.find(" | ").unwrap()]);
        assert_eq!(col(&lines[2]), col(&lines[3]));
    }

    #[test]
    fn test_history_lines_empty() {
        let lines = history_lines(&[]);
        assert_eq!(lines.len(), 2);
    }
}
