use crate::config::Backend;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use inspection_common::{ExportFormat, HistoryFilter, Priority};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "inspect")]
#[command(about = "設備点検記録ツール（ライン別チェックリスト・点検履歴・QRリンク）", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// データディレクトリ（設定ファイルより優先）
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// 保存形式 (csv/xlsx)
    #[arg(long, global = true)]
    pub backend: Option<Backend>,
}

/// 履歴の絞り込み条件
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// ライン
    #[arg(short, long)]
    pub line: Option<String>,

    /// 設備
    #[arg(short, long)]
    pub equipment: Option<String>,

    /// 区分 (ng/not-done/normal)
    #[arg(short, long)]
    pub status: Option<Priority>,

    /// この日以降 (YYYY-MM-DD)
    #[arg(long)]
    pub since: Option<NaiveDate>,

    /// この日以前 (YYYY-MM-DD)
    #[arg(long)]
    pub until: Option<NaiveDate>,
}

impl FilterArgs {
    pub fn to_filter(&self) -> HistoryFilter {
        HistoryFilter {
            line: self.line.clone(),
            equipment: self.equipment.clone(),
            priority: self.status,
            since: self.since,
            until: self.until,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// 点検を入力して登録
    Run {
        /// ライン（省略時は先頭のライン）
        #[arg(short, long, conflicts_with = "url")]
        line: Option<String>,

        /// QRコードのリンクURL（line パラメータでラインを選択）
        #[arg(long)]
        url: Option<String>,

        /// 判定JSONファイル（指定時は対話入力しない）
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// 備考（全設備共通）
        #[arg(short, long)]
        note: Option<String>,

        /// 写真（設備名=ファイルパス、複数指定可）
        #[arg(short, long)]
        photo: Vec<String>,

        /// 確認なしで登録
        #[arg(short, long)]
        yes: bool,
    },

    /// 点検マスタの表示・取り込み・編集
    Catalog {
        #[command(subcommand)]
        action: CatalogCommand,
    },

    /// 点検履歴を表示
    History {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// 点検履歴を書き出し
    Export {
        /// 出力形式 (csv/excel)
        #[arg(short, long, default_value = "csv")]
        format: ExportFormat,

        /// 出力ファイル/ディレクトリ
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// ライン選択用のQRコードを生成
    Qr {
        /// ライン（省略時は全ライン）
        #[arg(short, long)]
        line: Option<String>,

        /// リンクの基準URL（省略時は設定値）
        #[arg(long)]
        base_url: Option<String>,

        /// 出力ファイル/ディレクトリ
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// 設定を表示/編集
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// QRリンクの基準URLを設定
        #[arg(long)]
        set_base_url: Option<String>,

        /// 保存形式を設定 (csv/xlsx)
        #[arg(long)]
        set_backend: Option<Backend>,

        /// データディレクトリを設定
        #[arg(long)]
        set_data_dir: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum CatalogCommand {
    /// ラインのチェックリストを表示
    Show {
        /// ライン（省略時は全ライン）
        #[arg(short, long)]
        line: Option<String>,
    },

    /// CSV/Excelファイルで点検マスタを置き換え
    Import {
        #[arg(required = true)]
        file: PathBuf,
    },

    /// 点検マスタをCSV/Excelファイルに書き出し
    Export {
        #[arg(required = true)]
        file: PathBuf,
    },

    /// 対話式で行を追加・削除
    Edit,
}
