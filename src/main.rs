use anyhow::{bail, Context};
use clap::Parser;
use factory_inspection::{cli, config, display, interactive, qr, runtime, store};
use cli::{CatalogCommand, Cli, Commands};
use config::Config;
use inspection_common::flow::{Action, Mode};
use inspection_common::{line_from_url, JudgmentInput};
use runtime::App;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// 直近の通知を表示し、エラーなら終了コードに反映する
fn finish(app: &App) -> anyhow::Result<()> {
    match app.state().notice.as_ref() {
        Some(notice) if notice.is_blocking() => bail!("{}", notice.message),
        Some(notice) => {
            display::print_notice(notice);
            Ok(())
        }
        None => Ok(()),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load().context("設定ファイルを読み込めませんでした")?;
    if let Some(dir) = cli.data_dir.clone() {
        config.data_dir = dir;
    }
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    tracing::debug!(data_dir = %config.data_dir.display(), backend = %config.backend, "設定を読み込みました");

    match cli.command {
        Commands::Run { line, url, input, note, photo, yes } => {
            let requested = match url {
                Some(url) => line_from_url(&url)?,
                None => line,
            };
            let mut app = App::start(store::Stores::from_config(&config), requested);
            if let Some(notice) = app.state().notice.as_ref() {
                display::print_notice(notice);
            }

            let Some(session) = app.state().session.as_ref() else {
                bail!("点検マスタにラインがありません");
            };
            println!("🛠 inspect - {} の点検\n", session.line());

            for arg in &photo {
                let (equipment, path) = interactive::parse_photo_arg(arg)?;
                interactive::attach_photo_file(&mut app, &equipment, &path)?;
            }
            if let Some(note) = note {
                app.dispatch(Action::SetNote(note));
            }

            let confirmed = match input {
                Some(path) => {
                    let content = std::fs::read_to_string(&path)
                        .with_context(|| format!("判定ファイルを読み込めませんでした: {}", path.display()))?;
                    let inputs: Vec<JudgmentInput> = serde_json::from_str(&content)?;
                    app.dispatch(Action::ApplyInputs(inputs));
                    if let Some(notice) = app.state().notice.as_ref().filter(|n| n.is_blocking()) {
                        bail!("{}", notice.message);
                    }
                    true
                }
                None if yes => true,
                None => interactive::run_walkthrough(&mut app)?,
            };

            if !confirmed {
                println!("登録を取りやめました");
                return Ok(());
            }

            let timestamp = chrono::Local::now().naive_local();
            let saved = app.submit(timestamp)?;
            for record in &saved {
                println!("  {}: {}", record.equipment, record.summary);
            }
            finish(&app)?;
        }

        Commands::Catalog { action } => {
            let mut app = App::start(store::Stores::from_config(&config), None);
            match action {
                CatalogCommand::Show { line } => {
                    let catalog = &app.state().catalog;
                    let lines: Vec<String> = match line {
                        Some(line) if catalog.has_line(&line) => vec![line],
                        Some(line) => bail!("ラインが見つかりません: {}", line),
                        None => catalog.lines().into_iter().map(String::from).collect(),
                    };
                    for line in &lines {
                        display::print_checklist(&catalog.checklist(line));
                    }
                }
                CatalogCommand::Import { file } => {
                    let rows = store::catalog_store_for_path(&file).load_catalog()?;
                    if rows.is_empty() {
                        bail!("点検項目がありません: {}", file.display());
                    }
                    let count = rows.len();
                    app.dispatch(Action::SwitchMode(Mode::CatalogEdit));
                    app.dispatch(Action::EditRows(rows));
                    app.dispatch(Action::SaveCatalog);
                    finish(&app)?;
                    println!("  {}行を取り込みました", count);
                }
                CatalogCommand::Export { file } => {
                    store::catalog_store_for_path(&file).replace_catalog(app.state().catalog.rows())?;
                    println!("✔ 点検マスタを書き出しました: {}", file.display());
                }
                CatalogCommand::Edit => {
                    if interactive::run_catalog_editor(&mut app)? {
                        finish(&app)?;
                    } else {
                        println!("変更を破棄しました");
                    }
                }
            }
        }

        Commands::History { filter } => {
            let mut app = App::start(store::Stores::from_config(&config), None);
            app.dispatch(Action::SetHistoryFilter(filter.to_filter()));
            app.dispatch(Action::SwitchMode(Mode::History));

            match app.state().history.as_ref() {
                Some(view) if !view.is_empty() => {
                    let rows = view.rows();
                    display::print_history(&rows);
                    println!("\n{}件", rows.len());
                }
                _ => finish(&app)?,
            }
        }

        Commands::Export { format, output, filter } => {
            let mut app = App::start(store::Stores::from_config(&config), None);
            app.set_export_path(output.unwrap_or_else(|| PathBuf::from(".")));
            app.dispatch(Action::SetHistoryFilter(filter.to_filter()));
            app.dispatch(Action::SwitchMode(Mode::History));
            app.dispatch(Action::Export(format));
            finish(&app)?;
        }

        Commands::Qr { line, base_url, output } => {
            let app = App::start(store::Stores::from_config(&config), None);
            let base_url = base_url.unwrap_or_else(|| config.base_url.clone());
            let lines: Vec<String> = match line {
                Some(line) => vec![line],
                None => app.state().catalog.lines().into_iter().map(String::from).collect(),
            };
            if lines.len() > 1 {
                std::fs::create_dir_all(&output)?;
            }
            for line in &lines {
                let (url, path) = qr::write_line_qr(&base_url, line, &output)?;
                println!("✔ {}: {} → {}", line, url, path.display());
            }
        }

        Commands::Config { show, set_base_url, set_backend, set_data_dir } => {
            let mut stored = Config::load_from(&Config::config_path()?)?;
            let mut changed = false;

            if let Some(url) = set_base_url {
                stored.base_url = url;
                changed = true;
            }
            if let Some(backend) = set_backend {
                stored.backend = backend;
                changed = true;
            }
            if let Some(dir) = set_data_dir {
                stored.data_dir = dir;
                changed = true;
            }
            if changed {
                stored.save()?;
                println!("✔ 設定を保存しました");
            }

            if show || !changed {
                println!("設定:");
                println!("  データディレクトリ: {}", stored.data_dir.display());
                println!("  保存形式: {}", stored.backend);
                println!("  点検マスタ: {}", stored.catalog_path().display());
                println!("  点検結果: {}", stored.results_path().display());
                println!("  写真: {}", stored.photo_dir().display());
                println!("  QR基準URL: {}", stored.base_url);
                if std::env::var(config::DATA_DIR_ENV).is_ok() {
                    println!("  ({} でデータディレクトリを上書き中: {})", config::DATA_DIR_ENV, config.data_dir.display());
                }
            }
        }
    }

    Ok(())
}
