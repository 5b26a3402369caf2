//! 点検マスタの取り込み・QRリンクの統合テスト

use factory_inspection::qr;
use factory_inspection::runtime::App;
use factory_inspection::store::{catalog_store_for_path, MemoryCatalogStore, MemoryPhotoStore, MemoryResultLog, Stores};
use inspection_common::flow::{Action, Mode, NoticeLevel};
use inspection_common::{build_line_selector_url, line_from_url, CatalogEntry};
use tempfile::tempdir;

const MASTER_CSV: &str = "\
ライン,設備,分類,点検項目
第1ライン,プレス機,本体,異音がないこと
第1ライン,プレス機,安全装置,非常停止
第2ライン,旋盤,本体,チャックの摩耗
第1ライン,プレス機,本体,油漏れ
";

fn stores() -> Stores {
    Stores {
        catalog: Box::new(MemoryCatalogStore::with_rows(vec![CatalogEntry::new("旧ライン", "旧設備", "本体", "旧項目")])),
        results: Box::new(MemoryResultLog::default()),
        photos: Box::new(MemoryPhotoStore::default()),
    }
}

#[test]
fn test_import_csv_master_and_convert_to_xlsx() {
    let dir = tempdir().unwrap();
    let csv_path = dir.path().join("master.csv");
    std::fs::write(&csv_path, MASTER_CSV).unwrap();

    let rows = catalog_store_for_path(&csv_path).load_catalog().unwrap();
    assert_eq!(rows.len(), 4);

    let mut app = App::start(stores(), None);
    app.dispatch(Action::SwitchMode(Mode::CatalogEdit));
    app.dispatch(Action::EditRows(rows));
    app.dispatch(Action::SaveCatalog);
    assert_eq!(app.state().notice.as_ref().map(|n| n.level), Some(NoticeLevel::Success));

    let catalog = &app.state().catalog;
    assert_eq!(catalog.lines(), vec!["第1ライン", "第2ライン"]);
    // 同じ分類の項目は初出の分類にまとまる
    let checklist = catalog.checklist("第1ライン");
    let press = checklist.find("プレス機").unwrap();
    let names: Vec<&str> = press.categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["本体", "安全装置"]);
    assert_eq!(press.categories[0].items, vec!["異音がないこと", "油漏れ"]);

    // 保存先にも反映される
    assert_eq!(app.stores().catalog.load_catalog().unwrap().len(), 4);

    let xlsx_path = dir.path().join("master.xlsx");
    catalog_store_for_path(&xlsx_path).replace_catalog(catalog.rows()).unwrap();
    let reloaded = catalog_store_for_path(&xlsx_path).load_catalog().unwrap();
    assert_eq!(reloaded, catalog.rows());
}

#[test]
fn test_qr_link_selects_line() {
    let dir = tempdir().unwrap();
    let (url, path) = qr::write_line_qr("http://factory.local:8501/?lang=ja", "Bライン", dir.path()).unwrap();
    assert!(path.exists());
    assert_eq!(url, build_line_selector_url("http://factory.local:8501/?lang=ja", "Bライン").unwrap());

    // リンクから開くとそのラインが選ばれる（組み込みマスタ）
    let requested = line_from_url(&url).unwrap();
    assert_eq!(requested.as_deref(), Some("Bライン"));
    let app = App::start(Stores::in_memory(), requested);
    let session = app.state().session.as_ref().unwrap();
    assert_eq!(session.line(), "Bライン");
    assert_eq!(session.checklist().equipment_names(), vec!["溶接ロボット"]);
}

#[test]
fn test_unknown_line_in_link_falls_back_to_first() {
    let url = build_line_selector_url("http://localhost:8501/", "存在しないライン").unwrap();
    let app = App::start(Stores::in_memory(), line_from_url(&url).unwrap());
    assert_eq!(app.state().session.as_ref().unwrap().line(), "Aライン");
}
