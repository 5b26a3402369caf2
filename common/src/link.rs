//! ライン選択リンク
//!
//! QRコードから開いたときにラインを選択済みにするためのURLを作る。
//! クエリパラメータ `line` がライン名。

use crate::catalog::Catalog;
use crate::error::Result;
use url::Url;

pub const LINE_PARAM: &str = "line";

/// ライン選択済みで開くURLを作る
///
/// 既存のクエリは残し、`line` だけを置き換える。
pub fn build_line_selector_url(base_url: &str, line: &str) -> Result<String> {
    let mut url = Url::parse(base_url)?;
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != LINE_PARAM)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (k, v) in &kept {
            pairs.append_pair(k, v);
        }
        pairs.append_pair(LINE_PARAM, line);
    }

    Ok(url.to_string())
}

/// URLから `line` パラメータを取り出す
pub fn line_from_url(url: &str) -> Result<Option<String>> {
    let url = Url::parse(url)?;
    Ok(url
        .query_pairs()
        .find(|(k, _)| k == LINE_PARAM)
        .map(|(_, v)| v.into_owned()))
}

/// 表示するラインを決める
///
/// 指定がマスタにあればそれを、無い・不明ならマスタの先頭ラインを使う。
pub fn resolve_line(requested: Option<&str>, catalog: &Catalog) -> Option<String> {
    match requested {
        Some(line) if catalog.has_line(line) => Some(line.to_string()),
        _ => catalog.lines().first().map(|l| l.to_string()),
    }
}
