//! ライン選択QRコード
//!
//! 拡張子が .svg ならSVG、それ以外はPNGで出力する。

use crate::error::{InspectionError, Result};
use image::Luma;
use inspection_common::build_line_selector_url;
use qrcode::render::svg;
use qrcode::QrCode;
use std::path::{Path, PathBuf};

const MIN_SIZE_PX: u32 = 240;

fn encode(url: &str) -> Result<QrCode> {
    QrCode::new(url.as_bytes()).map_err(|e| InspectionError::QrCode(e.to_string()))
}

/// SVG文字列を生成
pub fn qr_svg(url: &str) -> Result<String> {
    Ok(encode(url)?
        .render::<svg::Color>()
        .min_dimensions(MIN_SIZE_PX, MIN_SIZE_PX)
        .build())
}

/// QRコードを書き出す
pub fn write_qr(url: &str, output: &Path) -> Result<()> {
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let is_svg = output
        .extension()
        .map(|e| e.eq_ignore_ascii_case("svg"))
        .unwrap_or(false);

    if is_svg {
        std::fs::write(output, qr_svg(url)?)?;
    } else {
        let image = encode(url)?
            .render::<Luma<u8>>()
            .min_dimensions(MIN_SIZE_PX, MIN_SIZE_PX)
            .build();
        image
            .save(output)
            .map_err(|e| InspectionError::QrCode(format!("{}: {}", output.display(), e)))?;
    }
    Ok(())
}

/// ラインごとのQRファイル名
pub fn qr_file_name(line: &str, extension: &str) -> String {
    let safe: String = line
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("qr_{}.{}", safe, extension)
}

/// ラインのリンクURLとQRコードを作る
pub fn write_line_qr(base_url: &str, line: &str, output: &Path) -> Result<(String, PathBuf)> {
    let url = build_line_selector_url(base_url, line)?;
    let path = if output.is_dir() || output.extension().is_none() {
        output.join(qr_file_name(line, "png"))
    } else {
        output.to_path_buf()
    };
    write_qr(&url, &path)?;
    tracing::debug!(%url, path = %path.display(), "QRコードを出力しました");
    Ok((url, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_qr_svg() {
        let svg = qr_svg("http://localhost:8501/?line=A").unwrap();
        assert!(svg.contains("<svg"));
    }

    #[test]
    fn test_qr_file_name() {
        assert_eq!(qr_file_name("Aライン", "png"), "qr_Aライン.png");
        assert_eq!(qr_file_name("Line 1/2", "svg"), "qr_Line_1_2.svg");
    }

    #[test]
    fn test_write_line_qr_png() {
        let dir = tempdir().unwrap();
        let (url, path) = write_line_qr("http://localhost:8501/", "Bライン", dir.path()).unwrap();
        assert!(url.contains("line="));
        assert_eq!(path, dir.path().join("qr_Bライン.png"));
        assert!(std::fs::read(&path).unwrap().starts_with(b"\x89PNG"));
    }

    #[test]
    fn test_write_qr_svg_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("line.svg");
        write_qr("http://localhost:8501/?line=A", &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<svg"));
    }
}
