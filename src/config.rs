use crate::error::{InspectionError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// データディレクトリを上書きする環境変数
pub const DATA_DIR_ENV: &str = "INSPECTION_DATA_DIR";

/// 保存形式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Csv,
    Xlsx,
}

impl std::str::FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Backend::Csv),
            "xlsx" | "excel" => Ok(Backend::Xlsx),
            _ => Err(format!("Unknown backend: {}. Use csv or xlsx", s)),
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Csv => write!(f, "csv"),
            Backend::Xlsx => write!(f, "xlsx"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_dir: PathBuf,
    pub backend: Backend,
    /// 拡張子なしのファイル名（保存形式で .csv / .xlsx が付く）
    pub catalog_name: String,
    pub results_name: String,
    pub photo_dir_name: String,
    /// QRリンクの基準URL
    pub base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            backend: Backend::Csv,
            catalog_name: "inspection_master".into(),
            results_name: "inspection_results".into(),
            photo_dir_name: "photos".into(),
            base_url: "http://localhost:8501/".into(),
        }
    }
}

impl Config {
    /// 設定ファイルを読み込み、環境変数で上書き
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        let mut config = Self::load_from(&config_path)?;

        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            if !dir.trim().is_empty() {
                config.data_dir = PathBuf::from(dir);
            }
        }

        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| InspectionError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("factory-inspection").join("config.json"))
    }

    fn extension(&self) -> &'static str {
        match self.backend {
            Backend::Csv => "csv",
            Backend::Xlsx => "xlsx",
        }
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.{}", self.catalog_name, self.extension()))
    }

    pub fn results_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.{}", self.results_name, self.extension()))
    }

    pub fn photo_dir(&self) -> PathBuf {
        self.data_dir.join(&self.photo_dir_name)
    }
}
