use thiserror::Error;

#[derive(Error, Debug)]
pub enum InspectionError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("点検結果の保存に失敗しました: {0}")]
    StorageWrite(String),

    #[error("点検データの読み込みに失敗しました: {0}")]
    StorageRead(String),

    #[error("Excel読み書きエラー: {0}")]
    Spreadsheet(String),

    #[error("写真の保存に失敗しました: {0}")]
    Photo(String),

    #[error("QRコード生成エラー: {0}")]
    QrCode(String),

    #[error("入力エラー: {0}")]
    Validation(String),

    #[error("対話入力エラー: {0}")]
    Dialog(String),

    #[error("まだデータがありません")]
    NoData,

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] inspection_common::Error),
}

impl From<dialoguer::Error> for InspectionError {
    fn from(e: dialoguer::Error) -> Self {
        InspectionError::Dialog(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, InspectionError>;
