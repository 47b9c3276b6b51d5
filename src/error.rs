use thiserror::Error;

#[derive(Error, Debug)]
pub enum SkinAiError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("写真をアップロードしてください（jpg/png）: {0}")]
    UnsupportedPhoto(String),

    #[error("画像読み込みエラー: {0}")]
    ImageLoad(String),

    #[error("入力エラー: {0}")]
    InvalidInput(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] skin_ai_common::Error),
}

pub type Result<T> = std::result::Result<T, SkinAiError>;
