use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("ワークブック読み込みエラー: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("ワークブックにシートがありません: {0}")]
    WorkbookEmpty(String),

    #[error("KMZ生成エラー: {0}")]
    Kmz(#[from] zip::result::ZipError),

    #[error("CSV書き込みエラー: {0}")]
    Csv(#[from] csv::Error),

    #[error("公開に失敗: {0}")]
    Publish(String),

    #[error("鉱区が見つからないか設定されていません")]
    NoMineAreas,

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] borehole_fm_common::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
