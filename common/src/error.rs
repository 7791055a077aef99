//! エラー型定義
//!
//! - `ExtractError`: 個々の抽出器が値の「不正」を報告する（「見つからない」は `None`）
//! - `Error`: レコード解決の失敗。どのフィールドで失敗したかを保持する

use thiserror::Error;

/// 抽出対象フィールド
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    HoleId,
    Interval,
    Location,
    Fineness,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Field::HoleId => write!(f, "Hole ID"),
            Field::Interval => write!(f, "Interval"),
            Field::Location => write!(f, "Location"),
            Field::Fineness => write!(f, "FM"),
        }
    }
}

/// 抽出器が検出した不正値
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractError {
    #[error("Invalid interval: start {start} >= end {end}")]
    InvalidInterval { start: f64, end: f64 },

    #[error("Unrecognized Location format: {0}")]
    UnrecognizedCoordinate(String),

    #[error("Coordinate out of range: ({lat}, {lon})")]
    CoordinateOutOfRange { lat: f64, lon: f64 },
}

/// レコード解決エラー（1ファイル単位で棄却）
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("{field} not found in {file}")]
    NotFound { field: Field, file: String },

    #[error("{field} extraction failed for {file}: {source}")]
    Invalid {
        field: Field,
        file: String,
        #[source]
        source: ExtractError,
    },
}

impl Error {
    /// 失敗の原因となったフィールド
    pub fn field(&self) -> Field {
        match self {
            Error::NotFound { field, .. } | Error::Invalid { field, .. } => *field,
        }
    }
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
