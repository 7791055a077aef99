//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use borehole_fm::error::PipelineError;
use borehole_fm::store::{FileStore, LocalFileStore, MineArea};
use borehole_fm_common::{ExtractError, Field};
use tempfile::tempdir;

/// 存在しない鉱区フォルダを走査した場合
#[test]
fn test_walk_nonexistent_mine_area() {
    let store = LocalFileStore::new("/nonexistent/path/12345");
    let area = MineArea {
        name: "North".to_string(),
        folder_id: "North".to_string(),
    };

    let err = store.walk_mine_area(&area).unwrap_err();
    assert!(matches!(err, PipelineError::FolderNotFound(_)));
}

/// 孔フォルダが空の鉱区
#[test]
fn test_walk_empty_mine_area() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::create_dir_all(dir.path().join("North").join("T1")).unwrap();
    let store = LocalFileStore::new(dir.path());
    let area = MineArea {
        name: "North".to_string(),
        folder_id: "North".to_string(),
    };

    // 空の孔フォルダはエラーではなく読み飛ばす
    let holes = store.walk_mine_area(&area).unwrap();
    assert!(holes.is_empty());
}

/// ワークブック以外のファイルしかない孔フォルダ
#[test]
fn test_walk_hole_without_workbooks() {
    let dir = tempdir().expect("Failed to create temp dir");
    let hole = dir.path().join("North").join("T1");
    std::fs::create_dir_all(&hole).unwrap();
    std::fs::write(hole.join("notes.txt"), "hello").unwrap();
    std::fs::write(hole.join("~$Report T1 0_5.xlsx"), "lock").unwrap();

    let store = LocalFileStore::new(dir.path());
    let area = MineArea {
        name: "North".to_string(),
        folder_id: "North".to_string(),
    };
    assert!(store.walk_mine_area(&area).unwrap().is_empty());
}

/// PipelineErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        PipelineError::Config("テスト設定エラー".to_string()),
        PipelineError::FileNotFound("report.xlsx".to_string()),
        PipelineError::FolderNotFound("/path/to/folder".to_string()),
        PipelineError::WorkbookEmpty("empty.xlsx".to_string()),
        PipelineError::Publish("公開エラー".to_string()),
        PipelineError::NoMineAreas,
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}

/// IOエラーからの変換
#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: PipelineError = io_err.into();

    assert!(matches!(err, PipelineError::Io(_)));
    let display = format!("{}", err);
    assert!(display.contains("IO"));
}

/// JSONエラーからの変換
#[test]
fn test_json_error_conversion() {
    let json_err = serde_json::from_str::<serde_json::Value>("{ invalid }").unwrap_err();
    let err: PipelineError = json_err.into();

    assert!(matches!(err, PipelineError::JsonParse(_)));
}

/// common::Errorは透過的に表示される
#[test]
fn test_common_error_transparent() {
    let common_err = borehole_fm_common::Error::Invalid {
        field: Field::Interval,
        file: "Report T3 10_5.xlsx".to_string(),
        source: ExtractError::InvalidInterval { start: 10.0, end: 5.0 },
    };
    let err: PipelineError = common_err.into();

    assert!(matches!(err, PipelineError::Common(_)));
    let display = format!("{}", err);
    assert!(display.contains("Interval extraction failed for Report T3 10_5.xlsx"), "{}", display);
}
