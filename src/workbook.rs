//! ワークブック読み込み（calamine）
//!
//! 先頭シートを `SheetGrid` に変換する。使用範囲が A1 から始まらないシートでも
//! セル番地が一致するよう、範囲の開始位置まで空セルで埋める。
//!
//! calamine にはアクティブシートを取得する API が無いため、保存時に別のタブが
//! アクティブでも常に先頭シートを読む。

use crate::error::{PipelineError, Result};
use borehole_fm_common::{Cell, SheetGrid};
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;

/// 対象とする拡張子
pub const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls"];

pub fn is_workbook(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    // Excel の一時ファイル
    if name.starts_with("~$") {
        return false;
    }
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| WORKBOOK_EXTENSIONS.iter().any(|w| w.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::Int(v) => Cell::Number(*v as f64),
        Data::Float(v) => Cell::Number(*v),
        Data::String(s) => Cell::Text(s.clone()),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

/// 先頭シートを読み込む
pub fn load_first_sheet(path: &Path) -> Result<SheetGrid> {
    if !path.exists() {
        return Err(PipelineError::FileNotFound(path.display().to_string()));
    }

    let mut workbook = open_workbook_auto(path)?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| PipelineError::WorkbookEmpty(path.display().to_string()))?;
    let range = workbook.worksheet_range(&sheet_name)?;

    let (row_offset, col_offset) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); row_offset];
    for data_row in range.rows() {
        let mut row = vec![Cell::Empty; col_offset];
        row.extend(data_row.iter().map(to_cell));
        rows.push(row);
    }

    tracing::debug!(
        file = %path.display(),
        sheet = %sheet_name,
        rows = rows.len(),
        "Loaded workbook"
    );
    Ok(SheetGrid::new(sheet_name, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_is_workbook() {
        assert!(is_workbook(Path::new("Report T3 5_10.xlsx")));
        assert!(is_workbook(Path::new("old.XLS")));
        assert!(!is_workbook(Path::new("~$Report T3 5_10.xlsx")));
        assert!(!is_workbook(Path::new("notes.txt")));
        assert!(!is_workbook(Path::new("xlsx")));
    }

    #[test]
    fn test_to_cell() {
        assert_eq!(to_cell(&Data::Int(3)), Cell::Number(3.0));
        assert_eq!(to_cell(&Data::String("FM".into())), Cell::from("FM"));
        assert_eq!(to_cell(&Data::Empty), Cell::Empty);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let err = load_first_sheet(&dir.path().join("missing.xlsx")).unwrap_err();
        assert!(matches!(err, PipelineError::FileNotFound(_)));
    }

    #[test]
    fn test_not_a_workbook() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"not a zip").unwrap();
        assert!(load_first_sheet(&path).is_err());
    }

    #[test]
    fn test_reads_first_sheet_not_active() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Report T3 5_10.xlsx");

        let mut workbook = rust_xlsxwriter::Workbook::new();
        let first = workbook.add_worksheet();
        first.set_name("Gradation").unwrap();
        first.write_string(0, 0, "FM").unwrap();
        let second = workbook.add_worksheet();
        second.set_name("Notes").unwrap();
        second.write_string(0, 0, "memo").unwrap();
        second.set_active(true);
        workbook.save(&path).unwrap();

        let sheet = load_first_sheet(&path).unwrap();
        assert_eq!(sheet.name(), "Gradation");
        assert_eq!(sheet.cell_ref("A1"), Some(&Cell::from("FM")));
    }
}
