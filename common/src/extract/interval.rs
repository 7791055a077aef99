//! 深度区間の抽出
//!
//! ファイル名を優先し、シートはフォールバック。
//! `start >= end` の一致は不正値として扱う。

use crate::error::ExtractError;
use crate::sheet::{Cell, SheetGrid};
use crate::types::{Depth, DepthInterval};
use regex::Regex;

type IntervalResult = Result<Option<DepthInterval>, ExtractError>;

lazy_static::lazy_static! {
    // 5_10, 5-10, 5 - 10 ft
    static ref DASHED_RE: Regex = Regex::new(
        r#"(?i)\b(\d+(?:\.\d+)?)\s*[_-]\s*(\d+(?:\.\d+)?)\s*(?:ft|feet|'|")?\b"#
    ).unwrap();
    // 15 to 20
    static ref TO_RE: Regex = Regex::new(
        r#"(?i)\b(\d+(?:\.\d+)?)\s*to\s*(\d+(?:\.\d+)?)\s*(?:ft|feet|'|")?\b"#
    ).unwrap();
    // セル内の "12-14" / "12 to 14"
    static ref INLINE_RE: Regex = Regex::new(
        r"(?i)(\d+(?:\.\d+)?)\s*(?:-|to)\s*(\d+(?:\.\d+)?)"
    ).unwrap();
}

/// 区間を正規化（start < end を検証）
pub fn normalize_interval(start: f64, end: f64) -> Result<DepthInterval, ExtractError> {
    if start >= end {
        return Err(ExtractError::InvalidInterval { start, end });
    }
    Ok(DepthInterval {
        start: Depth::normalize(start),
        end: Depth::normalize(end),
    })
}

/// ダッシュ・引用符の表記揺れを統一
fn normalize_dashes(text: &str) -> String {
    text.replace(['\u{2018}', '\u{2019}'], "'")
        .replace(['\u{2013}', '\u{2014}'], "-")
}

/// パターンの全一致を順に試し、最初の正しい区間を返す（シート用）
fn first_valid_match(re: &Regex, text: &str) -> Option<DepthInterval> {
    re.captures_iter(text).find_map(|cap| {
        let start = cap[1].parse::<f64>().ok()?;
        let end = cap[2].parse::<f64>().ok()?;
        normalize_interval(start, end).ok()
    })
}

/// パターンの最初の一致のみを見る。不正ならエラー
fn first_match(re: &Regex, text: &str) -> IntervalResult {
    let Some(cap) = re.captures(text) else {
        return Ok(None);
    };
    let (Ok(start), Ok(end)) = (cap[1].parse::<f64>(), cap[2].parse::<f64>()) else {
        return Ok(None);
    };
    normalize_interval(start, end).map(Some)
}

/// ファイル名から深度区間を取り出す
///
/// パターンごとに最初の一致だけを採用する。最初の一致が `start >= end` なら
/// 後続の数値の組（改訂番号・年など）には進まずエラーにする。
///
/// # Examples
/// ```
/// use borehole_fm_common::extract::interval_from_filename;
///
/// let interval = interval_from_filename("QC Gradation Report T3 5_10.xlsx").unwrap().unwrap();
/// assert_eq!(interval.to_string(), "5-10");
/// ```
pub fn interval_from_filename(file_name: &str) -> IntervalResult {
    let text = normalize_dashes(file_name);

    for re in [&*DASHED_RE, &*TO_RE] {
        if let Some(interval) = first_match(re, &text)? {
            return Ok(Some(interval));
        }
    }
    Ok(None)
}

/// 見出し行から検出した列位置
#[derive(Debug, Default)]
struct DepthColumns {
    depth: Option<usize>,
    start: Option<usize>,
    end: Option<usize>,
    spec_range: Option<usize>,
}

impl DepthColumns {
    fn detect(&mut self, row: &[Cell]) {
        for (idx, cell) in row.iter().enumerate() {
            let Some(text) = cell.as_text() else { continue };
            let lower = text.trim().to_lowercase();
            if self.depth.is_none() && lower == "depth" {
                self.depth = Some(idx);
            }
            if self.start.is_none() && lower.contains("start") && lower.contains("depth") {
                self.start = Some(idx);
            }
            if self.end.is_none() && lower.contains("end") && lower.contains("depth") {
                self.end = Some(idx);
            }
            if self.spec_range.is_none() && lower.contains("spec") && lower.contains("range") {
                self.spec_range = Some(idx);
            }
        }
    }
}

/// シートから深度区間を取り出す（ファイル名に無い場合の補助）
///
/// 行ごとに次の順で調べる:
/// 1. 仕様範囲列以外の文字列セルにある `12-14` / `12 to 14`
/// 2. 開始深度・終了深度列の組
/// 3. `Depth` 列の文字列
///
/// シート側の不正な一致は読み飛ばす。
pub fn interval_from_sheet(sheet: &SheetGrid) -> Option<DepthInterval> {
    let mut columns = DepthColumns::default();

    for row in sheet.rows() {
        if row.iter().all(Cell::is_blank) {
            continue;
        }

        columns.detect(row);

        for (idx, cell) in row.iter().enumerate() {
            if columns.spec_range == Some(idx) {
                continue;
            }
            if let Some(text) = cell.as_text() {
                if let Some(interval) = first_valid_match(&INLINE_RE, text) {
                    return Some(interval);
                }
            }
        }

        if let (Some(start_col), Some(end_col)) = (columns.start, columns.end) {
            let start = row.get(start_col).and_then(Cell::coerce_numeric);
            let end = row.get(end_col).and_then(Cell::coerce_numeric);
            if let (Some(start), Some(end)) = (start, end) {
                if let Ok(interval) = normalize_interval(start, end) {
                    return Some(interval);
                }
            }
        }

        if let Some(text) = columns.depth.and_then(|c| row.get(c)).and_then(Cell::as_text) {
            if let Some(interval) = first_valid_match(&INLINE_RE, text) {
                return Some(interval);
            }
        }
    }

    None
}
