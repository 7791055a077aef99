//! 粗粒率（Fineness Modulus, FM）の抽出
//!
//! 1. "Fineness Modulus" / "FM" ラベルの右8セル以内の数値
//! 2. ラベルが無い場合のみ、ふるい分け表の累積残留率から計算
//!    FM = Σ(累積残留率%) / 100

use crate::sheet::{Cell, SheetGrid};
use tracing::debug;

/// ラベル右側を探すセル数
const LABEL_LOOKAHEAD: usize = 8;

/// ふるい表とみなすのに必要なふるい目の数
const MIN_SIEVE_LABELS: usize = 4;

/// ふるい目見出し行の後に値行を探す行数
const SIEVE_VALUE_ROWS: usize = 4;

/// 標準ふるい目
const STANDARD_SIEVES: &[&str] = &[
    "3/8", "No.4", "No.8", "No.16", "No.30", "No.50", "No.100", "No.200",
];

/// FMとして妥当な範囲（設定値）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinenessRange {
    pub min: f64,
    pub max: f64,
}

impl FinenessRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

impl Default for FinenessRange {
    fn default() -> Self {
        Self { min: 0.5, max: 7.0 }
    }
}

fn is_fineness_label(text: &str) -> bool {
    let lower = text.trim().to_lowercase();
    lower.contains("fineness modulus") || lower == "fm"
}

/// ラベルの右側にある範囲内の数値（文字列中の数値は採らない）
pub fn fineness_from_label(sheet: &SheetGrid, range: FinenessRange) -> Option<f64> {
    for row in sheet.rows() {
        for (col, cell) in row.iter().enumerate() {
            let Some(text) = cell.as_text() else { continue };
            if !is_fineness_label(text) {
                continue;
            }

            let found = row
                .iter()
                .skip(col + 1)
                .take(LABEL_LOOKAHEAD)
                .filter_map(Cell::as_number)
                .find(|v| range.contains(*v));
            if let Some(value) = found {
                debug!(value, sheet = sheet.name(), "FM found from label");
                return Some(value);
            }
        }
    }
    None
}

/// ふるい目表記の正規化: 小文字化し、空白・ピリオド・インチ記号を除去、`#4` → `no4`
fn normalize_sieve_label(text: &str) -> String {
    let compact: String = text
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '.' | '"' | '\u{2033}'))
        .collect();
    match compact.strip_prefix('#') {
        Some(rest) => format!("no{}", rest),
        None => compact,
    }
}

/// セルが指定のふるい目か（"No.4" は "No.40" に一致しない）
fn matches_sieve(cell_label: &str, sieve: &str) -> bool {
    let sieve = normalize_sieve_label(sieve);
    cell_label
        .strip_prefix(sieve.as_str())
        .map(|rest| !rest.starts_with(|c: char| c.is_ascii_digit()))
        .unwrap_or(false)
}

/// 行内で見つかったふるい目の数
fn count_sieve_labels(row: &[Cell]) -> usize {
    let labels: Vec<String> = row
        .iter()
        .filter_map(Cell::as_text)
        .map(normalize_sieve_label)
        .collect();

    STANDARD_SIEVES
        .iter()
        .filter(|sieve| labels.iter().any(|label| matches_sieve(label, sieve)))
        .count()
}

/// ふるい分け表から FM を計算（小数第2位で丸め）
pub fn fineness_from_sieve_table(sheet: &SheetGrid) -> Option<f64> {
    for (idx, row) in sheet.rows().enumerate() {
        let sieve_count = count_sieve_labels(row);
        if sieve_count < MIN_SIEVE_LABELS {
            continue;
        }

        let value_rows = (idx + 1)..(idx + 1 + SIEVE_VALUE_ROWS).min(sheet.row_count());
        for next in value_rows {
            let values: Vec<f64> = sheet
                .row(next)
                .iter()
                .filter_map(Cell::coerce_numeric)
                .filter(|v| (0.0..=100.0).contains(v))
                .collect();

            if values.len() >= sieve_count {
                let total: f64 = values.iter().take(sieve_count).sum();
                let fm = (total / 100.0 * 100.0).round() / 100.0;
                debug!(fm, sieves = sieve_count, sheet = sheet.name(), "FM computed from sieve table");
                return Some(fm);
            }
        }
    }
    None
}

/// FMを取り出す（ラベル優先、無ければふるい表）
pub fn extract_fineness(sheet: &SheetGrid, range: FinenessRange) -> Option<f64> {
    fineness_from_label(sheet, range).or_else(|| {
        debug!(sheet = sheet.name(), "FM label not found, trying sieve table");
        fineness_from_sieve_table(sheet)
    })
}
