//! ワークシートのセルグリッド
//!
//! 抽出器はこの型だけを見る。行・列は0始まりの絶対位置で、
//! `B1` のようなセル参照もそのまま引ける。

use regex::Regex;

/// セル値
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Cell {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
}

impl Cell {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// 数値セルのみ（NaNは除外）
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(v) if !v.is_nan() => Some(*v),
            _ => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// 数値セル、または文字列中の最初の数値
    pub fn coerce_numeric(&self) -> Option<f64> {
        lazy_static::lazy_static! {
            static ref NUMBER_RE: Regex = Regex::new(r"-?\d+(?:\.\d+)?").unwrap();
        }

        match self {
            Cell::Number(_) => self.as_number(),
            Cell::Text(s) => {
                let cleaned = s.trim().replace(',', "");
                NUMBER_RE
                    .find(&cleaned)
                    .and_then(|m| m.as_str().parse::<f64>().ok())
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Number(v) => write!(f, "{}", v),
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

/// 1シート分のセルグリッド
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetGrid {
    name: String,
    rows: Vec<Vec<Cell>>,
}

impl SheetGrid {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { name: name.into(), rows }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().map(|r| r.as_slice())
    }

    pub fn row(&self, index: usize) -> &[Cell] {
        self.rows.get(index).map(|r| r.as_slice()).unwrap_or(&[])
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// `B1` 形式のセル参照
    pub fn cell_ref(&self, reference: &str) -> Option<&Cell> {
        let (row, col) = parse_cell_ref(reference)?;
        self.get(row, col)
    }

    /// 文字列セルを (行, 列, 値) で走査
    pub fn text_cells(&self) -> impl Iterator<Item = (usize, usize, &str)> {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .filter_map(move |(c, cell)| cell.as_text().map(|s| (r, c, s)))
        })
    }
}

/// `B1` → (0, 1)
fn parse_cell_ref(reference: &str) -> Option<(usize, usize)> {
    let reference = reference.trim();
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    let col = letters
        .chars()
        .fold(0usize, |acc, c| acc * 26 + (c.to_ascii_uppercase() as usize - 'A' as usize + 1));
    let row: usize = digits.parse().ok()?;
    if row == 0 {
        return None;
    }
    Some((row - 1, col - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> SheetGrid {
        SheetGrid::new(
            "Sheet1",
            vec![
                vec![Cell::from("Project"), Cell::from("North Pit")],
                vec![Cell::Empty, Cell::from(12.5), Cell::from("1,234.5 g")],
            ],
        )
    }

    #[test]
    fn test_parse_cell_ref() {
        assert_eq!(parse_cell_ref("A1"), Some((0, 0)));
        assert_eq!(parse_cell_ref("B2"), Some((1, 1)));
        assert_eq!(parse_cell_ref("AA10"), Some((9, 26)));
        assert_eq!(parse_cell_ref("A0"), None);
        assert_eq!(parse_cell_ref("12"), None);
    }

    #[test]
    fn test_cell_ref_lookup() {
        let g = grid();
        assert_eq!(g.cell_ref("B1"), Some(&Cell::from("North Pit")));
        assert_eq!(g.cell_ref("Z9"), None);
    }

    #[test]
    fn test_coerce_numeric() {
        let g = grid();
        assert_eq!(g.get(1, 1).unwrap().coerce_numeric(), Some(12.5));
        assert_eq!(g.get(1, 2).unwrap().coerce_numeric(), Some(1234.5));
        assert_eq!(Cell::Number(f64::NAN).coerce_numeric(), None);
        assert_eq!(Cell::from("n/a").coerce_numeric(), None);
    }

    #[test]
    fn test_text_cells_skip_numbers() {
        let g = grid();
        let texts: Vec<&str> = g.text_cells().map(|(_, _, s)| s).collect();
        assert_eq!(texts, vec!["Project", "North Pit", "1,234.5 g"]);
    }
}
