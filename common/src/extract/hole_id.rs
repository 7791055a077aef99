//! 孔IDの抽出
//!
//! 照合順:
//! 1. `T3` / `T-3` / `T 3` → `T3`
//! 2. `Bore Hole 5` → `5`

use crate::sheet::SheetGrid;
use regex::Regex;

type HoleMatcher = fn(&str) -> Option<String>;

const HOLE_MATCHERS: &[HoleMatcher] = &[match_t_prefix, match_bore_hole];

fn match_t_prefix(text: &str) -> Option<String> {
    lazy_static::lazy_static! {
        // トークンは数字始まりに限定（"Test" "Total" "to" を拾わない）
        static ref T_RE: Regex = Regex::new(r"(?i)\bT[-_ ]?(\d[A-Za-z0-9]*)\b").unwrap();
    }

    T_RE
        .captures(text)
        .map(|cap| format!("T{}", cap[1].to_uppercase()))
}

fn match_bore_hole(text: &str) -> Option<String> {
    lazy_static::lazy_static! {
        static ref BORE_HOLE_RE: Regex =
            Regex::new(r"(?i)\bBore[-_ ]?Hole[-_ ]?([A-Za-z0-9]+)\b").unwrap();
    }

    BORE_HOLE_RE.captures(text).map(|cap| cap[1].to_uppercase())
}

/// ファイル名・フォルダ名などのテキストから孔IDを取り出す
pub fn hole_id_from_text(text: &str) -> Option<String> {
    HOLE_MATCHERS.iter().find_map(|matcher| matcher(text))
}

/// シート内の文字列セルを行優先で走査し、最初に見つかった孔ID
pub fn hole_id_from_sheet(sheet: &SheetGrid) -> Option<String> {
    sheet
        .text_cells()
        .find_map(|(_, _, value)| hole_id_from_text(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::Cell;

    #[test]
    fn test_simple_hole_id() {
        assert_eq!(
            hole_id_from_text("QC Gradation Report T3 5_10.xlsx"),
            Some("T3".to_string())
        );
    }

    #[test]
    fn test_dash_and_space_separated() {
        assert_eq!(hole_id_from_text("Report T-3 10_15.xlsx"), Some("T3".to_string()));
        assert_eq!(hole_id_from_text("Report T 3 15_20.xlsx"), Some("T3".to_string()));
        assert_eq!(hole_id_from_text("report t12b 0_5.xlsx"), Some("T12B".to_string()));
    }

    #[test]
    fn test_bore_hole_format() {
        assert_eq!(hole_id_from_text("Bore Hole 5 20_25.xlsx"), Some("5".to_string()));
        assert_eq!(hole_id_from_text("BoreHole-a7"), Some("A7".to_string()));
    }

    #[test]
    fn test_no_hole_id() {
        assert_eq!(hole_id_from_text("Report 5_10.xlsx"), None);
        assert_eq!(hole_id_from_text("Test Total 15 to 20"), None);
    }

    #[test]
    fn test_t_prefix_wins_over_bore_hole() {
        assert_eq!(hole_id_from_text("Bore Hole 9 / T4"), Some("T4".to_string()));
    }

    #[test]
    fn test_hole_id_from_sheet() {
        let sheet = SheetGrid::new(
            "Sheet1",
            vec![
                vec![Cell::from("Gradation Report"), Cell::from(3.0)],
                vec![Cell::from("Sample ID:"), Cell::from("Bore Hole 12")],
                vec![Cell::from("T7")],
            ],
        );
        assert_eq!(hole_id_from_sheet(&sheet), Some("12".to_string()));
    }

    #[test]
    fn test_hole_id_from_sheet_missing() {
        let sheet = SheetGrid::new("Sheet1", vec![vec![Cell::from("Sieve"), Cell::from(4.0)]]);
        assert_eq!(hole_id_from_sheet(&sheet), None);
    }
}
