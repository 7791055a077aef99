//! 位置（緯度経度）の抽出
//!
//! 対応する表記:
//! - 10進: `32.483210, -96.361122`
//! - 10進＋方位: `32.483210 N, 96.361122 W`
//! - 度分秒: `32°28'59.6" N, 96°21'40.0" W`

use crate::error::ExtractError;
use crate::sheet::SheetGrid;
use crate::types::Coordinate;
use regex::Regex;

/// ラベル右側を探すセル数
const LABEL_LOOKAHEAD: usize = 5;

/// 位置が書かれがちなセル
const CONVENTIONAL_CELLS: &[&str] = &["B1", "A2", "B2", "C1"];

lazy_static::lazy_static! {
    static ref DECIMAL_PAIR_RE: Regex =
        Regex::new(r"([-+]?\d+(?:\.\d+)?)\s*,\s*([-+]?\d+(?:\.\d+)?)").unwrap();
    static ref DMS_RE: Regex = Regex::new(
        r#"(?i)(\d+)[°º\s]+(\d+)['′\s]+([\d.]+)["″]?\s*([NS])\s*,?\s*(\d+)[°º\s]+(\d+)['′\s]+([\d.]+)["″]?\s*([EW])"#
    ).unwrap();
    static ref DECIMAL_TOKEN_RE: Regex = Regex::new(r"[-+]?\d+(?:\.\d+)?").unwrap();
    // 単語の一部ではない単独の方位記号
    static ref NS_RE: Regex = Regex::new(r"(?i)(?:^|[^A-Za-z])([NS])(?:[^A-Za-z]|$)").unwrap();
    static ref EW_RE: Regex = Regex::new(r"(?i)(?:^|[^A-Za-z])([EW])(?:[^A-Za-z]|$)").unwrap();
    static ref LAB_LOCATION_RE: Regex = Regex::new(r"(?i)\blab\s+location\b").unwrap();
    static ref INLINE_LOCATION_RE: Regex = Regex::new(r"(?i)location[:\s]+(.+)").unwrap();
}

/// 方位記号で符号を補正（S → 緯度負、W → 経度負）
fn apply_hemisphere_hints(text: &str, lat: f64, lon: f64) -> (f64, f64) {
    let is = |re: &Regex, letter: &str| {
        re.captures(text)
            .map(|cap| cap[1].eq_ignore_ascii_case(letter))
            .unwrap_or(false)
    };

    let lat = if is(&*NS_RE, "S") { -lat.abs() } else { lat };
    let lon = if is(&*EW_RE, "W") { -lon.abs() } else { lon };
    (lat, lon)
}

fn checked(lat: f64, lon: f64) -> Result<Coordinate, ExtractError> {
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(ExtractError::CoordinateOutOfRange { lat, lon });
    }
    Ok(Coordinate::new(lat, lon))
}

fn parse_decimal_pair(text: &str) -> Option<(f64, f64)> {
    let cap = DECIMAL_PAIR_RE.captures(text)?;
    let lat = cap[1].parse::<f64>().ok()?;
    let lon = cap[2].parse::<f64>().ok()?;
    Some(apply_hemisphere_hints(text, lat, lon))
}

fn parse_dms(text: &str) -> Option<(f64, f64)> {
    let cap = DMS_RE.captures(text)?;

    let part = |d: usize, m: usize, s: usize| -> Option<f64> {
        let degrees: f64 = cap[d].parse().ok()?;
        let minutes: f64 = cap[m].parse().ok()?;
        let seconds: f64 = cap[s].parse().ok()?;
        Some(degrees + minutes / 60.0 + seconds / 3600.0)
    };

    let lat_sign = if cap[4].eq_ignore_ascii_case("N") { 1.0 } else { -1.0 };
    let lon_sign = if cap[8].eq_ignore_ascii_case("E") { 1.0 } else { -1.0 };
    Some((lat_sign * part(1, 2, 3)?, lon_sign * part(5, 6, 7)?))
}

/// 区切りが崩れた表記の最終手段: 先頭2つの数値＋方位記号
fn parse_loose_tokens(text: &str) -> Option<(f64, f64)> {
    let mut tokens = DECIMAL_TOKEN_RE
        .find_iter(text)
        .filter_map(|m| m.as_str().parse::<f64>().ok());
    let lat = tokens.next()?;
    let lon = tokens.next()?;
    Some(apply_hemisphere_hints(text, lat, lon))
}

/// 位置文字列を解析
///
/// # Errors
/// どの表記にも一致しなければ `UnrecognizedCoordinate`、
/// 緯度経度の範囲外なら `CoordinateOutOfRange`
pub fn parse_coordinate(raw: &str) -> Result<Coordinate, ExtractError> {
    let text = raw.trim();
    let (lat, lon) = parse_decimal_pair(text)
        .or_else(|| parse_dms(text))
        .or_else(|| parse_loose_tokens(text))
        .ok_or_else(|| ExtractError::UnrecognizedCoordinate(raw.to_string()))?;
    checked(lat, lon)
}

/// 明示的な表記（10進ペア・度分秒）のみ受け付ける
///
/// シート全体を総当たりする時に、ふるい目 "No.4 No.8" のような数値の並びを拾わないため。
fn parse_coordinate_strict(raw: &str) -> Result<Coordinate, ExtractError> {
    let text = raw.trim();
    let (lat, lon) = parse_decimal_pair(text)
        .or_else(|| parse_dms(text))
        .ok_or_else(|| ExtractError::UnrecognizedCoordinate(raw.to_string()))?;
    checked(lat, lon)
}

fn is_location_label(text: &str) -> bool {
    text.to_lowercase().contains("location") && !LAB_LOCATION_RE.is_match(text)
}

/// "Location" ラベルの右側、またはラベルセル内の値
fn from_location_label(sheet: &SheetGrid) -> Option<Coordinate> {
    for (row, col, text) in sheet.text_cells() {
        if !is_location_label(text) {
            continue;
        }

        // 結合セルや空白列を挟むレイアウトがあるため数セル先まで見る
        let found = (1..=LABEL_LOOKAHEAD)
            .filter_map(|offset| sheet.get(row, col + offset))
            .filter(|cell| !cell.is_blank())
            .find_map(|cell| parse_coordinate(&cell.to_string()).ok());
        if found.is_some() {
            return found;
        }

        if let Some(cap) = INLINE_LOCATION_RE.captures(text) {
            if let Ok(coordinate) = parse_coordinate(cap[1].trim()) {
                return Some(coordinate);
            }
        }
    }
    None
}

fn from_conventional_cells(sheet: &SheetGrid) -> Option<Coordinate> {
    CONVENTIONAL_CELLS
        .iter()
        .filter_map(|reference| sheet.cell_ref(reference))
        .filter(|cell| !cell.is_blank())
        .find_map(|cell| parse_coordinate(&cell.to_string()).ok())
}

fn from_any_text_cell(sheet: &SheetGrid) -> Option<Coordinate> {
    sheet
        .text_cells()
        .find_map(|(_, _, text)| parse_coordinate_strict(text).ok())
}

/// シートから位置を取り出す
///
/// 探索順: Locationラベル → 定位置セル (B1, A2, B2, C1) → 全文字列セル
pub fn extract_location(sheet: &SheetGrid) -> Option<Coordinate> {
    from_location_label(sheet)
        .or_else(|| from_conventional_cells(sheet))
        .or_else(|| from_any_text_cell(sheet))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::Cell;

    fn assert_close(actual: Coordinate, lat: f64, lon: f64, tol: f64) {
        assert!((actual.latitude - lat).abs() < tol, "lat {} != {}", actual.latitude, lat);
        assert!((actual.longitude - lon).abs() < tol, "lon {} != {}", actual.longitude, lon);
    }

    #[test]
    fn test_decimal_format() {
        let c = parse_coordinate("32.483210, -96.361122").unwrap();
        assert_eq!(c, Coordinate::new(32.483210, -96.361122));
    }

    #[test]
    fn test_decimal_with_hemispheres() {
        let c = parse_coordinate("32.483210 N, 96.361122 W").unwrap();
        assert_eq!(c, Coordinate::new(32.483210, -96.361122));

        let c = parse_coordinate("33.9 S, 151.2 E").unwrap();
        assert_eq!(c, Coordinate::new(-33.9, 151.2));
    }

    #[test]
    fn test_dms_format() {
        let c = parse_coordinate("32°28'59.6\" N, 96°21'40.0\" W").unwrap();
        assert_close(c, 32.483222, -96.361111, 0.01);
        assert_close(c, 32.483210, -96.361122, 0.01);
    }

    #[test]
    fn test_invalid_format() {
        let err = parse_coordinate("Invalid location").unwrap_err();
        assert_eq!(err, ExtractError::UnrecognizedCoordinate("Invalid location".into()));
    }

    #[test]
    fn test_out_of_range() {
        assert!(matches!(
            parse_coordinate("132.5, -96.1"),
            Err(ExtractError::CoordinateOutOfRange { .. })
        ));
    }

    #[test]
    fn test_words_do_not_flip_sign() {
        // "GPS" の S で南緯にしない
        let c = parse_coordinate("GPS 32.48, -96.36").unwrap();
        assert_eq!(c, Coordinate::new(32.48, -96.36));
    }

    #[test]
    fn test_location_label_with_gap() {
        let sheet = SheetGrid::new(
            "Sheet1",
            vec![
                vec![Cell::from("Lab Location"), Cell::from("Dallas, 75201")],
                vec![
                    Cell::from("Location"),
                    Cell::Empty,
                    Cell::from("n/a"),
                    Cell::from("32.48321, -96.36112"),
                ],
            ],
        );
        assert_close(extract_location(&sheet).unwrap(), 32.48321, -96.36112, 1e-9);
    }

    #[test]
    fn test_location_inline_after_label() {
        let sheet = SheetGrid::new(
            "Sheet1",
            vec![vec![Cell::from("Location: 32.5 N, 96.25 W")]],
        );
        assert_eq!(extract_location(&sheet), Some(Coordinate::new(32.5, -96.25)));
    }

    #[test]
    fn test_conventional_cell() {
        let sheet = SheetGrid::new(
            "Sheet1",
            vec![vec![Cell::from("Site"), Cell::from("31.1, -97.2")]],
        );
        assert_eq!(extract_location(&sheet), Some(Coordinate::new(31.1, -97.2)));
    }

    #[test]
    fn test_last_resort_scan_is_strict() {
        let sheet = SheetGrid::new(
            "Sheet1",
            vec![
                vec![],
                vec![],
                vec![Cell::from("No.4 No.8"), Cell::from("Sieve 3/8")],
                vec![Cell::from("Coordinates 30.25,-95.5")],
            ],
        );
        assert_eq!(extract_location(&sheet), Some(Coordinate::new(30.25, -95.5)));
    }

    #[test]
    fn test_location_missing() {
        let sheet = SheetGrid::new("Sheet1", vec![vec![Cell::from("Sieve"), Cell::from(4.0)]]);
        assert_eq!(extract_location(&sheet), None);
    }
}
