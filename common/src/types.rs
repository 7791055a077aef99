//! 抽出・集計結果の型定義
//!
//! - Depth: 正規化済み深度（ft）
//! - Coordinate: 緯度経度（10進度）
//! - ParsedInterval: ワークブック1件から得たレコード
//! - HoleSummary / MineAreaResult: 孔ごと・鉱区ごとの集計結果

use serde::Serialize;
use std::cmp::Ordering;

/// 正規化済み深度
///
/// 整数との差が 1e-3 未満なら整数、それ以外は小数第3位で丸める。
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Depth {
    Whole(i64),
    Fraction(f64),
}

impl Depth {
    pub fn normalize(value: f64) -> Self {
        let nearest = value.round();
        if (value - nearest).abs() < 1e-3 {
            Depth::Whole(nearest as i64)
        } else {
            Depth::Fraction((value * 1000.0).round() / 1000.0)
        }
    }

    pub fn value(&self) -> f64 {
        match self {
            Depth::Whole(v) => *v as f64,
            Depth::Fraction(v) => *v,
        }
    }
}

impl PartialOrd for Depth {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.value().partial_cmp(&other.value())
    }
}

impl std::fmt::Display for Depth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Depth::Whole(v) => write!(f, "{}", v),
            Depth::Fraction(v) => write!(f, "{}", v),
        }
    }
}

/// 深度区間（start < end が保証される）
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DepthInterval {
    pub start: Depth,
    pub end: Depth,
}

impl std::fmt::Display for DepthInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// 緯度経度（南緯・西経は負）
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// ファイルの出所情報
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Provenance {
    pub file_id: String,
    pub link: String,
}

/// ワークブック1件から解決されたレコード
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedInterval {
    pub hole_id: String,
    pub start_depth: Depth,
    pub end_depth: Depth,
    pub latitude: f64,
    pub longitude: f64,
    pub fineness_value: f64,
    /// 整合性チェックの警告（発生順）
    pub warnings: Vec<String>,
    pub source_file_name: String,
    pub source_file_id: String,
    pub source_link: String,
}

impl ParsedInterval {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// 孔ごとの集計結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoleSummary {
    pub hole_id: String,
    /// 処理順
    pub intervals: Vec<ParsedInterval>,
    pub representative_latitude: f64,
    pub representative_longitude: f64,
    /// 代表点から最も遠い読み取りまでの距離（m）
    pub spread_meters: f64,
}

impl HoleSummary {
    /// 開始深度順（同値は処理順）
    pub fn sorted_intervals(&self) -> Vec<&ParsedInterval> {
        let mut sorted: Vec<&ParsedInterval> = self.intervals.iter().collect();
        sorted.sort_by(|a, b| {
            a.start_depth
                .partial_cmp(&b.start_depth)
                .unwrap_or(Ordering::Equal)
        });
        sorted
    }
}

/// 座標のばらつきが閾値を超えて出力から除外された孔
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExcludedHole {
    pub hole_id: String,
    pub interval_count: usize,
    pub spread_meters: f64,
    pub max_spread_meters: f64,
}

/// 鉱区1回分の集計結果（孔は初出順）
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MineAreaResult {
    pub mine_area: String,
    pub holes: Vec<HoleSummary>,
    pub excluded: Vec<ExcludedHole>,
}

impl MineAreaResult {
    pub fn hole(&self, hole_id: &str) -> Option<&HoleSummary> {
        self.holes.iter().find(|h| h.hole_id == hole_id)
    }

    pub fn interval_count(&self) -> usize {
        self.holes.iter().map(|h| h.intervals.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_normalize_whole() {
        assert_eq!(Depth::normalize(10.0002), Depth::Whole(10));
        assert_eq!(Depth::normalize(9.9995), Depth::Whole(10));
        assert_eq!(Depth::normalize(5.0), Depth::Whole(5));
    }

    #[test]
    fn test_depth_normalize_fraction() {
        assert_eq!(Depth::normalize(10.25), Depth::Fraction(10.25));
        assert_eq!(Depth::normalize(2.12345), Depth::Fraction(2.123));
    }

    #[test]
    fn test_depth_display() {
        assert_eq!(Depth::Whole(5).to_string(), "5");
        assert_eq!(Depth::Fraction(7.5).to_string(), "7.5");
        let interval = DepthInterval { start: Depth::Whole(5), end: Depth::Fraction(7.5) };
        assert_eq!(interval.to_string(), "5-7.5");
    }

    #[test]
    fn test_depth_serialize_untagged() {
        let json = serde_json::to_string(&vec![Depth::Whole(5), Depth::Fraction(7.5)]).unwrap();
        assert_eq!(json, "[5,7.5]");
    }

    #[test]
    fn test_sorted_intervals_by_start() {
        let make = |start: i64| ParsedInterval {
            hole_id: "T1".into(),
            start_depth: Depth::Whole(start),
            end_depth: Depth::Whole(start + 5),
            latitude: 0.0,
            longitude: 0.0,
            fineness_value: 2.5,
            warnings: vec![],
            source_file_name: format!("{}.xlsx", start),
            source_file_id: String::new(),
            source_link: String::new(),
        };
        let hole = HoleSummary {
            hole_id: "T1".into(),
            intervals: vec![make(10), make(0), make(5)],
            representative_latitude: 0.0,
            representative_longitude: 0.0,
            spread_meters: 0.0,
        };
        let starts: Vec<String> = hole
            .sorted_intervals()
            .iter()
            .map(|i| i.start_depth.to_string())
            .collect();
        assert_eq!(starts, vec!["0", "5", "10"]);
    }
}
