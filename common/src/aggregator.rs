//! 孔ごとの集計
//!
//! レコードを孔IDでまとめ、代表座標（軸ごとの中央値）とばらつきを求める。
//! ばらつきが閾値を超えた孔はその回の出力から除外する。

use crate::types::{Coordinate, ExcludedHole, HoleSummary, MineAreaResult, ParsedInterval};
use std::cmp::Ordering;
use tracing::{info, warn};

/// 地球半径（m）
const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// 2点間の大円距離（m）
pub fn haversine_meters(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * h.sqrt().asin()
}

fn upper_median(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    Some(values[values.len() / 2])
}

/// 緯度・経度それぞれの中央値（偶数個なら上側）
pub fn median_coordinate(points: &[Coordinate]) -> Option<Coordinate> {
    let latitude = upper_median(points.iter().map(|p| p.latitude).collect())?;
    let longitude = upper_median(points.iter().map(|p| p.longitude).collect())?;
    Some(Coordinate::new(latitude, longitude))
}

/// 代表点から最も遠い点までの距離（m）
pub fn coordinate_spread(center: Coordinate, points: &[Coordinate]) -> f64 {
    points
        .iter()
        .map(|p| haversine_meters(center, *p))
        .fold(0.0, f64::max)
}

/// 1孔分のレコードを集計。ばらつきが閾値超なら `Err(ExcludedHole)`
pub fn summarize_hole(
    hole_id: &str,
    intervals: Vec<ParsedInterval>,
    max_spread_meters: f64,
) -> Result<HoleSummary, ExcludedHole> {
    let points: Vec<Coordinate> = intervals.iter().map(ParsedInterval::coordinate).collect();

    let Some(center) = median_coordinate(&points) else {
        return Err(ExcludedHole {
            hole_id: hole_id.to_string(),
            interval_count: 0,
            spread_meters: 0.0,
            max_spread_meters,
        });
    };
    let spread = coordinate_spread(center, &points);

    if spread > max_spread_meters {
        return Err(ExcludedHole {
            hole_id: hole_id.to_string(),
            interval_count: intervals.len(),
            spread_meters: spread,
            max_spread_meters,
        });
    }

    Ok(HoleSummary {
        hole_id: hole_id.to_string(),
        intervals,
        representative_latitude: center.latitude,
        representative_longitude: center.longitude,
        spread_meters: spread,
    })
}

/// 深度が重なる区間の組
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalOverlap {
    pub hole_id: String,
    pub first_file: String,
    pub second_file: String,
    pub first_end: f64,
    pub second_start: f64,
}

/// 開始深度順に並べて隣り合う区間の重なりを検出
pub fn find_overlaps(hole: &HoleSummary) -> Vec<IntervalOverlap> {
    hole.sorted_intervals()
        .windows(2)
        .filter(|pair| pair[0].end_depth.value() > pair[1].start_depth.value())
        .map(|pair| IntervalOverlap {
            hole_id: hole.hole_id.clone(),
            first_file: pair[0].source_file_name.clone(),
            second_file: pair[1].source_file_name.clone(),
            first_end: pair[0].end_depth.value(),
            second_start: pair[1].start_depth.value(),
        })
        .collect()
}

/// 鉱区1回分のレコードを孔ごとに集計
///
/// 孔の並びはレコードの初出順。除外・重なりは警告ログのみで処理は続ける。
pub fn aggregate_mine_area(
    mine_area: &str,
    intervals: Vec<ParsedInterval>,
    max_spread_meters: f64,
) -> MineAreaResult {
    let mut groups: Vec<(String, Vec<ParsedInterval>)> = Vec::new();
    for interval in intervals {
        match groups.iter_mut().find(|(id, _)| *id == interval.hole_id) {
            Some((_, members)) => members.push(interval),
            None => groups.push((interval.hole_id.clone(), vec![interval])),
        }
    }

    let mut result = MineAreaResult {
        mine_area: mine_area.to_string(),
        ..Default::default()
    };

    for (hole_id, members) in groups {
        match summarize_hole(&hole_id, members, max_spread_meters) {
            Ok(hole) => {
                for overlap in find_overlaps(&hole) {
                    warn!(
                        mine_area,
                        hole_id = %overlap.hole_id,
                        first = %overlap.first_file,
                        second = %overlap.second_file,
                        "Overlapping depth intervals: end {} > next start {}",
                        overlap.first_end,
                        overlap.second_start
                    );
                }
                result.holes.push(hole);
            }
            Err(excluded) => {
                warn!(
                    mine_area,
                    hole_id = %excluded.hole_id,
                    intervals = excluded.interval_count,
                    "Excluding hole: coordinate spread {:.1} m exceeds {:.1} m",
                    excluded.spread_meters,
                    excluded.max_spread_meters
                );
                result.excluded.push(excluded);
            }
        }
    }

    info!(
        mine_area,
        holes = result.holes.len(),
        excluded = result.excluded.len(),
        intervals = result.interval_count(),
        "Aggregated mine area"
    );
    result
}
