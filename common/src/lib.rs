//! Borehole FM Common Library
//!
//! 粒度試験レポートからの抽出・孔ごとの集計・KML生成。
//! ファイルシステムやネットワークには触れない純粋な処理のみ。

pub mod types;
pub mod error;
pub mod sheet;
pub mod extract;
pub mod resolver;
pub mod aggregator;
pub mod placemark;

pub use types::{
    Coordinate, Depth, DepthInterval, ExcludedHole, HoleSummary, MineAreaResult, ParsedInterval,
    Provenance,
};
pub use error::{Error, ExtractError, Field, Result};
pub use sheet::{Cell, SheetGrid};
pub use extract::FinenessRange;
pub use resolver::{normalize_external_hole_id, resolve_record, ParseOptions};
pub use aggregator::{aggregate_mine_area, find_overlaps, haversine_meters, IntervalOverlap};
pub use placemark::{render_description, render_kml};
