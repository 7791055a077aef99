//! Borehole FM Pipeline
//!
//! レポート保管先から粒度試験ワークブックを集め、孔ごとに集計して
//! 鉱区ごとの KMZ と監査CSVを出力・公開する。
//! 抽出・集計そのものは `borehole_fm_common` が担う。

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod pipeline;
pub mod publish;
pub mod store;
pub mod workbook;

pub use borehole_fm_common as common;
