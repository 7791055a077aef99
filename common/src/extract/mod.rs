//! フィールド抽出器
//!
//! 1ワークブックのセルグリッドとファイル名から、4つのフィールドを独立に取り出す。
//!
//! ## 戻り値の約束
//! - `None` / `Ok(None)`: 見つからない
//! - `Err(ExtractError)`: 見つかったが値が不正
//!
//! 各抽出器は優先順位付きの照合関数リストを先頭から試すだけで、状態を持たない。

pub mod fineness;
pub mod hole_id;
pub mod interval;
pub mod location;

pub use fineness::{fineness_from_label, fineness_from_sieve_table, extract_fineness, FinenessRange};
pub use hole_id::{hole_id_from_sheet, hole_id_from_text};
pub use interval::{interval_from_filename, interval_from_sheet};
pub use location::{extract_location, parse_coordinate};
