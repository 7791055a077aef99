//! レコード解決
//!
//! 1ワークブック分の抽出結果を1件の `ParsedInterval` にまとめる。
//!
//! ## 優先順位
//! - 孔ID: 外部指定（フォルダ名） → ファイル名 → シート
//! - 深度区間: ファイル名が正。シートと食い違えば警告してファイル名を採る
//!
//! 食い違いは警告として記録し、レコードは棄却しない。
//! 棄却するのは孔ID・区間・位置・FMのいずれかが取れない場合のみ。

use crate::error::{Error, Field, Result};
use crate::extract::{
    extract_fineness, extract_location, hole_id_from_sheet, hole_id_from_text,
    interval_from_filename, interval_from_sheet, FinenessRange,
};
use crate::sheet::SheetGrid;
use crate::types::{ParsedInterval, Provenance};

/// 解決時の設定値
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ParseOptions {
    pub fineness_range: FinenessRange,
}

/// フォルダ名を孔IDとして正規化（"Bore Hole 3" → "3"、照合できなければ大文字化）
pub fn normalize_external_hole_id(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(hole_id_from_text(trimmed).unwrap_or_else(|| trimmed.to_uppercase()))
}

/// 孔IDを決定し、食い違いを警告に積む
fn resolve_hole_id(
    file_name: &str,
    external: Option<&str>,
    from_title: Option<&str>,
    from_sheet: Option<&str>,
    warnings: &mut Vec<String>,
) -> Result<String> {
    let resolved = external
        .or(from_title)
        .or(from_sheet)
        .map(str::to_uppercase)
        .ok_or_else(|| Error::NotFound {
            field: Field::HoleId,
            file: file_name.to_string(),
        })?;

    if let Some(folder) = external {
        if let Some(title) = from_title.filter(|t| !t.eq_ignore_ascii_case(folder)) {
            warnings.push(format!(
                "Hole ID mismatch for {}: folder '{}' vs title '{}'",
                file_name, folder, title
            ));
        }
        if let Some(sheet) = from_sheet.filter(|s| !s.eq_ignore_ascii_case(folder)) {
            warnings.push(format!(
                "Hole ID mismatch for {}: folder '{}' vs sheet '{}'",
                file_name, folder, sheet
            ));
        }
    } else if let (Some(title), Some(sheet)) = (from_title, from_sheet) {
        if title != sheet {
            warnings.push(format!(
                "Hole ID conflict in {}: title '{}' vs sheet '{}'",
                file_name, title, sheet
            ));
        }
    }

    Ok(resolved)
}

/// 1ワークブックからレコードを解決する
///
/// # Arguments
/// * `file_name` - 元ファイル名（区間・孔IDの第一情報源）
/// * `sheet` - 読み込み済みのシート
/// * `external_hole_id` - フォルダ名などの外部指定
/// * `provenance` - ファイルIDと共有リンク
/// * `options` - FM妥当範囲など
pub fn resolve_record(
    file_name: &str,
    sheet: &SheetGrid,
    external_hole_id: Option<&str>,
    provenance: Provenance,
    options: &ParseOptions,
) -> Result<ParsedInterval> {
    let mut warnings = Vec::new();

    let external = external_hole_id.and_then(normalize_external_hole_id);
    let from_title = hole_id_from_text(file_name);
    let from_sheet = hole_id_from_sheet(sheet);
    let hole_id = resolve_hole_id(
        file_name,
        external.as_deref(),
        from_title.as_deref(),
        from_sheet.as_deref(),
        &mut warnings,
    )?;

    let interval = interval_from_filename(file_name)
        .map_err(|source| Error::Invalid {
            field: Field::Interval,
            file: file_name.to_string(),
            source,
        })?
        .ok_or_else(|| Error::NotFound {
            field: Field::Interval,
            file: file_name.to_string(),
        })?;

    if let Some(sheet_interval) = interval_from_sheet(sheet) {
        if sheet_interval != interval {
            warnings.push(format!(
                "Interval mismatch in {}: title {} vs sheet {}; ignoring sheet",
                file_name, interval, sheet_interval
            ));
        }
    }

    let coordinate = extract_location(sheet).ok_or_else(|| Error::NotFound {
        field: Field::Location,
        file: file_name.to_string(),
    })?;

    let range = options.fineness_range;
    let fineness_value = extract_fineness(sheet, range).ok_or_else(|| Error::NotFound {
        field: Field::Fineness,
        file: file_name.to_string(),
    })?;

    if !range.contains(fineness_value) {
        warnings.push(format!(
            "{}: FM {} outside range {}-{}",
            file_name, fineness_value, range.min, range.max
        ));
    }

    Ok(ParsedInterval {
        hole_id,
        start_depth: interval.start,
        end_depth: interval.end,
        latitude: coordinate.latitude,
        longitude: coordinate.longitude,
        fineness_value,
        warnings,
        source_file_name: file_name.to_string(),
        source_file_id: provenance.file_id,
        source_link: provenance.link,
    })
}
