//! 監査CSV
//!
//! 1回の実行で鉱区ごとに1ファイル。処理できた全レコードと警告を残す。

use crate::error::Result;
use borehole_fm_common::ParsedInterval;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// 監査CSVの1行
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditRecord {
    pub mine_area: String,
    pub hole_id: String,
    pub interval_start: String,
    pub interval_end: String,
    pub fm_value: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub source_file_id: String,
    pub source_link: String,
    pub parsed_timestamp: String,
    /// "; " 区切り
    pub warnings: String,
}

impl AuditRecord {
    pub fn new(mine_area: &str, interval: &ParsedInterval, parsed_at: DateTime<Utc>) -> Self {
        Self {
            mine_area: mine_area.to_string(),
            hole_id: interval.hole_id.clone(),
            interval_start: interval.start_depth.to_string(),
            interval_end: interval.end_depth.to_string(),
            fm_value: interval.fineness_value,
            latitude: interval.latitude,
            longitude: interval.longitude,
            source_file_id: interval.source_file_id.clone(),
            source_link: interval.source_link.clone(),
            parsed_timestamp: parsed_at.to_rfc3339(),
            warnings: interval.warnings.join("; "),
        }
    }
}

/// 監査CSVを書き出す（空でもヘッダ行は出力）
pub fn write_audit_csv(
    mine_area: &str,
    intervals: &[ParsedInterval],
    output: &Path,
) -> Result<PathBuf> {
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let parsed_at = Utc::now();
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(output)?;
    writer.write_record([
        "mine_area",
        "hole_id",
        "interval_start",
        "interval_end",
        "fm_value",
        "latitude",
        "longitude",
        "source_file_id",
        "source_link",
        "parsed_timestamp",
        "warnings",
    ])?;
    for interval in intervals {
        writer.serialize(AuditRecord::new(mine_area, interval, parsed_at))?;
    }
    writer.flush()?;

    tracing::info!(
        path = %output.display(),
        records = intervals.len(),
        "Generated audit CSV"
    );
    Ok(output.to_path_buf())
}

/// 保持期間を過ぎた `audit_*.csv` を削除し、削除件数を返す
pub fn cleanup_old_audit_files(audit_dir: &Path, retention_days: u32) -> usize {
    if !audit_dir.is_dir() {
        return 0;
    }

    let retention = Duration::from_secs(u64::from(retention_days) * 24 * 60 * 60);
    let Some(cutoff) = SystemTime::now().checked_sub(retention) else {
        return 0;
    };

    let Ok(entries) = std::fs::read_dir(audit_dir) else {
        return 0;
    };

    let mut deleted = 0;
    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().to_string();
        if !(name.starts_with("audit_") && name.ends_with(".csv")) || !path.is_file() {
            continue;
        }

        let modified = entry.metadata().and_then(|m| m.modified());
        match modified {
            Ok(modified) if modified < cutoff => match std::fs::remove_file(&path) {
                Ok(()) => {
                    tracing::debug!(file = %name, "Deleted old audit file");
                    deleted += 1;
                }
                Err(e) => tracing::warn!(file = %name, error = %e, "Error deleting audit file"),
            },
            Ok(_) => {}
            Err(e) => tracing::warn!(file = %name, error = %e, "Could not read audit file time"),
        }
    }

    if deleted > 0 {
        tracing::info!(deleted, dir = %audit_dir.display(), "Cleaned up old audit files");
    }
    deleted
}
