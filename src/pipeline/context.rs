//! 1回の実行に閉じた状態（集計カウンタ・起動理由・成果物）

use super::trigger::Trigger;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Instant;

/// 実行ごとの集計
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunMetrics {
    pub files_processed: u64,
    pub holes_updated: u64,
    pub intervals_added: u64,
    pub errors_count: u64,
    pub warnings_count: u64,
    pub holes_excluded: u64,
    pub runtime_seconds: f64,
}

/// 鉱区1件分の成果物
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MineAreaOutput {
    pub mine_area: String,
    pub kmz_path: PathBuf,
    pub public_url: String,
    pub audit_path: PathBuf,
    pub holes: usize,
    pub intervals: usize,
}

#[derive(Debug)]
pub struct RunContext {
    pub trigger: Trigger,
    pub started_at: DateTime<Utc>,
    started: Instant,
    pub metrics: RunMetrics,
    pub outputs: Vec<MineAreaOutput>,
}

impl RunContext {
    pub fn new(trigger: Trigger) -> Self {
        Self {
            trigger,
            started_at: Utc::now(),
            started: Instant::now(),
            metrics: RunMetrics::default(),
            outputs: Vec::new(),
        }
    }

    /// 経過秒数（小数第2位で丸め）を metrics に記録
    pub fn finish_timing(&mut self) {
        let elapsed = self.started.elapsed().as_secs_f64();
        self.metrics.runtime_seconds = (elapsed * 100.0).round() / 100.0;
    }
}

/// 実行結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    /// 0: 成功、1: 失敗
    pub exit_code: i32,
    pub message: String,
    pub metrics: RunMetrics,
    pub outputs: Vec<MineAreaOutput>,
}

impl RunReport {
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }
}

/// 区間が1件でも得られれば成功（ファイル単位のエラーがあっても）
pub fn outcome(metrics: &RunMetrics) -> (i32, &'static str) {
    match (metrics.intervals_added > 0, metrics.errors_count > 0) {
        (true, false) => (0, "Pipeline run completed successfully"),
        (true, true) => (0, "Pipeline completed with some errors"),
        (false, _) => (1, "Pipeline completed with no intervals processed"),
    }
}
