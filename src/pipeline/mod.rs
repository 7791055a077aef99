//! パイプライン本体
//!
//! 鉱区 → 孔フォルダ → ワークブック の順に逐次処理する。
//! 失敗はできるだけ狭い単位（ファイル → 鉱区 → 実行）で捕まえてカウンタに積み、
//! 実行の外には投げない。

pub mod context;
pub mod status;
pub mod trigger;

pub use context::{MineAreaOutput, RunContext, RunMetrics, RunReport};
pub use status::StatusFile;
pub use trigger::{Trigger, TriggerFile};

use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::export::{cleanup_old_audit_files, write_audit_csv, write_kmz};
use crate::publish::Publisher;
use crate::store::{FileDescriptor, FileStore, MineArea};
use crate::workbook;
use borehole_fm_common::{aggregate_mine_area, resolve_record, ParseOptions, ParsedInterval, Provenance};
use chrono::{SecondsFormat, Utc};
use serde_json::json;
use status::fields;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// 連続実行時にトリガーを確認する間隔の上限（秒）
const MAX_CHECK_INTERVAL_SECS: u64 = 10;

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub struct Pipeline<S, P> {
    config: Config,
    options: ParseOptions,
    store: S,
    publisher: P,
    status: StatusFile,
    trigger: TriggerFile,
}

impl<S: FileStore, P: Publisher> Pipeline<S, P> {
    pub fn new(config: Config, store: S, publisher: P) -> Self {
        let status = StatusFile::new(&config.status_path);
        let trigger = TriggerFile::new(&config.trigger_path);
        status.update_or_warn(fields(json!({
            "state": "idle",
            "message": "Pipeline initialized",
            "last_run_status": null,
        })));

        Self {
            options: config.parse_options(),
            config,
            store,
            publisher,
            status,
            trigger,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn status(&self) -> &StatusFile {
        &self.status
    }

    /// 設定の鉱区一覧、空なら親フォルダから自動検出
    fn resolve_mine_areas(&self) -> Result<Vec<MineArea>> {
        let areas = if !self.config.mine_areas.is_empty() {
            self.config
                .mine_areas
                .iter()
                .map(|area| MineArea {
                    name: area.name.clone(),
                    folder_id: area.folder_id(),
                })
                .collect()
        } else if let Some(parent) = &self.config.parent_folder {
            info!(parent = %parent.display(), "Auto-discovering mine areas");
            self.store.discover_mine_areas(&parent.to_string_lossy())?
        } else {
            Vec::new()
        };

        if areas.is_empty() {
            return Err(PipelineError::NoMineAreas);
        }
        Ok(areas)
    }

    /// 1ファイル: ダウンロード → 読み込み → 解決
    fn process_file(
        &self,
        hole_folder: &str,
        file: &FileDescriptor,
        download_dir: &Path,
    ) -> Result<ParsedInterval> {
        let local = self.store.download(file, download_dir)?;
        let link = self.store.file_link(file)?;
        let sheet = workbook::load_first_sheet(&local)?;

        let provenance = Provenance {
            file_id: file.id.clone(),
            link,
        };
        let record = resolve_record(&file.name, &sheet, Some(hole_folder), provenance, &self.options)?;
        Ok(record)
    }

    /// 鉱区内の全ファイルを処理し、解決できたレコードを返す
    fn collect_intervals(&self, area: &MineArea, ctx: &mut RunContext) -> Result<Vec<ParsedInterval>> {
        let hole_folders = self.store.walk_mine_area(area)?;

        // ダウンロード先は鉱区ごと。スコープを抜けると削除される
        let download_dir = tempfile::Builder::new().prefix("borehole-fm-").tempdir()?;

        let mut intervals = Vec::new();
        let mut seen_holes = HashSet::new();

        for hole in &hole_folders {
            for file in &hole.files {
                match self.process_file(&hole.name, file, download_dir.path()) {
                    Ok(record) => {
                        for warning in &record.warnings {
                            warn!(mine_area = %area.name, "{}", warning);
                        }
                        ctx.metrics.warnings_count += record.warnings.len() as u64;
                        ctx.metrics.files_processed += 1;
                        ctx.metrics.intervals_added += 1;
                        if seen_holes.insert(record.hole_id.clone()) {
                            ctx.metrics.holes_updated += 1;
                        }

                        info!(
                            file = %file.name,
                            hole = %record.hole_id,
                            interval = %format!("{}-{}", record.start_depth, record.end_depth),
                            fm = record.fineness_value,
                            "Processed"
                        );
                        intervals.push(record);
                    }
                    Err(e) => {
                        ctx.metrics.errors_count += 1;
                        error!(file = %file.name, error = %e, "Error processing file");
                    }
                }
            }
        }

        Ok(intervals)
    }

    /// 監査CSVを書き出して公開（公開失敗は警告のみ）
    fn write_audit(&self, area: &MineArea, intervals: &[ParsedInterval]) -> Result<std::path::PathBuf> {
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
        let audit_filename = self.config.audit_filename(&area.name, &timestamp);
        let audit_path = write_audit_csv(
            &area.name,
            intervals,
            &self.config.audit_dir.join(&audit_filename),
        )?;

        cleanup_old_audit_files(&self.config.audit_dir, self.config.audit_retention_days);

        if let Err(e) = self
            .publisher
            .publish(&audit_path, &format!("audits/{}", audit_filename))
        {
            warn!(error = %e, "Failed to upload audit CSV");
        }
        Ok(audit_path)
    }

    /// 鉱区1件を処理。データが1件も無ければ `Ok(None)`
    pub fn process_mine_area(
        &self,
        area: &MineArea,
        ctx: &mut RunContext,
    ) -> Result<Option<MineAreaOutput>> {
        info!(mine_area = %area.name, folder = %area.folder_id, "Processing mine area");

        let intervals = self.collect_intervals(area, ctx)?;
        if intervals.is_empty() {
            return Ok(None);
        }

        let audit_path = self.write_audit(area, &intervals)?;

        let result = aggregate_mine_area(
            &area.name,
            intervals,
            self.config.max_coordinate_spread_meters,
        );
        ctx.metrics.holes_excluded += result.excluded.len() as u64;

        let kmz_filename = self.config.kmz_filename(&area.name);
        let kmz_path = write_kmz(&result, &self.config.output_dir.join(&kmz_filename))?;
        let public_url = self.publisher.publish(&kmz_path, &kmz_filename)?;
        info!(mine_area = %area.name, url = %public_url, "Published KMZ");

        Ok(Some(MineAreaOutput {
            mine_area: area.name.clone(),
            kmz_path,
            public_url,
            audit_path,
            holes: result.holes.len(),
            intervals: result.interval_count(),
        }))
    }

    /// 1回実行する
    pub fn run_once(&self, trigger: Trigger) -> RunReport {
        let mut ctx = RunContext::new(trigger);
        let started_at = ctx.started_at.to_rfc3339_opts(SecondsFormat::Secs, true);

        info!(
            trigger = %ctx.trigger.source,
            requested_by = ctx.trigger.requested_by.as_deref().unwrap_or("system"),
            "Starting pipeline run"
        );
        self.status.update_or_warn(fields(json!({
            "state": "running",
            "message": "Pipeline run started",
            "last_run_started": started_at,
            "last_run_completed": null,
            "last_run_status": "running",
            "trigger": ctx.trigger,
            "metrics": ctx.metrics,
        })));

        let (exit_code, message) = match self.resolve_mine_areas() {
            Ok(areas) => {
                info!(count = areas.len(), "Processing mine areas");
                for area in &areas {
                    match self.process_mine_area(area, &mut ctx) {
                        Ok(Some(output)) => ctx.outputs.push(output),
                        Ok(None) => warn!(mine_area = %area.name, "No data processed for mine area"),
                        Err(e) => {
                            ctx.metrics.errors_count += 1;
                            error!(mine_area = %area.name, error = %e, "Error processing mine area");
                        }
                    }
                }

                let (code, message) = context::outcome(&ctx.metrics);
                (code, message.to_string())
            }
            Err(PipelineError::NoMineAreas) => {
                error!("No mine areas found or configured");
                (1, "No mine areas found or configured".to_string())
            }
            Err(e) => {
                error!(error = %e, "Pipeline failed");
                (1, format!("Pipeline failed: {}", e))
            }
        };

        ctx.finish_timing();
        let metrics = &ctx.metrics;
        info!(
            files = metrics.files_processed,
            holes = metrics.holes_updated,
            intervals = metrics.intervals_added,
            errors = metrics.errors_count,
            warnings = metrics.warnings_count,
            excluded = metrics.holes_excluded,
            runtime = metrics.runtime_seconds,
            "Pipeline completed"
        );

        let last_run_status = if exit_code == 0 { "success" } else { "error" };
        self.status.update_or_warn(fields(json!({
            "state": "idle",
            "message": message,
            "last_run_started": started_at,
            "last_run_completed": now_rfc3339(),
            "last_run_status": last_run_status,
            "trigger": ctx.trigger,
            "metrics": ctx.metrics,
            "exit_code": exit_code,
        })));

        RunReport {
            exit_code,
            message,
            metrics: ctx.metrics,
            outputs: ctx.outputs,
        }
    }

    fn run_and_log(&self, trigger: Trigger) {
        let report = self.run_once(trigger);
        if !report.succeeded() {
            error!(exit_code = report.exit_code, message = %report.message, "Pipeline run failed");
        }
    }

    /// `refresh_seconds` ごとに実行し続ける（Ctrl+C で終了）
    ///
    /// Ctrl+C は実行中に押されても記録され、次の確認で停止する。
    pub async fn run_continuous(&self) -> Result<()> {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Shutdown signal received");
                    let _ = shutdown_tx.send(true);
                }
                Err(e) => {
                    // 送信側を保持したまま待つ（閉じると停止扱いになる）
                    warn!(error = %e, "Failed to listen for Ctrl+C");
                    std::future::pending::<()>().await;
                }
            }
        });

        self.run_until(shutdown_rx).await
    }

    /// `shutdown` が true になる（または送信側が閉じる）まで実行し続ける
    ///
    /// 待機中も短い間隔で手動トリガーを確認し、あれば即座に実行して待機をやり直す。
    pub async fn run_until(&self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let refresh = Duration::from_secs(self.config.refresh_seconds);
        let check_interval =
            Duration::from_secs(self.config.refresh_seconds.clamp(1, MAX_CHECK_INTERVAL_SECS));

        info!(refresh_seconds = self.config.refresh_seconds, "Starting continuous pipeline");

        loop {
            if *shutdown.borrow() {
                info!("Pipeline stopped by user");
                return Ok(());
            }

            let trigger = match self.trigger.consume() {
                Some(trigger) => {
                    info!(requested_by = ?trigger.requested_by, "Manual pipeline run requested");
                    trigger
                }
                None => Trigger::schedule(),
            };
            self.run_and_log(trigger);

            info!(seconds = refresh.as_secs(), "Waiting before next scheduled run");
            let mut waited = Duration::ZERO;
            while waited < refresh {
                if *shutdown.borrow() {
                    info!("Pipeline stopped by user");
                    return Ok(());
                }

                let sleep_for = check_interval.min(refresh - waited);
                tokio::select! {
                    _ = tokio::time::sleep(sleep_for) => {}
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            info!("Pipeline stopped by user");
                            return Ok(());
                        }
                        continue;
                    }
                }
                waited += sleep_for;

                if let Some(trigger) = self.trigger.consume() {
                    info!(requested_by = ?trigger.requested_by, "Manual pipeline run requested");
                    self.run_and_log(trigger);
                    waited = Duration::ZERO;
                }
            }
        }
    }
}
