//! 実行状態ファイル
//!
//! 既存の内容に差分をマージし、一時ファイル経由で置き換える。

use crate::error::Result;
use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct StatusFile {
    path: PathBuf,
}

impl StatusFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 現在の内容（無い・壊れている場合は空）
    pub fn read(&self) -> Map<String, Value> {
        let Ok(text) = std::fs::read_to_string(&self.path) else {
            return Map::new();
        };
        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                tracing::warn!(path = %self.path.display(), "Could not read existing status file");
                Map::new()
            }
        }
    }

    /// `updates` のキーを上書きし、`updated_at` を付けて保存
    pub fn update(&self, updates: Map<String, Value>) -> Result<()> {
        let mut status = self.read();
        status.extend(updates);
        status.insert(
            "updated_at".into(),
            Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
        );

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, serde_json::to_string_pretty(&Value::Object(status))?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// 失敗してもログのみ（状態ファイルは実行を止めない）
    pub fn update_or_warn(&self, updates: Map<String, Value>) {
        if let Err(e) = self.update(updates) {
            tracing::error!(path = %self.path.display(), error = %e, "Failed to write pipeline status");
        }
    }
}

/// `json!({...})` をマージ用の Map にする
pub fn fields(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
