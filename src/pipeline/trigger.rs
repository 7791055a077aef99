//! 手動実行トリガー
//!
//! 外部（API・運用者）がファイルを置くと、連続実行の待機中に読み取って削除する。

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    #[serde(default = "default_manual_source")]
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_by: Option<String>,
    /// その他の付帯情報はそのまま状態ファイルに残す
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_manual_source() -> String {
    "manual".into()
}

impl Trigger {
    pub fn schedule() -> Self {
        Self::with_source("schedule")
    }

    pub fn manual() -> Self {
        Self::with_source("manual")
    }

    fn with_source(source: &str) -> Self {
        Self {
            source: source.into(),
            requested_by: None,
            extra: serde_json::Map::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TriggerFile {
    path: PathBuf,
}

impl TriggerFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// トリガーがあれば読み取って削除する
    ///
    /// 内容が読めなくても要求自体は有効として `manual` を返す。
    pub fn consume(&self) -> Option<Trigger> {
        if !self.path.exists() {
            return None;
        }

        let trigger = match std::fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Trigger::manual(),
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to parse manual trigger file");
                Trigger::manual()
            }),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read manual trigger file");
                Trigger::manual()
            }
        };

        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::warn!(error = %e, "Failed to remove manual trigger file");
        }
        Some(trigger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_no_trigger() {
        let dir = tempdir().unwrap();
        let file = TriggerFile::new(dir.path().join("trigger.json"));
        assert_eq!(file.consume(), None);
    }

    #[test]
    fn test_consume_deletes_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trigger.json");
        std::fs::write(&path, r#"{"requested_by": "ops", "reason": "new reports"}"#).unwrap();

        let file = TriggerFile::new(&path);
        let trigger = file.consume().unwrap();
        assert_eq!(trigger.source, "manual");
        assert_eq!(trigger.requested_by.as_deref(), Some("ops"));
        assert_eq!(trigger.extra["reason"], "new reports");
        assert!(!path.exists(), "トリガーファイルが削除されていない");
        assert_eq!(file.consume(), None);
    }

    #[test]
    fn test_unreadable_content_is_manual() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trigger.json");
        std::fs::write(&path, "not json").unwrap();
        assert_eq!(TriggerFile::new(&path).consume(), Some(Trigger::manual()));

        std::fs::write(&path, "").unwrap();
        assert_eq!(TriggerFile::new(&path).consume(), Some(Trigger::manual()));
    }
}
