//! 成果物の公開
//!
//! KMZ・監査CSVを配信先に置き、公開URLを返す。

use crate::config::render_template;
use crate::error::{PipelineError, Result};
use std::path::{Component, Path, PathBuf};

pub trait Publisher {
    /// `local` を `key`（`audits/xxx.csv` のような相対キー）で公開し、公開URLを返す
    fn publish(&self, local: &Path, key: &str) -> Result<String>;
}

/// ローカルディレクトリへのコピーで公開する
#[derive(Debug, Clone)]
pub struct LocalPublisher {
    publish_dir: PathBuf,
    /// `{filename}` にキーが入る
    url_template: String,
}

impl LocalPublisher {
    pub fn new(publish_dir: impl Into<PathBuf>, url_template: impl Into<String>) -> Self {
        Self {
            publish_dir: publish_dir.into(),
            url_template: url_template.into(),
        }
    }

    pub fn publish_dir(&self) -> &Path {
        &self.publish_dir
    }
}

/// 公開ディレクトリの外を指すキーは拒否
fn validate_key(key: &str) -> Result<&Path> {
    let path = Path::new(key);
    let safe = !key.is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
    if safe {
        Ok(path)
    } else {
        Err(PipelineError::Publish(format!("不正な公開キー: {}", key)))
    }
}

impl Publisher for LocalPublisher {
    fn publish(&self, local: &Path, key: &str) -> Result<String> {
        if !local.is_file() {
            return Err(PipelineError::FileNotFound(local.display().to_string()));
        }

        let dest = self.publish_dir.join(validate_key(key)?);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(local, &dest)
            .map_err(|e| PipelineError::Publish(format!("{}: {}", dest.display(), e)))?;

        let url = render_template(&self.url_template, &[("filename", key)]);
        tracing::info!(key, url = %url, "Published");
        Ok(url)
    }
}
