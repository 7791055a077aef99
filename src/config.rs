use crate::error::{PipelineError, Result};
use borehole_fm_common::{FinenessRange, ParseOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 処理対象の鉱区
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MineAreaConfig {
    pub name: String,
    /// 孔フォルダを含むフォルダ（`source_root` からの相対、省略時は `name`）
    #[serde(default)]
    pub folder: Option<PathBuf>,
}

impl MineAreaConfig {
    /// 保管先でのフォルダID
    pub fn folder_id(&self) -> String {
        match &self.folder {
            Some(folder) => folder.to_string_lossy().to_string(),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// レポートフォルダのルート
    pub source_root: PathBuf,
    pub mine_areas: Vec<MineAreaConfig>,
    /// `mine_areas` が空の時、このフォルダ直下を鉱区として自動検出
    pub parent_folder: Option<PathBuf>,

    pub output_dir: PathBuf,
    pub audit_dir: PathBuf,
    pub publish_dir: PathBuf,
    pub status_path: PathBuf,
    pub trigger_path: PathBuf,

    /// 元レポートへのリンク（`{file_id}` を置換）。未設定なら file:// URL
    pub file_link_template: Option<String>,
    pub kmz_filename_template: String,
    pub audit_filename_template: String,
    pub public_url_template: String,

    pub refresh_seconds: u64,
    pub audit_retention_days: u32,

    pub fm_min_value: f64,
    pub fm_max_value: f64,
    pub max_coordinate_spread_meters: f64,

    pub log_level: String,
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_root: PathBuf::from("reports"),
            mine_areas: Vec::new(),
            parent_folder: None,
            output_dir: PathBuf::from("output"),
            audit_dir: PathBuf::from("output/audits"),
            publish_dir: PathBuf::from("public"),
            status_path: PathBuf::from("output/status.json"),
            trigger_path: PathBuf::from("output/trigger.json"),
            file_link_template: None,
            kmz_filename_template: "hc_mining_{mine_area}_fm.kmz".into(),
            audit_filename_template: "audit_{mine_area}_{timestamp}.csv".into(),
            public_url_template: "file://public/{filename}".into(),
            refresh_seconds: 600,
            audit_retention_days: 90,
            fm_min_value: 0.5,
            fm_max_value: 7.0,
            max_coordinate_spread_meters: 10.0,
            log_level: "info".into(),
            log_json: false,
        }
    }
}

/// `{key}` 形式のプレースホルダを置換
pub fn render_template(template: &str, values: &[(&str, &str)]) -> String {
    values.iter().fold(template.to_string(), |acc, (key, value)| {
        acc.replace(&format!("{{{}}}", key), value)
    })
}

impl Config {
    /// 設定を読み込む
    ///
    /// パス指定時はファイルが必須。未指定なら既定パスを探し、無ければ既定値。
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(PipelineError::FileNotFound(path.display().to_string()));
                }
                Self::from_file(path)?
            }
            None => {
                let config_path = Self::config_path()?;
                if config_path.exists() {
                    Self::from_file(&config_path)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::config_path()?,
        };

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(config_path)
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| PipelineError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("borehole-fm").join("config.json"))
    }

    /// 環境変数を優先
    fn apply_env_overrides(&mut self) {
        if let Ok(root) = std::env::var("BOREHOLE_FM_SOURCE_ROOT") {
            self.source_root = PathBuf::from(root);
        }
        if let Ok(level) = std::env::var("BOREHOLE_FM_LOG_LEVEL") {
            self.log_level = level;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.fm_min_value < self.fm_max_value) {
            return Err(PipelineError::Config(format!(
                "fm_min_value ({}) は fm_max_value ({}) より小さくしてください",
                self.fm_min_value, self.fm_max_value
            )));
        }
        if !(self.max_coordinate_spread_meters > 0.0) {
            return Err(PipelineError::Config(
                "max_coordinate_spread_meters は正の値にしてください".into(),
            ));
        }
        if self.refresh_seconds == 0 {
            return Err(PipelineError::Config("refresh_seconds は1以上にしてください".into()));
        }
        for (name, template) in [
            ("kmz_filename_template", &self.kmz_filename_template),
            ("audit_filename_template", &self.audit_filename_template),
        ] {
            if !template.contains("{mine_area}") {
                return Err(PipelineError::Config(format!(
                    "{} に {{mine_area}} が含まれていません",
                    name
                )));
            }
        }
        Ok(())
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            fineness_range: FinenessRange::new(self.fm_min_value, self.fm_max_value),
        }
    }

    pub fn kmz_filename(&self, mine_area: &str) -> String {
        render_template(&self.kmz_filename_template, &[("mine_area", mine_area)])
    }

    pub fn audit_filename(&self, mine_area: &str, timestamp: &str) -> String {
        render_template(
            &self.audit_filename_template,
            &[("mine_area", mine_area), ("timestamp", timestamp)],
        )
    }
}
