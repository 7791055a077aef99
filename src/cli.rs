use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "borehole-fm")]
#[command(about = "粒度試験レポートから孔ごとのFMを集計しKMZを生成するツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 設定ファイル（省略時は ~/.config/borehole-fm/config.json）
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// パイプラインを実行（既定は連続実行）
    Run {
        /// 1回だけ実行して終了
        #[arg(long)]
        once: bool,
    },

    /// ワークブック1件を解析して結果を表示
    Parse {
        /// ワークブックのパス
        #[arg(required = true)]
        file: PathBuf,

        /// 孔ID（フォルダ名相当）
        #[arg(long)]
        hole_id: Option<String>,
    },

    /// 設定を表示/初期化
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// 既定値で設定ファイルを作成
        #[arg(long)]
        init: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_once() {
        let cli = Cli::parse_from(["borehole-fm", "run", "--once", "-c", "conf.json"]);
        assert!(matches!(cli.command, Commands::Run { once: true }));
        assert_eq!(cli.config, Some(PathBuf::from("conf.json")));
    }

    #[test]
    fn test_parse_file_command() {
        let cli = Cli::parse_from(["borehole-fm", "-v", "parse", "a.xlsx", "--hole-id", "T3"]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Parse { file, hole_id } => {
                assert_eq!(file, PathBuf::from("a.xlsx"));
                assert_eq!(hole_id.as_deref(), Some("T3"));
            }
            _ => panic!("parse コマンドになっていない"),
        }
    }
}
