//! ログ初期化
//!
//! `tracing-subscriber` を使用。`RUST_LOG` があれば設定ファイルの `log_level` より優先する。

use tracing_subscriber::{fmt, EnvFilter};

/// ログを初期化
///
/// # Arguments
/// * `level` - 既定のフィルタ（例: `info`, `borehole_fm=debug`）
/// * `json` - JSON形式で出力するか
///
/// # Examples
/// ```no_run
/// borehole_fm::logging::init("info", false);
/// ```
pub fn init(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true);

    // 二重初期化（テストやライブラリ利用時）は無視する
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

/// テスト用（debugレベル、テスト出力に書く）
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
