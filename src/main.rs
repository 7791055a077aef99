use anyhow::Context;
use borehole_fm::{cli, common, config, logging, pipeline, publish, store, workbook};
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use pipeline::{Pipeline, Trigger};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("設定の読み込みに失敗")?;

    let level = if cli.verbose { "debug" } else { config.log_level.as_str() };
    logging::init(level, config.log_json);

    match cli.command {
        Commands::Run { once } => {
            let store = store::LocalFileStore::new(&config.source_root)
                .with_link_template(config.file_link_template.clone());
            let publisher =
                publish::LocalPublisher::new(&config.publish_dir, config.public_url_template.clone());
            let pipeline = Pipeline::new(config, store, publisher);

            if once {
                let report = pipeline.run_once(Trigger::manual());
                println!("{}", report.message);
                for output in &report.outputs {
                    println!(
                        "✔ {}: {} 孔 / {} 区間 → {}",
                        output.mine_area, output.holes, output.intervals, output.public_url
                    );
                }
                std::process::exit(report.exit_code);
            }

            pipeline.run_continuous().await?;
        }

        Commands::Parse { file, hole_id } => {
            let sheet = workbook::load_first_sheet(&file)?;
            let file_name = file
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let record = common::resolve_record(
                &file_name,
                &sheet,
                hole_id.as_deref(),
                common::Provenance::default(),
                &config.parse_options(),
            )?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }

        Commands::Config { show, init } => {
            if init {
                let path = config.save(cli.config.as_deref())?;
                println!("✔ 設定ファイルを作成しました: {}", path.display());
            }

            if show || !init {
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
        }
    }

    Ok(())
}
