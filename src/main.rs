use clap::Parser;
use country_borders::utils::{logger, validation::Validate};
use country_borders::{BorderPipeline, CliConfig, EtlEngine, LocalStorage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }
    tracing::debug!("CLI config: {:?}", config);

    // 驗證配置
    if let Err(e) = config.validate() {
        logger::report_error("Configuration check", &e);
        std::process::exit(e.exit_code());
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 Process monitoring enabled");
    }

    let storage = LocalStorage::new(config.output_path.clone());
    let pipeline = BorderPipeline::new(storage, config)?;
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            println!("✅ Bordering countries written to: {}", output_path);
            Ok(())
        }
        Err(e) => {
            logger::report_error("Bordering-countries run", &e);
            std::process::exit(e.exit_code());
        }
    }
}
