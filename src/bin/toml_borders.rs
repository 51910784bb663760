use clap::Parser;
use country_borders::core::ConfigProvider;
use country_borders::utils::{logger, validation::Validate};
use country_borders::{BorderPipeline, EtlEngine, LocalStorage, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-borders")]
#[command(about = "Bordering-countries ETL driven by a TOML configuration")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "borders.toml")]
    config: String,

    /// Override the input file from config
    #[arg(short, long)]
    input: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Show what would be processed without calling the knowledge base
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logger::init_cli_logger(args.verbose);

    tracing::info!("🚀 Starting TOML-based country-borders");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            logger::report_error(&format!("Loading '{}'", args.config), &e);
            std::process::exit(e.exit_code());
        }
    };

    // 命令列覆蓋設定
    if let Some(input) = args.input {
        tracing::info!("🔧 Input overridden to: {}", input);
        config.input.path = Some(input);
    }

    if let Err(e) = config.validate() {
        logger::report_error("Configuration check", &e);
        std::process::exit(e.exit_code());
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - no requests will be sent");
        perform_dry_run(&config)?;
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let pipeline_name = config.pipeline.name.clone();
    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = BorderPipeline::new(storage, config)?;
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            println!("✅ Bordering countries written to: {}", output_path);
            Ok(())
        }
        Err(e) => {
            logger::report_error(&format!("Pipeline '{}'", pipeline_name), &e);
            std::process::exit(e.exit_code());
        }
    }
}

fn display_config_summary(config: &TomlConfig) {
    tracing::info!("📋 Pipeline: {}", config.pipeline.name);
    if let Some(description) = &config.pipeline.description {
        tracing::info!("   {}", description);
    }
    tracing::info!(
        "📥 Input: {} (column '{}')",
        config.input_path(),
        config.name_column()
    );
    tracing::info!(
        "🔎 Resolver: {} | 🧭 Borders: {} | policy: {} | join: {}",
        config.resolver_kind(),
        config.border_source(),
        config.border_policy(),
        config.join_mode()
    );
    tracing::info!(
        "🌐 Language: {} | concurrency: {} | on failure: {}",
        config.language(),
        config.concurrent_requests(),
        config.failure_policy()
    );
    if let Some(dir) = config.cache_dir() {
        tracing::info!("🗄️  Cache: {}", dir);
    }
    let formats: Vec<String> = config
        .output_formats()
        .iter()
        .map(|f| f.to_string())
        .collect();
    tracing::info!(
        "📤 Output: {}/{}.{{{}}}",
        config.output_path(),
        config.output_stem(),
        formats.join(",")
    );
}

fn perform_dry_run(config: &TomlConfig) -> anyhow::Result<()> {
    use country_borders::core::loader::{delimiter_for, parse_country_names};

    let data = std::fs::read(config.input_path())?;
    let queries = parse_country_names(&data, config.name_column(), delimiter_for(config.input_path()))?;

    println!("Would resolve {} names:", queries.len());
    for query in &queries {
        println!("  - {}", query.name);
    }
    Ok(())
}
