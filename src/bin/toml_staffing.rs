use clap::Parser;
use staffing_etl::config::needs_live_call;
use staffing_etl::core::pipeline::BUNDLE_FILE;
use staffing_etl::domain::ports::ConfigProvider;
use staffing_etl::utils::error::ErrorSeverity;
use staffing_etl::utils::{logger, validation::Validate};
use staffing_etl::{LocalStorage, OpenAiBackend, StaffingEngine, StaffingPipeline, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-staffing")]
#[command(about = "Staffing run driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "staffing-config.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Dry run - show what would be processed without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 載入 TOML 配置 (日誌格式由配置決定，所以先載入)
    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if config.json_logging() {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting TOML-based staffing run");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        perform_dry_run(&config);
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let llm = OpenAiBackend::from_config(&config)?;
    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = StaffingPipeline::new(storage, config, llm);
    let engine = StaffingEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Staffing run completed successfully!");
            println!("✅ Staffing run completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Staffing run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!(
        "  Pipeline: {} v{}",
        config.pipeline.name, config.pipeline.version
    );
    println!("  Model: {} @ {}", config.model(), config.api_endpoint());
    println!("  Output: {}", config.output_path());
    println!(
        "  Thresholds: match >= {}%, similarity >= {}%",
        config.min_match_percentage(),
        config.min_similarity()
    );

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn describe(value: Option<&str>) -> &str {
    value.unwrap_or("(not set)")
}

fn perform_dry_run(config: &TomlConfig) {
    println!("🔍 Dry Run Analysis:");
    println!();

    println!("📥 Inputs:");
    match (config.project_text(), config.project_file()) {
        (Some(text), _) => println!("  Project: inline text ({} chars)", text.len()),
        (None, file) => println!("  Project file: {}", describe(file)),
    }
    println!("  CV directory: {}", config.cv_json_dir());
    println!("  Project history: {}", describe(config.projects_file()));

    println!();
    println!("🤖 LLM Calls:");
    match config.matching_response_file() {
        Some(path) => println!("  CV matching: replayed from {}", path),
        None => println!("  CV matching: live ({})", config.model()),
    }
    match (config.analysis_response_file(), config.projects_file()) {
        (Some(path), _) => println!("  Past-project analysis: replayed from {}", path),
        (None, Some(_)) => println!("  Past-project analysis: live ({})", config.model()),
        (None, None) => println!("  Past-project analysis: skipped (no project history)"),
    }
    if !needs_live_call(config) {
        println!("  ✅ No API key needed for this run");
    }

    println!();
    println!("💾 Output Configuration:");
    println!("  Path: {}", config.output_path());
    println!("  Bundle: {}", BUNDLE_FILE);

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");
}
