use clap::Parser;
use groundplaces::config::toml_config::TomlConfig;
use groundplaces::core::autocomplete;
use groundplaces::core::ConfigProvider;
use groundplaces::utils::error::ErrorSeverity;
use groundplaces::utils::{logger, validation::Validate};
use groundplaces::{ActionHistoryEntry, GroundPlacesFile, LocalStorage, ReplayEngine};

#[derive(Parser)]
#[command(name = "toml-replay")]
#[command(about = "Replay GroundPlaces action histories from a TOML configuration")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "groundplaces.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override the backup setting from config
    #[arg(long)]
    backup: Option<bool>,

    /// Dry run - check the files and the history without writing anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    logger::init_cli_logger_with_filter(&config.log_filter(args.verbose));

    tracing::info!("🚀 Starting TOML-based replay tool");
    tracing::info!("📁 Configuration loaded from: {}", args.config);

    if let Some(backup) = args.backup {
        let replay = config.replay.get_or_insert(groundplaces::config::toml_config::ReplayConfig {
            history_file: None,
            keep_backup: None,
        });
        replay.keep_backup = Some(backup);
        tracing::info!("🔧 Backup overridden to: {}", backup);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");

    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - Nothing will be written");
        perform_dry_run(&config)?;
        return Ok(());
    }

    let filters = config.autocomplete_filters()?;
    let search = config.search_query().map(str::to_string);

    let storage = LocalStorage::new(config.base_path().to_string());
    let mut engine = ReplayEngine::new(storage, config);

    match engine.run().await {
        Ok(outcome) => {
            tracing::info!("✅ Replay completed successfully!");
            println!("✅ Replay completed successfully!");
            println!("📁 Output saved to: {}", outcome.output_path);
            println!(
                "📊 {} entries applied, {} places",
                outcome.applied_entries, outcome.places
            );

            if let Some(query) = search {
                let results =
                    autocomplete::search(engine.controller().places(), &query, &filters);
                println!("🔎 {} places match \"{}\"", results.len(), query);
                for place in results {
                    println!("  {} {}", place.id(), place.name());
                }
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Replay failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  Base path: {}", config.base_path());
    println!("  Places: {}", config.places_file());
    println!("  History: {}", config.history_file().unwrap_or("(none)"));
    println!("  Output: {}", config.output_file());
    println!("  Backup: {}", config.keep_backup());
    println!("  Monitoring: {}", config.monitoring_enabled());

    if let Some(query) = config.search_query() {
        println!("  Search: \"{}\"", query);
    }

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TomlConfig) -> Result<(), Box<dyn std::error::Error>> {
    let base = std::path::Path::new(config.base_path());

    println!("🔍 Dry Run Analysis:");
    println!();

    let raw_places = std::fs::read(base.join(config.places_file()))?;
    let places: GroundPlacesFile = serde_json::from_slice(&raw_places)?;
    let clusters = places
        .values()
        .filter(|place| place.get("type").and_then(|t| t.as_str()) == Some("cluster"))
        .count();
    println!("📥 Places file:");
    println!("  {} places ({} clusters, {} groups)", places.len(), clusters, places.len() - clusters);

    if let Some(history_file) = config.history_file() {
        let raw_history = std::fs::read(base.join(history_file))?;
        let entries: Vec<ActionHistoryEntry> = serde_json::from_slice(&raw_history)?;

        println!();
        println!("📜 Action history: {} entries", entries.len());
        for entry in &entries {
            println!("  {} {}", entry.record.action.as_str(), entry.subject);
        }
    }

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");

    Ok(())
}
