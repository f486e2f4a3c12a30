use clap::Parser;
use groundplaces::core::autocomplete;
use groundplaces::utils::error::ErrorSeverity;
use groundplaces::utils::{logger, validation::Validate};
use groundplaces::{CliConfig, LocalStorage, ReplayEngine};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting groundplaces CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }
    let filters = config.autocomplete_filters()?;
    let search = config.search.clone();

    let storage = LocalStorage::new(config.base_path.clone());
    let mut engine = ReplayEngine::new(storage, config);

    match engine.run().await {
        Ok(outcome) => {
            tracing::info!(
                "✅ Replayed {} entries, {} places written",
                outcome.applied_entries,
                outcome.places
            );
            println!("✅ Replay completed successfully!");
            println!("📁 Output saved to: {}", outcome.output_path);
            if let Some(backup_path) = &outcome.backup_path {
                println!("💾 Backup saved to: {}", backup_path);
            }

            if let Some(query) = search {
                let results =
                    autocomplete::search(engine.controller().places(), &query, &filters);
                println!("🔎 {} places match \"{}\"", results.len(), query);
                for place in results {
                    println!("  {} [{}] {}", place.id(), place.kind().as_str(), place.name());
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
