#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "lambda")]
pub mod lambda;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::domain::model::AutocompleteFilter;
#[cfg(feature = "cli")]
use crate::utils::error::{GroundPlacesError, Result};
#[cfg(feature = "cli")]
use crate::utils::validation::{
    validate_file_extensions, validate_non_empty_string, validate_path, Validate,
};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "groundplaces")]
#[command(about = "Replay GroundPlaces action histories over a stop hierarchy")]
pub struct CliConfig {
    #[arg(long, default_value = "./data")]
    pub base_path: String,

    #[arg(long, default_value = "groundplaces.json")]
    pub places_file: String,

    #[arg(long)]
    pub history_file: Option<String>,

    #[arg(long, default_value = "groundplaces.output.json")]
    pub output_file: String,

    #[arg(long, help = "Keep a timestamped copy of the places file under backups/")]
    pub backup: bool,

    #[arg(long, help = "Search the resulting table and print the matches")]
    pub search: Option<String>,

    #[arg(long, value_delimiter = ',', help = "stopGroup, stopCluster, serviced, segmentProviderStop")]
    pub filters: Vec<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn autocomplete_filters(&self) -> Result<Vec<AutocompleteFilter>> {
        self.filters
            .iter()
            .map(|filter| {
                filter
                    .parse()
                    .map_err(|reason| GroundPlacesError::InvalidConfigValueError {
                        field: "filters".to_string(),
                        value: filter.clone(),
                        reason,
                    })
            })
            .collect()
    }
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn places_file(&self) -> &str {
        &self.places_file
    }

    fn history_file(&self) -> Option<&str> {
        self.history_file.as_deref()
    }

    fn output_file(&self) -> &str {
        &self.output_file
    }

    fn keep_backup(&self) -> bool {
        self.backup
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("base_path", &self.base_path)?;
        validate_non_empty_string("places_file", &self.places_file)?;
        validate_non_empty_string("output_file", &self.output_file)?;

        let mut files = vec![self.places_file.as_str(), self.output_file.as_str()];
        if let Some(history_file) = &self.history_file {
            files.push(history_file);
        }
        validate_file_extensions("files", &files, &["json"])?;

        self.autocomplete_filters()?;

        tracing::debug!("✅ CLI configuration validation passed");
        Ok(())
    }
}
