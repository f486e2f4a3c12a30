use std::path::Path;

use crate::core::controller::GroundPlacesController;
use crate::domain::model::{ActionHistoryEntry, GroundPlacesFile};
use crate::domain::ports::{ConfigProvider, ObjectStore};
use crate::utils::error::Result;

/// What a replay run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayOutcome {
    pub output_path: String,
    pub backup_path: Option<String>,
    pub places: usize,
    pub applied_entries: usize,
}

/// Download, replay, upload.
///
/// Reads the canonical GroundPlaces file from the store, applies the action
/// history when one is configured, and writes the resulting table back.
pub struct ReplayEngine<S: ObjectStore, C: ConfigProvider> {
    store: S,
    config: C,
    controller: GroundPlacesController,
}

impl<S: ObjectStore, C: ConfigProvider> ReplayEngine<S, C> {
    pub fn new(store: S, config: C) -> Self {
        Self {
            store,
            config,
            controller: GroundPlacesController::new(),
        }
    }

    /// Controller holding the table of the last run.
    pub fn controller(&self) -> &GroundPlacesController {
        &self.controller
    }

    pub async fn run(&mut self) -> Result<ReplayOutcome> {
        tracing::info!("Starting GroundPlaces replay...");

        // Download
        let places_file = self.config.places_file().to_string();
        tracing::info!("📥 Reading places from {}", places_file);
        let raw_places = self.store.read_file(&places_file).await?;
        let file: GroundPlacesFile = serde_json::from_slice(&raw_places)?;
        self.controller.init(file)?;

        let backup_path = if self.config.keep_backup() {
            let path = backup_path(&places_file);
            self.store.write_file(&path, &raw_places).await?;
            tracing::info!("💾 Backup saved to {}", path);
            Some(path)
        } else {
            None
        };

        // Replay
        let applied_entries = match self.config.history_file() {
            Some(history_file) => {
                tracing::info!("📜 Reading action history from {}", history_file);
                let raw_history = self.store.read_file(history_file).await?;
                let entries: Vec<ActionHistoryEntry> = serde_json::from_slice(&raw_history)?;
                self.controller.apply_history(&entries)?;
                entries.len()
            }
            None => {
                tracing::info!("No action history configured, exporting the table as loaded");
                0
            }
        };

        // Upload
        let output_path = self.config.output_file().to_string();
        let output = serde_json::to_vec_pretty(&self.controller.to_file()?)?;
        self.store.write_file(&output_path, &output).await?;
        tracing::info!("📤 Output saved to {}", output_path);

        Ok(ReplayOutcome {
            output_path,
            backup_path,
            places: self.controller.storage().len(),
            applied_entries,
        })
    }
}

fn backup_path(places_file: &str) -> String {
    let file_name = Path::new(places_file)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(places_file);
    format!(
        "backups/{}_{}",
        chrono::Utc::now().format("%Y%m%dT%H%M%S"),
        file_name
    )
}
