pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{cli::LocalStorage, CliConfig};

#[cfg(feature = "lambda")]
pub use config::lambda::{LambdaConfig, S3Storage};

pub use core::{
    controller::{GroundPlacesController, SharedController},
    engine::{ReplayEngine, ReplayOutcome},
    gpuid::GpuidGenerator,
};
pub use domain::model::{
    ActionHistoryEntry, ActionRecord, ActionType, AutocompleteFilter, Cluster,
    CreatePlaceProperties, Group, GroundPlacesFile, Place, PlaceKind, ProviderStop, Serviced,
    UpdatePlaceProperties,
};
pub use utils::error::{GroundPlacesError, Result};
