use thiserror::Error;

use crate::domain::model::PlaceKind;

#[derive(Error, Debug)]
pub enum GroundPlacesError {
    #[error("The {kind} with the Gpuid \"{id}\" is not found.")]
    NotFound { kind: PlaceKind, id: String },

    #[error("The SegmentProviderStop with the ID \"{stop_id}\" doesn't exists inside the StopGroup with the Gpuid \"{group_id}\".")]
    StopNotFound { stop_id: String, group_id: String },

    #[error("The place with the Gpuid \"{id}\" already exists.")]
    DuplicateId { id: String },

    #[error("The StopGroup with the Gpuid \"{group_id}\" cannot be added to the StopCluster with the Gpuid \"{cluster_id}\" because it already exists in it.")]
    AlreadyMember { group_id: String, cluster_id: String },

    #[error("The StopGroup with the Gpuid \"{group_id}\" cannot be removed from the StopCluster with the Gpuid \"{cluster_id}\" because it does not belong to it.")]
    NotMember { group_id: String, cluster_id: String },

    #[error("The SegmentProviderStop with the ID \"{stop_id}\" cannot be moved into the StopGroup with the Gpuid \"{group_id}\" because it already has a SegmentProviderStop from the company \"{company_name}\".")]
    DuplicateCompany {
        stop_id: String,
        group_id: String,
        company_name: String,
    },

    #[error("The distance between \"{from}\" and \"{to}\" is {distance}km, which exceeds the limit of {limit}km.")]
    DistanceExceeded {
        from: String,
        to: String,
        distance: f64,
        limit: f64,
    },

    #[error("Impossible to remove the StopGroup with the Gpuid \"{group_id}\". Make sure that the StopGroup you want to remove will not be without any StopCluster parent after this operation.")]
    WouldOrphan { group_id: String },

    #[error("Error while {context}, please check that you have provide all properties needed ({required}).")]
    MissingField {
        context: String,
        required: String,
        field: String,
    },

    #[error("The name \"{name}\" is invalid, a StopCluster name must follow the format \"CITY, REGION, COUNTRY\".")]
    InvalidNameFormat { name: String },

    #[error("{message}")]
    NoOpRequest { message: String },

    #[error("You can't merge the StopGroup with the Gpuid \"{group_id}\" because it has no SegmentProviderStop childrens.")]
    NothingToMerge { group_id: String },

    #[error("The \"{kind}\" with the Gpuid \"{id}\" cannot be deleted because it has children.")]
    HasChildren { kind: &'static str, id: String },

    #[error("The \"{kind}\" with the Gpuid \"{id}\" cannot be deleted because it cannot be found.")]
    DeleteTargetNotFound { kind: &'static str, id: String },

    #[error("You can't apply your GroundPlacesActionHistory file because there is no GroundPlaces available on this instance. You should call the \"init\" method with your GroundPlacesFile before using this method.")]
    NotInitialized,

    #[error("The action \"{action}\" on \"{subject}\" is missing its \"{field}\" value.")]
    InvalidHistoryEntry {
        subject: String,
        action: String,
        field: &'static str,
    },

    #[error("There is an error inside your GroundPlacesActionHistory file. More details: \"{message}\"")]
    HistoryReplay { index: usize, message: String },

    #[error("The controller lock is poisoned, a previous operation panicked")]
    LockPoisoned,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Object store error: {message}")]
    ObjectStoreError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Lookup,
    Invariant,
    Request,
    Replay,
    Io,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl GroundPlacesError {
    pub fn not_found(kind: PlaceKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn no_op(message: impl Into<String>) -> Self {
        Self::NoOpRequest {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        use GroundPlacesError::*;
        match self {
            NotFound { .. } | StopNotFound { .. } | DeleteTargetNotFound { .. } => {
                ErrorCategory::Lookup
            }
            DuplicateId { .. }
            | AlreadyMember { .. }
            | NotMember { .. }
            | DuplicateCompany { .. }
            | DistanceExceeded { .. }
            | WouldOrphan { .. }
            | HasChildren { .. } => ErrorCategory::Invariant,
            MissingField { .. }
            | InvalidNameFormat { .. }
            | NoOpRequest { .. }
            | NothingToMerge { .. } => ErrorCategory::Request,
            NotInitialized | InvalidHistoryEntry { .. } | HistoryReplay { .. } => {
                ErrorCategory::Replay
            }
            IoError(_) | SerializationError(_) | ObjectStoreError { .. } | LockPoisoned => {
                ErrorCategory::Io
            }
            ConfigError { .. }
            | ConfigValidationError { .. }
            | InvalidConfigValueError { .. }
            | MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Request => ErrorSeverity::Medium,
            ErrorCategory::Lookup | ErrorCategory::Invariant | ErrorCategory::Replay => {
                ErrorSeverity::High
            }
            ErrorCategory::Io | ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        use GroundPlacesError::*;
        match self {
            NotFound { .. } | StopNotFound { .. } | DeleteTargetNotFound { .. } => {
                "Check the Gpuid and the kind of place used, the place may have been moved or deleted"
            }
            DistanceExceeded { .. } => {
                "Pick a parent closer to the place, or fix its coordinates first"
            }
            WouldOrphan { .. } => "Attach the StopGroup to another StopCluster before removing it",
            AlreadyMember { .. } | DuplicateCompany { .. } | DuplicateId { .. } => {
                "The target already holds this entry, remove the duplicate action"
            }
            HasChildren { .. } => "Move or merge every child away before deleting the place",
            NotInitialized => "Load a GroundPlaces file before applying an action history",
            HistoryReplay { .. } | InvalidHistoryEntry { .. } => {
                "Fix the failing entry of the action history file, nothing was applied"
            }
            MissingField { .. }
            | InvalidNameFormat { .. }
            | NoOpRequest { .. }
            | NotMember { .. }
            | NothingToMerge { .. } => "Check the parameters of the request",
            IoError(_) | ObjectStoreError { .. } => {
                "Check that the files exist and that the store is reachable"
            }
            LockPoisoned => "Reload the places, the shared controller cannot be trusted anymore",
            SerializationError(_) => "Check that the file is valid JSON in the expected format",
            ConfigError { .. }
            | ConfigValidationError { .. }
            | InvalidConfigValueError { .. }
            | MissingConfigError { .. } => "Check your configuration file and environment variables",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Io => format!("Could not read or write the places: {}", self),
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GroundPlacesError>;
