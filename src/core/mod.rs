pub mod autocomplete;
pub mod controller;
pub mod distance;
pub mod engine;
pub mod gpuid;
pub mod replay;
pub mod storage;

pub use crate::domain::model::{ActionHistoryEntry, GroundPlacesFile, Place};
pub use crate::domain::ports::{ConfigProvider, IdGenerator, ObjectStore};
pub use crate::utils::error::Result;
