use crate::domain::model::PlaceKind;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Remote or local home of the canonical GroundPlaces file.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>>;
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct GpuidRequest {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub country_code: String,
    pub kind: PlaceKind,
}

/// Identifier plus the normalized fields the generator derived it from.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedGpuid {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub country_code: String,
}

/// Deterministic Gpuid generation from name, position, country and kind.
pub trait IdGenerator: Send + Sync {
    fn generate(&self, request: &GpuidRequest) -> GeneratedGpuid;
}

pub trait ConfigProvider: Send + Sync {
    fn places_file(&self) -> &str;
    fn history_file(&self) -> Option<&str>;
    fn output_file(&self) -> &str;
    fn keep_backup(&self) -> bool;
}
