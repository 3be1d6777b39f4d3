// Repository trait for run data access
use crate::domain::dataset::Dataset;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait RunDataRepository: Send + Sync {
    /// Load the run dataset. Implementations cache the first successful load and hand
    /// out an empty dataset when loading fails.
    async fn load_dataset(&self) -> Arc<Dataset>;
}
