//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::application::services::VisualizeService;
use crate::application::{load_dataset, ApplicationResult, LoadReport};
use crate::config::Settings;
use crate::domain::TreeBuilder;
use crate::infrastructure::traits::{DatasetReader, RealDatasetReader};

/// Container holding settings and I/O implementations.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Dataset source abstraction
    pub reader: Arc<dyn DatasetReader>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealDatasetReader))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, reader: Arc<dyn DatasetReader>) -> Self {
        Self {
            settings: Arc::new(settings),
            reader,
        }
    }

    /// Tree builder configured from settings.
    pub fn tree_builder(&self) -> TreeBuilder {
        TreeBuilder::with_options(self.settings.tree.clone())
    }

    /// Load the configured dataset and wrap it in a visualize service.
    pub fn visualize_service(&self) -> ApplicationResult<(VisualizeService, LoadReport)> {
        let dataset = load_dataset(self.reader.as_ref(), &self.settings.dataset)?;
        info!(
            "loaded {} records from {}",
            dataset.records.len(),
            self.settings.dataset
        );
        let service = VisualizeService::new(dataset.records, self.tree_builder())
            .with_delay(Duration::from_millis(self.settings.render_delay_ms));
        Ok((service, dataset.report))
    }
}
