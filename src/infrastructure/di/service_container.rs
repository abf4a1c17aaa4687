//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::application::services::{
    JsonRecordsSource, JsonTreeSource, NoSource, OrganizationService, OrganizationSource,
};
use crate::config::Settings;
use crate::domain::PerformanceAggregator;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Explicit source selection, e.g. from command line flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SourceOverride {
    #[default]
    None,
    Records(PathBuf),
    Tree(PathBuf),
}

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            settings: Arc::new(settings),
            fs,
        }
    }

    /// Pick the organization source.
    ///
    /// An override wins; otherwise the configured records file, then the
    /// configured tree file; with neither, no source.
    pub fn source(&self, selection: &SourceOverride) -> Arc<dyn OrganizationSource> {
        match selection {
            SourceOverride::Records(path) => self.records_source(path),
            SourceOverride::Tree(path) => self.tree_source(path),
            SourceOverride::None => match (&self.settings.records, &self.settings.tree) {
                (Some(path), _) => self.records_source(path),
                (None, Some(path)) => self.tree_source(path),
                (None, None) => Arc::new(NoSource),
            },
        }
    }

    pub fn organization_service(&self, selection: &SourceOverride) -> OrganizationService {
        OrganizationService::new(
            self.source(selection),
            PerformanceAggregator::new(self.settings.policy()),
        )
    }

    fn records_source(&self, path: &Path) -> Arc<dyn OrganizationSource> {
        Arc::new(JsonRecordsSource::new(path, Arc::clone(&self.fs)))
    }

    fn tree_source(&self, path: &Path) -> Arc<dyn OrganizationSource> {
        Arc::new(JsonTreeSource::new(path, Arc::clone(&self.fs)))
    }
}
