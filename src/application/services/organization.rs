//! Organization loading service
//!
//! Fetches an organization from a source, recalculates it, and degrades to an
//! injected default organization when the source yields nothing usable.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{FlatRecord, HierarchyBuilder, Node, PerformanceAggregator};
use crate::infrastructure::traits::FileSystem;

/// Upstream producer of an organization tree.
pub trait OrganizationSource: Send + Sync {
    /// Human readable origin, e.g. the file path.
    fn describe(&self) -> String;

    /// Fetch the raw (not yet recalculated) tree.
    ///
    /// `Ok(None)` means the source is reachable but holds no usable tree.
    fn fetch(&self) -> ApplicationResult<Option<Node>>;
}

/// JSON array of flat records, assembled with [`HierarchyBuilder`].
pub struct JsonRecordsSource {
    path: PathBuf,
    fs: Arc<dyn FileSystem>,
    builder: HierarchyBuilder,
}

impl JsonRecordsSource {
    pub fn new(path: impl Into<PathBuf>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            path: path.into(),
            fs,
            builder: HierarchyBuilder::new(),
        }
    }

    pub fn records(&self) -> ApplicationResult<Vec<FlatRecord>> {
        read_json(self.fs.as_ref(), &self.path)
    }
}

impl OrganizationSource for JsonRecordsSource {
    fn describe(&self) -> String {
        format!("records {}", self.path.display())
    }

    fn fetch(&self) -> ApplicationResult<Option<Node>> {
        let records = self.records()?;
        debug!("fetch: {} records from {}", records.len(), self.path.display());
        Ok(self.builder.build(&records))
    }
}

/// JSON document holding a pre-built tree with calculated-node metadata.
pub struct JsonTreeSource {
    path: PathBuf,
    fs: Arc<dyn FileSystem>,
}

impl JsonTreeSource {
    pub fn new(path: impl Into<PathBuf>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            path: path.into(),
            fs,
        }
    }
}

impl OrganizationSource for JsonTreeSource {
    fn describe(&self) -> String {
        format!("tree {}", self.path.display())
    }

    fn fetch(&self) -> ApplicationResult<Option<Node>> {
        read_json(self.fs.as_ref(), &self.path).map(Some)
    }
}

/// Source that never yields a tree.
pub struct NoSource;

impl OrganizationSource for NoSource {
    fn describe(&self) -> String {
        "none".to_string()
    }

    fn fetch(&self) -> ApplicationResult<Option<Node>> {
        Ok(None)
    }
}

fn read_json<T: serde::de::DeserializeOwned>(fs: &dyn FileSystem, path: &Path) -> ApplicationResult<T> {
    let content = fs.read_to_string(path).with_path_context("read", path)?;
    serde_json::from_str(&content).map_err(|source| ApplicationError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Where a loaded organization came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    Source(String),
    Fallback { reason: String },
}

impl Origin {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Origin::Fallback { .. })
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Source(source) => write!(f, "{}", source),
            Origin::Fallback { reason } => write!(f, "sample organization ({})", reason),
        }
    }
}

/// A recalculated organization and its origin.
#[derive(Debug, Clone)]
pub struct LoadedOrganization {
    pub tree: Node,
    pub origin: Origin,
}

/// Loads and recalculates organizations.
pub struct OrganizationService {
    source: Arc<dyn OrganizationSource>,
    aggregator: PerformanceAggregator,
}

impl OrganizationService {
    pub fn new(source: Arc<dyn OrganizationSource>, aggregator: PerformanceAggregator) -> Self {
        Self { source, aggregator }
    }

    pub fn aggregator(&self) -> &PerformanceAggregator {
        &self.aggregator
    }

    /// Load the organization, substituting `fallback` when the source fails
    /// or yields no tree. Either way the returned tree is recalculated.
    #[instrument(level = "debug", skip_all)]
    pub fn load(&self, fallback: Node) -> LoadedOrganization {
        let description = self.source.describe();
        let (raw, origin) = match self.source.fetch() {
            Ok(Some(tree)) => {
                info!("loaded organization from {}", description);
                (tree, Origin::Source(description))
            }
            Ok(None) => {
                warn!("{} holds no usable hierarchy, using sample organization", description);
                (
                    fallback,
                    Origin::Fallback {
                        reason: format!("no hierarchy in {}", description),
                    },
                )
            }
            Err(e) => {
                warn!("cannot load {}: {}, using sample organization", description, e);
                (
                    fallback,
                    Origin::Fallback {
                        reason: e.to_string(),
                    },
                )
            }
        };

        LoadedOrganization {
            tree: self.aggregator.recalculate(&raw),
            origin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{sample_organization, Status};
    use std::collections::HashMap;
    use std::io;

    /// In-memory filesystem keyed by path.
    #[derive(Default)]
    struct MemoryFs {
        files: HashMap<PathBuf, String>,
    }

    impl MemoryFs {
        fn with_file(mut self, path: &str, content: &str) -> Self {
            self.files.insert(PathBuf::from(path), content.to_string());
            self
        }
    }

    impl FileSystem for MemoryFs {
        fn read_to_string(&self, path: &Path) -> io::Result<String> {
            self.files
                .get(path)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
        }
    }

    struct FailingSource;

    impl OrganizationSource for FailingSource {
        fn describe(&self) -> String {
            "failing".to_string()
        }

        fn fetch(&self) -> ApplicationResult<Option<Node>> {
            Err(ApplicationError::Config {
                message: "boom".to_string(),
            })
        }
    }

    #[test]
    fn given_failing_source_when_loading_then_falls_back_with_reason() {
        let service = OrganizationService::new(Arc::new(FailingSource), PerformanceAggregator::default());

        let loaded = service.load(sample_organization());

        assert_eq!(
            loaded.origin,
            Origin::Fallback {
                reason: "config error: boom".to_string()
            }
        );
        assert_eq!(loaded.tree.id(), "1");
    }

    #[test]
    fn given_no_source_when_loading_then_fallback_is_recalculated() {
        let service = OrganizationService::new(Arc::new(NoSource), PerformanceAggregator::default());

        let loaded = service.load(sample_organization());

        assert!(loaded.origin.is_fallback());
        // Amanda Diniz: operators 78 and 92 -> 50% on target
        let amanda = loaded.tree.find("2").unwrap();
        assert_eq!(amanda.performance(), 0);
        assert_eq!(amanda.status(), Status::Danger);
        // Rafael Garcia: operators 86 and 90 -> 100% on target
        assert_eq!(loaded.tree.find("4").unwrap().performance(), 100);
    }

    #[test]
    fn given_records_in_memory_when_fetching_then_builds_raw_tree() {
        let fs = MemoryFs::default().with_file(
            "/org/records.json",
            r#"[
                {"id": "1", "parentId": null, "name": "Sup", "position": "Supervisor", "performance": 7},
                {"id": "2", "parentId": "1", "name": "Op", "position": "Operador", "performance": 90}
            ]"#,
        );
        let source = JsonRecordsSource::new("/org/records.json", Arc::new(fs));

        let tree = source.fetch().unwrap().unwrap();

        // not yet recalculated
        assert_eq!(tree.performance(), 7);
        assert_eq!(tree.children().len(), 1);
    }

    #[test]
    fn given_missing_file_when_fetching_then_operation_failed() {
        let source = JsonTreeSource::new("/org/tree.json", Arc::new(MemoryFs::default()));

        let err = source.fetch().unwrap_err();

        assert!(matches!(err, ApplicationError::OperationFailed { .. }));
        assert_eq!(err.to_string(), "operation failed: read: /org/tree.json");
    }
}
