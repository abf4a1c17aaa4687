//! Hierarchy builder: turns flat member records into a rooted tree.

use tracing::{debug, instrument};

use crate::domain::arena::RecordArena;
use crate::domain::entities::{FlatRecord, Node};
use crate::domain::error::{DomainError, DomainResult};

/// Deepest hierarchy the builder accepts.
///
/// Tree operations recurse per level; real org charts stay far below this.
pub const MAX_DEPTH: usize = 256;

/// Constructs the organization tree from flat records with parent references.
///
/// - Children keep input order under their parent.
/// - A record whose parent id does not resolve is dropped with its subtree.
/// - When several records have no parent, the last one becomes the root.
/// - Hierarchies deeper than [`MAX_DEPTH`] are rejected.
#[derive(Debug, Default, Clone, Copy)]
pub struct HierarchyBuilder;

impl HierarchyBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build the tree, or `None` when there is no usable root.
    pub fn build(&self, records: &[FlatRecord]) -> Option<Node> {
        match self.try_build(records) {
            Ok(tree) => Some(tree),
            Err(e) => {
                debug!("no tree: {}", e);
                None
            }
        }
    }

    /// Build the tree, naming the reason when there is none.
    #[instrument(level = "debug", skip_all, fields(records = records.len()))]
    pub fn try_build(&self, records: &[FlatRecord]) -> DomainResult<Node> {
        if records.is_empty() {
            return Err(DomainError::EmptyInput);
        }

        let mut arena = RecordArena::new();
        for record in records {
            arena.upsert(record.clone());
        }

        let links: Vec<_> = arena
            .indices()
            .iter()
            .filter_map(|&idx| {
                arena
                    .get(idx)
                    .map(|slot| (idx, slot.record.id.clone(), slot.record.parent_id.clone()))
            })
            .collect();

        for (idx, id, parent_id) in links {
            if let Some(parent_id) = parent_id {
                match arena.index_of(&parent_id) {
                    Some(parent) if parent != idx => arena.link(idx, parent),
                    _ => debug!("dropping orphan {}: parent {} not found", id, parent_id),
                }
            }
        }

        // Root: last parentless record in input order, judged by the stored record
        for record in records.iter().filter(|r| r.parent_id.is_none()) {
            if let Some(idx) = arena.index_of(&record.id) {
                if arena.get(idx).is_some_and(|slot| slot.record.parent_id.is_none()) {
                    arena.set_root(idx);
                }
            }
        }

        if arena.root().is_none() {
            return Err(DomainError::NoRoot);
        }
        let depth = arena.depth();
        if depth > MAX_DEPTH {
            return Err(DomainError::TooDeep {
                depth,
                limit: MAX_DEPTH,
            });
        }

        let tree = arena.materialize().ok_or(DomainError::NoRoot)?;
        debug!("built tree rooted at {} ({} members)", tree.id(), tree.iter().count());
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_records_when_building_then_internal_nodes_have_children() {
        let records = vec![
            FlatRecord::new("1", None, "Dir", "Diretor", 0),
            FlatRecord::new("2", Some("1"), "Sup", "Supervisor", 0),
            FlatRecord::new("3", Some("2"), "Op", "Operador", 91),
        ];

        let tree = HierarchyBuilder::new().build(&records).unwrap();

        assert!(tree.is_calculated());
        assert!(tree.children()[0].is_calculated());
        assert!(!tree.children()[0].children()[0].is_calculated());
    }

    #[test]
    fn given_self_referencing_record_when_building_then_drops_it() {
        let records = vec![
            FlatRecord::new("1", None, "Dir", "Diretor", 0),
            FlatRecord::new("2", Some("2"), "Loop", "Operador", 50),
        ];

        let tree = HierarchyBuilder::new().build(&records).unwrap();

        assert_eq!(tree.iter().count(), 1);
        assert!(!tree.is_calculated());
    }
}
