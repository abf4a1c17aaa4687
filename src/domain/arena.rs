use std::collections::HashMap;

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::entities::{FlatRecord, Internal, Leaf, Node};

/// Arena slot: a flat record plus its resolved links.
#[derive(Debug)]
pub struct RecordNode {
    pub record: FlatRecord,
    /// Index of the parent, None until linked (and for the root)
    pub parent: Option<Index>,
    /// Children in link order
    pub children: Vec<Index>,
}

/// Arena of flat records, addressable by record id.
///
/// Used by the builder to resolve parent references before the owned
/// [`Node`] tree is materialized.
#[derive(Debug, Default)]
pub struct RecordArena {
    arena: Arena<RecordNode>,
    by_id: HashMap<String, Index>,
    /// Slots in order of first insertion
    order: Vec<Index>,
    root: Option<Index>,
}

impl RecordArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record; a record with an already known id replaces the stored one.
    #[instrument(level = "trace", skip(self, record), fields(id = %record.id))]
    pub fn upsert(&mut self, record: FlatRecord) -> Index {
        if let Some(&idx) = self.by_id.get(&record.id) {
            if let Some(node) = self.arena.get_mut(idx) {
                tracing::debug!("duplicate id {}, last record wins", record.id);
                node.record = record;
            }
            return idx;
        }
        let id = record.id.clone();
        let idx = self.arena.insert(RecordNode {
            record,
            parent: None,
            children: Vec::new(),
        });
        self.by_id.insert(id, idx);
        self.order.push(idx);
        idx
    }

    pub fn index_of(&self, id: &str) -> Option<Index> {
        self.by_id.get(id).copied()
    }

    pub fn get(&self, idx: Index) -> Option<&RecordNode> {
        self.arena.get(idx)
    }

    /// Slots in first-insertion order.
    pub fn indices(&self) -> &[Index] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    #[instrument(level = "trace", skip(self))]
    pub fn link(&mut self, child: Index, parent: Index) {
        if let Some(node) = self.arena.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.arena.get_mut(parent) {
            node.children.push(child);
        }
    }

    pub fn set_root(&mut self, idx: Index) {
        self.root = Some(idx);
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    /// Levels below and including the root; 0 without a root.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack: Vec<(Index, usize)> = self.root.map(|r| (r, 1)).into_iter().collect();
        while let Some((idx, level)) = stack.pop() {
            deepest = deepest.max(level);
            if let Some(node) = self.arena.get(idx) {
                stack.extend(node.children.iter().map(|&c| (c, level + 1)));
            }
        }
        deepest
    }

    pub fn iter_postorder(&self) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self)
    }

    /// Materialize the subtree reachable from the root as an owned tree.
    ///
    /// Nodes with children become [`Node::Internal`]; childless nodes are
    /// internal only when their record is flagged as calculated.
    #[instrument(level = "debug", skip(self))]
    pub fn materialize(&self) -> Option<Node> {
        let root = self.root?;
        let mut built: HashMap<Index, Node> = HashMap::new();

        for (idx, slot) in self.iter_postorder() {
            let children: Vec<Node> = slot
                .children
                .iter()
                .filter_map(|child| built.remove(child))
                .collect();
            built.insert(idx, to_node(&slot.record, children));
        }

        built.remove(&root)
    }
}

fn to_node(record: &FlatRecord, children: Vec<Node>) -> Node {
    let member = record.member();
    if !children.is_empty() || record.is_calculated == Some(true) {
        if record.is_calculated == Some(false) {
            tracing::debug!("record {} has subordinates, treating as calculated", record.id);
        }
        return Node::Internal(Internal {
            member,
            performance: record.performance,
            target_percentage: record.target_percentage,
            children,
        });
    }
    Node::Leaf(Leaf {
        member,
        performance: record.performance,
        target: record.target,
        achieved: record.achieved,
    })
}

/// Post-order walk from the root: children left to right, then the parent.
///
/// Only slots reachable from the root are visited. Every slot has at most one
/// parent and the root has none, so the walk cannot revisit a slot.
pub struct PostOrderIterator<'a> {
    arena: &'a RecordArena,
    stack: Vec<(Index, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(arena: &'a RecordArena) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = arena.root() {
            stack.push((root, false));
        }
        Self { arena, stack }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (Index, &'a RecordNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.arena.get(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_linked_records_when_walking_postorder_then_children_come_first() {
        let mut arena = RecordArena::new();
        let root = arena.upsert(FlatRecord::new("1", None, "root", "Diretor", 0));
        let a = arena.upsert(FlatRecord::new("2", Some("1"), "a", "Gerente", 0));
        let b = arena.upsert(FlatRecord::new("3", Some("2"), "b", "Operador", 90));
        arena.link(a, root);
        arena.link(b, a);
        arena.set_root(root);

        let ids: Vec<&str> = arena
            .iter_postorder()
            .map(|(_, n)| n.record.id.as_str())
            .collect();
        assert_eq!(ids, vec!["3", "2", "1"]);
    }

    #[test]
    fn given_duplicate_id_when_upserting_then_keeps_one_slot_with_last_record() {
        let mut arena = RecordArena::new();
        let first = arena.upsert(FlatRecord::new("1", None, "old", "Diretor", 10));
        let second = arena.upsert(FlatRecord::new("1", None, "new", "Diretor", 20));

        assert_eq!(first, second);
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.get(first).unwrap().record.name, "new");
    }

    #[test]
    fn given_chain_when_measuring_depth_then_counts_levels() {
        let mut arena = RecordArena::new();
        assert_eq!(arena.depth(), 0);
        let root = arena.upsert(FlatRecord::new("1", None, "root", "Diretor", 0));
        let a = arena.upsert(FlatRecord::new("2", Some("1"), "a", "Gerente", 0));
        let b = arena.upsert(FlatRecord::new("3", Some("1"), "b", "Gerente", 0));
        let c = arena.upsert(FlatRecord::new("4", Some("3"), "c", "Operador", 90));
        arena.link(a, root);
        arena.link(b, root);
        arena.link(c, b);
        arena.set_root(root);

        assert_eq!(arena.depth(), 3);
    }

    #[test]
    fn given_no_root_when_materializing_then_returns_none() {
        let mut arena = RecordArena::new();
        arena.upsert(FlatRecord::new("1", Some("x"), "a", "Operador", 90));
        assert!(arena.materialize().is_none());
    }
}
