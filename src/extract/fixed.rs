//! Fixed-label extraction: every node at one semantic level.

use crate::model::{DocumentTree, NodeId};

use super::{unit_of_subtree, ExtractedUnit, UnitFlags};

/// Pre-order walk emitting every node whose label matches.
///
/// Matched nodes are emitted whole and not descended into, so a matched
/// node's descendants are never emitted separately. Leaves reached without
/// passing a matching ancestor are emitted individually, flagged
/// `ungrouped`.
pub(super) struct FixedLabelIter<'a> {
    tree: &'a DocumentTree,
    label: &'a str,
    stack: Vec<NodeId>,
}

impl<'a> FixedLabelIter<'a> {
    pub(super) fn new(tree: &'a DocumentTree, label: &'a str) -> Self {
        Self {
            tree,
            label,
            stack: vec![tree.root()],
        }
    }
}

impl Iterator for FixedLabelIter<'_> {
    type Item = ExtractedUnit;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.stack.pop() {
            let Some(node) = self.tree.node(id) else {
                continue;
            };

            if node.label == self.label {
                let unit = unit_of_subtree(self.tree, id, UnitFlags::default());
                // A matched node always covers leaves unless the document is
                // empty; an empty document yields an empty sequence.
                if !unit.leaf_ids.is_empty() {
                    return Some(unit);
                }
                continue;
            }

            if node.is_leaf() {
                return Some(ExtractedUnit {
                    leaf_ids: vec![id],
                    token_count: node.token_count,
                    flags: UnitFlags {
                        ungrouped: true,
                        ..UnitFlags::default()
                    },
                });
            }

            self.stack.extend(node.children.iter().rev());
        }
        None
    }
}
