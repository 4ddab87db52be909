//! Structural validation of document trees.
//!
//! Every tree must pass the six structural invariants before extraction may
//! run against it. Validation is a single pre-order traversal that stops at
//! the first violation and reports the offending node; it never repairs.
//! The proof that a tree passed is carried in the type system: extraction
//! only accepts a [`CertifiedTree`], which can only be produced here.

use std::ops::Deref;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::model::{DocumentTree, NodeId, StructuralNode, SENTENCE_RANK};

/// The structural invariants, numbered as in the corpus design notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invariant {
    /// 1: exactly one root; the root has no parent.
    SingleRoot,
    /// 2: every non-leaf node has at least one child; leaves have none.
    ChildArity,
    /// 3: sibling ordinals are unique, contiguous, and start at 0.
    SiblingOrdinals,
    /// 4: a node's cached token count equals the sum of its children's.
    TokenSum,
    /// 5: depth ranks strictly decrease toward the leaves; all leaves sit at
    /// the reserved sentence rank.
    RankOrder,
    /// 6: the arena is a single tree: every node has exactly one parent,
    /// parent back-references match the traversal edge, and every node is
    /// reachable from the root exactly once.
    Acyclicity,
}

impl std::fmt::Display for Invariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Invariant::SingleRoot => "single-root",
            Invariant::ChildArity => "child-arity",
            Invariant::SiblingOrdinals => "sibling-ordinals",
            Invariant::TokenSum => "token-sum",
            Invariant::RankOrder => "rank-order",
            Invariant::Acyclicity => "acyclicity",
        };
        f.write_str(name)
    }
}

/// A structural violation: which invariant failed, and where.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invariant {invariant} violated at node {}", node.0)]
pub struct ValidationError {
    pub invariant: Invariant,
    pub node: NodeId,
}

impl ValidationError {
    fn new(invariant: Invariant, node: NodeId) -> Self {
        Self { invariant, node }
    }
}

/// A tree snapshot that has passed validation.
///
/// Extraction only accepts this type, so running extraction against an
/// unvalidated tree is a compile error rather than a runtime one. The
/// certificate owns its snapshot: later edits to the document create new
/// snapshots and do not disturb a certified one.
#[derive(Debug, Clone)]
pub struct CertifiedTree {
    tree: Arc<DocumentTree>,
}

impl CertifiedTree {
    pub fn tree(&self) -> &DocumentTree {
        &self.tree
    }
}

impl Deref for CertifiedTree {
    type Target = DocumentTree;

    fn deref(&self) -> &DocumentTree {
        &self.tree
    }
}

/// Validate a snapshot and certify it for extraction.
pub fn certify(snapshot: Arc<DocumentTree>) -> Result<CertifiedTree, ValidationError> {
    validate(&snapshot)?;
    Ok(CertifiedTree { tree: snapshot })
}

/// Run invariants 1-6 over the whole tree in one pre-order traversal.
///
/// Returns the first violation in document order. A childless root is
/// accepted: an empty document is a valid (empty) corpus entry, not a
/// structural defect.
pub fn validate(tree: &DocumentTree) -> Result<(), ValidationError> {
    let root = tree.root();
    let root_node = tree
        .node(root)
        .ok_or_else(|| ValidationError::new(Invariant::SingleRoot, root))?;
    if root_node.parent.is_some() {
        return Err(ValidationError::new(Invariant::SingleRoot, root));
    }

    let mut visited = vec![false; tree.node_count()];
    let mut stack = vec![root];

    while let Some(id) = stack.pop() {
        let slot = visited
            .get_mut(id.0 as usize)
            .ok_or_else(|| ValidationError::new(Invariant::Acyclicity, id))?;
        if *slot {
            return Err(ValidationError::new(Invariant::Acyclicity, id));
        }
        *slot = true;

        let node = tree
            .node(id)
            .ok_or_else(|| ValidationError::new(Invariant::Acyclicity, id))?;

        check_node(tree, id, node)?;

        stack.extend(node.children.iter().rev());
    }

    if let Some(orphan) = visited.iter().position(|seen| !seen) {
        return Err(ValidationError::new(
            Invariant::Acyclicity,
            NodeId(orphan as u32),
        ));
    }

    debug!(
        document = %tree.meta().id.0,
        nodes = tree.node_count(),
        "tree passed validation"
    );
    Ok(())
}

fn check_node(
    tree: &DocumentTree,
    id: NodeId,
    node: &StructuralNode,
) -> Result<(), ValidationError> {
    // Invariant 2. Leaves never have children; interior nodes always do,
    // except a childless root (empty document).
    if node.is_leaf() {
        if !node.children.is_empty() {
            return Err(ValidationError::new(Invariant::ChildArity, id));
        }
    } else if node.children.is_empty() && node.parent.is_some() {
        return Err(ValidationError::new(Invariant::ChildArity, id));
    }

    // Invariant 5, leaf half: leaves sit exactly at the reserved rank.
    if node.is_leaf() != (node.rank == SENTENCE_RANK) {
        return Err(ValidationError::new(Invariant::RankOrder, id));
    }

    // Invariant 1: no second root below the top.
    if node.parent.is_none() && id != tree.root() {
        return Err(ValidationError::new(Invariant::SingleRoot, id));
    }

    let mut child_tokens = 0u64;
    for (index, &child_id) in node.children.iter().enumerate() {
        let child = tree
            .node(child_id)
            .ok_or_else(|| ValidationError::new(Invariant::Acyclicity, child_id))?;

        // Invariant 6: the back-reference must match the traversal edge.
        if child.parent != Some(id) {
            return Err(ValidationError::new(Invariant::Acyclicity, child_id));
        }

        // Invariant 3.
        if child.ordinal != index as u32 {
            return Err(ValidationError::new(Invariant::SiblingOrdinals, child_id));
        }

        // Invariant 5: ranks strictly decrease toward the leaves.
        if child.rank >= node.rank {
            return Err(ValidationError::new(Invariant::RankOrder, child_id));
        }

        child_tokens += child.token_count;
    }

    // Invariant 4 (interior nodes only; a leaf's count is measured, not
    // aggregated).
    if !node.is_leaf() && node.token_count != child_tokens {
        return Err(ValidationError::new(Invariant::TokenSum, id));
    }

    Ok(())
}
