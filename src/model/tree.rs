//! Arena document tree with cached token aggregates.
//!
//! A document's hierarchy lives in a single arena (`Vec<StructuralNode>`,
//! index 0 is always the root) with a shared append-only text buffer that
//! leaves reference by range. Parent links are back-references only; the
//! arena owns every node, so the structure is tree-shaped by construction.

use tracing::debug;

use super::document::{DocumentMeta, Language};
use super::node::{NodeId, SentenceLeaf, StructuralNode, TextRange, SENTENCE_RANK};
use crate::error::{Error, Result};
use crate::tokenize::Tokenizer;

/// A document's full structural hierarchy.
///
/// Nodes are immutable after construction apart from the cached
/// `token_count`, which is maintained along the ancestor chain on leaf text
/// edits (O(depth), never a full recount).
#[derive(Debug, Clone)]
pub struct DocumentTree {
    meta: DocumentMeta,
    /// All nodes in the tree (index 0 is always the root).
    nodes: Vec<StructuralNode>,
    /// Shared text buffer; leaves reference ranges into it. Append-only:
    /// edits repoint the leaf's range and abandon the stale bytes.
    text: String,
}

impl DocumentTree {
    /// Get the root node ID.
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn meta(&self) -> &DocumentMeta {
        &self.meta
    }

    /// Get a node by ID.
    pub fn node(&self, id: NodeId) -> Option<&StructuralNode> {
        self.nodes.get(id.0 as usize)
    }

    /// Get a mutable node by ID.
    ///
    /// Mutations through this bypass the builder's and edit path's invariant
    /// maintenance; callers must re-run [`validate`](crate::validate::validate)
    /// before handing the tree to extraction.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut StructuralNode> {
        self.nodes.get_mut(id.0 as usize)
    }

    /// Get the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Cached token count of a node (0 for an unknown ID).
    pub fn token_count(&self, id: NodeId) -> u64 {
        self.node(id).map_or(0, |n| n.token_count)
    }

    /// Ordered child IDs of a node.
    pub fn child_ids(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Iterate over children of a node in document order.
    pub fn children(&self, id: NodeId) -> ChildIter<'_> {
        ChildIter {
            ids: self.child_ids(id).iter(),
        }
    }

    /// Iterate over the subtree rooted at `id` in pre-order.
    pub fn iter_dfs(&self, id: NodeId) -> DfsIter<'_> {
        DfsIter {
            tree: self,
            stack: vec![id],
        }
    }

    /// Iterate over the sentence leaves under `id` in document order.
    ///
    /// Lazy and finite; re-invoking yields a fresh iterator over the same
    /// sequence, so traversals are restartable.
    pub fn leaves_in_order(&self, id: NodeId) -> LeafIter<'_> {
        LeafIter {
            inner: self.iter_dfs(id),
        }
    }

    /// Get text for a range in the shared buffer.
    pub fn text(&self, range: TextRange) -> &str {
        let start = range.start as usize;
        let end = range.end() as usize;
        &self.text[start..end]
    }

    /// Get a leaf's sentence text.
    pub fn leaf_text(&self, id: NodeId) -> Option<&str> {
        let leaf = self.node(id)?.leaf.as_ref()?;
        Some(self.text(leaf.text))
    }

    /// Replace a leaf's text and recount tokens along its ancestor chain.
    ///
    /// The new text is appended to the shared buffer and the leaf repointed;
    /// only the edited leaf and its ancestors are touched, so the cost is
    /// O(depth), not O(tree size).
    pub fn edit_leaf_text(
        &mut self,
        id: NodeId,
        new_text: &str,
        tokenizer: &dyn Tokenizer,
    ) -> Result<()> {
        let node = self.nodes.get(id.0 as usize).ok_or(Error::UnknownNode(id))?;
        let leaf = node.leaf.as_ref().ok_or(Error::NotALeaf(id))?;

        let new_tokens = tokenizer.count_tokens(new_text, &leaf.language);
        let old_tokens = node.token_count;
        let delta = new_tokens as i64 - old_tokens as i64;

        let start = self.text.len() as u32;
        self.text.push_str(new_text);
        let range = TextRange::new(start, new_text.len() as u32);

        let node = &mut self.nodes[id.0 as usize];
        if let Some(leaf) = node.leaf.as_mut() {
            leaf.text = range;
        }
        node.token_count = new_tokens;

        // Propagate the delta up the ancestor chain.
        let mut current = node.parent;
        while let Some(parent_id) = current {
            let parent = &mut self.nodes[parent_id.0 as usize];
            parent.token_count = (parent.token_count as i64 + delta) as u64;
            current = parent.parent;
        }

        debug!(
            node = id.0,
            old_tokens, new_tokens, "leaf text edited, ancestor counts updated"
        );
        Ok(())
    }
}

/// Iterator over children of a node.
pub struct ChildIter<'a> {
    ids: std::slice::Iter<'a, NodeId>,
}

impl Iterator for ChildIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        self.ids.next().copied()
    }
}

/// Pre-order iterator over a subtree.
pub struct DfsIter<'a> {
    tree: &'a DocumentTree,
    stack: Vec<NodeId>,
}

impl Iterator for DfsIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;

        // Push children in reverse order so they're visited left-to-right.
        let children = self.tree.child_ids(current);
        self.stack.extend(children.iter().rev());

        Some(current)
    }
}

/// Pre-order iterator over the sentence leaves of a subtree.
pub struct LeafIter<'a> {
    inner: DfsIter<'a>,
}

impl Iterator for LeafIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let id = self.inner.next()?;
            if self.inner.tree.node(id).is_some_and(StructuralNode::is_leaf) {
                return Some(id);
            }
        }
    }
}

/// Construction-time view of a document tree.
///
/// A node's parent is fixed when the node is added and the sibling ordinal
/// is assigned from the parent's current child count, so invariants 3 and 6
/// hold by construction. Token counts are aggregated bottom-up exactly once
/// in [`TreeBuilder::finish`].
pub struct TreeBuilder {
    meta: DocumentMeta,
    nodes: Vec<StructuralNode>,
    text: String,
}

impl TreeBuilder {
    /// Start a tree with its root node.
    pub fn new(meta: DocumentMeta, root_label: impl Into<String>, root_rank: u8) -> Self {
        let root = StructuralNode {
            parent: None,
            label: root_label.into(),
            rank: root_rank,
            ordinal: 0,
            token_count: 0,
            children: Vec::new(),
            leaf: None,
        };
        Self {
            meta,
            nodes: vec![root],
            text: String::new(),
        }
    }

    /// Add an interior node under `parent` and return its ID.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        label: impl Into<String>,
        rank: u8,
    ) -> Result<NodeId> {
        self.push_node(parent, label.into(), rank, None)
    }

    /// Add a sentence leaf under `parent` with a pre-measured token count.
    pub fn add_leaf(
        &mut self,
        parent: NodeId,
        text: &str,
        language: Language,
        tokens: u64,
    ) -> Result<NodeId> {
        let start = self.text.len() as u32;
        self.text.push_str(text);
        let range = TextRange::new(start, text.len() as u32);

        let id = self.push_node(
            parent,
            "sentence".to_string(),
            SENTENCE_RANK,
            Some(SentenceLeaf {
                text: range,
                language,
            }),
        )?;
        self.nodes[id.0 as usize].token_count = tokens;
        Ok(id)
    }

    fn push_node(
        &mut self,
        parent: NodeId,
        label: String,
        rank: u8,
        leaf: Option<SentenceLeaf>,
    ) -> Result<NodeId> {
        let ordinal = {
            let parent_node = self
                .nodes
                .get(parent.0 as usize)
                .ok_or(Error::UnknownNode(parent))?;
            if parent_node.is_leaf() {
                return Err(Error::InvalidDocument(format!(
                    "cannot add children under sentence leaf {}",
                    parent.0
                )));
            }
            parent_node.children.len() as u32
        };

        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(StructuralNode {
            parent: Some(parent),
            label,
            rank,
            ordinal,
            token_count: 0,
            children: Vec::new(),
            leaf,
        });
        self.nodes[parent.0 as usize].children.push(id);
        Ok(id)
    }

    /// Finish construction: aggregate token counts bottom-up once.
    ///
    /// Children always have larger arena indices than their parent, so a
    /// single reverse pass sums every node before its parent reads it.
    pub fn finish(mut self) -> DocumentTree {
        for i in (0..self.nodes.len()).rev() {
            if self.nodes[i].leaf.is_some() {
                continue;
            }
            let sum: u64 = self.nodes[i]
                .children
                .iter()
                .map(|c| self.nodes[c.0 as usize].token_count)
                .sum();
            self.nodes[i].token_count = sum;
        }
        debug!(
            document = %self.meta.id.0,
            nodes = self.nodes.len(),
            tokens = self.nodes[0].token_count,
            "document tree built"
        );
        DocumentTree {
            meta: self.meta,
            nodes: self.nodes,
            text: self.text,
        }
    }
}
