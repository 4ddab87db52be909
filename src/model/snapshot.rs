//! Single-writer document handles with snapshot isolation.

use std::sync::Arc;

use super::node::NodeId;
use super::tree::DocumentTree;
use crate::error::Result;
use crate::tokenize::Tokenizer;

/// Owning handle for a document tree with single-writer edit access.
///
/// Readers take [`snapshot`](TreeHandle::snapshot)s, cheap `Arc` clones that
/// stay immutable for as long as they are held. Edits go through `&mut self`
/// and copy-on-write: if any snapshot is outstanding, the edit clones the
/// tree and mutates the clone, so an extraction pass in flight never sees a
/// tree change under it. Serializing writers per document is the caller's
/// responsibility and falls out of `&mut`.
#[derive(Debug, Clone)]
pub struct TreeHandle {
    current: Arc<DocumentTree>,
}

impl TreeHandle {
    pub fn new(tree: DocumentTree) -> Self {
        Self {
            current: Arc::new(tree),
        }
    }

    /// An immutable snapshot of the current tree.
    pub fn snapshot(&self) -> Arc<DocumentTree> {
        Arc::clone(&self.current)
    }

    /// Replace a leaf's text; outstanding snapshots keep the old tree.
    pub fn edit_leaf_text(
        &mut self,
        id: NodeId,
        new_text: &str,
        tokenizer: &dyn Tokenizer,
    ) -> Result<()> {
        Arc::make_mut(&mut self.current).edit_leaf_text(id, new_text, tokenizer)
    }
}
