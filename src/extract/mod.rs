//! Token-budgeted extraction of training-ready spans.
//!
//! The extractor partitions a certified document tree into an ordered,
//! non-overlapping sequence of units whose leaf sets cover the document's
//! sentences exactly. Two modes:
//!
//! - [`ExtractionMode::FixedLabel`]: every node at a semantic level
//!   ("chapter", "paragraph"), whatever its size.
//! - [`ExtractionMode::Budgeted`]: spans packed into a closed token-count
//!   interval, recursing into oversized regions down to sentence runs.
//!
//! Sentences are never split below the sentence boundary: a single sentence
//! larger than the budget is emitted alone and flagged `oversized`.
//!
//! The returned iterator is lazy, finite, and restartable: re-invoking
//! [`extract`] with the same arguments on an unchanged snapshot yields an
//! identical sequence.

mod bilingual;
mod budget;
mod fixed;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::{DocumentTree, NodeId};
use crate::validate::CertifiedTree;

pub use bilingual::{zip_units, AlignmentMap, BilingualUnit};
use budget::BudgetIter;
use fixed::FixedLabelIter;

/// What the consumer wants back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMode {
    /// Every node whose level label matches, regardless of size.
    FixedLabel(String),
    /// Spans packed into the closed interval `[min_tokens, max_tokens]`.
    Budgeted { min_tokens: u64, max_tokens: u64 },
}

/// Extraction configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionPolicy {
    pub mode: ExtractionMode,
    /// Level labels a unit must never straddle. The document root always
    /// behaves as a boundary, so units never cross documents.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub boundary_labels: BTreeSet<String>,
}

impl ExtractionPolicy {
    /// Return every node labeled `label` as one unit.
    pub fn fixed_label(label: impl Into<String>) -> Self {
        Self {
            mode: ExtractionMode::FixedLabel(label.into()),
            boundary_labels: BTreeSet::new(),
        }
    }

    /// Pack spans into `[min_tokens, max_tokens]`.
    ///
    /// # Panics
    /// Panics if `min_tokens > max_tokens`; the interval is a caller
    /// contract, not a runtime input.
    pub fn budgeted(min_tokens: u64, max_tokens: u64) -> Self {
        assert!(
            min_tokens <= max_tokens,
            "budget interval is empty: min {min_tokens} > max {max_tokens}"
        );
        Self {
            mode: ExtractionMode::Budgeted {
                min_tokens,
                max_tokens,
            },
            boundary_labels: BTreeSet::new(),
        }
    }

    /// Add a boundary label units must never straddle.
    pub fn with_boundary(mut self, label: impl Into<String>) -> Self {
        self.boundary_labels.insert(label.into());
        self
    }

    pub(crate) fn is_boundary(&self, label: &str) -> bool {
        self.boundary_labels.contains(label)
    }
}

/// Outcome flags for units that could not fully satisfy the policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitFlags {
    /// A single sentence exceeding `max_tokens`, emitted alone. Sentences
    /// are never split internally; this marks the open segmentation gap.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub oversized: bool,
    /// A trailing fragment under `min_tokens` that no neighbor could absorb.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub undersized: bool,
    /// A leaf with no ancestor carrying the requested label.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub ungrouped: bool,
}

impl UnitFlags {
    /// Whether the unit satisfied the policy without caveats.
    pub fn is_clean(&self) -> bool {
        !(self.oversized || self.undersized || self.ungrouped)
    }
}

/// One extracted span: an ordered run of sentence leaves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedUnit {
    /// Sentence leaves in document order.
    pub leaf_ids: Vec<NodeId>,
    /// Total token count across the leaves.
    pub token_count: u64,
    #[serde(default)]
    pub flags: UnitFlags,
}

impl ExtractedUnit {
    /// Materialize the unit's text by joining its sentences.
    pub fn text(&self, tree: &DocumentTree) -> String {
        let mut out = String::new();
        for &id in &self.leaf_ids {
            if let Some(text) = tree.leaf_text(id) {
                if !out.is_empty() {
                    out.push(' ');
                }
                out.push_str(text);
            }
        }
        out
    }
}

/// Extract units from a certified tree under a policy.
///
/// Only a [`CertifiedTree`] is accepted: handing extraction an unvalidated
/// tree is a programming error, and the type makes it unrepresentable.
pub fn extract<'a>(tree: &'a CertifiedTree, policy: &'a ExtractionPolicy) -> Units<'a> {
    let inner = match &policy.mode {
        ExtractionMode::FixedLabel(label) => {
            UnitsInner::Fixed(FixedLabelIter::new(tree.tree(), label))
        }
        ExtractionMode::Budgeted {
            min_tokens,
            max_tokens,
        } => UnitsInner::Budget(BudgetIter::new(
            tree.tree(),
            policy,
            *min_tokens,
            *max_tokens,
        )),
    };
    Units { inner }
}

/// Lazy sequence of extracted units, in document pre-order.
pub struct Units<'a> {
    inner: UnitsInner<'a>,
}

enum UnitsInner<'a> {
    Fixed(FixedLabelIter<'a>),
    Budget(BudgetIter<'a>),
}

impl Iterator for Units<'_> {
    type Item = ExtractedUnit;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            UnitsInner::Fixed(iter) => iter.next(),
            UnitsInner::Budget(iter) => iter.next(),
        }
    }
}

pub(crate) fn unit_of_subtree(tree: &DocumentTree, id: NodeId, flags: UnitFlags) -> ExtractedUnit {
    ExtractedUnit {
        leaf_ids: tree.leaves_in_order(id).collect(),
        token_count: tree.token_count(id),
        flags,
    }
}
