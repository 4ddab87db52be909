//! Bilingual pairing of extracted unit sequences.
//!
//! The extractor runs once per language tree; the two unit sequences are
//! then zipped through a sentence alignment map. Sentences with no
//! counterpart are dropped from the bilingual sequence (deliberately, and
//! with the drop count surfaced) while remaining in each monolingual
//! sequence.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{Alignment, DocumentId, NodeId};
use crate::status::ProcessingStatus;

use super::ExtractedUnit;

/// Sentence-to-sentence mapping between two language trees, one direction
/// per language pair (source leaf → target leaf).
#[derive(Debug, Clone, Default)]
pub struct AlignmentMap {
    map: HashMap<NodeId, NodeId>,
}

impl AlignmentMap {
    /// Build from explicit (source, target) leaf pairs.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (NodeId, NodeId)>,
    {
        Self {
            map: pairs.into_iter().collect(),
        }
    }

    /// Build from alignment records for one document pair, keeping only the
    /// latest version of each lineage and only `Validated` pairings, the
    /// single status the state machine marks usable in the corpus.
    pub fn from_alignments(
        alignments: &[Alignment],
        source_doc: DocumentId,
        target_doc: DocumentId,
    ) -> Self {
        let mut latest: HashMap<_, &Alignment> = HashMap::new();
        for alignment in alignments {
            if alignment.source.document != source_doc || alignment.target.document != target_doc {
                continue;
            }
            let entry = latest.entry(alignment.id).or_insert(alignment);
            if alignment.version > entry.version {
                *entry = alignment;
            }
        }
        let map = latest
            .into_values()
            .filter(|a| a.status == ProcessingStatus::Validated)
            .map(|a| (a.source.node, a.target.node))
            .collect();
        Self { map }
    }

    pub fn target_of(&self, source: NodeId) -> Option<NodeId> {
        self.map.get(&source).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// A pairing of one source unit with one target unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BilingualUnit {
    /// Index into the source unit sequence.
    pub source_unit: usize,
    /// Index into the target unit sequence.
    pub target_unit: usize,
    /// The aligned sentence pairs shared by the two units, in source
    /// document order.
    pub pairs: Vec<(NodeId, NodeId)>,
}

/// Zip two monolingual unit sequences through an alignment map.
///
/// A pair is emitted for every (source unit, target unit) combination that
/// shares at least one aligned sentence, ordered by source unit and then by
/// target unit. Source sentences with no counterpart (unaligned, or
/// aligned to a sentence absent from the target sequence) are dropped from
/// the bilingual output.
pub fn zip_units(
    source_units: &[ExtractedUnit],
    target_units: &[ExtractedUnit],
    map: &AlignmentMap,
) -> Vec<BilingualUnit> {
    let mut target_index: HashMap<NodeId, usize> = HashMap::new();
    for (index, unit) in target_units.iter().enumerate() {
        for &leaf in &unit.leaf_ids {
            target_index.insert(leaf, index);
        }
    }

    let mut out = Vec::new();
    let mut dropped = 0usize;

    for (source_index, unit) in source_units.iter().enumerate() {
        // BTreeMap keeps target units in document order within one source
        // unit.
        let mut by_target: BTreeMap<usize, Vec<(NodeId, NodeId)>> = BTreeMap::new();
        for &leaf in &unit.leaf_ids {
            let paired = map
                .target_of(leaf)
                .and_then(|t| target_index.get(&t).map(|&i| (t, i)));
            match paired {
                Some((target_leaf, target_unit)) => {
                    by_target.entry(target_unit).or_default().push((leaf, target_leaf));
                }
                None => dropped += 1,
            }
        }
        for (target_unit, pairs) in by_target {
            out.push(BilingualUnit {
                source_unit: source_index,
                target_unit,
                pairs,
            });
        }
    }

    debug!(
        pairs = out.len(),
        dropped, "bilingual zip complete; unaligned sentences dropped from bilingual sequence"
    );
    out
}
