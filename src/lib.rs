//! # jatzingueni
//!
//! Core model for the J'atzingueni Purépecha-Spanish parallel corpus:
//! hierarchical document trees, token-budgeted span extraction, and the
//! processing-status workflow.
//!
//! ## Features
//!
//! - Arena-backed document trees with cached token aggregates, for works of
//!   any shape and depth (a five-level bible book, a two-level pamphlet)
//! - Structural validation with typed invariant failures
//! - Token-budgeted extraction of training-ready spans that never split a
//!   sentence, plus fixed-label extraction (every chapter, every paragraph)
//! - Bilingual pairing of extracted spans through sentence alignments
//! - A processing-status state machine with an audit record per transition
//!
//! ## Quick Start
//!
//! ```
//! use std::sync::Arc;
//!
//! use jatzingueni::extract::{extract, ExtractionPolicy};
//! use jatzingueni::ingest::article_tree;
//! use jatzingueni::model::{DocumentMeta, Language};
//! use jatzingueni::segment::SentenceSegmenter;
//! use jatzingueni::tokenize::WhitespaceTokenizer;
//! use jatzingueni::validate::certify;
//!
//! let meta = DocumentMeta::new("Kurhamukua", Language::Purepecha);
//! let tree = article_tree(
//!     meta,
//!     &["Iásï, ju je exeni ambechi uaa jorhenguarhini. Ima kaxumbitiispti"],
//!     &SentenceSegmenter::new().keep_short(),
//!     &WhitespaceTokenizer,
//! )
//! .unwrap();
//!
//! // Validation certifies the snapshot; extraction only accepts certified
//! // trees.
//! let certified = certify(Arc::new(tree)).unwrap();
//! let units: Vec<_> = extract(&certified, &ExtractionPolicy::budgeted(1, 100)).collect();
//! assert_eq!(units.len(), 1);
//! ```
//!
//! ## Working with budgets
//!
//! A [`extract::ExtractionPolicy`] pairs a mode, `fixed_label("chapter")`
//! or `budgeted(min, max)`, with boundary labels that units must never
//! straddle. Sentences are the minimal unit: a single sentence over budget
//! comes back whole, flagged `oversized`, rather than split.

pub mod error;
pub mod extract;
pub mod ingest;
pub mod model;
pub mod segment;
pub mod status;
pub mod tokenize;
pub mod validate;

pub use error::{Error, Result};
pub use extract::{extract, ExtractedUnit, ExtractionMode, ExtractionPolicy, UnitFlags};
pub use model::{
    DocumentId, DocumentMeta, DocumentTree, Language, NodeId, TreeBuilder, TreeHandle,
};
pub use status::{MemoryStatusStore, ProcessingStatus, StatusStore};
pub use validate::{certify, validate, CertifiedTree, ValidationError};
