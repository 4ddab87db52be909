//! Building document trees from ingestion output.
//!
//! Parsing raw sources happens upstream; what arrives here is a nested
//! (label, children-or-text) structure, consumed exactly once to build the
//! initial tree. Token counts are measured per leaf through the tokenizer
//! adapter and aggregated upward exactly once, in
//! [`TreeBuilder::finish`](crate::model::TreeBuilder::finish).

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{DocumentMeta, DocumentTree, Language, NodeId, TreeBuilder, SENTENCE_RANK};
use crate::segment::SentenceSegmenter;
use crate::tokenize::Tokenizer;

/// One node of the raw ingestion structure: either an interior level with
/// children, or a sentence with text. Depth ranks may be given explicitly;
/// absent ranks are inferred bottom-up (leaf = sentence rank, parent = one
/// above its tallest child), which always satisfies the rank invariant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawNode {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u8>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RawNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Leaf language when it differs from the document's.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
}

/// A complete raw document: metadata plus the structural breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDocument {
    pub meta: DocumentMeta,
    pub root: RawNode,
}

impl RawDocument {
    /// Build the document tree, measuring tokens through `tokenizer`.
    pub fn into_tree(self, tokenizer: &dyn Tokenizer) -> Result<DocumentTree> {
        build_document(self.meta, &self.root, tokenizer)
    }
}

/// Read a raw document from a JSON file.
pub fn load_raw(path: impl AsRef<Path>) -> Result<RawDocument> {
    let file = File::open(path)?;
    let raw = serde_json::from_reader(BufReader::new(file))?;
    Ok(raw)
}

/// Build a [`DocumentTree`] from a raw nested structure.
pub fn build_document(
    meta: DocumentMeta,
    raw: &RawNode,
    tokenizer: &dyn Tokenizer,
) -> Result<DocumentTree> {
    if raw.text.is_some() {
        return Err(Error::InvalidDocument(
            "document root cannot be a sentence".to_string(),
        ));
    }
    let document_language = meta.language.clone();
    let root_rank = raw.rank.unwrap_or_else(|| inferred_rank(raw));
    let mut builder = TreeBuilder::new(meta, raw.label.clone(), root_rank);
    for child in &raw.children {
        add_raw(&mut builder, NodeId::ROOT, child, &document_language, tokenizer)?;
    }
    Ok(builder.finish())
}

fn add_raw(
    builder: &mut TreeBuilder,
    parent: NodeId,
    raw: &RawNode,
    document_language: &Language,
    tokenizer: &dyn Tokenizer,
) -> Result<()> {
    match (&raw.text, raw.children.is_empty()) {
        (Some(text), true) => {
            let language = raw
                .language
                .clone()
                .unwrap_or_else(|| document_language.clone());
            let tokens = tokenizer.count_tokens(text, &language);
            builder.add_leaf(parent, text, language, tokens)?;
        }
        (None, false) => {
            let rank = raw.rank.unwrap_or_else(|| inferred_rank(raw));
            let id = builder.add_child(parent, raw.label.clone(), rank)?;
            for child in &raw.children {
                add_raw(builder, id, child, document_language, tokenizer)?;
            }
        }
        (Some(_), false) => {
            return Err(Error::InvalidDocument(format!(
                "node \"{}\" carries both text and children",
                raw.label
            )));
        }
        (None, true) => {
            return Err(Error::InvalidDocument(format!(
                "interior node \"{}\" has no children",
                raw.label
            )));
        }
    }
    Ok(())
}

/// Bottom-up rank inference: one above the tallest child.
fn inferred_rank(raw: &RawNode) -> u8 {
    if raw.text.is_some() {
        return SENTENCE_RANK;
    }
    raw.children
        .iter()
        .map(inferred_rank)
        .max()
        .unwrap_or(SENTENCE_RANK)
        + 1
}

/// Build the standard article tree from collector output: the article's
/// paragraphs, segmented into sentences.
///
/// Paragraphs whose segmentation yields nothing (only noise fragments) are
/// skipped rather than left as childless nodes.
pub fn article_tree(
    meta: DocumentMeta,
    paragraphs: &[&str],
    segmenter: &SentenceSegmenter,
    tokenizer: &dyn Tokenizer,
) -> Result<DocumentTree> {
    let language = meta.language.clone();
    let mut builder = TreeBuilder::new(meta, "article", 3);
    for paragraph in paragraphs {
        let sentences = segmenter.segment(paragraph);
        if sentences.is_empty() {
            continue;
        }
        let para = builder.add_child(NodeId::ROOT, "paragraph", 2)?;
        for sentence in sentences {
            let tokens = tokenizer.count_tokens(&sentence, &language);
            builder.add_leaf(para, &sentence, language.clone(), tokens)?;
        }
    }
    Ok(builder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenize::WhitespaceTokenizer;
    use crate::validate::validate;

    fn meta() -> DocumentMeta {
        DocumentMeta::new("ingest test", Language::Spanish)
    }

    #[test]
    fn test_build_from_json() {
        let raw: RawNode = serde_json::from_str(
            r#"{
                "label": "book",
                "children": [
                    {"label": "chapter", "children": [
                        {"label": "paragraph", "children": [
                            {"label": "sentence", "text": "uno dos tres"},
                            {"label": "sentence", "text": "cuatro"}
                        ]}
                    ]}
                ]
            }"#,
        )
        .unwrap();

        let tree = build_document(meta(), &raw, &WhitespaceTokenizer).unwrap();
        assert!(validate(&tree).is_ok());
        assert_eq!(tree.token_count(tree.root()), 4);
        assert_eq!(tree.node(tree.root()).unwrap().rank, 4);
    }

    #[test]
    fn test_explicit_ranks_win() {
        let raw: RawNode = serde_json::from_str(
            r#"{
                "label": "book",
                "rank": 5,
                "children": [
                    {"label": "paragraph", "rank": 2, "children": [
                        {"label": "sentence", "text": "hola mundo"}
                    ]}
                ]
            }"#,
        )
        .unwrap();
        let tree = build_document(meta(), &raw, &WhitespaceTokenizer).unwrap();
        assert!(validate(&tree).is_ok());
        assert_eq!(tree.node(tree.root()).unwrap().rank, 5);
    }

    #[test]
    fn test_mixed_node_rejected() {
        let raw: RawNode = serde_json::from_str(
            r#"{
                "label": "book",
                "children": [
                    {"label": "odd", "text": "hola", "children": [
                        {"label": "sentence", "text": "mundo"}
                    ]}
                ]
            }"#,
        )
        .unwrap();
        assert!(build_document(meta(), &raw, &WhitespaceTokenizer).is_err());
    }

    #[test]
    fn test_article_tree_segments_paragraphs() {
        let seg = SentenceSegmenter::new().keep_short();
        let tree = article_tree(
            meta(),
            &["Primera frase. Segunda frase", "Tercera frase aquí"],
            &seg,
            &WhitespaceTokenizer,
        )
        .unwrap();

        assert!(validate(&tree).is_ok());
        let leaves: Vec<_> = tree.leaves_in_order(tree.root()).collect();
        assert_eq!(leaves.len(), 3);
        assert_eq!(tree.token_count(tree.root()), 7);
    }

    #[test]
    fn test_empty_article_is_valid_empty_document() {
        let seg = SentenceSegmenter::new();
        let tree = article_tree(meta(), &[], &seg, &WhitespaceTokenizer).unwrap();
        assert!(validate(&tree).is_ok());
        assert!(tree.leaves_in_order(tree.root()).next().is_none());
    }
}
