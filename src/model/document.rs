//! Document identity and metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a document, assigned at ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId(pub Uuid);

impl DocumentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

/// Corpus language, carried as the site's language tags.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Language {
    /// Purépecha (`tsz`).
    Purepecha,
    /// Spanish (`es`).
    Spanish,
    /// Any other tag; keeps the tree model corpus-generic.
    Other(String),
}

impl Language {
    pub fn tag(&self) -> &str {
        match self {
            Language::Purepecha => "tsz",
            Language::Spanish => "es",
            Language::Other(tag) => tag,
        }
    }
}

impl From<String> for Language {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "tsz" => Language::Purepecha,
            "es" => Language::Spanish,
            _ => Language::Other(tag),
        }
    }
}

impl From<Language> for String {
    fn from(language: Language) -> Self {
        language.tag().to_string()
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Metadata for one corpus document.
///
/// `dialect` is meaningful only for Purépecha sources; `source_url` and
/// `collected_at` record where and when the collector pulled the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMeta {
    /// Assigned at ingestion when absent from the input.
    #[serde(default)]
    pub id: DocumentId,
    pub title: String,
    pub language: Language,
    /// Free-form genre ("bible", "magazine", "news", "novel", ...).
    #[serde(default)]
    pub genre: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialect: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default = "Utc::now")]
    pub collected_at: DateTime<Utc>,
}

impl DocumentMeta {
    /// Create metadata for a new document with a fresh id.
    pub fn new(title: impl Into<String>, language: Language) -> Self {
        Self {
            id: DocumentId::new(),
            title: title.into(),
            language,
            genre: String::new(),
            dialect: None,
            source_url: None,
            collected_at: Utc::now(),
        }
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = genre.into();
        self
    }

    pub fn with_dialect(mut self, dialect: impl Into<String>) -> Self {
        self.dialect = Some(dialect.into());
        self
    }

    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }
}
