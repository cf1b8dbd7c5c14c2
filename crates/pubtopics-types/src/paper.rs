//! Publication and concept records.

use serde::{Deserialize, Serialize};

/// Identifier of a work, e.g. `https://openalex.org/W2741809807`.
pub type PaperId = String;

/// A single publication of the target author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    /// Unique work identifier
    pub paper_id: PaperId,
    /// Display title
    #[serde(default)]
    pub title: String,
    /// Publication year, when known
    #[serde(default)]
    pub year: Option<i32>,
    /// Number of citing works reported upstream
    #[serde(default)]
    pub citation_count: Option<u32>,
    /// DOI URL or bare DOI
    #[serde(default)]
    pub doi: Option<String>,
}

impl Paper {
    /// Create a paper with only an id and title.
    pub fn new(paper_id: impl Into<PaperId>, title: impl Into<String>) -> Self {
        Self {
            paper_id: paper_id.into(),
            title: title.into(),
            year: None,
            citation_count: None,
            doi: None,
        }
    }
}

/// A concept tag attached to a paper by the bibliographic service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptRecord {
    /// Paper the concept belongs to
    pub paper_id: PaperId,
    /// Upstream concept identifier, if any
    #[serde(default)]
    pub concept_id: Option<String>,
    /// Free-text concept name
    pub concept_name: String,
    /// Relevance score in [0, 1]
    pub score: f64,
}

impl ConceptRecord {
    /// Create a record without an upstream concept id.
    pub fn new(paper_id: impl Into<PaperId>, concept_name: impl Into<String>, score: f64) -> Self {
        Self {
            paper_id: paper_id.into(),
            concept_id: None,
            concept_name: concept_name.into(),
            score,
        }
    }

    /// Lowercased concept name used for keyword matching.
    pub fn normalized_name(&self) -> String {
        self.concept_name.to_lowercase()
    }
}
