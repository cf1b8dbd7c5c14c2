//! Topic identifiers, definitions and per-paper assignments.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::PubTopicsError;
use crate::paper::PaperId;

/// Identifier of a topic: a defined topic id or a cluster label.
pub type TopicId = i64;

/// Reserved id for papers that match no topic.
pub const UNASSIGNED_TOPIC: TopicId = -1;

/// A human-authored topic with its keyword list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicDefinition {
    /// Topic identifier, never [`UNASSIGNED_TOPIC`]
    pub topic_id: TopicId,
    /// Display name
    pub name: String,
    /// Lowercased, trimmed, non-empty keywords
    pub keywords: Vec<String>,
}

impl TopicDefinition {
    /// Create a definition, normalizing the keyword list.
    ///
    /// Returns an error if `topic_id` is the reserved unassigned id.
    pub fn new<I, S>(topic_id: TopicId, name: impl Into<String>, keywords: I) -> Result<Self, PubTopicsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if topic_id == UNASSIGNED_TOPIC {
            return Err(PubTopicsError::InvalidInput(format!(
                "topic id {UNASSIGNED_TOPIC} is reserved for unassigned papers"
            )));
        }

        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();

        Ok(Self {
            topic_id,
            name: name.into(),
            keywords,
        })
    }

    /// Create a definition from a comma-separated keyword column.
    pub fn from_keyword_list(
        topic_id: TopicId,
        name: impl Into<String>,
        keywords: &str,
    ) -> Result<Self, PubTopicsError> {
        Self::new(topic_id, name, keywords.split(','))
    }
}

/// The topic a single paper resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TopicAssignment {
    /// Assigned topic, or [`UNASSIGNED_TOPIC`]
    pub topic_id: TopicId,
    /// Accumulated keyword score (keyword mode only)
    pub score: Option<f64>,
}

impl TopicAssignment {
    /// Assignment to a topic with no score attached.
    pub fn topic(topic_id: TopicId) -> Self {
        Self {
            topic_id,
            score: None,
        }
    }

    /// Assignment to the reserved unassigned topic.
    pub fn unassigned() -> Self {
        Self::topic(UNASSIGNED_TOPIC)
    }

    /// Check if the paper matched no topic.
    pub fn is_unassigned(&self) -> bool {
        self.topic_id == UNASSIGNED_TOPIC
    }
}

/// Functional mapping from paper to topic.
///
/// Papers iterate in ascending id order so every derived artifact is
/// reproducible across runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    entries: BTreeMap<PaperId, TopicAssignment>,
    topic_names: BTreeMap<TopicId, String>,
}

impl Assignment {
    /// Create an empty assignment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a paper, replacing any previous assignment.
    pub fn insert(&mut self, paper_id: impl Into<PaperId>, assignment: TopicAssignment) {
        self.entries.insert(paper_id.into(), assignment);
    }

    /// Register a display name for a topic.
    pub fn set_topic_name(&mut self, topic_id: TopicId, name: impl Into<String>) {
        self.topic_names.insert(topic_id, name.into());
    }

    /// Get the assignment for a paper.
    pub fn get(&self, paper_id: &str) -> Option<&TopicAssignment> {
        self.entries.get(paper_id)
    }

    /// Resolve a paper's topic, falling back to [`UNASSIGNED_TOPIC`].
    pub fn topic_of(&self, paper_id: &str) -> TopicId {
        self.entries
            .get(paper_id)
            .map(|a| a.topic_id)
            .unwrap_or(UNASSIGNED_TOPIC)
    }

    /// Display name of a topic, if one is known.
    pub fn topic_name(&self, topic_id: TopicId) -> Option<&str> {
        self.topic_names.get(&topic_id).map(String::as_str)
    }

    /// All known topic names.
    pub fn topic_names(&self) -> &BTreeMap<TopicId, String> {
        &self.topic_names
    }

    /// Iterate assignments in paper id order.
    pub fn iter(&self) -> impl Iterator<Item = (&PaperId, &TopicAssignment)> {
        self.entries.iter()
    }

    /// Distinct topic ids present, ascending.
    pub fn topic_ids(&self) -> BTreeSet<TopicId> {
        self.entries.values().map(|a| a.topic_id).collect()
    }

    /// Papers assigned to the given topic, in paper id order.
    pub fn papers_for(&self, topic_id: TopicId) -> Vec<&PaperId> {
        self.entries
            .iter()
            .filter(|(_, a)| a.topic_id == topic_id)
            .map(|(paper_id, _)| paper_id)
            .collect()
    }

    /// Number of papers resolved to [`UNASSIGNED_TOPIC`].
    pub fn unassigned_count(&self) -> usize {
        self.entries.values().filter(|a| a.is_unassigned()).count()
    }

    /// Number of assigned papers (including unassigned ones).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no paper has been assigned.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One row of the per-topic concept summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicSummaryRow {
    /// Topic the concept summarizes
    pub topic_id: TopicId,
    /// Topic display name, when known
    pub topic_name: Option<String>,
    /// Concept name as tagged upstream
    pub concept_name: String,
    /// Mean score over the topic's papers carrying this concept
    pub mean_score: f64,
}
