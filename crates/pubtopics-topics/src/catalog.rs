//! Topic resolution and the keyword-defined taxonomy.
//!
//! A [`TopicResolver`] turns a concept store into an [`Assignment`]. The
//! keyword catalog here is one resolver; the cluster engine is the other.
//!
//! The keyword classifier is greedy and single-label: every concept whose name
//! contains any keyword of a topic adds its full score to that topic, a concept
//! may feed several topics at once, and the highest total wins. Results are
//! only as good as the keyword lists.

use std::collections::BTreeMap;

use pubtopics_types::{Assignment, ConceptRecord, TopicAssignment, TopicDefinition, TopicId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::error::TopicsError;
use crate::filter::is_allowed;
use crate::store::ConceptStore;

/// Which resolver produced an assignment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TopicMode {
    /// Fixed, human-authored taxonomy
    Keyword,
    /// Topics discovered by clustering
    Cluster,
}

impl std::fmt::Display for TopicMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TopicMode::Keyword => write!(f, "keyword"),
            TopicMode::Cluster => write!(f, "cluster"),
        }
    }
}

/// Assignment together with the concept records it was computed from.
///
/// Summaries must aggregate the same records the resolver saw, so the two
/// travel together.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Producing mode
    pub mode: TopicMode,
    /// Paper to topic mapping
    pub assignment: Assignment,
    /// Records the assignment was derived from
    pub concepts: ConceptStore,
}

/// Resolves papers to topic identifiers.
pub trait TopicResolver {
    /// Mode reported in run output.
    fn mode(&self) -> TopicMode;

    /// Assign every paper in the store to at most one topic.
    fn resolve(&self, store: &ConceptStore) -> Result<Resolution, TopicsError>;
}

/// Keyword-defined topic taxonomy.
///
/// Topics are held by ascending id; that order decides ties.
#[derive(Debug, Clone, Default)]
pub struct KeywordCatalog {
    topics: BTreeMap<TopicId, TopicDefinition>,
}

impl KeywordCatalog {
    /// Build a catalog, rejecting duplicate topic ids.
    pub fn new<I>(definitions: I) -> Result<Self, TopicsError>
    where
        I: IntoIterator<Item = TopicDefinition>,
    {
        let mut topics = BTreeMap::new();
        for definition in definitions {
            let topic_id = definition.topic_id;
            if topic_id == pubtopics_types::UNASSIGNED_TOPIC {
                return Err(TopicsError::InvalidInput(format!(
                    "topic id {topic_id} is reserved for unassigned papers"
                )));
            }
            if definition.keywords.is_empty() {
                debug!(topic_id, "Topic has no keywords and can never match");
            }
            if topics.insert(topic_id, definition).is_some() {
                return Err(TopicsError::InvalidInput(format!(
                    "duplicate topic id {topic_id}"
                )));
            }
        }
        Ok(Self { topics })
    }

    /// Defined topics in id order.
    pub fn topics(&self) -> impl Iterator<Item = &TopicDefinition> {
        self.topics.values()
    }

    /// Look up a topic by id.
    pub fn get(&self, topic_id: TopicId) -> Option<&TopicDefinition> {
        self.topics.get(&topic_id)
    }

    /// Number of defined topics.
    pub fn len(&self) -> usize {
        self.topics.len()
    }

    /// Check if the catalog defines no topic.
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// Accumulate keyword scores per topic for one paper.
    ///
    /// Only topics with at least one matching concept appear in the result,
    /// even when the matching scores sum to 0.
    pub fn score_paper(&self, concepts: &[ConceptRecord]) -> BTreeMap<TopicId, f64> {
        let mut scores: BTreeMap<TopicId, f64> = BTreeMap::new();

        for record in concepts {
            for topic in self.topics.values() {
                if is_allowed(&record.concept_name, &topic.keywords) {
                    *scores.entry(topic.topic_id).or_insert(0.0) += record.score;
                }
            }
        }

        scores
    }

    /// Pick the best topic for one paper.
    ///
    /// The strictly highest score wins; on ties the lowest topic id is kept.
    /// Papers without any keyword match resolve to the unassigned topic.
    pub fn classify(&self, concepts: &[ConceptRecord]) -> TopicAssignment {
        let scores = self.score_paper(concepts);

        let mut best: Option<(TopicId, f64)> = None;
        for (&topic_id, &score) in &scores {
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((topic_id, score)),
            }
        }

        match best {
            Some((topic_id, score)) => TopicAssignment {
                topic_id,
                score: Some(score),
            },
            None => TopicAssignment::unassigned(),
        }
    }
}

impl TopicResolver for KeywordCatalog {
    fn mode(&self) -> TopicMode {
        TopicMode::Keyword
    }

    #[instrument(skip_all, fields(topics = self.topics.len(), papers = store.paper_count()))]
    fn resolve(&self, store: &ConceptStore) -> Result<Resolution, TopicsError> {
        let mut assignment = Assignment::new();
        for topic in self.topics.values() {
            assignment.set_topic_name(topic.topic_id, topic.name.clone());
        }

        for (paper_id, concepts) in store.iter() {
            let resolved = self.classify(concepts);
            if resolved.is_unassigned() {
                debug!(paper_id = %paper_id, "No topic keyword matched");
            }
            assignment.insert(paper_id.clone(), resolved);
        }

        info!(
            assigned = assignment.len() - assignment.unassigned_count(),
            unassigned = assignment.unassigned_count(),
            "Keyword topic assignment complete"
        );

        Ok(Resolution {
            mode: TopicMode::Keyword,
            assignment,
            concepts: store.clone(),
        })
    }
}
