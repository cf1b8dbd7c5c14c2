//! Topic discovery by clustering concept vectors.

use pubtopics_types::{Assignment, TopicAssignment, TopicId, TopicsConfig};
use tracing::{debug, info, instrument, warn};

use crate::agglomerative::average_linkage;
use crate::catalog::{Resolution, TopicMode, TopicResolver};
use crate::error::TopicsError;
use crate::filter::AllowList;
use crate::matrix::ConceptMatrix;
use crate::similarity::pairwise_distances;
use crate::store::ConceptStore;

/// Minimum papers needed to form a distance matrix worth clustering.
const MIN_PAPERS: usize = 2;

/// Discovers topics when no taxonomy is defined.
///
/// Concepts outside the lab's domain are dropped first, otherwise generic
/// high-frequency concepts dominate the similarity. The surviving concept
/// vectors are compared by cosine distance and grouped with average-linkage
/// agglomerative clustering into `min(max_clusters, papers)` topics.
///
/// Cluster labels are opaque. They are reproducible for identical input, but
/// adding or removing papers can renumber every cluster.
#[derive(Debug, Clone)]
pub struct ClusterEngine {
    allow_list: AllowList,
    max_clusters: usize,
}

impl ClusterEngine {
    /// Create an engine with an explicit allow-list.
    pub fn new(allow_list: AllowList, max_clusters: usize) -> Result<Self, TopicsError> {
        if max_clusters == 0 {
            return Err(TopicsError::InvalidConfig(
                "max_clusters must be > 0".to_string(),
            ));
        }
        if allow_list.is_empty() {
            return Err(TopicsError::InvalidConfig(
                "allow-list must contain at least one keyword".to_string(),
            ));
        }
        Ok(Self {
            allow_list,
            max_clusters,
        })
    }

    /// Create an engine from configuration.
    pub fn from_config(config: &TopicsConfig) -> Result<Self, TopicsError> {
        Self::new(AllowList::new(&config.allowed_keywords), config.max_clusters)
    }

    /// Drop concepts outside the allow-list.
    pub fn filter(&self, store: &ConceptStore) -> ConceptStore {
        store.filter(|r| self.allow_list.allows(&r.concept_name))
    }

    /// Number of clusters produced for `papers` points.
    pub fn cluster_count(&self, papers: usize) -> usize {
        self.max_clusters.min(papers)
    }
}

impl TopicResolver for ClusterEngine {
    fn mode(&self) -> TopicMode {
        TopicMode::Cluster
    }

    #[instrument(skip_all, fields(papers = store.paper_count(), max_clusters = self.max_clusters))]
    fn resolve(&self, store: &ConceptStore) -> Result<Resolution, TopicsError> {
        let filtered = self.filter(store);
        info!(
            records = filtered.record_count(),
            dropped = store.record_count() - filtered.record_count(),
            "Filtered concepts by allow-list"
        );

        let matrix = ConceptMatrix::from_store(&filtered);
        if matrix.len() < MIN_PAPERS {
            warn!(papers = matrix.len(), "Too few papers left to cluster");
            return Err(TopicsError::InsufficientData {
                papers: matrix.len(),
            });
        }

        let distances = pairwise_distances(matrix.rows());
        let k = self.cluster_count(matrix.len());
        debug!(
            papers = matrix.len(),
            concepts = matrix.concepts().len(),
            clusters = k,
            "Clustering concept matrix"
        );

        let labels = average_linkage(&distances, k)?;

        let mut assignment = Assignment::new();
        for (paper_id, label) in matrix.paper_ids().iter().zip(labels) {
            assignment.insert(paper_id.clone(), TopicAssignment::topic(label as TopicId));
        }

        info!(
            papers = assignment.len(),
            topics = k,
            "Cluster topic assignment complete"
        );

        Ok(Resolution {
            mode: TopicMode::Cluster,
            assignment,
            concepts: filtered,
        })
    }
}
