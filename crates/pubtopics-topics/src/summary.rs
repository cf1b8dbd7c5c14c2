//! Per-topic concept summaries.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use pubtopics_types::{Assignment, TopicSummaryRow, UNASSIGNED_TOPIC};
use tracing::debug;

use crate::store::ConceptStore;

/// Default number of concepts kept per topic.
const DEFAULT_TOP_CONCEPTS: usize = 5;

/// Summarizes each topic by the concepts with the highest mean score.
///
/// Rows come out by topic id ascending, then mean score descending, then
/// concept name ascending. Unassigned papers and empty topics produce no rows.
#[derive(Debug, Clone)]
pub struct SummaryBuilder {
    top_concepts: usize,
}

impl SummaryBuilder {
    /// Create a builder keeping `top_concepts` rows per topic.
    pub fn new(top_concepts: usize) -> Self {
        Self { top_concepts }
    }

    /// Build summary rows from an assignment and the records it came from.
    pub fn build(&self, assignment: &Assignment, concepts: &ConceptStore) -> Vec<TopicSummaryRow> {
        let mut rows = Vec::new();

        for topic_id in assignment.topic_ids() {
            if topic_id == UNASSIGNED_TOPIC {
                continue;
            }

            let mut totals: BTreeMap<&str, (f64, u32)> = BTreeMap::new();
            for paper_id in assignment.papers_for(topic_id) {
                if !concepts.contains(paper_id) {
                    debug!(paper_id = %paper_id, topic_id, "Assigned paper has no concept records");
                    continue;
                }
                for record in concepts.concepts_of(paper_id) {
                    let entry = totals.entry(record.concept_name.as_str()).or_insert((0.0, 0));
                    entry.0 += record.score;
                    entry.1 += 1;
                }
            }

            let mut means: Vec<(&str, f64)> = totals
                .into_iter()
                .map(|(name, (sum, count))| (name, sum / f64::from(count)))
                .collect();

            means.sort_by(|a, b| {
                b.1.partial_cmp(&a.1)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| a.0.cmp(b.0))
            });
            means.truncate(self.top_concepts);

            let topic_name = assignment.topic_name(topic_id).map(str::to_string);
            rows.extend(means.into_iter().map(|(name, mean)| TopicSummaryRow {
                topic_id,
                topic_name: topic_name.clone(),
                concept_name: name.to_string(),
                mean_score: mean,
            }));
        }

        rows
    }
}

impl Default for SummaryBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_CONCEPTS)
    }
}
