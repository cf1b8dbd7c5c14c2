//! End-to-end topic pipeline: resolve, summarize, report.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use pubtopics_types::{Assignment, Paper, PaperId, TopicId, TopicSummaryRow, TopicsConfig, UNASSIGNED_TOPIC};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::catalog::{TopicMode, TopicResolver};
use crate::error::TopicsError;
use crate::store::ConceptStore;
use crate::summary::SummaryBuilder;

/// Counts describing one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    /// Mode that produced the assignment
    pub mode: TopicMode,
    /// Papers with a resolved topic (including unassigned)
    pub paper_count: usize,
    /// Distinct real topics in the assignment
    pub topic_count: usize,
    /// Papers resolved to the unassigned topic
    pub unassigned_count: usize,
    /// Concept records the assignment was computed from
    pub concept_records: usize,
    /// Rows in the topic summary
    pub summary_rows: usize,
    /// When the run finished
    pub generated_at: DateTime<Utc>,
}

/// Everything a run derives from the concept store.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Producing mode
    pub mode: TopicMode,
    /// Paper to topic mapping
    pub assignment: Assignment,
    /// Top concepts per topic
    pub summary: Vec<TopicSummaryRow>,
    /// Run counts
    pub report: PipelineReport,
}

/// Runs a resolver and summarizes its result.
#[derive(Debug, Clone, Default)]
pub struct TopicPipeline {
    summary: SummaryBuilder,
}

impl TopicPipeline {
    /// Create a pipeline with an explicit summary builder.
    pub fn new(summary: SummaryBuilder) -> Self {
        Self { summary }
    }

    /// Create a pipeline from configuration.
    pub fn from_config(config: &TopicsConfig) -> Self {
        Self::new(SummaryBuilder::new(config.top_concepts))
    }

    /// Resolve topics and build the summary from the same concept records.
    ///
    /// # Errors
    ///
    /// Propagates resolver failures such as [`TopicsError::InsufficientData`].
    #[instrument(skip_all, fields(mode = %resolver.mode()))]
    pub fn run(
        &self,
        resolver: &dyn TopicResolver,
        store: &ConceptStore,
    ) -> Result<PipelineOutput, TopicsError> {
        let resolution = resolver.resolve(store)?;
        let summary = self.summary.build(&resolution.assignment, &resolution.concepts);

        let topic_count = resolution
            .assignment
            .topic_ids()
            .into_iter()
            .filter(|&t| t != UNASSIGNED_TOPIC)
            .count();

        let report = PipelineReport {
            mode: resolution.mode,
            paper_count: resolution.assignment.len(),
            topic_count,
            unassigned_count: resolution.assignment.unassigned_count(),
            concept_records: resolution.concepts.record_count(),
            summary_rows: summary.len(),
            generated_at: Utc::now(),
        };

        info!(
            papers = report.paper_count,
            topics = report.topic_count,
            unassigned = report.unassigned_count,
            summary_rows = report.summary_rows,
            "Topic pipeline complete"
        );

        Ok(PipelineOutput {
            mode: resolution.mode,
            assignment: resolution.assignment,
            summary,
            report,
        })
    }
}

/// One row of the paper-topic table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentRow {
    /// Paper identifier
    pub paper_id: PaperId,
    /// Resolved topic
    pub topic_id: TopicId,
    /// Title joined from the works table
    pub title: Option<String>,
    /// Topic name, keyword mode only
    pub topic_name: Option<String>,
}

/// Join an assignment with paper titles and topic names.
///
/// Papers missing from `papers` keep an empty title; the run continues.
pub fn assignment_rows(
    assignment: &Assignment,
    papers: &BTreeMap<PaperId, Paper>,
) -> Vec<AssignmentRow> {
    assignment
        .iter()
        .map(|(paper_id, resolved)| {
            let title = papers.get(paper_id).map(|p| p.title.clone());
            if title.is_none() {
                debug!(paper_id = %paper_id, "Paper missing from works table");
            }
            AssignmentRow {
                paper_id: paper_id.clone(),
                topic_id: resolved.topic_id,
                title,
                topic_name: assignment.topic_name(resolved.topic_id).map(str::to_string),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::KeywordCatalog;
    use crate::engine::ClusterEngine;
    use crate::filter::AllowList;
    use pubtopics_types::{ConceptRecord, TopicDefinition};

    fn store() -> ConceptStore {
        ConceptStore::from_records(vec![
            ConceptRecord::new("W1", "Concrete durability", 0.8),
            ConceptRecord::new("W1", "Machine learning", 0.3),
            ConceptRecord::new("W2", "Economics", 0.6),
            ConceptRecord::new("W3", "Bridge deck", 0.5),
            ConceptRecord::new("W3", "Digital twin", 0.9),
        ])
    }

    fn catalog() -> KeywordCatalog {
        KeywordCatalog::new(vec![
            TopicDefinition::from_keyword_list(0, "structures", "bridge,concrete").unwrap(),
            TopicDefinition::from_keyword_list(1, "digital", "digital,twin").unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn test_keyword_run_report() {
        let output = TopicPipeline::default().run(&catalog(), &store()).unwrap();
        assert_eq!(output.mode, TopicMode::Keyword);
        assert_eq!(output.report.paper_count, 3);
        assert_eq!(output.report.topic_count, 2);
        assert_eq!(output.report.unassigned_count, 1);
        assert_eq!(output.report.concept_records, 5);
        assert_eq!(output.report.summary_rows, output.summary.len());
        assert_eq!(output.assignment.topic_of("W3"), 1);
    }

    #[test]
    fn test_cluster_run_summarizes_filtered_concepts() {
        let engine = ClusterEngine::new(AllowList::new(["concrete", "bridge", "twin"]), 4).unwrap();
        let output = TopicPipeline::default().run(&engine, &store()).unwrap();
        assert_eq!(output.mode, TopicMode::Cluster);
        assert_eq!(output.report.paper_count, 2);
        assert_eq!(output.report.unassigned_count, 0);
        assert!(output
            .summary
            .iter()
            .all(|r| r.concept_name != "Machine learning" && r.concept_name != "Economics"));
    }

    #[test]
    fn test_cluster_run_propagates_insufficient_data() {
        let engine = ClusterEngine::new(AllowList::new(["twin"]), 4).unwrap();
        let err = TopicPipeline::default().run(&engine, &store()).unwrap_err();
        assert!(matches!(err, TopicsError::InsufficientData { papers: 1 }));
    }

    #[test]
    fn test_assignment_rows_join_titles() {
        let output = TopicPipeline::default().run(&catalog(), &store()).unwrap();
        let mut papers = BTreeMap::new();
        papers.insert("W1".to_string(), Paper::new("W1", "Durable concrete"));

        let rows = assignment_rows(&output.assignment, &papers);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].title.as_deref(), Some("Durable concrete"));
        assert_eq!(rows[0].topic_name.as_deref(), Some("structures"));
        assert_eq!(rows[1].title, None);
        assert_eq!(rows[1].topic_id, UNASSIGNED_TOPIC);
        assert_eq!(rows[1].topic_name, None);
    }

    #[test]
    fn test_report_serializes_mode() {
        let output = TopicPipeline::default().run(&catalog(), &store()).unwrap();
        let json = serde_json::to_value(&output.report).unwrap();
        assert_eq!(json["mode"], "keyword");
    }
}
