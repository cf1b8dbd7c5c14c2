//! Per-paper concept records.

use std::collections::BTreeMap;

use pubtopics_types::{ConceptRecord, PaperId};
use tracing::debug;

/// Concept records grouped by paper, papers in ascending id order.
///
/// Records keep their input order within a paper. The store is built once per
/// run and never mutated; filtering yields a new store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConceptStore {
    papers: BTreeMap<PaperId, Vec<ConceptRecord>>,
}

impl ConceptStore {
    /// Group records by paper.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = ConceptRecord>,
    {
        Self::from_records_capped(records, None)
    }

    /// Group records by paper, keeping at most `cap` concepts per paper.
    ///
    /// The bibliographic service lists concepts by relevance, so the first
    /// `cap` records of each paper are the ones kept.
    pub fn from_records_capped<I>(records: I, cap: Option<usize>) -> Self
    where
        I: IntoIterator<Item = ConceptRecord>,
    {
        let mut papers: BTreeMap<PaperId, Vec<ConceptRecord>> = BTreeMap::new();
        let mut dropped = 0usize;

        for record in records {
            let concepts = papers.entry(record.paper_id.clone()).or_default();
            match cap {
                Some(limit) if concepts.len() >= limit => dropped += 1,
                _ => concepts.push(record),
            }
        }

        if dropped > 0 {
            debug!(dropped, "Dropped concepts beyond per-paper cap");
        }

        Self { papers }
    }

    /// Keep only records matching the predicate.
    ///
    /// Papers left without records disappear from the new store.
    pub fn filter<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&ConceptRecord) -> bool,
    {
        let papers = self
            .papers
            .iter()
            .filter_map(|(paper_id, records)| {
                let kept: Vec<ConceptRecord> = records.iter().filter(|r| keep(r)).cloned().collect();
                (!kept.is_empty()).then(|| (paper_id.clone(), kept))
            })
            .collect();

        Self { papers }
    }

    /// Concepts of a single paper, empty if the paper is unknown.
    pub fn concepts_of(&self, paper_id: &str) -> &[ConceptRecord] {
        self.papers.get(paper_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Check whether the paper has any records.
    pub fn contains(&self, paper_id: &str) -> bool {
        self.papers.contains_key(paper_id)
    }

    /// Iterate papers and their records in paper id order.
    pub fn iter(&self) -> impl Iterator<Item = (&PaperId, &[ConceptRecord])> {
        self.papers.iter().map(|(id, records)| (id, records.as_slice()))
    }

    /// Paper ids in ascending order.
    pub fn paper_ids(&self) -> impl Iterator<Item = &PaperId> {
        self.papers.keys()
    }

    /// Number of papers with at least one record.
    pub fn paper_count(&self) -> usize {
        self.papers.len()
    }

    /// Total number of records.
    pub fn record_count(&self) -> usize {
        self.papers.values().map(Vec::len).sum()
    }

    /// Check if the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.papers.is_empty()
    }
}
