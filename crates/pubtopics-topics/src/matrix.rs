//! Dense paper x concept score matrix.

use std::collections::{BTreeMap, BTreeSet};

use pubtopics_types::PaperId;

use crate::store::ConceptStore;

/// Concept-score vectors of every paper in a store.
///
/// Rows follow paper id order, columns follow concept name order. Missing
/// (paper, concept) cells are 0; a concept tagged twice on the same paper is
/// averaged.
#[derive(Debug, Clone, PartialEq)]
pub struct ConceptMatrix {
    paper_ids: Vec<PaperId>,
    concepts: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl ConceptMatrix {
    /// Pivot a concept store into a dense matrix.
    pub fn from_store(store: &ConceptStore) -> Self {
        let concepts: Vec<String> = store
            .iter()
            .flat_map(|(_, records)| records.iter().map(|r| r.concept_name.clone()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let column: BTreeMap<&str, usize> = concepts
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();

        let mut paper_ids = Vec::with_capacity(store.paper_count());
        let mut rows = Vec::with_capacity(store.paper_count());

        for (paper_id, records) in store.iter() {
            let mut sums = vec![0.0f64; concepts.len()];
            let mut counts = vec![0u32; concepts.len()];

            for record in records {
                if let Some(&col) = column.get(record.concept_name.as_str()) {
                    sums[col] += record.score;
                    counts[col] += 1;
                }
            }

            let row = sums
                .into_iter()
                .zip(counts)
                .map(|(sum, count)| if count == 0 { 0.0 } else { sum / count as f64 })
                .collect();

            paper_ids.push(paper_id.clone());
            rows.push(row);
        }

        Self {
            paper_ids,
            concepts,
            rows,
        }
    }

    /// Row labels.
    pub fn paper_ids(&self) -> &[PaperId] {
        &self.paper_ids
    }

    /// Column labels.
    pub fn concepts(&self) -> &[String] {
        &self.concepts
    }

    /// Concept-score vectors, one per paper.
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Score of a concept on a paper, 0 when absent.
    pub fn value(&self, paper_id: &str, concept: &str) -> f64 {
        let row = self.paper_ids.iter().position(|p| p == paper_id);
        let col = self.concepts.iter().position(|c| c == concept);
        match (row, col) {
            (Some(r), Some(c)) => self.rows[r][c],
            _ => 0.0,
        }
    }

    /// Number of rows (papers).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the matrix has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pubtopics_types::ConceptRecord;

    #[test]
    fn test_pivot_fills_missing_cells() {
        let store = ConceptStore::from_records(vec![
            ConceptRecord::new("W2", "Concrete", 0.5),
            ConceptRecord::new("W1", "Bridge", 0.9),
            ConceptRecord::new("W1", "Concrete", 0.3),
        ]);
        let matrix = ConceptMatrix::from_store(&store);

        assert_eq!(matrix.paper_ids(), &["W1".to_string(), "W2".to_string()]);
        assert_eq!(matrix.concepts(), &["Bridge".to_string(), "Concrete".to_string()]);
        assert_eq!(matrix.rows()[0], vec![0.9, 0.3]);
        assert_eq!(matrix.rows()[1], vec![0.0, 0.5]);
        assert_eq!(matrix.value("W2", "Bridge"), 0.0);
    }

    #[test]
    fn test_pivot_averages_duplicates() {
        let store = ConceptStore::from_records(vec![
            ConceptRecord::new("W1", "Concrete", 0.2),
            ConceptRecord::new("W1", "Concrete", 0.6),
        ]);
        let matrix = ConceptMatrix::from_store(&store);
        assert_eq!(matrix.len(), 1);
        assert!((matrix.value("W1", "Concrete") - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_zero_score_paper_keeps_its_row() {
        let store = ConceptStore::from_records(vec![
            ConceptRecord::new("W1", "Concrete", 0.0),
            ConceptRecord::new("W2", "Bridge", 0.7),
        ]);
        let matrix = ConceptMatrix::from_store(&store);
        assert_eq!(matrix.len(), 2);
        assert!(matrix.rows()[0].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_empty_store() {
        let matrix = ConceptMatrix::from_store(&ConceptStore::default());
        assert!(matrix.is_empty());
        assert!(matrix.concepts().is_empty());
    }
}
