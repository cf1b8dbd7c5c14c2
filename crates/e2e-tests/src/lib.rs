//! End-to-end test infrastructure for pubtopics.
//!
//! Provides a scratch-directory harness and a small fixture lab: a target
//! author, four papers with concept tags, a topic taxonomy and the citation
//! graph built from them.

use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use pubtopics_graph::{CitationGraph, CitationGraphBuilder, CitationRecord};
use pubtopics_topics::{ConceptStore, KeywordCatalog};
use pubtopics_types::{ConceptRecord, Paper, Settings, TopicDefinition};

/// Shared test harness for E2E tests.
///
/// Owns a temp directory for input tables and pipeline output.
pub struct TestHarness {
    /// Keeps temp dir alive for the lifetime of the harness
    pub _temp_dir: tempfile::TempDir,
    /// Root of the scratch directory
    pub root: PathBuf,
}

impl TestHarness {
    /// Create a new harness with an empty temp directory.
    pub fn new() -> Self {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        Self {
            _temp_dir: temp_dir,
            root,
        }
    }

    /// Write a file under the scratch root and return its path.
    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.root.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create fixture dir");
        }
        std::fs::write(&path, content).expect("Failed to write fixture");
        path
    }

    /// Settings writing output tables under `<root>/out`.
    pub fn settings(&self) -> Settings {
        Settings {
            output_dir: self.out_dir().to_string_lossy().into_owned(),
            ..Settings::default()
        }
    }

    /// Output directory used by [`TestHarness::settings`].
    pub fn out_dir(&self) -> PathBuf {
        self.root.join("out")
    }

    /// Write the fixture lab's works, concepts and topic tables.
    ///
    /// Returns (works, concepts, topics) paths.
    pub fn write_lab_tables(&self) -> (PathBuf, PathBuf, PathBuf) {
        let works = self.write(
            "orcid_works.csv",
            "\u{feff}work_id,doi,title,year,cited_by_count\n\
             W1,https://doi.org/10.1/w1,Durability of precast concrete joints,2019,12\n\
             W2,https://doi.org/10.1/w2,Bridge deck monitoring with deep learning,2021,7\n\
             W3,,Digital twin for modular construction,2022,3\n\
             W4,,Survey of museum visitors,2020,0\n",
        );
        let mut concepts = String::from("work_id,concept_id,concept_name,score\n");
        for record in lab_concepts() {
            concepts.push_str(&format!(
                "{},{},{},{}\n",
                record.paper_id,
                record.concept_id.unwrap_or_default(),
                record.concept_name,
                record.score
            ));
        }
        let concepts = self.write("paper_concepts.csv", &concepts);
        let topics = self.write(
            "topic_definition.csv",
            "topic_id,topic_name,keywords\n\
             0,structures,\"bridge, concrete, precast\"\n\
             1,intelligence,\"learning, monitor\"\n\
             2,digital construction,\"digital twin, modular\"\n",
        );
        (works, concepts, topics)
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Shorthand for a concept record.
pub fn concept(paper_id: &str, name: &str, score: f64) -> ConceptRecord {
    ConceptRecord::new(paper_id, name, score)
}

/// Fixture papers W1..W4; W4 has nothing to do with the lab's domain.
pub fn lab_papers() -> Vec<Paper> {
    vec![
        Paper::new("W1", "Durability of precast concrete joints"),
        Paper::new("W2", "Bridge deck monitoring with deep learning"),
        Paper::new("W3", "Digital twin for modular construction"),
        Paper::new("W4", "Survey of museum visitors"),
    ]
}

/// Concept tags for the fixture papers.
pub fn lab_concepts() -> Vec<ConceptRecord> {
    let mut records = vec![
        concept("W1", "Precast concrete", 0.91),
        concept("W1", "Durability", 0.55),
        concept("W1", "Materials science", 0.31),
        concept("W2", "Bridge deck", 0.82),
        concept("W2", "Deep learning", 0.77),
        concept("W2", "Structural health monitoring", 0.64),
        concept("W3", "Digital twin", 0.88),
        concept("W3", "Modular construction", 0.71),
        concept("W3", "Automation", 0.42),
        concept("W4", "Museum", 0.93),
        concept("W4", "Sociology", 0.40),
    ];
    for (i, record) in records.iter_mut().enumerate() {
        record.concept_id = Some(format!("C{i}"));
    }
    records
}

/// Concept store over [`lab_concepts`].
pub fn lab_store() -> ConceptStore {
    ConceptStore::from_records(lab_concepts())
}

/// Keyword catalog matching the topic table written by the harness.
pub fn lab_catalog() -> KeywordCatalog {
    KeywordCatalog::new([
        TopicDefinition::new(0, "structures", ["bridge", "concrete", "precast"])
            .expect("valid topic"),
        TopicDefinition::new(1, "intelligence", ["learning", "monitor"]).expect("valid topic"),
        TopicDefinition::new(2, "digital construction", ["digital twin", "modular"])
            .expect("valid topic"),
    ])
    .expect("valid catalog")
}

/// Citation records: two citing authors, one citing W1 twice.
pub fn lab_citations() -> Vec<CitationRecord> {
    let mut park = CitationRecord::new("A_park", "Park", "W1");
    park.institution = Some("KAIST".to_string());
    vec![
        park.clone(),
        CitationRecord {
            citing_work_id: Some("X2".to_string()),
            ..park
        },
        CitationRecord::new("A_lee", "Lee", "W2"),
        CitationRecord::new("A_lee", "Lee", "W3"),
    ]
}

/// Citation graph for the fixture lab.
pub fn lab_graph() -> CitationGraph {
    let mut builder = CitationGraphBuilder::new("A_kim", "Kim").orcid("0000-0001-0000-0000");
    for paper in lab_papers() {
        builder.add_work(&paper);
    }
    for record in lab_citations() {
        builder.add_citation(&record);
    }
    builder.build()
}

/// Deterministically shuffle records with a seed.
pub fn shuffled<T: Clone>(items: &[T], seed: u64) -> Vec<T> {
    let mut items = items.to_vec();
    let mut rng = StdRng::seed_from_u64(seed);
    items.shuffle(&mut rng);
    items
}
