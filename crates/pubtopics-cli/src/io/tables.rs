//! CSV tables: works, concepts, topic definitions, citations, and the
//! paper-topic and summary tables written back out.
//!
//! Inputs may start with a UTF-8 BOM; outputs are written with one so
//! spreadsheet tools pick the right encoding.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use pubtopics_graph::CitationRecord;
use pubtopics_topics::{AssignmentRow, TopicMode};
use pubtopics_types::{
    Assignment, ConceptRecord, Paper, PaperId, TopicAssignment, TopicDefinition, TopicSummaryRow,
    UNASSIGNED_TOPIC,
};

const BOM: &str = "\u{feff}";

#[derive(Debug, Deserialize)]
struct WorkRow {
    work_id: String,
    #[serde(default)]
    doi: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    year: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    cited_by_count: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ConceptRow {
    work_id: String,
    #[serde(default)]
    concept_id: Option<String>,
    #[serde(default)]
    concept_name: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    score: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct TopicRow {
    topic_id: i64,
    topic_name: String,
    #[serde(default)]
    keywords: String,
}

#[derive(Debug, Deserialize)]
struct PaperTopicRow {
    work_id: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    topic_id: Option<f64>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    topic_name: Option<String>,
}

/// Read a CSV file, dropping a leading BOM.
fn read_text(path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(content.trim_start_matches(BOM).to_string())
}

fn deserialize_rows<T>(path: &Path) -> Result<Vec<T>>
where
    T: for<'de> Deserialize<'de>,
{
    let content = read_text(path)?;
    let mut reader = csv::Reader::from_reader(content.as_bytes());
    let mut rows = Vec::new();
    for (line, result) in reader.deserialize().enumerate() {
        let row: T =
            result.with_context(|| format!("{}: bad row {}", path.display(), line + 2))?;
        rows.push(row);
    }
    Ok(rows)
}

/// Load the works table keyed by work id.
pub fn read_works(path: &Path) -> Result<BTreeMap<PaperId, Paper>> {
    let mut works = BTreeMap::new();
    for row in deserialize_rows::<WorkRow>(path)? {
        if row.work_id.is_empty() {
            debug!("Skipping work row without id");
            continue;
        }
        let paper = Paper {
            paper_id: row.work_id.clone(),
            title: row.title.unwrap_or_default(),
            year: row.year.map(|y| y as i32),
            citation_count: row.cited_by_count.map(|c| c as u32),
            doi: row.doi.filter(|d| !d.is_empty()),
        };
        works.insert(row.work_id, paper);
    }
    info!(works = works.len(), path = %path.display(), "Loaded works");
    Ok(works)
}

/// Load concept records; a missing score counts as 0.
pub fn read_concepts(path: &Path) -> Result<Vec<ConceptRecord>> {
    let mut records = Vec::new();
    for row in deserialize_rows::<ConceptRow>(path)? {
        let Some(concept_name) = row.concept_name.filter(|n| !n.is_empty()) else {
            debug!(work_id = %row.work_id, "Skipping concept row without name");
            continue;
        };
        records.push(ConceptRecord {
            paper_id: row.work_id,
            concept_id: row.concept_id.filter(|c| !c.is_empty()),
            concept_name,
            score: row.score.unwrap_or(0.0),
        });
    }
    info!(records = records.len(), path = %path.display(), "Loaded concepts");
    Ok(records)
}

/// Load topic definitions with comma-separated keywords.
pub fn read_topics(path: &Path) -> Result<Vec<TopicDefinition>> {
    deserialize_rows::<TopicRow>(path)?
        .into_iter()
        .map(|row| {
            TopicDefinition::from_keyword_list(row.topic_id, row.topic_name, &row.keywords)
                .with_context(|| format!("{}: invalid topic {}", path.display(), row.topic_id))
        })
        .collect()
}

/// Load citing-author to work records.
pub fn read_citations(path: &Path) -> Result<Vec<CitationRecord>> {
    let records = deserialize_rows::<CitationRecord>(path)?;
    info!(records = records.len(), path = %path.display(), "Loaded citations");
    Ok(records)
}

/// Load a paper-topic table back into an assignment plus paper titles.
///
/// Rows without a topic id resolve to the unassigned topic.
pub fn read_assignments(path: &Path) -> Result<(Assignment, BTreeMap<PaperId, String>)> {
    let mut assignment = Assignment::new();
    let mut titles = BTreeMap::new();

    for row in deserialize_rows::<PaperTopicRow>(path)? {
        if row.work_id.is_empty() {
            continue;
        }
        let topic_id = row.topic_id.map(|t| t as i64).unwrap_or(UNASSIGNED_TOPIC);
        if let Some(name) = row.topic_name.filter(|n| !n.is_empty()) {
            if assignment.topic_name(topic_id).is_none() {
                assignment.set_topic_name(topic_id, name);
            }
        }
        if let Some(title) = row.title.filter(|t| !t.is_empty()) {
            titles.insert(row.work_id.clone(), title);
        }
        assignment.insert(row.work_id, TopicAssignment::topic(topic_id));
    }

    info!(papers = assignment.len(), path = %path.display(), "Loaded assignments");
    Ok((assignment, titles))
}

fn create_writer(path: &Path) -> Result<csv::Writer<File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let mut file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    file.write_all(BOM.as_bytes())?;
    Ok(csv::Writer::from_writer(file))
}

/// Write the paper-topic table; `topic_name` only in keyword mode.
pub fn write_assignments(path: &Path, rows: &[AssignmentRow], mode: TopicMode) -> Result<()> {
    let mut writer = create_writer(path)?;
    let with_names = mode == TopicMode::Keyword;

    if with_names {
        writer.write_record(["work_id", "topic_id", "title", "topic_name"])?;
    } else {
        writer.write_record(["work_id", "topic_id", "title"])?;
    }

    for row in rows {
        let topic_id = row.topic_id.to_string();
        let title = row.title.as_deref().unwrap_or("");
        if with_names {
            let name = row.topic_name.as_deref().unwrap_or("");
            writer.write_record([row.paper_id.as_str(), &topic_id, title, name])?;
        } else {
            writer.write_record([row.paper_id.as_str(), &topic_id, title])?;
        }
    }

    writer.flush()?;
    info!(rows = rows.len(), path = %path.display(), "Wrote paper topics");
    Ok(())
}

/// Write the topic summary; `topic_name` only in keyword mode.
pub fn write_summary(path: &Path, rows: &[TopicSummaryRow], mode: TopicMode) -> Result<()> {
    let mut writer = create_writer(path)?;
    let with_names = mode == TopicMode::Keyword;

    if with_names {
        writer.write_record(["topic_id", "topic_name", "concept_name", "score"])?;
    } else {
        writer.write_record(["topic_id", "concept_name", "score"])?;
    }

    for row in rows {
        let topic_id = row.topic_id.to_string();
        let score = row.mean_score.to_string();
        if with_names {
            let name = row.topic_name.as_deref().unwrap_or("");
            writer.write_record([&topic_id, name, &row.concept_name, &score])?;
        } else {
            writer.write_record([&topic_id, &row.concept_name, &score])?;
        }
    }

    writer.flush()?;
    info!(rows = rows.len(), path = %path.display(), "Wrote topic summary");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_read_works_with_bom_and_float_years() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write(
            &dir,
            "works.csv",
            "\u{feff}work_id,doi,title,year,cited_by_count,cited_by_api_url\n\
             W1,https://doi.org/10.1/a,Precast joints,2021.0,12,https://api\n\
             W2,,Digital twins,,,\n",
        );
        let works = read_works(&path).unwrap();
        assert_eq!(works.len(), 2);
        assert_eq!(works["W1"].year, Some(2021));
        assert_eq!(works["W1"].citation_count, Some(12));
        assert_eq!(works["W2"].doi, None);
        assert_eq!(works["W2"].year, None);
    }

    #[test]
    fn test_read_concepts_defaults_score() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write(
            &dir,
            "concepts.csv",
            "work_id,concept_id,concept_name,score\n\
             W1,C1,Concrete,0.8\n\
             W1,C2,Bridge,\n\
             W2,C3,,0.4\n",
        );
        let records = read_concepts(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].score, 0.0);
        assert_eq!(records[0].concept_id.as_deref(), Some("C1"));
    }

    #[test]
    fn test_read_topics_splits_keywords() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write(
            &dir,
            "topics.csv",
            "topic_id,topic_name,keywords\n0,structures,\"Bridge, concrete\"\n",
        );
        let topics = read_topics(&path).unwrap();
        assert_eq!(topics[0].keywords, vec!["bridge", "concrete"]);
    }

    #[test]
    fn test_assignments_round_trip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out/paper_topics.csv");
        let rows = vec![
            AssignmentRow {
                paper_id: "W1".to_string(),
                topic_id: 0,
                title: Some("Precast, joints".to_string()),
                topic_name: Some("structures".to_string()),
            },
            AssignmentRow {
                paper_id: "W2".to_string(),
                topic_id: UNASSIGNED_TOPIC,
                title: None,
                topic_name: None,
            },
        ];
        write_assignments(&path, &rows, TopicMode::Keyword).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with(BOM));

        let (assignment, titles) = read_assignments(&path).unwrap();
        assert_eq!(assignment.topic_of("W1"), 0);
        assert_eq!(assignment.topic_of("W2"), UNASSIGNED_TOPIC);
        assert_eq!(assignment.topic_name(0), Some("structures"));
        assert_eq!(titles["W1"], "Precast, joints");
        assert!(!titles.contains_key("W2"));
    }

    #[test]
    fn test_cluster_summary_has_no_name_column() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("topic_summary.csv");
        let rows = vec![TopicSummaryRow {
            topic_id: 1,
            topic_name: None,
            concept_name: "Concrete".to_string(),
            mean_score: 0.5,
        }];
        write_summary(&path, &rows, TopicMode::Cluster).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let mut lines = raw.trim_start_matches(BOM).lines();
        assert_eq!(lines.next(), Some("topic_id,concept_name,score"));
        assert_eq!(lines.next(), Some("1,Concrete,0.5"));
    }
}
