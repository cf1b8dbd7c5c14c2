//! Configuration loading for pubtopics.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! The default config file lives at ~/.config/pubtopics/config.toml.

use std::path::PathBuf;

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::error::PubTopicsError;

/// Domain keywords of the lab; concepts mentioning none of these are
/// dropped before clustering.
const DEFAULT_ALLOWED_KEYWORDS: &[&str] = &[
    "construct",
    "structure",
    "structural",
    "bridge",
    "precast",
    "prefab",
    "concrete",
    "digital",
    "twin",
    "monitor",
    "health",
    "ai",
    "learning",
    "automation",
    "3d",
    "printing",
];

/// Topic assignment and clustering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicsConfig {
    /// Upper bound on discovered clusters; the engine uses min(this, papers)
    #[serde(default = "default_max_clusters")]
    pub max_clusters: usize,

    /// Concepts kept per topic in the summary
    #[serde(default = "default_top_concepts")]
    pub top_concepts: usize,

    /// Keep at most this many concepts per paper, in input order.
    ///
    /// Off by default. `0` or `"none"` in a config file also means no cap.
    #[serde(
        default = "default_max_concepts_per_paper",
        deserialize_with = "deserialize_concept_cap"
    )]
    pub max_concepts_per_paper: Option<usize>,

    /// Allow-list applied to concept names before clustering
    #[serde(default = "default_allowed_keywords")]
    pub allowed_keywords: Vec<String>,
}

impl Default for TopicsConfig {
    fn default() -> Self {
        Self {
            max_clusters: default_max_clusters(),
            top_concepts: default_top_concepts(),
            max_concepts_per_paper: default_max_concepts_per_paper(),
            allowed_keywords: default_allowed_keywords(),
        }
    }
}

impl TopicsConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_clusters == 0 {
            return Err("max_clusters must be > 0".to_string());
        }
        if self.top_concepts == 0 {
            return Err("top_concepts must be > 0".to_string());
        }
        if self.max_concepts_per_paper == Some(0) {
            return Err("max_concepts_per_paper must be > 0 when set".to_string());
        }
        if self.allowed_keywords.iter().all(|k| k.trim().is_empty()) {
            return Err("allowed_keywords must contain at least one keyword".to_string());
        }
        Ok(())
    }
}

fn default_max_clusters() -> usize {
    4
}

fn default_top_concepts() -> usize {
    5
}

fn default_max_concepts_per_paper() -> Option<usize> {
    None
}

/// Accept a positive count, or `0`, `"none"` and empty for no cap.
fn deserialize_concept_cap<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Cap {
        Count(u64),
        Text(String),
    }

    match Option::<Cap>::deserialize(deserializer)? {
        None | Some(Cap::Count(0)) => Ok(None),
        Some(Cap::Count(n)) => usize::try_from(n).map(Some).map_err(de::Error::custom),
        Some(Cap::Text(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
                return Ok(None);
            }
            trimmed
                .parse::<usize>()
                .map(|n| (n > 0).then_some(n))
                .map_err(|_| {
                    de::Error::custom(format!(
                        "invalid max_concepts_per_paper `{text}`, expected a count or \"none\""
                    ))
                })
        }
    }
}

fn default_allowed_keywords() -> Vec<String> {
    DEFAULT_ALLOWED_KEYWORDS
        .iter()
        .map(|k| k.to_string())
        .collect()
}

/// Graph overlay settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Emit a topic node for unassigned papers (off by default)
    #[serde(default)]
    pub include_unassigned: bool,
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Directory output tables are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Topic pipeline settings
    #[serde(default)]
    pub topics: TopicsConfig,

    /// Overlay settings
    #[serde(default)]
    pub overlay: OverlayConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_output_dir() -> String {
    ".".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            output_dir: default_output_dir(),
            topics: TopicsConfig::default(),
            overlay: OverlayConfig::default(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/pubtopics/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (PUBTOPICS_*, nested keys joined by `__`)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, PubTopicsError> {
        let config_dir = ProjectDirs::from("", "", "pubtopics")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("log_level", default_log_level())
            .map_err(|e| PubTopicsError::Config(e.to_string()))?
            .set_default("output_dir", default_output_dir())
            .map_err(|e| PubTopicsError::Config(e.to_string()))?
            .set_default("topics.max_clusters", default_max_clusters() as i64)
            .map_err(|e| PubTopicsError::Config(e.to_string()))?
            .set_default("topics.top_concepts", default_top_concepts() as i64)
            .map_err(|e| PubTopicsError::Config(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // PUBTOPICS_LOG_LEVEL, PUBTOPICS_TOPICS__MAX_CLUSTERS, ...
        builder = builder.add_source(
            Environment::with_prefix("PUBTOPICS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| PubTopicsError::Config(e.to_string()))?;

        let settings: Settings = config
            .try_deserialize()
            .map_err(|e| PubTopicsError::Config(e.to_string()))?;

        settings.topics.validate().map_err(PubTopicsError::Config)?;
        Ok(settings)
    }

    /// Output directory as a path.
    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(&self.output_dir)
    }
}
