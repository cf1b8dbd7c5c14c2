//! Allow-list filtering of concept names.

/// Check if a concept name contains any of the given keywords.
///
/// Matching is a case-insensitive substring test. Keywords are expected to be
/// lowercase already; see [`AllowList`] for a normalizing wrapper.
pub fn is_allowed<S: AsRef<str>>(concept_name: &str, keywords: &[S]) -> bool {
    let name = concept_name.to_lowercase();
    keywords.iter().any(|k| name.contains(k.as_ref()))
}

/// Normalized keyword allow-list applied before clustering.
#[derive(Debug, Clone, PartialEq)]
pub struct AllowList {
    keywords: Vec<String>,
}

impl AllowList {
    /// Build an allow-list; keywords are trimmed and lowercased and empty ones dropped.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    /// Check a concept name against the list.
    pub fn allows(&self, concept_name: &str) -> bool {
        is_allowed(concept_name, &self.keywords)
    }

    /// Normalized keywords.
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Check if the list has no usable keyword.
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}
