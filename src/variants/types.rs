//! Variant engine types

use serde::{Deserialize, Deserializer, Serialize};

/// One accepted rule match inside a framed name
///
/// `start..end` is half-open. When the matched key ended on a token boundary,
/// `end` stops before that space and `shares_end` is set; a site starting
/// exactly there has `shares_start` set. A replacement of a `shares_end` site
/// that does not end in a space swallows the shared space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSite {
    /// Byte offset of the first matched character
    pub start: usize,
    /// Byte offset where the following literal text resumes
    pub end: usize,
    /// Index of the matched key in the compiled rule set
    pub key: usize,
    /// Leading space is shared with the previous site
    pub shares_start: bool,
    /// Trailing space is left for the following text
    pub shares_end: bool,
}

/// Duplicate-free list of variants in first-produced order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VariantSet {
    variants: Vec<String>,
}

impl VariantSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variant; returns false if it was already present
    pub fn insert(&mut self, variant: String) -> bool {
        if self.contains(&variant) {
            return false;
        }
        self.variants.push(variant);
        true
    }

    pub fn contains(&self, variant: &str) -> bool {
        self.variants.iter().any(|v| v == variant)
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.variants.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.variants
    }

    pub fn into_vec(self) -> Vec<String> {
        self.variants
    }
}

// goes through `insert` so duplicates in the input collapse
impl<'de> Deserialize<'de> for VariantSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Vec::<String>::deserialize(deserializer)?.into_iter().collect())
    }
}

impl FromIterator<String> for VariantSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = Self::new();
        for variant in iter {
            set.insert(variant);
        }
        set
    }
}

impl IntoIterator for VariantSet {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.variants.into_iter()
    }
}

impl<'a> IntoIterator for &'a VariantSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.variants.iter()
    }
}

/// One name processed for indexing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedName {
    /// Canonical stored form
    pub normalized: String,
    /// Additional index entries for the same place
    pub variants: VariantSet,
    /// Processing time (microseconds)
    pub elapsed_us: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_set_dedup() {
        let mut set = VariantSet::new();
        assert!(set.insert("a b".to_string()));
        assert!(set.insert("ab".to_string()));
        assert!(!set.insert("a b".to_string()));

        assert_eq!(set.len(), 2);
        assert_eq!(set.as_slice(), &["a b".to_string(), "ab".to_string()]);
    }

    #[test]
    fn test_variant_set_from_iter() {
        let set: VariantSet = ["x", "y", "x"].iter().map(|s| s.to_string()).collect();
        assert_eq!(set.into_vec(), vec!["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn test_variant_set_json() {
        let set: VariantSet = serde_json::from_str(r#"["a b", "ab", "a b"]"#).unwrap();
        assert_eq!(set.as_slice(), &["a b".to_string(), "ab".to_string()]);
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["a b","ab"]"#);
    }
}
