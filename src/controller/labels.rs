//! # Label Selector Parsing
//!
//! Parses the ingress selector annotation (`key=value,key2=value2`) into a
//! label set used to look up Ingress resources.

use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LabelParseError {
    #[error("invalid label spec: {0:?}")]
    InvalidPair(String),

    #[error("invalid label spec: {0:?} (empty key)")]
    EmptyKey(String),
}

/// Equality-based label set.
///
/// Duplicate keys overwrite earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSet(BTreeMap<String, String>);

impl LabelSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True if every label in the set is present with the same value in `labels`
    #[must_use]
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        self.0
            .iter()
            .all(|(key, value)| labels.get(key) == Some(value))
    }

    /// Selector string understood by the Kubernetes API (`k1=v1,k2=v2`)
    #[must_use]
    pub fn to_selector(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for LabelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, value) in &self.0 {
            if !first {
                f.write_str(",")?;
            }
            write!(f, "{key}={value}")?;
            first = false;
        }
        Ok(())
    }
}

/// Parse a comma-separated `key=value` list.
///
/// Whitespace around keys and values is trimmed. Values may be empty, keys may not.
///
/// # Errors
///
/// Returns the offending pair when it does not contain exactly one `=` or when
/// its key is empty.
pub fn parse_label_selector(selector: &str) -> Result<LabelSet, LabelParseError> {
    let mut labels = LabelSet::new();

    for pair in selector.split(',') {
        let parts: Vec<&str> = pair.trim().split('=').collect();
        let [key, value] = parts.as_slice() else {
            return Err(LabelParseError::InvalidPair(pair.to_string()));
        };

        let key = key.trim();
        if key.is_empty() {
            return Err(LabelParseError::EmptyKey(pair.to_string()));
        }

        labels.insert(key, value.trim());
    }

    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_two_pairs() {
        let labels = parse_label_selector("app=nginx,env=production").unwrap();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels.get("app"), Some("nginx"));
        assert_eq!(labels.get("env"), Some("production"));
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let labels = parse_label_selector(" app = nginx ,  env=production ").unwrap();
        assert_eq!(labels.get("app"), Some("nginx"));
        assert_eq!(labels.get("env"), Some("production"));
    }

    #[test]
    fn test_parse_allows_empty_value() {
        let labels = parse_label_selector("app=").unwrap();
        assert_eq!(labels.get("app"), Some(""));
    }

    #[test]
    fn test_parse_last_duplicate_wins() {
        let labels = parse_label_selector("app=nginx,app=envoy").unwrap();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels.get("app"), Some("envoy"));
    }

    #[test]
    fn test_parse_pair_without_equals_fails() {
        assert_eq!(
            parse_label_selector("app=nginx,bad"),
            Err(LabelParseError::InvalidPair("bad".to_string()))
        );
    }

    #[test]
    fn test_parse_pair_with_two_equals_fails() {
        assert_eq!(
            parse_label_selector("app=nginx=1"),
            Err(LabelParseError::InvalidPair("app=nginx=1".to_string()))
        );
    }

    #[test]
    fn test_parse_empty_key_fails() {
        assert_eq!(
            parse_label_selector("=x"),
            Err(LabelParseError::EmptyKey("=x".to_string()))
        );
        assert!(parse_label_selector("  =x").is_err());
    }

    #[test]
    fn test_parse_empty_string_fails() {
        assert!(matches!(
            parse_label_selector(""),
            Err(LabelParseError::InvalidPair(_))
        ));
    }

    #[test]
    fn test_parse_trailing_comma_fails() {
        assert!(parse_label_selector("app=nginx,").is_err());
    }

    #[test]
    fn test_error_names_offending_pair() {
        let err = parse_label_selector("app=nginx,bad").unwrap_err();
        assert_eq!(err.to_string(), "invalid label spec: \"bad\"");
    }

    #[test]
    fn test_selector_string_is_sorted() {
        let labels = parse_label_selector("env=production,app=nginx").unwrap();
        assert_eq!(labels.to_selector(), "app=nginx,env=production");
    }

    #[test]
    fn test_matches_requires_all_labels() {
        let selector = parse_label_selector("app=nginx,env=production").unwrap();

        let mut labels = BTreeMap::new();
        labels.insert("app".to_string(), "nginx".to_string());
        assert!(!selector.matches(&labels));

        labels.insert("env".to_string(), "production".to_string());
        labels.insert("team".to_string(), "edge".to_string());
        assert!(selector.matches(&labels));

        labels.insert("env".to_string(), "staging".to_string());
        assert!(!selector.matches(&labels));
    }
}
