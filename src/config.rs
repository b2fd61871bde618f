use serde::Deserialize;

/// Prefix that marks a keyword as an eager-load directive.
pub const DEFAULT_RELATION_PREFIX: &str = "with_";

/// Behaviour switches shared by the sync and async CRUD helpers.
///
/// Deserialisable so applications can keep it next to their own settings;
/// missing keys fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CrudConfig {
    /// Keywords starting with this prefix load the named relation instead of
    /// filtering on a column.
    pub relation_prefix: String,
    /// Reject keywords that do not name a column. When false they are
    /// skipped with a warning.
    pub strict_columns: bool,
}

impl Default for CrudConfig {
    fn default() -> Self {
        Self {
            relation_prefix: DEFAULT_RELATION_PREFIX.to_string(),
            strict_columns: true,
        }
    }
}

impl CrudConfig {
    #[must_use]
    pub fn relation_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.relation_prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn strict_columns(mut self, strict: bool) -> Self {
        self.strict_columns = strict;
        self
    }

    /// Returns the relation name if `key` is an eager-load keyword.
    pub(crate) fn relation_key<'k>(&self, key: &'k str) -> Option<&'k str> {
        if self.relation_prefix.is_empty() {
            return None;
        }
        key.strip_prefix(self.relation_prefix.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = CrudConfig::default();
        assert_eq!(config.relation_prefix, "with_");
        assert!(config.strict_columns);
    }

    #[test]
    fn deserialise_partial() {
        let config: CrudConfig = serde_json::from_str(r#"{"strict_columns": false}"#).unwrap();
        assert_eq!(config.relation_prefix, DEFAULT_RELATION_PREFIX);
        assert!(!config.strict_columns);
    }

    #[test]
    fn relation_key_strips_prefix() {
        let config = CrudConfig::default();
        assert_eq!(config.relation_key("with_books"), Some("books"));
        assert_eq!(config.relation_key("name"), None);
        assert_eq!(config.relation_key("without"), None);

        let custom = CrudConfig::default().relation_prefix("load:");
        assert_eq!(custom.relation_key("load:books"), Some("books"));
        assert_eq!(custom.relation_key("with_books"), None);
    }

    #[test]
    fn empty_prefix_disables_relation_keys() {
        let config = CrudConfig::default().relation_prefix("");
        assert_eq!(config.relation_key("with_books"), None);
    }
}
