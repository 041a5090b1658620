//! YAML rule tables for classifying JSON values.
//!
//! A rule table lists cases in evaluation order. The first rule whose
//! condition holds decides the outcome; `otherwise` applies when none does.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//! name: "ticket priority"
//!
//! rules:
//!   - name: missing
//!     when: { kind: is, value: null }
//!     then: { kind: error, message: "priority is required" }
//!   - when: { kind: in, values: ["p0", "urgent"] }
//!     then: { kind: value, value: "page" }
//!   - when: { kind: between, min: 0, max: 3 }
//!     then: { kind: value, value: "queue" }
//!   - when: { kind: types, names: [string, number] }
//!     then: { kind: echo }
//!
//! otherwise: { kind: value, value: "ignore" }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::json::json_types;

/// Errors that can occur when loading YAML rule tables
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level YAML rule table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct RulesConfig {
    /// Configuration format version
    pub version: String,

    /// Optional rule table name
    #[serde(default)]
    pub name: Option<String>,

    /// Cases in evaluation order
    #[serde(default)]
    pub rules: Vec<RuleConfig>,

    /// Outcome when no rule matches
    #[serde(default)]
    pub otherwise: Option<OutcomeConfig>,
}

/// One case of a rule table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuleConfig {
    /// Label used in logs and rejection errors; defaults to `#<position>`
    #[serde(default)]
    pub name: Option<String>,

    pub when: ConditionConfig,

    pub then: OutcomeConfig,
}

/// Condition of a rule, tagged by `kind`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConditionConfig {
    /// Subject equals `value` (`null` matches an absent subject)
    Is {
        #[serde(default)]
        value: Value,
    },
    /// Subject equals any of `values`
    In { values: Vec<Value> },
    /// Subject has the named JSON type
    Type { name: String },
    /// Subject has any of the named JSON types
    Types { names: Vec<String> },
    /// Subject is a number within `[min, max]`
    Between { min: f64, max: f64 },
}

/// Outcome of a rule or of the `otherwise` default, tagged by `kind`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutcomeConfig {
    /// Produce a constant
    Value {
        #[serde(default)]
        value: Value,
    },
    /// Produce the subject itself
    Echo,
    /// Reject the subject
    Error { message: String },
}

impl RulesConfig {
    /// Load a YAML rule table from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse a YAML rule table from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: RulesConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the rule table
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        if self.rules.is_empty() && self.otherwise.is_none() {
            return Err(ConfigLoadError::Validation(
                "rule table needs at least one rule or an otherwise outcome".to_string(),
            ));
        }

        for (position, rule) in self.rules.iter().enumerate() {
            rule.when.validate(&rule.label(position))?;
        }
        Ok(())
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            rules: Vec::new(),
            otherwise: None,
        }
    }
}

impl RuleConfig {
    /// The rule's name, or `#<position>` (1-based) when unnamed.
    pub fn label(&self, position: usize) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("#{}", position + 1),
        }
    }
}

impl ConditionConfig {
    fn validate(&self, rule: &str) -> Result<(), ConfigLoadError> {
        let known = json_types();
        let check_name = |name: &String| {
            if known.contains(name) {
                Ok(())
            } else {
                Err(ConfigLoadError::Validation(format!(
                    "rule {rule}: unknown type `{name}`"
                )))
            }
        };

        match self {
            ConditionConfig::Is { .. } => {}
            ConditionConfig::In { values } => {
                if values.is_empty() {
                    warn!(rule, "rules_empty_value_set");
                }
            }
            ConditionConfig::Type { name } => check_name(name)?,
            ConditionConfig::Types { names } => {
                if names.is_empty() {
                    warn!(rule, "rules_empty_type_set");
                }
                names.iter().try_for_each(&check_name)?;
            }
            ConditionConfig::Between { min, max } => {
                if !min.is_finite() || !max.is_finite() {
                    return Err(ConfigLoadError::Validation(format!(
                        "rule {rule}: between bounds must be finite"
                    )));
                }
                if min > max {
                    return Err(ConfigLoadError::Validation(format!(
                        "rule {rule}: between min {min} exceeds max {max}"
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_valid_yaml() {
        let yaml = r#"
version: "1.0"
name: "test rules"
rules:
  - name: zero
    when: { kind: is, value: 0 }
    then: { kind: value, value: "zero" }
  - when: { kind: types, names: [string, "null"] }
    then: { kind: echo }
otherwise: { kind: error, message: "unsupported" }
"#;

        let config = RulesConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.name, Some("test rules".to_string()));
        assert_eq!(config.rules.len(), 2);
        assert_eq!(config.rules[0].when, ConditionConfig::Is { value: json!(0) });
        assert_eq!(config.rules[1].then, OutcomeConfig::Echo);
        assert_eq!(config.rules[1].label(1), "#2");
        assert_eq!(
            config.otherwise,
            Some(OutcomeConfig::Error {
                message: "unsupported".to_string()
            })
        );
    }

    #[test]
    fn test_load_from_file() {
        let yaml = r#"
version: "1"
otherwise: { kind: echo }
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(yaml.as_bytes()).unwrap();

        let config = RulesConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.version, "1");
        assert!(config.rules.is_empty());
    }

    #[test]
    fn test_null_value_condition() {
        let yaml = r#"
version: "1.0"
rules:
  - when: { kind: is, value: null }
    then: { kind: value }
"#;

        let config = RulesConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.rules[0].when, ConditionConfig::Is { value: Value::Null });
        assert_eq!(config.rules[0].then, OutcomeConfig::Value { value: Value::Null });
    }

    #[test]
    fn test_unsupported_version() {
        let yaml = r#"
version: "2.0"
otherwise: { kind: echo }
"#;

        let result = RulesConfig::from_yaml(yaml);
        assert!(matches!(result, Err(ConfigLoadError::UnsupportedVersion(v)) if v == "2.0"));
    }

    #[test]
    fn test_unknown_type_name() {
        let yaml = r#"
version: "1.0"
rules:
  - name: dates
    when: { kind: type, name: date }
    then: { kind: echo }
"#;

        let err = RulesConfig::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, ConfigLoadError::Validation(_)));
        assert!(err.to_string().contains("dates"));
        assert!(err.to_string().contains("date"));
    }

    #[test]
    fn test_invalid_between_bounds() {
        let yaml = r#"
version: "1.0"
rules:
  - when: { kind: between, min: 10, max: 1 }
    then: { kind: echo }
"#;

        let result = RulesConfig::from_yaml(yaml);
        assert!(matches!(result, Err(ConfigLoadError::Validation(_))));
    }

    #[test]
    fn test_empty_table_rejected() {
        let result = RulesConfig::from_yaml("version: \"1.0\"\n");
        assert!(matches!(result, Err(ConfigLoadError::Validation(_))));
    }

    #[test]
    fn test_unknown_condition_kind() {
        let yaml = r#"
version: "1.0"
rules:
  - when: { kind: matches, pattern: "a*" }
    then: { kind: echo }
"#;

        let result = RulesConfig::from_yaml(yaml);
        assert!(matches!(result, Err(ConfigLoadError::YamlParse(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = RulesConfig::from_file("/nonexistent/rules.yaml");
        assert!(matches!(result, Err(ConfigLoadError::FileRead(_))));
    }

    #[test]
    fn test_default_config() {
        let config = RulesConfig::default();
        assert_eq!(config.version, "1.0");
        assert!(config.rules.is_empty() && config.otherwise.is_none());
    }
}
