//! Rule tables compiled into matching chains over JSON values.

use std::path::Path;
use std::time::Instant;

use matcher::{Cases, Match, MatchError, Type, TypeRegistry, TypeTag, When};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn, Level};

use crate::config::{ConditionConfig, ConfigLoadError, OutcomeConfig, RulesConfig};
use crate::json::json_types;

/// Errors produced while classifying a subject.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuleError {
    /// No rule matched and the table has no default, or a result was
    /// filtered out.
    #[error(transparent)]
    Match(#[from] MatchError),

    /// A rule with an `error` outcome matched.
    #[error("rule {rule} rejected the subject: {message}")]
    Rejected { rule: String, message: String },
}

#[derive(Debug)]
enum Condition {
    Is(Value),
    In(Vec<Value>),
    Type(Type<Value, Value>),
    Types(Vec<TypeTag<Value>>),
    Between { min: f64, max: f64 },
}

#[derive(Debug, Clone)]
enum Outcome {
    Value(Value),
    Echo,
    Error(String),
}

#[derive(Debug)]
struct Rule {
    label: String,
    condition: Condition,
    outcome: Outcome,
}

/// A validated rule table ready to classify subjects.
#[derive(Debug)]
pub struct RuleSet {
    name: Option<String>,
    rules: Vec<Rule>,
    otherwise: Option<Outcome>,
}

impl RuleSet {
    /// Load and compile a YAML rule table.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let config = RulesConfig::from_file(path)?;
        Self::from_config(&config)
    }

    /// Compile a rule table, resolving type names against [`json_types`].
    pub fn from_config(config: &RulesConfig) -> Result<Self, ConfigLoadError> {
        config.validate()?;
        let registry = json_types();

        let rules = config
            .rules
            .iter()
            .enumerate()
            .map(|(position, rule)| {
                let label = rule.label(position);
                let condition = Condition::compile(&rule.when, &label, &registry)?;
                Ok(Rule {
                    label,
                    condition,
                    outcome: Outcome::from(&rule.then),
                })
            })
            .collect::<Result<Vec<_>, ConfigLoadError>>()?;

        info!(
            name = ?config.name,
            rules = rules.len(),
            has_default = config.otherwise.is_some(),
            "rules_loaded"
        );

        Ok(Self {
            name: config.name.clone(),
            rules,
            otherwise: config.otherwise.as_ref().map(Outcome::from),
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Classify `subject` with the first matching rule, falling back to the
    /// table's default.
    pub fn classify(&self, subject: Value) -> Result<Value, RuleError> {
        let start = Instant::now();
        let span = tracing::span!(Level::DEBUG, "rules.classify", rules = ?self.name);
        let _guard = span.enter();

        let result = self.evaluate(subject);
        let elapsed_micros = start.elapsed().as_micros();
        match &result {
            Ok(value) => debug!(result = %value, elapsed_micros, "classify_success"),
            Err(err) => warn!(error = %err, elapsed_micros, "classify_failure"),
        }
        result
    }

    fn evaluate(&self, subject: Value) -> Result<Value, RuleError> {
        let mut cases = Match::of(subject).returns::<Value>();
        for rule in &self.rules {
            cases = rule.apply(cases)?;
        }
        if let Some(outcome) = &self.otherwise {
            cases = outcome.apply_default(cases)?;
        }
        Ok(cases.get()?)
    }
}

impl Condition {
    fn compile(
        config: &ConditionConfig,
        rule: &str,
        registry: &TypeRegistry<Value>,
    ) -> Result<Self, ConfigLoadError> {
        let resolve = |name: &String| {
            registry.get(name).cloned().ok_or_else(|| {
                ConfigLoadError::Validation(format!("rule {rule}: unknown type `{name}`"))
            })
        };

        Ok(match config {
            ConditionConfig::Is { value } => Condition::Is(value.clone()),
            ConditionConfig::In { values } => Condition::In(values.clone()),
            ConditionConfig::Type { name } => {
                let tag = resolve(name)?;
                Condition::Type(Type::new(name.clone(), move |value: &Value| {
                    tag.accepts(value).then_some(value)
                }))
            }
            ConditionConfig::Types { names } => {
                Condition::Types(names.iter().map(resolve).collect::<Result<_, _>>()?)
            }
            ConditionConfig::Between { min, max } => Condition::Between {
                min: *min,
                max: *max,
            },
        })
    }

    fn attach(&self, cases: Cases<Value, Value>) -> When<Value, Value> {
        match self {
            Condition::Is(value) => cases.when_is(value.clone()),
            Condition::In(values) => cases.when_is_in(values.iter().cloned()),
            Condition::Type(ty) => cases.when_type(ty),
            Condition::Types(tags) => cases.when_type_in(tags),
            Condition::Between { min, max } => cases.when(|value: &Value| {
                value
                    .as_f64()
                    .is_some_and(|n| (*min..=*max).contains(&n))
            }),
        }
    }
}

impl Rule {
    fn apply(&self, cases: Cases<Value, Value>) -> Result<Cases<Value, Value>, RuleError> {
        let when = self.condition.attach(cases);
        match &self.outcome {
            Outcome::Value(value) => Ok(when.then_with(|| value.clone())),
            Outcome::Echo => Ok(when.then_apply(Value::clone)),
            Outcome::Error(message) => when.then_throw(|| RuleError::Rejected {
                rule: self.label.clone(),
                message: message.clone(),
            }),
        }
    }
}

impl Outcome {
    fn apply_default(&self, cases: Cases<Value, Value>) -> Result<Cases<Value, Value>, RuleError> {
        match self {
            Outcome::Value(value) => Ok(cases.otherwise_with(|| value.clone())),
            Outcome::Echo => Ok(cases.otherwise_apply(Value::clone)),
            Outcome::Error(message) => cases.otherwise_throw(|| RuleError::Rejected {
                rule: "otherwise".to_string(),
                message: message.clone(),
            }),
        }
    }
}

impl From<&OutcomeConfig> for Outcome {
    fn from(config: &OutcomeConfig) -> Self {
        match config {
            OutcomeConfig::Value { value } => Outcome::Value(value.clone()),
            OutcomeConfig::Echo => Outcome::Echo,
            OutcomeConfig::Error { message } => Outcome::Error(message.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table(yaml: &str) -> RuleSet {
        let config = RulesConfig::from_yaml(yaml).unwrap();
        RuleSet::from_config(&config).unwrap()
    }

    #[test]
    fn first_matching_rule_wins() {
        let rules = table(
            r#"
version: "1.0"
rules:
  - when: { kind: type, name: number }
    then: { kind: value, value: "number" }
  - when: { kind: type, name: integer }
    then: { kind: value, value: "integer" }
"#,
        );

        assert_eq!(rules.classify(json!(3)), Ok(json!("number")));
        assert_eq!(rules.len(), 2);
    }

    #[test]
    fn unmatched_subject_without_default_fails() {
        let rules = table(
            r#"
version: "1.0"
rules:
  - when: { kind: is, value: 1 }
    then: { kind: echo }
"#,
        );

        assert_eq!(
            rules.classify(json!(2)),
            Err(RuleError::Match(MatchError::NoMatch { cases: 1 }))
        );
    }

    #[test]
    fn error_outcome_names_the_rule() {
        let rules = table(
            r#"
version: "1.0"
rules:
  - name: no-nulls
    when: { kind: is, value: null }
    then: { kind: error, message: "null not allowed" }
otherwise: { kind: echo }
"#,
        );

        assert_eq!(
            rules.classify(Value::Null),
            Err(RuleError::Rejected {
                rule: "no-nulls".to_string(),
                message: "null not allowed".to_string(),
            })
        );
        assert_eq!(rules.classify(json!("ok")), Ok(json!("ok")));
    }

    #[test]
    fn default_error_outcome() {
        let rules = table(
            r#"
version: "1.0"
rules:
  - when: { kind: types, names: [string, bool] }
    then: { kind: echo }
otherwise: { kind: error, message: "unsupported" }
"#,
        );

        assert_eq!(rules.classify(json!(true)), Ok(json!(true)));
        let err = rules.classify(json!([1])).unwrap_err();
        assert_eq!(err.to_string(), "rule otherwise rejected the subject: unsupported");
    }

    #[test]
    fn between_is_inclusive_and_numeric_only() {
        let rules = table(
            r#"
version: "1.0"
rules:
  - when: { kind: between, min: 0, max: 10 }
    then: { kind: value, value: "small" }
  - when: { kind: in, values: ["10", 11] }
    then: { kind: value, value: "listed" }
otherwise: { kind: value, value: "other" }
"#,
        );

        assert_eq!(rules.classify(json!(0)), Ok(json!("small")));
        assert_eq!(rules.classify(json!(10.0)), Ok(json!("small")));
        assert_eq!(rules.classify(json!(11)), Ok(json!("listed")));
        assert_eq!(rules.classify(json!("10")), Ok(json!("listed")));
        assert_eq!(rules.classify(json!(-0.5)), Ok(json!("other")));
    }

    #[test]
    fn rule_set_metadata() {
        let rules = table(
            r#"
version: "1"
name: passthrough
otherwise: { kind: echo }
"#,
        );

        assert_eq!(rules.name(), Some("passthrough"));
        assert!(rules.is_empty());
        assert!(format!("{rules:?}").contains("passthrough"));
        assert_eq!(rules.classify(json!({"a": 1})), Ok(json!({"a": 1})));
    }
}
