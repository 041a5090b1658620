//! Umbrella crate for `casematch`.
//!
//! Re-exports the matching engine from the `matcher` crate and layers JSON
//! type descriptors and YAML rule tables on top of it, so callers can
//! classify `serde_json::Value`s with a declarative, first-match-wins table.

pub mod config;
pub mod json;
pub mod rules;

pub use config::{ConditionConfig, ConfigLoadError, OutcomeConfig, RuleConfig, RulesConfig};
pub use json::json_types;
pub use matcher::{
    set_match_metrics, Applicable, Applied, CaseKind, Cases, Dynamic, Match, MatchError,
    MatchMetrics, MatchState, Type, TypeRegistry, TypeTag, When,
};
pub use rules::{RuleError, RuleSet};
