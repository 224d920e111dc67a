use std::collections::BTreeMap;

use serde_json::Value;

use crate::path::resolve;
use crate::search_replace::SearchReplaceRule;
use crate::Record;

/// Top-level key of the rule file holding the text-level substitution rules.
pub const SEARCH_AND_REPLACE_KEY: &str = "Search_and_Replace";

const TOKEN_DELIMITER: &str = "||";

/// Delimited token substituted for a literal value: `||NAME||`.
pub fn placeholder_token(name: &str) -> String {
    format!("{TOKEN_DELIMITER}{name}{TOKEN_DELIMITER}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderRule {
    /// Piped field path, see [`crate::resolve`].
    pub path: String,
    pub placeholder: String,
}

/// Rules for one named resource, in declared order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRules {
    pub name: String,
    pub rules: Vec<PlaceholderRule>,
}

/// Placeholder rules for every kind plus the global search/replace list.
///
/// Built once per run and only read afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlaceholderRuleSet {
    kinds: BTreeMap<String, Vec<ResourceRules>>,
    search_and_replace: Vec<SearchReplaceRule>,
}

impl PlaceholderRuleSet {
    /// Parse the rule file's record form. Malformed entries are dropped;
    /// anything that is not a mapping yields an empty set.
    ///
    /// ```yaml
    /// ConfigMaps:
    ///   - druid-config:
    ///       - data|LOG_DIR: DRUID_LOG_DIR
    /// Search_and_Replace:
    ///   - 10.0.0.1: CLUSTER_IP
    /// ```
    pub fn from_record(record: &Record) -> Self {
        let Some(top) = record.as_object() else {
            return Self::default();
        };

        let mut kinds = BTreeMap::new();
        let mut search_and_replace = Vec::new();
        for (key, value) in top {
            if key == SEARCH_AND_REPLACE_KEY {
                search_and_replace = parse_search_and_replace(value);
                continue;
            }
            // Non-sequence kinds are ignored, as if absent.
            if let Some(groups) = value.as_array() {
                kinds.insert(key.clone(), parse_resource_groups(groups));
            }
        }

        Self {
            kinds,
            search_and_replace,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty() && self.search_and_replace.is_empty()
    }

    pub fn kind_count(&self) -> usize {
        self.kinds.len()
    }

    /// Rules for `name` under `kind`. The first group naming the resource wins.
    pub fn rules_for(&self, kind: &str, name: &str) -> Option<&[PlaceholderRule]> {
        self.kinds
            .get(kind)?
            .iter()
            .find(|group| group.name == name)
            .map(|group| group.rules.as_slice())
    }

    pub fn search_and_replace(&self) -> &[SearchReplaceRule] {
        &self.search_and_replace
    }
}

/// Overwrite each addressed field with its placeholder token.
///
/// The original value is discarded. Unresolvable paths are skipped; when two
/// rules address the same field the later one wins.
pub fn apply_placeholders(
    mut record: Record,
    kind: &str,
    name: &str,
    ruleset: &PlaceholderRuleSet,
) -> Record {
    let Some(rules) = ruleset.rules_for(kind, name) else {
        return record;
    };
    for rule in rules {
        if let Some(field) = resolve(&mut record, &rule.path) {
            field.set(Value::String(placeholder_token(&rule.placeholder)));
        }
    }
    record
}

fn parse_resource_groups(groups: &[Value]) -> Vec<ResourceRules> {
    let mut parsed = Vec::new();
    for group in groups.iter().filter_map(Value::as_object) {
        for (name, rules) in group {
            // A group whose rules are not a list still shadows later groups.
            let rules = rules
                .as_array()
                .map(|items| parse_rule_items(items))
                .unwrap_or_default();
            parsed.push(ResourceRules {
                name: name.clone(),
                rules,
            });
        }
    }
    parsed
}

fn parse_rule_items(items: &[Value]) -> Vec<PlaceholderRule> {
    items
        .iter()
        .filter_map(Value::as_object)
        .flat_map(|item| item.iter())
        .filter_map(|(path, placeholder)| {
            scalar_text(placeholder).map(|placeholder| PlaceholderRule {
                path: path.clone(),
                placeholder,
            })
        })
        .collect()
}

fn parse_search_and_replace(value: &Value) -> Vec<SearchReplaceRule> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(Value::as_object)
        .flat_map(|item| item.iter())
        // An empty needle would match between every character.
        .filter(|(search, _)| !search.is_empty())
        .filter_map(|(search, placeholder)| {
            placeholder.as_str().map(|placeholder| SearchReplaceRule {
                search: search.clone(),
                placeholder: placeholder.to_string(),
            })
        })
        .collect()
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}
