//! Removal of cluster-generated and environment-specific fields.
//!
//! Every removal is best-effort: a missing container or key is a no-op, so
//! [`sanitize`] is total and idempotent.

use crate::record::{kind_of, mapping_at_mut, name_of};
use crate::Record;

/// Services whose name ends with this keep their cluster IPs.
pub const HEADLESS_SUFFIX: &str = "-headless";

/// A set of keys removed from the mapping found at `container`.
struct FieldRemoval {
    container: &'static [&'static str],
    keys: &'static [&'static str],
}

const POD_TEMPLATE_LABELS: &[&str] = &["pod-template-hash", "pod-template-generation"];

const COMMON_REMOVALS: &[FieldRemoval] = &[
    FieldRemoval {
        container: &["metadata"],
        keys: &[
            "resourceVersion",
            "uid",
            "generation",
            "creationTimestamp",
            "managedFields",
            "ownerReferences",
        ],
    },
    FieldRemoval {
        container: &["metadata", "annotations"],
        keys: &[
            "kubectl.kubernetes.io/last-applied-configuration",
            "deployment.kubernetes.io/revision",
            "kubernetes.io/change-cause",
            "cloud.google.com/neg",
            "cloud.google.com/neg-status",
            "volume.kubernetes.io/selected-node",
            "pv.kubernetes.io/bind-completed",
        ],
    },
    FieldRemoval {
        container: &["metadata", "labels"],
        keys: &["helm.sh/chart"],
    },
    FieldRemoval {
        container: &["spec", "template", "metadata", "labels"],
        keys: POD_TEMPLATE_LABELS,
    },
    FieldRemoval {
        container: &["spec", "template", "metadata", "annotations"],
        keys: &[
            "kubectl.kubernetes.io/restartedAt",
            "kubectl.kubernetes.io/last-applied-configuration",
        ],
    },
    FieldRemoval {
        container: &["spec", "template", "metadata"],
        keys: &["creationTimestamp"],
    },
    FieldRemoval {
        container: &["spec", "selector", "matchLabels"],
        keys: POD_TEMPLATE_LABELS,
    },
];

/// When a [`KindRule`] fires for a record of its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleCondition {
    Always,
    /// Fires unless `metadata.name` ends with the suffix.
    NameLacksSuffix(String),
}

impl RuleCondition {
    fn matches(&self, record: &Record) -> bool {
        match self {
            RuleCondition::Always => true,
            RuleCondition::NameLacksSuffix(suffix) => {
                !name_of(record).is_some_and(|name| name.ends_with(suffix.as_str()))
            }
        }
    }
}

/// Kind-specific removal: drop `keys` from `container` on records whose
/// `kind` field equals `kind` and whose condition holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindRule {
    pub kind: String,
    pub condition: RuleCondition,
    pub container: Vec<String>,
    pub keys: Vec<String>,
}

impl KindRule {
    pub fn new(
        kind: impl Into<String>,
        condition: RuleCondition,
        container: &[&str],
        keys: &[&str],
    ) -> Self {
        Self {
            kind: kind.into(),
            condition,
            container: container.iter().map(|s| s.to_string()).collect(),
            keys: keys.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Common removals plus a table of kind-specific rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sanitizer {
    kind_rules: Vec<KindRule>,
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self {
            kind_rules: vec![
                KindRule::new(
                    "Service",
                    RuleCondition::NameLacksSuffix(HEADLESS_SUFFIX.to_string()),
                    &["spec"],
                    &["clusterIP", "clusterIPs", "loadBalancerIP"],
                ),
                KindRule::new(
                    "PersistentVolumeClaim",
                    RuleCondition::Always,
                    &["spec"],
                    &["volumeName"],
                ),
            ],
        }
    }
}

impl Sanitizer {
    /// A sanitizer with the common removals only.
    pub fn without_kind_rules() -> Self {
        Self {
            kind_rules: Vec::new(),
        }
    }

    pub fn with_rule(mut self, rule: KindRule) -> Self {
        self.kind_rules.push(rule);
        self
    }

    pub fn kind_rules(&self) -> &[KindRule] {
        &self.kind_rules
    }

    pub fn sanitize(&self, mut record: Record) -> Record {
        for removal in COMMON_REMOVALS {
            remove_keys(&mut record, removal.container, removal.keys);
        }

        // Conditions read only `kind` and `metadata.name`, which no removal touches.
        let firing: Vec<&KindRule> = self
            .kind_rules
            .iter()
            .filter(|rule| kind_of(&record) == Some(rule.kind.as_str()))
            .filter(|rule| rule.condition.matches(&record))
            .collect();
        for rule in firing {
            let container: Vec<&str> = rule.container.iter().map(String::as_str).collect();
            let keys: Vec<&str> = rule.keys.iter().map(String::as_str).collect();
            remove_keys(&mut record, &container, &keys);
        }

        if let Some(top) = record.as_object_mut() {
            top.shift_remove("status");
        }
        record
    }
}

/// Sanitize with the built-in rule table.
pub fn sanitize(record: Record) -> Record {
    Sanitizer::default().sanitize(record)
}

fn remove_keys(record: &mut Record, container: &[&str], keys: &[&str]) {
    let Some(map) = mapping_at_mut(record, container) else {
        return;
    };
    for key in keys {
        // shift_remove keeps the remaining keys in source order.
        map.shift_remove(*key);
    }
}
