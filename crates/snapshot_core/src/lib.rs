//! Snapshot core: pure record transformations for portable manifests.
mod manifest;
mod path;
mod placeholder;
mod record;
mod sanitize;
mod search_replace;
mod state;

pub use manifest::{ManifestEntry, ManifestShapeError, ResourceManifest, NAMESPACES_KIND};
pub use path::{resolve, ResolvedField, PATH_DELIMITER};
pub use placeholder::{
    apply_placeholders, placeholder_token, PlaceholderRule, PlaceholderRuleSet, ResourceRules,
    SEARCH_AND_REPLACE_KEY,
};
pub use record::{kind_of, mapping_at_mut, name_of, Record};
pub use sanitize::{sanitize, KindRule, RuleCondition, Sanitizer, HEADLESS_SUFFIX};
pub use search_replace::{apply_search_replace, SearchReplaceRule, TemplateCorruption};
pub use state::{RunPhase, RunState};
