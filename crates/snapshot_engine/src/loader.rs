use std::fs;
use std::io;
use std::path::Path;

use engine_logging::{engine_info, engine_warn};
use snapshot_core::{PlaceholderRuleSet, Record, ResourceManifest, SEARCH_AND_REPLACE_KEY};

use crate::types::ConfigError;

/// Read a YAML file into the record model, keeping key order.
///
/// An empty file reads as null.
pub fn read_yaml_record(path: &Path) -> Result<Record, ConfigError> {
    let yaml = read_yaml_value(path)?;
    into_record(path, yaml)
}

fn read_yaml_value(path: &Path) -> Result<serde_yaml::Value, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if text.trim().is_empty() {
        return Ok(serde_yaml::Value::Null);
    }
    serde_yaml::from_str(&text).map_err(|err| ConfigError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

fn into_record(path: &Path, yaml: serde_yaml::Value) -> Result<Record, ConfigError> {
    // Integer and boolean keys become strings on the way through.
    serde_json::to_value(yaml).map_err(|err| ConfigError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

/// Search needles must be YAML strings. Once converted, `8080: PORT` would be
/// indistinguishable from `'8080': PORT` and rewrite every `8080` substring.
fn drop_non_string_needles(path: &Path, yaml: &mut serde_yaml::Value) {
    let Some(items) = yaml
        .get_mut(SEARCH_AND_REPLACE_KEY)
        .and_then(serde_yaml::Value::as_sequence_mut)
    else {
        return;
    };
    for mapping in items.iter_mut().filter_map(serde_yaml::Value::as_mapping_mut) {
        mapping.retain(|search, _| {
            if !search.is_string() {
                engine_warn!(
                    "Ignoring non-string {} key {:?} in {:?}",
                    SEARCH_AND_REPLACE_KEY,
                    search,
                    path
                );
            }
            search.is_string()
        });
    }
}

/// Load `{group}-resources.yaml`. A missing or malformed manifest is fatal.
pub fn load_manifest(path: &Path) -> Result<ResourceManifest, ConfigError> {
    let record = match read_yaml_record(path) {
        Ok(record) => record,
        Err(ConfigError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
            return Err(ConfigError::ManifestMissing(path.to_path_buf()));
        }
        Err(ConfigError::Parse { message, .. }) => {
            return Err(ConfigError::ManifestInvalid {
                path: path.to_path_buf(),
                message,
            });
        }
        Err(err) => return Err(err),
    };

    let manifest =
        ResourceManifest::from_record(&record).map_err(|err| ConfigError::ManifestInvalid {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
    for kind in manifest.skipped_kinds() {
        engine_warn!("{} in {:?} is not a list, skipping", kind, path);
    }
    Ok(manifest)
}

/// Load `{group}-resources-placeholders.yaml`, degrading to an empty rule set
/// when the file is missing or unreadable.
pub fn load_placeholders(path: &Path) -> PlaceholderRuleSet {
    let record = read_yaml_value(path).and_then(|mut yaml| {
        drop_non_string_needles(path, &mut yaml);
        into_record(path, yaml)
    });
    match record {
        Ok(record) => {
            let rules = PlaceholderRuleSet::from_record(&record);
            engine_info!(
                "Loaded placeholders from {:?}: {} kinds, {} search/replace rules",
                path,
                rules.kind_count(),
                rules.search_and_replace().len()
            );
            rules
        }
        Err(ConfigError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
            engine_warn!(
                "Placeholder file {:?} not found, using empty placeholders",
                path
            );
            PlaceholderRuleSet::default()
        }
        Err(err) => {
            engine_warn!("Failed to load placeholder file: {}", err);
            PlaceholderRuleSet::default()
        }
    }
}
