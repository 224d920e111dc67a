use serde_json::Value;

use crate::Record;

/// Kind whose first name is the namespace for the rest of the run.
pub const NAMESPACES_KIND: &str = "Namespaces";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub kind: String,
    pub names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ManifestShapeError {
    #[error("manifest is empty")]
    Empty,
    #[error("manifest must be a mapping of kind to names")]
    NotAMapping,
}

/// What to fetch: kinds in declared order, each with its resource names.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResourceManifest {
    entries: Vec<ManifestEntry>,
    skipped_kinds: Vec<String>,
}

impl ResourceManifest {
    /// Build from the manifest file's record form.
    ///
    /// Kinds whose value is not a sequence are remembered in
    /// [`ResourceManifest::skipped_kinds`]. Names are trimmed; blank and
    /// non-string names are dropped.
    pub fn from_record(record: &Record) -> Result<Self, ManifestShapeError> {
        let top = match record {
            Value::Null => return Err(ManifestShapeError::Empty),
            Value::Object(top) if top.is_empty() => return Err(ManifestShapeError::Empty),
            Value::Object(top) => top,
            _ => return Err(ManifestShapeError::NotAMapping),
        };

        let mut manifest = Self::default();
        for (kind, value) in top {
            let Some(items) = value.as_array() else {
                manifest.skipped_kinds.push(kind.clone());
                continue;
            };
            let names = items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect();
            manifest.entries.push(ManifestEntry {
                kind: kind.clone(),
                names,
            });
        }
        Ok(manifest)
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn skipped_kinds(&self) -> &[String] {
        &self.skipped_kinds
    }

    /// Every (kind, name) pair in fetch order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().flat_map(|entry| {
            entry
                .names
                .iter()
                .map(move |name| (entry.kind.as_str(), name.as_str()))
        })
    }

    pub fn resource_count(&self) -> usize {
        self.entries.iter().map(|entry| entry.names.len()).sum()
    }
}
