use serde_json::{Map, Value};

use crate::Record;

/// Separator between segments of a placeholder field path, e.g. `data|LOG_DIR`.
pub const PATH_DELIMITER: char = '|';

/// The mapping one level above an addressed field, plus the field's key.
///
/// The key may not exist yet; writing through [`ResolvedField::set`] inserts it.
#[derive(Debug)]
pub struct ResolvedField<'r, 'p> {
    pub container: &'r mut Map<String, Value>,
    pub key: &'p str,
}

impl ResolvedField<'_, '_> {
    pub fn get(&self) -> Option<&Value> {
        self.container.get(self.key)
    }

    /// Overwrite the field in place. An existing key keeps its position.
    pub fn set(self, value: Value) {
        self.container.insert(self.key.to_string(), value);
    }
}

/// Resolve a piped path like `spec|template|image` against `record`.
///
/// Every segment but the last must name a mapping. Paths with fewer than two
/// segments never resolve: a field is always addressed inside something.
pub fn resolve<'r, 'p>(record: &'r mut Record, path: &'p str) -> Option<ResolvedField<'r, 'p>> {
    let mut segments: Vec<&'p str> = path.split(PATH_DELIMITER).collect();
    if segments.len() < 2 {
        return None;
    }
    let key = segments.pop()?;

    let mut current = record;
    for segment in segments {
        current = current.as_object_mut()?.get_mut(segment)?;
    }
    let container = current.as_object_mut()?;
    Some(ResolvedField { container, key })
}
