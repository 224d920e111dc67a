use serde_json::{Map, Value};

/// One fetched resource in memory. Key order is source order.
pub type Record = Value;

/// The record's own `kind` field, e.g. `Service`.
pub fn kind_of(record: &Record) -> Option<&str> {
    record.get("kind").and_then(Value::as_str)
}

/// The record's `metadata.name`.
pub fn name_of(record: &Record) -> Option<&str> {
    record
        .get("metadata")
        .and_then(|metadata| metadata.get("name"))
        .and_then(Value::as_str)
}

/// Walk `segments` through nested mappings and return the mapping at the end.
///
/// Returns `None` as soon as a segment is missing or a value is not a mapping.
pub fn mapping_at_mut<'a>(
    record: &'a mut Record,
    segments: &[&str],
) -> Option<&'a mut Map<String, Value>> {
    segments
        .iter()
        .try_fold(record, |current, segment| {
            current.as_object_mut()?.get_mut(*segment)
        })?
        .as_object_mut()
}
