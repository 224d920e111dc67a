use snapshot_core::Record;

/// Render one record as a YAML document body (no `---` marker).
///
/// Keys stay in source order and multi-line strings come out as literal
/// blocks, which keeps the output stable and diff-friendly.
pub fn render_document(record: &Record) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(record)
}
