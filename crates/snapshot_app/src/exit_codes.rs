//! Process exit codes.

use snapshot_engine::ExtractError;

pub const SUCCESS: u8 = 0;
/// Cluster access, corrupted template or output failure.
pub const EXTRACTION_FAILED: u8 = 1;
/// Missing or malformed configuration (clap also uses 2 for usage errors).
pub const CONFIG_ERROR: u8 = 2;

pub fn for_error(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<ExtractError>() {
        Some(ExtractError::Config(_)) => CONFIG_ERROR,
        _ => EXTRACTION_FAILED,
    }
}
