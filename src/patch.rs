use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::config::Markers;

#[derive(Debug, Error)]
pub enum PatchError {
    #[error("Failed to access target file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not find marker {0:?} in target file")]
    MarkerNotFound(String),

    #[error("End marker {end:?} appears before start marker {start:?}")]
    MarkersOutOfOrder { start: String, end: String },
}

/// Replace the marked region of `content` with `fragment`.
///
/// The region runs from the start of the line holding the start marker (so
/// its indentation goes too) to just past the end marker. Everything outside
/// it is returned unchanged.
pub fn replace_region(content: &str, markers: &Markers, fragment: &str) -> Result<String, PatchError> {
    let start = content
        .find(&markers.start)
        .ok_or_else(|| PatchError::MarkerNotFound(markers.start.clone()))?;
    let end = content
        .find(&markers.end)
        .ok_or_else(|| PatchError::MarkerNotFound(markers.end.clone()))?;
    if end < start {
        return Err(PatchError::MarkersOutOfOrder {
            start: markers.start.clone(),
            end: markers.end.clone(),
        });
    }

    let region_start = content[..start].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let region_end = end + markers.end.len();
    debug!(region_start, region_end, "located marker region");

    let mut patched = String::with_capacity(content.len() - (region_end - region_start) + fragment.len());
    patched.push_str(&content[..region_start]);
    patched.push_str(fragment);
    patched.push_str(&content[region_end..]);
    Ok(patched)
}

/// Rewrite the marked region of the file at `path` with `fragment`.
///
/// The file is read once and written once; nothing is written when the
/// markers can't be found.
#[instrument(skip_all, fields(path = %path.display(), fragment_bytes = fragment.len()))]
pub fn patch(path: &Path, markers: &Markers, fragment: &str) -> Result<(), PatchError> {
    let content = fs::read_to_string(path)?;
    let patched = replace_region(&content, markers, fragment)?;
    fs::write(path, patched)?;
    info!("updated target file");
    Ok(())
}
