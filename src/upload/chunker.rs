use std::path::Path;

use crate::error::{AispecError, Result};

/// Separator between concatenated files, also the only place chunks are cut
pub const PART_SEPARATOR: &str = "\n\n";

/// Read each file and join them, every file followed by a blank line.
///
/// Any unreadable file aborts before anything is uploaded.
pub fn concat_files<P: AsRef<Path>>(paths: &[P]) -> Result<String> {
    let mut data = String::new();
    for path in paths {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            AispecError::Upload(format!("Error reading file {}: {}", path.display(), e))
        })?;
        data.push_str(&content);
        data.push_str(PART_SEPARATOR);
    }
    Ok(data)
}

/// Cut `data` into chunks of at most `max_bytes` UTF-8 bytes.
///
/// Each cut is made at the last blank-line separator that fits inside the
/// limit; the separator opens the following chunk. Fails when an oversized
/// remainder has no usable separator.
pub fn chunk_data(data: &str, max_bytes: usize) -> Result<Vec<String>> {
    if max_bytes == 0 {
        return Err(AispecError::InvalidInput("max_bytes must be greater than 0".to_string()));
    }

    let mut chunks = Vec::new();
    let mut rest = data;

    while rest.len() > max_bytes {
        // The separator is ASCII, so any match offset is a char boundary
        let split = rest.as_bytes()[..max_bytes]
            .windows(PART_SEPARATOR.len())
            .rposition(|w| w == PART_SEPARATOR.as_bytes());

        match split {
            Some(idx) if idx > 0 => {
                chunks.push(rest[..idx].to_string());
                rest = &rest[idx..];
            }
            _ => {
                return Err(AispecError::Upload(
                    "Unable to split the data into smaller parts".to_string(),
                ))
            }
        }
    }

    if !rest.is_empty() {
        chunks.push(rest.to_string());
    }
    Ok(chunks)
}
