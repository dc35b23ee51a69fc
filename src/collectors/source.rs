//! Line-oriented reader for kernel tables under `/proc/net`

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{trace, warn};

use crate::errors::SourceError;

/// Lines read from one source, bounded by a maximum line count
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceLines {
    pub lines: Vec<String>,
    /// Set when the source held more lines than the reader was allowed to keep
    pub truncated: bool,
}

impl SourceLines {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }
}

/// Reads at most `max_lines` lines from `path`
///
/// Each line is cut at its first NUL or line terminator. Bytes that are not
/// valid UTF-8 are replaced rather than rejected.
///
/// # Arguments
///
/// * `path` - File to read, normally under `/proc/net`
/// * `max_lines` - Maximum number of lines to keep, header lines included
///
/// # Returns
///
/// * `Ok(SourceLines)` with the kept lines, `truncated` set if more remained
/// * `Err(SourceError::Unavailable)` if the file cannot be opened or read
pub fn read_source(path: impl AsRef<Path>, max_lines: usize) -> Result<SourceLines, SourceError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| SourceError::Unavailable {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = BufReader::new(file);
    let mut lines = Vec::new();
    let mut truncated = false;
    let mut raw = Vec::new();

    loop {
        raw.clear();
        let read = reader
            .read_until(b'\n', &mut raw)
            .map_err(|source| SourceError::Unavailable {
                path: path.to_path_buf(),
                source,
            })?;
        if read == 0 {
            break;
        }
        if lines.len() == max_lines {
            truncated = true;
            break;
        }
        lines.push(clean_line(&raw));
    }

    if truncated {
        warn!(
            "Source {} exceeds {} lines, remaining lines were not read",
            path.display(),
            max_lines
        );
    }
    trace!("Read {} lines from {}", lines.len(), path.display());

    Ok(SourceLines { lines, truncated })
}

fn clean_line(raw: &[u8]) -> String {
    let end = raw
        .iter()
        .position(|b| matches!(b, b'\0' | b'\n' | b'\r'))
        .unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end]).into_owned()
}
