use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use walkdir::WalkDir;

use crate::analyzer::Analyzer;
use crate::error::{Error, Result};
use crate::normalizer::{MessageNormalizer, NormalizedMessage};

/// One chat event as exported by the chat downloader.
#[derive(Debug, Clone, Deserialize)]
pub struct RawMessage {
    pub author: String,
    pub message: String,
    #[allow(dead_code)]
    pub time_in_seconds: f64,
    #[allow(dead_code)]
    pub time_text: String,
    /// Microseconds since the Unix epoch.
    pub timestamp: i64,
}

/// Expand command-line inputs into the chat files to read, in order.
///
/// Files are kept as given. A directory contributes the `*.json` files
/// directly inside it, sorted by name. Symlinked files are followed; a
/// directory that cannot be listed is an error.
pub fn expand_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if !input.is_dir() {
            files.push(input.clone());
            continue;
        }
        let walker = WalkDir::new(input)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();
        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(input.as_path()).to_path_buf();
                Error::io(path, e.into())
            })?;
            let path = entry.into_path();
            if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("json") {
                files.push(path);
            }
        }
    }
    Ok(files)
}

/// Read one chat file: a JSON array of [`RawMessage`] records.
pub fn read_chat_file(path: &Path) -> Result<Vec<RawMessage>> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| Error::json(path, e))
}

/// Read and normalize every message of every file, concatenated in file order.
pub fn load_messages<A: Analyzer>(
    files: &[PathBuf],
    normalizer: &MessageNormalizer<A>,
) -> Result<Vec<NormalizedMessage>> {
    let mut messages = Vec::new();
    for path in files {
        let raw = read_chat_file(path)?;
        log::info!("{}: {} messages", path.display(), raw.len());
        for m in &raw {
            messages.push(normalizer.normalize(&m.author, &m.message, m.timestamp)?);
        }
    }
    Ok(messages)
}
