use std::path::Path;

use chat_timeline_types::{Timeline, WordCount};
use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::error::{Error, Result};

/// Write the total count of every token, most frequent first, as
/// `token<TAB>count` lines without a header.
pub fn write_word_counts(path: &Path, timeline: &Timeline) -> Result<Vec<WordCount>> {
    let counts = timeline.word_counts();

    let mut writer = WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_path(path)?;
    for row in &counts {
        writer.serialize(row)?;
    }
    writer.flush().map_err(|e| Error::io(path, e))?;

    log::info!("{}: {} distinct tokens", path.display(), counts.len());
    Ok(counts)
}
