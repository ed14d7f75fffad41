//! Per-message token extraction.
//!
//! A chat message becomes a set of canonical tokens: catalog proper nouns
//! taken verbatim, plus noun/verb runs with their trailing auxiliaries merged
//! into one token (走 + った → 走った). Platform notices yield nothing.

use std::collections::BTreeSet;

use chrono::{DateTime, FixedOffset, TimeZone};

use crate::analyzer::{Analyzer, Morpheme, PartOfSpeech};
use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::width::widen_kana;

/// Chat timestamps are reported in JST.
const EVENT_OFFSET_SECS: i32 = 9 * 3600;

pub fn event_timezone() -> FixedOffset {
    FixedOffset::east_opt(EVENT_OFFSET_SECS).expect("UTC+9 is a valid offset")
}

/// One chat message reduced to its time and its distinct tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedMessage {
    /// Whole-second time of the message, UTC+9.
    pub occurred_at: DateTime<FixedOffset>,
    pub tokens: BTreeSet<String>,
}

pub struct MessageNormalizer<A> {
    analyzer: A,
    proper_nouns: Vec<String>,
    excluded_notices: Vec<String>,
}

impl<A: Analyzer> MessageNormalizer<A> {
    pub fn new(analyzer: A, catalog: &Catalog) -> Self {
        MessageNormalizer {
            analyzer,
            proper_nouns: catalog.proper_nouns.clone(),
            excluded_notices: catalog.excluded_notices.clone(),
        }
    }

    pub fn normalize(
        &self,
        author: &str,
        text: &str,
        timestamp_micros: i64,
    ) -> Result<NormalizedMessage> {
        let occurred_at = occurred_at(timestamp_micros)?;
        let mut tokens = BTreeSet::new();

        let text = widen_kana(text);

        if let Some(notice) = self.excluded_notices.iter().find(|n| text.contains(n.as_str())) {
            log::trace!("{author}: skipped notice ({notice:?})");
            return Ok(NormalizedMessage {
                occurred_at,
                tokens,
            });
        }

        let mut rest = text.into_owned();
        for noun in &self.proper_nouns {
            if !noun.is_empty() && rest.contains(noun.as_str()) {
                tokens.insert(noun.clone());
                rest = rest.replace(noun.as_str(), "");
            }
        }

        let rest = strip_urls(&rest);
        if !rest.is_empty() {
            let morphemes = self.analyzer.analyze(&rest)?;
            merge_runs(&morphemes, &mut tokens);
        }

        Ok(NormalizedMessage {
            occurred_at,
            tokens,
        })
    }
}

/// Truncate a microsecond Unix timestamp to whole seconds in UTC+9.
fn occurred_at(timestamp_micros: i64) -> Result<DateTime<FixedOffset>> {
    let secs = timestamp_micros.div_euclid(1_000_000);
    event_timezone()
        .timestamp_opt(secs, 0)
        .single()
        .ok_or(Error::InvalidTimestamp(timestamp_micros))
}

/// Drop whitespace-separated words that start with `http` and rejoin the
/// rest with single spaces.
fn strip_urls(text: &str) -> String {
    text.split_whitespace()
        .filter(|word| !word.starts_with("http"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Collect noun/verb runs into `tokens`.
///
/// A run opens on a noun or verb and absorbs following auxiliary verbs; any
/// other morpheme closes it. A noun or verb that closes a run opens the next.
fn merge_runs(morphemes: &[Morpheme], tokens: &mut BTreeSet<String>) {
    let mut run_kind: Option<PartOfSpeech> = None;
    let mut buffer = String::new();

    for m in morphemes {
        if run_kind.is_some() {
            if m.pos == PartOfSpeech::AuxiliaryVerb {
                buffer.push_str(&m.surface);
                continue;
            }
            tokens.insert(std::mem::take(&mut buffer));
            run_kind = None;
        }

        if m.pos.is_content() {
            run_kind = Some(m.pos);
            buffer.push_str(&m.surface);
        }
    }

    if run_kind.is_some() {
        tokens.insert(buffer);
    }
}
