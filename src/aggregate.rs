//! Bucketing of normalized messages into fixed-length time windows.
//!
//! Window boundaries follow the data: each window ends `window` after the
//! minute in which its first message falls. After a quiet stretch the next
//! boundary jumps forward, so consecutive windows are not always evenly
//! spaced and windows with no messages are never emitted.

use chat_timeline_types::{Timeline, TimelineEntry, TokenCounts};
use chrono::{DateTime, FixedOffset, TimeDelta, Timelike};

use crate::error::{Error, Result};
use crate::normalizer::NormalizedMessage;

/// Group `messages` (already in chronological order) into windows of length
/// `window` and count, per window, how many messages carry each token.
///
/// A message belongs to the open window while its time is ≤ the window's end.
/// The input is never reordered.
pub fn aggregate(messages: &[NormalizedMessage], window: TimeDelta) -> Result<Timeline> {
    if window <= TimeDelta::zero() {
        return Err(Error::InvalidWindow(window.num_seconds()));
    }
    let first = messages.first().ok_or(Error::EmptyInput)?;

    let mut entries = Vec::new();
    let mut boundary = window_end(first.occurred_at, window);
    let mut bucket: Vec<&NormalizedMessage> = Vec::new();

    for m in messages {
        if m.occurred_at <= boundary {
            bucket.push(m);
            continue;
        }

        entries.push(close_window(boundary, &bucket));
        boundary = window_end(m.occurred_at, window);
        bucket.clear();
        bucket.push(m);
    }

    if !bucket.is_empty() {
        entries.push(close_window(boundary, &bucket));
    }

    log::info!(
        "Aggregated {} messages into {} windows of {}s",
        messages.len(),
        entries.len(),
        window.num_seconds()
    );
    Ok(Timeline { entries })
}

/// End of the window opened by a message at `at`: the start of its minute
/// plus the window length.
fn window_end(at: DateTime<FixedOffset>, window: TimeDelta) -> DateTime<FixedOffset> {
    let into_minute = TimeDelta::seconds(i64::from(at.second()))
        + TimeDelta::nanoseconds(i64::from(at.nanosecond()));
    at - into_minute + window
}

fn close_window(boundary: DateTime<FixedOffset>, bucket: &[&NormalizedMessage]) -> TimelineEntry {
    let mut counts = TokenCounts::new();
    for m in bucket {
        for token in &m.tokens {
            *counts.entry(token.clone()).or_insert(0) += 1;
        }
    }
    log::debug!("window {} closed: {} messages", boundary, bucket.len());
    TimelineEntry {
        window_end: boundary,
        counts,
    }
}
