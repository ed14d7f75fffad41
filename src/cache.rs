//! On-disk copy of a computed timeline.
//!
//! There is no fingerprint of the inputs: whatever timeline is on disk is
//! served, even if it came from different chat files.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use chat_timeline_types::Timeline;

use crate::error::{Error, Result};

/// Load the cached timeline, or `None` if no cache file exists.
pub fn load(path: &Path) -> Result<Option<Timeline>> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(Error::io(path, e)),
    };
    let timeline = serde_json::from_reader(BufReader::new(file)).map_err(|e| Error::json(path, e))?;
    Ok(Some(timeline))
}

pub fn store(path: &Path, timeline: &Timeline) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    }
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, timeline).map_err(|e| Error::json(path, e))?;
    writer.flush().map_err(|e| Error::io(path, e))
}

/// Return the cached timeline if present; otherwise compute it with `build`
/// and cache the result before returning it.
pub fn load_or_build<F>(path: &Path, build: F) -> Result<Timeline>
where
    F: FnOnce() -> Result<Timeline>,
{
    if let Some(timeline) = load(path)? {
        log::info!("Using cached timeline {} ({} windows)", path.display(), timeline.len());
        return Ok(timeline);
    }

    log::info!("No cached timeline at {}, building", path.display());
    let timeline = build()?;
    store(path, &timeline)?;
    log::info!("Cached timeline to {}", path.display());
    Ok(timeline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_timeline_types::TimelineEntry;
    use chrono::{FixedOffset, TimeZone};
    use std::path::PathBuf;

    fn scratch_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("chat_timeline_cache_{name}_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir.join("timeline.json")
    }

    fn sample() -> Timeline {
        let tz = FixedOffset::east_opt(9 * 3600).unwrap();
        Timeline {
            entries: vec![
                TimelineEntry {
                    window_end: tz.with_ymd_and_hms(2020, 12, 27, 3, 7, 0).unwrap(),
                    counts: [("草".to_string(), 12), ("rtaClap".to_string(), 3)].into(),
                },
                TimelineEntry {
                    window_end: tz.with_ymd_and_hms(2020, 12, 27, 4, 15, 0).unwrap(),
                    counts: Default::default(),
                },
            ],
        }
    }

    #[test]
    fn test_store_then_load_is_identical() {
        let path = scratch_path("roundtrip");
        let timeline = sample();
        store(&path, &timeline).unwrap();

        let loaded = load(&path).unwrap().unwrap();
        assert_eq!(loaded, timeline);
        assert_eq!(loaded.entries[0].window_end.offset().local_minus_utc(), 9 * 3600);
    }

    #[test]
    fn test_missing_cache_is_none() {
        let path = scratch_path("missing");
        assert!(load(&path).unwrap().is_none());
    }

    #[test]
    fn test_cache_hit_skips_build() {
        let path = scratch_path("hit");
        store(&path, &sample()).unwrap();

        let timeline = load_or_build(&path, || panic!("pipeline must not run")).unwrap();
        assert_eq!(timeline, sample());
    }

    #[test]
    fn test_cache_miss_builds_and_stores() {
        let path = scratch_path("miss");
        let timeline = load_or_build(&path, || Ok(sample())).unwrap();
        assert_eq!(timeline, sample());
        assert_eq!(load(&path).unwrap(), Some(sample()));
    }

    #[test]
    fn test_failed_build_leaves_no_cache() {
        let path = scratch_path("fail");
        let result = load_or_build(&path, || Err(Error::EmptyInput));
        assert!(matches!(result, Err(Error::EmptyInput)));
        assert!(!path.exists());
    }

    #[test]
    fn test_corrupt_cache_is_error() {
        let path = scratch_path("corrupt");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(load(&path), Err(Error::Json { .. })));
    }
}
