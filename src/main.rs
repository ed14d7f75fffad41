mod aggregate;
mod analyzer;
mod cache;
mod catalog;
mod chat;
mod error;
mod normalizer;
mod plot;
mod report;
mod width;

use std::path::{Path, PathBuf};

use anyhow::Context;
use chat_timeline_types::Timeline;
use chrono::TimeDelta;
use clap::Parser;

use analyzer::MorphDictionary;
use catalog::Catalog;
use normalizer::MessageNormalizer;
use plot::PlotSettings;

const OUTPUT_DIR: &str = "output";
const CACHE_FILE: &str = "timeline.json";
const REPORT_FILE: &str = "words.tab";

#[derive(Parser)]
#[command(
    name = "chat_timeline",
    about = "Per-minute word and emote frequency charts from livestream chat logs"
)]
struct Cli {
    /// Chat log JSON files (or directories of them), read in the order given
    inputs: Vec<PathBuf>,

    /// Directory for the timeline cache, the word report and the chart pages
    #[arg(long, default_value = OUTPUT_DIR)]
    output: PathBuf,

    /// Window length in minutes
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    window_minutes: u32,

    /// Compiled morphological dictionary (.dic or .dic.zst)
    #[arg(long, env = "CHAT_TIMELINE_DICT", default_value = "system.dic.zst")]
    dict: PathBuf,

    /// JSON catalog replacing the built-in word lists, emotes and games
    #[arg(long)]
    catalog: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let catalog = match &cli.catalog {
        Some(path) => Catalog::load(path)
            .with_context(|| format!("loading catalog {}", path.display()))?,
        None => Catalog::default(),
    };
    let window = TimeDelta::minutes(i64::from(cli.window_minutes));

    let cache_path = cli.output.join(CACHE_FILE);
    let timeline = cache::load_or_build(&cache_path, || {
        build_timeline(&cli.inputs, &cli.dict, &catalog, window)
    })
    .context("building timeline")?;

    std::fs::create_dir_all(&cli.output)
        .with_context(|| format!("creating {}", cli.output.display()))?;

    let counts = report::write_word_counts(&cli.output.join(REPORT_FILE), &timeline)
        .context("writing word report")?;
    for w in counts.iter().take(10) {
        log::info!("  {}\t{}", w.token, w.total_count);
    }

    plot::render_pages(
        &timeline.entries,
        &catalog,
        &PlotSettings::default(),
        f64::from(cli.window_minutes),
        &cli.output,
    )
    .context("rendering charts")?;

    Ok(())
}

/// Run the full pipeline: read and normalize every chat file, then bucket
/// the messages into windows.
fn build_timeline(
    inputs: &[PathBuf],
    dict: &Path,
    catalog: &Catalog,
    window: TimeDelta,
) -> error::Result<Timeline> {
    let files = chat::expand_inputs(inputs)?;
    if files.is_empty() {
        return Err(error::Error::EmptyInput);
    }
    log::info!("Reading {} chat files", files.len());

    let dictionary = MorphDictionary::open(dict)?;
    let normalizer = MessageNormalizer::new(dictionary.analyzer(), catalog);
    let messages = chat::load_messages(&files, &normalizer)?;

    let with_tokens = messages.iter().filter(|m| !m.tokens.is_empty()).count();
    log::info!(
        "Normalized {} messages ({} with tokens)",
        messages.len(),
        with_tokens
    );

    aggregate::aggregate(&messages, window)
}
