//! SVG rendering of the timeline.
//!
//! The timeline is cut into `pages × rows` equal chunks; each page stacks
//! `rows` panels. Every panel draws the catalog emotes as per-minute rates
//! and marks the games that started inside its time range.

use std::path::{Path, PathBuf};

use chat_timeline_types::TimelineEntry;
use chrono::{DateTime, FixedOffset, TimeZone};

use crate::catalog::{Catalog, PlotLine};
use crate::error::{Error, Result};
use crate::normalizer::event_timezone;

#[derive(Debug, Clone)]
pub struct PlotSettings {
    pub title: String,
    pub y_label: String,
    pub pages: usize,
    pub rows: usize,
    pub y_max: f64,
    pub y_tick: f64,
    pub x_ticks: usize,
    pub width: f64,
    pub height: f64,
    pub font_color: String,
    pub frame_color: String,
    pub background_color: String,
    pub face_color: String,
}

impl Default for PlotSettings {
    fn default() -> Self {
        PlotSettings {
            title: "RTA in Japan 2020 チャット頻出スタンプ・単語".into(),
            y_label: "単語 / 分 （同一メッセージ内の重複単語は除外）".into(),
            pages: 4,
            rows: 4,
            y_max: 450.0,
            y_tick: 100.0,
            x_ticks: 8,
            width: 3840.0,
            height: 2160.0,
            font_color: "white".into(),
            frame_color: "#ffff79".into(),
            background_color: "#352319".into(),
            face_color: "#482b1e".into(),
        }
    }
}

/// Panel rectangle in SVG user units.
#[derive(Debug, Clone, Copy)]
struct Rect {
    x: f64,
    y: f64,
    w: f64,
    h: f64,
}

/// Render every page and write `1.svg`, `2.svg`, … into `out_dir`.
///
/// `window_minutes` converts per-window counts into per-minute rates.
pub fn render_pages(
    entries: &[TimelineEntry],
    catalog: &Catalog,
    settings: &PlotSettings,
    window_minutes: f64,
    out_dir: &Path,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir).map_err(|e| Error::io(out_dir, e))?;

    let mut written = Vec::with_capacity(settings.pages);
    for page in 1..=settings.pages {
        let svg = render_page(entries, catalog, settings, window_minutes, page)?;
        let path = out_dir.join(format!("{page}.svg"));
        std::fs::write(&path, svg).map_err(|e| Error::io(&path, e))?;
        log::info!("Wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}

/// Entries shown on row `row` (1-based) of page `page` (1-based).
///
/// Entries past the last full chunk are not shown.
fn row_slice<'a>(
    entries: &'a [TimelineEntry],
    settings: &PlotSettings,
    page: usize,
    row: usize,
) -> &'a [TimelineEntry] {
    let panels = settings.pages * settings.rows;
    if panels == 0 {
        return &[];
    }
    let chunk = entries.len() / panels;
    let n = row + settings.rows * (page - 1);
    &entries[chunk * (n - 1)..chunk * n]
}

fn render_page(
    entries: &[TimelineEntry],
    catalog: &Catalog,
    settings: &PlotSettings,
    window_minutes: f64,
    page: usize,
) -> Result<String> {
    let (w, h) = (settings.width, settings.height);
    let mut svg = String::new();

    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="Hiragino Maru Gothic Pro, Yu Gothic, Meiryo, IPAexGothic, Noto Sans CJK JP, sans-serif">"#
    ));
    svg.push('\n');
    svg.push_str(&format!(
        r#"<rect width="{w}" height="{h}" fill="{}"/>"#,
        settings.background_color
    ));
    svg.push('\n');

    // left 0.07, right 0.9, bottom 0.05, top 0.92, gap 0.2 of a panel
    let left = w * 0.07;
    let right = w * 0.9;
    let top = h * (1.0 - 0.92);
    let bottom = h * (1.0 - 0.05);
    let rows = settings.rows.max(1) as f64;
    let panel_h = (bottom - top) / (rows + 0.2 * (rows - 1.0));

    for row in 1..=settings.rows {
        let rect = Rect {
            x: left,
            y: top + (row - 1) as f64 * panel_h * 1.2,
            w: right - left,
            h: panel_h,
        };
        let slice = row_slice(entries, settings, page, row);
        render_panel(&mut svg, rect, slice, catalog, settings, window_minutes, row == 1)?;
    }

    svg.push_str(&format!(
        r#"<text x="{}" y="{}" fill="{}" font-size="{}" text-anchor="middle">{} ({page}/{})</text>"#,
        w / 2.0,
        top * 0.6,
        settings.font_color,
        h * 0.022,
        escape(&settings.title),
        settings.pages
    ));
    svg.push('\n');
    let (lx, ly) = (w * 0.03, h / 2.0);
    svg.push_str(&format!(
        r#"<text x="{lx}" y="{ly}" fill="{}" font-size="{}" text-anchor="middle" transform="rotate(-90 {lx} {ly})">{}</text>"#,
        settings.font_color,
        h * 0.016,
        escape(&settings.y_label)
    ));
    svg.push_str("\n</svg>\n");
    Ok(svg)
}

fn render_panel(
    svg: &mut String,
    rect: Rect,
    entries: &[TimelineEntry],
    catalog: &Catalog,
    settings: &PlotSettings,
    window_minutes: f64,
    with_legend: bool,
) -> Result<()> {
    let font_size = settings.height * 0.011;
    svg.push_str(&format!(
        r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}" stroke="{}"/>"#,
        rect.x, rect.y, rect.w, rect.h, settings.face_color, settings.frame_color
    ));
    svg.push('\n');

    render_y_axis(svg, rect, settings, font_size);

    let (Some(first), Some(last)) = (entries.first(), entries.last()) else {
        return Ok(());
    };
    let t0 = first.window_end.timestamp() as f64;
    let span = (last.window_end.timestamp() as f64 - t0).max(1.0);
    let x_of = |t: i64| rect.x + (t as f64 - t0) / span * rect.w;
    let y_of = |v: f64| rect.y + rect.h - v.clamp(0.0, settings.y_max) / settings.y_max * rect.h;

    render_x_axis(svg, rect, settings, font_size, t0, span);

    for game in &catalog.games {
        let at = game.starts_at()?;
        if at < first.window_end || at > last.window_end {
            continue;
        }
        let x = x_of(at.timestamp());
        svg.push_str(&format!(
            r#"<line x1="{x:.1}" y1="{:.1}" x2="{x:.1}" y2="{:.1}" stroke="{}" stroke-dasharray="3,5"/>"#,
            rect.y,
            rect.y + rect.h,
            settings.frame_color
        ));
        svg.push_str(&format!(
            r#"<text x="{:.1}" y="{:.1}" fill="{}" font-size="{font_size:.1}">"#,
            x + 4.0,
            y_of(settings.y_max * 0.9),
            settings.font_color
        ));
        for (i, line) in game.title.split('\n').enumerate() {
            let dy = if i == 0 { 0.0 } else { font_size * 1.2 };
            svg.push_str(&format!(
                r#"<tspan x="{:.1}" dy="{dy:.1}">{}</tspan>"#,
                x + 4.0,
                escape(line)
            ));
        }
        svg.push_str("</text>\n");
    }

    let mut drawn: Vec<&PlotLine> = Vec::new();
    for line in &catalog.emotes {
        let rates: Vec<f64> = entries
            .iter()
            .map(|e| f64::from(e.count(&line.token)) / window_minutes)
            .collect();
        if rates.iter().all(|&r| r == 0.0) {
            continue;
        }

        let points: Vec<String> = entries
            .iter()
            .zip(&rates)
            .map(|(e, &r)| format!("{:.1},{:.1}", x_of(e.window_end.timestamp()), y_of(r)))
            .collect();
        svg.push_str(&format!(
            r#"<polyline fill="none" stroke="{}" stroke-width="2"{} points="{}"/>"#,
            escape(&line.color),
            dash_attr(line),
            points.join(" ")
        ));
        svg.push('\n');
        drawn.push(line);
    }

    if with_legend {
        render_legend(svg, rect, &drawn, settings, font_size);
    }
    Ok(())
}

fn render_y_axis(svg: &mut String, rect: Rect, settings: &PlotSettings, font_size: f64) {
    if settings.y_tick <= 0.0 {
        return;
    }
    let mut v = 0.0;
    while v <= settings.y_max {
        let y = rect.y + rect.h - v / settings.y_max * rect.h;
        svg.push_str(&format!(
            r#"<text x="{:.1}" y="{:.1}" fill="{}" font-size="{font_size:.1}" text-anchor="end" dominant-baseline="middle">{v}</text>"#,
            rect.x - 8.0,
            y,
            settings.font_color
        ));
        svg.push('\n');
        v += settings.y_tick;
    }
}

fn render_x_axis(svg: &mut String, rect: Rect, settings: &PlotSettings, font_size: f64, t0: f64, span: f64) {
    let tz = event_timezone();
    let ticks = settings.x_ticks.max(2);
    for i in 0..ticks {
        let frac = i as f64 / (ticks - 1) as f64;
        let Some(at) = tick_time(&tz, t0 + frac * span) else {
            continue;
        };
        svg.push_str(&format!(
            r#"<text x="{:.1}" y="{:.1}" fill="{}" font-size="{font_size:.1}" text-anchor="middle">{}</text>"#,
            rect.x + frac * rect.w,
            rect.y + rect.h + font_size * 1.4,
            settings.font_color,
            at.format("%m/%d %H:%M")
        ));
        svg.push('\n');
    }
}

fn tick_time(tz: &FixedOffset, secs: f64) -> Option<DateTime<FixedOffset>> {
    tz.timestamp_opt(secs.round() as i64, 0).single()
}

fn render_legend(svg: &mut String, rect: Rect, lines: &[&PlotLine], settings: &PlotSettings, font_size: f64) {
    let x = rect.x + rect.w * 1.015;
    for (i, line) in lines.iter().enumerate() {
        let y = rect.y + font_size * (1.0 + 1.5 * i as f64);
        svg.push_str(&format!(
            r#"<line x1="{x:.1}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="{}" stroke-width="2"{}/>"#,
            x + font_size * 2.5,
            escape(&line.color),
            dash_attr(line)
        ));
        svg.push_str(&format!(
            r#"<text x="{:.1}" y="{y:.1}" fill="{}" font-size="{font_size:.1}" dominant-baseline="middle">{}</text>"#,
            x + font_size * 3.0,
            settings.font_color,
            escape(&line.token)
        ));
        svg.push('\n');
    }
}

fn dash_attr(line: &PlotLine) -> String {
    match line.style.dash_array() {
        Some(d) => format!(r#" stroke-dasharray="{d}""#),
        None => String::new(),
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{GameMarker, LineStyle};
    use chrono::TimeDelta;

    fn entries(n: usize) -> Vec<TimelineEntry> {
        let start = event_timezone().with_ymd_and_hms(2020, 12, 27, 3, 0, 0).unwrap();
        (0..n)
            .map(|i| TimelineEntry {
                window_end: start + TimeDelta::minutes(i as i64),
                counts: [("草".to_string(), i as u32)].into(),
            })
            .collect()
    }

    fn small_catalog() -> Catalog {
        Catalog {
            proper_nouns: vec![],
            excluded_notices: vec![],
            emotes: vec![
                PlotLine {
                    token: "草".into(),
                    style: LineStyle::Dashed,
                    color: "green".into(),
                },
                PlotLine {
                    token: "rtaPog".into(),
                    style: LineStyle::DashDot,
                    color: "#f8c900".into(),
                },
            ],
            games: vec![GameMarker {
                title: "ソニック\nザ\nヘッジホッグ".into(),
                // 2020-12-27 03:05:00 JST
                stream_start: 1_609_005_900,
                hours: 0,
                minutes: 0,
                seconds: 0,
            }],
        }
    }

    #[test]
    fn test_row_slices_cover_full_chunks_only() {
        let settings = PlotSettings::default();
        let all = entries(35);
        // 35 / 16 = 2 per row; the last 3 entries are not shown
        assert_eq!(row_slice(&all, &settings, 1, 1).len(), 2);
        assert_eq!(row_slice(&all, &settings, 1, 2)[0].window_end, all[2].window_end);
        assert_eq!(row_slice(&all, &settings, 4, 4)[1].window_end, all[31].window_end);
    }

    #[test]
    fn test_too_few_entries_leave_rows_empty() {
        let settings = PlotSettings::default();
        let all = entries(10);
        assert!(row_slice(&all, &settings, 2, 3).is_empty());
        let svg = render_page(&all, &small_catalog(), &settings, 1.0, 1).unwrap();
        assert!(!svg.contains("<polyline"));
    }

    #[test]
    fn test_zero_series_skipped_and_markers_drawn() {
        let settings = PlotSettings {
            pages: 1,
            rows: 1,
            ..PlotSettings::default()
        };
        let svg = render_page(&entries(10), &small_catalog(), &settings, 1.0, 1).unwrap();

        assert_eq!(svg.matches("<polyline").count(), 1);
        assert!(svg.contains(r#"stroke="green""#));
        assert!(!svg.contains("rtaPog"));
        assert!(svg.contains("<tspan"));
        assert!(svg.contains("ヘッジホッグ"));
        assert!(svg.contains("(1/1)"));
        assert!(svg.contains("12/27 03:00"));
    }

    #[test]
    fn test_marker_outside_range_not_drawn() {
        let settings = PlotSettings {
            pages: 1,
            rows: 1,
            ..PlotSettings::default()
        };
        let mut catalog = small_catalog();
        catalog.games[0].hours = 5;
        let svg = render_page(&entries(10), &catalog, &settings, 1.0, 1).unwrap();
        assert!(!svg.contains("ヘッジホッグ"));
    }

    #[test]
    fn test_render_pages_writes_one_file_per_page() {
        let dir = std::env::temp_dir().join(format!("chat_timeline_plot_{}", std::process::id()));
        let written = render_pages(&entries(40), &small_catalog(), &PlotSettings::default(), 1.0, &dir).unwrap();
        assert_eq!(written.len(), 4);
        assert!(written.iter().all(|p| p.exists()));
        assert_eq!(written[3].file_name().unwrap(), "4.svg");
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("バトル＆チェイス <F-ZERO> 'x'"), "バトル＆チェイス &lt;F-ZERO&gt; &apos;x&apos;");
        assert_eq!(escape("a&b"), "a&amp;b");
    }
}
