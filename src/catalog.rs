//! Word lists and plot directives for one livestream event.
//!
//! The built-in tables describe RTA in Japan 2020. A JSON file with the same
//! shape as [`Catalog`] replaces them wholesale (`--catalog`).

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::{DateTime, FixedOffset, TimeZone};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::normalizer::event_timezone;

/// Terms the analyzer would split apart. Matched as plain substrings, in this
/// order, and counted verbatim.
pub const PROPER_NOUNS: &[&str] = &[
    "無敵時間", "超カッコいい", "stonec7FioGG", "stonec7Macho", "stonec7Shachi", "4Head",
    "ArgieB8", "Mau5", "MercyWing1", "MercyWing2", "Squid1", "Squid2", "Squid3", "Squid4",
    "TF2John", "rtaRedbull2", "石油王", "納期のテーマ", "キョロちゃん", "タイガー先生",
];

/// Subscription / gift notices posted by the platform. A message containing
/// any of these contributes no tokens.
pub const EXCLUDED_NOTICES: &[&str] = &[
    " gifted a Tier ",
    " is gifting ",
    " subscribed at ",
    " shared rewards to ",
    " subscribed with Prime",
    "converted from a Prime sub to",
];

/// (token, line style, color)
pub const EMOTES: &[(&str, &str, &str)] = &[
    ("rtaClap", "-", "#ec7087"),
    ("rtaPray", "-", "#f7f97a"),
    ("rtaGl", "-", "#5cc200"),
    ("rtaGg", "-", "#ff381c"),
    ("rtaHatena", "-", "#ffb5a1"),
    ("rtaR", "-", "white"),
    ("rtaRedbull", "-", "#1753c8"),
    ("rtaPog", "-.", "#f8c900"),
    ("rtaCry", "-.", "#5ec6ff"),
    ("rtaHello", "-.", "#ff3291"),
    ("rtaHmm", "-.", "#fcc7b9"),
    ("rtaOko", "-.", "#d20025"),
    ("rtaPolice", "-.", "#7891b8"),
    ("rtaKabe", "-.", "#bf927a"),
    ("rtaListen", "-.", "#5eb0ff"),
    ("rtaIizo", ":", "#0f9619"),
    ("rtaBanana", ":", "#f3f905"),
    ("rtaShogi", ":", "#c68d46"),
    ("rtaFrameperfect", ":", "#ff7401"),
    ("rtaPixelperfect", ":", "#ffa300"),
    ("草", "--", "green"),
    ("無敵時間", "--", "red"),
    ("ファイナル", "--", "gray"),
    ("石油王", "--", "yellow"),
    ("ホットプレート", "--", "orange"),
];

/// (title, stream start as Unix seconds, offset hours, minutes, seconds)
///
/// Titles use `\n` for line breaks in chart labels.
pub const GAMES: &[(&str, i64, i64, i64, i64)] = &[
    ("世界のアソビ大全51", 1609005175, 0, 13, 40),
    ("剣神ドラゴンクエスト 甦りし伝説の剣", 1609005175, 2, 0, 54),
    ("ドラゴンクエスト3", 1609005175, 4, 2, 26),
    ("ロマンシング サガ3 HDリマスター版", 1609005175, 4, 51, 46),
    ("メタルマックス", 1609005175, 7, 47, 17),
    ("メタルマックスゼノリボーン", 1609005175, 8, 47, 47),
    ("テンミリオン", 1609005175, 10, 29, 41),
    ("Terraria", 1609005175, 11, 6, 54),
    ("四字熟語Flash", 1609005175, 11, 47, 46),
    ("人生オワタの\n大冒険2", 1609005175, 12, 15, 48),
    ("ティンクルスター\nスプライツ", 1609005175, 12, 41, 43),
    ("秘封ナイトメアダイアリー 〜 Violet Detector.", 1609005175, 13, 10, 41),
    ("Tetris Effect", 1609005175, 14, 50, 9),
    ("I.Q FINAL", 1609005175, 15, 39, 51),
    ("XI JUMBO", 1609005175, 16, 23, 45),
    ("The Typing of the Dead 2004", 1609005175, 17, 45, 37),
    ("ジ・ウーズ", 1609005175, 18, 50, 33),
    ("心霊呪殺師 太郎丸", 1609005175, 19, 54, 50),
    ("マリオアーティスト\nポリゴンスタジオ", 1609005175, 20, 36, 29),
    (".hack//G.U. Last Recode", 1609005175, 21, 41, 17),
    ("ファイナルファンタジーXIII", 1609005175, 24, 40, 25),
    ("DARK SOULS REMASTERED", 1609005175, 29, 50, 48),
    ("Salt and Sanctuary", 1609115920, 0, 4, 58),
    ("マリーのアトリエplus", 1609115920, 0, 51, 6),
    ("FINAL FANTASY XV ROYAL EDITION", 1609115920, 2, 3, 51),
    ("Kingdom Hearts II Final Mix", 1609115920, 3, 3, 28),
    ("イース セルセタの樹海", 1609115920, 6, 23, 37),
    ("MOTHER2", 1609115920, 7, 32, 45),
    ("星のカービィ ウルトラスーパーデラックス", 1609115920, 11, 48, 11),
    ("カービィの\nすいこみ大作戦", 1609115920, 13, 9, 27),
    ("ファイアーエムブレム 烈火の剣", 1609115920, 13, 45, 17),
    ("ASTRAL CHAIN", 1609115920, 15, 21, 29),
    ("F-ZERO GX", 1609115920, 18, 23, 54),
    ("ロックマン バトル＆チェイス", 1609115920, 19, 2, 38),
    ("ボンバーマン'94", 1609115920, 20, 9, 25),
    ("妖怪ウォッチ", 1609115920, 21, 3, 13),
    ("おねがいマイメロディ\n夢の国の大冒険", 1609115920, 23, 55, 27),
    ("Yono and the\nCelestial Elephants", 1609115920, 24, 41, 35),
    ("キョロちゃん\nランド", 1609115920, 25, 38, 42),
    ("Gunman Clive", 1609115920, 26, 9, 38),
    ("高速廻転寿司", 1609115920, 26, 39, 58),
    ("突然！マッチョマン", 1609115920, 27, 7, 5),
    ("吉野家", 1609115920, 27, 51, 47),
    ("シャーロック\nホームズ\n伯爵令嬢誘拐事件", 1609115920, 28, 53, 31),
    ("ファイナルソード", 1609115920, 29, 31, 35),
    ("ゼルダの伝説\n時のオカリナ", 1609115920, 30, 45, 7),
    ("ルイージ\nマンション", 1609115920, 31, 33, 14),
    ("ゼルダの伝説ふしぎの木の実大地の章", 1609115920, 32, 2, 47),
    ("ポケットモンスター ブラック・ホワイト", 1609115920, 33, 19, 54),
    ("ソニック\nザ\nヘッジホッグ", 1609115920, 36, 54, 50),
    ("ソニックと暗黒の騎士", 1609115920, 37, 28, 49),
    ("テイルコンチェルト", 1609115920, 38, 23, 1),
    ("No Straight Roads", 1609115920, 40, 0, 48),
    ("神巫女 -カミコ-", 1609115920, 40, 39, 36),
    ("Warriors\nof\nFate", 1609115920, 41, 16, 49),
    ("マジックソード", 1609115920, 42, 26, 18),
    ("所さんの\nまもるも\nせめるも", 1609269995, 0, 11, 4),
    ("ジェットセットラジオ", 1609269995, 0, 41, 9),
    ("KORG Gadget\nfor Nintendo Switch", 1609269995, 2, 6, 7),
    ("PC\nBuilding\nSimulator", 1609269995, 2, 50, 8),
    ("鉄騎", 1609269995, 3, 15, 3),
    ("VAMPIRE KILLER", 1609269995, 4, 41, 57),
    ("真・女神転生", 1609289847, 0, 14, 13),
    ("LIVE A LIVE", 1609299079, 0, 0, 41),
    ("クロックタワートリロジーリレー", 1609299079, 1, 18, 11),
    ("DevilMayCry5", 1609299079, 4, 11, 32),
    ("バイオハザード3", 1609299079, 6, 3, 37),
    ("サイレントヒル2", 1609299079, 7, 29, 57),
    ("ヨッシークラフトワールド", 1609299079, 9, 4, 56),
    ("深世海 Into The Depths", 1609341724, 0, 4, 51),
    ("DARK SOULS\nREMASTERED", 1609341724, 1, 41, 1),
    ("朧村正", 1609341724, 2, 18, 2),
    ("鬼武者", 1609341724, 3, 54, 50),
    ("New\nスーパーマリオ\nブラザーズ", 1609341724, 5, 7, 8),
    ("Momodora\n月下のレクイエム", 1609341724, 5, 46, 20),
    ("がんばれゴエモン3 獅子重禄兵衛のからくり卍固め", 1609341724, 6, 22, 50),
    ("Jump King", 1609341724, 7, 58, 53),
    ("カイザーナックル", 1609341724, 8, 35, 23),
    ("スーパーマリオランドトリロジーリレー", 1609341724, 9, 24, 50),
    ("ゼルダの伝説\nブレスオブザワイルド", 1609341724, 10, 56, 55),
];

// ── Plot directives ──────────────────────────────────────────────────────

/// Line style of one plotted series, written with matplotlib's short codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineStyle {
    #[serde(rename = "-")]
    Solid,
    #[serde(rename = "--")]
    Dashed,
    #[serde(rename = "-.")]
    DashDot,
    #[serde(rename = ":")]
    Dotted,
}

impl LineStyle {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "-" => Some(Self::Solid),
            "--" => Some(Self::Dashed),
            "-." => Some(Self::DashDot),
            ":" => Some(Self::Dotted),
            _ => None,
        }
    }

    /// SVG `stroke-dasharray` value, `None` for a solid line.
    pub fn dash_array(self) -> Option<&'static str> {
        match self {
            Self::Solid => None,
            Self::Dashed => Some("14,6"),
            Self::DashDot => Some("14,5,3,5"),
            Self::Dotted => Some("3,5"),
        }
    }
}

/// One token drawn as its own line on every panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlotLine {
    pub token: String,
    pub style: LineStyle,
    pub color: String,
}

/// Start of a game segment, given as stream start + elapsed time on the VOD.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameMarker {
    pub title: String,
    /// Unix seconds at which the VOD containing this game started.
    pub stream_start: i64,
    #[serde(default)]
    pub hours: i64,
    #[serde(default)]
    pub minutes: i64,
    #[serde(default)]
    pub seconds: i64,
}

impl GameMarker {
    pub fn starts_at(&self) -> Result<DateTime<FixedOffset>> {
        let out_of_range = || Error::InvalidGameMarker(self.title.clone());
        let secs = self
            .hours
            .checked_mul(3600)
            .and_then(|h| h.checked_add(self.minutes.checked_mul(60)?))
            .and_then(|elapsed| elapsed.checked_add(self.seconds))
            .and_then(|elapsed| elapsed.checked_add(self.stream_start))
            .ok_or_else(out_of_range)?;
        event_timezone()
            .timestamp_opt(secs, 0)
            .single()
            .ok_or_else(out_of_range)
    }
}

// ── Catalog ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub proper_nouns: Vec<String>,
    pub excluded_notices: Vec<String>,
    pub emotes: Vec<PlotLine>,
    pub games: Vec<GameMarker>,
}

impl Default for Catalog {
    fn default() -> Self {
        Catalog {
            proper_nouns: PROPER_NOUNS.iter().map(|s| s.to_string()).collect(),
            excluded_notices: EXCLUDED_NOTICES.iter().map(|s| s.to_string()).collect(),
            emotes: EMOTES
                .iter()
                .filter_map(|(token, style, color)| {
                    Some(PlotLine {
                        token: token.to_string(),
                        style: LineStyle::from_code(style)?,
                        color: color.to_string(),
                    })
                })
                .collect(),
            games: GAMES
                .iter()
                .map(|(title, start, h, m, s)| GameMarker {
                    title: title.to_string(),
                    stream_start: *start,
                    hours: *h,
                    minutes: *m,
                    seconds: *s,
                })
                .collect(),
        }
    }
}

impl Catalog {
    /// Read a catalog from a JSON file. Every game marker must resolve to a
    /// representable time.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        let catalog: Catalog =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| Error::json(path, e))?;
        for game in &catalog.games {
            game.starts_at()?;
        }
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_keeps_every_emote() {
        let catalog = Catalog::default();
        assert_eq!(catalog.emotes.len(), EMOTES.len());
        assert_eq!(catalog.games.len(), GAMES.len());
        assert_eq!(catalog.proper_nouns[0], "無敵時間");
    }

    #[test]
    fn test_game_marker_offset() {
        let marker = GameMarker {
            title: "世界のアソビ大全51".into(),
            stream_start: 1609005175,
            hours: 0,
            minutes: 13,
            seconds: 40,
        };
        let at = marker.starts_at().unwrap();
        assert_eq!(at.timestamp(), 1609005175 + 13 * 60 + 40);
        assert_eq!(at.offset().local_minus_utc(), 9 * 3600);
        // 2020-12-27 03:06:35 JST
        assert_eq!(at.format("%m/%d %H:%M:%S").to_string(), "12/27 03:06:35");
    }

    #[test]
    fn test_line_style_codes() {
        assert_eq!(LineStyle::from_code("-."), Some(LineStyle::DashDot));
        assert_eq!(LineStyle::from_code("~"), None);
        assert_eq!(LineStyle::Solid.dash_array(), None);
    }

    #[test]
    fn test_catalog_json_shape() {
        let json = r##"{
            "proper_nouns": ["石油王"],
            "excluded_notices": [" is gifting "],
            "emotes": [{"token": "草", "style": "--", "color": "green"}],
            "games": [{"title": "鉄騎", "stream_start": 1609269995, "hours": 3}]
        }"##;
        let catalog: Catalog = serde_json::from_str(json).unwrap();
        assert_eq!(catalog.emotes[0].style, LineStyle::Dashed);
        assert_eq!(catalog.games[0].minutes, 0);
        assert_eq!(catalog.games[0].starts_at().unwrap().timestamp(), 1609269995 + 3 * 3600);
    }

    #[test]
    fn test_default_game_markers_resolve() {
        for game in &Catalog::default().games {
            assert!(game.starts_at().is_ok(), "{}", game.title);
        }
    }

    #[test]
    fn test_overflowing_game_offset_rejected() {
        let marker = GameMarker {
            title: "鉄騎".into(),
            stream_start: 1609269995,
            hours: i64::MAX / 1000,
            minutes: 0,
            seconds: 0,
        };
        assert!(matches!(marker.starts_at(), Err(Error::InvalidGameMarker(t)) if t == "鉄騎"));

        let marker = GameMarker {
            hours: 0,
            seconds: i64::MAX,
            ..marker
        };
        assert!(matches!(marker.starts_at(), Err(Error::InvalidGameMarker(_))));
    }

    #[test]
    fn test_load_rejects_unrepresentable_marker() {
        let path = std::env::temp_dir().join(format!("chat_timeline_catalog_{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{"proper_nouns": [], "excluded_notices": [], "emotes": [],
                "games": [{"title": "far", "stream_start": 9000000000000000000, "hours": 1000000}]}"#,
        )
        .unwrap();
        assert!(matches!(Catalog::load(&path), Err(Error::InvalidGameMarker(t)) if t == "far"));
    }
}
