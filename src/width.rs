//! Half-width → full-width kana conversion.
//!
//! Only the half-width katakana block (U+FF61–U+FF9F) is touched; ASCII and
//! digits pass through unchanged. Voiced marks following a kana are composed
//! into the precomposed full-width character (ｶﾞ → ガ).

use std::borrow::Cow;

use unicode_normalization::UnicodeNormalization;

fn is_halfwidth_kana(c: char) -> bool {
    ('\u{FF61}'..='\u{FF9F}').contains(&c)
}

/// Convert every run of half-width kana in `text` to full width.
pub fn widen_kana(text: &str) -> Cow<'_, str> {
    if !text.chars().any(is_halfwidth_kana) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + text.len() / 2);
    let mut run = String::new();
    for c in text.chars() {
        if is_halfwidth_kana(c) {
            run.push(c);
        } else {
            flush_run(&mut out, &mut run);
            out.push(c);
        }
    }
    flush_run(&mut out, &mut run);
    Cow::Owned(out)
}

fn flush_run(out: &mut String, run: &mut String) {
    if run.is_empty() {
        return;
    }
    // NFKC leaves marks that had nothing to compose with as combining
    // characters; use the spacing forms instead.
    for c in run.nfkc() {
        match c {
            '\u{3099}' => out.push('\u{309B}'),
            '\u{309A}' => out.push('\u{309C}'),
            other => out.push(other),
        }
    }
    run.clear();
}
