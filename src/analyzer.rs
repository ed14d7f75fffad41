//! Morphological analysis seam.
//!
//! The normalizer only needs surface text and a coarse part of speech for
//! each morpheme. [`DictionaryAnalyzer`] provides that from a compiled
//! MeCab-format dictionary ([`MorphDictionary`]); tests substitute a stub.

use std::cell::RefCell;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use vibrato::tokenizer::worker::Worker;
use vibrato::{Dictionary, Tokenizer};

use crate::error::{Error, Result};

/// Coarse part of speech, taken from the first feature field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartOfSpeech {
    /// 名詞
    Noun,
    /// 動詞
    Verb,
    /// 助動詞
    AuxiliaryVerb,
    Other,
}

impl PartOfSpeech {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "名詞" => Self::Noun,
            "動詞" => Self::Verb,
            "助動詞" => Self::AuxiliaryVerb,
            _ => Self::Other,
        }
    }

    /// Whether a morpheme of this kind opens a token run.
    pub fn is_content(self) -> bool {
        matches!(self, Self::Noun | Self::Verb)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Morpheme {
    pub surface: String,
    pub pos: PartOfSpeech,
}

impl Morpheme {
    pub fn new(surface: impl Into<String>, pos: PartOfSpeech) -> Self {
        Morpheme {
            surface: surface.into(),
            pos,
        }
    }
}

/// Splits text into an ordered sequence of morphemes.
pub trait Analyzer {
    fn analyze(&self, text: &str) -> Result<Vec<Morpheme>>;
}

impl<A: Analyzer + ?Sized> Analyzer for &A {
    fn analyze(&self, text: &str) -> Result<Vec<Morpheme>> {
        (**self).analyze(text)
    }
}

// ── Dictionary-backed analyzer ───────────────────────────────────────────

/// A compiled system dictionary ready for tokenizing.
pub struct MorphDictionary {
    tokenizer: Tokenizer,
}

impl MorphDictionary {
    /// Load a compiled system dictionary. Files ending in `.zst` are
    /// decompressed on the fly.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        let reader: Box<dyn Read> = if path.extension().and_then(|e| e.to_str()) == Some("zst") {
            Box::new(zstd::Decoder::new(file).map_err(|e| Error::io(path, e))?)
        } else {
            Box::new(BufReader::new(file))
        };

        let dict = Dictionary::read(reader).map_err(|source| Error::Dictionary {
            path: path.to_path_buf(),
            source,
        })?;

        log::info!("Loaded dictionary {}", path.display());
        Ok(Self::from_dictionary(dict))
    }

    /// Spaces are kept as morphemes of their own so they end token runs.
    pub fn from_dictionary(dict: Dictionary) -> Self {
        MorphDictionary {
            tokenizer: Tokenizer::new(dict),
        }
    }

    pub fn analyzer(&self) -> DictionaryAnalyzer<'_> {
        DictionaryAnalyzer {
            worker: RefCell::new(self.tokenizer.new_worker()),
        }
    }
}

/// Analyzer over a [`MorphDictionary`]. One lattice is reused for every
/// message.
pub struct DictionaryAnalyzer<'t> {
    worker: RefCell<Worker<'t>>,
}

impl Analyzer for DictionaryAnalyzer<'_> {
    fn analyze(&self, text: &str) -> Result<Vec<Morpheme>> {
        let mut worker = self.worker.borrow_mut();
        worker.reset_sentence(text);
        worker.tokenize();

        Ok(worker
            .token_iter()
            .map(|t| {
                let tag = t.feature().split(',').next().unwrap_or("");
                Morpheme::new(t.surface(), PartOfSpeech::from_tag(tag))
            })
            .collect())
    }
}
