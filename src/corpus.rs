//! Very thin readers turning text into integer sequences.
//!
//! Three formats are supported:
//! - whitespace/line separated integers, e.g., `0 1 2 1 0`,
//! - arbitrary whitespace separated tokens, mapped to integers by their sorted order,
//! - tagged corpus, one sentence per line and each token written as `word/TAG`.
//!   The words and the tags are mapped to integers by a `Vocabulary`, which should be
//!   built once on the training data and reused on the evaluation data.
use crate::error::{HmmError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read};

/// Read file or stdin.
fn read_to_string<P: AsRef<std::path::Path>>(file: &Option<P>) -> Result<String> {
    let stdin = std::io::stdin();
    let mut reader: Box<dyn BufRead> = match file {
        Some(file) => std::fs::File::open(file)
            .map(BufReader::new)
            .map(Box::new)?,
        None => {
            let lock = stdin.lock();
            Box::new(BufReader::new(lock))
        }
    };
    let mut contents = String::new();
    reader.read_to_string(&mut contents)?;
    Ok(contents)
}

/// Parse whitespace separated non-negative integers.
pub fn parse_observations(contents: &str) -> Result<Vec<usize>> {
    contents
        .split_whitespace()
        .enumerate()
        .map(|(position, token)| {
            token.parse().map_err(|_| HmmError::Parse {
                position,
                token: token.to_string(),
            })
        })
        .collect()
}

/// Read file or stdin, return the integers in it as one sequence.
pub fn read_observations<P: AsRef<std::path::Path>>(file: &Option<P>) -> Result<Vec<usize>> {
    let contents = read_to_string(file)?;
    parse_observations(&contents)
}

/// Parse one sequence per line. Empty lines are skipped.
pub fn parse_sequences(contents: &str) -> Result<Vec<Vec<usize>>> {
    contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_observations)
        .collect()
}

/// Read file or stdin, return one sequence per non-empty line.
pub fn read_sequences<P: AsRef<std::path::Path>>(file: &Option<P>) -> Result<Vec<Vec<usize>>> {
    let contents = read_to_string(file)?;
    parse_sequences(&contents)
}

/// Map each token to the rank of the token among the distinct tokens.
/// For example, `["b", "a", "c", "a"]` would be `[1, 0, 2, 0]`.
pub fn encode_tokens<T: AsRef<str>>(tokens: &[T]) -> Vec<usize> {
    let vocab = Vocabulary::sorted(tokens.iter().map(|t| t.as_ref()));
    tokens
        .iter()
        .filter_map(|t| vocab.get(t.as_ref()))
        .collect()
}

/// A bijection between tokens and integers in [0, len).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawVocabulary", into = "RawVocabulary")]
pub struct Vocabulary {
    tokens: Vec<String>,
    index: HashMap<String, usize>,
    // Index of the token standing for the unknown ones.
    unknown: Option<usize>,
}

// Serialized form of a vocabulary. The index is rebuilt on loading.
#[derive(Serialize, Deserialize)]
struct RawVocabulary {
    tokens: Vec<String>,
    unknown: Option<usize>,
}

impl From<RawVocabulary> for Vocabulary {
    fn from(raw: RawVocabulary) -> Self {
        let index = raw
            .tokens
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();
        let unknown = raw.unknown.filter(|&u| u < raw.tokens.len());
        Self {
            tokens: raw.tokens,
            index,
            unknown,
        }
    }
}

impl From<Vocabulary> for RawVocabulary {
    fn from(vocab: Vocabulary) -> Self {
        Self {
            tokens: vocab.tokens,
            unknown: vocab.unknown,
        }
    }
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }
    /// A vocabulary where every token not in it is mapped to `unknown`.
    pub fn with_unknown(unknown: &str) -> Self {
        let mut vocab = Self::new();
        let idx = vocab.insert(unknown);
        vocab.unknown = Some(idx);
        vocab
    }
    /// Vocabulary in the order of first appearance.
    pub fn from_tokens<'a, I: IntoIterator<Item = &'a str>>(tokens: I) -> Self {
        let mut vocab = Self::new();
        tokens.into_iter().for_each(|t| {
            vocab.insert(t);
        });
        vocab
    }
    /// Vocabulary in the lexicographic order.
    pub fn sorted<'a, I: IntoIterator<Item = &'a str>>(tokens: I) -> Self {
        let mut tokens: Vec<_> = tokens.into_iter().collect();
        tokens.sort_unstable();
        tokens.dedup();
        Self::from_tokens(tokens)
    }
    /// Insert `token` if absent and return its index.
    pub fn insert(&mut self, token: &str) -> usize {
        if let Some(&idx) = self.index.get(token) {
            return idx;
        }
        let idx = self.tokens.len();
        self.tokens.push(token.to_string());
        self.index.insert(token.to_string(), idx);
        idx
    }
    /// Index of `token`. Unknown tokens are mapped to the unknown index, if any.
    pub fn get(&self, token: &str) -> Option<usize> {
        self.index.get(token).copied().or(self.unknown)
    }
    pub fn token(&self, idx: usize) -> Option<&str> {
        self.tokens.get(idx).map(|t| t.as_str())
    }
    pub fn len(&self) -> usize {
        self.tokens.len()
    }
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
    pub fn encode<T: AsRef<str>>(&self, tokens: &[T]) -> Result<Vec<usize>> {
        tokens
            .iter()
            .map(|t| {
                self.get(t.as_ref())
                    .ok_or_else(|| HmmError::UnknownToken(t.as_ref().to_string()))
            })
            .collect()
    }
    pub fn decode(&self, indices: &[usize]) -> Option<Vec<&str>> {
        indices.iter().map(|&i| self.token(i)).collect()
    }
}

/// A corpus of `word/TAG` sentences.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaggedCorpus {
    sentences: Vec<Vec<(String, String)>>,
}

impl TaggedCorpus {
    /// Parse one sentence per line. The last `/` of each token separates the word and the tag.
    pub fn parse(contents: &str) -> Result<Self> {
        let mut position = 0;
        let mut sentences = vec![];
        for line in contents.lines().filter(|l| !l.trim().is_empty()) {
            let mut sentence = vec![];
            for token in line.split_whitespace() {
                match token.rsplit_once('/') {
                    Some((word, tag)) if !word.is_empty() && !tag.is_empty() => {
                        sentence.push((word.to_string(), tag.to_string()))
                    }
                    _ => {
                        return Err(HmmError::Parse {
                            position,
                            token: token.to_string(),
                        })
                    }
                }
                position += 1;
            }
            sentences.push(sentence);
        }
        Ok(Self { sentences })
    }
    pub fn read<P: AsRef<std::path::Path>>(file: &Option<P>) -> Result<Self> {
        let contents = read_to_string(file)?;
        Self::parse(&contents)
    }
    pub fn sentences(&self) -> &[Vec<(String, String)>] {
        &self.sentences
    }
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.sentences.iter().flatten().map(|(w, _)| w.as_str())
    }
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.sentences.iter().flatten().map(|(_, t)| t.as_str())
    }
    pub fn len(&self) -> usize {
        self.sentences.iter().map(|s| s.len()).sum()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Build the word and the tag vocabulary. The word vocabulary reserves `unknown` at index 0,
    /// so that unseen words in evaluation data can still be encoded.
    pub fn vocabularies(&self, unknown: &str) -> (Vocabulary, Vocabulary) {
        let mut words = Vocabulary::with_unknown(unknown);
        self.words().for_each(|w| {
            words.insert(w);
        });
        let tags = Vocabulary::sorted(self.tags());
        (words, tags)
    }
    /// Encode the whole corpus into one observation sequence and one state sequence.
    pub fn encode(&self, words: &Vocabulary, tags: &Vocabulary) -> Result<(Vec<usize>, Vec<usize>)> {
        let ws: Vec<_> = self.words().collect();
        let ts: Vec<_> = self.tags().collect();
        Ok((words.encode(&ws)?, tags.encode(&ts)?))
    }
}
