//! Content analysis
//!
//! Word count, keyword density and a Flesch Reading Ease approximation over
//! the visible text of a page.
//!
//! Two word counts coexist on purpose: `word_count` is a whitespace split of
//! the trimmed text, while keyword density divides by the number of
//! `\b\w+\b` tokens. They differ on punctuation-heavy text.

use crate::report::ContentStats;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, instrument};

// ASCII word characters and boundaries, as in browser regex engines
static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?-u:\b\w+\b)").expect("valid token regex"));
static SENTENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+").expect("valid sentence regex"));

/// Only tokens longer than this count as keywords
const MIN_KEYWORD_LEN: usize = 3;
/// Number of keywords reported
const TOP_KEYWORDS: usize = 10;

/// Content analysis functionality
pub struct ContentAnalyzer;

impl ContentAnalyzer {
    /// Analyze the visible text of a page
    #[instrument(skip(text), fields(chars = text.len()))]
    pub fn analyze(text: &str) -> ContentStats {
        let tokens = Self::tokenize(text);
        let stats = ContentStats {
            word_count: Self::word_count(text),
            readability_score: Self::readability_score(text),
            keyword_density: Self::keyword_density(&tokens),
        };

        debug!(
            "Content: {} words, {} tokens, readability {:.1}",
            stats.word_count,
            tokens.len(),
            stats.readability_score
        );
        stats
    }

    /// Whitespace-separated word count of the trimmed text
    pub fn word_count(text: &str) -> usize {
        text.split_whitespace().count()
    }

    /// Lower-cased runs of ASCII word characters (`[A-Za-z0-9_]`)
    pub fn tokenize(text: &str) -> Vec<String> {
        let lower = text.to_lowercase();
        TOKEN_RE
            .find_iter(&lower)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Density of the ten most frequent tokens longer than three characters,
    /// as a percentage of all tokens. Ties keep first-occurrence order.
    pub fn keyword_density(tokens: &[String]) -> BTreeMap<String, f64> {
        if tokens.is_empty() {
            return BTreeMap::new();
        }

        let mut order: Vec<&str> = Vec::new();
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for token in tokens
            .iter()
            .filter(|t| t.chars().count() > MIN_KEYWORD_LEN)
        {
            let count = counts.entry(token.as_str()).or_insert(0);
            if *count == 0 {
                order.push(token.as_str());
            }
            *count += 1;
        }

        // stable sort keeps first-occurrence order among equal counts
        order.sort_by(|a, b| counts[b].cmp(&counts[a]));

        let total = tokens.len() as f64;
        order
            .into_iter()
            .take(TOP_KEYWORDS)
            .map(|word| (word.to_string(), counts[word] as f64 / total * 100.0))
            .collect()
    }

    /// Segments produced by a naive split on runs of `.`, `!` and `?`,
    /// including a trailing empty segment
    pub fn sentence_count(text: &str) -> usize {
        SENTENCE_RE.split(text).count()
    }

    /// Heuristic syllable count for one whitespace-delimited word. The word
    /// is taken as is, so trailing punctuation counts toward its length and
    /// blocks the silent-e rule.
    pub fn count_syllables(word: &str) -> usize {
        let word = word.to_lowercase();
        let chars: Vec<char> = word.chars().collect();
        if chars.len() <= 3 {
            return 1;
        }

        let is_vowel = |c: char| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
        let mut count: isize = 0;
        let mut prev_vowel = false;
        for &c in &chars {
            let vowel = is_vowel(c);
            if vowel && !prev_vowel {
                count += 1;
            }
            prev_vowel = vowel;
        }

        if chars.last() == Some(&'e') {
            count -= 1;
        }
        count.max(1) as usize
    }

    /// Flesch Reading Ease approximation; 0 for empty text
    pub fn readability_score(text: &str) -> f64 {
        let words: Vec<&str> = text.split_whitespace().collect();
        let sentences = Self::sentence_count(text);
        if words.is_empty() || sentences == 0 {
            return 0.0;
        }

        let syllables: usize = words.iter().map(|w| Self::count_syllables(w)).sum();
        let words = words.len() as f64;
        let sentences = sentences as f64;

        206.835 - 1.015 * (words / sentences) - 84.6 * (syllables as f64 / words)
    }
}
