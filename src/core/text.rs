//! Text preparation and sentence chunking.
//!
//! Pure functions, no I/O: everything here is directly unit-testable and the
//! chunk iterator can be restarted by calling [`chunk`] again on the same
//! input.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::tts::{TTSError, TTSResult};

/// Default per-segment character budget for synthesis requests.
pub const DEFAULT_MAX_CHARS: usize = 600;

/// Optional speaker-label prefix stripped from incoming text.
static LABEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*laura:\s*").expect("label regex must compile"));

/// Sentence boundary: `.`, `!` or `?` followed by whitespace. The split point
/// sits after the punctuation character, so sentences keep their terminator
/// and the whitespace run is consumed.
static SENTENCE_BOUNDARY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]\s+").expect("sentence regex must compile"));

/// Normalize raw request text: trim, drop one leading `LAURA:` label
/// (case-insensitive), and reject empty results.
pub fn prepare(raw: &str) -> TTSResult<String> {
    let trimmed = raw.trim();
    let stripped = LABEL_RE.replace(trimmed, "");
    let text = stripped.trim();
    if text.is_empty() {
        return Err(TTSError::InvalidInput("empty text".to_string()));
    }
    Ok(text.to_string())
}

/// Hard cut at exactly `max` characters. No word-boundary awareness; the
/// caller opted out of chunking and gets bounded latency instead.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Lazily split `text` into synthesis segments of at most `max_chars`
/// characters, accumulating whole sentences greedily.
///
/// A single sentence longer than `max_chars` is not split further; it comes
/// through as an oversized segment of its own.
pub fn chunk(text: &str, max_chars: usize) -> Chunks<'_> {
    Chunks {
        sentences: sentences(text),
        carry: None,
        max_chars,
    }
}

/// Iterator over the sentence-like units of a text.
struct Sentences<'t> {
    text: &'t str,
    boundaries: regex::Matches<'static, 't>,
    pos: usize,
    done: bool,
}

fn sentences(text: &str) -> Sentences<'_> {
    Sentences {
        text,
        boundaries: SENTENCE_BOUNDARY_RE.find_iter(text),
        pos: 0,
        done: false,
    }
}

impl<'t> Iterator for Sentences<'t> {
    type Item = &'t str;

    fn next(&mut self) -> Option<&'t str> {
        if self.done {
            return None;
        }
        for boundary in self.boundaries.by_ref() {
            // Keep the punctuation character, drop the whitespace run.
            let end = boundary.start() + 1;
            if end <= self.pos {
                continue;
            }
            let sentence = &self.text[self.pos..end];
            self.pos = boundary.end();
            return Some(sentence);
        }
        self.done = true;
        let rest = &self.text[self.pos..];
        if rest.is_empty() { None } else { Some(rest) }
    }
}

/// Lazy, finite sequence of bounded text segments. See [`chunk`].
pub struct Chunks<'t> {
    sentences: Sentences<'t>,
    carry: Option<&'t str>,
    max_chars: usize,
}

impl<'t> Iterator for Chunks<'t> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let mut current = String::new();
        let mut current_chars = 0usize;

        loop {
            let sentence = match self.carry.take() {
                Some(s) => s,
                None => match self.sentences.next() {
                    Some(s) => s,
                    None => break,
                },
            };
            let sentence_chars = sentence.chars().count();
            if current.is_empty() {
                // First sentence of a segment always fits, even oversized.
                current.push_str(sentence);
                current_chars = sentence_chars;
            } else if current_chars + sentence_chars + 1 <= self.max_chars {
                current.push(' ');
                current.push_str(sentence);
                current_chars += sentence_chars + 1;
            } else {
                self.carry = Some(sentence);
                break;
            }
        }

        if current.is_empty() { None } else { Some(current) }
    }
}
