//! Multi-level text splitting with overlap.
//!
//! Splitting prefers natural breaks, in order: blank-line paragraphs,
//! sentence boundaries, fixed-size word windows. All three levels share one
//! accumulate/emit/carry-overlap primitive ([`Accumulator`]), so the overlap
//! discipline is implemented exactly once. The word-window fallback
//! guarantees termination and no content loss even on pathological input.

use regex::Regex;
use std::sync::LazyLock;

static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("valid paragraph break regex"));

static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]\s+").expect("valid sentence break regex"));

/// Split *text* into chunks of at most `target_words` words (natural breaks
/// permitting), consecutive chunks sharing `overlap_words` words.
///
/// Text that already fits the budget is returned as a single chunk,
/// untouched apart from trimming.
pub(crate) fn split_text(text: &str, target_words: usize, overlap_words: usize) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    if text.split_whitespace().count() <= target_words {
        return vec![text.to_string()];
    }

    let mut acc = Accumulator::new(target_words, overlap_words);

    for para in PARAGRAPH_BREAK
        .split(text)
        .map(str::trim)
        .filter(|p| !p.is_empty())
    {
        let para_words: Vec<&str> = para.split_whitespace().collect();

        if para_words.len() > target_words {
            // Oversized paragraph: close the running buffer, then refill it
            // sentence by sentence.
            acc.emit();
            for sentence in split_sentences(para) {
                let sentence_words: Vec<&str> = sentence.split_whitespace().collect();
                if sentence_words.len() > target_words {
                    acc.push_windows(&sentence_words);
                } else {
                    acc.push_segment(&sentence_words);
                }
            }
        } else {
            acc.push_segment(&para_words);
        }
    }

    acc.finish()
}

/// Split a paragraph into sentences on end-of-sentence punctuation followed
/// by whitespace, keeping the punctuation with its sentence.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut last = 0;
    for m in SENTENCE_END.find_iter(text) {
        // The punctuation mark is a single ASCII byte; keep it, drop the gap.
        let end = m.start() + 1;
        let sentence = text[last..end].trim();
        if !sentence.is_empty() {
            sentences.push(sentence.to_string());
        }
        last = m.end();
    }
    let tail = text[last..].trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }
    sentences
}

/// The accumulate/emit/carry-overlap buffer shared by all split levels.
///
/// Segments accumulate until adding the next one would exceed the target;
/// the buffer is then emitted as a chunk and reseeded with its trailing
/// `overlap_words` words, which is how consecutive chunks come to share a
/// tail/head.
struct Accumulator {
    target_words: usize,
    overlap_words: usize,
    current: Vec<String>,
    chunks: Vec<String>,
}

impl Accumulator {
    fn new(target_words: usize, overlap_words: usize) -> Self {
        Self {
            target_words,
            overlap_words,
            current: Vec::new(),
            chunks: Vec::new(),
        }
    }

    /// Add a segment that fits the word budget on its own
    fn push_segment(&mut self, words: &[&str]) {
        if !self.current.is_empty() && self.current.len() + words.len() > self.target_words {
            self.emit();
        }
        self.current.extend(words.iter().map(|w| (*w).to_string()));
    }

    /// Emit the running buffer as a chunk and reseed it with the overlap tail
    fn emit(&mut self) {
        if self.current.is_empty() {
            return;
        }
        self.chunks.push(self.current.join(" "));
        let keep_from = self.current.len().saturating_sub(self.overlap_words);
        if self.overlap_words > 0 && keep_from < self.current.len() {
            self.current = self.current.split_off(keep_from);
        } else {
            self.current.clear();
        }
    }

    /// Final fallback for a segment that exceeds the budget on its own:
    /// fixed-size word windows with the configured overlap. All windows but
    /// the last are emitted directly; the last becomes the new buffer.
    fn push_windows(&mut self, words: &[&str]) {
        self.emit();

        let step = (self.target_words - self.overlap_words).max(1);
        let mut windows: Vec<&[&str]> = Vec::new();
        let mut start = 0;
        while start < words.len() {
            let end = (start + self.target_words).min(words.len());
            windows.push(&words[start..end]);
            start += step;
        }

        let Some((last, emitted)) = windows.split_last() else {
            return;
        };
        for window in emitted {
            self.chunks.push(window.join(" "));
        }
        self.current = last.iter().map(|w| (*w).to_string()).collect();
    }

    fn finish(mut self) -> Vec<String> {
        if !self.current.is_empty() {
            self.chunks.push(self.current.join(" "));
        }
        self.chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        (0..n)
            .map(|i| format!("word{i}"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_short_text_single_chunk() {
        let chunks = split_text("just a few words", 37, 3);
        assert_eq!(chunks, vec!["just a few words".to_string()]);
    }

    #[test]
    fn test_empty_text_no_chunks() {
        assert!(split_text("   \n\n  ", 37, 3).is_empty());
    }

    #[test]
    fn test_long_text_multiple_chunks() {
        let chunks = split_text(&words(150), 37, 3);
        assert!(chunks.len() > 1);
    }

    #[test]
    fn test_overlap_between_consecutive_chunks() {
        let overlap = 5;
        let chunks = split_text(&words(200), 37, overlap);
        assert!(chunks.len() >= 2);

        for pair in chunks.windows(2) {
            let tail: Vec<&str> = pair[0]
                .split_whitespace()
                .rev()
                .take(overlap)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            let head: Vec<&str> = pair[1].split_whitespace().take(overlap).collect();
            assert_eq!(tail, head);
        }
    }

    #[test]
    fn test_no_word_lost() {
        let original = words(500);
        let overlap = 7;
        let chunks = split_text(&original, 37, overlap);

        // Strip the duplicated overlap head from every chunk after the first
        let mut reconstructed: Vec<String> = chunks[0]
            .split_whitespace()
            .map(str::to_string)
            .collect();
        for chunk in &chunks[1..] {
            reconstructed.extend(chunk.split_whitespace().skip(overlap).map(str::to_string));
        }
        assert_eq!(reconstructed.join(" "), original);
    }

    #[test]
    fn test_prefers_paragraph_breaks() {
        // Two paragraphs of 30 words, target 37: one chunk per paragraph
        let text = format!("{}\n\n{}", words(30), words(30));
        let chunks = split_text(&text, 37, 3);
        assert_eq!(chunks.len(), 2);
    }

    #[test]
    fn test_sentence_fallback_for_oversized_paragraph() {
        let para = "The quick brown fox jumps over the lazy dog. \
                    A second sentence with enough words to fill space. \
                    And a third sentence that adds more content here. \
                    Finally a fourth sentence to push past the limit.";
        let chunks = split_text(para, 22, 2);
        assert!(chunks.len() >= 2);
        for chunk in &chunks {
            assert!(!chunk.is_empty());
        }
    }

    #[test]
    fn test_word_window_fallback_for_oversized_sentence() {
        // One sentence far past the target, no usable punctuation
        let sentence = words(100);
        let chunks = split_text(&sentence, 20, 4);
        assert!(chunks.len() > 1);

        let mut reconstructed: Vec<&str> = chunks[0].split_whitespace().collect();
        for chunk in &chunks[1..] {
            reconstructed.extend(chunk.split_whitespace().skip(4));
        }
        assert_eq!(reconstructed.join(" "), sentence);
    }

    #[test]
    fn test_single_enormous_token_terminates() {
        let token = "x".repeat(10_000);
        let chunks = split_text(&token, 7, 1);
        // One word always fits the budget as a single chunk
        assert_eq!(chunks, vec![token]);
    }

    #[test]
    fn test_zero_overlap() {
        let chunks = split_text(&words(100), 25, 0);
        assert!(chunks.len() > 1);
        let total: usize = chunks.iter().map(|c| c.split_whitespace().count()).sum();
        assert_eq!(total, 100);
    }

    #[test]
    fn test_split_sentences_keeps_punctuation() {
        let sentences = split_sentences("First one. Second one! Third one? Tail");
        assert_eq!(
            sentences,
            vec!["First one.", "Second one!", "Third one?", "Tail"]
        );
    }
}
