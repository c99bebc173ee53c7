use std::num::NonZeroUsize;
use std::str::SplitWhitespace;

/// Character budget used when callers do not pick one
pub const DEFAULT_MAX_CHARS: NonZeroUsize = NonZeroUsize::new(4000).unwrap();

/// Split `text` into word-aligned chunks of fewer than `max_chars` characters.
///
/// Words are accumulated greedily; each word costs its length plus one for the
/// separator. A word that alone reaches the budget still forms its own chunk,
/// words are never split.
pub fn chunk(text: &str, max_chars: NonZeroUsize) -> Chunks<'_> {
    Chunks {
        words: text.split_whitespace(),
        pending: None,
        max_chars: max_chars.get(),
    }
}

/// Lazy iterator over the chunks of a text
#[derive(Debug)]
pub struct Chunks<'a> {
    words: SplitWhitespace<'a>,
    pending: Option<&'a str>,
    max_chars: usize,
}

fn cost(word: &str) -> usize {
    word.chars().count() + 1
}

impl Iterator for Chunks<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let first = self.pending.take().or_else(|| self.words.next())?;

        let mut chunk = first.to_string();
        let mut running = cost(first);

        for word in self.words.by_ref() {
            let next = running + cost(word);
            if next < self.max_chars {
                chunk.push(' ');
                chunk.push_str(word);
                running = next;
            } else {
                self.pending = Some(word);
                break;
            }
        }

        Some(chunk)
    }
}
