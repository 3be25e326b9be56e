//! Overlapping character-window splitter.
//!
//! Windows are `chunk_size` characters wide. A window that does not reach the end of
//! the text is shortened to the last paragraph break, line break or space found in its
//! second half. The next window starts `chunk_overlap` characters before the previous
//! end, pulled back to a word start when one is close. Consecutive chunks therefore
//! share at least `chunk_overlap` characters and together cover the whole input.

use serde::Serialize;

/// How far back a window start may move to land on a word boundary.
const WORD_SNAP: usize = 40;

/// A bounded slice of source text. `offset` is the character index of its first char.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    pub text: String,
    pub offset: usize,
}

impl Chunk {
    /// Character index one past the last char.
    pub fn end(&self) -> usize {
        self.offset + self.text.chars().count()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Default for TextSplitter {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

impl TextSplitter {
    /// `chunk_overlap` is capped below `chunk_size`; a zero size is treated as 1.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            chunk_overlap: chunk_overlap.min(chunk_size - 1),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    pub fn split(&self, text: &str) -> Vec<Chunk> {
        let chars: Vec<char> = text.chars().collect();
        let len = chars.len();
        let mut chunks = Vec::new();

        let mut start = 0;
        let mut prev_end = 0;
        while start < len {
            let hard_end = (start + self.chunk_size).min(len);
            let end = if hard_end == len {
                len
            } else {
                self.soft_end(&chars, start, hard_end, prev_end)
            };

            let piece: String = chars[start..end].iter().collect();
            if !piece.trim().is_empty() {
                chunks.push(Chunk {
                    text: piece,
                    offset: start,
                });
            }

            if end == len {
                break;
            }
            start = self.next_start(&chars, start, end);
            prev_end = end;
        }

        chunks
    }

    /// Latest separator position in `[min_end, hard_end]`, preferring paragraph breaks,
    /// then line breaks, then any whitespace. Falls back to `hard_end`.
    fn soft_end(&self, chars: &[char], start: usize, hard_end: usize, prev_end: usize) -> usize {
        let min_end = (start + self.chunk_overlap + 1)
            .max(start + self.chunk_size / 2)
            .max(prev_end + 1)
            .min(hard_end);

        let paragraph = |p: usize| p >= 2 && chars[p - 1] == '\n' && chars[p - 2] == '\n';
        let line = |p: usize| chars[p - 1] == '\n';
        let space = |p: usize| chars[p - 1].is_whitespace();

        [
            &paragraph as &dyn Fn(usize) -> bool,
            &line as &dyn Fn(usize) -> bool,
            &space as &dyn Fn(usize) -> bool,
        ]
        .iter()
        .find_map(|is_break| (min_end.max(1)..=hard_end).rev().find(|&p| is_break(p)))
        .unwrap_or(hard_end)
    }

    /// Start of the window following one that ended at `end`.
    fn next_start(&self, chars: &[char], start: usize, end: usize) -> usize {
        let base = end - self.chunk_overlap;
        // The next hard end must still pass `end`, and the window must move forward.
        let floor = base
            .saturating_sub(WORD_SNAP)
            .max(start + 1)
            .max((end + 1).saturating_sub(self.chunk_size));
        if floor > base {
            return base;
        }
        (floor..=base)
            .rev()
            .find(|&p| chars[p - 1].is_whitespace())
            .unwrap_or(base)
    }
}
