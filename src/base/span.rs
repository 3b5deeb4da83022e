//! Byte offset to line/column conversion.

use rustc_hash::FxHashMap;

use super::Position;

pub use text_size::{TextRange, TextSize};

/// A multi-byte character inside a line, stored so columns can be counted in
/// characters without keeping the source text around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct WideChar {
    /// Byte offset from the start of the line
    start: TextSize,
    len: u8,
}

/// Maps byte offsets to [`Position`]s and back.
///
/// `\n`, `\r\n` and a lone `\r` all terminate a line, matching the tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    /// Byte offset of the first character of each line
    line_starts: Vec<TextSize>,
    /// Multi-byte characters keyed by 0-based line number
    wide_chars: FxHashMap<u32, Vec<WideChar>>,
    len: TextSize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::new(0)];
        let mut wide_chars: FxHashMap<u32, Vec<WideChar>> = FxHashMap::default();
        let mut line_start = 0usize;
        let mut chars = text.char_indices().peekable();

        while let Some((offset, c)) = chars.next() {
            match c {
                '\r' => {
                    if let Some(&(_, '\n')) = chars.peek() {
                        chars.next();
                        line_start = offset + 2;
                    } else {
                        line_start = offset + 1;
                    }
                    line_starts.push(TextSize::new(line_start as u32));
                }
                '\n' => {
                    line_start = offset + 1;
                    line_starts.push(TextSize::new(line_start as u32));
                }
                c if !c.is_ascii() => {
                    let line = (line_starts.len() - 1) as u32;
                    wide_chars.entry(line).or_default().push(WideChar {
                        start: TextSize::new((offset - line_start) as u32),
                        len: c.len_utf8() as u8,
                    });
                }
                _ => {}
            }
        }

        Self {
            line_starts,
            wide_chars,
            len: TextSize::of(text),
        }
    }

    /// Number of lines; an empty text and a text ending in a newline both
    /// count the final empty line.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Total length of the indexed text
    pub fn len(&self) -> TextSize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == TextSize::new(0)
    }

    /// Byte offset where the given 1-indexed line starts
    pub fn line_start(&self, line: usize) -> Option<TextSize> {
        line.checked_sub(1).and_then(|idx| self.line_starts.get(idx).copied())
    }

    /// Convert a byte offset into a position. Offsets past the end clamp to
    /// the end of the text.
    pub fn position(&self, offset: TextSize) -> Position {
        let offset = offset.min(self.len);
        let line = self.line_starts.partition_point(|&start| start <= offset) - 1;
        let byte_col = offset - self.line_starts[line];

        let mut column = u32::from(byte_col) as usize;
        if let Some(wide) = self.wide_chars.get(&(line as u32)) {
            for ch in wide.iter().take_while(|ch| ch.start < byte_col) {
                column -= ch.len as usize - 1;
            }
        }

        Position::new(line + 1, column)
    }

    /// Convert a position back into a byte offset, if it lies inside the text
    pub fn offset(&self, position: Position) -> Option<TextSize> {
        let line_idx = position.line.checked_sub(1)?;
        let start = *self.line_starts.get(line_idx)?;
        let end = self
            .line_starts
            .get(line_idx + 1)
            .copied()
            .unwrap_or(self.len);

        let mut extra = 0u32;
        if let Some(wide) = self.wide_chars.get(&(line_idx as u32)) {
            for ch in wide {
                if u32::from(ch.start) - extra >= position.column as u32 {
                    break;
                }
                extra += ch.len as u32 - 1;
            }
        }
        let byte_col = position.column as u32 + extra;

        let offset = start + TextSize::new(byte_col);
        (offset <= end).then_some(offset)
    }

    /// Position just past the last character
    pub fn end_position(&self) -> Position {
        self.position(self.len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", 0, (1, 0))]
    #[case("abc", 3, (1, 3))]
    #[case("a\nb", 2, (2, 0))]
    #[case("a\r\nb", 3, (2, 0))]
    #[case("a\rb", 2, (2, 0))]
    #[case("a\n", 2, (2, 0))]
    #[case("é = 1", 4, (1, 3))]
    fn test_position(#[case] text: &str, #[case] offset: u32, #[case] expected: (usize, usize)) {
        let index = LineIndex::new(text);
        assert_eq!(index.position(TextSize::new(offset)), expected);
    }

    #[test]
    fn test_crlf_counts_one_line_break() {
        let index = LineIndex::new("x\r\n\r\ny");
        assert_eq!(index.line_count(), 3);
        assert_eq!(index.end_position(), (3, 1));
    }

    #[test]
    fn test_offset_round_trip() {
        let text = "def f():\n    ñame = 'ü'\n";
        let index = LineIndex::new(text);
        for (offset, _) in text.char_indices() {
            let offset = TextSize::new(offset as u32);
            assert_eq!(index.offset(index.position(offset)), Some(offset));
        }
    }

    #[test]
    fn test_offset_out_of_range() {
        let index = LineIndex::new("ab\ncd");
        assert_eq!(index.offset(Position::new(3, 0)), None);
        assert_eq!(index.offset(Position::new(0, 0)), None);
    }
}
