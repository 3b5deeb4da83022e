//! Physical lines and the old-to-new line mapping
//!
//! Lines end at `\n`, `\r\n` or a lone `\r`, like everywhere else in the
//! crate. A text ending in a line break has no trailing empty line here.

use difference::{Changeset, Difference};

/// Physical lines of a text, terminators included
#[derive(Debug, Clone)]
pub struct Lines<'a> {
    text: &'a str,
    /// Byte offset where each line starts, plus the text length
    bounds: Vec<usize>,
}

impl<'a> Lines<'a> {
    pub fn new(text: &'a str) -> Self {
        let bytes = text.as_bytes();
        let mut bounds = vec![0];
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\r' if bytes.get(i + 1) == Some(&b'\n') => {
                    i += 2;
                    bounds.push(i);
                }
                b'\r' | b'\n' => {
                    i += 1;
                    bounds.push(i);
                }
                _ => i += 1,
            }
        }
        if bounds.last() != Some(&bytes.len()) {
            bounds.push(bytes.len());
        }
        Self { text, bounds }
    }

    pub fn len(&self) -> usize {
        self.bounds.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Line `idx` (0-based) with its terminator
    pub fn line(&self, idx: usize) -> &'a str {
        &self.text[self.bounds[idx]..self.bounds[idx + 1]]
    }

    pub fn start(&self, idx: usize) -> usize {
        self.bounds[idx.min(self.len())]
    }

    pub fn end(&self, idx: usize) -> usize {
        self.bounds[(idx + 1).min(self.len())]
    }

    /// 0-based line containing byte `offset`; the text end maps past the
    /// last line
    pub fn line_of(&self, offset: usize) -> usize {
        self.bounds.partition_point(|&start| start <= offset) - 1
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a str> + '_ {
        (0..self.len()).map(|idx| self.line(idx))
    }
}

/// Which old lines survive unchanged and where they moved
#[derive(Debug, Clone)]
pub struct LineDiff {
    old_to_new: Vec<Option<usize>>,
    new_unchanged: Vec<bool>,
}

impl LineDiff {
    pub fn new(old: &Lines<'_>, new: &Lines<'_>) -> Self {
        let mut old_to_new = vec![None; old.len()];
        let mut new_unchanged = vec![false; new.len()];

        let prefix = old
            .iter()
            .zip(new.iter())
            .take_while(|(a, b)| a == b)
            .count();
        let max_suffix = old.len().min(new.len()) - prefix;
        let suffix = (0..max_suffix)
            .take_while(|&k| old.line(old.len() - 1 - k) == new.line(new.len() - 1 - k))
            .count();

        let mut same = |o: usize, n: usize, count: usize| {
            for k in 0..count {
                old_to_new[o + k] = Some(n + k);
                new_unchanged[n + k] = true;
            }
        };
        same(0, 0, prefix);
        same(old.len() - suffix, new.len() - suffix, suffix);

        let old_mid: Vec<_> = (prefix..old.len() - suffix).map(|i| encode(old.line(i))).collect();
        let new_mid: Vec<_> = (prefix..new.len() - suffix).map(|i| encode(new.line(i))).collect();
        if !old_mid.is_empty() && !new_mid.is_empty() {
            let changeset = Changeset::new(&old_mid.join("\n"), &new_mid.join("\n"), "\n");
            let (mut o, mut n) = (prefix, prefix);
            for diff in &changeset.diffs {
                match diff {
                    Difference::Same(s) => {
                        let count = s.split('\n').count();
                        same(o, n, count);
                        o += count;
                        n += count;
                    }
                    Difference::Rem(s) => o += s.split('\n').count(),
                    Difference::Add(s) => n += s.split('\n').count(),
                }
            }
        }

        Self {
            old_to_new,
            new_unchanged,
        }
    }

    /// New line for an unchanged old line
    pub fn new_line(&self, old_line: usize) -> Option<usize> {
        self.old_to_new.get(old_line).copied().flatten()
    }

    pub fn is_unchanged(&self, new_line: usize) -> bool {
        self.new_unchanged.get(new_line).copied().unwrap_or(false)
    }

    /// New start line when `count` old lines starting at `old_line` all
    /// survive as one contiguous run
    pub fn map_run(&self, old_line: usize, count: usize) -> Option<usize> {
        let start = self.new_line(old_line)?;
        (1..count)
            .all(|k| self.new_line(old_line + k) == Some(start + k))
            .then_some(start)
    }

    /// Number of unchanged new lines
    pub fn unchanged_count(&self) -> usize {
        self.new_unchanged.iter().filter(|&&same| same).count()
    }
}

/// A line as one `\n`-free diff item. Contents never hold line breaks, so
/// the terminator is folded into a `\r` tag.
fn encode(line: &str) -> String {
    let (content, tag) = if let Some(content) = line.strip_suffix("\r\n") {
        (content, "\r")
    } else if let Some(content) = line.strip_suffix('\n') {
        (content, "")
    } else if let Some(content) = line.strip_suffix('\r') {
        (content, "\r\r")
    } else {
        (line, "\r\r\r")
    };
    format!("{content}{tag}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", 0)]
    #[case("a", 1)]
    #[case("a\n", 1)]
    #[case("a\nb", 2)]
    #[case("a\r\nb\r\n", 2)]
    #[case("a\rb\n\n", 3)]
    fn test_line_count(#[case] text: &str, #[case] count: usize) {
        assert_eq!(Lines::new(text).len(), count);
    }

    #[test]
    fn test_lines_keep_terminators() {
        let lines = Lines::new("a\r\nb\rc\nd");
        let all: Vec<_> = lines.iter().collect();
        assert_eq!(all, vec!["a\r\n", "b\r", "c\n", "d"]);
        assert_eq!(lines.line_of(0), 0);
        assert_eq!(lines.line_of(3), 1);
        assert_eq!(lines.line_of(7), 3);
        assert_eq!(lines.start(2), 5);
        assert_eq!(lines.end(2), 7);
    }

    #[test]
    fn test_diff_insert_in_middle() {
        let old = Lines::new("a\nb\nc\nd\n");
        let new = Lines::new("a\nb\nx\ny\nc\nd\n");
        let diff = LineDiff::new(&old, &new);
        assert_eq!(diff.new_line(0), Some(0));
        assert_eq!(diff.new_line(1), Some(1));
        assert_eq!(diff.new_line(2), Some(4));
        assert_eq!(diff.new_line(3), Some(5));
        assert!(!diff.is_unchanged(2));
        assert!(!diff.is_unchanged(3));
        assert_eq!(diff.map_run(2, 2), Some(4));
        assert_eq!(diff.map_run(1, 2), None);
    }

    #[test]
    fn test_diff_changed_line() {
        let old = Lines::new("def f():\n    return 1\n\nx = f()\n");
        let new = Lines::new("def f():\n    return 2\n\nx = f()\n");
        let diff = LineDiff::new(&old, &new);
        assert_eq!(diff.new_line(1), None);
        assert_eq!(diff.map_run(2, 2), Some(2));
        assert_eq!(diff.unchanged_count(), 3);
    }

    #[test]
    fn test_diff_sees_terminator_changes() {
        let old = Lines::new("a\nb\nc\n");
        let new = Lines::new("a\r\nb\nc\n");
        let diff = LineDiff::new(&old, &new);
        assert_eq!(diff.new_line(0), None);
        assert_eq!(diff.new_line(1), Some(1));
    }

    #[test]
    fn test_diff_middle_reorder() {
        let old = Lines::new("head\none\ntwo\nthree\ntail\n");
        let new = Lines::new("head\nthree\none\ntwo\ntail\n");
        let diff = LineDiff::new(&old, &new);
        assert_eq!(diff.new_line(0), Some(0));
        assert_eq!(diff.new_line(4), Some(4));
        assert_eq!(diff.map_run(1, 2), Some(2));
    }

    #[test]
    fn test_diff_missing_final_newline() {
        let old = Lines::new("a\nb");
        let new = Lines::new("a\nb\n");
        let diff = LineDiff::new(&old, &new);
        assert_eq!(diff.new_line(0), Some(0));
        assert_eq!(diff.new_line(1), None);
    }
}
