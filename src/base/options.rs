/// Configuration shared by the tokenizer and the diff engine.
///
/// A [`crate::Session`] remembers the options it was produced with; updating
/// it through a [`crate::DiffParser`] configured differently is rejected,
/// since reused subtrees would no longer match what a fresh parse yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParseOptions {
    /// Column width a tab advances to when measuring indentation
    pub tab_width: u32,
    /// Reuse blocks from the previous session on `update`
    pub incremental: bool,
    /// Also reuse unchanged nested definitions inside reparsed blocks
    pub nested_reuse: bool,
    /// Misses tolerated in one update before the rest of the file is
    /// reparsed as a single region
    pub miss_limit: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            tab_width: 8,
            incremental: true,
            nested_reuse: true,
            miss_limit: 8,
        }
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tab_width(mut self, tab_width: u32) -> Self {
        self.tab_width = tab_width.max(1);
        self
    }

    pub fn with_incremental(mut self, incremental: bool) -> Self {
        self.incremental = incremental;
        self
    }

    pub fn with_nested_reuse(mut self, nested_reuse: bool) -> Self {
        self.nested_reuse = nested_reuse;
        self
    }

    pub fn with_miss_limit(mut self, miss_limit: usize) -> Self {
        self.miss_limit = miss_limit;
        self
    }
}
