/// Work done by one `parse` or `update`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DiffStats {
    /// Blocks taken over from the previous session unchanged
    pub reused_blocks: usize,
    /// Blocks parsed again, merged ones included
    pub reparsed_blocks: usize,
    /// Nested definitions spliced into reparsed blocks
    pub reused_nodes: usize,
    /// Block ends that turned out not to be statement boundaries
    pub misses: usize,
}

impl DiffStats {
    pub fn total_blocks(&self) -> usize {
        self.reused_blocks + self.reparsed_blocks
    }

    /// Share of blocks reused, `0.0` when there were none
    pub fn reuse_rate(&self) -> f64 {
        match self.total_blocks() {
            0 => 0.0,
            total => self.reused_blocks as f64 / total as f64,
        }
    }
}
