use std::collections::HashMap;

use crate::common::Color;

/// Per-extraction tally of sampled colors with a running leader.
#[derive(Debug, Default)]
pub struct FrequencyTable {
    counts: HashMap<Color, u32>,
    leader: Option<(Color, u32)>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one occurrence of `color`. The leader only changes on a strictly
    /// greater count, so the first color to reach a count keeps it.
    pub fn record(&mut self, color: Color) {
        let count = self.counts.entry(color).or_insert(0);
        *count += 1;
        let count = *count;

        let max = self.leader.map_or(0, |(_, max)| max);
        if count > max {
            self.leader = Some((color, count));
        }
    }

    #[cfg(test)]
    pub fn count(&self, color: &Color) -> u32 {
        self.counts.get(color).copied().unwrap_or(0)
    }

    pub fn dominant(&self) -> Option<Color> {
        self.leader.map(|(color, _)| color)
    }

    pub fn max_count(&self) -> u32 {
        self.leader.map_or(0, |(_, max)| max)
    }

    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
