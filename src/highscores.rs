//! Top survival times for the current session. Nothing is written to disk.

/// Entries kept on the board.
pub const MAX_ENTRIES: usize = 5;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HighScores {
    /// Survival times in seconds, best first.
    times: Vec<f32>,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a finished run. Returns its 1-based rank if it made the board.
    pub fn record(&mut self, time: f32) -> Option<usize> {
        if !time.is_finite() || time < 0.0 {
            return None;
        }
        let pos = self.times.iter().position(|&t| time > t).unwrap_or(self.times.len());
        if pos >= MAX_ENTRIES {
            return None;
        }
        self.times.insert(pos, time);
        self.times.truncate(MAX_ENTRIES);
        log::info!("high score #{}: {:.2}s", pos + 1, time);
        Some(pos + 1)
    }

    pub fn times(&self) -> &[f32] {
        &self.times
    }

    pub fn best(&self) -> Option<f32> {
        self.times.first().copied()
    }
}
