use std::collections::VecDeque;

/// Outcome of a single match. `winner` is `None` for a draw at the tick
/// limit.
pub struct MatchResult {
    pub winner: Option<usize>,
    pub length: u64,
}

/// Training metrics tracker with rolling window computations.
pub struct TrainingMetrics {
    match_results: VecDeque<MatchResult>,
    capacity: usize,
    total_matches: usize, // lifetime count, never capped
    scores: [usize; 2],
}

impl TrainingMetrics {
    pub fn with_capacity(capacity: usize) -> Self {
        TrainingMetrics {
            match_results: VecDeque::with_capacity(capacity),
            capacity,
            total_matches: 0,
            scores: [0; 2],
        }
    }

    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    pub fn record_match(&mut self, result: MatchResult) {
        self.total_matches += 1;
        if let Some(winner) = result.winner {
            if winner < self.scores.len() {
                self.scores[winner] += 1;
            }
        }
        self.match_results.push_back(result);
        if self.match_results.len() > self.capacity {
            self.match_results.pop_front();
        }
    }

    /// Win rate for one team over the last N matches.
    pub fn win_rate(&self, team: usize, last_n: usize) -> f32 {
        let n = self.match_results.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let wins = self
            .match_results
            .iter()
            .rev()
            .take(n)
            .filter(|r| r.winner == Some(team))
            .count();
        wins as f32 / n as f32
    }

    /// Draw rate over the last N matches.
    pub fn draw_rate(&self, last_n: usize) -> f32 {
        let n = self.match_results.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let draws = self
            .match_results
            .iter()
            .rev()
            .take(n)
            .filter(|r| r.winner.is_none())
            .count();
        draws as f32 / n as f32
    }

    /// Average match length in ticks over the last N matches.
    pub fn average_match_length(&self, last_n: usize) -> f32 {
        let n = self.match_results.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let total: u64 = self
            .match_results
            .iter()
            .rev()
            .take(n)
            .map(|r| r.length)
            .sum();
        total as f32 / n as f32
    }

    /// Lifetime wins per team.
    pub fn scores(&self) -> [usize; 2] {
        self.scores
    }

    pub fn total_matches(&self) -> usize {
        self.total_matches
    }
}

impl Default for TrainingMetrics {
    fn default() -> Self {
        Self::new()
    }
}
