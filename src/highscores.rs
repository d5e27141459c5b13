//! High score leaderboard system
//!
//! Persisted to LocalStorage, tracks the top 3 scores.

use serde::{Deserialize, Serialize};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 3;

/// High score leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub scores: Vec<u32>,
}

impl HighScores {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "neon_invaders_highscores";

    /// Create empty leaderboard
    pub fn new() -> Self {
        Self { scores: Vec::new() }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u32) -> bool {
        if score == 0 {
            return false;
        }
        if self.scores.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.scores.last().map(|&s| score > s).unwrap_or(true)
    }

    /// Add a new score to the leaderboard (if it qualifies)
    /// Returns the rank achieved (1-indexed) or None if didn't qualify
    pub fn add_score(&mut self, score: u32) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        // Insertion point, sorted descending
        let pos = self.scores.iter().position(|&s| score > s);
        let rank = match pos {
            Some(i) => {
                self.scores.insert(i, score);
                i + 1
            }
            None => {
                self.scores.push(score);
                self.scores.len()
            }
        };

        self.scores.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u32> {
        self.scores.first().copied()
    }

    /// Load high scores from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(scores) = serde_json::from_str::<HighScores>(&json) {
                    log::info!("Loaded {} high scores", scores.scores.len());
                    return scores;
                }
            }
        }

        log::info!("No high scores found, starting fresh");
        Self::new()
    }

    /// Save high scores to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("High scores saved ({} entries)", self.scores.len());
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_never_qualifies() {
        let board = HighScores::new();
        assert!(!board.qualifies(0));
        assert!(board.qualifies(1));
    }

    #[test]
    fn keeps_top_three_sorted_descending() {
        let mut board = HighScores::new();
        assert_eq!(board.add_score(100), Some(1));
        assert_eq!(board.add_score(300), Some(1));
        assert_eq!(board.add_score(200), Some(2));
        assert_eq!(board.scores, vec![300, 200, 100]);

        // Fourth score bumps the lowest
        assert_eq!(board.add_score(250), Some(2));
        assert_eq!(board.scores, vec![300, 250, 200]);
    }

    #[test]
    fn low_score_rejected_when_full() {
        let mut board = HighScores {
            scores: vec![300, 200, 100],
        };
        assert_eq!(board.add_score(50), None);
        assert_eq!(board.scores, vec![300, 200, 100]);
    }

    #[test]
    fn ties_do_not_displace() {
        let mut board = HighScores {
            scores: vec![300, 200, 100],
        };
        assert_eq!(board.add_score(100), None);
    }

    #[test]
    fn top_score_reads_first_entry() {
        let mut board = HighScores::new();
        assert_eq!(board.top_score(), None);
        board.add_score(42);
        assert_eq!(board.top_score(), Some(42));
    }
}
