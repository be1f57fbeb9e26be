//! CaptureSequencer - ordered multi-shot state machine
//!
//! Pure state over the configured side list: `Capturing(side)` advances
//! through the sides in order and ends in `Complete`, which is terminal
//! until an explicit reset.

use super::types::{CaptureConfig, Side};
use crate::error::{Error, Result};
use serde::Serialize;

/// Sequencer state, observable by the station UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "side")]
pub enum SequencerState {
    Capturing(Side),
    Complete,
}

/// Result of accepting one shot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// The side that was just captured
    pub captured: Side,
    /// Next side to capture, None once complete
    pub next: Option<Side>,
    /// Whether the next side needs a different physical camera
    pub facing_changed: bool,
}

pub struct CaptureSequencer {
    config: CaptureConfig,
    position: usize,
}

impl CaptureSequencer {
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            position: 0,
        }
    }

    pub fn state(&self) -> SequencerState {
        match self.config.sides().get(self.position) {
            Some(side) => SequencerState::Capturing(*side),
            None => SequencerState::Complete,
        }
    }

    /// Side currently being captured, None once complete
    pub fn current_side(&self) -> Option<Side> {
        self.config.sides().get(self.position).copied()
    }

    pub fn is_complete(&self) -> bool {
        self.position >= self.config.shot_count()
    }

    pub fn shots_taken(&self) -> usize {
        self.position
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Record one accepted shot and advance
    ///
    /// Rejected once complete: the capture button must not be actionable
    /// past the configured maximum.
    pub fn accept_shot(&mut self) -> Result<Transition> {
        let captured = self.current_side().ok_or_else(|| {
            Error::Validation(format!(
                "capture set already complete ({} shots)",
                self.config.shot_count()
            ))
        })?;

        self.position += 1;
        let next = self.current_side();
        let facing_changed = next.map(|n| n.facing() != captured.facing()).unwrap_or(false);

        Ok(Transition {
            captured,
            next,
            facing_changed,
        })
    }

    /// Return to the first side; the caller clears shots and re-acquires
    /// the initial-facing camera
    pub fn reset(&mut self) {
        self.position = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_shot_order() {
        let mut seq = CaptureSequencer::new(CaptureConfig::from_shot_count(2).unwrap());
        assert_eq!(seq.current_side(), Some(Side::Front));

        let t = seq.accept_shot().unwrap();
        assert_eq!(t.captured, Side::Front);
        assert_eq!(t.next, Some(Side::Back));
        assert!(!t.facing_changed);

        let t = seq.accept_shot().unwrap();
        assert_eq!(t.captured, Side::Back);
        assert_eq!(t.next, None);
        assert!(seq.is_complete());
        assert_eq!(seq.state(), SequencerState::Complete);
    }

    #[test]
    fn test_three_shot_order_switches_facing_for_selfie() {
        let mut seq = CaptureSequencer::new(CaptureConfig::from_shot_count(3).unwrap());

        let t = seq.accept_shot().unwrap();
        assert_eq!((t.captured, t.next), (Side::Front, Some(Side::Back)));
        assert!(!t.facing_changed);

        let t = seq.accept_shot().unwrap();
        assert_eq!((t.captured, t.next), (Side::Back, Some(Side::Selfie)));
        assert!(t.facing_changed);

        let t = seq.accept_shot().unwrap();
        assert_eq!((t.captured, t.next), (Side::Selfie, None));
        assert!(seq.is_complete());
    }

    #[test]
    fn test_accepts_exactly_n_shots() {
        for count in [2usize, 3] {
            let mut seq = CaptureSequencer::new(CaptureConfig::from_shot_count(count).unwrap());
            for _ in 0..count {
                seq.accept_shot().unwrap();
            }
            assert!(matches!(seq.accept_shot(), Err(Error::Validation(_))));
            assert_eq!(seq.shots_taken(), count);
        }
    }

    #[test]
    fn test_reset_returns_to_front() {
        let mut seq = CaptureSequencer::new(CaptureConfig::from_shot_count(2).unwrap());
        seq.accept_shot().unwrap();
        seq.accept_shot().unwrap();
        assert!(seq.is_complete());

        seq.reset();
        assert_eq!(seq.current_side(), Some(Side::Front));
        assert_eq!(seq.shots_taken(), 0);
    }
}
