//! Per-card mastery state machine.
//!
//! A correct answer moves a card forward, an incorrect one demotes it by at
//! most one tier. `Mastered` is only reachable from `AlmostDone`.
//!
//! | current    | correct    | incorrect  |
//! |------------|------------|------------|
//! | new        | almostDone | learning   |
//! | learning   | almostDone | learning   |
//! | almostDone | mastered   | learning   |
//! | mastered   | mastered   | almostDone |

use crate::types::MasteryStatus;

/// Compute the status that follows a graded answer.
pub fn next_status(current: MasteryStatus, is_correct: bool) -> MasteryStatus {
    use MasteryStatus::*;

    match (current, is_correct) {
        (New | Learning, true) => AlmostDone,
        (AlmostDone | Mastered, true) => Mastered,
        (New | Learning | AlmostDone, false) => Learning,
        (Mastered, false) => AlmostDone,
    }
}

impl MasteryStatus {
    /// See [`next_status`].
    pub fn next(self, is_correct: bool) -> Self {
        next_status(self, is_correct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use MasteryStatus::*;

    #[test]
    fn transition_table() {
        let table = [
            (New, AlmostDone, Learning),
            (Learning, AlmostDone, Learning),
            (AlmostDone, Mastered, Learning),
            (Mastered, Mastered, AlmostDone),
        ];
        for (current, on_correct, on_incorrect) in table {
            assert_eq!(next_status(current, true), on_correct, "{current:?} correct");
            assert_eq!(next_status(current, false), on_incorrect, "{current:?} incorrect");
        }
    }

    #[test]
    fn correct_never_moves_backwards() {
        for status in MasteryStatus::ALL {
            assert!(status.next(true) >= status, "{status:?}");
        }
    }

    #[test]
    fn incorrect_demotes_at_most_one_tier() {
        for status in MasteryStatus::ALL {
            let next = status.next(false);
            assert!(status.tier().saturating_sub(next.tier()) <= 1, "{status:?} -> {next:?}");
            assert_ne!(next, New);
        }
    }

    #[test]
    fn mastered_stays_mastered() {
        assert_eq!(Mastered.next(true), Mastered);
    }

    #[test]
    fn mastered_requires_checkpoint() {
        for status in [New, Learning] {
            assert_ne!(status.next(true), Mastered);
        }
    }
}
