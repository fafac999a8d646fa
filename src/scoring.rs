//! Score awarded for a won game.

use tracing::instrument;

/// Points before any penalty or bonus.
pub const BASE_SCORE: i64 = 100;

/// Points lost per attempt, including the winning one.
pub const ATTEMPT_PENALTY: i64 = 10;

/// Lowest score a won game can award.
pub const MIN_SCORE: u32 = 10;

/// Computes the score for a game won on attempt `attempts` after `time_taken_secs`.
///
/// One bonus point is awarded per full ten seconds left on the clock.
#[instrument]
pub fn score(attempts: u32, time_taken_secs: u64, max_time_secs: u64) -> u32 {
    let remaining = max_time_secs as i64 - time_taken_secs as i64;
    let bonus = (remaining / 10).max(0);
    let raw = BASE_SCORE - i64::from(attempts) * ATTEMPT_PENALTY + bonus;
    raw.max(i64::from(MIN_SCORE)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn first_try_instant_win() {
        assert_eq!(score(1, 0, 120), 102);
    }

    #[test]
    fn bonus_rounds_down() {
        assert_eq!(score(4, 15, 120), 70);
        assert_eq!(score(4, 19, 120), 70);
        assert_eq!(score(4, 21, 120), 69);
    }

    #[test]
    fn late_win_earns_no_bonus() {
        assert_eq!(score(2, 120, 120), 80);
        assert_eq!(score(2, 300, 120), 80);
    }

    #[test]
    fn floor_is_ten() {
        assert_eq!(score(10, 120, 120), MIN_SCORE);
        assert_eq!(score(50, 0, 120), MIN_SCORE);
    }

    proptest! {
        #[test]
        fn never_below_floor(a in 0u32..1_000, t in 0u64..1_000) {
            prop_assert!(score(a, t, 120) >= MIN_SCORE);
        }

        #[test]
        fn more_attempts_never_help(a in 0u32..100, t in 0u64..200) {
            prop_assert!(score(a + 1, t, 120) <= score(a, t, 120));
        }

        #[test]
        fn faster_never_hurts(a in 0u32..100, t in 1u64..200) {
            prop_assert!(score(a, t - 1, 120) >= score(a, t, 120));
        }
    }
}
