//! DS-block difficulty adjustment.
//!
//! The original leaves `CalculateNewDifficulty` as an unimplemented TODO
//! ("To dynamically adjust the difficulty here"); the specification commits
//! to actually doing it, naming the function `adjustDifficulty(prevDifficulty,
//! observedSubmissionRate)` and leaving the exact rule open. Resolved here as
//! a classic retarget-to-target rule: difficulty moves by at most one step
//! per DS block, up when submissions came in faster than the target rate
//! (the network has more power than expected), down when slower, and is
//! clamped to `[MIN_DIFFICULTY, MAX_DIFFICULTY]`.

/// Lowest difficulty ever assigned.
pub const MIN_DIFFICULTY: u8 = 1;
/// Highest difficulty ever assigned.
pub const MAX_DIFFICULTY: u8 = 255;

/// Target number of PoW submissions expected during one submission window.
/// Observed counts above this push difficulty up; below, down.
pub const EXPECTED_SUBMISSIONS: u32 = 100;

/// Tolerance band, as a percentage of `EXPECTED_SUBMISSIONS`, within which no
/// adjustment is made.
const TOLERANCE_PERCENT: u32 = 10;

/// Compute the next difficulty from the previous one and the number of
/// verified submissions observed during the window that just closed.
///
/// Applies from DS block 2 onward; block 1 (genesis successor) keeps the
/// bootstrap difficulty unconditionally, which callers enforce by simply not
/// calling this for `block_num <= 1`.
pub fn adjust_difficulty(prev_difficulty: u8, observed_submissions: u32) -> u8 {
    let low = EXPECTED_SUBMISSIONS.saturating_sub(EXPECTED_SUBMISSIONS * TOLERANCE_PERCENT / 100);
    let high = EXPECTED_SUBMISSIONS + EXPECTED_SUBMISSIONS * TOLERANCE_PERCENT / 100;

    if observed_submissions > high {
        prev_difficulty.saturating_add(1).min(MAX_DIFFICULTY)
    } else if observed_submissions < low {
        prev_difficulty.saturating_sub(1).max(MIN_DIFFICULTY)
    } else {
        prev_difficulty
    }
}
