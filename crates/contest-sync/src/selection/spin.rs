//! Spin selection.
//!
//! A spin shows a run of uniformly drawn "settling" frames and then commits
//! to a candidate. The committed candidate is the last frame, so what was
//! displayed last is always what gets selected.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::SelectionError;

/// Minimum number of settling frames per spin.
pub const MIN_SETTLE_FRAMES: usize = 60;
/// Extra frames drawn on top of the minimum (exclusive upper bound).
pub const SETTLE_FRAME_SPREAD: usize = 30;

#[derive(Debug, Clone)]
pub struct Spin<'a, T> {
    /// Settling frames, last one equal to `selected`.
    pub frames: Vec<&'a T>,
    pub selected: &'a T,
}

/// One uniform draw from `eligible`.
pub fn pick<'a, T, R: Rng + ?Sized>(
    eligible: &'a [T],
    rng: &mut R,
) -> Result<&'a T, SelectionError> {
    eligible.choose(rng).ok_or(SelectionError::NoEligibleCandidates)
}

/// Run a spin over `eligible`.
///
/// Fails with [`SelectionError::NoEligibleCandidates`] before drawing
/// anything when `eligible` is empty. Every frame is an independent uniform
/// draw with replacement.
pub fn spin<'a, T, R: Rng + ?Sized>(
    eligible: &'a [T],
    rng: &mut R,
) -> Result<Spin<'a, T>, SelectionError> {
    if eligible.is_empty() {
        return Err(SelectionError::NoEligibleCandidates);
    }

    let frame_count = MIN_SETTLE_FRAMES + rng.gen_range(0..SETTLE_FRAME_SPREAD);
    let mut frames = Vec::with_capacity(frame_count);
    for _ in 0..frame_count {
        frames.push(pick(eligible, rng)?);
    }
    let selected = frames[frames.len() - 1];

    Ok(Spin { frames, selected })
}
