//! # Page Break Decisions
//!
//! Logic for deciding where the next block goes. Blocks are atomic: they are
//! never split, only moved on to the next frame or page.

/// Where a block goes, given what is left of the current frame.
#[derive(Debug, Clone, PartialEq)]
pub enum BreakDecision {
    /// Place the block in the current frame (it fits).
    Place,
    /// The frame is empty but the block is taller than it; place it anyway.
    Overflow,
    /// Move on to the next frame of the same page.
    NextFrame,
    /// Finish this page and continue on a new one.
    NextPage,
}

/// Rounding slack when comparing heights.
const EPSILON: f64 = 1e-6;

/// Decide where a block of `block_height` goes.
///
/// A block that does not fit is moved on only if something is already in
/// the frame: moving it off an empty frame would not give it more room.
pub fn decide_break(
    block_height: f64,
    remaining_height: f64,
    frame_has_content: bool,
    has_next_frame: bool,
) -> BreakDecision {
    if block_height <= remaining_height + EPSILON {
        return BreakDecision::Place;
    }

    if !frame_has_content {
        return BreakDecision::Overflow;
    }

    if has_next_frame {
        BreakDecision::NextFrame
    } else {
        BreakDecision::NextPage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fits() {
        assert_eq!(decide_break(40.0, 100.0, true, false), BreakDecision::Place);
    }

    #[test]
    fn exact_fit_places() {
        assert_eq!(decide_break(100.0, 100.0, true, false), BreakDecision::Place);
    }

    #[test]
    fn overflow_moves_to_next_page() {
        assert_eq!(decide_break(120.0, 100.0, true, false), BreakDecision::NextPage);
    }

    #[test]
    fn overflow_prefers_next_frame() {
        assert_eq!(decide_break(120.0, 100.0, true, true), BreakDecision::NextFrame);
    }

    #[test]
    fn empty_frame_never_breaks() {
        // Breaking would only produce a blank page.
        assert_eq!(decide_break(900.0, 660.0, false, false), BreakDecision::Overflow);
    }
}
