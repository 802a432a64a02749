//! Recorded loop interval type.

use slotmap::new_key_type;

new_key_type! {
    /// Stable handle to a recorded span in the loop arena.
    pub struct SpanKey;
}

/// One recorded note interval within the loop.
///
/// Positions are tick counts in the clock's loop coordinate space. The queue
/// keeps spans sorted ascending by `start` with no overlap between
/// neighbours (`a.end <= b.start` for consecutive spans).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoopSpan {
    /// Pad that played the note (0-7).
    pub pad: u8,
    /// Tick position where the note turns on.
    pub start: u32,
    /// Tick position where the note turns off.
    pub end: u32,
    /// True while the ON has fired but the OFF has not.
    pub triggered: bool,
}

impl LoopSpan {
    /// Create an untriggered span.
    pub const fn new(pad: u8, start: u32, end: u32) -> Self {
        Self {
            pad,
            start,
            end,
            triggered: false,
        }
    }
}
