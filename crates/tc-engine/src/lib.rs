//! Control engine for one tactus touch channel.
//!
//! Owns the mode state machine, the recorded-loop interval queue, and the
//! pulse-clock scheduler. Hardware is reached only through the `tc-ir`
//! collaborator traits; runtime side effects are emitted as an ordered
//! `Command` stream for the driver layer to execute.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod channel;
mod clock;
mod debounce;
mod event_queue;
mod irq;
mod quantizer;

pub use channel::{Channel, NoteState, RETRIGGER_GAP_US};
pub use clock::{LoopClock, DEFAULT_LOOP_STEPS, PPQN};
pub use debounce::{InputDebouncer, SWITCH_SETTLE_US};
pub use event_queue::{SpanAction, SpanQueue, SPAN_GUARD_GAP};
pub use irq::{IrqQueue, IrqReceiver, IrqSender, IRQ_CAPACITY};
pub use quantizer::{quantize, QuantizedNote, OCTAVE_THRESHOLDS, PAD_THRESHOLDS};

/// Channel bring-up failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    /// The capacitive touch controller did not answer at init. Fatal for
    /// the channel: the error LED pattern is shown and the channel must
    /// not be polled.
    TouchNotConnected,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::TouchNotConnected => write!(f, "touch controller not connected"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
