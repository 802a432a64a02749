//! Core types for the tactus touch-channel control engine.
//!
//! One channel of the instrument has eight capacitive pads, a 3-position
//! mode switch with octave up/down, a 1V/oct pitch DAC, a gate output, pad
//! LEDs, and a MIDI port. This crate defines the data carried between the
//! interrupt boundary, the control engine, and the hardware drivers.
//!
//! Designed to be `no_std` compatible.

#![cfg_attr(not(feature = "std"), no_std)]

mod event;
pub mod hw;
mod leds;
mod notes;
mod span;
mod switches;

pub use event::{Command, InputEvent, IrqEvent};
pub use leds::LedMask;
pub use notes::{
    dac_code, midi_note, DAC_NOTE_TABLE, DAC_OCTAVE_OFFSET, DAC_SEMITONE, DEGREE_VARIANTS,
    MIDI_NOTE_TABLE, MIDI_OCTAVE_OFFSET, MIDI_VELOCITY,
};
pub use span::{LoopSpan, SpanKey};
pub use switches::{ModeSelect, OctaveMove, SwitchState, MODE_MASK, OCTAVE_MASK};

/// Number of touch pads on a channel.
pub const PAD_COUNT: usize = 8;

/// Number of selectable octaves.
pub const OCTAVE_COUNT: usize = 4;
