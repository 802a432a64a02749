//! Event and command types crossing the engine's boundaries.

use crate::switches::SwitchState;

/// Message from interrupt context into the poll step.
///
/// Interrupt handlers enqueue one of these and return; the poll step is the
/// sole consumer, and the sole mutator of channel, queue, and clock state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IrqEvent {
    /// The capacitive controller latched a touch edge.
    Touch,
    /// The IO expander latched a switch edge.
    Switch,
    /// One external clock pulse.
    Pulse,
    /// An external quarter-note boundary.
    Step,
}

/// A debounced, discrete input event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    /// Pad went from released to touched.
    PadDown(u8),
    /// Pad went from touched to released.
    PadUp(u8),
    /// The switch register settled on a new snapshot.
    SwitchChanged(SwitchState),
    /// A CV reading was sampled (quantizer mode input).
    CvSample(u16),
}

/// One hardware side effect requested by the engine.
///
/// The engine appends commands to a buffer during a poll cycle; the driver
/// layer executes them in buffer order. Ordering is part of the contract:
/// the OFF sequence for a sounding note always precedes the ON that
/// replaces it on the shared gate output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Set the channel gate output.
    Gate(bool),
    /// Write the pad LED bitmask (bit `i` ↔ pad `i`).
    Leds(u8),
    /// Write the one-hot octave indicator LEDs.
    OctaveLeds(u8),
    /// Write a 16-bit code to the pitch DAC.
    Dac(u16),
    /// Send a MIDI note-on.
    MidiNoteOn { channel: u8, note: u8, velocity: u8 },
    /// Send a MIDI note-off.
    MidiNoteOff { channel: u8, note: u8, velocity: u8 },
    /// Hold off this many microseconds before the next command.
    DelayUs(u32),
}
