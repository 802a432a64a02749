//! Headless harness for the tactus touch-channel control engine.
//!
//! Wires a [`Channel`] to in-memory peripherals so host-side tests and
//! bring-up scripts can drive the poll step exactly the way firmware
//! does: latch an interrupt, poll, execute the resulting commands.

pub mod sim;

use embedded_hal::delay::DelayNs;
use sim::{NoDelay, SimDac, SimDegrees, SimGate, SimIo, SimMidi, SimTouch};
use tc_ir::hw::{DacSink, GateOutput, IoExpander, MidiSink, Port};
use tc_ir::{Command, IrqEvent};

// Re-export common types so tests don't need tc-ir/tc-engine directly.
pub use tc_engine::{
    Channel, Error, IrqQueue, NoteState, SpanQueue, DEFAULT_LOOP_STEPS, PPQN, SPAN_GUARD_GAP,
};
pub use tc_ir::{ModeSelect, MIDI_VELOCITY};

/// A channel wired to simulated peripherals.
pub struct Rig {
    pub channel: Channel,
    pub irq: IrqQueue,
    pub touch: SimTouch,
    pub io: SimIo,
    pub dac: SimDac,
    pub midi: SimMidi,
    pub gate: SimGate,
    pub degrees: SimDegrees,
    pub delay: NoDelay,
    /// Commands from every poll so far, in execution order.
    pub log: Vec<Command>,
    cv: Option<u16>,
}

impl Rig {
    pub fn new() -> Self {
        Self {
            channel: Channel::new(0),
            irq: IrqQueue::new(),
            touch: SimTouch::new(),
            io: SimIo::new(),
            dac: SimDac::default(),
            midi: SimMidi::default(),
            gate: SimGate::default(),
            degrees: SimDegrees::new(),
            delay: NoDelay,
            log: Vec::new(),
            cv: None,
        }
    }

    /// Run the channel's bring-up against the sim peripherals.
    pub fn init(&mut self) -> Result<(), Error> {
        self.channel
            .init(&mut self.touch, &mut self.io, &mut self.dac, &mut self.delay)
    }

    /// Touch a pad and latch the touch interrupt.
    pub fn touch_pad(&mut self, pad: u8) {
        self.touch.press(pad);
        self.irq.send(IrqEvent::Touch);
    }

    /// Release a pad and latch the touch interrupt.
    pub fn release_pad(&mut self, pad: u8) {
        self.touch.release(pad);
        self.irq.send(IrqEvent::Touch);
    }

    /// Move the switch register and latch its interrupt.
    pub fn set_switches(&mut self, bits: u8) {
        self.io.set_switches(bits);
        self.irq.send(IrqEvent::Switch);
    }

    /// Latch one external clock pulse.
    pub fn pulse(&mut self) {
        self.irq.send(IrqEvent::Pulse);
    }

    /// Queue a CV sample for the next poll.
    pub fn sample_cv(&mut self, value: u16) {
        self.cv = Some(value);
    }

    /// One poll cycle: run the engine, execute its commands against the
    /// sim drivers, and return them.
    pub fn poll(&mut self) -> Vec<Command> {
        let mut out = Vec::new();
        let cv = self.cv.take();
        self.channel.poll(
            &mut self.irq,
            &mut self.touch,
            &mut self.io,
            &mut self.degrees,
            &mut self.delay,
            cv,
            &mut out,
        );
        for &command in &out {
            self.apply(command);
        }
        self.log.extend(out.iter().copied());
        out
    }

    /// `n` pulses, polling after each (the firmware cadence).
    pub fn run_pulses(&mut self, n: u32) -> Vec<Command> {
        let mut all = Vec::new();
        for _ in 0..n {
            self.pulse();
            all.extend(self.poll());
        }
        all
    }

    /// Execute one command the way the driver layer would.
    fn apply(&mut self, command: Command) {
        match command {
            Command::Gate(high) => self.gate.write(high),
            Command::Leds(mask) => self.io.digital_write(Port::A, mask),
            Command::OctaveLeds(one_hot) => self.io.digital_write(Port::B, one_hot << 4),
            Command::Dac(code) => self.dac.write(code),
            Command::MidiNoteOn {
                channel,
                note,
                velocity,
            } => self.midi.note_on(channel, note, velocity),
            Command::MidiNoteOff {
                channel,
                note,
                velocity,
            } => self.midi.note_off(channel, note, velocity),
            Command::DelayUs(us) => self.delay.delay_us(us),
        }
    }
}

impl Default for Rig {
    fn default() -> Self {
        Self::new()
    }
}
