//! Per-channel mode state machine and note trigger path.
//!
//! `Channel` is the control core of one touch channel. Its `poll` method is
//! the only per-cycle entry point: it drains the interrupt event ring,
//! turns register reads into discrete edges, advances the clock, and lets
//! the active mode decide what the inputs mean. Everything the hardware
//! must do comes back out as an ordered [`Command`] stream.

use alloc::vec::Vec;

use embedded_hal::delay::DelayNs;
use tc_ir::hw::{
    DacSink, DegreeSource, GainMode, IoExpander, Port, PowerMode, RefMode, TouchSensor,
};
use tc_ir::{
    dac_code, midi_note, Command, InputEvent, IrqEvent, LedMask, ModeSelect, OctaveMove,
    SwitchState, MIDI_VELOCITY, OCTAVE_COUNT, PAD_COUNT,
};

use crate::clock::LoopClock;
use crate::debounce::{InputDebouncer, SWITCH_SETTLE_US};
use crate::event_queue::{SpanAction, SpanQueue};
use crate::irq::IrqQueue;
use crate::quantizer::{quantize, QuantizedNote};
use crate::Error;

/// Microseconds between a note OFF and the ON that replaces it when a note
/// is re-triggered within one cycle (octave moves, degree changes).
pub const RETRIGGER_GAP_US: u32 = 5;

/// Whether the channel's single gate is sounding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoteState {
    On,
    Off,
}

/// Mode-independent channel state: octave, note bookkeeping, LED mask, and
/// the last settled switch snapshot.
#[derive(Debug)]
struct ChannelCore {
    /// 0-based channel index; doubles as the MIDI channel.
    index: u8,
    octave: u8,
    prev_octave: u8,
    curr_note: u8,
    prev_note: u8,
    note_state: NoteState,
    leds: LedMask,
    switches: SwitchState,
}

impl ChannelCore {
    /// Fire the gate/LED/DAC/MIDI side effects for a note edge.
    ///
    /// Command order within one call is the §-mandated hardware order:
    /// gate first, LEDs, then pitch, then MIDI.
    fn trigger(
        &mut self,
        pad: u8,
        octave: u8,
        state: NoteState,
        degrees: &impl DegreeSource,
        out: &mut Vec<Command>,
    ) {
        let degree = degrees.degree(pad);
        match state {
            NoteState::On => {
                self.curr_note = pad;
                self.note_state = NoteState::On;
                out.push(Command::Gate(true));
                out.push(Command::Leds(self.leds.set(pad, true)));
                out.push(Command::Dac(dac_code(pad, degree, octave)));
                out.push(Command::MidiNoteOn {
                    channel: self.index,
                    note: midi_note(pad, degree, octave),
                    velocity: MIDI_VELOCITY,
                });
            }
            NoteState::Off => {
                self.note_state = NoteState::Off;
                out.push(Command::Gate(false));
                out.push(Command::Leds(self.leds.set(pad, false)));
                out.push(Command::MidiNoteOff {
                    channel: self.index,
                    note: midi_note(pad, degree, octave),
                    velocity: MIDI_VELOCITY,
                });
            }
        }
        self.prev_note = pad;
    }
}

/// Pads play notes directly.
#[derive(Debug, Default)]
struct MonoMode;

impl MonoMode {
    fn on_pad_down(
        &mut self,
        core: &mut ChannelCore,
        pad: u8,
        degrees: &impl DegreeSource,
        out: &mut Vec<Command>,
    ) {
        let octave = core.octave;
        core.trigger(pad, octave, NoteState::On, degrees, out);
    }

    fn on_pad_up(
        &mut self,
        core: &mut ChannelCore,
        pad: u8,
        degrees: &impl DegreeSource,
        out: &mut Vec<Command>,
    ) {
        let octave = core.octave;
        core.trigger(pad, octave, NoteState::Off, degrees, out);
    }
}

/// The CV input selects notes; pads are ignored.
#[derive(Debug)]
struct QuantizerMode {
    /// Last pair emitted, for retrigger suppression.
    last: Option<QuantizedNote>,
    /// Cleared by `freeze` to pause CV dispatch.
    enabled: bool,
}

impl QuantizerMode {
    fn new() -> Self {
        Self {
            last: None,
            enabled: true,
        }
    }

    fn on_cv_sample(
        &mut self,
        core: &mut ChannelCore,
        sample: u16,
        degrees: &impl DegreeSource,
        out: &mut Vec<Command>,
    ) {
        if !self.enabled {
            return;
        }
        let note = quantize(sample);
        if self.last == Some(note) {
            return;
        }
        if let Some(prev) = self.last {
            core.trigger(prev.pad, prev.octave, NoteState::Off, degrees, out);
        }
        core.trigger(note.pad, note.octave, NoteState::On, degrees, out);
        self.last = Some(note);
    }
}

/// Pads record spans into the loop queue; the clock replays them.
#[derive(Debug)]
struct LooperMode {
    /// Gates queued-event dispatch. Recording a new span pauses it so the
    /// live note owns the gate until the pad is released.
    enable_loop: bool,
}

impl LooperMode {
    fn on_pad_down(
        &mut self,
        core: &mut ChannelCore,
        queue: &mut SpanQueue,
        clock: &LoopClock,
        pad: u8,
        degrees: &impl DegreeSource,
        out: &mut Vec<Command>,
    ) {
        self.enable_loop = false;
        queue.begin(clock.position(), pad);
        // Live monitoring while the span records.
        let octave = core.octave;
        core.trigger(pad, octave, NoteState::On, degrees, out);
    }

    fn on_pad_up(
        &mut self,
        core: &mut ChannelCore,
        queue: &mut SpanQueue,
        clock: &LoopClock,
        pad: u8,
        degrees: &impl DegreeSource,
        out: &mut Vec<Command>,
    ) {
        queue.commit(clock.position());
        let octave = core.octave;
        core.trigger(pad, octave, NoteState::Off, degrees, out);
        self.enable_loop = true;
    }
}

/// Mode-specific state and handlers. Every input entry point dispatches
/// through this variant, keeping each mode's behavior in one place.
#[derive(Debug)]
enum ModeKind {
    Monophonic(MonoMode),
    Quantizer(QuantizerMode),
    Looper(LooperMode),
}

impl ModeKind {
    fn from_select(select: ModeSelect) -> Self {
        match select {
            ModeSelect::Monophonic => ModeKind::Monophonic(MonoMode),
            ModeSelect::Quantizer => ModeKind::Quantizer(QuantizerMode::new()),
            ModeSelect::Looper => ModeKind::Looper(LooperMode { enable_loop: true }),
        }
    }

    fn select(&self) -> ModeSelect {
        match self {
            ModeKind::Monophonic(_) => ModeSelect::Monophonic,
            ModeKind::Quantizer(_) => ModeSelect::Quantizer,
            ModeKind::Looper(_) => ModeSelect::Looper,
        }
    }
}

/// One touch channel: mode state machine, loop queue, and clock.
pub struct Channel {
    core: ChannelCore,
    mode: ModeKind,
    clock: LoopClock,
    queue: SpanQueue,
    debounce: InputDebouncer,
}

impl Channel {
    pub fn new(index: u8) -> Self {
        Self {
            core: ChannelCore {
                index,
                octave: 0,
                prev_octave: 0,
                curr_note: 0,
                prev_note: 0,
                note_state: NoteState::Off,
                leds: LedMask::clear(),
                switches: SwitchState::default(),
            },
            mode: ModeKind::Monophonic(MonoMode),
            clock: LoopClock::new(),
            queue: SpanQueue::new(),
            debounce: InputDebouncer::new(),
        }
    }

    /// Bring up the channel's peripherals.
    ///
    /// Fatal when the touch controller is absent: the error LED pattern is
    /// shown and the channel must not be polled afterwards.
    pub fn init(
        &mut self,
        touch: &mut impl TouchSensor,
        io: &mut impl IoExpander,
        dac: &mut impl DacSink,
        delay: &mut impl DelayNs,
    ) -> Result<(), Error> {
        if !touch.is_connected() {
            io.digital_write(Port::A, 0xFF); // error pattern: all pad LEDs on
            return Err(Error::TouchNotConnected);
        }
        touch.calibrate();
        touch.clear_interrupt();

        io.set_direction(Port::A, 0x00); // pad LEDs
        io.set_direction(Port::B, 0b0000_1111); // toggle switches
        io.set_pull_up(Port::B, 0b0000_1111);
        io.set_input_polarity(Port::B, 0x00);
        io.set_interrupt(Port::B, 0b0000_1111);

        self.core.switches = SwitchState::from_register(io.digital_read(Port::B));
        if let Some(select) = self.core.switches.mode_select() {
            self.mode = ModeKind::from_select(select);
        }

        // Startup sweep across the pad LEDs.
        for pad in 0..PAD_COUNT as u8 {
            io.digital_write(Port::A, 1 << pad);
            delay.delay_ms(50);
        }
        io.digital_write(Port::A, 0x00);
        // Octave indicator sits on the port B high nibble.
        io.digital_write(Port::B, 1 << (self.core.octave + 4));

        dac.set_reference(RefMode::Unbuffered);
        dac.set_gain(GainMode::Gain1x);
        dac.set_power(PowerMode::Normal);
        Ok(())
    }

    /// The per-cycle entry point.
    ///
    /// Drains pending interrupt events, routes register reads through the
    /// debouncer into the active mode, advances the clock on pulses, and
    /// dispatches at most one queued playback action. Side effects land in
    /// `out` in execution order.
    pub fn poll(
        &mut self,
        irq: &mut IrqQueue,
        touch: &mut impl TouchSensor,
        io: &mut impl IoExpander,
        degrees: &mut impl DegreeSource,
        delay: &mut impl DelayNs,
        cv: Option<u16>,
        out: &mut Vec<Command>,
    ) {
        while let Some(event) = irq.recv() {
            match event {
                IrqEvent::Touch => {
                    let mask = touch.touched();
                    touch.clear_interrupt();
                    for edge in self.debounce.touch_events(mask) {
                        self.handle_input(edge, &*degrees, out);
                    }
                }
                IrqEvent::Switch => {
                    delay.delay_us(SWITCH_SETTLE_US);
                    let raw = io.digital_read(Port::B);
                    let edge = self.debounce.switch_event(raw);
                    self.handle_input(edge, &*degrees, out);
                }
                IrqEvent::Pulse => {
                    if self.clock.tick_clock() {
                        self.clock.step_clock();
                    }
                }
                IrqEvent::Step => {
                    self.clock.step_clock();
                }
            }
        }

        if degrees.has_changed(self.core.index) {
            self.handle_degree_change(&*degrees, out);
            degrees.clear_changed(self.core.index);
        }

        if let Some(sample) = cv {
            self.handle_input(InputEvent::CvSample(sample), &*degrees, out);
        }

        self.dispatch_playback(&*degrees, out);
    }

    fn handle_input(
        &mut self,
        event: InputEvent,
        degrees: &impl DegreeSource,
        out: &mut Vec<Command>,
    ) {
        match event {
            InputEvent::PadDown(pad) => match &mut self.mode {
                ModeKind::Monophonic(mode) => mode.on_pad_down(&mut self.core, pad, degrees, out),
                ModeKind::Quantizer(_) => {}
                ModeKind::Looper(mode) => mode.on_pad_down(
                    &mut self.core,
                    &mut self.queue,
                    &self.clock,
                    pad,
                    degrees,
                    out,
                ),
            },
            InputEvent::PadUp(pad) => match &mut self.mode {
                ModeKind::Monophonic(mode) => mode.on_pad_up(&mut self.core, pad, degrees, out),
                ModeKind::Quantizer(_) => {}
                ModeKind::Looper(mode) => mode.on_pad_up(
                    &mut self.core,
                    &mut self.queue,
                    &self.clock,
                    pad,
                    degrees,
                    out,
                ),
            },
            InputEvent::SwitchChanged(state) => self.on_switch_changed(state, degrees, out),
            InputEvent::CvSample(sample) => {
                if let ModeKind::Quantizer(mode) = &mut self.mode {
                    mode.on_cv_sample(&mut self.core, sample, degrees, out);
                }
            }
        }
    }

    fn on_switch_changed(
        &mut self,
        state: SwitchState,
        degrees: &impl DegreeSource,
        out: &mut Vec<Command>,
    ) {
        let prev = self.core.switches;
        self.core.switches = state;

        if state.mode_bits() != prev.mode_bits() {
            // Reserved encodings decode to None and change nothing.
            if let Some(select) = state.mode_select() {
                self.enter_mode(select, degrees, out);
            }
        }
        if state.octave_bits() != prev.octave_bits() {
            if let Some(step) = state.octave_move() {
                self.move_octave(step, degrees, out);
            }
        }
    }

    /// Switch to a new mode: silence whatever the previous mode left
    /// sounding, then apply the mode's entry behavior.
    fn enter_mode(&mut self, select: ModeSelect, degrees: &impl DegreeSource, out: &mut Vec<Command>) {
        let was_on = self.core.note_state == NoteState::On;
        if was_on {
            let note = self.core.prev_note;
            let octave = self.core.octave;
            self.core.trigger(note, octave, NoteState::Off, degrees, out);
        }
        self.mode = ModeKind::from_select(select);
        if was_on {
            if let ModeKind::Monophonic(_) = self.mode {
                // A held pad keeps sounding across the switch.
                let note = self.core.prev_note;
                let octave = self.core.octave;
                self.core.trigger(note, octave, NoteState::On, degrees, out);
            }
        }
    }

    /// Apply an octave rocker edge: clamp into range and, in monophonic
    /// mode, carry a sounding note over to the new octave.
    fn move_octave(&mut self, step: OctaveMove, degrees: &impl DegreeSource, out: &mut Vec<Command>) {
        self.core.prev_octave = self.core.octave;
        match step {
            OctaveMove::Up => {
                if self.core.octave < (OCTAVE_COUNT - 1) as u8 {
                    self.core.octave += 1;
                }
            }
            OctaveMove::Down => {
                self.core.octave = self.core.octave.saturating_sub(1);
            }
        }
        out.push(Command::OctaveLeds(1 << self.core.octave));

        if matches!(self.mode, ModeKind::Monophonic(_)) && self.core.note_state == NoteState::On {
            let note = self.core.prev_note;
            let old = self.core.prev_octave;
            let new = self.core.octave;
            self.core.trigger(note, old, NoteState::Off, degrees, out);
            out.push(Command::DelayUs(RETRIGGER_GAP_US));
            self.core.trigger(note, new, NoteState::On, degrees, out);
        }
        self.core.prev_octave = self.core.octave;
    }

    /// A scale-degree toggle moved: re-pitch a sounding monophonic note.
    fn handle_degree_change(&mut self, degrees: &impl DegreeSource, out: &mut Vec<Command>) {
        if matches!(self.mode, ModeKind::Monophonic(_)) && self.core.note_state == NoteState::On {
            let note = self.core.prev_note;
            let octave = self.core.octave;
            self.core.trigger(note, octave, NoteState::Off, degrees, out);
            out.push(Command::DelayUs(RETRIGGER_GAP_US));
            self.core.trigger(note, octave, NoteState::On, degrees, out);
        }
    }

    /// Replay the recorded loop: at most one queued action per cycle, only
    /// while the looper owns the channel and playback is enabled.
    fn dispatch_playback(&mut self, degrees: &impl DegreeSource, out: &mut Vec<Command>) {
        let ModeKind::Looper(looper) = &self.mode else {
            return;
        };
        if !looper.enable_loop || !self.queue.has_events() {
            return;
        }
        if let Some(action) = self.queue.dispatch_at(self.clock.position()) {
            let octave = self.core.octave;
            match action {
                SpanAction::On(pad) => self.core.trigger(pad, octave, NoteState::On, degrees, out),
                SpanAction::Off(pad) => self.core.trigger(pad, octave, NoteState::Off, degrees, out),
            }
        }
    }

    /// Pause or resume the mode's automatic dispatch (loop playback, CV
    /// tracking) without touching the recorded loop.
    pub fn freeze(&mut self, frozen: bool) {
        match &mut self.mode {
            ModeKind::Looper(looper) => looper.enable_loop = !frozen,
            ModeKind::Quantizer(quant) => quant.enabled = !frozen,
            ModeKind::Monophonic(_) => {}
        }
    }

    /// Rewind the clock to loop start.
    pub fn reset_clock(&mut self) {
        self.clock.reset();
    }

    /// Discard the recorded loop and rewind the clock.
    pub fn clear_loop(&mut self) {
        self.queue.clear();
        self.clock.reset();
    }

    /// Set the loop length in steps.
    pub fn set_loop_steps(&mut self, steps: u32) {
        self.clock.set_loop_steps(steps);
    }

    pub fn mode_select(&self) -> ModeSelect {
        self.mode.select()
    }

    pub fn octave(&self) -> u8 {
        self.core.octave
    }

    /// Pad of the most recent note ON.
    pub fn current_note(&self) -> u8 {
        self.core.curr_note
    }

    pub fn note_state(&self) -> NoteState {
        self.core.note_state
    }

    pub fn clock(&self) -> &LoopClock {
        &self.clock
    }

    pub fn queue(&self) -> &SpanQueue {
        &self.queue
    }
}
