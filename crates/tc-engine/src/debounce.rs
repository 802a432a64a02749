//! Raw-input edge extraction.

use arrayvec::ArrayVec;
use tc_ir::{InputEvent, SwitchState, PAD_COUNT};

/// Settle time before re-reading the switch register after its interrupt.
/// Blocks the calling poll cycle only; it must complete well before the
/// next pulse boundary.
pub const SWITCH_SETTLE_US: u32 = 5;

/// Turns raw register reads into discrete edge events.
///
/// Touch events are edge-triggered: every call compares all 8 bits of the
/// current mask against the previous one and yields one event per changed
/// bit.
#[derive(Clone, Copy, Debug, Default)]
pub struct InputDebouncer {
    prev_touched: u8,
}

impl InputDebouncer {
    pub fn new() -> Self {
        Self { prev_touched: 0 }
    }

    /// Edge events between the previous and current touch mask.
    pub fn touch_events(&mut self, touched: u8) -> ArrayVec<InputEvent, PAD_COUNT> {
        let mut events = ArrayVec::new();
        for pad in 0..PAD_COUNT as u8 {
            let bit = 1u8 << pad;
            let now = touched & bit != 0;
            let was = self.prev_touched & bit != 0;
            if now && !was {
                events.push(InputEvent::PadDown(pad));
            } else if !now && was {
                events.push(InputEvent::PadUp(pad));
            }
        }
        self.prev_touched = touched;
        events
    }

    /// Wrap a settled switch register read. The caller is responsible for
    /// waiting [`SWITCH_SETTLE_US`] between the interrupt and the read.
    pub fn switch_event(&self, raw: u8) -> InputEvent {
        InputEvent::SwitchChanged(SwitchState::from_register(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_touch_is_a_down_edge() {
        let mut debouncer = InputDebouncer::new();
        let events = debouncer.touch_events(0b0000_0100);
        assert_eq!(events.as_slice(), &[InputEvent::PadDown(2)]);
    }

    #[test]
    fn release_is_an_up_edge() {
        let mut debouncer = InputDebouncer::new();
        debouncer.touch_events(0b0000_0100);
        let events = debouncer.touch_events(0);
        assert_eq!(events.as_slice(), &[InputEvent::PadUp(2)]);
    }

    #[test]
    fn unchanged_mask_yields_nothing() {
        let mut debouncer = InputDebouncer::new();
        debouncer.touch_events(0b0001_0001);
        assert!(debouncer.touch_events(0b0001_0001).is_empty());
    }

    #[test]
    fn simultaneous_edges_all_reported() {
        let mut debouncer = InputDebouncer::new();
        debouncer.touch_events(0b0000_0011);
        let events = debouncer.touch_events(0b0000_0110);
        assert_eq!(
            events.as_slice(),
            &[InputEvent::PadUp(0), InputEvent::PadDown(2)]
        );
    }

    #[test]
    fn all_eight_bits_are_evaluated() {
        let mut debouncer = InputDebouncer::new();
        let events = debouncer.touch_events(0xFF);
        assert_eq!(events.len(), PAD_COUNT);
    }

    #[test]
    fn switch_event_keeps_low_nibble() {
        let debouncer = InputDebouncer::new();
        assert_eq!(
            debouncer.switch_event(0b1010_0110),
            InputEvent::SwitchChanged(SwitchState(0b0110))
        );
    }
}
