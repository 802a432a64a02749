//! Interrupt-to-poll event channel.
//!
//! Interrupt handlers are minimal: they enqueue a typed event and return.
//! No I/O and no queue or state-machine mutation happens in interrupt
//! context; the poll step is the sole consumer and the sole mutator of
//! channel state. The ring is bounded; a full queue drops the incoming
//! event rather than block.

use heapless::spsc::{Consumer, Producer, Queue};
use tc_ir::IrqEvent;

/// Capacity of the interrupt event ring.
pub const IRQ_CAPACITY: usize = 16;

/// Bounded single-producer/single-consumer ring between interrupt context
/// and the poll step.
///
/// Firmware splits this into its two halves at startup: the producer lives
/// with the interrupt handlers, the consumer with the poll loop. A
/// single-threaded harness can drive it unsplit through `send`/`recv`.
pub struct IrqQueue {
    ring: Queue<IrqEvent, IRQ_CAPACITY>,
}

impl IrqQueue {
    pub const fn new() -> Self {
        Self { ring: Queue::new() }
    }

    /// Enqueue an event; dropped when the ring is full.
    pub fn send(&mut self, event: IrqEvent) {
        let _ = self.ring.enqueue(event);
    }

    /// Dequeue the oldest pending event.
    pub fn recv(&mut self) -> Option<IrqEvent> {
        self.ring.dequeue()
    }

    /// Split into the interrupt-side and poll-side halves.
    pub fn split(&mut self) -> (IrqSender<'_>, IrqReceiver<'_>) {
        let (producer, consumer) = self.ring.split();
        (IrqSender { inner: producer }, IrqReceiver { inner: consumer })
    }
}

impl Default for IrqQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Producer half, owned by interrupt context.
pub struct IrqSender<'a> {
    inner: Producer<'a, IrqEvent, IRQ_CAPACITY>,
}

impl IrqSender<'_> {
    /// Enqueue from an interrupt handler; dropped when the ring is full.
    pub fn send(&mut self, event: IrqEvent) {
        let _ = self.inner.enqueue(event);
    }
}

/// Consumer half, owned by the poll step.
pub struct IrqReceiver<'a> {
    inner: Consumer<'a, IrqEvent, IRQ_CAPACITY>,
}

impl IrqReceiver<'_> {
    pub fn recv(&mut self) -> Option<IrqEvent> {
        self.inner.dequeue()
    }
}
