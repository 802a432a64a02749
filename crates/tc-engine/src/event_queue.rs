//! Ordered interval queue for loop recording and playback.

use alloc::vec::Vec;
use slotmap::SlotMap;
use tc_ir::{LoopSpan, SpanKey};

/// Separation forced between a truncated span and the span that truncated
/// it, in ticks. Keeps the released gate and the following trigger off the
/// same pulse edge.
pub const SPAN_GUARD_GAP: u32 = 2;

/// Playback action produced by the cursor ring.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpanAction {
    /// The cursor span reached its start position.
    On(u8),
    /// The cursor span reached its end position.
    Off(u8),
}

/// Recorded note intervals, sorted ascending by start with no overlap
/// between neighbours.
///
/// Spans live in an arena; the ordered list and the playback cursor hold
/// keys, so removing a superseded span can never leave the cursor
/// dangling. During playback the cursor wraps from the tail back to the
/// head, forming a ring.
#[derive(Debug, Default)]
pub struct SpanQueue {
    arena: SlotMap<SpanKey, LoopSpan>,
    /// Keys sorted ascending by span start.
    order: Vec<SpanKey>,
    /// Next span to play.
    cursor: Option<SpanKey>,
    /// In-flight recording: (pad, start). At most one at a time.
    pending: Option<(u8, u32)>,
}

impl SpanQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a recording at `position`. A second `begin` before `commit`
    /// replaces the in-flight recording.
    pub fn begin(&mut self, position: u32, pad: u8) {
        self.pending = Some((pad, position));
    }

    /// Close the in-flight recording at `position` and insert the span.
    ///
    /// Returns the inserted key, or `None` when no recording was open or
    /// the end position does not advance past the start (the clock wrapped
    /// mid-recording); such a span cannot live in the sorted order and is
    /// discarded.
    pub fn commit(&mut self, position: u32) -> Option<SpanKey> {
        let (pad, start) = self.pending.take()?;
        if position <= start {
            return None;
        }
        Some(self.insert(LoopSpan::new(pad, start, position)))
    }

    /// Place a finished span into the sorted order, resolving overlap
    /// against existing spans:
    ///
    /// - an existing span entirely inside the new one is removed;
    /// - an existing span the new one starts inside is truncated to end
    ///   [`SPAN_GUARD_GAP`] ticks before the new start, or removed when
    ///   the truncation would leave nothing of it;
    /// - otherwise the new span is spliced in ahead of the first span that
    ///   starts after it ends.
    fn insert(&mut self, new: LoopSpan) -> SpanKey {
        let key = self.arena.insert(new);
        let mut i = 0;
        while i < self.order.len() {
            let scanned_key = self.order[i];
            let scanned = self.arena[scanned_key];
            if new.start < scanned.start {
                if new.end <= scanned.start {
                    // Fits cleanly ahead of the scanned span.
                    break;
                }
                // Scanned span is covered by the new one: drop it and keep
                // comparing against its successor.
                self.arena.remove(scanned_key);
                self.order.remove(i);
                if self.cursor == Some(scanned_key) {
                    self.cursor = self.order.get(i).copied();
                }
            } else if new.start >= scanned.end {
                i += 1;
            } else {
                // New span starts inside the scanned one: cut the scanned
                // span short and keep scanning for the insertion point.
                // When nothing of the scanned span would remain, drop it.
                let cut = new.start.saturating_sub(SPAN_GUARD_GAP);
                if cut <= scanned.start {
                    self.arena.remove(scanned_key);
                    self.order.remove(i);
                    if self.cursor == Some(scanned_key) {
                        self.cursor = self.order.get(i).copied();
                    }
                } else {
                    self.arena[scanned_key].end = cut;
                    i += 1;
                }
            }
        }
        self.order.insert(i, key);
        if self.cursor.is_none() {
            self.cursor = Some(key);
        }
        key
    }

    /// True when any span is recorded.
    pub fn has_events(&self) -> bool {
        !self.order.is_empty()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Ring dispatch at `position`.
    ///
    /// Fires at most one action per call: ON when the cursor span's start
    /// matches the position, OFF when its end matches. The OFF advances
    /// the cursor, wrapping from the tail to the head. Callers gate this
    /// behind [`SpanQueue::has_events`].
    pub fn dispatch_at(&mut self, position: u32) -> Option<SpanAction> {
        let key = self.cursor?;
        let span = self.arena.get_mut(key)?;
        if !span.triggered {
            if position == span.start {
                span.triggered = true;
                return Some(SpanAction::On(span.pad));
            }
        } else if position == span.end {
            span.triggered = false;
            let pad = span.pad;
            self.advance_cursor(key);
            return Some(SpanAction::Off(pad));
        }
        None
    }

    fn advance_cursor(&mut self, current: SpanKey) {
        let at = self.order.iter().position(|&key| key == current);
        self.cursor = match at {
            Some(i) if i + 1 < self.order.len() => Some(self.order[i + 1]),
            _ => self.order.first().copied(),
        };
    }

    /// Span under the playback cursor.
    pub fn cursor_span(&self) -> Option<&LoopSpan> {
        self.cursor.and_then(|key| self.arena.get(key))
    }

    /// Spans in playback order.
    pub fn iter(&self) -> impl Iterator<Item = &LoopSpan> {
        self.order.iter().map(|&key| &self.arena[key])
    }

    /// Discard all spans and any in-flight recording.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.order.clear();
        self.cursor = None;
        self.pending = None;
    }
}
