/// Events and the time-ordered event queue.
///
/// Every future occurrence in a simulation is an `Event`: a kind code,
/// a due time, and the entity it concerns. Pending events live in the
/// `EventQueue`, an ordered sequence that always keeps the earliest
/// event at the head.

use std::collections::VecDeque;

use crate::entity::EntityId;
use crate::time::SimTime;

// ── Event kind ────────────────────────────────────────────────────────

/// Domain-defined event code.
///
/// The kernel never interprets kinds beyond the reserved
/// [`EventKind::START`], which every model must handle as the first
/// event of a replication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct EventKind(u32);

impl EventKind {
    /// The mandatory replication-start event, dispatched synchronously
    /// at the beginning of every replication.
    pub const START: EventKind = EventKind(0);

    /// Wrap a raw code into an `EventKind`.
    #[inline]
    pub const fn new(raw: u32) -> Self {
        EventKind(raw)
    }

    /// Return the raw code.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ── Event sequence numbers ────────────────────────────────────────────

/// Strictly increasing per-queue sequence number.
///
/// Arrival order among equal due times is already preserved structurally
/// by the queue's insertion scan; the sequence number makes that order
/// observable for diagnostics and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct EventSeq(u64);

impl EventSeq {
    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for EventSeq {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "E#{}", self.0)
    }
}

/// Monotonic sequence-number generator, owned by the queue.
#[derive(Debug, Clone, Default)]
struct EventSeqGen {
    next: u64,
}

impl EventSeqGen {
    fn next_seq(&mut self) -> EventSeq {
        let seq = EventSeq(self.next);
        self.next += 1;
        seq
    }
}

// ── Event ─────────────────────────────────────────────────────────────

/// A single pending occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Event {
    /// Queue-assigned sequence number (creation order).
    pub seq: EventSeq,

    /// Domain event code.
    pub kind: EventKind,

    /// The simulated time at which this event is dispatched.
    pub due_time: SimTime,

    /// The entity this event concerns.
    pub entity: EntityId,
}

// ── Event queue ───────────────────────────────────────────────────────

/// Time-ordered queue of pending events.
///
/// Kept ascending by `due_time` at all times; the head is the next
/// event to run. Insertion scans from the tail toward the head while
/// the new due time is strictly less than the scanned cell's, so an
/// event that ties an existing due time lands *after* it: ties are
/// dispatched in arrival order.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    items: VecDeque<Event>,
    seq_gen: EventSeqGen,
}

impl EventQueue {
    /// Create a new, empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new event, keeping the queue sorted.
    ///
    /// Returns the sequence number assigned to the event. O(n) in the
    /// distance from the tail, which is short for the near-monotonic
    /// schedules a simulation produces.
    pub fn schedule(&mut self, kind: EventKind, due_time: SimTime, entity: EntityId) -> EventSeq {
        let seq = self.seq_gen.next_seq();
        let mut idx = self.items.len();
        while idx > 0 && due_time < self.items[idx - 1].due_time {
            idx -= 1;
        }
        self.items.insert(
            idx,
            Event {
                seq,
                kind,
                due_time,
                entity,
            },
        );
        seq
    }

    /// Peek at the earliest event without removing it.
    pub fn peek_next(&self) -> Option<&Event> {
        self.items.front()
    }

    /// Remove and return the earliest event.
    pub fn pop_next(&mut self) -> Option<Event> {
        self.items.pop_front()
    }

    /// Drop every pending event.
    ///
    /// Called at the start of each replication so no event leaks across
    /// replication boundaries. The sequence counter keeps running.
    pub fn purge(&mut self) {
        self.items.clear();
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if no events are pending.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Mint a sequence number without enqueueing anything.
    ///
    /// Used by the controller for the start event, which is dispatched
    /// synchronously and never enters the queue.
    pub(crate) fn mint_seq(&mut self) -> EventSeq {
        self.seq_gen.next_seq()
    }

    /// Drain all events in dispatch order into a `Vec`. Test helper.
    #[cfg(test)]
    pub(crate) fn drain_ordered(&mut self) -> Vec<Event> {
        let mut events = Vec::with_capacity(self.items.len());
        while let Some(e) = self.pop_next() {
            events.push(e);
        }
        events
    }
}
