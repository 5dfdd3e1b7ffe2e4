//! Capacity-limited resources with semaphore-style acquire/release.
//!
//! A `Resource` models contention: `acquire` either admits a requester
//! immediately or parks it in a priority-ordered wait queue; `release`
//! frees one unit of capacity and promotes the longest-waiting
//! highest-priority requester, if any.
//!
//! Busy and wait time are tracked by *signed accumulation* instead of
//! per-client timestamps: each occupancy or wait period contributes
//! exactly `-start_time` when it begins and `+end_time` when it ends,
//! so two running totals reconstruct the aggregate in O(1). Periods
//! still open at measurement time have only their negative term; the
//! end-of-replication computation corrects for them by adding
//! `count × now` (see [`Resource::record_replication`]).

use std::collections::VecDeque;

use tracing::error;

use crate::entity::EntityId;
use crate::error::SimError;
use crate::event::EventKind;
use crate::simulation::SimContext;
use crate::stats::{Metric, RunningStat, Summary};
use crate::time::SimTime;

// ── Wait queue ────────────────────────────────────────────────────────

/// A parked acquire request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct WaitRequest {
    /// Event kind scheduled when the requester is admitted.
    pub resume: EventKind,
    /// The waiting entity.
    pub entity: EntityId,
    /// Smaller value = served sooner.
    pub priority: i32,
}

/// Priority-ordered queue of parked requests.
///
/// Ascending by priority; the head is the next request to admit. The
/// insertion scan runs from the tail and stops at the first cell whose
/// priority is ≤ the new request's, so equal priorities keep arrival
/// order — the same stable-insert algorithm as the event queue.
#[derive(Debug, Clone, Default)]
pub struct WaitQueue {
    items: VecDeque<WaitRequest>,
}

impl WaitQueue {
    fn enqueue(&mut self, request: WaitRequest) {
        let mut idx = self.items.len();
        while idx > 0 && request.priority < self.items[idx - 1].priority {
            idx -= 1;
        }
        self.items.insert(idx, request);
    }

    fn pop_next(&mut self) -> Option<WaitRequest> {
        self.items.pop_front()
    }

    fn purge(&mut self) {
        self.items.clear();
    }

    /// Number of parked requests.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if nobody is waiting.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// ── Resource ──────────────────────────────────────────────────────────

/// A capacity-limited server.
///
/// Invariants (checked in tests, maintained by construction):
/// - `free ≤ capacity` always; a violating release is reported and
///   clamped.
/// - `free < 0` exactly when the wait queue is non-empty, with `-free`
///   equal to its length.
#[derive(Debug, Clone)]
pub struct Resource {
    name: String,
    capacity: i32,
    free: i32,
    queue: WaitQueue,
    /// Signed busy-time accumulator: `-start` on admit, `+end` on release.
    busy_acc: f64,
    /// Signed wait-time accumulator: `-start` on park, `+end` on promote.
    wait_acc: f64,
    served: u32,
    /// Aggregate statistics; persist across replications.
    stats: [RunningStat; Metric::COUNT],
}

impl Resource {
    /// Create a resource with the given nominal capacity.
    pub fn new(name: impl Into<String>, capacity: i32) -> Self {
        debug_assert!(capacity > 0, "resource capacity must be positive");
        Resource {
            name: name.into(),
            capacity,
            free: capacity,
            queue: WaitQueue::default(),
            busy_acc: 0.0,
            wait_acc: 0.0,
            served: 0,
            stats: [RunningStat::new(); Metric::COUNT],
        }
    }

    /// Resource name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Nominal capacity.
    pub fn capacity(&self) -> i32 {
        self.capacity
    }

    /// Current free capacity. Negative while requesters are waiting;
    /// the magnitude is then the wait-queue length.
    pub fn free(&self) -> i32 {
        self.free
    }

    /// Requesters fully served so far this replication.
    pub fn served(&self) -> u32 {
        self.served
    }

    /// Requesters currently waiting.
    pub fn waiting(&self) -> u32 {
        (-self.free).max(0) as u32
    }

    /// Requesters currently holding capacity.
    pub fn in_service(&self) -> u32 {
        if self.free < 0 {
            self.capacity as u32
        } else {
            (self.capacity - self.free) as u32
        }
    }

    /// The wait queue, for inspection.
    pub fn wait_queue(&self) -> &WaitQueue {
        &self.queue
    }

    // ── P/V operations ────────────────────────────────────────────

    /// Reserve one unit of capacity (P).
    ///
    /// If a unit is available the requester is admitted at once: its
    /// `resume` event is scheduled at the current time, so it runs on
    /// the next scheduler tick rather than synchronously. Otherwise
    /// the request is parked by priority and resumes when a release
    /// promotes it.
    pub fn acquire<E>(
        &mut self,
        ctx: &mut SimContext<'_, E>,
        resume: EventKind,
        entity: EntityId,
        priority: i32,
    ) {
        let now = ctx.now();
        self.free -= 1;
        if self.free >= 0 {
            self.busy_acc -= now.value();
            ctx.schedule(resume, now, entity);
        } else {
            self.wait_acc -= now.value();
            self.queue.enqueue(WaitRequest {
                resume,
                entity,
                priority,
            });
        }
    }

    /// Free one unit of capacity (V).
    ///
    /// The releasing occupant counts as fully served at this instant.
    /// A release beyond nominal capacity is an accounting error: it is
    /// reported and the capacity clamped, then the run continues. If
    /// requesters are waiting, the head of the wait queue is promoted —
    /// its wait period closes, its busy period opens, and its resume
    /// event is scheduled at the current time.
    pub fn release<E>(&mut self, ctx: &mut SimContext<'_, E>) {
        let now = ctx.now();
        self.free += 1;
        if self.free > self.capacity {
            let err = SimError::CapacityOverflow {
                resource: self.name.clone(),
                at: now,
            };
            error!(%err, "release without matching acquire");
            self.free = self.capacity;
        }
        self.busy_acc += now.value();
        self.served += 1;
        if let Some(next) = self.queue.pop_next() {
            self.wait_acc += now.value();
            self.busy_acc -= now.value();
            ctx.schedule(next.resume, now, next.entity);
        }
    }

    // ── Per-replication lifecycle ─────────────────────────────────

    /// Reset the per-replication counters: full capacity, zeroed
    /// accumulators, nobody served. Aggregate statistics are kept.
    pub fn reset_counters(&mut self) {
        self.free = self.capacity;
        self.busy_acc = 0.0;
        self.wait_acc = 0.0;
        self.served = 0;
    }

    /// Drop every parked request.
    pub fn purge_queue(&mut self) {
        self.queue.purge();
    }

    /// Reset the aggregate statistics. Called once before the first
    /// replication of a run.
    pub fn reset_stats(&mut self) {
        for stat in &mut self.stats {
            stat.reset();
        }
    }

    /// Close out one replication at time `now` and push one observation
    /// per metric into the aggregate statistics.
    ///
    /// In-progress periods hold only their `-start` term, so the busy
    /// and wait totals are corrected by `in_service × now` and
    /// `waiting × now` respectively before averaging.
    pub fn record_replication(&mut self, now: SimTime) {
        let now = now.value();
        let waiting = self.waiting() as f64;
        let in_service = self.in_service() as f64;
        let served = self.served as f64;

        let response = if self.served != 0 {
            (self.busy_acc + in_service * now) / served
        } else {
            0.0
        };
        let wait = if served + in_service != 0.0 {
            (self.wait_acc + waiting * now) / (served + in_service)
        } else {
            0.0
        };

        self.stats[Metric::ResponseTime as usize].push(response);
        self.stats[Metric::WaitTime as usize].push(wait);
        self.stats[Metric::Served as usize].push(served);
        self.stats[Metric::InService as usize].push(in_service);
        self.stats[Metric::Waiting as usize].push(waiting);
    }

    /// Aggregate summary for one metric.
    pub fn summary(&self, metric: Metric) -> Summary {
        self.stats[metric as usize].summary()
    }
}
