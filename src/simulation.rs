/// Replication-driven simulation loop.
///
/// `Simulation` owns the event queue, the entity registry, and the
/// virtual clock, and drives a user-supplied `Model` through a number
/// of independent replications. The loop is purely synchronous and
/// single-threaded — determinism is trivial.

use tracing::{debug, warn};

use crate::entity::{EntityId, EntityRegistry};
use crate::error::SimResult;
use crate::event::{Event, EventKind, EventQueue, EventSeq};
use crate::time::SimTime;

// ── Model trait ───────────────────────────────────────────────────────

/// The domain side of a simulation: entities, resources, and the
/// dispatch table mapping event kinds to handlers.
///
/// The kernel calls the methods in a fixed order per run:
/// `init` once, then per replication `begin_replication`,
/// `initial_entity`, `handle` for [`EventKind::START`] and every
/// dispatched event, `end_replication`, and `dispose` for each entity
/// still alive.
pub trait Model {
    /// Domain payload carried by each entity.
    type Entity;

    /// Called once before the first replication. Reset aggregate
    /// statistics here.
    fn init(&mut self) {}

    /// Reset per-replication domain state: resource counters, wait
    /// queues, domain counters. Aggregate statistics persist.
    fn begin_replication(&mut self);

    /// Payload for the entity that receives the start event.
    fn initial_entity(&mut self) -> Self::Entity;

    /// Dispatch one event by kind.
    ///
    /// Return [`SimError::UnknownEvent`](crate::SimError::UnknownEvent)
    /// for kinds outside the dispatch table; the controller reports the
    /// error and drops the event without ending the run.
    fn handle(&mut self, ctx: &mut SimContext<'_, Self::Entity>, event: &Event) -> SimResult<()>;

    /// Close out one replication at time `now`: record one observation
    /// per tracked resource.
    fn end_replication(&mut self, now: SimTime);

    /// Cleanup hook for an entity still alive when a replication ends.
    fn dispose(&mut self, entity: Self::Entity) {
        let _ = entity;
    }
}

// ── Simulation context ────────────────────────────────────────────────

/// Mutable context passed to the model on every dispatch.
///
/// Lets a handler schedule follow-up events and create or dispose
/// entities, without reaching the dispatch loop itself — a handler
/// must never recursively drive the controller.
pub struct SimContext<'a, E> {
    pub(crate) queue: &'a mut EventQueue,
    pub(crate) entities: &'a mut EntityRegistry<E>,
    pub(crate) now: SimTime,
    pub(crate) horizon: SimTime,
}

impl<'a, E> SimContext<'a, E> {
    /// Current simulated time.
    #[inline]
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// The replication horizon.
    #[inline]
    pub fn horizon(&self) -> SimTime {
        self.horizon
    }

    /// Schedule an event at an absolute time.
    ///
    /// Scheduling before `now` is a contract violation (the clock only
    /// moves forward); debug builds assert it.
    pub fn schedule(&mut self, kind: EventKind, at: SimTime, entity: EntityId) -> EventSeq {
        debug_assert!(
            at >= self.now,
            "non-causal schedule: now={}, at={}",
            self.now,
            at
        );
        self.queue.schedule(kind, at, entity)
    }

    /// Schedule an event `delay` time units after now.
    pub fn schedule_after(&mut self, delay: f64, kind: EventKind, entity: EntityId) -> EventSeq {
        let at = self.now.plus(delay);
        self.queue.schedule(kind, at, entity)
    }

    /// Create a new entity and return its handle.
    pub fn spawn(&mut self, payload: E) -> EntityId {
        self.entities.create(payload)
    }

    /// Dispose of an entity, returning its payload if it was alive.
    pub fn dispose(&mut self, id: EntityId) -> Option<E> {
        self.entities.dispose(id)
    }

    /// Look up an entity's payload.
    pub fn entity(&self, id: EntityId) -> Option<&E> {
        self.entities.get(id)
    }

    /// Look up an entity's payload mutably.
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut E> {
        self.entities.get_mut(id)
    }

    /// Number of live entities.
    pub fn live_entities(&self) -> usize {
        self.entities.len()
    }

    /// Number of pending events.
    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }
}

// ── Run state ─────────────────────────────────────────────────────────

/// Where the controller is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum RunState {
    /// No run started yet.
    Idle,
    /// Inside a replication's dispatch loop.
    RunningReplication,
    /// Between the dispatch loop and the next replication.
    Finalizing,
    /// The configured replication count is exhausted.
    Done,
}

// ── Simulation ────────────────────────────────────────────────────────

/// Top-level replication controller.
///
/// Owns all mutable kernel state for the duration of a run; nothing is
/// shared across replications except the aggregate statistics the
/// model keeps in its resources.
pub struct Simulation<M: Model> {
    model: M,
    queue: EventQueue,
    entities: EntityRegistry<M::Entity>,
    start: SimTime,
    horizon: SimTime,
    now: SimTime,
    state: RunState,
    events_processed: u64,
    replications_run: u32,
}

impl<M: Model> Simulation<M> {
    /// Create a controller for `model`, replicating from `start` to
    /// `horizon`.
    pub fn new(model: M, start: SimTime, horizon: SimTime) -> Self {
        Simulation {
            model,
            queue: EventQueue::new(),
            entities: EntityRegistry::new(),
            start,
            horizon,
            now: start,
            state: RunState::Idle,
            events_processed: 0,
            replications_run: 0,
        }
    }

    /// The domain model.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Mutable access to the domain model.
    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// Current simulated time (of the last dispatched event).
    pub fn current_time(&self) -> SimTime {
        self.now
    }

    /// The replication horizon.
    pub fn horizon(&self) -> SimTime {
        self.horizon
    }

    /// Lifecycle state.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Total events dispatched across all replications so far.
    pub fn events_processed(&self) -> u64 {
        self.events_processed
    }

    /// Replications completed so far.
    pub fn replications_run(&self) -> u32 {
        self.replications_run
    }

    /// Execute `replications` independent replications.
    ///
    /// Each replication starts from a purged event queue and a reset
    /// clock, seeds the reserved start event synchronously, then pops
    /// and dispatches events until the queue empties or the next event
    /// is due at or past the horizon. Statistics are finalized and all
    /// surviving entities disposed before the next replication begins.
    pub fn run(&mut self, replications: u32) {
        self.model.init();
        for replication in 1..=replications {
            self.state = RunState::RunningReplication;
            self.begin_replication();
            self.drive();

            self.state = RunState::Finalizing;
            self.model.end_replication(self.now);
            for (_, entity) in self.entities.drain() {
                self.model.dispose(entity);
            }
            self.replications_run += 1;
            debug!(
                replication,
                final_time = %self.now,
                events = self.events_processed,
                "replication complete"
            );
        }
        self.state = RunState::Done;
    }

    /// Reset per-replication state and dispatch the start event.
    fn begin_replication(&mut self) {
        self.queue.purge();
        self.now = self.start;
        self.model.begin_replication();

        let payload = self.model.initial_entity();
        let entity = self.entities.create(payload);
        let start_event = Event {
            seq: self.queue.mint_seq(),
            kind: EventKind::START,
            due_time: self.start,
            entity,
        };
        self.dispatch(&start_event);
    }

    /// Pop and dispatch events until the queue empties or the head is
    /// due at or past the horizon.
    fn drive(&mut self) {
        loop {
            let due = match self.queue.peek_next() {
                None => break,
                Some(head) => head.due_time,
            };
            if due >= self.horizon {
                break;
            }
            // Non-empty was just confirmed; a miss here is a broken
            // queue invariant, not a runtime condition.
            let Some(event) = self.queue.pop_next() else {
                unreachable!("event queue emptied between peek and pop");
            };
            debug_assert!(
                event.due_time >= self.now,
                "time went backward: now={}, event due {}",
                self.now,
                event.due_time
            );
            self.now = event.due_time;
            self.dispatch(&event);
        }
    }

    fn dispatch(&mut self, event: &Event) {
        let mut ctx = SimContext {
            queue: &mut self.queue,
            entities: &mut self.entities,
            now: self.now,
            horizon: self.horizon,
        };
        if let Err(err) = self.model.handle(&mut ctx, event) {
            warn!(%err, seq = %event.seq, "event dropped");
        }
        self.events_processed += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;
    use crate::resource::Resource;
    use crate::stats::Metric;

    const SERVE: EventKind = EventKind::new(1);
    const DONE: EventKind = EventKind::new(2);
    const BOGUS: EventKind = EventKind::new(99);

    /// Single server, capacity 1. The initial entity A acquires at
    /// t=0; a second entity B acquires right behind it and must queue.
    /// Service takes 5 for A (0→5) and 7 for B (5→12).
    struct Pipeline {
        server: Resource,
        schedule_bogus: bool,
    }

    impl Pipeline {
        fn new() -> Self {
            Pipeline {
                server: Resource::new("server", 1),
                schedule_bogus: false,
            }
        }
    }

    impl Model for Pipeline {
        type Entity = &'static str;

        fn init(&mut self) {
            self.server.reset_stats();
        }

        fn begin_replication(&mut self) {
            self.server.reset_counters();
            self.server.purge_queue();
        }

        fn initial_entity(&mut self) -> &'static str {
            "A"
        }

        fn handle(&mut self, ctx: &mut SimContext<'_, &'static str>, event: &Event) -> SimResult<()> {
            match event.kind {
                EventKind::START => {
                    self.server.acquire(ctx, SERVE, event.entity, 1);
                    let b = ctx.spawn("B");
                    self.server.acquire(ctx, SERVE, b, 1);
                    if self.schedule_bogus {
                        ctx.schedule_after(1.0, BOGUS, event.entity);
                    }
                }
                SERVE => {
                    let name = *ctx
                        .entity(event.entity)
                        .ok_or(SimError::EntityNotFound(event.entity))?;
                    let service = if name == "A" { 5.0 } else { 7.0 };
                    ctx.schedule_after(service, DONE, event.entity);
                }
                DONE => {
                    self.server.release(ctx);
                    ctx.dispose(event.entity);
                }
                kind => {
                    return Err(SimError::UnknownEvent {
                        kind,
                        at: ctx.now(),
                    })
                }
            }
            Ok(())
        }

        fn end_replication(&mut self, now: SimTime) {
            self.server.record_replication(now);
        }
    }

    #[test]
    fn test_single_replication_statistics() {
        let mut sim = Simulation::new(Pipeline::new(), SimTime::ZERO, SimTime::new(100.0));
        assert_eq!(sim.state(), RunState::Idle);
        sim.run(1);

        assert_eq!(sim.state(), RunState::Done);
        assert_eq!(sim.replications_run(), 1);
        assert_eq!(sim.current_time(), SimTime::new(12.0));

        let server = &sim.model().server;
        // A busy 0→5, B busy 5→12: mean response (5+7)/2.
        assert!((server.summary(Metric::ResponseTime).mean - 6.0).abs() < 1e-9);
        // B waited 0→5, averaged over 2 served.
        assert!((server.summary(Metric::WaitTime).mean - 2.5).abs() < 1e-9);
        assert!((server.summary(Metric::Served).mean - 2.0).abs() < 1e-9);
        assert_eq!(server.summary(Metric::InService).mean, 0.0);
        assert_eq!(server.summary(Metric::Waiting).mean, 0.0);
    }

    #[test]
    fn test_replications_accumulate_and_identical_runs_have_zero_spread() {
        let mut sim = Simulation::new(Pipeline::new(), SimTime::ZERO, SimTime::new(100.0));
        sim.run(3);

        let response = sim.model().server.summary(Metric::ResponseTime);
        assert_eq!(response.n, 3);
        assert!((response.mean - 6.0).abs() < 1e-9);
        assert_eq!(response.std_dev, 0.0);
        assert_eq!(response.half_width, 0.0);
    }

    #[test]
    fn test_horizon_cuts_off_pending_events() {
        // Horizon 10: B's DONE at t=12 is never dispatched, so B is
        // still in service at measurement time.
        let mut sim = Simulation::new(Pipeline::new(), SimTime::ZERO, SimTime::new(10.0));
        sim.run(1);

        assert_eq!(sim.current_time(), SimTime::new(5.0));
        let server = &sim.model().server;
        assert!((server.summary(Metric::Served).mean - 1.0).abs() < 1e-9);
        assert!((server.summary(Metric::InService).mean - 1.0).abs() < 1e-9);
        // A's closed period: (0 + 1·5)/1 = 5.
        assert!((server.summary(Metric::ResponseTime).mean - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_entities_disposed_between_replications() {
        let mut sim = Simulation::new(Pipeline::new(), SimTime::ZERO, SimTime::new(10.0));
        sim.run(2);
        // B survives each cutoff but the controller drains it.
        assert!(sim.entities.is_empty());
    }

    #[test]
    fn test_unknown_kind_is_dropped_and_run_continues() {
        let mut model = Pipeline::new();
        model.schedule_bogus = true;
        let mut sim = Simulation::new(model, SimTime::ZERO, SimTime::new(100.0));
        sim.run(1);

        // The bogus event was popped and dropped; the rest ran normally.
        assert_eq!(sim.state(), RunState::Done);
        assert_eq!(sim.current_time(), SimTime::new(12.0));
        assert!((sim.model().server.summary(Metric::Served).mean - 2.0).abs() < 1e-9);
    }

    /// A model that schedules nothing from its start event.
    struct Inert;

    impl Model for Inert {
        type Entity = ();

        fn begin_replication(&mut self) {}

        fn initial_entity(&mut self) {}

        fn handle(&mut self, _ctx: &mut SimContext<'_, ()>, _event: &Event) -> SimResult<()> {
            Ok(())
        }

        fn end_replication(&mut self, _now: SimTime) {}
    }

    #[test]
    fn test_empty_queue_terminates_before_horizon() {
        let mut sim = Simulation::new(Inert, SimTime::ZERO, SimTime::new(100.0));
        sim.run(1);
        // Only the start event ran; the clock never moved.
        assert_eq!(sim.events_processed(), 1);
        assert_eq!(sim.current_time(), SimTime::ZERO);
        assert!(sim.current_time().is_before(sim.horizon()));
        assert_eq!(sim.state(), RunState::Done);
    }

    #[test]
    fn test_deterministic_across_runs() {
        fn trace() -> (f64, u64) {
            let mut sim = Simulation::new(Pipeline::new(), SimTime::ZERO, SimTime::new(100.0));
            sim.run(5);
            (
                sim.model().server.summary(Metric::ResponseTime).mean,
                sim.events_processed(),
            )
        }
        assert_eq!(trace(), trace());
    }
}
