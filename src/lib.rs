//! # Kairos — Discrete-Event Simulation Kernel
//!
//! A reusable engine that advances a virtual clock by executing the
//! next scheduled event, models contention for limited-capacity
//! resources, and collects confidence-interval statistics across
//! independent replications. No threads, no wall-clock time — one
//! strictly sequential dispatch loop driven by a virtual clock.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────┐
//! │      Simulation        │ ← replication controller + dispatch loop
//! │  ┌──────────────────┐  │
//! │  │    EventQueue    │  │ ← time-ordered pending events
//! │  └──────────────────┘  │
//! │  ┌──────────────────┐  │
//! │  │  EntityRegistry  │  │ ← live entity handles
//! │  └──────────────────┘  │
//! └───────────┬────────────┘
//!             │ dispatch by kind
//! ┌───────────▼────────────┐
//! │     Model (domain)     │ ← handlers, entities, variates
//! │  ┌──────────────────┐  │
//! │  │    Resource      │  │ ← acquire/release + wait queue
//! │  │   RunningStat    │  │ ← mean / σ / 95% half-width
//! │  └──────────────────┘  │
//! └────────────────────────┘
//! ```

pub mod entity;
pub mod error;
pub mod event;
pub mod report;
pub mod resource;
pub mod simulation;
pub mod stats;
pub mod time;
pub mod variate;

// Re-exports for convenience.
pub use entity::{EntityId, EntityRegistry};
pub use error::{SimError, SimResult};
pub use event::{Event, EventKind, EventQueue, EventSeq};
pub use report::ResourceReport;
pub use resource::{Resource, WaitQueue, WaitRequest};
pub use simulation::{Model, RunState, SimContext, Simulation};
pub use stats::{student_t, Metric, RunningStat, Summary};
pub use time::SimTime;
pub use variate::VariateStream;
