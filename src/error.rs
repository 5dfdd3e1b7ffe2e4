//! Error types for the simulation kernel.
//!
//! Recoverable conditions (capacity overflow, unknown event kinds) are
//! reported through the `tracing` diagnostic channel and the run
//! continues with corrected state; `SimError` carries the description
//! and doubles as the return type where a caller can act on the
//! failure, e.g. a model's dispatch table.

use thiserror::Error;

use crate::entity::EntityId;
use crate::event::EventKind;
use crate::time::SimTime;

/// The top-level error type for the kernel.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// The model's dispatch table has no handler for this event kind.
    /// The controller reports it and drops the event.
    #[error("unknown event kind {kind} at {at}")]
    UnknownEvent { kind: EventKind, at: SimTime },

    /// A release pushed free capacity past the nominal capacity.
    /// Reported and clamped; the run continues.
    #[error("capacity overflow on resource '{resource}' at {at}")]
    CapacityOverflow { resource: String, at: SimTime },

    /// An event referenced an entity that is no longer alive.
    #[error("entity {0} is not registered")]
    EntityNotFound(EntityId),
}

/// Convenience alias for `Result<T, SimError>`.
pub type SimResult<T> = Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_unknown_event() {
        let e = SimError::UnknownEvent {
            kind: EventKind::new(9),
            at: SimTime::new(12.5),
        };
        assert_eq!(e.to_string(), "unknown event kind #9 at T=12.500");
    }

    #[test]
    fn test_display_capacity_overflow() {
        let e = SimError::CapacityOverflow {
            resource: "teller".into(),
            at: SimTime::new(3.0),
        };
        assert!(e.to_string().contains("teller"));
        assert!(e.to_string().contains("overflow"));
    }

    #[test]
    fn test_is_std_error() {
        let e: Box<dyn std::error::Error> = Box::new(SimError::EntityNotFound(EntityId::new(1)));
        assert!(!e.to_string().is_empty());
    }
}
