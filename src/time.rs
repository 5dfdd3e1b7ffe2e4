/// Virtual time for the simulation kernel.
///
/// Represents a continuous simulated timestamp with no dependency on
/// `std::time`. Time advances only when the dispatch loop executes
/// events — never from wall-clock observation.

/// A point in simulated time.
///
/// Wraps an `f64` so delays drawn from continuous distributions
/// (exponential service times, uniform inter-arrivals) are representable
/// directly. Totally ordered via `f64::total_cmp`, which keeps the event
/// queue's comparisons well-defined.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct SimTime(f64);

impl SimTime {
    /// The zero-point of simulated time.
    pub const ZERO: SimTime = SimTime(0.0);

    /// Create a new `SimTime` from a raw value.
    ///
    /// The value must be finite; non-finite times would poison every
    /// subsequent queue comparison.
    #[inline]
    pub fn new(raw: f64) -> Self {
        debug_assert!(raw.is_finite(), "SimTime must be finite, got {}", raw);
        SimTime(raw)
    }

    /// Return the raw value.
    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }

    /// The time `delay` units after `self`.
    #[inline]
    pub fn plus(self, delay: f64) -> SimTime {
        SimTime::new(self.0 + delay)
    }

    /// Returns `true` if `self` is strictly before `other`.
    #[inline]
    pub fn is_before(self, other: SimTime) -> bool {
        self < other
    }

    /// Elapsed time from `other` to `self` (negative if `other` is later).
    #[inline]
    pub fn since(self, other: SimTime) -> f64 {
        self.0 - other.0
    }
}

impl Eq for SimTime {}

impl Ord for SimTime {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl PartialOrd for SimTime {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for SimTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "T={:.3}", self.0)
    }
}
