//! Replication statistics: running accumulators, summaries, and the
//! Student-t critical values behind the 95% confidence intervals.
//!
//! Each metric keeps only a sum, a sum of squares, and a count across
//! replications; mean, standard deviation, and confidence half-width
//! are derived on demand.

/// The five per-resource metrics recorded at the end of a replication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum Metric {
    /// Mean response time of clients served in the replication.
    ResponseTime,
    /// Mean waiting time, averaged over served + in-service clients.
    WaitTime,
    /// Clients fully served by the replication horizon.
    Served,
    /// Clients still holding capacity at the horizon.
    InService,
    /// Clients still queued at the horizon.
    Waiting,
}

impl Metric {
    /// All metrics, in recording order.
    pub const ALL: [Metric; 5] = [
        Metric::ResponseTime,
        Metric::WaitTime,
        Metric::Served,
        Metric::InService,
        Metric::Waiting,
    ];

    /// Number of metrics.
    pub const COUNT: usize = 5;

    /// Human-readable label for reports.
    pub fn label(self) -> &'static str {
        match self {
            Metric::ResponseTime => "mean response time",
            Metric::WaitTime => "mean waiting time",
            Metric::Served => "clients served",
            Metric::InService => "clients being served",
            Metric::Waiting => "clients still waiting",
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ── Running accumulator ───────────────────────────────────────────────

/// Sum / sum-of-squares accumulator over per-replication observations.
///
/// Stores no individual samples; every derived figure is O(1).
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct RunningStat {
    sum: f64,
    sum_sq: f64,
    n: u32,
}

impl RunningStat {
    /// Fresh, empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one observation.
    pub fn push(&mut self, value: f64) {
        self.sum += value;
        self.sum_sq += value * value;
        self.n += 1;
    }

    /// Forget everything.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Number of observations recorded.
    pub fn count(&self) -> u32 {
        self.n
    }

    /// Sample mean, or 0 with no observations.
    pub fn mean(&self) -> f64 {
        if self.n == 0 {
            0.0
        } else {
            self.sum / self.n as f64
        }
    }

    /// Population variance `(n·Σx² − (Σx)²)/n²`, clamped at zero to
    /// absorb negative rounding artifacts.
    pub fn variance(&self) -> f64 {
        if self.n == 0 {
            return 0.0;
        }
        let n = self.n as f64;
        ((n * self.sum_sq - self.sum * self.sum) / (n * n)).max(0.0)
    }

    /// Standard deviation.
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Half the width of the two-sided 95% confidence interval around
    /// the mean: `t(n−1)·σ/√n`. Zero until there are two observations.
    pub fn half_width(&self) -> f64 {
        if self.n < 2 {
            return 0.0;
        }
        match student_t(self.n - 1) {
            Some(t) => t * self.std_dev() / (self.n as f64).sqrt(),
            None => 0.0,
        }
    }

    /// Snapshot of the derived figures.
    pub fn summary(&self) -> Summary {
        Summary {
            mean: self.mean(),
            std_dev: self.std_dev(),
            half_width: self.half_width(),
            n: self.n,
        }
    }
}

/// Derived statistics for one metric across all replications.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Summary {
    /// Mean over replications.
    pub mean: f64,
    /// Standard deviation over replications.
    pub std_dev: f64,
    /// 95% confidence half-width (`mean ± half_width`).
    pub half_width: f64,
    /// Number of replications observed.
    pub n: u32,
}

// ── Student-t critical values ─────────────────────────────────────────

/// Right critical values of the Student t-distribution at γ = 0.975
/// (two-sided 95% confidence).
///
/// Entries 0..100 are exact for 1–100 degrees of freedom; 100..125
/// cover 102–150 in steps of 2; 125..134 cover 200–1000 in steps of
/// 100; entry 134 is the asymptotic (normal) value.
#[rustfmt::skip]
const T_TABLE: [f64; 135] = [
    // df 1..100
    12.7062, 4.3027, 3.1824, 2.7764, 2.5706,
     2.4469, 2.3646, 2.3060, 2.2622, 2.2281,
     2.2010, 2.1788, 2.1604, 2.1448, 2.1315,
     2.1199, 2.1098, 2.1009, 2.0930, 2.0860,
     2.0796, 2.0739, 2.0687, 2.0639, 2.0595,
     2.0555, 2.0518, 2.0484, 2.0452, 2.0423,
     2.0395, 2.0369, 2.0345, 2.0322, 2.0301,
     2.0281, 2.0262, 2.0244, 2.0227, 2.0211,
     2.0195, 2.0181, 2.0167, 2.0154, 2.0141,
     2.0129, 2.0117, 2.0106, 2.0096, 2.0086,
     2.0076, 2.0066, 2.0057, 2.0049, 2.0040,
     2.0032, 2.0025, 2.0017, 2.0010, 2.0003,
     1.9996, 1.9990, 1.9983, 1.9977, 1.9971,
     1.9966, 1.9960, 1.9955, 1.9949, 1.9944,
     1.9939, 1.9935, 1.9930, 1.9925, 1.9921,
     1.9917, 1.9913, 1.9908, 1.9905, 1.9901,
     1.9897, 1.9893, 1.9890, 1.9886, 1.9883,
     1.9879, 1.9876, 1.9873, 1.9870, 1.9867,
     1.9864, 1.9861, 1.9758, 1.9855, 1.9853,
     1.9850, 1.9847, 1.9845, 1.9842, 1.9840,
    // df 102..150, step 2
     1.9835, 1.9830, 1.9826, 1.9822, 1.9818,
     1.9814, 1.9810, 1.9806, 1.9803, 1.9799,
     1.9796, 1.9793, 1.9790, 1.9787, 1.9784,
     1.9781, 1.9778, 1.9776, 1.9773, 1.9771,
     1.9768, 1.9766, 1.9763, 1.9761, 1.9759,
    // df 200..1000, step 100, then asymptotic
     1.9719, 1.9679, 1.9659, 1.9647, 1.9639,
     1.9634, 1.9629, 1.9626, 1.9623, 1.9600,
];

/// Critical value of the Student t-distribution for `df` degrees of
/// freedom at the two-sided 95% confidence level.
///
/// Returns `None` for zero degrees of freedom. Above 1000 df the
/// asymptotic (normal) value 1.9600 is returned.
pub fn student_t(df: u32) -> Option<f64> {
    match df {
        0 => None,
        1..=100 => Some(T_TABLE[(df - 1) as usize]),
        101..=150 => Some(T_TABLE[((df - 100) / 2 + 99) as usize]),
        151..=1000 => Some(T_TABLE[((df - 100) / 100 + 124) as usize]),
        _ => Some(T_TABLE[134]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_single_observation_round_trip() {
        let mut stat = RunningStat::new();
        stat.push(42.5);
        let s = stat.summary();
        assert_eq!(s.n, 1);
        assert!((s.mean - 42.5).abs() < EPS);
        assert_eq!(s.std_dev, 0.0);
        assert_eq!(s.half_width, 0.0);
    }

    #[test]
    fn test_two_observations() {
        let mut stat = RunningStat::new();
        stat.push(2.0);
        stat.push(4.0);
        assert!((stat.mean() - 3.0).abs() < EPS);
        // Population variance of {2, 4} is 1.
        assert!((stat.variance() - 1.0).abs() < EPS);
        assert!((stat.std_dev() - 1.0).abs() < EPS);
        // t(1) = 12.7062, half-width = 12.7062 · 1 / √2.
        let expected = 12.7062 / 2.0_f64.sqrt();
        assert!((stat.half_width() - expected).abs() < 1e-6);
    }

    #[test]
    fn test_identical_observations_have_zero_spread() {
        let mut stat = RunningStat::new();
        for _ in 0..10 {
            stat.push(7.0);
        }
        assert!((stat.mean() - 7.0).abs() < EPS);
        // Clamp absorbs any negative rounding residue.
        assert_eq!(stat.variance(), 0.0);
        assert_eq!(stat.half_width(), 0.0);
    }

    #[test]
    fn test_empty_stat() {
        let stat = RunningStat::new();
        assert_eq!(stat.count(), 0);
        assert_eq!(stat.mean(), 0.0);
        assert_eq!(stat.std_dev(), 0.0);
        assert_eq!(stat.half_width(), 0.0);
    }

    #[test]
    fn test_reset() {
        let mut stat = RunningStat::new();
        stat.push(1.0);
        stat.push(2.0);
        stat.reset();
        assert_eq!(stat.count(), 0);
        assert_eq!(stat.mean(), 0.0);
    }

    #[test]
    fn test_t_table_boundaries() {
        assert_eq!(student_t(0), None);
        assert_eq!(student_t(1), Some(12.7062));
        assert_eq!(student_t(100), Some(1.9840));
        assert_eq!(student_t(10000), Some(1.9600));
    }

    #[test]
    fn test_t_table_stepped_ranges() {
        // 101–150 step every 2: df 101 falls back to the df=100 entry,
        // df 102 hits the first stepped entry, df 150 the last.
        assert_eq!(student_t(101), Some(1.9840));
        assert_eq!(student_t(102), Some(1.9835));
        assert_eq!(student_t(150), Some(1.9759));
        // 151–1000 step every 100.
        assert_eq!(student_t(151), Some(1.9759));
        assert_eq!(student_t(200), Some(1.9719));
        assert_eq!(student_t(1000), Some(1.9623));
        assert_eq!(student_t(1001), Some(1.9600));
    }

    #[test]
    fn test_metric_enumeration() {
        assert_eq!(Metric::ALL.len(), Metric::COUNT);
        assert_eq!(Metric::ResponseTime as usize, 0);
        assert_eq!(Metric::Waiting as usize, 4);
        assert_eq!(format!("{}", Metric::Served), "clients served");
    }
}
