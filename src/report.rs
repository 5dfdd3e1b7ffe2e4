//! Rendering of per-resource statistics.
//!
//! The kernel exposes mean, standard deviation, and 95% confidence
//! half-width per metric; `ResourceReport` packages them as a plain
//! value with a `Display` implementation, so the caller owns the sink.

use std::fmt;

use crate::resource::Resource;
use crate::stats::{Metric, Summary};

/// Snapshot of a resource's aggregate statistics, one row per metric.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceReport {
    name: String,
    rows: Vec<(Metric, Summary)>,
}

impl ResourceReport {
    /// Snapshot `resource`'s statistics.
    pub fn of(resource: &Resource) -> Self {
        ResourceReport {
            name: resource.name().to_string(),
            rows: Metric::ALL
                .iter()
                .map(|&m| (m, resource.summary(m)))
                .collect(),
        }
    }

    /// Resource name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All rows, in metric order.
    pub fn rows(&self) -> &[(Metric, Summary)] {
        &self.rows
    }

    /// Summary for one metric.
    pub fn summary(&self, metric: Metric) -> Summary {
        self.rows
            .iter()
            .find(|(m, _)| *m == metric)
            .map(|(_, s)| *s)
            .unwrap_or(Summary {
                mean: 0.0,
                std_dev: 0.0,
                half_width: 0.0,
                n: 0,
            })
    }
}

impl fmt::Display for ResourceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Statistics for resource: {} (0.95 confidence interval)",
            self.name
        )?;
        for (metric, s) in &self.rows {
            writeln!(
                f,
                "  * {:<24} : {:>10.2}  +/- {:>8.2}  (sd {:>8.2})",
                metric.label(),
                s.mean,
                s.half_width,
                s.std_dev
            )?;
        }
        Ok(())
    }
}
