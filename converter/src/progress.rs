use std::time::Instant;

use tracing::info;

/// Advisory progress reporting with a linear time-remaining estimate.
pub struct ProgressEstimator {
    split: &'static str,
    unit: &'static str,
    total: usize,
    every: usize,
    started: Instant,
}

impl ProgressEstimator {
    pub fn start(split: &'static str, unit: &'static str, total: usize, every: usize) -> Self {
        Self {
            split,
            unit,
            total,
            every: every.max(1),
            started: Instant::now(),
        }
    }

    /// Logs progress when `index` (0-based) falls on the reporting interval.
    pub fn observe(&self, index: usize) {
        if index % self.every != 0 {
            return;
        }
        let elapsed_secs = self.started.elapsed().as_secs_f64();
        info!(
            split = self.split,
            unit = self.unit,
            processed = index,
            total = self.total,
            fraction = fraction_complete(index, self.total),
            elapsed_secs,
            hours_remaining = hours_remaining(index, self.total, elapsed_secs),
            "Conversion progress"
        );
    }
}

pub fn fraction_complete(processed: usize, total: usize) -> f64 {
    if total == 0 {
        return 1.0;
    }
    processed as f64 / total as f64
}

/// Extrapolates the time spent so far over the remaining items.
pub fn hours_remaining(processed: usize, total: usize, elapsed_secs: f64) -> f64 {
    let remaining = total.saturating_sub(processed) as f64;
    remaining * elapsed_secs / (processed.max(1) as f64 * 3600.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_scales_linearly_with_remaining_work() {
        // 100 of 400 done in one hour leaves three hours
        let estimate = hours_remaining(100, 400, 3600.0);
        assert!((estimate - 3.0).abs() < 1e-9);
    }

    #[test]
    fn first_observation_does_not_divide_by_zero() {
        let estimate = hours_remaining(0, 10, 36.0);
        assert!((estimate - 0.1).abs() < 1e-9);
        assert!(hours_remaining(12, 10, 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn fraction_handles_empty_inputs() {
        assert!((fraction_complete(0, 0) - 1.0).abs() < f64::EPSILON);
        assert!((fraction_complete(25, 100) - 0.25).abs() < f64::EPSILON);
    }
}
