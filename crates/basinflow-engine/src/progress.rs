//! Progress reporting.
//!
//! [`Progress`] is what the run callback receives. [`ProgressReporter`]
//! throttles reports to a minimum percentage increment and guarantees the
//! sequence is non-decreasing and ends at exactly 100.

/// One progress report.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Progress {
    /// Percentage complete, in `[0, 100]`.
    pub percent: f64,
    /// Steps completed so far.
    pub completed_steps: usize,
    /// Steps on the schedule.
    pub total_steps: usize,
    /// Age of the last completed step (Ma).
    pub age: f64,
}

impl Progress {
    /// Whether this is the final report.
    pub fn is_complete(&self) -> bool {
        self.percent >= 100.0
    }
}

/// Throttles and orders progress callbacks for one run.
pub struct ProgressReporter<'f> {
    callback: &'f mut dyn FnMut(Progress),
    min_delta: f64,
    last: Option<f64>,
    total_steps: usize,
}

impl<'f> ProgressReporter<'f> {
    /// Reporter for a run of `total_steps` steps.
    pub fn new(callback: &'f mut dyn FnMut(Progress), min_delta: f64, total_steps: usize) -> Self {
        Self {
            callback,
            min_delta,
            last: None,
            total_steps,
        }
    }

    /// Record that `completed` steps are done, the last at `age`.
    ///
    /// Reports below 100 only; [`finish`](Self::finish) sends the 100.
    pub fn step_done(&mut self, completed: usize, age: f64) {
        if self.total_steps == 0 || completed >= self.total_steps {
            return;
        }
        let percent = 100.0 * completed as f64 / self.total_steps as f64;
        let due = match self.last {
            None => true,
            Some(last) => percent - last >= self.min_delta,
        };
        if due {
            self.emit(percent, completed, age);
        }
    }

    /// Send the final 100 % report.
    pub fn finish(&mut self, age: f64) {
        if self.last != Some(100.0) {
            self.emit(100.0, self.total_steps, age);
        }
    }

    /// Last percentage sent, if any.
    pub fn last(&self) -> Option<f64> {
        self.last
    }

    fn emit(&mut self, percent: f64, completed: usize, age: f64) {
        self.last = Some(percent);
        (self.callback)(Progress {
            percent,
            completed_steps: completed,
            total_steps: self.total_steps,
            age,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn collect(min_delta: f64, total: usize) -> Vec<f64> {
        let mut seen = Vec::new();
        {
            let mut cb = |p: Progress| seen.push(p.percent);
            let mut r = ProgressReporter::new(&mut cb, min_delta, total);
            for i in 1..=total {
                r.step_done(i, (total - i) as f64);
            }
            r.finish(0.0);
        }
        seen
    }

    #[test]
    fn ends_at_exactly_one_hundred_once() {
        let seen = collect(1.0, 10);
        assert_eq!(seen.last(), Some(&100.0));
        assert_eq!(seen.iter().filter(|&&p| p == 100.0).count(), 1);
    }

    #[test]
    fn coarse_delta_throttles() {
        let seen = collect(50.0, 100);
        assert_eq!(seen, vec![1.0, 51.0, 100.0]);
    }

    #[test]
    fn single_step_reports_only_completion() {
        assert_eq!(collect(1.0, 1), vec![100.0]);
    }

    proptest! {
        #[test]
        fn reports_never_decrease(total in 1usize..500, delta in 0.01f64..100.0) {
            let seen = collect(delta, total);
            prop_assert!(seen.windows(2).all(|w| w[0] <= w[1]));
            prop_assert_eq!(seen.last().copied(), Some(100.0));
        }
    }
}
