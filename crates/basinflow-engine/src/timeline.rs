//! Schedule construction.
//!
//! A [`Timeline`] is the list of simulated ages a run visits, oldest first
//! and present day last. Every layer's deposition age is on it, so each
//! layer is first seen at exactly its `age_start` with its nominal
//! thickness.

use basinflow_core::ResolvedLayer;

use crate::config::TimeStepPolicy;

/// Grid points closer than this (Myr) to an event age are dropped in
/// favour of the event. Event ages themselves are never merged.
pub const AGE_EPSILON: f64 = 1.0e-9;

/// Ordered simulated ages for one run.
#[derive(Clone, Debug, PartialEq)]
pub struct Timeline {
    ages: Vec<f64>,
}

impl Timeline {
    /// Build the schedule for `layers` under a validated `policy`.
    ///
    /// Returns a single present-day point if no layer is older than 0.
    pub fn build(policy: &TimeStepPolicy, layers: &[ResolvedLayer]) -> Self {
        let mut events: Vec<f64> = layers.iter().map(|l| l.age_start).collect();
        events.push(0.0);
        sort_descending(&mut events);

        let ages = match *policy {
            TimeStepPolicy::Fixed { step_myr } => fixed(&events, step_myr),
            TimeStepPolicy::Adaptive {
                max_step_myr,
                min_step_myr,
            } => adaptive(&events, max_step_myr, min_step_myr),
        };
        log::debug!(
            "schedule: {} steps from {} Ma, {} deposition events",
            ages.len(),
            ages.first().copied().unwrap_or(0.0),
            events.len() - 1
        );
        Self { ages }
    }

    /// The ages, oldest first.
    pub fn ages(&self) -> &[f64] {
        &self.ages
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.ages.len()
    }

    /// Whether the schedule is empty. Never true for a built timeline.
    pub fn is_empty(&self) -> bool {
        self.ages.is_empty()
    }

    /// Longest interval between consecutive ages (Myr).
    pub fn max_step(&self) -> f64 {
        self.ages
            .windows(2)
            .map(|w| w[0] - w[1])
            .fold(0.0, f64::max)
    }

    /// Consume into the age vector.
    pub fn into_ages(self) -> Vec<f64> {
        self.ages
    }
}

/// Sort descending and drop exact duplicates.
///
/// Deposition ages and present day must survive exactly: merging a near
/// pair would move a layer's first sample off its `age_start`.
fn sort_descending(ages: &mut Vec<f64>) {
    ages.sort_by(|a, b| b.total_cmp(a));
    ages.dedup();
}

fn fixed(events: &[f64], step: f64) -> Vec<f64> {
    let oldest = events[0];
    let mut ages: Vec<f64> = events.to_vec();
    let mut k = 1u64;
    loop {
        let age = oldest - step * k as f64;
        if age <= AGE_EPSILON {
            break;
        }
        // Events win over grid points that would shadow them.
        if events.iter().all(|e| (e - age).abs() >= AGE_EPSILON) {
            ages.push(age);
        }
        k += 1;
    }
    sort_descending(&mut ages);
    ages
}

fn adaptive(events: &[f64], max_step: f64, min_step: f64) -> Vec<f64> {
    let mut ages = vec![events[0]];
    for pair in events.windows(2) {
        let (older, younger) = (pair[0], pair[1]);
        let mut age = older;
        let mut h = min_step;
        loop {
            let remaining = age - younger;
            let mut step = h.min(max_step);
            if remaining <= step + AGE_EPSILON {
                ages.push(younger);
                break;
            }
            if remaining - step < min_step {
                // Split the tail instead of leaving a sliver.
                step = 0.5 * remaining;
            }
            age -= step;
            ages.push(age);
            h *= 2.0;
        }
    }
    ages
}
