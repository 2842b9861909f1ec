use std::time::{Duration, Instant};

////////////////////////////////////////////////////////////////////////////////
// Timer

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerExpired;

/// A wall-clock budget that starts running when it is created.
#[derive(Debug)]
pub struct Timer {
    start: Instant,
    limit: Duration,
}

impl Timer {
    pub fn finite(limit: Duration) -> Self {
        Timer {
            start: Instant::now(),
            limit,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn tick(&self) -> Result<(), TimerExpired> {
        if self.elapsed() > self.limit {
            Err(TimerExpired)
        } else {
            Ok(())
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Utilities

pub fn cartesian_product<V: Clone>(choices: &[Vec<V>]) -> Vec<Vec<V>> {
    let mut results = vec![vec![]];
    for vs in choices {
        let mut new_results = vec![];
        for prefix in results {
            for v in vs {
                let mut new_prefix = prefix.clone();
                new_prefix.push(v.clone());
                new_results.push(new_prefix)
            }
        }
        results = new_results;
    }
    results
}
