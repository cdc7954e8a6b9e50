//! Trailing-window clearance ratio.

use chrono::NaiveDate;
use std::collections::VecDeque;

/// Running sums of arrivals and stuck completions over the last `W` days.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    window_days: i64,
    entries: VecDeque<WindowEntry>,
    arrivals: u64,
    stuck: u64,
}

#[derive(Debug, Clone, Copy)]
struct WindowEntry {
    date: NaiveDate,
    arrivals: u64,
    stuck: u64,
}

impl RollingWindow {
    /// `window_days` must be at least 1; callers validate it first.
    pub fn new(window_days: i64) -> Self {
        Self {
            window_days,
            entries: VecDeque::new(),
            arrivals: 0,
            stuck: 0,
        }
    }

    /// Add one day and return its ratio.
    ///
    /// Entries aged `>= W` days relative to `date` are evicted first. An
    /// unobservable stuck count contributes 0 to the sum.
    pub fn push(&mut self, date: NaiveDate, arrivals: u64, stuck: Option<u64>) -> Option<f64> {
        while let Some(front) = self.entries.front() {
            if (date - front.date).num_days() < self.window_days {
                break;
            }
            self.arrivals -= front.arrivals;
            self.stuck -= front.stuck;
            self.entries.pop_front();
        }

        let stuck = stuck.unwrap_or(0);
        self.entries.push_back(WindowEntry {
            date,
            arrivals,
            stuck,
        });
        self.arrivals += arrivals;
        self.stuck += stuck;

        self.ratio()
    }

    /// Current ratio; `None` when no arrivals are in the window.
    pub fn ratio(&self) -> Option<f64> {
        (self.arrivals > 0).then(|| self.stuck as f64 / self.arrivals as f64)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
