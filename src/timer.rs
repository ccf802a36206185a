use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Period of the session clock
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Test length, picked before a run and fixed for its duration
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize, strum_macros::Display,
)]
pub enum TimerConfig {
    #[value(name = "15")]
    #[serde(rename = "15")]
    #[strum(serialize = "15s")]
    Secs15,
    #[value(name = "30")]
    #[serde(rename = "30")]
    #[strum(serialize = "30s")]
    Secs30,
    #[default]
    #[value(name = "60")]
    #[serde(rename = "60")]
    #[strum(serialize = "60s")]
    Secs60,
    #[value(name = "120")]
    #[serde(rename = "120")]
    #[strum(serialize = "120s")]
    Secs120,
    /// count up until stopped
    #[value(name = "unbounded")]
    #[serde(rename = "unbounded")]
    #[strum(serialize = "unbounded")]
    Unbounded,
}

impl TimerConfig {
    pub const ALL: [TimerConfig; 5] = [
        TimerConfig::Secs15,
        TimerConfig::Secs30,
        TimerConfig::Secs60,
        TimerConfig::Secs120,
        TimerConfig::Unbounded,
    ];

    /// Countdown length, or None for count-up
    pub fn countdown_secs(&self) -> Option<u64> {
        match self {
            TimerConfig::Secs15 => Some(15),
            TimerConfig::Secs30 => Some(30),
            TimerConfig::Secs60 => Some(60),
            TimerConfig::Secs120 => Some(120),
            TimerConfig::Unbounded => None,
        }
    }

    pub fn is_countdown(&self) -> bool {
        self.countdown_secs().is_some()
    }

    /// Displayed time value before the first tick
    pub fn initial_time(&self) -> u64 {
        self.countdown_secs().unwrap_or(0)
    }

    /// Displayed time value after `elapsed` whole seconds
    pub fn time_value(&self, elapsed: u64) -> u64 {
        match self.countdown_secs() {
            Some(secs) => secs.saturating_sub(elapsed),
            None => elapsed,
        }
    }

    pub fn next(&self) -> Self {
        let idx = self.position();
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> Self {
        let idx = self.position();
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    fn position(&self) -> usize {
        Self::ALL.iter().position(|c| c == self).unwrap_or(0)
    }
}

/// A running periodic timer. Dropping the handle cancels it: nothing ticks
/// without one.
#[derive(Debug)]
pub struct TimerHandle {
    started_at: Instant,
    fired: u64,
}

impl TimerHandle {
    pub fn start(now: Instant) -> Self {
        Self {
            started_at: now,
            fired: 0,
        }
    }

    /// Ticks that became due since the last call
    pub fn due_ticks(&mut self, now: Instant) -> u64 {
        let total = (now.saturating_duration_since(self.started_at).as_millis()
            / TICK_INTERVAL.as_millis()) as u64;
        let due = total.saturating_sub(self.fired);
        self.fired = self.fired.max(total);
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_countdown_values() {
        assert_eq!(TimerConfig::Secs30.countdown_secs(), Some(30));
        assert_eq!(TimerConfig::Unbounded.countdown_secs(), None);
        assert_eq!(TimerConfig::default(), TimerConfig::Secs60);
        assert_eq!(TimerConfig::Secs60.initial_time(), 60);
        assert_eq!(TimerConfig::Unbounded.initial_time(), 0);
    }

    #[test]
    fn test_time_value_counts_in_the_right_direction() {
        assert_eq!(TimerConfig::Secs15.time_value(4), 11);
        assert_eq!(TimerConfig::Secs15.time_value(40), 0);
        assert_eq!(TimerConfig::Unbounded.time_value(40), 40);
    }

    #[test]
    fn test_cycling_wraps_around() {
        assert_eq!(TimerConfig::Unbounded.next(), TimerConfig::Secs15);
        assert_eq!(TimerConfig::Secs15.prev(), TimerConfig::Unbounded);
        assert_eq!(TimerConfig::Secs30.next(), TimerConfig::Secs60);
    }

    #[test]
    fn test_display_and_serde_names() {
        assert_eq!(TimerConfig::Secs120.to_string(), "120s");
        assert_eq!(
            serde_json::to_string(&TimerConfig::Unbounded).unwrap(),
            "\"unbounded\""
        );
        let parsed: TimerConfig = serde_json::from_str("\"30\"").unwrap();
        assert_eq!(parsed, TimerConfig::Secs30);
    }

    #[test]
    fn test_due_ticks_counts_whole_intervals_once() {
        let start = Instant::now();
        let mut handle = TimerHandle::start(start);

        assert_eq!(handle.due_ticks(start + Duration::from_millis(900)), 0);
        assert_eq!(handle.due_ticks(start + Duration::from_millis(1000)), 1);
        assert_eq!(handle.due_ticks(start + Duration::from_millis(1500)), 0);
        assert_eq!(handle.due_ticks(start + Duration::from_millis(4200)), 3);
        // a clock reading from the past never yields ticks
        assert_eq!(handle.due_ticks(start), 0);
    }
}
