//! Discussion countdown
//!
//! Like the reveal sequencer, the timer only compares caller-supplied
//! instants; something outside drives the ticks.

use crate::prefs::clamp_timer_minutes;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    /// Not started, full duration left
    Idle,
    Running {
        since: Instant,
        /// Time already spent before `since`
        spent: Duration,
    },
    Paused { spent: Duration },
    /// Ran out or was ended early
    Finished,
}

#[derive(Debug, Clone)]
pub struct CountdownTimer {
    minutes: u32,
    state: TimerState,
}

impl CountdownTimer {
    pub fn new(minutes: u32) -> Self {
        Self {
            minutes: clamp_timer_minutes(&serde_json::json!(minutes)),
            state: TimerState::Idle,
        }
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.minutes) * 60)
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn has_started(&self) -> bool {
        self.state != TimerState::Idle
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, TimerState::Running { .. })
    }

    pub fn is_paused(&self) -> bool {
        matches!(self.state, TimerState::Paused { .. })
    }

    /// Change the length; only allowed before the countdown starts
    pub fn set_minutes(&mut self, minutes: u32) -> Result<u32, String> {
        if self.has_started() {
            return Err("Timer length cannot change once the countdown has started".to_string());
        }
        self.minutes = clamp_timer_minutes(&serde_json::json!(minutes));
        Ok(self.minutes)
    }

    fn spent(&self, now: Instant) -> Duration {
        match self.state {
            TimerState::Idle => Duration::ZERO,
            TimerState::Running { since, spent } => spent + now.saturating_duration_since(since),
            TimerState::Paused { spent } => spent,
            TimerState::Finished => self.duration(),
        }
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.duration().saturating_sub(self.spent(now))
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        self.state == TimerState::Finished || self.remaining(now).is_zero()
    }

    pub fn start(&mut self, now: Instant) -> Result<(), String> {
        match self.state {
            TimerState::Idle => {
                self.state = TimerState::Running {
                    since: now,
                    spent: Duration::ZERO,
                };
                Ok(())
            }
            TimerState::Paused { .. } => self.resume(now),
            TimerState::Running { .. } => Err("Timer is already running".to_string()),
            TimerState::Finished => Err("Time is up, reset the timer first".to_string()),
        }
    }

    pub fn pause(&mut self, now: Instant) -> Result<(), String> {
        if self.is_finished(now) {
            self.state = TimerState::Finished;
            return Err("Time is up".to_string());
        }
        match self.state {
            TimerState::Running { .. } => {
                self.state = TimerState::Paused {
                    spent: self.spent(now),
                };
                Ok(())
            }
            _ => Err("Timer is not running".to_string()),
        }
    }

    pub fn resume(&mut self, now: Instant) -> Result<(), String> {
        match self.state {
            TimerState::Paused { spent } => {
                self.state = TimerState::Running { since: now, spent };
                Ok(())
            }
            _ => Err("Timer is not paused".to_string()),
        }
    }

    /// Back to the full duration, not started
    pub fn reset(&mut self) {
        self.state = TimerState::Idle;
    }

    /// End the discussion early
    pub fn force_end(&mut self) {
        self.state = TimerState::Finished;
    }

    /// Remaining time as `MM:SS`
    pub fn format_remaining(&self, now: Instant) -> String {
        format_mm_ss(self.remaining(now))
    }
}

/// `MM:SS`, rounding partial seconds up so "00:00" only shows at the end
pub fn format_mm_ss(remaining: Duration) -> String {
    let mut secs = remaining.as_secs();
    if remaining.subsec_nanos() > 0 {
        secs += 1;
    }
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps_minutes() {
        assert_eq!(CountdownTimer::new(0).minutes(), 1);
        assert_eq!(CountdownTimer::new(99).minutes(), 15);
        assert_eq!(CountdownTimer::new(5).duration(), Duration::from_secs(300));
    }

    #[test]
    fn test_countdown_pause_resume() {
        let t = Instant::now();
        let mut timer = CountdownTimer::new(1);
        assert_eq!(timer.format_remaining(t), "01:00");

        timer.start(t).unwrap();
        assert_eq!(timer.remaining(t + Duration::from_secs(20)), Duration::from_secs(40));

        timer.pause(t + Duration::from_secs(20)).unwrap();
        // paused time does not count
        assert_eq!(timer.remaining(t + Duration::from_secs(500)), Duration::from_secs(40));

        timer.resume(t + Duration::from_secs(500)).unwrap();
        assert_eq!(
            timer.format_remaining(t + Duration::from_secs(510)),
            "00:30"
        );
        assert!(!timer.is_finished(t + Duration::from_secs(539)));
        assert!(timer.is_finished(t + Duration::from_secs(540)));
        assert_eq!(timer.format_remaining(t + Duration::from_secs(600)), "00:00");
    }

    #[test]
    fn test_reset_and_force_end() {
        let t = Instant::now();
        let mut timer = CountdownTimer::new(3);
        timer.start(t).unwrap();
        timer.force_end();
        assert!(timer.is_finished(t));
        assert_eq!(timer.remaining(t), Duration::ZERO);
        assert!(timer.start(t).is_err());

        timer.reset();
        assert!(!timer.has_started());
        assert_eq!(timer.remaining(t), Duration::from_secs(180));
        timer.start(t).unwrap();
        assert!(timer.is_running());
    }

    #[test]
    fn test_minutes_locked_after_start() {
        let t = Instant::now();
        let mut timer = CountdownTimer::new(5);
        assert_eq!(timer.set_minutes(20), Ok(15));
        timer.start(t).unwrap();
        assert!(timer.set_minutes(2).is_err());
        timer.reset();
        assert_eq!(timer.set_minutes(2), Ok(2));
    }

    #[test]
    fn test_invalid_transitions() {
        let t = Instant::now();
        let mut timer = CountdownTimer::new(1);
        assert!(timer.pause(t).is_err());
        assert!(timer.resume(t).is_err());
        timer.start(t).unwrap();
        assert!(timer.start(t).is_err());
        assert!(timer.pause(t + Duration::from_secs(61)).is_err());
        assert_eq!(timer.state(), TimerState::Finished);
    }

    #[test]
    fn test_format_mm_ss() {
        assert_eq!(format_mm_ss(Duration::from_secs(905)), "15:05");
        assert_eq!(format_mm_ss(Duration::from_millis(59_001)), "01:00");
        assert_eq!(format_mm_ss(Duration::from_millis(400)), "00:01");
        assert_eq!(format_mm_ss(Duration::ZERO), "00:00");
    }
}
