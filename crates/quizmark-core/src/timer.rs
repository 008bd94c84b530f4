//! Countdown timer.
//!
//! A single background task ticks once per second and reports through an
//! event channel. Starting or resuming always aborts the previous task
//! first, so at most one task ever decrements the remaining time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::error::QuizError;
use crate::grading::TimingInput;

/// Remaining time at or below which the countdown is considered low.
pub const LOW_TIME_THRESHOLD_SECS: u64 = 60;

/// Events emitted by a running [`Countdown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// One second elapsed.
    Tick { remaining: u64 },
    /// The countdown reached zero and stopped.
    Expired,
}

/// Validate a countdown length given in minutes.
pub fn timer_duration_from_minutes(minutes: i64) -> Result<Duration, QuizError> {
    if minutes <= 0 {
        return Err(QuizError::InvalidTimerDuration(format!(
            "{minutes} minutes; enter a positive number of minutes"
        )));
    }
    u64::try_from(minutes)
        .ok()
        .and_then(|m| m.checked_mul(60))
        .map(Duration::from_secs)
        .ok_or_else(|| {
            QuizError::InvalidTimerDuration(format!("{minutes} minutes is too long"))
        })
}

/// A pausable one-second countdown.
///
/// Must be driven from within a tokio runtime.
pub struct Countdown {
    duration_secs: u64,
    remaining: Arc<AtomicU64>,
    task: Option<JoinHandle<()>>,
    events: mpsc::UnboundedSender<TimerEvent>,
}

impl Countdown {
    /// Create an idle countdown and the receiver for its events.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TimerEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        (
            Self {
                duration_secs: 0,
                remaining: Arc::new(AtomicU64::new(0)),
                task: None,
                events,
            },
            rx,
        )
    }

    /// Start from `duration`, discarding any previous run.
    pub fn start(&mut self, duration: Duration) {
        self.stop_task();
        self.duration_secs = duration.as_secs();
        self.remaining.store(self.duration_secs, Ordering::SeqCst);
        self.spawn();
    }

    /// Load a paused countdown, e.g. from a saved session.
    pub fn restore(&mut self, duration: Duration, remaining_secs: u64) {
        self.stop_task();
        self.duration_secs = duration.as_secs();
        self.remaining
            .store(remaining_secs.min(self.duration_secs), Ordering::SeqCst);
    }

    /// Stop ticking, keeping the remaining time. Returns `false` if it was
    /// not running.
    pub fn pause(&mut self) -> bool {
        let was_running = self.is_running();
        self.stop_task();
        was_running
    }

    /// Continue a paused countdown. Returns `false` if already running or
    /// nothing remains.
    pub fn resume(&mut self) -> bool {
        if self.is_running() || self.remaining() == 0 {
            return false;
        }
        self.stop_task();
        self.spawn();
        true
    }

    /// Stop and clear the countdown.
    pub fn cancel(&mut self) {
        self.stop_task();
        self.remaining.store(0, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    pub fn remaining(&self) -> u64 {
        self.remaining.load(Ordering::SeqCst)
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.duration_secs.saturating_sub(self.remaining())
    }

    pub fn is_low(&self) -> bool {
        let left = self.remaining();
        left > 0 && left <= LOW_TIME_THRESHOLD_SECS
    }

    /// Timing input for the grading engine.
    pub fn timing(&self) -> TimingInput {
        TimingInput::Countdown {
            duration_secs: self.duration_secs,
            remaining_secs: self.remaining(),
        }
    }

    fn stop_task(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    fn spawn(&mut self) {
        let remaining = Arc::clone(&self.remaining);
        let events = self.events.clone();
        self.task = Some(tokio::spawn(tick_loop(remaining, events)));
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.stop_task();
    }
}

async fn tick_loop(remaining: Arc<AtomicU64>, events: mpsc::UnboundedSender<TimerEvent>) {
    let mut interval = tokio::time::interval(Duration::from_secs(1));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    interval.tick().await;

    loop {
        interval.tick().await;
        let left = remaining.load(Ordering::SeqCst).saturating_sub(1);
        remaining.store(left, Ordering::SeqCst);
        // A dropped receiver only means nobody is listening.
        let _ = events.send(TimerEvent::Tick { remaining: left });
        if left == 0 {
            let _ = events.send(TimerEvent::Expired);
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_validation() {
        assert_eq!(
            timer_duration_from_minutes(10).unwrap(),
            Duration::from_secs(600)
        );
        assert!(matches!(
            timer_duration_from_minutes(0),
            Err(QuizError::InvalidTimerDuration(_))
        ));
        assert!(timer_duration_from_minutes(-5).is_err());
    }

    #[test]
    fn huge_durations_are_rejected() {
        assert!(matches!(
            timer_duration_from_minutes(i64::MAX),
            Err(QuizError::InvalidTimerDuration(_))
        ));
        assert!(timer_duration_from_minutes(400_000_000_000_000_000).is_err());
        assert_eq!(
            timer_duration_from_minutes(i64::MAX / 60).unwrap(),
            Duration::from_secs((i64::MAX / 60) as u64 * 60)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn counts_down_and_expires() {
        let (mut timer, mut rx) = Countdown::new();
        timer.start(Duration::from_secs(3));

        assert_eq!(rx.recv().await, Some(TimerEvent::Tick { remaining: 2 }));
        assert_eq!(rx.recv().await, Some(TimerEvent::Tick { remaining: 1 }));
        assert_eq!(rx.recv().await, Some(TimerEvent::Tick { remaining: 0 }));
        assert_eq!(rx.recv().await, Some(TimerEvent::Expired));

        tokio::task::yield_now().await;
        assert!(!timer.is_running());
        assert_eq!(timer.elapsed_secs(), 3);
        assert_eq!(
            timer.timing(),
            TimingInput::Countdown {
                duration_secs: 3,
                remaining_secs: 0
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn pause_freezes_remaining_time() {
        let (mut timer, mut rx) = Countdown::new();
        timer.start(Duration::from_secs(10));
        assert_eq!(rx.recv().await, Some(TimerEvent::Tick { remaining: 9 }));

        assert!(timer.pause());
        assert!(!timer.pause());
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(timer.remaining(), 9);
        assert!(rx.try_recv().is_err());

        assert!(timer.resume());
        assert!(!timer.resume());
        assert_eq!(rx.recv().await, Some(TimerEvent::Tick { remaining: 8 }));
    }

    #[tokio::test(start_paused = true)]
    async fn restarting_never_double_decrements() {
        let (mut timer, _rx) = Countdown::new();
        timer.start(Duration::from_secs(10));
        timer.start(Duration::from_secs(10));
        timer.resume();

        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(timer.remaining(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_clears() {
        let (mut timer, _rx) = Countdown::new();
        timer.start(Duration::from_secs(120));
        timer.cancel();
        assert!(!timer.is_running());
        assert_eq!(timer.remaining(), 0);
        assert!(!timer.resume());
    }

    #[tokio::test(start_paused = true)]
    async fn restore_is_paused() {
        let (mut timer, mut rx) = Countdown::new();
        timer.restore(Duration::from_secs(600), 45);
        assert!(!timer.is_running());
        assert_eq!(timer.remaining(), 45);
        assert!(timer.is_low());
        assert_eq!(timer.elapsed_secs(), 555);

        assert!(timer.resume());
        assert_eq!(rx.recv().await, Some(TimerEvent::Tick { remaining: 44 }));
    }
}
