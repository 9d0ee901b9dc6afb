// src/timer.rs

//! Countdown gate shown on every quiz step.
//!
//! A step page runs a countdown of `timer_duration` seconds. The "next" control
//! unlocks once the countdown has expired and, when the quiz set requires it,
//! the visitor has typed a non-blank answer.

use std::time::Duration;

use tokio::{sync::watch, task::JoinHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Running,
    Expired,
}

/// Presentation hint derived from the remaining time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    Calm,
    Warning,
    Urgent,
}

impl Urgency {
    pub fn from_remaining(seconds: u32) -> Self {
        match seconds {
            16.. => Urgency::Calm,
            6..=15 => Urgency::Warning,
            _ => Urgency::Urgent,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Urgency::Calm => "calm",
            Urgency::Warning => "warning",
            Urgency::Urgent => "urgent",
        }
    }
}

/// Outcome of a single one-second tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Still counting; carries the seconds left.
    Running(u32),
    /// This tick reached zero. Reported exactly once.
    Completed,
    /// The timer had already expired before this tick.
    Idle,
}

#[derive(Debug, Clone)]
pub struct QuizTimer {
    duration: u32,
    remaining: u32,
}

impl QuizTimer {
    pub fn new(duration: u32) -> Self {
        Self {
            duration,
            remaining: duration,
        }
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn state(&self) -> TimerState {
        if self.remaining == 0 {
            TimerState::Expired
        } else {
            TimerState::Running
        }
    }

    pub fn is_expired(&self) -> bool {
        self.state() == TimerState::Expired
    }

    pub fn tick(&mut self) -> Tick {
        match self.remaining {
            0 => Tick::Idle,
            1 => {
                self.remaining = 0;
                Tick::Completed
            }
            n => {
                self.remaining = n - 1;
                Tick::Running(self.remaining)
            }
        }
    }

    pub fn urgency(&self) -> Urgency {
        Urgency::from_remaining(self.remaining)
    }

    /// Remaining time as `mm:ss`.
    pub fn formatted(&self) -> String {
        format!("{:02}:{:02}", self.remaining / 60, self.remaining % 60)
    }
}

/// Decides whether the visitor may move on from a quiz step.
#[derive(Debug, Clone)]
pub struct StepGate {
    timer: QuizTimer,
    require_answer: bool,
    answer: String,
}

impl StepGate {
    pub fn new(duration: u32, require_answer: bool) -> Self {
        Self {
            timer: QuizTimer::new(duration),
            require_answer,
            answer: String::new(),
        }
    }

    pub fn timer(&self) -> &QuizTimer {
        &self.timer
    }

    pub fn tick(&mut self) -> Tick {
        self.timer.tick()
    }

    /// Replaces the current answer text, as on every input event.
    pub fn set_answer(&mut self, answer: impl Into<String>) {
        self.answer = answer.into();
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn can_advance(&self) -> bool {
        self.timer.is_expired() && (!self.require_answer || !self.answer.trim().is_empty())
    }
}

/// Handle to a countdown running on the tokio runtime.
///
/// Dropping the handle cancels the countdown.
#[derive(Debug)]
pub struct CountdownHandle {
    remaining: watch::Receiver<u32>,
    task: JoinHandle<()>,
}

impl CountdownHandle {
    pub fn remaining(&self) -> u32 {
        *self.remaining.borrow()
    }

    pub fn is_expired(&self) -> bool {
        self.remaining() == 0
    }

    /// Stops the countdown. `on_complete` will not fire afterwards.
    pub fn cancel(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits until the countdown completes or is cancelled.
    pub async fn finished(mut self) {
        let _ = (&mut self.task).await;
    }
}

impl Drop for CountdownHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Starts a one-second countdown.
///
/// `on_tick` receives the seconds left after each tick (including the final
/// zero), and `on_complete` fires once when the countdown reaches zero. A zero
/// duration completes immediately.
pub fn spawn_countdown<T, C>(duration: u32, mut on_tick: T, on_complete: C) -> CountdownHandle
where
    T: FnMut(u32) + Send + 'static,
    C: FnOnce() + Send + 'static,
{
    let (tx, rx) = watch::channel(duration);

    let task = tokio::spawn(async move {
        let mut timer = QuizTimer::new(duration);

        if !timer.is_expired() {
            let period = Duration::from_secs(1);
            let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);

            loop {
                interval.tick().await;
                let tick = timer.tick();
                let _ = tx.send(timer.remaining());
                on_tick(timer.remaining());
                if tick == Tick::Completed {
                    break;
                }
            }
        }

        tracing::debug!(duration, "quiz countdown expired");
        on_complete();
    });

    CountdownHandle { remaining: rx, task }
}
