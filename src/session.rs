use std::time::Instant;

use tracing::{debug, info, warn};

use crate::paragraph::SourceUnavailable;
use crate::scoring::{character_statuses, evaluate, CharacterStatus, TargetText};
use crate::timer::{TimerConfig, TimerHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running,
    Finished,
}

/// Progress of the paragraph request made by the last restart
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Unloaded,
    Loading,
    Ready,
    Failed(String),
}

/// Identifies the restart a paragraph load belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// Live numbers shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metrics {
    /// remaining seconds in countdown mode, elapsed seconds when counting up
    pub time_secs: u64,
    pub wpm: u32,
    pub accuracy: u32,
    pub errors: usize,
}

impl Metrics {
    pub fn initial(timer: TimerConfig) -> Self {
        Self {
            time_secs: timer.initial_time(),
            wpm: 0,
            accuracy: 100,
            errors: 0,
        }
    }
}

/// What an event did to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Update {
    Ignored,
    Changed(Metrics),
    Finished(Metrics),
}

/// One typing test: the paragraph, what has been typed, and the clock
#[derive(Debug)]
pub struct TestSession {
    timer_config: TimerConfig,
    state: SessionState,
    load: LoadState,
    generation: u64,
    target: TargetText,
    input: Vec<char>,
    timer: Option<TimerHandle>,
    elapsed_secs: u64,
}

impl TestSession {
    pub fn new(timer_config: TimerConfig) -> Self {
        Self {
            timer_config,
            state: SessionState::Idle,
            load: LoadState::Unloaded,
            generation: 0,
            target: TargetText::default(),
            input: Vec::new(),
            timer: None,
            elapsed_secs: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load
    }

    pub fn timer_config(&self) -> TimerConfig {
        self.timer_config
    }

    pub fn target(&self) -> &TargetText {
        &self.target
    }

    pub fn input(&self) -> &[char] {
        &self.input
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn timer_active(&self) -> bool {
        self.timer.is_some()
    }

    pub fn input_enabled(&self) -> bool {
        match self.state {
            SessionState::Idle => self.load == LoadState::Ready,
            SessionState::Running => true,
            SessionState::Finished => false,
        }
    }

    pub fn statuses(&self) -> Vec<CharacterStatus> {
        character_statuses(self.target.chars(), &self.input)
    }

    pub fn metrics(&self) -> Metrics {
        let eval = evaluate(&self.target, &self.input, self.elapsed_secs as f64);
        Metrics {
            time_secs: self.timer_config.time_value(self.elapsed_secs),
            wpm: eval.wpm,
            accuracy: eval.accuracy,
            errors: eval.errors,
        }
    }

    /// Final metrics once the run is over
    pub fn summary(&self) -> Option<Metrics> {
        (self.state == SessionState::Finished).then(|| self.metrics())
    }

    /// Back to Idle with a fresh paragraph requested. The caller fetches the
    /// paragraph and reports back with the returned ticket.
    pub fn restart(&mut self) -> LoadTicket {
        self.stop_timer();
        self.state = SessionState::Idle;
        self.input.clear();
        self.elapsed_secs = 0;
        self.target = TargetText::default();
        self.load = LoadState::Loading;
        self.generation += 1;
        info!(generation = self.generation, "paragraph requested");
        LoadTicket(self.generation)
    }

    /// Returns false when the result was discarded as stale
    pub fn on_paragraph_loaded(
        &mut self,
        ticket: LoadTicket,
        result: Result<TargetText, SourceUnavailable>,
    ) -> bool {
        if ticket.0 != self.generation
            || self.state != SessionState::Idle
            || self.load != LoadState::Loading
        {
            debug!(
                ticket = ticket.0,
                current = self.generation,
                "stale paragraph load dropped"
            );
            return false;
        }

        match result {
            Ok(text) => {
                info!(chars = text.len(), "paragraph loaded");
                self.target = text;
                self.load = LoadState::Ready;
            }
            Err(e) => {
                warn!(error = %e, "paragraph load failed");
                self.load = LoadState::Failed(e.to_string());
            }
        }
        true
    }

    /// Only honoured while Idle
    pub fn select_timer(&mut self, timer_config: TimerConfig) -> bool {
        if self.state != SessionState::Idle {
            debug!(
                requested = %timer_config,
                active = %self.timer_config,
                "duration change ignored mid-run"
            );
            return false;
        }
        self.timer_config = timer_config;
        true
    }

    /// Replace the typed text with `value`, as an input-change event would
    pub fn set_input(&mut self, value: &str) -> Update {
        self.set_input_at(value.chars().collect(), Instant::now())
    }

    pub fn type_char(&mut self, c: char) -> Update {
        let mut next = self.input.clone();
        next.push(c);
        self.set_input_at(next, Instant::now())
    }

    pub fn backspace(&mut self) -> Update {
        if self.input.is_empty() {
            return Update::Ignored;
        }
        let mut next = self.input.clone();
        next.pop();
        self.set_input_at(next, Instant::now())
    }

    fn set_input_at(&mut self, value: Vec<char>, now: Instant) -> Update {
        if !self.input_enabled() {
            return Update::Ignored;
        }
        // a keystroke landing after the deadline must not count
        if self.state == SessionState::Running {
            if let finished @ Update::Finished(_) = self.poll_timer(now) {
                return finished;
            }
        }
        if self.state == SessionState::Idle {
            if value.is_empty() {
                return Update::Ignored;
            }
            self.begin_run(now);
        }
        self.input = value;
        Update::Changed(self.metrics())
    }

    fn begin_run(&mut self, now: Instant) {
        info!(timer = %self.timer_config, "run started");
        self.state = SessionState::Running;
        self.elapsed_secs = 0;
        self.timer = Some(TimerHandle::start(now));
    }

    /// Advance the clock by one second
    pub fn on_tick(&mut self) -> Update {
        if self.state != SessionState::Running || self.timer.is_none() {
            return Update::Ignored;
        }
        self.elapsed_secs += 1;

        match self.timer_config.countdown_secs() {
            Some(limit) if self.elapsed_secs >= limit => self.finish(),
            _ => Update::Changed(self.metrics()),
        }
    }

    /// Apply every whole-second tick the timer owes as of `now`
    pub fn poll_timer(&mut self, now: Instant) -> Update {
        let due = match self.timer.as_mut() {
            Some(handle) => handle.due_ticks(now),
            None => return Update::Ignored,
        };

        let mut last = Update::Ignored;
        for _ in 0..due {
            last = self.on_tick();
            if matches!(last, Update::Finished(_)) {
                break;
            }
        }
        last
    }

    /// End a running test early. The only way a count-up run finishes.
    pub fn stop(&mut self) -> Update {
        if self.state != SessionState::Running {
            return Update::Ignored;
        }
        self.finish()
    }

    fn finish(&mut self) -> Update {
        self.stop_timer();
        self.state = SessionState::Finished;
        let metrics = self.metrics();
        info!(
            wpm = metrics.wpm,
            accuracy = metrics.accuracy,
            errors = metrics.errors,
            elapsed = self.elapsed_secs,
            "run finished"
        );
        Update::Finished(metrics)
    }

    fn stop_timer(&mut self) {
        self.timer = None;
    }
}
