//! Deterministic frame loop.
//!
//! Stands in for the display-refresh scheduler. Each step runs, in order:
//!
//! 1. delivery of every queued input whose time has come,
//! 2. due deferred tasks (auto-resume, status settle),
//! 3. one animation frame, only while the session is playing,
//! 4. advancement of the virtual clock by one frame interval.
//!
//! Inputs are therefore never interleaved with the computation of a frame.
//! The loop stops requesting frames by itself as soon as the session leaves
//! the playing state.

use crate::command::Command;
use crate::interaction::InteractionEvent;
use crate::session::{FrameOutcome, SessionEvent, ViewingSession};
use std::collections::VecDeque;
use std::time::Duration;
use tracing::trace;

/// One 60 Hz refresh.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_micros(16_667);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Input {
    Command(Command),
    Interaction(InteractionEvent),
    /// User scroll by a pixel delta, e.g. the wheel movement that accompanies
    /// an [`InteractionEvent::Wheel`].
    ManualScroll(f64),
    Resize(f64),
}

#[derive(Debug)]
pub struct FrameLoop {
    session: ViewingSession,
    now: Duration,
    frame_interval: Duration,
    inputs: VecDeque<(Duration, Input)>,
    timeline: Vec<(Duration, SessionEvent)>,
    frames_run: u64,
}

impl FrameLoop {
    pub fn new(session: ViewingSession) -> Self {
        Self {
            session,
            now: Duration::ZERO,
            frame_interval: DEFAULT_FRAME_INTERVAL,
            inputs: VecDeque::new(),
            timeline: Vec::new(),
            frames_run: 0,
        }
    }

    pub fn with_frame_interval(mut self, frame_interval: Duration) -> Self {
        self.frame_interval = frame_interval.max(Duration::from_micros(1));
        self
    }

    /// Queues an input for delivery at `at`. Inputs with equal times keep
    /// their submission order.
    pub fn schedule(&mut self, at: Duration, input: Input) {
        let index = self.inputs.partition_point(|(time, _)| *time <= at);
        self.inputs.insert(index, (at, input));
    }

    pub fn push(&mut self, input: Input) {
        self.schedule(self.now, input);
    }

    pub fn step(&mut self) -> FrameOutcome {
        self.deliver_due_inputs();
        self.session.advance_timers(self.now);

        let outcome = if self.session.wants_frame() {
            self.frames_run += 1;
            self.session.frame(self.now)
        } else {
            FrameOutcome::Idle
        };

        self.record_events();
        self.now += self.frame_interval;
        outcome
    }

    pub fn run_for(&mut self, duration: Duration) {
        let end = self.now.saturating_add(duration);
        while self.now < end {
            self.step();
        }
    }

    /// Steps until `done` holds or `limit` of virtual time has passed.
    /// Returns whether the condition was met.
    pub fn run_until<F>(&mut self, limit: Duration, mut done: F) -> bool
    where
        F: FnMut(&ViewingSession) -> bool,
    {
        let end = self.now.saturating_add(limit);
        while self.now < end {
            self.step();
            if done(&self.session) {
                return true;
            }
        }
        false
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn frames_run(&self) -> u64 {
        self.frames_run
    }

    pub fn pending_inputs(&self) -> usize {
        self.inputs.len()
    }

    pub fn session(&self) -> &ViewingSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut ViewingSession {
        &mut self.session
    }

    /// Session events with the virtual time of the step that produced them.
    pub fn timeline(&self) -> &[(Duration, SessionEvent)] {
        &self.timeline
    }

    fn deliver_due_inputs(&mut self) {
        while let Some((at, input)) = self.inputs.front().copied() {
            if at > self.now {
                break;
            }
            self.inputs.pop_front();
            trace!(?input, at_ms = at.as_millis() as u64, "delivering input");

            match input {
                Input::Command(command) => self.session.apply(command),
                Input::Interaction(event) => self.session.handle_interaction(event, self.now),
                Input::ManualScroll(delta_px) => {
                    self.session.manual_scroll_by(delta_px);
                }
                Input::Resize(visible_height_px) => self.session.resize_viewport(visible_height_px),
            }
        }
    }

    fn record_events(&mut self) {
        let now = self.now;
        self.timeline.extend(self.session.drain_events().into_iter().map(|event| (now, event)));
    }
}
