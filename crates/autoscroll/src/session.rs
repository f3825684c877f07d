//! The viewing session and its autoscroll state machine.
//!
//! A [`ViewingSession`] owns everything the autoscroll feature mutates: the
//! scroll container, speed setting, frame clock, fractional carry and both
//! deferred tasks. It is driven from a single loop through three entry
//! points:
//!
//! - commands ([`start`](ViewingSession::start), [`stop`](ViewingSession::stop),
//!   [`apply`](ViewingSession::apply)) and interaction events
//!   ([`handle_interaction`](ViewingSession::handle_interaction)), processed
//!   between frames;
//! - [`advance_timers`](ViewingSession::advance_timers), which fires the
//!   auto-resume and status-settle tasks once they are due;
//! - [`frame`](ViewingSession::frame), called once per display refresh while
//!   [`wants_frame`](ViewingSession::wants_frame) is true.
//!
//! Every transition updates the status label and the play/pause control and
//! records a [`SessionEvent`] for the UI layer to drain.

use crate::accumulator::ScrollAccumulator;
use crate::clock::FrameClock;
use crate::command::Command;
use crate::config::{AutoscrollConfig, ConfigError};
use crate::document::{Document, Viewport};
use crate::interaction::{InteractionEvent, InteractionMonitor};
use crate::speed::{speed_to_rate, DeviceClass, SpeedSetting};
use crate::status::Status;
use crate::timer::DeferredTask;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaybackState {
    Stopped,
    Playing,
    ManuallyPaused,
    Finished,
}

/// Snapshot of the scroll-related state.
///
/// Derived from a single [`PlaybackState`], so `is_auto_scrolling` and
/// `is_paused_by_manual_scroll` can never both be true.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollState {
    pub is_auto_scrolling: bool,
    pub is_paused_by_manual_scroll: bool,
    pub current_position_px: f64,
    pub accumulated_fraction_px: f64,
}

/// Side effects for the collaborating UI layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionEvent {
    Status(Status),
    PlayControl(bool),
    SpeedChanged(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    AlreadyPlaying,
    NotScrollable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Still playing; request another frame.
    Continue,
    /// Reached the end during this frame.
    Finished,
    /// Not playing; nothing was computed.
    Idle,
}

#[derive(Debug, Clone)]
pub struct ViewingSession {
    config: AutoscrollConfig,
    device: DeviceClass,
    speed: SpeedSetting,
    state: PlaybackState,
    document: Option<Document>,
    viewport: Viewport,
    clock: FrameClock,
    accumulator: ScrollAccumulator,
    monitor: InteractionMonitor,
    status_settle: DeferredTask,
    status: Status,
    play_control_pressed: bool,
    events: Vec<SessionEvent>,
}

impl ViewingSession {
    /// Creates an empty session. The config is trusted as is; use
    /// [`try_new`](Self::try_new) for configs from outside the program.
    pub fn new(config: AutoscrollConfig, device: DeviceClass) -> Self {
        Self {
            speed: SpeedSetting::from_config(&config),
            clock: FrameClock::new(config.smoothing_alpha, config.initial_delta_secs),
            monitor: InteractionMonitor::new(config.resume_delay()),
            device,
            state: PlaybackState::Stopped,
            document: None,
            viewport: Viewport::new(0.0, 0.0),
            accumulator: ScrollAccumulator::new(),
            status_settle: DeferredTask::new(),
            status: Status::Ready,
            play_control_pressed: false,
            events: Vec::new(),
            config,
        }
    }

    pub fn try_new(config: AutoscrollConfig, device: DeviceClass) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config, device))
    }

    /// Replaces the current document and resets all scroll state.
    pub fn open_document(&mut self, document: Document, visible_height_px: f64) {
        self.viewport = Viewport::new(document.content_height_px(), visible_height_px);
        self.state = PlaybackState::Stopped;
        self.clock.reset();
        self.accumulator.reset();
        self.monitor.cancel();
        self.status_settle.cancel();

        info!(
            pages = document.page_count(),
            content_height_px = self.viewport.content_height_px(),
            visible_height_px = self.viewport.visible_height_px(),
            scrollable = self.viewport.is_scrollable(),
            "document opened"
        );
        if !self.viewport.is_scrollable() {
            warn!(
                content_height_px = self.viewport.content_height_px(),
                visible_height_px = self.viewport.visible_height_px(),
                "document content fits the viewport and cannot scroll"
            );
        }

        self.document = Some(document);
        self.set_status(Status::Ready);
        self.set_play_control(false);
    }

    /// Explicit start. Rewinds first when already at the end.
    pub fn start(&mut self) -> StartOutcome {
        if !self.viewport.is_scrollable() {
            warn!(
                max_scroll_px = self.viewport.max_scroll_px(),
                "cannot start autoscroll: content is not scrollable"
            );
            self.set_status(Status::NotScrollable);
            return StartOutcome::NotScrollable;
        }

        if self.viewport.is_at_end(self.config.end_tolerance_px) {
            debug!("at end of document; rewinding before start");
            self.viewport.scroll_to(0.0);
        }

        if self.state == PlaybackState::Playing {
            return StartOutcome::AlreadyPlaying;
        }

        self.transition(PlaybackState::Playing);
        self.clock.reset();
        self.accumulator.reset();
        self.monitor.cancel();
        self.status_settle.cancel();
        self.set_status(Status::Playing);
        self.set_play_control(true);

        StartOutcome::Started
    }

    /// Explicit stop. Idempotent; does nothing once stopped or finished.
    pub fn stop(&mut self) {
        self.monitor.cancel();
        self.status_settle.cancel();

        if !matches!(self.state, PlaybackState::Playing | PlaybackState::ManuallyPaused) {
            return;
        }

        self.transition(PlaybackState::Stopped);
        self.set_status(Status::Paused);
        self.set_play_control(false);
    }

    pub fn toggle_play_pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.stop();
        } else {
            self.start();
        }
    }

    pub fn apply(&mut self, command: Command) {
        match command {
            Command::TogglePlayPause => self.toggle_play_pause(),
            Command::Start => {
                self.start();
            }
            Command::Stop => self.stop(),
            Command::AdjustSpeed(delta) => {
                self.adjust_speed(delta);
            }
            Command::SetSpeed(value) => {
                self.set_speed(value);
            }
        }
    }

    pub fn adjust_speed(&mut self, delta: f64) -> f64 {
        let value = self.speed.adjust(delta);
        debug!(speed = value, "speed adjusted");
        self.events.push(SessionEvent::SpeedChanged(value));
        value
    }

    pub fn set_speed(&mut self, value: f64) -> f64 {
        let value = self.speed.set(value);
        debug!(speed = value, "speed set");
        self.events.push(SessionEvent::SpeedChanged(value));
        value
    }

    /// A user-originated interaction on the viewing surface. Pauses
    /// autoscroll when playing and restarts the inactivity countdown in any
    /// state.
    pub fn handle_interaction(&mut self, event: InteractionEvent, now: Duration) {
        if self.state == PlaybackState::Playing {
            self.transition(PlaybackState::ManuallyPaused);
            self.status_settle.cancel();
            self.set_status(Status::PausedManualScroll);
            self.set_play_control(false);
        }

        let ticket = self.monitor.observe(event, now);
        debug!(?event, ticket = ticket.raw(), "inactivity timer rescheduled");
    }

    /// Moves the scroll position on behalf of the user.
    pub fn manual_scroll_by(&mut self, delta_px: f64) -> f64 {
        self.viewport.scroll_by(delta_px)
    }

    pub fn resize_viewport(&mut self, visible_height_px: f64) {
        self.viewport.resize(visible_height_px);
    }

    /// Fires deferred tasks whose deadline has passed.
    pub fn advance_timers(&mut self, now: Duration) {
        if self.monitor.inactivity_elapsed(now) {
            if self.state == PlaybackState::ManuallyPaused {
                self.auto_resume(now);
            } else {
                debug!(state = ?self.state, "inactivity timer fired outside manual pause; ignored");
            }
        }

        if self.status_settle.fire_if_due(now).is_some()
            && self.state == PlaybackState::Playing
            && self.status == Status::AutoResumed
        {
            self.set_status(Status::Playing);
        }
    }

    /// One display frame: integrate time into movement and detect the end.
    pub fn frame(&mut self, now: Duration) -> FrameOutcome {
        if self.state != PlaybackState::Playing {
            return FrameOutcome::Idle;
        }

        let delta_secs = self.clock.tick(now);
        let step_px = self.accumulator.advance(self.rate_px_per_sec(), delta_secs);
        if step_px > 0 {
            self.viewport.scroll_by(f64::from(step_px));
        }

        if self.viewport.is_at_end(self.config.end_tolerance_px) {
            self.finish();
            return FrameOutcome::Finished;
        }

        FrameOutcome::Continue
    }

    pub fn wants_frame(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Earliest pending deadline, for loops that sleep between frames.
    pub fn next_deadline(&self) -> Option<Duration> {
        match (self.monitor.resume_due_at(), self.status_settle.due_at()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn rate_px_per_sec(&self) -> f64 {
        speed_to_rate(self.speed.value(), self.device.base_rate(&self.config))
    }

    pub fn scroll_state(&self) -> ScrollState {
        ScrollState {
            is_auto_scrolling: self.state == PlaybackState::Playing,
            is_paused_by_manual_scroll: self.state == PlaybackState::ManuallyPaused,
            current_position_px: self.viewport.position_px(),
            accumulated_fraction_px: self.accumulator.carry_px(),
        }
    }

    pub fn current_page(&self) -> Option<usize> {
        self.document.as_ref().map(|document| document.current_page(&self.viewport))
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_play_control_pressed(&self) -> bool {
        self.play_control_pressed
    }

    pub fn position_px(&self) -> f64 {
        self.viewport.position_px()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn speed(&self) -> &SpeedSetting {
        &self.speed
    }

    pub fn device_class(&self) -> DeviceClass {
        self.device
    }

    pub fn config(&self) -> &AutoscrollConfig {
        &self.config
    }

    pub fn interaction_monitor(&self) -> &InteractionMonitor {
        &self.monitor
    }

    fn auto_resume(&mut self, now: Duration) {
        self.transition(PlaybackState::Playing);
        // Keep the carry; only an explicit start discards fractional progress.
        self.clock.reset();
        self.set_status(Status::AutoResumed);
        self.set_play_control(true);
        self.status_settle.schedule(now, self.config.status_settle_delay());
    }

    fn finish(&mut self) {
        self.transition(PlaybackState::Finished);
        self.monitor.cancel();
        self.status_settle.cancel();
        self.set_status(Status::Finished);
        self.set_play_control(false);
    }

    fn transition(&mut self, next: PlaybackState) {
        debug!(
            from = ?self.state,
            to = ?next,
            position_px = self.viewport.position_px(),
            "autoscroll transition"
        );
        self.state = next;
    }

    fn set_status(&mut self, status: Status) {
        self.status = status;
        self.events.push(SessionEvent::Status(status));
    }

    fn set_play_control(&mut self, pressed: bool) {
        self.play_control_pressed = pressed;
        self.events.push(SessionEvent::PlayControl(pressed));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::PageSurface;
    use proptest::prelude::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    /// 1500 px of content in a 500 px viewport: 1000 px scrollable.
    fn session_with_extent() -> ViewingSession {
        let mut session = ViewingSession::new(AutoscrollConfig::default(), DeviceClass::Regular);
        session.open_document(Document::new(vec![PageSurface::new(800.0, 1500.0)], 0.0), 500.0);
        session.drain_events();
        session
    }

    fn run_frames(
        session: &mut ViewingSession,
        from: Duration,
        frames: u32,
        step: Duration,
    ) -> Duration {
        let mut now = from;
        for _ in 0..frames {
            session.frame(now);
            now += step;
        }
        now
    }

    #[test]
    fn start_rejects_unscrollable_content() {
        let mut session = ViewingSession::new(AutoscrollConfig::default(), DeviceClass::Regular);
        session.open_document(Document::new(vec![PageSurface::new(800.0, 300.0)], 20.0), 500.0);

        assert_eq!(session.start(), StartOutcome::NotScrollable);
        assert_eq!(session.state(), PlaybackState::Stopped);
        assert_eq!(session.status().label(), "PDF is not scrollable");
        assert!(!session.wants_frame());
    }

    #[test]
    fn start_without_document_is_not_scrollable() {
        let mut session = ViewingSession::new(AutoscrollConfig::default(), DeviceClass::Compact);
        assert_eq!(session.start(), StartOutcome::NotScrollable);
    }

    #[test]
    fn start_emits_status_and_control_events() {
        let mut session = session_with_extent();

        assert_eq!(session.start(), StartOutcome::Started);
        assert_eq!(
            session.drain_events(),
            vec![SessionEvent::Status(Status::Playing), SessionEvent::PlayControl(true)]
        );
        assert_eq!(session.start(), StartOutcome::AlreadyPlaying);
    }

    #[test]
    fn start_at_end_rewinds_to_top() {
        let mut session = session_with_extent();
        session.manual_scroll_by(5_000.0);
        assert_eq!(session.position_px(), 1000.0);

        assert_eq!(session.start(), StartOutcome::Started);
        assert_eq!(session.position_px(), 0.0);
        assert_eq!(session.state(), PlaybackState::Playing);
    }

    #[test]
    fn first_frame_after_start_does_not_move() {
        let mut session = session_with_extent();
        session.start();

        assert_eq!(session.frame(ms(60_000)), FrameOutcome::Continue);
        assert_eq!(session.position_px(), 0.0);
    }

    #[test]
    fn reaching_end_finishes_and_clears_timers() {
        let mut session = session_with_extent();
        session.manual_scroll_by(990.0);
        session.start();
        session.handle_interaction(InteractionEvent::KeyDown, ms(0));
        session.advance_timers(ms(3000));
        assert_eq!(session.state(), PlaybackState::Playing);

        run_frames(&mut session, ms(3000), 120, ms(16));

        assert_eq!(session.state(), PlaybackState::Finished);
        assert_eq!(session.status(), Status::Finished);
        assert!(session.position_px() >= 999.0);
        assert!(!session.is_play_control_pressed());
        assert_eq!(session.next_deadline(), None);
        assert_eq!(session.frame(ms(10_000)), FrameOutcome::Idle);
    }

    #[test]
    fn interaction_pauses_and_inactivity_resumes() {
        let mut session = session_with_extent();
        session.start();
        run_frames(&mut session, ms(0), 30, ms(16));
        session.drain_events();

        session.handle_interaction(InteractionEvent::Wheel, ms(500));
        assert_eq!(session.state(), PlaybackState::ManuallyPaused);
        assert_eq!(session.status().label(), "Paused — manual scroll");
        assert!(session.interaction_monitor().is_resume_pending());

        let paused_at = session.position_px();
        assert_eq!(session.frame(ms(600)), FrameOutcome::Idle);
        assert_eq!(session.position_px(), paused_at);

        session.advance_timers(ms(3499));
        assert_eq!(session.state(), PlaybackState::ManuallyPaused);

        session.advance_timers(ms(3500));
        assert_eq!(session.state(), PlaybackState::Playing);
        assert_eq!(session.status(), Status::AutoResumed);

        session.advance_timers(ms(4200));
        assert_eq!(session.status(), Status::Playing);

        let statuses: Vec<Status> = session
            .drain_events()
            .into_iter()
            .filter_map(|event| match event {
                SessionEvent::Status(status) => Some(status),
                _ => None,
            })
            .collect();
        assert_eq!(
            statuses,
            vec![Status::PausedManualScroll, Status::AutoResumed, Status::Playing]
        );
    }

    #[test]
    fn auto_resume_keeps_fractional_carry() {
        let mut session = session_with_extent();
        session.set_speed(0.1);
        session.start();
        run_frames(&mut session, ms(0), 10, ms(16));
        let carry = session.scroll_state().accumulated_fraction_px;
        assert!(carry > 0.0);

        session.handle_interaction(InteractionEvent::TouchStart, ms(200));
        session.advance_timers(ms(3200));

        assert_eq!(session.state(), PlaybackState::Playing);
        assert_eq!(session.scroll_state().accumulated_fraction_px, carry);
    }

    #[test]
    fn explicit_stop_cancels_pending_resume() {
        let mut session = session_with_extent();
        session.start();
        session.handle_interaction(InteractionEvent::PointerDown, ms(0));

        session.stop();
        assert_eq!(session.state(), PlaybackState::Stopped);
        assert_eq!(session.status(), Status::Paused);

        session.advance_timers(ms(10_000));
        assert_eq!(session.state(), PlaybackState::Stopped);

        session.drain_events();
        session.stop();
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn interaction_while_stopped_never_starts_playback() {
        let mut session = session_with_extent();

        session.handle_interaction(InteractionEvent::Wheel, ms(0));
        assert_eq!(session.state(), PlaybackState::Stopped);
        assert!(session.interaction_monitor().is_resume_pending());

        session.advance_timers(ms(3000));
        assert_eq!(session.state(), PlaybackState::Stopped);
    }

    #[test]
    fn settle_is_skipped_when_stopped_before_it_fires() {
        let mut session = session_with_extent();
        session.start();
        session.handle_interaction(InteractionEvent::Wheel, ms(0));
        session.advance_timers(ms(3000));
        session.stop();

        session.advance_timers(ms(3700));
        assert_eq!(session.status(), Status::Paused);
    }

    #[test]
    fn toggle_from_manual_pause_starts_again() {
        let mut session = session_with_extent();
        session.start();
        session.handle_interaction(InteractionEvent::Wheel, ms(0));

        session.apply(Command::TogglePlayPause);

        assert_eq!(session.state(), PlaybackState::Playing);
        assert_eq!(session.status(), Status::Playing);
        assert!(!session.interaction_monitor().is_resume_pending());
    }

    #[test]
    fn opening_a_document_resets_everything() {
        let mut session = session_with_extent();
        session.start();
        run_frames(&mut session, ms(0), 200, ms(16));
        session.handle_interaction(InteractionEvent::Wheel, ms(3200));

        let replacement = Document::new(vec![PageSurface::new(800.0, 2000.0); 2], 20.0);
        session.open_document(replacement, 700.0);

        let state = session.scroll_state();
        assert_eq!(session.state(), PlaybackState::Stopped);
        assert_eq!(state.current_position_px, 0.0);
        assert_eq!(state.accumulated_fraction_px, 0.0);
        assert!(!state.is_auto_scrolling && !state.is_paused_by_manual_scroll);
        assert_eq!(session.status(), Status::Ready);
        assert_eq!(session.next_deadline(), None);
        assert_eq!(session.current_page(), Some(0));
    }

    #[test]
    fn speed_commands_clamp_and_report() {
        let mut session = session_with_extent();

        session.apply(Command::SetSpeed(0.0));
        session.apply(Command::AdjustSpeed(-0.1));
        assert_eq!(session.speed().display(), "0.1");

        session.apply(Command::AdjustSpeed(0.1));
        assert_eq!(session.speed().display(), "0.2");
        assert!((session.rate_px_per_sec() - 4.0).abs() < 1e-9);
        assert_eq!(session.drain_events().len(), 3);
    }

    #[test]
    fn try_new_rejects_invalid_config() {
        let config = AutoscrollConfig { smoothing_alpha: 0.0, ..Default::default() };
        assert!(ViewingSession::try_new(config, DeviceClass::Regular).is_err());
    }

    proptest! {
        #[test]
        fn flags_stay_exclusive_and_position_in_range(
            ops in prop::collection::vec((0u8..6, -400.0f64..400.0), 1..64),
        ) {
            let mut session = session_with_extent();
            let mut now = Duration::ZERO;

            for (op, amount) in ops {
                match op {
                    0 => {
                        session.start();
                    }
                    1 => session.stop(),
                    2 => session.toggle_play_pause(),
                    3 => session.handle_interaction(InteractionEvent::Wheel, now),
                    4 => {
                        session.manual_scroll_by(amount);
                    }
                    _ => {
                        let frames = (amount.abs() / 16.0) as u32;
                        for _ in 0..frames {
                            now += ms(16);
                            session.advance_timers(now);
                            session.frame(now);
                        }
                    }
                }

                let state = session.scroll_state();
                prop_assert!(!(state.is_auto_scrolling && state.is_paused_by_manual_scroll));
                prop_assert!(state.current_position_px >= 0.0);
                prop_assert!(state.current_position_px <= session.viewport().max_scroll_px());
            }
        }
    }
}
