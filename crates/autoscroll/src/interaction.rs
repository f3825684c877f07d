//! Detection of user-originated scrolling and the auto-resume timer.

use crate::timer::{DeferredTask, TaskTicket};
use std::time::Duration;

/// Discrete interaction events coming from the viewing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionEvent {
    Wheel,
    TouchStart,
    PointerDown,
    KeyDown,
}

/// Owns the single inactivity timer. Every interaction reschedules it, so
/// only the most recent interaction can trigger a resume.
#[derive(Debug, Clone)]
pub struct InteractionMonitor {
    resume_delay: Duration,
    timer: DeferredTask,
    last_event: Option<(InteractionEvent, Duration)>,
}

impl InteractionMonitor {
    pub fn new(resume_delay: Duration) -> Self {
        Self { resume_delay, timer: DeferredTask::new(), last_event: None }
    }

    /// Records an interaction and restarts the inactivity countdown.
    pub fn observe(&mut self, event: InteractionEvent, now: Duration) -> TaskTicket {
        self.last_event = Some((event, now));
        self.timer.schedule(now, self.resume_delay)
    }

    /// True once the inactivity delay has elapsed since the last interaction.
    /// Consumes the timer.
    pub fn inactivity_elapsed(&mut self, now: Duration) -> bool {
        self.timer.fire_if_due(now).is_some()
    }

    pub fn cancel(&mut self) -> bool {
        self.timer.cancel()
    }

    pub fn is_resume_pending(&self) -> bool {
        self.timer.is_pending()
    }

    pub fn resume_due_at(&self) -> Option<Duration> {
        self.timer.due_at()
    }

    pub fn pending_ticket(&self) -> Option<TaskTicket> {
        self.timer.pending_ticket()
    }

    pub fn last_event(&self) -> Option<(InteractionEvent, Duration)> {
        self.last_event
    }

    pub fn resume_delay(&self) -> Duration {
        self.resume_delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn elapses_after_resume_delay() {
        let mut monitor = InteractionMonitor::new(ms(3000));
        monitor.observe(InteractionEvent::Wheel, ms(1000));

        assert!(!monitor.inactivity_elapsed(ms(3999)));
        assert!(monitor.inactivity_elapsed(ms(4000)));
        assert!(!monitor.is_resume_pending());
    }

    #[test]
    fn later_interaction_debounces_earlier_one() {
        let mut monitor = InteractionMonitor::new(ms(3000));
        let first = monitor.observe(InteractionEvent::Wheel, ms(0));
        let second = monitor.observe(InteractionEvent::PointerDown, ms(2500));

        assert_ne!(first, second);
        assert_eq!(monitor.pending_ticket(), Some(second));
        assert!(!monitor.inactivity_elapsed(ms(3000)));
        assert_eq!(monitor.resume_due_at(), Some(ms(5500)));
        assert!(monitor.inactivity_elapsed(ms(5500)));
        assert_eq!(monitor.last_event(), Some((InteractionEvent::PointerDown, ms(2500))));
    }

    #[test]
    fn cancel_prevents_resume() {
        let mut monitor = InteractionMonitor::new(ms(3000));
        monitor.observe(InteractionEvent::TouchStart, ms(0));

        assert!(monitor.cancel());
        assert!(!monitor.inactivity_elapsed(ms(10_000)));
    }
}
