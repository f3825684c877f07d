//! Single-slot deferred task
//!
//! A deferred callback that can be pending at most once. Scheduling a new
//! task implicitly cancels the outstanding one, which gives debounce
//! semantics: only the most recently scheduled task can ever fire.
//!
//! The slot does not own a thread or a callback. The event loop polls it
//! with the current time and runs whatever action the owner associates with
//! the returned ticket.

use std::time::Duration;

/// Identifies one scheduling of a [`DeferredTask`].
///
/// Tickets increase monotonically per slot, so a stale ticket never compares
/// equal to the one that is currently pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskTicket(u64);

impl TaskTicket {
    pub fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pending {
    ticket: TaskTicket,
    due_at: Duration,
}

/// A cancellable, replaceable deferred task.
///
/// # Example
///
/// ```
/// use autoscroll_core::DeferredTask;
/// use std::time::Duration;
///
/// let mut task = DeferredTask::new();
/// let first = task.schedule(Duration::ZERO, Duration::from_millis(3000));
/// let second = task.schedule(Duration::from_millis(1000), Duration::from_millis(3000));
///
/// // The first schedule was replaced and can no longer fire.
/// assert_ne!(first, second);
/// assert_eq!(task.fire_if_due(Duration::from_millis(3000)), None);
/// assert_eq!(task.fire_if_due(Duration::from_millis(4000)), Some(second));
/// ```
#[derive(Debug, Clone, Default)]
pub struct DeferredTask {
    pending: Option<Pending>,
    issued: u64,
}

impl DeferredTask {
    /// Create an empty slot
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule the task to fire `delay` after `now`
    ///
    /// Any pending task is cancelled first. Returns the ticket of the new
    /// task.
    pub fn schedule(&mut self, now: Duration, delay: Duration) -> TaskTicket {
        self.issued += 1;
        let ticket = TaskTicket(self.issued);
        self.pending = Some(Pending { ticket, due_at: now.saturating_add(delay) });
        ticket
    }

    /// Cancel the pending task
    ///
    /// Returns `true` if a task was pending. Idempotent.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// Fire the pending task if its deadline has passed
    ///
    /// A fired task is removed from the slot, so each ticket fires at most
    /// once.
    pub fn fire_if_due(&mut self, now: Duration) -> Option<TaskTicket> {
        match self.pending {
            Some(pending) if pending.due_at <= now => {
                self.pending = None;
                Some(pending.ticket)
            }
            _ => None,
        }
    }

    /// Check whether a task is waiting to fire
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Deadline of the pending task, if any
    pub fn due_at(&self) -> Option<Duration> {
        self.pending.map(|pending| pending.due_at)
    }

    /// Ticket of the pending task, if any
    pub fn pending_ticket(&self) -> Option<TaskTicket> {
        self.pending.map(|pending| pending.ticket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_fires_once_after_deadline() {
        let mut task = DeferredTask::new();
        let ticket = task.schedule(ms(0), ms(3000));

        assert_eq!(task.fire_if_due(ms(2999)), None);
        assert_eq!(task.fire_if_due(ms(3000)), Some(ticket));
        assert_eq!(task.fire_if_due(ms(9000)), None);
        assert!(!task.is_pending());
    }

    #[test]
    fn test_reschedule_replaces_pending() {
        let mut task = DeferredTask::new();
        let first = task.schedule(ms(0), ms(3000));
        let second = task.schedule(ms(2000), ms(3000));

        assert!(second > first);
        assert_eq!(task.pending_ticket(), Some(second));
        assert_eq!(task.due_at(), Some(ms(5000)));
        assert_eq!(task.fire_if_due(ms(3000)), None);
        assert_eq!(task.fire_if_due(ms(5000)), Some(second));
    }

    #[test]
    fn test_cancel_idempotent() {
        let mut task = DeferredTask::new();
        task.schedule(ms(0), ms(10));

        assert!(task.cancel());
        assert!(!task.cancel());
        assert_eq!(task.fire_if_due(ms(100)), None);
    }

    #[test]
    fn test_default_is_empty() {
        let task = DeferredTask::default();
        assert!(!task.is_pending());
        assert_eq!(task.due_at(), None);
    }
}
