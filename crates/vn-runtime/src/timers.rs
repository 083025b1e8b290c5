use std::time::Duration;

use vn_core::LayerSlot;

use crate::media::Ticket;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Clears the outgoing layer once the crossfade has settled.
    ClearLayer(LayerSlot),
    /// Reveals the content panel for scenes without an effect.
    Reveal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTimer {
    pub deadline: Duration,
    pub ticket: Ticket,
    pub kind: TimerKind,
    seq: u64,
}

/// Deadline-ordered timers on the host's clock. Nothing here sleeps; the
/// host reports elapsed time and collects what is due.
#[derive(Debug, Default)]
pub struct TimerQueue {
    pending: Vec<PendingTimer>,
    next_seq: u64,
}

impl TimerQueue {
    pub fn schedule(&mut self, deadline: Duration, ticket: Ticket, kind: TimerKind) {
        let timer = PendingTimer {
            deadline,
            ticket,
            kind,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.pending.push(timer);
    }

    /// Removes and returns every timer due at `now`, earliest first; equal
    /// deadlines keep scheduling order.
    pub fn take_due(&mut self, now: Duration) -> Vec<PendingTimer> {
        let (mut due, pending): (Vec<_>, Vec<_>) = self
            .pending
            .drain(..)
            .partition(|timer| timer.deadline <= now);
        self.pending = pending;
        due.sort_by_key(|timer| (timer.deadline, timer.seq));
        due
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.iter().map(|timer| timer.deadline).min()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod timers_tests {
    use super::*;

    fn ticket(generation: u64) -> Ticket {
        Ticket { generation }
    }

    #[test]
    fn take_due_returns_only_expired_timers_in_order() {
        let mut queue = TimerQueue::default();
        queue.schedule(Duration::from_millis(500), ticket(1), TimerKind::Reveal);
        queue.schedule(
            Duration::from_millis(100),
            ticket(1),
            TimerKind::ClearLayer(LayerSlot::Primary),
        );
        queue.schedule(Duration::from_millis(100), ticket(2), TimerKind::Reveal);
        queue.schedule(Duration::from_millis(900), ticket(2), TimerKind::Reveal);

        let due = queue.take_due(Duration::from_millis(500));
        let kinds = due
            .iter()
            .map(|timer| (timer.ticket.generation, timer.kind))
            .collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![
                (1, TimerKind::ClearLayer(LayerSlot::Primary)),
                (2, TimerKind::Reveal),
                (1, TimerKind::Reveal),
            ]
        );
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.next_deadline(), Some(Duration::from_millis(900)));
    }

    #[test]
    fn empty_queue_has_no_deadline() {
        let mut queue = TimerQueue::default();
        assert!(queue.take_due(Duration::from_secs(10)).is_empty());
        assert!(queue.is_empty());
        assert_eq!(queue.next_deadline(), None);
    }
}
