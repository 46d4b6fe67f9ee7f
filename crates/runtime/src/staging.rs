/// Whether the host's renderer needs two-phase marker commits.
///
/// Some platform renderers cannot cleanly replace an overlay set within one
/// frame; for those, phase 1 clears the volatile layers synchronously and
/// phase 2 installs the new data on the next frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StagingMode {
    /// Apply commits synchronously with the triggering event.
    Immediate,
    /// Clear volatile layers now, install staged data on the next frame.
    Deferred,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(pub u64);

/// Single-slot staging area for deferred commits.
///
/// Staging returns a monotonically increasing ticket. A phase-2 callback
/// redeems its ticket with [`CommitGate::take_if_current`]; if a newer commit
/// was staged in between, the stale ticket yields nothing and the newer
/// payload stays pending. The slot holds only the latest payload, so a
/// superseded commit is dropped at staging time rather than applied late.
#[derive(Debug)]
pub struct CommitGate<T> {
    next: u64,
    pending: Option<(Ticket, T)>,
}

impl<T> Default for CommitGate<T> {
    fn default() -> Self {
        Self {
            next: 0,
            pending: None,
        }
    }
}

impl<T> CommitGate<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&mut self, payload: T) -> Ticket {
        let ticket = Ticket(self.next);
        self.next += 1;
        self.pending = Some((ticket, payload));
        ticket
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn latest(&self) -> Option<Ticket> {
        self.pending.as_ref().map(|(t, _)| *t)
    }

    /// Redeem `ticket` if it is still the most recent staged commit.
    pub fn take_if_current(&mut self, ticket: Ticket) -> Option<T> {
        match &self.pending {
            Some((current, _)) if *current == ticket => self.pending.take().map(|(_, p)| p),
            _ => None,
        }
    }

    /// Take whatever is pending, regardless of ticket.
    pub fn take_current(&mut self) -> Option<T> {
        self.pending.take().map(|(_, p)| p)
    }
}

#[cfg(test)]
mod tests {
    use super::CommitGate;

    #[test]
    fn stale_ticket_is_dropped_silently() {
        let mut gate: CommitGate<&str> = CommitGate::new();
        let first = gate.stage("old");
        let second = gate.stage("new");

        assert_eq!(gate.take_if_current(first), None);
        assert!(gate.is_pending());
        assert_eq!(gate.take_if_current(second), Some("new"));
        assert!(!gate.is_pending());
    }

    #[test]
    fn take_current_returns_latest_payload() {
        let mut gate: CommitGate<u32> = CommitGate::new();
        gate.stage(1);
        gate.stage(2);
        assert_eq!(gate.take_current(), Some(2));
        assert_eq!(gate.take_current(), None);
    }

    #[test]
    fn tickets_increase_monotonically() {
        let mut gate: CommitGate<()> = CommitGate::new();
        let a = gate.stage(());
        let b = gate.stage(());
        assert!(b > a);
    }
}
