// ── Request sequencing ──
//
// Guards a view against out-of-order responses: only the response to the
// most recently issued request is allowed to land.

use std::sync::atomic::{AtomicU64, Ordering};

/// Proof that a request was issued, carrying its position in issue order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn seq(self) -> u64 {
        self.0
    }
}

/// Issues monotonically increasing tickets for one consumer (one list
/// view, typically). A response is current only if no later ticket has
/// been issued since its request went out.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, superseding every earlier one.
    pub fn issue(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::Acquire) == ticket.0
    }
}
