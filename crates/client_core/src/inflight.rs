use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TICKET: AtomicU64 = AtomicU64::new(1);

/// Identifies one outstanding request so that late outcomes for discarded or
/// superseded controllers can be recognised and dropped.
///
/// Tickets are unique for the life of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestTicket(u64);

impl RequestTicket {
    fn issue() -> Self {
        Self(NEXT_TICKET.fetch_add(1, Ordering::Relaxed))
    }

    pub fn id(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
pub(crate) struct InFlight {
    pending: Option<RequestTicket>,
}

impl InFlight {
    /// Returns `None` while a request is still outstanding.
    pub(crate) fn begin(&mut self) -> Option<RequestTicket> {
        if self.pending.is_some() {
            return None;
        }
        let ticket = RequestTicket::issue();
        self.pending = Some(ticket);
        Some(ticket)
    }

    pub(crate) fn settle(&mut self, ticket: RequestTicket) -> bool {
        if self.pending == Some(ticket) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
