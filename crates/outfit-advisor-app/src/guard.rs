//! In-flight request bookkeeping.
//!
//! One request may be in flight per [`Lane`]. Re-issuing the same request
//! (same fingerprint) is a duplicate click; a different request on a busy
//! lane is rejected. Advancing the generation forgets every in-flight
//! request, so their responses are recognized as stale.

use std::collections::BTreeMap;

/// Independent request lanes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Lane {
    /// Analyze plus the initial advice request.
    Upload,
    /// Chat turns.
    Chat,
}

/// What a response should be applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    /// Image analysis.
    Analyze,
    /// Advice requested right after analysis.
    InitialAdvice,
    /// Advice requested by a chat message.
    ChatAdvice,
}

impl CallKind {
    /// Lane the call occupies.
    pub fn lane(self) -> Lane {
        match self {
            CallKind::Analyze | CallKind::InitialAdvice => Lane::Upload,
            CallKind::ChatAdvice => Lane::Chat,
        }
    }
}

/// Handle identifying one admitted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTicket {
    /// Monotonic request id.
    pub id: u64,
    /// Kind of call.
    pub kind: CallKind,
    /// Session generation at admission.
    pub generation: u64,
    /// SHA-256 fingerprint of the request.
    pub fingerprint: String,
}

/// Result of checking a lane before sending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Lane is idle.
    Free,
    /// Identical request already in flight.
    Duplicate,
    /// Different request already in flight.
    Busy,
}

/// Tracks in-flight requests per lane.
#[derive(Debug, Clone, Default)]
pub struct RequestGuard {
    generation: u64,
    next_id: u64,
    in_flight: BTreeMap<Lane, RequestTicket>,
}

impl RequestGuard {
    /// Creates an idle guard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks whether a request with `fingerprint` may start on `lane`.
    pub fn check(&self, lane: Lane, fingerprint: &str) -> Admission {
        match self.in_flight.get(&lane) {
            None => Admission::Free,
            Some(ticket) if ticket.fingerprint == fingerprint => Admission::Duplicate,
            Some(_) => Admission::Busy,
        }
    }

    /// Marks a request as in flight and returns its ticket.
    pub fn admit(&mut self, kind: CallKind, fingerprint: String) -> RequestTicket {
        self.next_id += 1;
        let ticket = RequestTicket {
            id: self.next_id,
            kind,
            generation: self.generation,
            fingerprint,
        };
        self.in_flight.insert(kind.lane(), ticket.clone());
        ticket
    }

    /// Releases `ticket`. Returns `false` when the response is stale.
    pub fn finish(&mut self, ticket: &RequestTicket) -> bool {
        let lane = ticket.kind.lane();
        match self.in_flight.get(&lane) {
            Some(current) if current.id == ticket.id => {
                self.in_flight.remove(&lane);
                true
            }
            _ => false,
        }
    }

    /// Returns `true` while `lane` has a request in flight.
    pub fn is_busy(&self, lane: Lane) -> bool {
        self.in_flight.contains_key(&lane)
    }

    /// Starts a new generation and forgets every in-flight request.
    pub fn advance_generation(&mut self) {
        self.generation += 1;
        self.in_flight.clear();
    }

    /// Returns the current generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
