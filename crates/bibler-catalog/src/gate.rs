use std::sync::atomic::{AtomicU64, Ordering};

/// Generation counter for the debounced lookup flow. Issue a token before
/// spawning a request and check it when the response lands; a response
/// whose token is no longer current belongs to a superseded keystroke and
/// must be discarded. Dropping the superseded future is the only
/// cancellation; nothing in flight is aborted.
#[derive(Debug, Default)]
pub struct RequestGate {
    generation: AtomicU64,
}

/// Marks which generation a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken(u64);

impl RequestGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new generation, invalidating every token issued before.
    pub fn issue(&self) -> RequestToken {
        RequestToken(self.generation.fetch_add(1, Ordering::Relaxed) + 1)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.generation.load(Ordering::Relaxed) == token.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_token_is_current() {
        let gate = RequestGate::new();
        let token = gate.issue();
        assert!(gate.is_current(token));
    }

    #[test]
    fn test_latest_token_wins() {
        let gate = RequestGate::new();
        let first = gate.issue();
        let second = gate.issue();
        assert!(!gate.is_current(first));
        assert!(gate.is_current(second));
    }

    #[test]
    fn test_stale_response_stays_stale() {
        let gate = RequestGate::new();
        let first = gate.issue();
        let _second = gate.issue();
        let third = gate.issue();
        // Out-of-order arrival: the oldest response checks last and is
        // still rejected.
        assert!(gate.is_current(third));
        assert!(!gate.is_current(first));
    }
}
