//! Shared bookkeeping for services that cache fetched results.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Issues monotonically increasing fetch tickets.
#[derive(Debug, Default)]
pub(crate) struct FetchSequence {
    last: AtomicU64,
}

impl FetchSequence {
    /// Take the next ticket. The first ticket is 1.
    pub(crate) fn issue(&self) -> u64 {
        self.last.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// A value stamped with the ticket of the fetch that produced it.
#[derive(Debug, Clone, Default)]
pub(crate) struct Versioned<T> {
    applied: u64,
    value: T,
}

impl<T> Versioned<T> {
    /// Replace the value if `ticket` is newer than the applied one.
    ///
    /// Returns `false` when the result is stale and was dropped.
    pub(crate) fn replace_if_newer(&mut self, ticket: u64, value: T) -> bool {
        if ticket <= self.applied {
            return false;
        }
        self.applied = ticket;
        self.value = value;
        true
    }

    pub(crate) fn get(&self) -> &T {
        &self.value
    }
}

/// Number of operations currently awaiting a remote call.
#[derive(Debug, Clone, Default)]
pub(crate) struct InFlight {
    count: Arc<AtomicUsize>,
}

impl InFlight {
    /// Mark an operation as started; it ends when the guard drops.
    pub(crate) fn enter(&self) -> InFlightGuard {
        self.count.fetch_add(1, Ordering::SeqCst);
        InFlightGuard {
            count: Arc::clone(&self.count),
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.count.load(Ordering::SeqCst) > 0
    }
}

/// Decrements the in-flight count on drop.
#[derive(Debug)]
pub(crate) struct InFlightGuard {
    count: Arc<AtomicUsize>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.count.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_ticket_is_dropped() {
        let sequence = FetchSequence::default();
        let first = sequence.issue();
        let second = sequence.issue();
        assert!(second > first);

        let mut cache = Versioned::<Vec<u8>>::default();
        assert!(cache.replace_if_newer(second, vec![2]));
        assert!(!cache.replace_if_newer(first, vec![1]));
        assert_eq!(cache.get(), &vec![2]);
    }

    #[test]
    fn test_in_flight_guard() {
        let in_flight = InFlight::default();
        assert!(!in_flight.is_active());
        let a = in_flight.enter();
        let b = in_flight.enter();
        drop(a);
        assert!(in_flight.is_active());
        drop(b);
        assert!(!in_flight.is_active());
    }
}
