// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Opaque handles and the allocator that issues them.
//!
//! Identities, handshakes and shared secrets all draw from the same counter,
//! so a handle value is unique across categories for the lifetime of the
//! allocator. Handle `0` is never issued (DDS uses it as HANDLE_NIL).

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of process-unique handle values.
///
/// Injected into the plugin so tests can control handle sequences and so
/// several plugin instances can share (or not share) one counter.
pub trait HandleAllocator: Send + Sync + fmt::Debug {
    /// Return the next handle value. Values are never reused.
    fn next(&self) -> u64;
}

/// Monotonic counter starting at 1.
#[derive(Debug)]
pub struct SequentialAllocator {
    next_handle: AtomicU64,
}

impl SequentialAllocator {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Allocator whose first handle is `first`.
    pub fn starting_at(first: u64) -> Self {
        Self {
            next_handle: AtomicU64::new(first),
        }
    }
}

impl Default for SequentialAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl HandleAllocator for SequentialAllocator {
    fn next(&self) -> u64 {
        // Wraps at u64::MAX, which is not reachable in practice.
        self.next_handle.fetch_add(1, Ordering::Relaxed)
    }
}

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u64);

        impl $name {
            /// Wrap a raw handle value.
            pub const fn from_raw(value: u64) -> Self {
                Self(value)
            }

            /// Raw handle value as exchanged with the middleware.
            pub const fn raw(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_handle!(
    /// Handle to a local or remote identity record.
    IdentityHandle
);
define_handle!(
    /// Handle to an in-progress or completed handshake.
    HandshakeHandle
);
define_handle!(
    /// Handle to a shared secret produced by a completed handshake.
    SharedSecretHandle
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_allocator_starts_at_one_and_increments() {
        let alloc = SequentialAllocator::new();
        assert_eq!(alloc.next(), 1);
        assert_eq!(alloc.next(), 2);
        assert_eq!(alloc.next(), 3);
    }

    #[test]
    fn test_allocator_strictly_increasing_in_one_thread() {
        let alloc = SequentialAllocator::starting_at(100);
        let values: Vec<u64> = (0..1000).map(|_| alloc.next()).collect();
        assert!(values.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(values[0], 100);
    }

    #[test]
    fn test_allocator_unique_across_threads() {
        let alloc = Arc::new(SequentialAllocator::new());
        let workers: Vec<_> = (0..8)
            .map(|_| {
                let alloc = Arc::clone(&alloc);
                thread::spawn(move || (0..500).map(|_| alloc.next()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for worker in workers {
            let values = worker.join().expect("allocator thread panicked");
            assert!(values.windows(2).all(|w| w[0] < w[1]));
            for value in values {
                assert!(seen.insert(value), "handle {} issued twice", value);
            }
        }
        assert_eq!(seen.len(), 8 * 500);
    }

    #[test]
    fn test_handle_raw_round_trip() {
        let handle = HandshakeHandle::from_raw(42);
        assert_eq!(handle.raw(), 42);
        assert_eq!(handle.to_string(), "42");
    }
}
