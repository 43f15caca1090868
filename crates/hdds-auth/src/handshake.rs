// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Handshake records, shared secrets and the initiator tie-break.
//!
//! # Protocol
//!
//! ```text
//! Initiator (smaller GUID)                 Replier
//!    |                                        |
//!    |  begin_handshake_request  ---- Req --->|
//!    |                                        |  begin_handshake_reply
//!    |<--------------------------- Reply -----|  (PENDING_HANDSHAKE_MESSAGE)
//!    |  process_handshake                     |
//!    |  (OK_FINAL_MESSAGE) -------- Final --->|
//!    |                                        |  process_handshake (OK)
//! ```

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use zeroize::Zeroizing;

use crate::guid::Guid;
use crate::handle::{HandshakeHandle, IdentityHandle, SharedSecretHandle};
use crate::store::{HandleStore, Shared};
use crate::validation::ValidationResult;

/// Decide whether the local participant sends the handshake request.
///
/// The side whose GUID bytes sort first initiates, so for any two distinct
/// GUIDs exactly one side initiates. A participant never initiates against
/// its own GUID.
pub fn is_handshake_initiator(local: &Guid, remote: &Guid) -> bool {
    local.as_bytes() < remote.as_bytes()
}

/// Key material of a completed handshake.
pub struct SharedSecret {
    challenge1: Vec<u8>,
    challenge2: Vec<u8>,
    shared_secret: Zeroizing<Vec<u8>>,
}

impl SharedSecret {
    pub fn new(challenge1: Vec<u8>, challenge2: Vec<u8>, shared_secret: Vec<u8>) -> Self {
        Self {
            challenge1,
            challenge2,
            shared_secret: Zeroizing::new(shared_secret),
        }
    }

    pub fn challenge1(&self) -> Vec<u8> {
        self.challenge1.clone()
    }

    pub fn challenge2(&self) -> Vec<u8> {
        self.challenge2.clone()
    }

    pub fn shared_secret(&self) -> Zeroizing<Vec<u8>> {
        self.shared_secret.clone()
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedSecret")
            .field("challenge1_len", &self.challenge1.len())
            .field("challenge2_len", &self.challenge2.len())
            .field("shared_secret", &"<redacted>")
            .finish()
    }
}

/// Counted reference to a shared secret, handed to the caller by
/// `get_shared_secret` and given back through `return_sharedsecret_handle`.
#[derive(Debug, Clone)]
pub struct SharedSecretRef {
    handle: SharedSecretHandle,
    secret: Arc<SharedSecret>,
}

impl SharedSecretRef {
    pub(crate) fn new(handle: SharedSecretHandle, secret: SharedSecret) -> Self {
        Self {
            handle,
            secret: Arc::new(secret),
        }
    }

    pub fn handle(&self) -> SharedSecretHandle {
        self.handle
    }
}

impl Deref for SharedSecretRef {
    type Target = SharedSecret;

    fn deref(&self) -> &SharedSecret {
        &self.secret
    }
}

/// One handshake between a local and a remote identity.
#[derive(Debug, Clone)]
pub struct HandshakeRecord {
    pub local_identity: IdentityHandle,
    pub remote_identity: IdentityHandle,
    pub local_initiator: bool,
    pub state: ValidationResult,
    /// Challenge this side placed in its request or reply (may be empty).
    pub challenge1: Vec<u8>,
    pub secret: Option<SharedSecretRef>,
}

impl HandshakeRecord {
    pub fn new(
        local_identity: IdentityHandle,
        remote_identity: IdentityHandle,
        local_initiator: bool,
        challenge1: Vec<u8>,
    ) -> Self {
        Self {
            local_identity,
            remote_identity,
            local_initiator,
            state: ValidationResult::PendingHandshakeMessage,
            challenge1,
            secret: None,
        }
    }
}

/// Handshake handle -> record.
pub struct HandshakeRegistry {
    store: HandleStore<HandshakeRecord>,
}

impl HandshakeRegistry {
    pub fn new() -> Self {
        Self {
            store: HandleStore::new(),
        }
    }

    pub fn insert(&self, handle: HandshakeHandle, record: HandshakeRecord) {
        self.store.insert(handle.raw(), record);
    }

    pub(crate) fn get(&self, handle: HandshakeHandle) -> Option<Shared<HandshakeRecord>> {
        self.store.get(handle.raw())
    }

    pub fn snapshot(&self, handle: HandshakeHandle) -> Option<HandshakeRecord> {
        self.get(handle).map(|record| record.lock().clone())
    }

    pub fn remove(&self, handle: HandshakeHandle) -> bool {
        self.store.remove(handle.raw()).is_some()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for HandshakeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
