// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Authentication plugin SPI (DDS Security v1.1 Sec.8.3)
//!
//! # Lifecycle
//!
//! 1. `validate_local_identity()` -- once per local participant
//! 2. `validate_remote_identity()` -- per discovered participant; predicts the role
//! 3. `begin_handshake_request()` or `begin_handshake_reply()` -- depending on role
//! 4. `process_handshake()` -- until `VALIDATION_OK` or `VALIDATION_OK_FINAL_MESSAGE`
//! 5. `get_shared_secret()` -- key material for the cryptographic plugin
//! 6. `return_*()` -- release handles and tokens
//!
//! All operations are synchronous and may be called from several threads.
//! The caller must not drive the same handshake handle from two threads at
//! once, and must attach permissions to an identity before handshaking with it.

use crate::error::AuthError;
use crate::guid::Guid;
use crate::handle::{HandshakeHandle, IdentityHandle};
use crate::handshake::SharedSecretRef;
use crate::qos::ParticipantQos;
use crate::token::Token;
use crate::validation::ValidationResult;

/// Result of a successful local identity validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalIdentity {
    pub handle: IdentityHandle,
    /// Candidate GUID bound to the local certificate.
    pub adjusted_guid: Guid,
}

/// Result of a successful remote identity validation.
#[derive(Debug, Clone)]
pub struct RemoteIdentity {
    pub handle: IdentityHandle,
    /// Auth request to send to the remote; `None` when the remote already
    /// challenged us.
    pub auth_request: Option<Token>,
    /// `PendingHandshakeRequest` when this side initiates, otherwise
    /// `PendingHandshakeMessage`.
    pub result: ValidationResult,
}

/// A newly created handshake and the message to send.
#[derive(Debug, Clone)]
pub struct HandshakeStart {
    pub handle: HandshakeHandle,
    pub message: Token,
    pub result: ValidationResult,
}

/// Outcome of feeding one message into a handshake.
#[derive(Debug, Clone)]
pub struct HandshakeStep {
    pub message: Option<Token>,
    pub result: ValidationResult,
}

/// Authentication plugin interface used by the discovery layer.
pub trait AuthenticationPlugin: Send + Sync {
    /// Load local credentials and register a local identity.
    fn validate_local_identity(
        &self,
        domain_id: u32,
        participant_qos: &ParticipantQos,
        candidate_guid: Guid,
    ) -> Result<LocalIdentity, AuthError>;

    /// Identity token describing the local certificate and its CA.
    fn get_identity_token(&self, handle: IdentityHandle) -> Result<Token, AuthError>;

    fn get_identity_status_token(&self, handle: IdentityHandle) -> Result<Token, AuthError>;

    /// Attach permissions material to an identity. Must happen before any
    /// handshake uses that identity.
    fn set_permissions_credential_and_token(
        &self,
        handle: IdentityHandle,
        permissions_credential: &Token,
        permissions_token: &Token,
    ) -> Result<(), AuthError>;

    /// Register a discovered participant and decide who initiates.
    fn validate_remote_identity(
        &self,
        local_identity: IdentityHandle,
        remote_identity_token: &Token,
        remote_participant_guid: Guid,
        remote_auth_request: &Token,
    ) -> Result<RemoteIdentity, AuthError>;

    fn begin_handshake_request(
        &self,
        initiator: IdentityHandle,
        replier: IdentityHandle,
        serialized_local_participant_data: &[u8],
    ) -> Result<HandshakeStart, AuthError>;

    fn begin_handshake_reply(
        &self,
        initiator: IdentityHandle,
        replier: IdentityHandle,
        serialized_local_participant_data: &[u8],
    ) -> Result<HandshakeStart, AuthError>;

    /// Advance a handshake with an incoming Reply or Final message.
    fn process_handshake(
        &self,
        message_in: &Token,
        handshake: HandshakeHandle,
    ) -> Result<HandshakeStep, AuthError>;

    fn get_shared_secret(&self, handshake: HandshakeHandle) -> Result<SharedSecretRef, AuthError>;

    fn get_authenticated_peer_credential_token(
        &self,
        handshake: HandshakeHandle,
    ) -> Result<Token, AuthError>;

    fn return_identity_token(&self, token: Token) -> Result<(), AuthError>;

    fn return_identity_status_token(&self, token: Token) -> Result<(), AuthError>;

    fn return_authenticated_peer_credential_token(&self, token: Token) -> Result<(), AuthError>;

    fn return_handshake_handle(&self, handshake: HandshakeHandle) -> Result<(), AuthError>;

    fn return_identity_handle(&self, handle: IdentityHandle) -> Result<(), AuthError>;

    fn return_sharedsecret_handle(&self, secret: SharedSecretRef) -> Result<(), AuthError>;
}
