// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Built-in PKI-DH authentication plugin.
//!
//! Drives the handshake state machine over the identity and handshake
//! registries. Certificate, signature and Diffie-Hellman fields of the
//! handshake messages are carried as empty placeholders; the state machine
//! accepts any structurally valid message on a registered handle.

use std::fmt;
use std::sync::Arc;

use crate::authentication::{
    AuthenticationPlugin, HandshakeStart, HandshakeStep, LocalIdentity, RemoteIdentity,
};
use crate::challenge::{ChallengeSource, SystemChallengeSource};
use crate::class_id::{self, HandshakePhase, AUTH_TOKEN_CLASS_ID};
use crate::credentials::{CredentialLoader, LocalCredentials, X509CredentialLoader};
use crate::error::AuthError;
use crate::guid::Guid;
use crate::handle::{
    HandleAllocator, HandshakeHandle, IdentityHandle, SequentialAllocator, SharedSecretHandle,
};
use crate::handshake::{
    is_handshake_initiator, HandshakeRecord, HandshakeRegistry, SharedSecret, SharedSecretRef,
};
use crate::identity::{IdentityRecord, IdentityRegistry};
use crate::qos::ParticipantQos;
use crate::token::{Token, TokenWriter};
use crate::validation::ValidationResult;

/// Signature algorithm advertised in handshake messages.
pub const DSIGN_ALGORITHM: &str = "RSASSA-PSS-SHA256";
/// Key agreement algorithm advertised in handshake messages.
pub const KAGREE_ALGORITHM: &str = "DH+MODP-2048-256";

const FUTURE_CHALLENGE: &str = "future_challenge";

/// PKI-DH authentication plugin.
pub struct AuthenticationBuiltIn {
    allocator: Arc<dyn HandleAllocator>,
    credential_loader: Box<dyn CredentialLoader>,
    challenges: Box<dyn ChallengeSource>,
    identities: IdentityRegistry,
    handshakes: HandshakeRegistry,
}

impl AuthenticationBuiltIn {
    /// Plugin with X.509 credential loading, system randomness and its own
    /// handle counter.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> AuthenticationBuiltInBuilder {
        AuthenticationBuiltInBuilder::default()
    }

    /// Copy of an identity record.
    pub fn identity(&self, handle: IdentityHandle) -> Option<IdentityRecord> {
        self.identities.snapshot(handle)
    }

    /// Copy of a handshake record.
    pub fn handshake(&self, handle: HandshakeHandle) -> Option<HandshakeRecord> {
        self.handshakes.snapshot(handle)
    }

    pub fn handshake_state(&self, handle: HandshakeHandle) -> Option<ValidationResult> {
        self.handshakes.get(handle).map(|record| record.lock().state)
    }

    pub fn identity_count(&self) -> usize {
        self.identities.len()
    }

    pub fn handshake_count(&self) -> usize {
        self.handshakes.len()
    }

    fn reject<T>(&self, operation: &str, err: AuthError) -> Result<T, AuthError> {
        log::warn!("[auth] {} failed: {}", operation, err);
        Err(err)
    }

    /// Credentials of a local identity, or of the local identity a remote
    /// record was validated against.
    fn credentials_for(&self, handle: IdentityHandle) -> Result<Arc<LocalCredentials>, AuthError> {
        self.identities
            .get(handle)
            .map(|record| Arc::clone(record.lock().credentials()))
            .ok_or(AuthError::UnknownIdentityHandle(handle))
    }

    /// Check `remote` was validated against `local` and return the challenge
    /// this side issued to it (empty if none).
    fn paired_challenge(
        &self,
        remote: IdentityHandle,
        local: IdentityHandle,
        participant_data: &[u8],
    ) -> Result<Vec<u8>, AuthError> {
        if participant_data.is_empty() {
            return Err(AuthError::NoParticipantData);
        }
        let record = self
            .identities
            .get(remote)
            .ok_or(AuthError::UnknownRemoteParticipant(remote))?;
        let record = record.lock();
        if record.local_handle() != Some(local) {
            return Err(AuthError::ParticipantsNotMatched {
                remote,
                requested: local,
            });
        }
        Ok(record
            .local_auth_request()
            .and_then(|token| token.binary_property(FUTURE_CHALLENGE))
            .map(<[u8]>::to_vec)
            .unwrap_or_default())
    }

    fn register_handshake(&self, record: HandshakeRecord) -> HandshakeHandle {
        let handle = HandshakeHandle::from_raw(self.allocator.next());
        self.handshakes.insert(handle, record);
        handle
    }

    /// Resolve a handshake awaiting its counterpart message and apply
    /// `advance` under the record lock.
    fn advance_pending<T>(
        &self,
        handle: HandshakeHandle,
        advance: impl FnOnce(&mut HandshakeRecord) -> T,
    ) -> Result<T, AuthError> {
        let record = self
            .handshakes
            .get(handle)
            .ok_or(AuthError::UnknownHandshakeHandle(handle))?;
        let mut record = record.lock();
        if !self.identities.contains(record.remote_identity) {
            return Err(AuthError::UnknownHandshakePeer(handle));
        }
        if record.state != ValidationResult::PendingHandshakeMessage {
            return Err(AuthError::InvalidHandshakeState {
                expected: ValidationResult::PendingHandshakeMessage,
                actual: record.state,
            });
        }
        Ok(advance(&mut *record))
    }

    fn new_shared_secret(&self, challenge1: Vec<u8>, challenge2: Vec<u8>) -> SharedSecretRef {
        let handle = SharedSecretHandle::from_raw(self.allocator.next());
        SharedSecretRef::new(handle, SharedSecret::new(challenge1, challenge2, Vec::new()))
    }

    fn process_handshake_reply(
        &self,
        message_in: &Token,
        handle: HandshakeHandle,
    ) -> Result<HandshakeStep, AuthError> {
        let challenge2 = message_in
            .binary_property("challenge2")
            .map(<[u8]>::to_vec)
            .unwrap_or_default();

        self.advance_pending(handle, |record| {
            let mut final_msg = TokenWriter::new(class_id::build(HandshakePhase::Final), 0, 7);
            final_msg
                .set_bin_property(0, "hash_c1", Vec::new(), true)
                .set_bin_property(1, "hash_c2", Vec::new(), true)
                .set_bin_property(2, "dh1", Vec::new(), true)
                .set_bin_property(3, "dh2", Vec::new(), true)
                .set_bin_property(4, "challenge_1", record.challenge1.clone(), true)
                .set_bin_property(5, "challenge_2", challenge2.clone(), true)
                .set_bin_property(6, "signature", Vec::new(), true);

            record.state = ValidationResult::OkFinalMessage;
            record.secret = Some(self.new_shared_secret(record.challenge1.clone(), challenge2));

            HandshakeStep {
                message: Some(final_msg.finish()),
                result: ValidationResult::OkFinalMessage,
            }
        })
    }

    fn process_final_handshake(
        &self,
        message_in: &Token,
        handle: HandshakeHandle,
    ) -> Result<HandshakeStep, AuthError> {
        let challenge2 = message_in
            .binary_property("challenge_2")
            .map(<[u8]>::to_vec)
            .unwrap_or_default();

        self.advance_pending(handle, |record| {
            record.state = ValidationResult::Ok;
            record.secret = Some(self.new_shared_secret(record.challenge1.clone(), challenge2));

            HandshakeStep {
                message: None,
                result: ValidationResult::Ok,
            }
        })
    }
}

impl Default for AuthenticationBuiltIn {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AuthenticationBuiltIn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticationBuiltIn")
            .field("allocator", &self.allocator)
            .field("challenges", &self.challenges)
            .field("identities", &self.identities.len())
            .field("handshakes", &self.handshakes.len())
            .finish()
    }
}

impl AuthenticationPlugin for AuthenticationBuiltIn {
    fn validate_local_identity(
        &self,
        domain_id: u32,
        participant_qos: &ParticipantQos,
        candidate_guid: Guid,
    ) -> Result<LocalIdentity, AuthError> {
        let credentials = match self.credential_loader.load(participant_qos) {
            Ok(credentials) => Arc::new(credentials),
            Err(e) => return self.reject("validate_local_identity", e),
        };
        let adjusted_guid = match credentials.adjusted_guid(candidate_guid) {
            Ok(guid) => guid,
            Err(e) => return self.reject("validate_local_identity", e),
        };

        let handle = IdentityHandle::from_raw(self.allocator.next());
        self.identities
            .insert(handle, IdentityRecord::local(adjusted_guid, credentials));

        log::debug!(
            "[auth] Local identity {} validated on domain {} ({} -> {})",
            handle,
            domain_id,
            candidate_guid,
            adjusted_guid
        );
        Ok(LocalIdentity {
            handle,
            adjusted_guid,
        })
    }

    fn get_identity_token(&self, handle: IdentityHandle) -> Result<Token, AuthError> {
        let credentials = match self.credentials_for(handle) {
            Ok(credentials) => credentials,
            Err(e) => return self.reject("get_identity_token", e),
        };
        let participant = credentials.participant_cert();
        let ca = credentials.ca_cert();

        let mut token = TokenWriter::new(AUTH_TOKEN_CLASS_ID, 4, 0);
        token
            .set_property(0, "dds.cert.sn", participant.subject_name(), true)
            .set_property(1, "dds.cert.algo", participant.algorithm(), true)
            .set_property(2, "dds.ca.sn", ca.subject_name(), true)
            .set_property(3, "dds.ca.algo", ca.algorithm(), true);
        Ok(token.finish())
    }

    fn get_identity_status_token(&self, handle: IdentityHandle) -> Result<Token, AuthError> {
        if !self.identities.contains(handle) {
            return self.reject(
                "get_identity_status_token",
                AuthError::UnknownIdentityHandle(handle),
            );
        }
        let mut token = TokenWriter::new(AUTH_TOKEN_CLASS_ID, 1, 0);
        token.set_property(0, "dds.ocsp_status", "TBD", true);
        Ok(token.finish())
    }

    fn set_permissions_credential_and_token(
        &self,
        handle: IdentityHandle,
        permissions_credential: &Token,
        permissions_token: &Token,
    ) -> Result<(), AuthError> {
        let Some(record) = self.identities.get(handle) else {
            return self.reject(
                "set_permissions_credential_and_token",
                AuthError::UnknownIdentityHandle(handle),
            );
        };
        let mut record = record.lock();
        record.permissions_credential_token = Some(permissions_credential.clone());
        record.permissions_token = Some(permissions_token.clone());
        Ok(())
    }

    fn validate_remote_identity(
        &self,
        local_identity: IdentityHandle,
        remote_identity_token: &Token,
        remote_participant_guid: Guid,
        remote_auth_request: &Token,
    ) -> Result<RemoteIdentity, AuthError> {
        const OP: &str = "validate_remote_identity";

        let local = match self.identities.snapshot(local_identity) {
            Some(local) => local,
            None => return self.reject(OP, AuthError::UnknownLocalParticipant(local_identity)),
        };
        if !local.is_local() {
            return self.reject(OP, AuthError::NotLocalIdentity(local_identity));
        }
        if !class_id::is_compatible(&remote_identity_token.class_id) {
            return self.reject(
                OP,
                AuthError::IncompatibleClassId(remote_identity_token.class_id.clone()),
            );
        }

        // Only challenge the remote if it has not already challenged us.
        let (local_auth_request, remote_auth_request) = if remote_auth_request.is_nil() {
            let nonce = match self.challenges.challenge() {
                Ok(nonce) => nonce,
                Err(e) => return self.reject(OP, e),
            };
            let mut request = TokenWriter::new(class_id::build(HandshakePhase::AuthRequest), 0, 1);
            request.set_bin_property(0, FUTURE_CHALLENGE, nonce.to_vec(), true);
            (Some(request.finish()), None)
        } else {
            (None, Some(remote_auth_request.clone()))
        };

        let handle = IdentityHandle::from_raw(self.allocator.next());
        self.identities.insert(
            handle,
            IdentityRecord::remote(
                remote_participant_guid,
                local_identity,
                Arc::clone(local.credentials()),
                local_auth_request.clone(),
                remote_auth_request,
            ),
        );

        let result = if is_handshake_initiator(&local.participant_guid, &remote_participant_guid) {
            ValidationResult::PendingHandshakeRequest
        } else {
            ValidationResult::PendingHandshakeMessage
        };

        log::debug!(
            "[auth] Remote identity {} ({}) validated against {}: {}",
            handle,
            remote_participant_guid,
            local_identity,
            result
        );
        Ok(RemoteIdentity {
            handle,
            auth_request: local_auth_request,
            result,
        })
    }

    fn begin_handshake_request(
        &self,
        initiator: IdentityHandle,
        replier: IdentityHandle,
        serialized_local_participant_data: &[u8],
    ) -> Result<HandshakeStart, AuthError> {
        let challenge1 =
            match self.paired_challenge(replier, initiator, serialized_local_participant_data) {
                Ok(challenge) => challenge,
                Err(e) => return self.reject("begin_handshake_request", e),
            };

        let mut message = TokenWriter::new(class_id::build(HandshakePhase::Request), 0, 8);
        message
            .set_bin_property(0, "c.id", Vec::new(), true)
            .set_bin_property(1, "c.perm", Vec::new(), true)
            .set_bin_property(2, "c.pdata", serialized_local_participant_data, true)
            .set_bin_property(3, "c.dsign_algo", DSIGN_ALGORITHM, true)
            .set_bin_property(4, "c.kagree_algo", KAGREE_ALGORITHM, true)
            .set_bin_property(5, "c.hash_c1", Vec::new(), true)
            .set_bin_property(6, "c.ocsp_status", Vec::new(), true)
            .set_bin_property(7, "c.challenge1", challenge1.clone(), true);

        // No deduplication: every call starts a fresh handshake.
        let handle =
            self.register_handshake(HandshakeRecord::new(initiator, replier, true, challenge1));

        log::debug!(
            "[auth] Handshake {} requested ({} -> {})",
            handle,
            initiator,
            replier
        );
        Ok(HandshakeStart {
            handle,
            message: message.finish(),
            result: ValidationResult::PendingHandshakeMessage,
        })
    }

    fn begin_handshake_reply(
        &self,
        initiator: IdentityHandle,
        replier: IdentityHandle,
        serialized_local_participant_data: &[u8],
    ) -> Result<HandshakeStart, AuthError> {
        // Here the remote is the initiator.
        let challenge1 =
            match self.paired_challenge(initiator, replier, serialized_local_participant_data) {
                Ok(challenge) => challenge,
                Err(e) => return self.reject("begin_handshake_reply", e),
            };

        let mut message = TokenWriter::new(class_id::build(HandshakePhase::Reply), 0, 13);
        message
            .set_bin_property(0, "c.id", Vec::new(), true)
            .set_bin_property(1, "c.perm", Vec::new(), true)
            .set_bin_property(2, "c.pdata", serialized_local_participant_data, true)
            .set_bin_property(3, "c.dsign_algo", DSIGN_ALGORITHM, true)
            .set_bin_property(4, "c.kagree_algo", KAGREE_ALGORITHM, true)
            .set_bin_property(5, "hash_c2", Vec::new(), true)
            .set_bin_property(6, "dh2", Vec::new(), true)
            .set_bin_property(7, "hash_c1", Vec::new(), true)
            .set_bin_property(8, "dh1", Vec::new(), true)
            .set_bin_property(9, "challenge1", challenge1.clone(), true)
            .set_bin_property(10, "challenge2", Vec::new(), true)
            .set_bin_property(11, "ocsp_status", Vec::new(), true)
            .set_bin_property(12, "signature", Vec::new(), true);

        let handle =
            self.register_handshake(HandshakeRecord::new(replier, initiator, false, challenge1));

        log::debug!(
            "[auth] Handshake {} replied ({} <- {})",
            handle,
            replier,
            initiator
        );
        Ok(HandshakeStart {
            handle,
            message: message.finish(),
            result: ValidationResult::PendingHandshakeMessage,
        })
    }

    fn process_handshake(
        &self,
        message_in: &Token,
        handshake: HandshakeHandle,
    ) -> Result<HandshakeStep, AuthError> {
        let phase = HandshakePhase::of(&message_in.class_id);
        let outcome = match phase {
            HandshakePhase::Reply => self.process_handshake_reply(message_in, handshake),
            HandshakePhase::Final => self.process_final_handshake(message_in, handshake),
            _ => Err(AuthError::UnexpectedPhase {
                phase,
                class_id: message_in.class_id.clone(),
            }),
        };

        match outcome {
            Ok(step) => {
                log::debug!(
                    "[auth] Handshake {} processed {} message: {}",
                    handshake,
                    phase,
                    step.result
                );
                Ok(step)
            }
            Err(e) => self.reject("process_handshake", e),
        }
    }

    fn get_shared_secret(&self, handshake: HandshakeHandle) -> Result<SharedSecretRef, AuthError> {
        let secret = self
            .handshakes
            .get(handshake)
            .ok_or(AuthError::UnknownHandshakeHandle(handshake))
            .and_then(|record| {
                record
                    .lock()
                    .secret
                    .clone()
                    .ok_or(AuthError::SharedSecretUnavailable(handshake))
            });
        secret.or_else(|e| self.reject("get_shared_secret", e))
    }

    fn get_authenticated_peer_credential_token(
        &self,
        handshake: HandshakeHandle,
    ) -> Result<Token, AuthError> {
        if self.handshakes.get(handshake).is_none() {
            return self.reject(
                "get_authenticated_peer_credential_token",
                AuthError::UnknownHandshakeHandle(handshake),
            );
        }
        let mut token = TokenWriter::new(AUTH_TOKEN_CLASS_ID, 2, 0);
        token
            .set_property(0, "c.id", "CertificateContents", true)
            .set_property(1, "c.perm", "PermissionsDocument", true);
        Ok(token.finish())
    }

    fn return_identity_token(&self, _token: Token) -> Result<(), AuthError> {
        Ok(())
    }

    fn return_identity_status_token(&self, _token: Token) -> Result<(), AuthError> {
        Ok(())
    }

    fn return_authenticated_peer_credential_token(&self, _token: Token) -> Result<(), AuthError> {
        Ok(())
    }

    fn return_handshake_handle(&self, handshake: HandshakeHandle) -> Result<(), AuthError> {
        if !self.handshakes.remove(handshake) {
            return self.reject(
                "return_handshake_handle",
                AuthError::UnknownHandshakeHandle(handshake),
            );
        }
        log::debug!("[auth] Handshake {} released", handshake);
        Ok(())
    }

    fn return_identity_handle(&self, handle: IdentityHandle) -> Result<(), AuthError> {
        if !self.identities.remove(handle) {
            return self.reject(
                "return_identity_handle",
                AuthError::UnknownIdentityHandle(handle),
            );
        }
        log::debug!("[auth] Identity {} released", handle);
        Ok(())
    }

    fn return_sharedsecret_handle(&self, secret: SharedSecretRef) -> Result<(), AuthError> {
        log::trace!("[auth] Shared secret {} returned", secret.handle());
        drop(secret);
        Ok(())
    }
}

/// Builder for [`AuthenticationBuiltIn`].
#[derive(Default)]
pub struct AuthenticationBuiltInBuilder {
    allocator: Option<Arc<dyn HandleAllocator>>,
    credential_loader: Option<Box<dyn CredentialLoader>>,
    challenges: Option<Box<dyn ChallengeSource>>,
}

impl AuthenticationBuiltInBuilder {
    /// Share a handle allocator (default: a private [`SequentialAllocator`]).
    pub fn allocator(mut self, allocator: Arc<dyn HandleAllocator>) -> Self {
        self.allocator = Some(allocator);
        self
    }

    /// Credential loader (default: [`X509CredentialLoader`]).
    pub fn credential_loader(mut self, loader: impl CredentialLoader + 'static) -> Self {
        self.credential_loader = Some(Box::new(loader));
        self
    }

    /// Nonce source (default: [`SystemChallengeSource`]).
    pub fn challenge_source(mut self, source: impl ChallengeSource + 'static) -> Self {
        self.challenges = Some(Box::new(source));
        self
    }

    pub fn build(self) -> AuthenticationBuiltIn {
        AuthenticationBuiltIn {
            allocator: self
                .allocator
                .unwrap_or_else(|| Arc::new(SequentialAllocator::new())),
            credential_loader: self
                .credential_loader
                .unwrap_or_else(|| Box::new(X509CredentialLoader)),
            challenges: self
                .challenges
                .unwrap_or_else(|| Box::new(SystemChallengeSource::new())),
            identities: IdentityRegistry::new(),
            handshakes: HandshakeRegistry::new(),
        }
    }
}

impl fmt::Debug for AuthenticationBuiltInBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticationBuiltInBuilder")
            .field("allocator", &self.allocator)
            .field("credential_loader", &self.credential_loader.is_some())
            .field("challenges", &self.challenges)
            .finish()
    }
}
