// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Authentication error types

use std::fmt;

use thiserror::Error;

use crate::class_id::HandshakePhase;
use crate::handle::{HandshakeHandle, IdentityHandle};
use crate::validation::ValidationResult;

/// Errors reported by the authentication plugin.
///
/// Every variant maps onto one category of [`ErrorCategory`]; the middleware
/// boundary only sees the [`SecurityException`] produced by
/// [`AuthError::to_exception`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Unknown identity handle {0}")]
    UnknownIdentityHandle(IdentityHandle),

    #[error("Unknown handshake handle {0}")]
    UnknownHandshakeHandle(HandshakeHandle),

    #[error("Local participant ID not found (handle {0})")]
    UnknownLocalParticipant(IdentityHandle),

    #[error("Unknown remote participant (handle {0})")]
    UnknownRemoteParticipant(IdentityHandle),

    #[error("Unknown remote participant for handshake {0}")]
    UnknownHandshakePeer(HandshakeHandle),

    #[error("No participant data provided")]
    NoParticipantData,

    #[error("Participants are not matched (remote {remote} was not validated against {requested})")]
    ParticipantsNotMatched {
        remote: IdentityHandle,
        requested: IdentityHandle,
    },

    #[error("Handle {0} refers to a remote identity, not a local one")]
    NotLocalIdentity(IdentityHandle),

    #[error("Handshake state is not valid (expected {expected}, found {actual})")]
    InvalidHandshakeState {
        expected: ValidationResult,
        actual: ValidationResult,
    },

    #[error("Shared secret not yet available for handshake {0}")]
    SharedSecretUnavailable(HandshakeHandle),

    #[error("Unexpected handshake message phase {phase} (class id {class_id:?})")]
    UnexpectedPhase {
        phase: HandshakePhase,
        class_id: String,
    },

    #[error("Remote class ID is not compatible: {0:?}")]
    IncompatibleClassId(String),

    #[error("Failed to generate challenge: {0}")]
    ChallengeGeneration(String),

    #[error("Local credentials invalid: {0}")]
    Credentials(String),

    #[error("Participant GUID adjustment failed: {0}")]
    GuidAdjustment(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

/// Error taxonomy used for the exception minor code.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCategory {
    /// Registry lookup failed.
    UnknownHandle = 1,
    /// Caller violated a precondition (empty data, pairing, state).
    Precondition = 2,
    /// Remote plugin name or major version mismatch.
    Incompatible = 3,
    /// Nonce or key material generation failed.
    ResourceExhausted = 4,
    /// Local credential or configuration failure.
    Credentials = 5,
}

impl AuthError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownIdentityHandle(_)
            | Self::UnknownHandshakeHandle(_)
            | Self::UnknownLocalParticipant(_)
            | Self::UnknownRemoteParticipant(_)
            | Self::UnknownHandshakePeer(_) => ErrorCategory::UnknownHandle,
            Self::NoParticipantData
            | Self::ParticipantsNotMatched { .. }
            | Self::NotLocalIdentity(_)
            | Self::InvalidHandshakeState { .. }
            | Self::SharedSecretUnavailable(_)
            | Self::UnexpectedPhase { .. }
            | Self::InvalidToken(_) => ErrorCategory::Precondition,
            Self::IncompatibleClassId(_) => ErrorCategory::Incompatible,
            Self::ChallengeGeneration(_) => ErrorCategory::ResourceExhausted,
            Self::Credentials(_) | Self::GuidAdjustment(_) | Self::Config(_) => {
                ErrorCategory::Credentials
            }
        }
    }

    /// True for lookups against a released or never-issued handle.
    pub fn is_unknown_handle(&self) -> bool {
        self.category() == ErrorCategory::UnknownHandle
    }

    /// Validation result reported alongside this error.
    pub const fn validation_result(&self) -> ValidationResult {
        ValidationResult::Failed
    }

    /// Exception record handed back across the middleware boundary.
    pub fn to_exception(&self) -> SecurityException {
        SecurityException {
            code: SecurityException::AUTHENTICATION_CODE,
            minor_code: self.category() as i32,
            message: self.to_string(),
        }
    }
}

/// Error-detail record of the DDS Security SPI.
///
/// Populated only on failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityException {
    pub code: i32,
    pub minor_code: i32,
    pub message: String,
}

impl SecurityException {
    /// Code used for every authentication plugin failure.
    pub const AUTHENTICATION_CODE: i32 = -1;
}

impl fmt::Display for SecurityException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (code {}, minor {})",
            self.message, self.code, self.minor_code
        )
    }
}

impl std::error::Error for SecurityException {}

impl From<AuthError> for SecurityException {
    fn from(err: AuthError) -> Self {
        err.to_exception()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_display() {
        let err = AuthError::UnknownIdentityHandle(IdentityHandle::from_raw(7));
        assert_eq!(err.to_string(), "Unknown identity handle 7");

        let err = AuthError::InvalidHandshakeState {
            expected: ValidationResult::PendingHandshakeMessage,
            actual: ValidationResult::Ok,
        };
        assert_eq!(
            err.to_string(),
            "Handshake state is not valid (expected VALIDATION_PENDING_HANDSHAKE_MESSAGE, found VALIDATION_OK)"
        );
    }

    #[test]
    fn test_exception_from_error() {
        let err = AuthError::IncompatibleClassId("DDS:Auth:Other:1.0".to_string());
        let ex: SecurityException = err.clone().into();
        assert_eq!(ex.code, -1);
        assert_eq!(ex.minor_code, ErrorCategory::Incompatible as i32);
        assert_eq!(ex.message, err.to_string());
        assert_eq!(err.validation_result(), ValidationResult::Failed);
    }

    #[test]
    fn test_categories() {
        assert!(AuthError::UnknownHandshakeHandle(HandshakeHandle::from_raw(1)).is_unknown_handle());
        assert!(!AuthError::NoParticipantData.is_unknown_handle());
        assert_eq!(
            AuthError::ChallengeGeneration("rng".to_string()).category(),
            ErrorCategory::ResourceExhausted
        );
        assert_eq!(
            AuthError::GuidAdjustment("bad".to_string()).category(),
            ErrorCategory::Credentials
        );
    }
}
