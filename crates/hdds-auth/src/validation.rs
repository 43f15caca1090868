// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Validation results (DDS Security v1.1 Sec.8.3.2.11.1)

use std::fmt;

/// Outcome of an identity validation or handshake step.
///
/// Also used as the state of a handshake record: a handshake waiting for its
/// counterpart sits in `PendingHandshakeMessage`, a completed one in `Ok`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ValidationResult {
    Ok,
    Failed,
    PendingRetry,
    /// This side must call `begin_handshake_request`.
    PendingHandshakeRequest,
    /// Waiting for a handshake message from the peer.
    PendingHandshakeMessage,
    /// Handshake done locally; the final message still has to be sent.
    OkFinalMessage,
}

impl ValidationResult {
    /// Terminal states never change again.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Ok | Self::Failed)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "VALIDATION_OK",
            Self::Failed => "VALIDATION_FAILED",
            Self::PendingRetry => "VALIDATION_PENDING_RETRY",
            Self::PendingHandshakeRequest => "VALIDATION_PENDING_HANDSHAKE_REQUEST",
            Self::PendingHandshakeMessage => "VALIDATION_PENDING_HANDSHAKE_MESSAGE",
            Self::OkFinalMessage => "VALIDATION_OK_FINAL_MESSAGE",
        }
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(ValidationResult::Ok.is_terminal());
        assert!(ValidationResult::Failed.is_terminal());
        assert!(!ValidationResult::OkFinalMessage.is_terminal());
        assert!(!ValidationResult::PendingHandshakeMessage.is_terminal());
    }

    #[test]
    fn test_display_uses_spi_names() {
        assert_eq!(
            ValidationResult::PendingHandshakeRequest.to_string(),
            "VALIDATION_PENDING_HANDSHAKE_REQUEST"
        );
        assert_eq!(ValidationResult::Failed.to_string(), "VALIDATION_FAILED");
    }
}
