// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Challenge nonce generation.

use std::fmt;

use ring::rand::{SecureRandom, SystemRandom};

use crate::error::AuthError;

/// Size of a handshake challenge (256 bits).
pub const CHALLENGE_LEN: usize = 32;

/// Fills buffers with unpredictable bytes.
pub trait ChallengeSource: Send + Sync + fmt::Debug {
    fn fill(&self, dest: &mut [u8]) -> Result<(), AuthError>;

    /// Generate a 256-bit challenge.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::ChallengeGeneration`] if the source fails. We refuse
    /// to fall back to a predictable value.
    fn challenge(&self) -> Result<[u8; CHALLENGE_LEN], AuthError> {
        let mut nonce = [0u8; CHALLENGE_LEN];
        self.fill(&mut nonce)?;
        Ok(nonce)
    }
}

/// System CSPRNG (ring `SystemRandom`).
#[derive(Debug)]
pub struct SystemChallengeSource {
    rng: SystemRandom,
}

impl SystemChallengeSource {
    pub fn new() -> Self {
        Self {
            rng: SystemRandom::new(),
        }
    }
}

impl Default for SystemChallengeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ChallengeSource for SystemChallengeSource {
    fn fill(&self, dest: &mut [u8]) -> Result<(), AuthError> {
        self.rng.fill(dest).map_err(|_| {
            AuthError::ChallengeGeneration("SystemRandom failed to generate nonce".to_string())
        })
    }
}
