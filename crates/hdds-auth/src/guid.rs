// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Participant GUID as seen by the authentication plugin.

use std::fmt;

/// Entity id of a DomainParticipant (RTPS ENTITYID_PARTICIPANT).
pub const ENTITYID_PARTICIPANT: [u8; 4] = [0x00, 0x00, 0x01, 0xC1];

/// RTPS GUID (Globally Unique Identifier)
///
/// 16-byte identifier: 12-byte prefix followed by a 4-byte entity id.
/// Ordering is the lexicographic order of the raw 16 bytes, which is what the
/// handshake tie-break relies on.
///
/// # Display Format
/// Hex with dots: "01.0f.ac.10.00.00.00.00.00.00.00.01.00.00.01.c1"
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Guid {
    pub prefix: [u8; 12],
    pub entity_id: [u8; 4],
}

impl Guid {
    /// Create GUID from raw bytes (16 bytes total)
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        let mut prefix = [0u8; 12];
        let mut entity_id = [0u8; 4];
        prefix.copy_from_slice(&bytes[0..12]);
        entity_id.copy_from_slice(&bytes[12..16]);
        Self { prefix, entity_id }
    }

    /// Create GUID from separate prefix and entity ID
    pub fn new(prefix: [u8; 12], entity_id: [u8; 4]) -> Self {
        Self { prefix, entity_id }
    }

    /// Participant GUID for the given prefix.
    pub fn participant(prefix: [u8; 12]) -> Self {
        Self::new(prefix, ENTITYID_PARTICIPANT)
    }

    /// Convert GUID to 16-byte array
    pub fn as_bytes(&self) -> [u8; 16] {
        let mut bytes = [0u8; 16];
        bytes[0..12].copy_from_slice(&self.prefix);
        bytes[12..16].copy_from_slice(&self.entity_id);
        bytes
    }

    /// GUID with all zeros (GUID_UNKNOWN)
    pub fn zero() -> Self {
        Self {
            prefix: [0; 12],
            entity_id: [0; 4],
        }
    }

    pub fn is_zero(&self) -> bool {
        self.prefix.iter().all(|&b| b == 0) && self.entity_id.iter().all(|&b| b == 0)
    }
}

impl Default for Guid {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<[u8; 16]> for Guid {
    fn from(bytes: [u8; 16]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.prefix.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{:02x}", byte)?;
        }
        for byte in &self.entity_id {
            write!(f, ".{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Guid({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guid_from_bytes() {
        let bytes = [1, 15, 172, 16, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 1, 193];
        let guid = Guid::from_bytes(bytes);

        assert_eq!(guid.prefix[0], 1);
        assert_eq!(guid.prefix[1], 15);
        assert_eq!(guid.entity_id, ENTITYID_PARTICIPANT);
        assert_eq!(guid.as_bytes(), bytes);
    }

    #[test]
    fn test_guid_display() {
        let guid = Guid::participant([1, 15, 172, 16, 0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(
            guid.to_string(),
            "01.0f.ac.10.00.00.00.00.00.00.00.01.00.00.01.c1"
        );
    }

    #[test]
    fn test_guid_ordering_is_bytewise() {
        let low = Guid::from_bytes([0x01; 16]);
        let high = Guid::from_bytes([0x02; 16]);
        assert!(low < high);

        // Entity id only breaks ties once the prefix is equal.
        let a = Guid::new([5; 12], [0xFF; 4]);
        let b = Guid::new([6; 12], [0x00; 4]);
        assert!(a < b);
        assert_eq!(a.as_bytes() < b.as_bytes(), a < b);
    }

    #[test]
    fn test_guid_zero() {
        assert!(Guid::zero().is_zero());
        assert!(Guid::default().is_zero());
        assert!(!Guid::participant([0; 12]).is_zero());
    }
}
