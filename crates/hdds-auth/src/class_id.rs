// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Token class identifiers
//!
//! Every token produced by the plugin carries a class id of the form
//!
//! ```text
//! <plugin-name>:<major>.<minor>+<phase>
//! DDS:Auth:PKI-DH:1.0+Reply
//! ```
//!
//! The plugin name and major version decide compatibility with a remote
//! participant. The phase suffix routes handshake messages and is parsed once
//! into [`HandshakePhase`] at the ingestion boundary.

use std::fmt;

/// Plugin class name.
pub const AUTH_PLUGIN_NAME: &str = "DDS:Auth:PKI-DH";
/// Major version; must match exactly for two plugins to interoperate.
pub const AUTH_PLUGIN_MAJOR_VERSION: &str = "1";
/// Minor version; informational only.
pub const AUTH_PLUGIN_MINOR_VERSION: &str = "0";

/// Class id of identity, identity status and peer credential tokens.
pub const AUTH_TOKEN_CLASS_ID: &str = "DDS:Auth:PKI-DH:1.0";

/// Phase carried in the class id extension.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum HandshakePhase {
    /// Auth request token (`AuthReq`) carrying a future challenge.
    AuthRequest,
    /// Handshake request (`Req`) sent by the initiator.
    Request,
    /// Handshake reply (`Reply`) sent by the replier.
    Reply,
    /// Final message (`Final`) sent by the initiator.
    Final,
    /// Missing or unrecognised extension.
    Unknown,
}

impl HandshakePhase {
    /// Class id extension for this phase (empty for `Unknown`).
    pub const fn extension(self) -> &'static str {
        match self {
            Self::AuthRequest => "AuthReq",
            Self::Request => "Req",
            Self::Reply => "Reply",
            Self::Final => "Final",
            Self::Unknown => "",
        }
    }

    pub fn from_extension(ext: &str) -> Self {
        match ext {
            "AuthReq" => Self::AuthRequest,
            "Req" => Self::Request,
            "Reply" => Self::Reply,
            "Final" => Self::Final,
            _ => Self::Unknown,
        }
    }

    /// Phase of a full class id string.
    pub fn of(class_id: &str) -> Self {
        Self::from_extension(extension(class_id))
    }
}

impl fmt::Display for HandshakePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str("<unknown>"),
            other => f.write_str(other.extension()),
        }
    }
}

/// Build a class id from its components.
pub fn compose(plugin_name: &str, major: &str, minor: &str, extension: &str) -> String {
    format!("{}:{}.{}+{}", plugin_name, major, minor, extension)
}

/// Class id of this plugin for the given phase.
pub fn build(phase: HandshakePhase) -> String {
    compose(
        AUTH_PLUGIN_NAME,
        AUTH_PLUGIN_MAJOR_VERSION,
        AUTH_PLUGIN_MINOR_VERSION,
        phase.extension(),
    )
}

/// Extension after the last `+`; empty when there is none.
pub fn extension(class_id: &str) -> &str {
    match class_id.rfind('+') {
        Some(pos) => &class_id[pos + 1..],
        None => "",
    }
}

/// Plugin name (text before the last `:`) and major version (text between
/// that `:` and the next `.`).
///
/// Returns `None` when either part is missing or empty.
pub fn name_and_major(class_id: &str) -> Option<(&str, &str)> {
    let colon = class_id.rfind(':')?;
    if colon == 0 {
        return None;
    }
    let major_start = colon + 1;
    let period = class_id[major_start..].find('.')? + major_start;
    if period == major_start {
        return None;
    }
    Some((&class_id[..colon], &class_id[major_start..period]))
}

/// True when the remote class id names this plugin with the same major version.
pub fn is_compatible(class_id: &str) -> bool {
    matches!(
        name_and_major(class_id),
        Some((name, major)) if name == AUTH_PLUGIN_NAME && major == AUTH_PLUGIN_MAJOR_VERSION
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_class_id() {
        assert_eq!(build(HandshakePhase::Request), "DDS:Auth:PKI-DH:1.0+Req");
        assert_eq!(build(HandshakePhase::Reply), "DDS:Auth:PKI-DH:1.0+Reply");
        assert_eq!(build(HandshakePhase::Final), "DDS:Auth:PKI-DH:1.0+Final");
        assert_eq!(
            build(HandshakePhase::AuthRequest),
            "DDS:Auth:PKI-DH:1.0+AuthReq"
        );
    }

    #[test]
    fn test_compose_then_parse_recovers_components() {
        let id = compose("Vendor:Auth:X", "7", "3", "Reply");
        assert_eq!(name_and_major(&id), Some(("Vendor:Auth:X", "7")));
        assert_eq!(extension(&id), "Reply");
        assert_eq!(HandshakePhase::of(&id), HandshakePhase::Reply);
    }

    #[test]
    fn test_extension_absent_or_trailing() {
        assert_eq!(extension("DDS:Auth:PKI-DH:1.0"), "");
        assert_eq!(extension("DDS:Auth:PKI-DH:1.0+"), "");
        assert_eq!(extension("a+b+Final"), "Final");
        assert_eq!(HandshakePhase::of("DDS:Auth:PKI-DH:1.0"), HandshakePhase::Unknown);
        assert_eq!(HandshakePhase::of("DDS:Auth:PKI-DH:1.0+Bogus"), HandshakePhase::Unknown);
    }

    #[test]
    fn test_compatibility() {
        assert!(is_compatible("DDS:Auth:PKI-DH:1.0"));
        assert!(is_compatible("DDS:Auth:PKI-DH:1.7+Req"));
        assert!(!is_compatible("DDS:Auth:Other:1.0"));
        assert!(!is_compatible("DDS:Auth:PKI-DH:2.0"));
        assert!(!is_compatible("DDS:Auth:PKI-DH:1"));
        assert!(!is_compatible("DDS:Auth:PKI-DH:.0"));
        assert!(!is_compatible(":1.0"));
        assert!(!is_compatible(""));
    }

    #[test]
    fn test_phase_extension_round_trip() {
        for phase in [
            HandshakePhase::AuthRequest,
            HandshakePhase::Request,
            HandshakePhase::Reply,
            HandshakePhase::Final,
        ] {
            assert_eq!(HandshakePhase::of(&build(phase)), phase);
        }
        assert_eq!(HandshakePhase::Unknown.to_string(), "<unknown>");
    }
}
