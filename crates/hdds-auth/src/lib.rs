// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! HDDS PKI-DH Authentication
//!
//! Built-in DDS Security authentication plugin (`DDS:Auth:PKI-DH:1.0`):
//! identity validation, handshake orchestration and shared secret hand-off.
//!
//! # Features
//!
//! - **Identity registry**: local and remote participants keyed by opaque handles
//! - **Initiator tie-break**: deterministic role selection from participant GUIDs
//! - **Handshake state machine**: Request / Reply / Final with single-use transitions
//! - **X.509 credentials**: PEM loading, chain check and GUID adjustment
//! - **Config**: `dds.sec.auth.*` properties or YAML (`config-loaders` feature)
//!
//! Certificate contents, signatures and Diffie-Hellman values inside the
//! handshake messages are empty placeholders.
//!
//! # Example
//!
//! ```rust,ignore
//! use hdds_auth::{AuthConfig, AuthenticationBuiltIn, AuthenticationPlugin, Guid, Token};
//!
//! let qos = AuthConfig::builder()
//!     .identity_ca("file:certs/ca.pem")
//!     .identity_certificate("file:certs/participant.pem")
//!     .private_key("file:certs/participant_key.pem")
//!     .build()?
//!     .to_participant_qos();
//!
//! let auth = AuthenticationBuiltIn::new();
//! let local = auth.validate_local_identity(0, &qos, Guid::participant(prefix))?;
//! let token = auth.get_identity_token(local.handle)?;
//! ```

pub mod authentication;
pub mod builtin;
pub mod challenge;
pub mod class_id;
pub mod config;
pub mod credentials;
pub mod error;
pub mod guid;
pub mod handle;
pub mod handshake;
pub mod identity;
pub mod qos;
mod store;
pub mod token;
pub mod validation;

pub use authentication::{
    AuthenticationPlugin, HandshakeStart, HandshakeStep, LocalIdentity, RemoteIdentity,
};
pub use builtin::{AuthenticationBuiltIn, AuthenticationBuiltInBuilder};
pub use challenge::{ChallengeSource, SystemChallengeSource, CHALLENGE_LEN};
pub use class_id::{HandshakePhase, AUTH_TOKEN_CLASS_ID};
pub use config::{AuthConfig, AuthConfigBuilder, CredentialUri};
pub use credentials::{CertificateInfo, CredentialLoader, LocalCredentials, X509CredentialLoader};
pub use error::{AuthError, ErrorCategory, SecurityException};
pub use guid::Guid;
pub use handle::{
    HandleAllocator, HandshakeHandle, IdentityHandle, SequentialAllocator, SharedSecretHandle,
};
pub use handshake::{is_handshake_initiator, SharedSecret, SharedSecretRef};
pub use qos::{ParticipantQos, PropertyQos};
pub use token::{BinaryProperty, Property, Token, TokenWriter};
pub use validation::ValidationResult;
