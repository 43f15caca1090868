// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Authentication configuration
//!
//! The plugin reads its credentials from the participant PROPERTY QoS, using
//! the standard DDS Security property names:
//!
//! | Property | Content |
//! |----------|---------|
//! | `dds.sec.auth.identity_ca` | CA certificate (PEM) |
//! | `dds.sec.auth.identity_certificate` | participant certificate (PEM) |
//! | `dds.sec.auth.private_key` | participant private key (PEM) |
//! | `dds.sec.auth.password` | optional key password |
//!
//! Each value is a URI: `file:<path>` or `data:,<inline PEM>`.
//!
//! # Example
//!
//! ```ignore
//! use hdds_auth::AuthConfig;
//!
//! let qos = AuthConfig::builder()
//!     .identity_ca("file:certs/ca.pem")
//!     .identity_certificate("file:certs/participant1.pem")
//!     .private_key("file:certs/participant1_key.pem")
//!     .build()?
//!     .to_participant_qos();
//! ```

use std::fs;
use std::path::PathBuf;

use crate::error::AuthError;
use crate::qos::{ParticipantQos, PropertyQos};

pub const PROPERTY_IDENTITY_CA: &str = "dds.sec.auth.identity_ca";
pub const PROPERTY_IDENTITY_CERTIFICATE: &str = "dds.sec.auth.identity_certificate";
pub const PROPERTY_PRIVATE_KEY: &str = "dds.sec.auth.private_key";
pub const PROPERTY_PASSWORD: &str = "dds.sec.auth.password";

/// Location of a PEM blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialUri {
    /// `file:<path>`
    File(PathBuf),
    /// `data:,<content>`
    Data(String),
}

impl CredentialUri {
    pub fn parse(uri: &str) -> Result<Self, AuthError> {
        if let Some(path) = uri.strip_prefix("file:") {
            if path.is_empty() {
                return Err(AuthError::Config(format!("empty file URI {:?}", uri)));
            }
            Ok(Self::File(PathBuf::from(path)))
        } else if let Some(data) = uri.strip_prefix("data:,") {
            Ok(Self::Data(data.to_string()))
        } else {
            Err(AuthError::Config(format!(
                "unsupported credential URI {:?} (expected file: or data:,)",
                uri
            )))
        }
    }

    /// Read the referenced bytes.
    pub fn load(&self) -> Result<Vec<u8>, AuthError> {
        match self {
            Self::File(path) => fs::read(path).map_err(|e| {
                AuthError::Credentials(format!("cannot read {}: {}", path.display(), e))
            }),
            Self::Data(data) => Ok(data.as_bytes().to_vec()),
        }
    }
}

/// Credential locations for one local participant.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config-loaders", derive(serde::Deserialize))]
pub struct AuthConfig {
    /// CA certificate URI
    pub identity_ca: String,

    /// Participant certificate URI
    pub identity_certificate: String,

    /// Participant private key URI
    pub private_key: String,

    /// Private key password, if the key is encrypted
    #[cfg_attr(feature = "config-loaders", serde(default))]
    pub password: Option<String>,
}

impl AuthConfig {
    pub fn builder() -> AuthConfigBuilder {
        AuthConfigBuilder::default()
    }

    /// Read the `dds.sec.auth.*` properties.
    ///
    /// # Errors
    ///
    /// [`AuthError::Credentials`] naming the first missing property.
    pub fn from_property_qos(properties: &PropertyQos) -> Result<Self, AuthError> {
        let required = |name: &str| {
            properties
                .get(name)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or_else(|| AuthError::Credentials(format!("missing property {}", name)))
        };

        Ok(Self {
            identity_ca: required(PROPERTY_IDENTITY_CA)?,
            identity_certificate: required(PROPERTY_IDENTITY_CERTIFICATE)?,
            private_key: required(PROPERTY_PRIVATE_KEY)?,
            password: properties.get(PROPERTY_PASSWORD).map(str::to_string),
        })
    }

    pub fn to_property_qos(&self) -> PropertyQos {
        let mut properties = PropertyQos::new()
            .with(PROPERTY_IDENTITY_CA, self.identity_ca.as_str())
            .with(
                PROPERTY_IDENTITY_CERTIFICATE,
                self.identity_certificate.as_str(),
            )
            .with(PROPERTY_PRIVATE_KEY, self.private_key.as_str());
        if let Some(password) = &self.password {
            properties.set(PROPERTY_PASSWORD, password.as_str());
        }
        properties
    }

    pub fn to_participant_qos(&self) -> ParticipantQos {
        ParticipantQos::with_properties(self.to_property_qos())
    }

    /// Load from a YAML document with the field names of this struct.
    ///
    /// ```yaml
    /// identity_ca: file:certs/ca.pem
    /// identity_certificate: file:certs/p1.pem
    /// private_key: file:certs/p1_key.pem
    /// ```
    #[cfg(feature = "config-loaders")]
    pub fn from_yaml_str(yaml: &str) -> Result<Self, AuthError> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| AuthError::Config(format!("invalid YAML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "config-loaders")]
    pub fn from_yaml_file(path: impl AsRef<std::path::Path>) -> Result<Self, AuthError> {
        let path = path.as_ref();
        let yaml = fs::read_to_string(path)
            .map_err(|e| AuthError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_yaml_str(&yaml)
    }

    /// Check every URI is well formed. Content is checked at load time.
    pub fn validate(&self) -> Result<(), AuthError> {
        CredentialUri::parse(&self.identity_ca)?;
        CredentialUri::parse(&self.identity_certificate)?;
        CredentialUri::parse(&self.private_key)?;
        Ok(())
    }
}

/// Builder for [`AuthConfig`].
///
/// `identity_ca`, `identity_certificate` and `private_key` are required.
#[derive(Debug, Default)]
pub struct AuthConfigBuilder {
    identity_ca: Option<String>,
    identity_certificate: Option<String>,
    private_key: Option<String>,
    password: Option<String>,
}

impl AuthConfigBuilder {
    pub fn identity_ca(mut self, uri: impl Into<String>) -> Self {
        self.identity_ca = Some(uri.into());
        self
    }

    pub fn identity_certificate(mut self, uri: impl Into<String>) -> Self {
        self.identity_certificate = Some(uri.into());
        self
    }

    pub fn private_key(mut self, uri: impl Into<String>) -> Self {
        self.private_key = Some(uri.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn build(self) -> Result<AuthConfig, AuthError> {
        let config = AuthConfig {
            identity_ca: self
                .identity_ca
                .ok_or_else(|| AuthError::Config("identity_ca not set".to_string()))?,
            identity_certificate: self
                .identity_certificate
                .ok_or_else(|| AuthError::Config("identity_certificate not set".to_string()))?,
            private_key: self
                .private_key
                .ok_or_else(|| AuthError::Config("private_key not set".to_string()))?,
            password: self.password,
        };
        config.validate()?;
        Ok(config)
    }
}
