// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Local credentials
//!
//! Loads the participant certificate, CA certificate and private key named
//! by the participant properties, and derives the adjusted participant GUID
//! (DDS Security v1.1 Sec.9.3.3):
//!
//! ```text
//! bit  0       : 1
//! bits 1..48   : first 47 bits of SHA-256(certificate subject name)
//! bits 48..96  : first 48 bits of SHA-256(candidate GUID prefix)
//! bits 96..128 : candidate entity id
//! ```

use std::fmt;

use ring::digest::{digest, SHA256};
use ring::signature::{self, UnparsedPublicKey};
use x509_parser::oid_registry::{OID_KEY_TYPE_EC_PUBLIC_KEY, OID_PKCS1_RSAENCRYPTION};
use x509_parser::prelude::*;

use crate::config::{AuthConfig, CredentialUri};
use crate::error::AuthError;
use crate::guid::Guid;
use crate::qos::ParticipantQos;

/// Subject and key algorithm of one certificate.
#[derive(Clone, PartialEq, Eq)]
pub struct CertificateInfo {
    subject_name: String,
    algorithm: String,
    der: Vec<u8>,
}

impl CertificateInfo {
    pub fn new(subject_name: impl Into<String>, algorithm: impl Into<String>, der: Vec<u8>) -> Self {
        Self {
            subject_name: subject_name.into(),
            algorithm: algorithm.into(),
            der,
        }
    }

    /// Parse the first certificate of a PEM blob.
    pub fn from_pem(pem_data: &[u8]) -> Result<Self, AuthError> {
        let blocks = ::pem::parse_many(pem_data)
            .map_err(|e| AuthError::Credentials(format!("failed to parse PEM: {}", e)))?;
        let block = blocks
            .into_iter()
            .find(|b| b.tag() == "CERTIFICATE")
            .ok_or_else(|| AuthError::Credentials("no CERTIFICATE block in PEM".to_string()))?;
        Self::from_der(block.contents().to_vec())
    }

    pub fn from_der(der: Vec<u8>) -> Result<Self, AuthError> {
        let (subject_name, algorithm) = {
            let (_, cert) = X509Certificate::from_der(&der).map_err(|e| {
                AuthError::Credentials(format!("failed to parse X.509 certificate: {:?}", e))
            })?;
            (cert.subject().to_string(), key_algorithm_name(&cert))
        };
        Ok(Self {
            subject_name,
            algorithm,
            der,
        })
    }

    /// Subject distinguished name, e.g. `CN=participant1, O=Example`.
    pub fn subject_name(&self) -> &str {
        &self.subject_name
    }

    /// Key algorithm as named in identity tokens (`RSA-2048`, `EC-prime256v1`).
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn der(&self) -> &[u8] {
        &self.der
    }
}

impl fmt::Debug for CertificateInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CertificateInfo")
            .field("subject_name", &self.subject_name)
            .field("algorithm", &self.algorithm)
            .field("der_len", &self.der.len())
            .finish()
    }
}

fn key_algorithm_name(cert: &X509Certificate<'_>) -> String {
    let oid = &cert.public_key().algorithm.algorithm;
    if *oid == OID_PKCS1_RSAENCRYPTION {
        "RSA-2048".to_string()
    } else if *oid == OID_KEY_TYPE_EC_PUBLIC_KEY {
        "EC-prime256v1".to_string()
    } else {
        oid.to_id_string()
    }
}

/// Credential material of one local participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalCredentials {
    participant: CertificateInfo,
    ca: CertificateInfo,
}

impl LocalCredentials {
    pub fn new(participant: CertificateInfo, ca: CertificateInfo) -> Self {
        Self { participant, ca }
    }

    pub fn participant_cert(&self) -> &CertificateInfo {
        &self.participant
    }

    pub fn ca_cert(&self) -> &CertificateInfo {
        &self.ca
    }

    /// Bind the candidate GUID to this participant's certificate.
    ///
    /// # Errors
    ///
    /// [`AuthError::GuidAdjustment`] if the candidate is GUID_UNKNOWN or the
    /// certificate has an empty subject.
    pub fn adjusted_guid(&self, candidate: Guid) -> Result<Guid, AuthError> {
        if candidate.is_zero() {
            return Err(AuthError::GuidAdjustment(
                "candidate GUID is GUID_UNKNOWN".to_string(),
            ));
        }
        if self.participant.subject_name.is_empty() {
            return Err(AuthError::GuidAdjustment(
                "participant certificate has an empty subject".to_string(),
            ));
        }

        let subject_hash = digest(&SHA256, self.participant.subject_name.as_bytes());
        let candidate_hash = digest(&SHA256, &candidate.prefix);

        let mut head = [0u8; 8];
        head[2..8].copy_from_slice(&subject_hash.as_ref()[0..6]);
        let bits = (u64::from_be_bytes(head) >> 1) | (1 << 47);

        let mut prefix = [0u8; 12];
        prefix[0..6].copy_from_slice(&bits.to_be_bytes()[2..8]);
        prefix[6..12].copy_from_slice(&candidate_hash.as_ref()[0..6]);

        Ok(Guid::new(prefix, candidate.entity_id))
    }
}

/// Produces local credentials from participant QoS.
pub trait CredentialLoader: Send + Sync {
    fn load(&self, qos: &ParticipantQos) -> Result<LocalCredentials, AuthError>;
}

impl<F> CredentialLoader for F
where
    F: Fn(&ParticipantQos) -> Result<LocalCredentials, AuthError> + Send + Sync,
{
    fn load(&self, qos: &ParticipantQos) -> Result<LocalCredentials, AuthError> {
        self(qos)
    }
}

/// Loads PEM credentials from the `dds.sec.auth.*` properties and checks the
/// participant certificate against the CA.
#[derive(Debug, Default, Clone, Copy)]
pub struct X509CredentialLoader;

impl CredentialLoader for X509CredentialLoader {
    fn load(&self, qos: &ParticipantQos) -> Result<LocalCredentials, AuthError> {
        let config = AuthConfig::from_property_qos(&qos.property)?;

        let ca_pem = CredentialUri::parse(&config.identity_ca)?.load()?;
        let cert_pem = CredentialUri::parse(&config.identity_certificate)?.load()?;
        let key_pem = CredentialUri::parse(&config.private_key)?.load()?;

        let ca = CertificateInfo::from_pem(&ca_pem)?;
        let participant = CertificateInfo::from_pem(&cert_pem)?;
        check_private_key(&key_pem, config.password.as_deref())?;
        validate_certificate_chain(participant.der(), ca.der())?;

        log::debug!(
            "[auth] Loaded credentials for {:?} (CA {:?})",
            participant.subject_name(),
            ca.subject_name()
        );
        Ok(LocalCredentials::new(participant, ca))
    }
}

fn check_private_key(key_pem: &[u8], password: Option<&str>) -> Result<(), AuthError> {
    let block = ::pem::parse(key_pem)
        .map_err(|e| AuthError::Credentials(format!("failed to parse private key PEM: {}", e)))?;
    match block.tag() {
        "ENCRYPTED PRIVATE KEY" if password.is_none() => Err(AuthError::Credentials(
            "private key is encrypted but no password is configured".to_string(),
        )),
        tag if tag.ends_with("PRIVATE KEY") && !block.contents().is_empty() => Ok(()),
        tag => Err(AuthError::Credentials(format!(
            "unexpected PEM block {:?} for private key",
            tag
        ))),
    }
}

/// Check validity window, issuer name and CA signature of the participant
/// certificate.
fn validate_certificate_chain(cert_der: &[u8], ca_der: &[u8]) -> Result<(), AuthError> {
    let (_, cert) = X509Certificate::from_der(cert_der)
        .map_err(|e| AuthError::Credentials(format!("failed to parse certificate: {:?}", e)))?;
    let (_, ca) = X509Certificate::from_der(ca_der)
        .map_err(|e| AuthError::Credentials(format!("failed to parse CA certificate: {:?}", e)))?;

    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);
    if now < cert.validity().not_before.timestamp() {
        return Err(AuthError::Credentials(
            "certificate not yet valid (notBefore)".to_string(),
        ));
    }
    if now > cert.validity().not_after.timestamp() {
        return Err(AuthError::Credentials("certificate expired".to_string()));
    }

    if cert.issuer() != ca.subject() {
        return Err(AuthError::Credentials(format!(
            "certificate issuer {} does not match CA subject {}",
            cert.issuer(),
            ca.subject()
        )));
    }

    let ca_key = &ca.public_key().subject_public_key.data;
    let signature = cert.signature_value.as_ref();
    let tbs = cert.tbs_certificate.as_ref();

    let rsa_key = UnparsedPublicKey::new(&signature::RSA_PKCS1_2048_8192_SHA256, ca_key.as_ref());
    if rsa_key.verify(tbs, signature).is_ok() {
        return Ok(());
    }
    let ecdsa_key = UnparsedPublicKey::new(&signature::ECDSA_P256_SHA256_ASN1, ca_key.as_ref());
    if ecdsa_key.verify(tbs, signature).is_ok() {
        return Ok(());
    }

    Err(AuthError::Credentials(
        "certificate signature verification failed (tried RSA and ECDSA P-256)".to_string(),
    ))
}
