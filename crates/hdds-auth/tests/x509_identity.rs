// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test code readability over pedantic
#![allow(clippy::missing_panics_doc)] // Tests panic on failure

//! Local identity validation with real X.509 credentials.

use hdds_auth::{
    AuthConfig, AuthError, AuthenticationBuiltIn, AuthenticationPlugin, ErrorCategory, Guid,
    ParticipantQos,
};
use rcgen::{BasicConstraints, Certificate, CertificateParams, DnType, IsCa, KeyPair};

struct Ca {
    cert: Certificate,
    key: KeyPair,
}

fn make_ca(name: &str) -> Ca {
    let key = KeyPair::generate().expect("ca key");
    let mut params = CertificateParams::new(Vec::<String>::new()).expect("ca params");
    params.distinguished_name.push(DnType::CommonName, name);
    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    let cert = params.self_signed(&key).expect("ca cert");
    Ca { cert, key }
}

/// Participant certificate and key PEM, signed by `ca`.
fn make_participant(ca: &Ca, name: &str) -> (String, String) {
    let key = KeyPair::generate().expect("participant key");
    let mut params = CertificateParams::new(vec![format!("{}.example.com", name)]).expect("params");
    params.distinguished_name.push(DnType::CommonName, name);
    let cert = params.signed_by(&key, &ca.cert, &ca.key).expect("cert");
    (cert.pem(), key.serialize_pem())
}

fn inline_qos(ca_pem: &str, cert_pem: &str, key_pem: &str) -> ParticipantQos {
    AuthConfig::builder()
        .identity_ca(format!("data:,{}", ca_pem))
        .identity_certificate(format!("data:,{}", cert_pem))
        .private_key(format!("data:,{}", key_pem))
        .build()
        .expect("config")
        .to_participant_qos()
}

#[test]
fn test_validate_local_identity_with_ca_signed_certificate() {
    let ca = make_ca("Identity CA");
    let (cert_pem, key_pem) = make_participant(&ca, "participant1");
    let qos = inline_qos(&ca.cert.pem(), &cert_pem, &key_pem);

    let plugin = AuthenticationBuiltIn::new();
    let candidate = Guid::participant([0x42; 12]);
    let local = plugin
        .validate_local_identity(7, &qos, candidate)
        .expect("local identity");

    assert_ne!(local.adjusted_guid, candidate);
    assert_eq!(local.adjusted_guid.prefix[0] & 0x80, 0x80);
    assert_eq!(local.adjusted_guid.entity_id, candidate.entity_id);

    // Same credentials and candidate always give the same GUID.
    let again = plugin
        .validate_local_identity(7, &qos, candidate)
        .expect("local identity");
    assert_eq!(again.adjusted_guid, local.adjusted_guid);
    assert_ne!(again.handle, local.handle);

    let token = plugin.get_identity_token(local.handle).expect("token");
    assert!(token
        .property("dds.cert.sn")
        .is_some_and(|sn| sn.contains("CN=participant1")));
    assert!(token
        .property("dds.ca.sn")
        .is_some_and(|sn| sn.contains("CN=Identity CA")));
    assert_eq!(token.property("dds.cert.algo"), Some("EC-prime256v1"));
}

#[test]
fn test_certificate_from_another_ca_is_rejected() {
    let trusted = make_ca("Identity CA");
    let rogue = make_ca("Rogue CA");
    let (cert_pem, key_pem) = make_participant(&rogue, "intruder");
    let qos = inline_qos(&trusted.cert.pem(), &cert_pem, &key_pem);

    let plugin = AuthenticationBuiltIn::new();
    let err = plugin
        .validate_local_identity(0, &qos, Guid::participant([1; 12]))
        .expect_err("untrusted chain");
    assert!(matches!(err, AuthError::Credentials(_)));
    assert_eq!(err.to_exception().minor_code, ErrorCategory::Credentials as i32);
    assert_eq!(plugin.identity_count(), 0);
}

#[test]
fn test_missing_properties_are_reported() {
    let plugin = AuthenticationBuiltIn::new();
    let err = plugin
        .validate_local_identity(0, &ParticipantQos::default(), Guid::participant([1; 12]))
        .expect_err("no credentials configured");
    assert!(err.to_string().contains("dds.sec.auth.identity_ca"));
}

#[cfg(feature = "config-loaders")]
#[test]
fn test_yaml_config_with_pem_files() {
    let ca = make_ca("Identity CA");
    let (cert_pem, key_pem) = make_participant(&ca, "participant2");

    let dir = tempfile::tempdir().expect("tempdir");
    let write = |name: &str, content: &str| {
        let path = dir.path().join(name);
        std::fs::write(&path, content).expect("write");
        path
    };
    let ca_path = write("ca.pem", &ca.cert.pem());
    let cert_path = write("participant2.pem", &cert_pem);
    let key_path = write("participant2_key.pem", &key_pem);
    let yaml_path = write(
        "auth.yaml",
        &format!(
            "identity_ca: file:{}\nidentity_certificate: file:{}\nprivate_key: file:{}\n",
            ca_path.display(),
            cert_path.display(),
            key_path.display()
        ),
    );

    let config = AuthConfig::from_yaml_file(&yaml_path).expect("yaml config");
    let plugin = AuthenticationBuiltIn::new();
    let local = plugin
        .validate_local_identity(0, &config.to_participant_qos(), Guid::participant([2; 12]))
        .expect("local identity");
    let token = plugin.get_identity_token(local.handle).expect("token");
    assert!(token
        .property("dds.cert.sn")
        .is_some_and(|sn| sn.contains("participant2")));
}
