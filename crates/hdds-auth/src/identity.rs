// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Identity records and their registry.

use std::sync::Arc;

use crate::credentials::LocalCredentials;
use crate::guid::Guid;
use crate::handle::IdentityHandle;
use crate::store::{HandleStore, Shared};
use crate::token::Token;

/// Local or remote side of an identity record.
#[derive(Debug, Clone)]
pub enum IdentityKind {
    /// Created by `validate_local_identity`.
    Local { credentials: Arc<LocalCredentials> },
    /// Created by `validate_remote_identity` against `local_handle`.
    Remote {
        local_handle: IdentityHandle,
        /// Credentials of `local_handle`, kept so the record stays usable
        /// after the local identity is released.
        local_credentials: Arc<LocalCredentials>,
        /// Auth request this side sent to the remote, if any.
        local_auth_request: Option<Token>,
        /// Auth request the remote sent us, if any.
        remote_auth_request: Option<Token>,
    },
}

/// One participant identity known to the plugin.
#[derive(Debug, Clone)]
pub struct IdentityRecord {
    pub participant_guid: Guid,
    pub kind: IdentityKind,
    pub permissions_credential_token: Option<Token>,
    pub permissions_token: Option<Token>,
}

impl IdentityRecord {
    pub fn local(participant_guid: Guid, credentials: Arc<LocalCredentials>) -> Self {
        Self {
            participant_guid,
            kind: IdentityKind::Local { credentials },
            permissions_credential_token: None,
            permissions_token: None,
        }
    }

    pub fn remote(
        participant_guid: Guid,
        local_handle: IdentityHandle,
        local_credentials: Arc<LocalCredentials>,
        local_auth_request: Option<Token>,
        remote_auth_request: Option<Token>,
    ) -> Self {
        Self {
            participant_guid,
            kind: IdentityKind::Remote {
                local_handle,
                local_credentials,
                local_auth_request,
                remote_auth_request,
            },
            permissions_credential_token: None,
            permissions_token: None,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self.kind, IdentityKind::Local { .. })
    }

    /// Local identity a remote record was validated against; `None` for local records.
    pub fn local_handle(&self) -> Option<IdentityHandle> {
        match self.kind {
            IdentityKind::Remote { local_handle, .. } => Some(local_handle),
            IdentityKind::Local { .. } => None,
        }
    }

    pub fn local_auth_request(&self) -> Option<&Token> {
        match &self.kind {
            IdentityKind::Remote {
                local_auth_request, ..
            } => local_auth_request.as_ref(),
            IdentityKind::Local { .. } => None,
        }
    }

    pub fn remote_auth_request(&self) -> Option<&Token> {
        match &self.kind {
            IdentityKind::Remote {
                remote_auth_request,
                ..
            } => remote_auth_request.as_ref(),
            IdentityKind::Local { .. } => None,
        }
    }

    /// Local credentials this record is bound to. For a remote record these
    /// are the credentials of the local identity it was validated against.
    pub fn credentials(&self) -> &Arc<LocalCredentials> {
        match &self.kind {
            IdentityKind::Local { credentials } => credentials,
            IdentityKind::Remote {
                local_credentials, ..
            } => local_credentials,
        }
    }
}

/// Identity handle -> record.
pub struct IdentityRegistry {
    store: HandleStore<IdentityRecord>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self {
            store: HandleStore::new(),
        }
    }

    pub fn insert(&self, handle: IdentityHandle, record: IdentityRecord) {
        self.store.insert(handle.raw(), record);
    }

    pub(crate) fn get(&self, handle: IdentityHandle) -> Option<Shared<IdentityRecord>> {
        self.store.get(handle.raw())
    }

    /// Copy of the record.
    pub fn snapshot(&self, handle: IdentityHandle) -> Option<IdentityRecord> {
        self.get(handle).map(|record| record.lock().clone())
    }

    pub fn contains(&self, handle: IdentityHandle) -> bool {
        self.store.contains(handle.raw())
    }

    /// Returns `false` if the handle was not registered.
    pub fn remove(&self, handle: IdentityHandle) -> bool {
        self.store.remove(handle.raw()).is_some()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for IdentityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::CertificateInfo;

    fn credentials() -> Arc<LocalCredentials> {
        Arc::new(LocalCredentials::new(
            CertificateInfo::new("CN=local", "EC-prime256v1", Vec::new()),
            CertificateInfo::new("CN=ca", "EC-prime256v1", Vec::new()),
        ))
    }

    #[test]
    fn test_local_record_has_no_back_reference() {
        let record = IdentityRecord::local(Guid::participant([1; 12]), credentials());
        assert!(record.is_local());
        assert_eq!(record.local_handle(), None);
        assert!(record.local_auth_request().is_none());
        assert_eq!(record.credentials().participant_cert().subject_name(), "CN=local");
    }

    #[test]
    fn test_remote_record_keeps_pairing() {
        let request = Token {
            class_id: "DDS:Auth:PKI-DH:1.0+AuthReq".to_string(),
            ..Token::default()
        };
        let record = IdentityRecord::remote(
            Guid::participant([2; 12]),
            IdentityHandle::from_raw(4),
            credentials(),
            Some(request.clone()),
            None,
        );
        assert!(!record.is_local());
        assert_eq!(record.local_handle(), Some(IdentityHandle::from_raw(4)));
        assert_eq!(record.local_auth_request(), Some(&request));
        assert!(record.remote_auth_request().is_none());
        assert_eq!(record.credentials().ca_cert().subject_name(), "CN=ca");
    }

    #[test]
    fn test_registry_lifecycle() {
        let registry = IdentityRegistry::new();
        let handle = IdentityHandle::from_raw(3);
        registry.insert(handle, IdentityRecord::local(Guid::zero(), credentials()));

        assert!(registry.contains(handle));
        assert_eq!(registry.len(), 1);

        if let Some(record) = registry.get(handle) {
            record.lock().permissions_token = Some(Token::nil());
        }
        let copy = registry.snapshot(handle).expect("registered");
        assert!(copy.permissions_token.is_some());

        assert!(registry.remove(handle));
        assert!(!registry.remove(handle));
        assert!(registry.snapshot(handle).is_none());
        assert!(registry.is_empty());
    }
}
