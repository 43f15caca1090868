// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Participant QoS subset consumed by local identity validation.

pub use crate::token::Property;

/// PROPERTY QoS policy: ordered name/value list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyQos {
    pub value: Vec<Property>,
}

impl PropertyQos {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a property (builder style).
    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Insert or replace `name`. New entries are not propagated.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.value.iter_mut().find(|p| p.name == name) {
            Some(existing) => existing.value = value,
            None => self.value.push(Property {
                name: name.to_string(),
                value,
                propagate: false,
            }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.value
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }
}

/// DomainParticipantQos as far as the authentication plugin cares.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParticipantQos {
    pub property: PropertyQos,
}

impl ParticipantQos {
    pub fn with_properties(property: PropertyQos) -> Self {
        Self { property }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replaces_existing() {
        let mut qos = PropertyQos::new().with("a", "1").with("b", "2");
        qos.set("a", "3");
        assert_eq!(qos.get("a"), Some("3"));
        assert_eq!(qos.get("b"), Some("2"));
        assert_eq!(qos.get("c"), None);
        assert_eq!(qos.value.len(), 2);
        assert!(qos.value.iter().all(|p| !p.propagate));
    }
}
