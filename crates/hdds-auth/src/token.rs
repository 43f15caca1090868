// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Property-list tokens (DDS Security DataHolder)
//!
//! Identity tokens, auth requests and handshake messages are all a class id
//! plus an ordered list of named string properties and an ordered list of
//! named binary properties. Only properties marked `propagate` go on the wire.
//!
//! # Wire Format
//!
//! ```text
//! [u32 len | class_id utf8]
//! [u32 count] { [u32 len | name] [u32 len | value utf8] }*
//! [u32 count] { [u32 len | name] [u32 len | value bytes] }*
//! ```
//!
//! All integers are little-endian.

use std::convert::TryFrom;

use crate::error::AuthError;

/// Named UTF-8 property.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub value: String,
    pub propagate: bool,
}

/// Named binary property.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BinaryProperty {
    pub name: String,
    pub value: Vec<u8>,
    pub propagate: bool,
}

/// Class id plus ordered properties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Token {
    pub class_id: String,
    pub properties: Vec<Property>,
    pub binary_properties: Vec<BinaryProperty>,
}

impl Token {
    /// TokenNIL: empty class id, no properties.
    pub fn nil() -> Self {
        Self::default()
    }

    pub fn is_nil(&self) -> bool {
        self.class_id.is_empty() && self.properties.is_empty() && self.binary_properties.is_empty()
    }

    /// Value of the first string property named `name`.
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }

    /// Value of the first binary property named `name`.
    pub fn binary_property(&self, name: &str) -> Option<&[u8]> {
        self.binary_properties
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_slice())
    }

    /// Serialize the propagated properties.
    pub fn to_bytes(&self) -> Result<Vec<u8>, AuthError> {
        let mut buffer = Vec::with_capacity(64);
        write_field(&mut buffer, self.class_id.as_bytes())?;

        let props: Vec<_> = self.properties.iter().filter(|p| p.propagate).collect();
        write_len(&mut buffer, props.len())?;
        for prop in props {
            write_field(&mut buffer, prop.name.as_bytes())?;
            write_field(&mut buffer, prop.value.as_bytes())?;
        }

        let bin_props: Vec<_> = self
            .binary_properties
            .iter()
            .filter(|p| p.propagate)
            .collect();
        write_len(&mut buffer, bin_props.len())?;
        for prop in bin_props {
            write_field(&mut buffer, prop.name.as_bytes())?;
            write_field(&mut buffer, &prop.value)?;
        }

        Ok(buffer)
    }

    /// Parse a token produced by [`Token::to_bytes`]. Every decoded property
    /// is marked `propagate`.
    pub fn from_bytes(data: &[u8]) -> Result<Self, AuthError> {
        let mut reader = Reader { data, pos: 0 };
        let class_id = reader.read_string("class_id")?;

        let count = reader.read_len()?;
        let mut properties = Vec::with_capacity(count.min(64));
        for _ in 0..count {
            properties.push(Property {
                name: reader.read_string("property name")?,
                value: reader.read_string("property value")?,
                propagate: true,
            });
        }

        let count = reader.read_len()?;
        let mut binary_properties = Vec::with_capacity(count.min(64));
        for _ in 0..count {
            binary_properties.push(BinaryProperty {
                name: reader.read_string("binary property name")?,
                value: reader.read_bytes()?.to_vec(),
                propagate: true,
            });
        }

        if reader.pos != data.len() {
            return Err(AuthError::InvalidToken(format!(
                "{} trailing bytes after token",
                data.len() - reader.pos
            )));
        }

        Ok(Self {
            class_id,
            properties,
            binary_properties,
        })
    }
}

/// Builds a token with a fixed number of properties set by index.
#[derive(Debug)]
pub struct TokenWriter {
    token: Token,
}

impl TokenWriter {
    /// Token with `num_properties` string and `num_bin_properties` binary slots.
    pub fn new(
        class_id: impl Into<String>,
        num_properties: usize,
        num_bin_properties: usize,
    ) -> Self {
        Self {
            token: Token {
                class_id: class_id.into(),
                properties: vec![Property::default(); num_properties],
                binary_properties: vec![BinaryProperty::default(); num_bin_properties],
            },
        }
    }

    pub fn set_property(
        &mut self,
        index: usize,
        name: &str,
        value: impl Into<String>,
        propagate: bool,
    ) -> &mut Self {
        match self.token.properties.get_mut(index) {
            Some(slot) => {
                *slot = Property {
                    name: name.to_string(),
                    value: value.into(),
                    propagate,
                }
            }
            None => log::warn!(
                "[auth] Property {} ({}) out of range for token {}",
                index,
                name,
                self.token.class_id
            ),
        }
        self
    }

    pub fn set_bin_property(
        &mut self,
        index: usize,
        name: &str,
        value: impl Into<Vec<u8>>,
        propagate: bool,
    ) -> &mut Self {
        match self.token.binary_properties.get_mut(index) {
            Some(slot) => {
                *slot = BinaryProperty {
                    name: name.to_string(),
                    value: value.into(),
                    propagate,
                }
            }
            None => log::warn!(
                "[auth] Binary property {} ({}) out of range for token {}",
                index,
                name,
                self.token.class_id
            ),
        }
        self
    }

    pub fn finish(self) -> Token {
        self.token
    }
}

fn write_len(buffer: &mut Vec<u8>, len: usize) -> Result<(), AuthError> {
    let len = u32::try_from(len)
        .map_err(|_| AuthError::InvalidToken(format!("length {} exceeds u32", len)))?;
    buffer.extend_from_slice(&len.to_le_bytes());
    Ok(())
}

fn write_field(buffer: &mut Vec<u8>, bytes: &[u8]) -> Result<(), AuthError> {
    write_len(buffer, bytes.len())?;
    buffer.extend_from_slice(bytes);
    Ok(())
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn read_len(&mut self) -> Result<usize, AuthError> {
        let end = self.pos + 4;
        let bytes = self.data.get(self.pos..end).ok_or_else(|| {
            AuthError::InvalidToken(format!("truncated length at offset {}", self.pos))
        })?;
        self.pos = end;
        let len = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        usize::try_from(len).map_err(|_| AuthError::InvalidToken("length overflow".to_string()))
    }

    fn read_bytes(&mut self) -> Result<&'a [u8], AuthError> {
        let len = self.read_len()?;
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| {
                AuthError::InvalidToken(format!(
                    "field of {} bytes at offset {} exceeds token ({} bytes)",
                    len,
                    self.pos,
                    self.data.len()
                ))
            })?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn read_string(&mut self, what: &str) -> Result<String, AuthError> {
        let bytes = self.read_bytes()?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| AuthError::InvalidToken(format!("{} is not valid UTF-8", what)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Token {
        let mut writer = TokenWriter::new("DDS:Auth:PKI-DH:1.0+Req", 1, 2);
        writer
            .set_property(0, "dds.cert.sn", "CN=alice", true)
            .set_bin_property(0, "c.pdata", vec![1, 2, 3], true)
            .set_bin_property(1, "local.only", vec![9], false);
        writer.finish()
    }

    #[test]
    fn test_writer_sets_properties_by_index() {
        let token = sample();
        assert_eq!(token.properties.len(), 1);
        assert_eq!(token.binary_properties.len(), 2);
        assert_eq!(token.property("dds.cert.sn"), Some("CN=alice"));
        assert_eq!(token.binary_property("c.pdata"), Some(&[1u8, 2, 3][..]));
        assert_eq!(token.binary_property("missing"), None);
        assert!(!token.is_nil());
    }

    #[test]
    fn test_writer_ignores_out_of_range_index() {
        let mut writer = TokenWriter::new("x", 0, 1);
        writer.set_bin_property(3, "c.id", Vec::new(), true);
        let token = writer.finish();
        assert_eq!(token.binary_properties.len(), 1);
        assert!(token.binary_property("c.id").is_none());
    }

    #[test]
    fn test_nil_token() {
        assert!(Token::nil().is_nil());
        assert!(!TokenWriter::new("a", 0, 0).finish().is_nil());
    }

    #[test]
    fn test_wire_drops_local_properties() {
        let decoded = Token::from_bytes(&sample().to_bytes().expect("encode")).expect("decode");
        assert_eq!(decoded.class_id, "DDS:Auth:PKI-DH:1.0+Req");
        assert_eq!(decoded.property("dds.cert.sn"), Some("CN=alice"));
        assert_eq!(decoded.binary_property("c.pdata"), Some(&[1u8, 2, 3][..]));
        assert!(decoded.binary_property("local.only").is_none());
    }

    #[test]
    fn test_from_bytes_rejects_truncated_and_trailing() {
        let bytes = sample().to_bytes().expect("encode");
        assert!(Token::from_bytes(&bytes[..bytes.len() - 1]).is_err());
        assert!(Token::from_bytes(&[0x01, 0x02]).is_err());

        let mut trailing = bytes.clone();
        trailing.push(0);
        assert!(matches!(
            Token::from_bytes(&trailing),
            Err(AuthError::InvalidToken(_))
        ));

        // Length claims more data than present.
        let bogus = [0xFF, 0xFF, 0xFF, 0x7F, b'a'];
        assert!(Token::from_bytes(&bogus).is_err());
    }
}
