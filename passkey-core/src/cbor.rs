//! Minimal CBOR (RFC 8949) decoder for WebAuthn structures.
//!
//! Attestation objects and COSE keys only use a small subset of CBOR:
//! integers, byte/text strings, arrays, maps, tags and the `false`/`true`/
//! `null` simple values. Floats, indefinite lengths and other simple values
//! are rejected with [`WebAuthnError::UnsupportedEncoding`].
//!
//! The decoder works on a borrowed buffer and reports the offset just past
//! the decoded item, so callers can locate structures that follow an item
//! with no outer length (the COSE key inside authenticator data).

use indexmap::IndexMap;

use crate::error::{Result, WebAuthnError};

/// Maximum nesting of arrays, maps and tags.
const MAX_DEPTH: usize = 64;

/// One decoded CBOR data item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedItem {
    /// Major type 0.
    Unsigned(u64),
    /// Major type 1, already converted to `-1 - n`.
    Negative(i128),
    /// Major type 2.
    Bytes(Vec<u8>),
    /// Major type 3.
    Text(String),
    /// Major type 4.
    Array(Vec<DecodedItem>),
    /// Major type 5.
    Map(CborMap),
    /// Simple values 20 and 21.
    Bool(bool),
    /// Simple value 22.
    Null,
}

impl DecodedItem {
    /// Integer value of an unsigned or negative item.
    pub fn as_integer(&self) -> Option<i128> {
        match self {
            Self::Unsigned(value) => Some(i128::from(*value)),
            Self::Negative(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[DecodedItem]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&CborMap> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }
}

/// Key of a CBOR map entry.
///
/// CBOR allows any item as a key. WebAuthn only ever uses integers (COSE)
/// and text (attestation objects); scalar keys are accepted, composite keys
/// are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MapKey {
    Integer(i128),
    Bytes(Vec<u8>),
    Text(String),
    Bool(bool),
    Null,
}

impl TryFrom<DecodedItem> for MapKey {
    type Error = WebAuthnError;

    fn try_from(item: DecodedItem) -> Result<Self> {
        match item {
            DecodedItem::Unsigned(value) => Ok(Self::Integer(i128::from(value))),
            DecodedItem::Negative(value) => Ok(Self::Integer(value)),
            DecodedItem::Bytes(bytes) => Ok(Self::Bytes(bytes)),
            DecodedItem::Text(text) => Ok(Self::Text(text)),
            DecodedItem::Bool(value) => Ok(Self::Bool(value)),
            DecodedItem::Null => Ok(Self::Null),
            DecodedItem::Array(_) | DecodedItem::Map(_) => Err(WebAuthnError::UnsupportedEncoding(
                "composite map keys are not supported".into(),
            )),
        }
    }
}

/// Decoded CBOR map, preserving encounter order.
///
/// A repeated key overwrites the earlier value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CborMap {
    entries: IndexMap<MapKey, DecodedItem>,
}

impl CborMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &MapKey) -> Option<&DecodedItem> {
        self.entries.get(key)
    }

    /// Look up an integer key, as used by COSE (`1`, `3`, `-1`, ...).
    pub fn get_int(&self, key: i64) -> Option<&DecodedItem> {
        self.entries.get(&MapKey::Integer(i128::from(key)))
    }

    /// Look up a text key, as used by attestation objects (`"authData"`).
    pub fn get_text(&self, key: &str) -> Option<&DecodedItem> {
        self.entries.get(&MapKey::Text(key.to_owned()))
    }

    pub fn insert(&mut self, key: MapKey, value: DecodedItem) -> Option<DecodedItem> {
        self.entries.insert(key, value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MapKey, &DecodedItem)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &MapKey> {
        self.entries.keys()
    }
}

/// Decode exactly one item starting at `offset`.
///
/// Returns the item and the offset of the first byte after it.
pub fn decode(buffer: &[u8], offset: usize) -> Result<(DecodedItem, usize)> {
    Decoder { buffer }.item(offset, 0)
}

/// Decode exactly one item at the start of `buffer`.
pub fn decode_first(buffer: &[u8]) -> Result<(DecodedItem, usize)> {
    decode(buffer, 0)
}

struct Decoder<'a> {
    buffer: &'a [u8],
}

impl Decoder<'_> {
    fn item(&self, offset: usize, depth: usize) -> Result<(DecodedItem, usize)> {
        if depth > MAX_DEPTH {
            return Err(malformed(format!("nesting deeper than {MAX_DEPTH} levels")));
        }

        let initial = *self.buffer.get(offset).ok_or_else(|| {
            malformed(format!(
                "offset {offset} is past the end of a {}-byte buffer",
                self.buffer.len()
            ))
        })?;
        let major_type = initial >> 5;
        let additional_info = initial & 0x1f;
        let offset = offset + 1;

        match major_type {
            0 => {
                let (value, next) = self.argument(offset, additional_info)?;
                Ok((DecodedItem::Unsigned(value), next))
            }
            1 => {
                let (value, next) = self.argument(offset, additional_info)?;
                Ok((DecodedItem::Negative(-1 - i128::from(value)), next))
            }
            2 => {
                let (length, start) = self.argument(offset, additional_info)?;
                let end = self.span(start, length, "byte string")?;
                Ok((DecodedItem::Bytes(self.buffer[start..end].to_vec()), end))
            }
            3 => {
                let (length, start) = self.argument(offset, additional_info)?;
                let end = self.span(start, length, "text string")?;
                let text = std::str::from_utf8(&self.buffer[start..end])
                    .map_err(|_| malformed("text string is not valid UTF-8"))?;
                Ok((DecodedItem::Text(text.to_owned()), end))
            }
            4 => {
                let (count, mut cursor) = self.argument(offset, additional_info)?;
                let count = self.element_count(cursor, count, 1, "array")?;

                let mut items = Vec::with_capacity(count);
                for _ in 0..count {
                    let (item, next) = self.item(cursor, depth + 1)?;
                    items.push(item);
                    cursor = next;
                }
                Ok((DecodedItem::Array(items), cursor))
            }
            5 => {
                let (count, mut cursor) = self.argument(offset, additional_info)?;
                let count = self.element_count(cursor, count, 2, "map")?;

                let mut map = CborMap::new();
                for _ in 0..count {
                    let (key, next) = self.item(cursor, depth + 1)?;
                    let (value, next) = self.item(next, depth + 1)?;
                    map.insert(MapKey::try_from(key)?, value);
                    cursor = next;
                }
                Ok((DecodedItem::Map(map), cursor))
            }
            6 => {
                // Tag semantics are not modeled; return the tagged item.
                let (_tag, next) = self.argument(offset, additional_info)?;
                self.item(next, depth + 1)
            }
            7 => match additional_info {
                20 => Ok((DecodedItem::Bool(false), offset)),
                21 => Ok((DecodedItem::Bool(true), offset)),
                22 => Ok((DecodedItem::Null, offset)),
                other => Err(WebAuthnError::UnsupportedEncoding(format!(
                    "simple value with additional info {other}"
                ))),
            },
            other => Err(WebAuthnError::UnsupportedEncoding(format!(
                "major type {other}"
            ))),
        }
    }

    /// Read the length or integer argument that follows the initial byte.
    fn argument(&self, offset: usize, additional_info: u8) -> Result<(u64, usize)> {
        let width = match additional_info {
            0..=23 => return Ok((u64::from(additional_info), offset)),
            24 => 1,
            25 => 2,
            26 => 4,
            27 => 8,
            other => {
                return Err(WebAuthnError::UnsupportedEncoding(format!(
                    "additional info {other}"
                )))
            }
        };

        let bytes = offset
            .checked_add(width)
            .and_then(|end| self.buffer.get(offset..end))
            .ok_or_else(|| malformed(format!("{width}-byte argument runs past the end")))?;
        let value = bytes
            .iter()
            .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte));

        Ok((value, offset + width))
    }

    /// End offset of a `length`-byte string starting at `start`.
    fn span(&self, start: usize, length: u64, what: &str) -> Result<usize> {
        let remaining = self.buffer.len().saturating_sub(start);
        match usize::try_from(length) {
            Ok(length) if length <= remaining => Ok(start + length),
            _ => Err(malformed(format!(
                "{what} length {length} exceeds the remaining {remaining} bytes"
            ))),
        }
    }

    /// Reject element counts that cannot possibly fit, before allocating.
    fn element_count(
        &self,
        start: usize,
        count: u64,
        min_bytes_per_element: u64,
        what: &str,
    ) -> Result<usize> {
        let remaining = self.buffer.len().saturating_sub(start) as u64;
        match count.checked_mul(min_bytes_per_element) {
            Some(needed) if needed <= remaining => Ok(count as usize),
            _ => Err(malformed(format!(
                "{what} declares {count} elements but only {remaining} bytes remain"
            ))),
        }
    }
}

fn malformed(reason: impl Into<String>) -> WebAuthnError {
    WebAuthnError::MalformedInput(reason.into())
}
