//! Domain UUIDs.
//!
//! `remote_uuid` is `opaque[VIR_UUID_BUFLEN]`: sixteen raw bytes with no
//! length prefix. serde has no notion of fixed-length opaque data, so the
//! codec recognises the newtype name [`UUID_TOKEN`] and switches to raw mode.

use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Newtype name the encoder and decoder key on.
pub(crate) const UUID_TOKEN: &str = "$tarsvirt_xdr::Uuid";

/// Length of a libvirt UUID in bytes.
pub const UUID_LEN: usize = 16;

/// A libvirt domain UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Uuid(pub [u8; UUID_LEN]);

/// Canonical lowercase `8-4-4-4-12` form.
impl fmt::Display for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.0.iter().enumerate() {
            if matches!(i, 4 | 6 | 8 | 10) {
                f.write_str("-")?;
            }
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

struct RawBytes<'a>(&'a [u8]);

impl Serialize for RawBytes<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(self.0)
    }
}

impl Serialize for Uuid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_newtype_struct(UUID_TOKEN, &RawBytes(&self.0))
    }
}

impl<'de> Deserialize<'de> for Uuid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct UuidVisitor;

        impl<'de> de::Visitor<'de> for UuidVisitor {
            type Value = Uuid;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{} bytes of opaque data", UUID_LEN)
            }

            fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Uuid, E> {
                let arr: [u8; UUID_LEN] = v
                    .try_into()
                    .map_err(|_| E::invalid_length(v.len(), &self))?;
                Ok(Uuid(arr))
            }
        }

        deserializer.deserialize_newtype_struct(UUID_TOKEN, UuidVisitor)
    }
}
