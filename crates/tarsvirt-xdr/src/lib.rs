//! XDR (RFC 4506) encoding for the libvirt remote protocol.
//!
//! Wire structs are plain serde types; this crate maps the serde data model
//! onto XDR:
//!
//! | serde | XDR |
//! |---|---|
//! | `bool`, `u8`, `u16`, `u32`, `i8`, `i16`, `i32` | 4-byte big-endian word |
//! | `u64`, `i64` | 8-byte hyper |
//! | `String`, `&str`, bytes | length-prefixed, zero padded to 4 bytes |
//! | `Option<T>` | pointer: `0` or `1` followed by `T` |
//! | `Vec<T>` | variable-length array: count then elements |
//! | struct, tuple | fields in order, no framing |
//! | unit enum | `i32` discriminant |
//! | [`Uuid`] | 16 raw bytes |

mod de;
mod error;
mod ser;
mod uuid;

pub use de::Decoder;
pub use error::{Error, Result};
pub use ser::Encoder;
pub use uuid::Uuid;

use serde::{de::DeserializeOwned, Serialize};

/// Encode `value` into a fresh buffer.
pub fn to_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut encoder = Encoder::new();
    value.serialize(&mut encoder)?;
    Ok(encoder.into_inner())
}

/// Decode a `T` from `bytes`.
///
/// Trailing bytes are an error: a reply that is longer than its declared
/// type means the two sides disagree about the procedure.
pub fn from_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut decoder = Decoder::new(bytes);
    let value = T::deserialize(&mut decoder)?;
    match decoder.remaining() {
        0 => Ok(value),
        n => Err(Error::TrailingData(n)),
    }
}

/// Like [`from_bytes`], but ignores anything after the decoded value.
pub fn from_bytes_prefix<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut decoder = Decoder::new(bytes);
    T::deserialize(&mut decoder)
}

/// Bytes of zero padding that follow `len` bytes of opaque data.
pub(crate) fn padding(len: usize) -> usize {
    (4 - len % 4) % 4
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn test_padding() {
        assert_eq!(padding(0), 0);
        assert_eq!(padding(1), 3);
        assert_eq!(padding(4), 0);
        assert_eq!(padding(7), 1);
    }

    #[test]
    fn test_trailing_data_rejected() {
        let err = from_bytes::<u32>(&[0, 0, 0, 1, 0, 0, 0, 2]).unwrap_err();
        assert!(matches!(err, Error::TrailingData(4)));
        assert_eq!(from_bytes_prefix::<u32>(&[0, 0, 0, 1, 0, 0, 0, 2]).unwrap(), 1);
    }

    #[test]
    fn test_nested_wire_struct() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Addr {
            kind: i32,
            addr: String,
            prefix: u32,
        }

        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Iface {
            name: String,
            hwaddr: Option<String>,
            addrs: Vec<Addr>,
        }

        let iface = Iface {
            name: "eth0".into(),
            hwaddr: None,
            addrs: vec![Addr {
                kind: 0,
                addr: "10.0.0.5".into(),
                prefix: 24,
            }],
        };

        let bytes = to_bytes(&iface).unwrap();
        assert_eq!(
            bytes,
            vec![
                0, 0, 0, 4, b'e', b't', b'h', b'0', // name
                0, 0, 0, 0, // hwaddr: null
                0, 0, 0, 1, // addrs count
                0, 0, 0, 0, // kind
                0, 0, 0, 8, b'1', b'0', b'.', b'0', b'.', b'0', b'.', b'5', // addr
                0, 0, 0, 24, // prefix
            ]
        );
        assert_eq!(from_bytes::<Iface>(&bytes).unwrap(), iface);
    }
}
