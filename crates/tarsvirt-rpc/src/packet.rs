//! libvirt RPC message framing.
//!
//! ```plaintext
//! +------------+------------+------------+------------+
//! | length (4) | program(4) | version(4) |procedure(4)|
//! +------------+------------+------------+------------+
//! |  type (4)  | serial (4) | status (4) |   payload  |
//! +------------+------------+------------+------------+
//! ```
//!
//! Big-endian throughout. `length` counts itself.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::remote::{Procedure, REMOTE_PROGRAM, REMOTE_PROTOCOL_VERSION};

/// Header size in bytes, length word excluded.
pub const HEADER_SIZE: usize = 24;

/// Largest message libvirtd will send (`VIR_NET_MESSAGE_MAX`, 32 MiB).
pub const MAX_PACKET_SIZE: usize = 32 * 1024 * 1024;

/// Message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum MessageType {
    Call = 0,
    Reply = 1,
    /// Asynchronous event pushed by the daemon.
    Message = 2,
    Stream = 3,
}

impl TryFrom<u32> for MessageType {
    type Error = PacketError;

    fn try_from(v: u32) -> Result<Self, PacketError> {
        match v {
            0 => Ok(Self::Call),
            1 => Ok(Self::Reply),
            2 => Ok(Self::Message),
            3 => Ok(Self::Stream),
            _ => Err(PacketError::InvalidMessageType(v)),
        }
    }
}

/// Reply status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Status {
    Ok = 0,
    /// Payload is a `remote_error`.
    Error = 1,
    Continue = 2,
}

impl TryFrom<u32> for Status {
    type Error = PacketError;

    fn try_from(v: u32) -> Result<Self, PacketError> {
        match v {
            0 => Ok(Status::Ok),
            1 => Ok(Status::Error),
            2 => Ok(Status::Continue),
            _ => Err(PacketError::InvalidStatus(v)),
        }
    }
}

/// One RPC message.
#[derive(Debug, Clone)]
pub struct Packet {
    pub program: u32,
    pub version: u32,
    pub procedure: u32,
    pub msg_type: MessageType,
    pub serial: i32,
    pub status: Status,
    pub payload: Bytes,
}

impl Packet {
    /// A call to `procedure` on the remote program.
    pub fn call(procedure: Procedure, serial: i32, payload: Bytes) -> Self {
        Self {
            program: REMOTE_PROGRAM,
            version: REMOTE_PROTOCOL_VERSION,
            procedure: procedure as u32,
            msg_type: MessageType::Call,
            serial,
            status: Status::Ok,
            payload,
        }
    }

    /// Encode with the length word in front.
    pub fn encode(&self) -> Result<BytesMut, PacketError> {
        let total_len = 4 + HEADER_SIZE + self.payload.len();
        if total_len > MAX_PACKET_SIZE {
            return Err(PacketError::TooLarge(total_len));
        }

        let mut buf = BytesMut::with_capacity(total_len);
        buf.put_u32(total_len as u32);
        buf.put_u32(self.program);
        buf.put_u32(self.version);
        buf.put_u32(self.procedure);
        buf.put_u32(self.msg_type as u32);
        buf.put_i32(self.serial);
        buf.put_u32(self.status as u32);
        buf.extend_from_slice(&self.payload);
        Ok(buf)
    }

    /// Decode a message body, i.e. everything after the length word.
    pub fn decode(mut data: Bytes) -> Result<Self, PacketError> {
        if data.len() < HEADER_SIZE {
            return Err(PacketError::TooShort(data.len()));
        }

        let program = data.get_u32();
        let version = data.get_u32();
        let procedure = data.get_u32();
        let msg_type = MessageType::try_from(data.get_u32())?;
        let serial = data.get_i32();
        let status = Status::try_from(data.get_u32())?;

        if program != REMOTE_PROGRAM {
            return Err(PacketError::UnknownProgram(program));
        }

        Ok(Self {
            program,
            version,
            procedure,
            msg_type,
            serial,
            status,
            payload: data,
        })
    }
}

/// Framing errors.
#[derive(Debug, thiserror::Error)]
pub enum PacketError {
    #[error("packet too short: {0} bytes")]
    TooShort(usize),
    #[error("invalid message type: {0}")]
    InvalidMessageType(u32),
    #[error("invalid status: {0}")]
    InvalidStatus(u32),
    #[error("unknown program {0:#x}")]
    UnknownProgram(u32),
    #[error("packet too large: {0} bytes")]
    TooLarge(usize),
}
