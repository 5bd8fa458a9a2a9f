use std::fmt;
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

/// Authentication status values carried in [`Notice::auth`].
pub const AUTH_YES: i32 = 1;
pub const AUTH_NO: i32 = 0;
pub const AUTH_FAILED: i32 = -1;

/// Delivery-semantics tag of a notice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Kind {
    Unsafe,
    Unacked,
    Acked,
    Hmack,
    Hmctl,
    Servack,
    Servnak,
    Clientack,
    Stat,
}

impl Kind {
    /// Maps the wire-level integer to a kind.
    pub fn from_wire(value: i32) -> Option<Kind> {
        match value {
            0 => Some(Kind::Unsafe),
            1 => Some(Kind::Unacked),
            2 => Some(Kind::Acked),
            3 => Some(Kind::Hmack),
            4 => Some(Kind::Hmctl),
            5 => Some(Kind::Servack),
            6 => Some(Kind::Servnak),
            7 => Some(Kind::Clientack),
            8 => Some(Kind::Stat),
            _ => None,
        }
    }

    pub fn as_wire(self) -> i32 {
        match self {
            Kind::Unsafe => 0,
            Kind::Unacked => 1,
            Kind::Acked => 2,
            Kind::Hmack => 3,
            Kind::Hmctl => 4,
            Kind::Servack => 5,
            Kind::Servnak => 6,
            Kind::Clientack => 7,
            Kind::Stat => 8,
        }
    }
}

/// Send-time authentication selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthMode {
    #[default]
    Auth,
    NoAuth,
}

/// 128-bit identifier assigned to an outgoing packet by the port library,
/// used to correlate a later acknowledgment with the original send.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UniqueId(pub [u8; 16]);

impl UniqueId {
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for UniqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// One wire-level notice, as handed over (or accepted) by the port library.
///
/// `other_fields` carries the auxiliary fields; the wire-level count is the
/// vector length. `message` is the raw body as a byte count — it may contain
/// embedded NUL separators, so its length is not a string length.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub version: String,
    pub packet: String,
    pub port: u16,
    pub checked_auth: i32,
    pub authent_len: i32,
    pub ascii_authent: String,
    pub class: String,
    pub instance: String,
    pub opcode: String,
    pub sender: String,
    pub recipient: String,
    pub format: String,
    pub other_fields: Vec<String>,
    pub kind: Kind,
    /// Send timestamp, epoch milliseconds.
    pub time: i64,
    pub auth: i32,
    pub sender_addr: Ipv4Addr,
    pub uid: UniqueId,
    pub message: Vec<u8>,
}

impl Default for Notice {
    fn default() -> Self {
        Self {
            version: String::new(),
            packet: String::new(),
            port: 0,
            checked_auth: 0,
            authent_len: 0,
            ascii_authent: String::new(),
            class: String::new(),
            instance: String::new(),
            opcode: String::new(),
            sender: String::new(),
            recipient: String::new(),
            format: String::new(),
            other_fields: Vec::new(),
            kind: Kind::Unacked,
            time: 0,
            auth: AUTH_NO,
            sender_addr: Ipv4Addr::UNSPECIFIED,
            uid: UniqueId::default(),
            message: Vec::new(),
        }
    }
}
