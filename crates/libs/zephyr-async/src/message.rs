use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::notice::{Kind, UniqueId};

/// The two historical body conventions of the protocol.
///
/// They are incompatible, so the active convention is configured explicitly
/// per client and never guessed from payload shape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyEncoding {
    /// The body is an ordered sequence of NUL-separated segments.
    #[default]
    NulSegments,
    /// The first NUL-terminated run is a signature, the remainder the
    /// message text.
    SignatureMessage,
}

/// Decoded notice body, one variant per [`BodyEncoding`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Body {
    Segments(Vec<String>),
    Signed { signature: String, message: String },
}

/// A decoded notice, as delivered on the message event stream.
///
/// Constructed once per received notice, handed to the stream, then
/// discarded; there is no identity beyond that single delivery.
/// `other_fields` is `None` when the wire count was zero — absent and empty
/// are distinct to callers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
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
    pub other_fields: Option<Vec<String>>,
    pub kind: Kind,
    pub time: i64,
    pub auth: i32,
    pub sender_addr: Ipv4Addr,
    pub uid: UniqueId,
    /// Resolved sender hostname, or the literal address on lookup failure.
    pub from_host: String,
    pub body: Body,
}

/// Acknowledgment handling for a send.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AckMode {
    /// Fire and forget; no identifiers are collected.
    #[default]
    None,
    /// Request acknowledgment and return the unique ids of the packets
    /// placed on the wire, in send order.
    Wait,
}

/// Outgoing message configuration.
///
/// Unset fields fall back to the protocol defaults: class `MESSAGE`,
/// instance `PERSONAL`, everything else empty. `body` feeds the
/// [`BodyEncoding::NulSegments`] convention; `signature`/`message` feed
/// [`BodyEncoding::SignatureMessage`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SendOptions {
    pub class: Option<String>,
    pub instance: Option<String>,
    pub recipient: Option<String>,
    pub opcode: Option<String>,
    pub format: Option<String>,
    pub signature: Option<String>,
    pub message: Option<String>,
    pub body: Vec<String>,
}
