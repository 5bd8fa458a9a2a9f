//! Pure transform between wire-level notices and structured messages.

use crate::message::{AckMode, Body, BodyEncoding, Message, SendOptions};
use crate::notice::{Kind, Notice};
use crate::resolver::HostResolver;

/// Splits a raw body into its NUL-separated segments.
///
/// Zero-length segments are preserved (two adjacent NULs yield an empty
/// segment) and a trailing run without a terminating NUL is still emitted.
/// Non-UTF-8 runs are replaced lossily.
pub fn split_body(raw: &[u8]) -> Vec<String> {
    let mut segments = Vec::new();
    let mut offset = 0;
    while offset < raw.len() {
        let end = raw[offset..]
            .iter()
            .position(|&b| b == 0)
            .map(|pos| offset + pos)
            .unwrap_or(raw.len());
        segments.push(String::from_utf8_lossy(&raw[offset..end]).into_owned());
        offset = end + 1;
    }
    segments
}

/// Joins segments with NUL separators, the inverse of [`split_body`].
pub fn join_body(segments: &[String]) -> Vec<u8> {
    let mut out = Vec::new();
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            out.push(0);
        }
        out.extend_from_slice(segment.as_bytes());
    }
    out
}

fn split_signed(raw: &[u8]) -> (String, String) {
    let sig_end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    let signature = String::from_utf8_lossy(&raw[..sig_end]).into_owned();
    if sig_end >= raw.len() {
        return (signature, String::new());
    }
    let rest = &raw[sig_end + 1..];
    let msg_end = rest.iter().position(|&b| b == 0).unwrap_or(rest.len());
    let message = String::from_utf8_lossy(&rest[..msg_end]).into_owned();
    (signature, message)
}

fn join_signed(signature: &str, message: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(signature.len() + message.len() + 2);
    out.extend_from_slice(signature.as_bytes());
    out.push(0);
    out.extend_from_slice(message.as_bytes());
    out.push(0);
    out
}

/// Decodes one notice into a structured message.
///
/// Total over every input; the only non-pure step is the `from_host`
/// enrichment, which delegates to `resolver` and degrades to the literal
/// address on failure.
pub fn decode(notice: &Notice, encoding: BodyEncoding, resolver: &dyn HostResolver) -> Message {
    let body = match encoding {
        BodyEncoding::NulSegments => Body::Segments(split_body(&notice.message)),
        BodyEncoding::SignatureMessage => {
            let (signature, message) = split_signed(&notice.message);
            Body::Signed { signature, message }
        }
    };

    Message {
        version: notice.version.clone(),
        packet: notice.packet.clone(),
        port: notice.port,
        checked_auth: notice.checked_auth,
        authent_len: notice.authent_len,
        ascii_authent: notice.ascii_authent.clone(),
        class: notice.class.clone(),
        instance: notice.instance.clone(),
        opcode: notice.opcode.clone(),
        sender: notice.sender.clone(),
        recipient: notice.recipient.clone(),
        format: notice.format.clone(),
        other_fields: if notice.other_fields.is_empty() {
            None
        } else {
            Some(notice.other_fields.clone())
        },
        kind: notice.kind,
        time: notice.time,
        auth: notice.auth,
        sender_addr: notice.sender_addr,
        uid: notice.uid,
        from_host: resolver.resolve(notice.sender_addr),
        body,
    }
}

/// Encodes outgoing fields into a notice ready for the port library.
///
/// The produced buffers are owned copies — the port may keep a reference
/// across the queued send, so nothing here aliases caller storage.
pub fn encode(options: &SendOptions, ack: AckMode, encoding: BodyEncoding) -> Notice {
    let message = match encoding {
        BodyEncoding::NulSegments => join_body(&options.body),
        BodyEncoding::SignatureMessage => join_signed(
            options.signature.as_deref().unwrap_or(""),
            options.message.as_deref().unwrap_or(""),
        ),
    };

    Notice {
        class: options.class.clone().unwrap_or_else(|| "MESSAGE".into()),
        instance: options.instance.clone().unwrap_or_else(|| "PERSONAL".into()),
        recipient: options.recipient.clone().unwrap_or_default(),
        opcode: options.opcode.clone().unwrap_or_default(),
        format: options.format.clone().unwrap_or_default(),
        kind: match ack {
            AckMode::Wait => Kind::Acked,
            AckMode::None => Kind::Unacked,
        },
        message,
        ..Notice::default()
    }
}
