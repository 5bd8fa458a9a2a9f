//! Async client adapter for the Zephyr notice protocol.
//!
//! The underlying port library is synchronous, blocking, and keeps internal
//! mutable state, so it must never be called from two threads at once. This
//! crate wraps that library behind an event-driven interface:
//!
//! - **[`Port`]** — the blocking transport contract (implemented over the
//!   real port library, or by a test double)
//! - **Serialized port worker** — a dedicated thread that owns the port and
//!   executes one operation at a time from a FIFO queue
//! - **Readiness listener** — bridges the port's pollable descriptor into
//!   the tokio reactor and drains every pending notice on each readiness
//!   edge
//! - **[`Zephyr`]** — the client handle: subscribe, list subscriptions,
//!   send with acknowledgment correlation, and a single decoded-message
//!   event stream
//!
//! Notices are addressed by a `{class, instance, recipient}` triple and
//! decoded into [`Message`] values with the NUL-split body convention (or
//! the signature/message split, selected via [`ZephyrConfig`]).

pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod message;
pub mod notice;
pub mod port;
pub mod resolver;
pub mod subs;

mod gateway;
mod listener;

pub use client::{Event, Zephyr};
pub use codec::{decode, encode};
pub use config::ZephyrConfig;
pub use error::ZephyrError;
pub use message::{AckMode, Body, BodyEncoding, Message, SendOptions};
pub use notice::{AuthMode, Kind, Notice, UniqueId};
pub use port::{Code, Port};
pub use resolver::{DnsResolver, HostResolver};
pub use subs::{SubscriptionSpec, SubscriptionTriple};
