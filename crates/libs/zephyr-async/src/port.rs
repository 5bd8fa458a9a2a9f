use std::os::unix::io::RawFd;

use crate::notice::{AuthMode, Notice, UniqueId};
use crate::subs::SubscriptionTriple;

/// Numeric error code reported by the port library.
pub type Code = i32;

/// Blocking contract of the underlying port library.
///
/// The library keeps internal mutable state (open socket, partial-read
/// buffers) and is not safe to call concurrently or reentrantly. Every
/// implementation is driven from exactly one thread — the serialized port
/// worker — which is the adapter's central safety rule.
pub trait Port: Send + 'static {
    /// One-time library initialization. Called once, before `open_port`.
    fn initialize(&mut self) -> Result<(), Code>;

    /// Opens the client port; `preferred` of 0 lets the library pick.
    /// Returns the port actually bound.
    fn open_port(&mut self, preferred: u16) -> Result<u16, Code>;

    /// Local sender identity, valid after `initialize`.
    fn sender(&mut self) -> String;

    /// Local realm, valid after `initialize`.
    fn realm(&mut self) -> String;

    /// Pollable descriptor for read-readiness, when the implementation has
    /// one. Test doubles return `None` and are drained explicitly.
    fn descriptor(&self) -> Option<RawFd>;

    /// Number of pending bytes. A negative value signals an error and is
    /// the negated process error code — implementations over the real
    /// library fold `errno` into the return, since the raw call only
    /// reports failure through the process error state.
    fn pending_count(&mut self) -> i32;

    /// Blocking receive of the next pending notice.
    fn receive_one(&mut self) -> Result<Notice, Code>;

    /// Registers a batch of subscriptions in one atomic call.
    fn subscribe(&mut self, triples: &[SubscriptionTriple], port: u16) -> Result<(), Code>;

    /// Number of currently active subscriptions, priming the per-entry
    /// iteration below.
    fn subscription_count(&mut self, port: u16) -> Result<usize, Code>;

    /// Fetches the next active subscription entry.
    fn next_subscription(&mut self) -> Result<SubscriptionTriple, Code>;

    /// Sends one notice. A logical message may fragment into several
    /// packets; the returned ids correlate 1:1 with packets placed on the
    /// wire, in send order.
    fn send_notice(&mut self, notice: &Notice, auth: AuthMode) -> Result<Vec<UniqueId>, Code>;

    /// Human-readable text for a port error code.
    fn error_message(&self, code: Code) -> String;
}
