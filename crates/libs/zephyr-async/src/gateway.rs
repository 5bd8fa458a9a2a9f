//! Serialized port worker.
//!
//! The port library is a single shared mutable resource with no concurrent
//! or reentrant access, ever. One dedicated OS thread owns the port and
//! drains a FIFO command queue with one command in flight at a time, so
//! submission order is execution order and no command starts before the
//! previous port call returned.

use std::thread;

use tokio::sync::{mpsc, oneshot};

use crate::client::Event;
use crate::codec;
use crate::error::ZephyrError;
use crate::message::BodyEncoding;
use crate::notice::{AuthMode, Notice, UniqueId};
use crate::port::{Code, Port};
use crate::resolver::HostResolver;
use crate::subs::SubscriptionTriple;

pub(crate) enum PortCommand {
    Subscribe {
        triples: Vec<SubscriptionTriple>,
        reply: oneshot::Sender<Result<(), ZephyrError>>,
    },
    ListSubscriptions {
        reply: oneshot::Sender<Result<Vec<SubscriptionTriple>, ZephyrError>>,
    },
    Send {
        notice: Notice,
        want_acks: bool,
        reply: oneshot::Sender<Result<Vec<UniqueId>, ZephyrError>>,
    },
    Drain {
        done: oneshot::Sender<()>,
    },
}

/// Handle submitting commands to the worker; clones share the same queue.
#[derive(Clone, Debug)]
pub(crate) struct Gateway {
    tx: mpsc::UnboundedSender<PortCommand>,
}

impl Gateway {
    /// Moves the port onto its worker thread and returns the queue handle.
    pub(crate) fn spawn<P: Port>(
        port: P,
        session_port: u16,
        auth: AuthMode,
        encoding: BodyEncoding,
        resolver: Box<dyn HostResolver>,
        events: mpsc::UnboundedSender<Event>,
    ) -> std::io::Result<Gateway> {
        let (tx, rx) = mpsc::unbounded_channel();
        thread::Builder::new()
            .name("zephyr-port".into())
            .spawn(move || run_worker(port, session_port, auth, encoding, resolver, events, rx))?;
        Ok(Gateway { tx })
    }

    pub(crate) async fn subscribe(
        &self,
        triples: Vec<SubscriptionTriple>,
    ) -> Result<(), ZephyrError> {
        let (reply, rx) = oneshot::channel();
        self.submit(PortCommand::Subscribe { triples, reply })?;
        rx.await.map_err(|_| ZephyrError::Closed)?
    }

    pub(crate) async fn list_subscriptions(
        &self,
    ) -> Result<Vec<SubscriptionTriple>, ZephyrError> {
        let (reply, rx) = oneshot::channel();
        self.submit(PortCommand::ListSubscriptions { reply })?;
        rx.await.map_err(|_| ZephyrError::Closed)?
    }

    pub(crate) async fn send(
        &self,
        notice: Notice,
        want_acks: bool,
    ) -> Result<Vec<UniqueId>, ZephyrError> {
        let (reply, rx) = oneshot::channel();
        self.submit(PortCommand::Send {
            notice,
            want_acks,
            reply,
        })?;
        rx.await.map_err(|_| ZephyrError::Closed)?
    }

    /// Runs one drain-to-empty cycle and resolves when it has finished.
    pub(crate) async fn drain(&self) -> Result<(), ZephyrError> {
        let (done, rx) = oneshot::channel();
        self.submit(PortCommand::Drain { done })?;
        rx.await.map_err(|_| ZephyrError::Closed)
    }

    fn submit(&self, command: PortCommand) -> Result<(), ZephyrError> {
        self.tx.send(command).map_err(|_| ZephyrError::Closed)
    }
}

fn transport_error<P: Port>(port: &P, op: &str, code: Code) -> ZephyrError {
    ZephyrError::transport(op, code, port.error_message(code))
}

fn run_worker<P: Port>(
    mut port: P,
    session_port: u16,
    auth: AuthMode,
    encoding: BodyEncoding,
    resolver: Box<dyn HostResolver>,
    events: mpsc::UnboundedSender<Event>,
    mut rx: mpsc::UnboundedReceiver<PortCommand>,
) {
    log::trace!("port: worker started on port {session_port}");
    while let Some(command) = rx.blocking_recv() {
        match command {
            PortCommand::Subscribe { triples, reply } => {
                let result = do_subscribe(&mut port, session_port, &triples);
                let _ = reply.send(result);
            }
            PortCommand::ListSubscriptions { reply } => {
                let result = do_list(&mut port, session_port);
                let _ = reply.send(result);
            }
            PortCommand::Send {
                notice,
                want_acks,
                reply,
            } => {
                let result = do_send(&mut port, &notice, auth, want_acks);
                let _ = reply.send(result);
            }
            PortCommand::Drain { done } => {
                drain_pending(&mut port, encoding, resolver.as_ref(), &events);
                let _ = done.send(());
            }
        }
    }
    log::trace!("port: worker stopped");
}

fn do_subscribe<P: Port>(
    port: &mut P,
    session_port: u16,
    triples: &[SubscriptionTriple],
) -> Result<(), ZephyrError> {
    // An empty batch never reaches the port library.
    if triples.is_empty() {
        return Ok(());
    }
    log::debug!("port: subscribing {} triples", triples.len());
    match port.subscribe(triples, session_port) {
        Ok(()) => Ok(()),
        Err(code) => Err(transport_error(port, "subscribe", code)),
    }
}

fn do_list<P: Port>(
    port: &mut P,
    session_port: u16,
) -> Result<Vec<SubscriptionTriple>, ZephyrError> {
    let count = match port.subscription_count(session_port) {
        Ok(count) => count,
        Err(code) => return Err(transport_error(port, "subscription_count", code)),
    };
    let mut triples = Vec::with_capacity(count);
    for _ in 0..count {
        match port.next_subscription() {
            Ok(triple) => triples.push(triple),
            // A failure mid-iteration yields an error, not a partial list.
            Err(code) => return Err(transport_error(port, "next_subscription", code)),
        }
    }
    Ok(triples)
}

fn do_send<P: Port>(
    port: &mut P,
    notice: &Notice,
    auth: AuthMode,
    want_acks: bool,
) -> Result<Vec<UniqueId>, ZephyrError> {
    match port.send_notice(notice, auth) {
        Ok(uids) => {
            log::debug!(
                "port: sent {}/{} to '{}', {} packet(s)",
                notice.class,
                notice.instance,
                notice.recipient,
                uids.len()
            );
            Ok(if want_acks { uids } else { Vec::new() })
        }
        // Ids accumulated during a failed send are discarded; callers must
        // not assume partial success.
        Err(code) => Err(transport_error(port, "send_notice", code)),
    }
}

/// One readiness cycle: drain every notice the port currently has pending.
///
/// A single readiness edge can represent multiple buffered notices, so the
/// loop only stops on a pending count of zero or on an error. Stopping
/// early would delay delivery until the next unrelated readiness event.
fn drain_pending<P: Port>(
    port: &mut P,
    encoding: BodyEncoding,
    resolver: &dyn HostResolver,
    events: &mpsc::UnboundedSender<Event>,
) {
    loop {
        let pending = port.pending_count();
        if pending < 0 {
            // Negative return carries the negated process error code.
            let code = -pending;
            log::warn!("port: pending check failed with {code}");
            let _ = events.send(Event::Error(transport_error(port, "pending_count", code)));
            return;
        }
        if pending == 0 {
            return;
        }
        match port.receive_one() {
            Ok(notice) => {
                let message = codec::decode(&notice, encoding, resolver);
                if events.send(Event::Message(message)).is_err() {
                    // Event stream dropped; stop decoding into the void.
                    return;
                }
            }
            Err(code) => {
                let _ = events.send(Event::Error(transport_error(port, "receive_one", code)));
                return;
            }
        }
    }
}
