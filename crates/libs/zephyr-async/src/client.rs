//! Public client handle.

use std::os::unix::io::RawFd;
use std::sync::Mutex;

use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio_util::sync::CancellationToken;

use crate::codec;
use crate::config::ZephyrConfig;
use crate::error::ZephyrError;
use crate::gateway::Gateway;
use crate::listener;
use crate::message::{AckMode, BodyEncoding, Message, SendOptions};
use crate::notice::UniqueId;
use crate::port::{Code, Port};
use crate::resolver::{DnsResolver, HostResolver};
use crate::subs::{self, SubscriptionSpec, SubscriptionTriple};

/// One entry on the message event stream, mirroring the
/// `callback(err, msg)` contract of the protocol's client libraries:
/// decoded notices and in-stream transport errors share the channel.
#[derive(Debug)]
pub enum Event {
    Message(Message),
    Error(ZephyrError),
}

#[derive(Debug)]
struct StreamSlot {
    events: Option<UnboundedReceiver<Event>>,
    armed: bool,
}

/// An open client session.
///
/// Created once per process via [`Zephyr::open`]; the session (bound port,
/// sender identity, realm) lives until the handle is dropped — there is no
/// teardown operation in the protocol. All port-touching operations are
/// funneled through the serialized worker, so the handle is safe to share
/// behind an `Arc` and calls from separate tasks never overlap against the
/// port.
#[derive(Debug)]
pub struct Zephyr {
    gateway: Gateway,
    encoding: BodyEncoding,
    sender: String,
    realm: String,
    port_number: u16,
    descriptor: Option<RawFd>,
    stream: Mutex<StreamSlot>,
    cancel: CancellationToken,
}

impl Zephyr {
    /// Opens the session with the default reverse-DNS resolver.
    pub fn open<P: Port>(port: P, config: ZephyrConfig) -> Result<Zephyr, ZephyrError> {
        Self::open_with_resolver(port, config, Box::new(DnsResolver))
    }

    /// Opens the session: initializes the port library, binds the client
    /// port, captures the local identity, and starts the worker.
    ///
    /// Failure here is fatal to the adapter — no API is usable afterwards.
    pub fn open_with_resolver<P: Port>(
        mut port: P,
        config: ZephyrConfig,
        resolver: Box<dyn HostResolver>,
    ) -> Result<Zephyr, ZephyrError> {
        if let Err(code) = port.initialize() {
            return Err(init_error(&port, "initialize", code));
        }
        let bound = match port.open_port(config.preferred_port) {
            Ok(bound) => bound,
            Err(code) => return Err(init_error(&port, "open_port", code)),
        };
        let sender = port.sender();
        let realm = port.realm();
        let descriptor = port.descriptor();

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let gateway = Gateway::spawn(
            port,
            bound,
            config.auth,
            config.encoding,
            resolver,
            events_tx,
        )
        .map_err(|err| {
            ZephyrError::init(
                "spawn_worker",
                err.raw_os_error().unwrap_or(-1),
                err.to_string(),
            )
        })?;

        log::info!("port: session open as {sender} ({realm}) on port {bound}");
        Ok(Zephyr {
            gateway,
            encoding: config.encoding,
            sender,
            realm,
            port_number: bound,
            descriptor,
            stream: Mutex::new(StreamSlot {
                events: Some(events_rx),
                armed: false,
            }),
            cancel: CancellationToken::new(),
        })
    }

    /// Arms the readiness listener and hands out the message stream.
    ///
    /// Only one stream exists per session; a second call fails with
    /// [`ZephyrError::AlreadyListening`]. Must be called inside a tokio
    /// runtime. When the port exposes no pollable descriptor (test
    /// doubles), delivery is driven explicitly via [`Zephyr::drain`].
    pub fn listen(&self) -> Result<UnboundedReceiver<Event>, ZephyrError> {
        let mut slot = self.stream.lock().map_err(|_| ZephyrError::Closed)?;
        if slot.armed {
            return Err(ZephyrError::AlreadyListening);
        }
        let events = slot.events.take().ok_or(ZephyrError::AlreadyListening)?;
        if let Some(fd) = self.descriptor {
            if let Err(err) = listener::arm(fd, self.gateway.clone(), self.cancel.child_token()) {
                slot.events = Some(events);
                return Err(err);
            }
        }
        slot.armed = true;
        Ok(events)
    }

    /// Registers a batch of typed subscriptions in one atomic port call.
    pub async fn subscribe(&self, specs: &[SubscriptionSpec]) -> Result<(), ZephyrError> {
        let triples = specs.iter().map(SubscriptionSpec::normalize).collect();
        self.gateway.subscribe(triples).await
    }

    /// Registers a loosely-shaped batch (`[class, instance?, recipient?]`
    /// per entry). The whole batch is validated before any port call; a
    /// malformed entry fails fast with no partial registration.
    pub async fn subscribe_raw(&self, raw: &[Vec<String>]) -> Result<(), ZephyrError> {
        let triples = subs::validate_batch(raw)?;
        self.gateway.subscribe(triples).await
    }

    /// Queries the currently active subscription set.
    pub async fn subscriptions(&self) -> Result<Vec<SubscriptionTriple>, ZephyrError> {
        self.gateway.list_subscriptions().await
    }

    /// Encodes and sends one notice.
    ///
    /// With [`AckMode::Wait`] the returned ids correlate 1:1 with the
    /// packets placed on the wire, for matching later acknowledgments; with
    /// [`AckMode::None`] the result is empty. A transport failure returns
    /// the error and no ids, even if some packets went out first.
    pub async fn send(
        &self,
        options: &SendOptions,
        ack: AckMode,
    ) -> Result<Vec<UniqueId>, ZephyrError> {
        let notice = codec::encode(options, ack, self.encoding);
        self.gateway.send(notice, ack == AckMode::Wait).await
    }

    /// Processes every notice the port currently has pending, emitting one
    /// event per notice, and resolves when the cycle is finished.
    pub async fn drain(&self) -> Result<(), ZephyrError> {
        self.gateway.drain().await
    }

    /// Local sender identity, fixed after open.
    pub fn sender(&self) -> &str {
        &self.sender
    }

    /// Local realm, fixed after open.
    pub fn realm(&self) -> &str {
        &self.realm
    }

    /// Bound client port.
    pub fn port(&self) -> u16 {
        self.port_number
    }
}

impl Drop for Zephyr {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn init_error<P: Port>(port: &P, op: &str, code: Code) -> ZephyrError {
    ZephyrError::init(op, code, port.error_message(code))
}
