#![allow(dead_code)]

//! Scripted port double shared by the integration tests.
//!
//! Counts every port call, records execution order, and flags any
//! overlapping (reentrant) call — the port contract the serialized worker
//! must uphold.

use std::collections::VecDeque;
use std::os::unix::io::RawFd;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use zephyr_async::{AuthMode, Code, Notice, Port, SubscriptionTriple, UniqueId};

#[derive(Default)]
pub struct PortState {
    pub init_calls: AtomicUsize,
    pub subscribe_calls: AtomicUsize,
    pub query_calls: AtomicUsize,
    pub entry_calls: AtomicUsize,
    pub send_calls: AtomicUsize,
    pub pending_calls: AtomicUsize,
    pub receive_calls: AtomicUsize,

    /// Port-call names in execution order.
    pub ops: Mutex<Vec<&'static str>>,
    /// Set if any port call began while another was still running.
    pub overlap: AtomicBool,
    in_call: AtomicBool,
    /// Artificial per-call latency, to widen any overlap window.
    pub stall: Mutex<Option<Duration>>,

    /// Successive `pending_count` results; exhausted script reads as 0.
    pub pending_script: Mutex<VecDeque<i32>>,
    /// Notices handed out by `receive_one`.
    pub inbound: Mutex<VecDeque<Notice>>,
    pub receive_error: Mutex<Option<Code>>,

    /// Triples accepted by `subscribe`.
    pub registered: Mutex<Vec<SubscriptionTriple>>,
    pub subscribe_error: Mutex<Option<Code>>,
    pub count_error: Mutex<Option<Code>>,
    /// Fail `next_subscription` at this zero-based entry index.
    pub fail_entry_at: Mutex<Option<usize>>,
    entry_cursor: AtomicUsize,

    /// Notices accepted by `send_notice`.
    pub sent: Mutex<Vec<Notice>>,
    pub send_uids: Mutex<Vec<UniqueId>>,
    pub send_error: Mutex<Option<Code>>,
}

impl PortState {
    /// Calls made against the port after open (init excluded).
    pub fn transport_calls(&self) -> usize {
        self.subscribe_calls.load(Ordering::SeqCst)
            + self.query_calls.load(Ordering::SeqCst)
            + self.entry_calls.load(Ordering::SeqCst)
            + self.send_calls.load(Ordering::SeqCst)
            + self.pending_calls.load(Ordering::SeqCst)
            + self.receive_calls.load(Ordering::SeqCst)
    }
}

pub struct MockPort {
    pub state: Arc<PortState>,
    pub init_error: Option<Code>,
    pub open_error: Option<Code>,
}

impl MockPort {
    pub fn new() -> (MockPort, Arc<PortState>) {
        let state = Arc::new(PortState::default());
        (
            MockPort {
                state: state.clone(),
                init_error: None,
                open_error: None,
            },
            state,
        )
    }

    fn enter(&self, op: &'static str) -> CallGuard<'_> {
        if self.state.in_call.swap(true, Ordering::SeqCst) {
            self.state.overlap.store(true, Ordering::SeqCst);
        }
        if let Ok(mut ops) = self.state.ops.lock() {
            ops.push(op);
        }
        if let Ok(stall) = self.state.stall.lock() {
            if let Some(duration) = *stall {
                thread::sleep(duration);
            }
        }
        CallGuard { state: &self.state }
    }
}

struct CallGuard<'a> {
    state: &'a PortState,
}

impl Drop for CallGuard<'_> {
    fn drop(&mut self) {
        self.state.in_call.store(false, Ordering::SeqCst);
    }
}

impl Port for MockPort {
    fn initialize(&mut self) -> Result<(), Code> {
        self.state.init_calls.fetch_add(1, Ordering::SeqCst);
        match self.init_error {
            Some(code) => Err(code),
            None => Ok(()),
        }
    }

    fn open_port(&mut self, preferred: u16) -> Result<u16, Code> {
        match self.open_error {
            Some(code) => Err(code),
            None => Ok(if preferred == 0 { 32768 } else { preferred }),
        }
    }

    fn sender(&mut self) -> String {
        "strudel@EXAMPLE.EDU".into()
    }

    fn realm(&mut self) -> String {
        "EXAMPLE.EDU".into()
    }

    fn descriptor(&self) -> Option<RawFd> {
        None
    }

    fn pending_count(&mut self) -> i32 {
        let _guard = self.enter("pending_count");
        self.state.pending_calls.fetch_add(1, Ordering::SeqCst);
        self.state
            .pending_script
            .lock()
            .ok()
            .and_then(|mut script| script.pop_front())
            .unwrap_or(0)
    }

    fn receive_one(&mut self) -> Result<Notice, Code> {
        let _guard = self.enter("receive_one");
        self.state.receive_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(notice) = self
            .state
            .inbound
            .lock()
            .ok()
            .and_then(|mut inbound| inbound.pop_front())
        {
            return Ok(notice);
        }
        let code = self
            .state
            .receive_error
            .lock()
            .ok()
            .and_then(|error| *error)
            .unwrap_or(999);
        Err(code)
    }

    fn subscribe(&mut self, triples: &[SubscriptionTriple], _port: u16) -> Result<(), Code> {
        let _guard = self.enter("subscribe");
        self.state.subscribe_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(code) = self.state.subscribe_error.lock().ok().and_then(|e| *e) {
            return Err(code);
        }
        if let Ok(mut registered) = self.state.registered.lock() {
            registered.extend_from_slice(triples);
        }
        Ok(())
    }

    fn subscription_count(&mut self, _port: u16) -> Result<usize, Code> {
        let _guard = self.enter("subscription_count");
        self.state.query_calls.fetch_add(1, Ordering::SeqCst);
        self.state.entry_cursor.store(0, Ordering::SeqCst);
        if let Some(code) = self.state.count_error.lock().ok().and_then(|e| *e) {
            return Err(code);
        }
        Ok(self.state.registered.lock().map(|r| r.len()).unwrap_or(0))
    }

    fn next_subscription(&mut self) -> Result<SubscriptionTriple, Code> {
        let _guard = self.enter("next_subscription");
        self.state.entry_calls.fetch_add(1, Ordering::SeqCst);
        let index = self.state.entry_cursor.fetch_add(1, Ordering::SeqCst);
        if self.state.fail_entry_at.lock().ok().and_then(|f| *f) == Some(index) {
            return Err(77);
        }
        self.state
            .registered
            .lock()
            .ok()
            .and_then(|registered| registered.get(index).cloned())
            .ok_or(77)
    }

    fn send_notice(&mut self, notice: &Notice, _auth: AuthMode) -> Result<Vec<UniqueId>, Code> {
        let _guard = self.enter("send_notice");
        self.state.send_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(code) = self.state.send_error.lock().ok().and_then(|e| *e) {
            return Err(code);
        }
        if let Ok(mut sent) = self.state.sent.lock() {
            sent.push(notice.clone());
        }
        Ok(self
            .state
            .send_uids
            .lock()
            .map(|uids| uids.clone())
            .unwrap_or_default())
    }

    fn error_message(&self, code: Code) -> String {
        format!("mock port failure {code}")
    }
}

/// Literal-address resolver, avoiding real DNS in tests.
pub fn literal_resolver() -> Box<dyn zephyr_async::HostResolver> {
    Box::new(|addr: std::net::Ipv4Addr| addr.to_string())
}
