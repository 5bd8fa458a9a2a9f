//! Bridges the port's pollable descriptor into the tokio reactor.
//!
//! The spawned task does nothing but wait for read-readiness; every port
//! call of the drain itself runs on the serialized worker. Readiness is
//! cleared only after the drain cycle finished, otherwise the edge would
//! re-fire while the queue is still ahead of the socket.

use std::os::unix::io::{AsRawFd, RawFd};

use tokio::io::unix::AsyncFd;
use tokio::io::Interest;
use tokio_util::sync::CancellationToken;

use crate::error::ZephyrError;
use crate::gateway::Gateway;

struct PortFd(RawFd);

impl AsRawFd for PortFd {
    fn as_raw_fd(&self) -> RawFd {
        self.0
    }
}

/// Registers the descriptor and spawns the readiness task. Called at most
/// once per client; must run inside a tokio runtime.
pub(crate) fn arm(
    fd: RawFd,
    gateway: Gateway,
    cancel: CancellationToken,
) -> Result<(), ZephyrError> {
    let async_fd = AsyncFd::with_interest(PortFd(fd), Interest::READABLE).map_err(|err| {
        ZephyrError::init(
            "register_descriptor",
            err.raw_os_error().unwrap_or(-1),
            err.to_string(),
        )
    })?;

    tokio::spawn(async move {
        log::trace!("port: readiness task armed on fd {fd}");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                ready = async_fd.readable() => {
                    let mut guard = match ready {
                        Ok(guard) => guard,
                        Err(err) => {
                            log::warn!("port: readiness wait failed: {err}");
                            break;
                        }
                    };
                    if gateway.drain().await.is_err() {
                        break;
                    }
                    guard.clear_ready();
                }
            }
        }
        log::trace!("port: readiness task stopped");
    });

    Ok(())
}
