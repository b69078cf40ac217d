//! Beacon receive loop.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::sync::Arc;
use std::time::Instant;

use tokio::net::UdpSocket;
use tokio::sync::watch;

use super::frame::BeaconFrame;
use crate::anchor::ClockAnchor;
use crate::config::BeaconConfig;
use crate::error::Result;

/// Receives beacon datagrams and overwrites the shared [`ClockAnchor`]
/// with every valid frame.
///
/// Invalid datagrams (wrong length, bad CRC) are dropped without any
/// state change. A receive failure is fatal and unwinds into the
/// shutdown path; the multicast membership is released on every exit.
pub struct BeaconReceiver {
    socket: Arc<UdpSocket>,
    anchor: Arc<ClockAnchor>,
    /// `(group, interface)` joined at bind time, left on exit.
    membership: Option<(Ipv4Addr, Ipv4Addr)>,
    recv_buf_size: usize,
}

impl BeaconReceiver {
    /// Bind the beacon port and join the multicast group.
    ///
    /// # Errors
    /// Returns [`NodeError::Socket`](crate::NodeError::Socket) if binding
    /// or joining fails; both abort startup.
    pub async fn bind(config: &BeaconConfig, anchor: Arc<ClockAnchor>) -> Result<Self> {
        let socket =
            UdpSocket::bind(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, config.port)).await?;
        socket.join_multicast_v4(config.group, config.interface)?;
        tracing::info!(group = %config.group, port = config.port, "joined beacon multicast group");

        Ok(Self {
            socket: Arc::new(socket),
            anchor,
            membership: Some((config.group, config.interface)),
            recv_buf_size: config.recv_buf_size,
        })
    }

    /// Wrap an already-bound socket without joining any multicast group.
    ///
    /// Used by tests and unicast bench setups.
    #[must_use]
    pub fn with_socket(socket: Arc<UdpSocket>, anchor: Arc<ClockAnchor>, recv_buf_size: usize) -> Self {
        Self {
            socket,
            anchor,
            membership: None,
            recv_buf_size,
        }
    }

    /// Local address of the receive socket.
    ///
    /// # Errors
    /// Returns [`NodeError::Socket`](crate::NodeError::Socket) if the
    /// socket cannot report its address.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Run the receive loop until shutdown is signaled or the transport
    /// fails.
    ///
    /// # Errors
    /// Returns [`NodeError::Socket`](crate::NodeError::Socket) if the
    /// receive primitive fails; the error is fatal to the node.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let mut buf = vec![0u8; self.recv_buf_size];

        loop {
            tokio::select! {
                result = self.socket.recv_from(&mut buf) => {
                    match result {
                        Ok((len, src)) => {
                            let received_at = Instant::now();
                            self.handle_datagram(&buf[..len], received_at, src);
                        }
                        Err(e) => {
                            tracing::error!("beacon receive failed: {e}");
                            self.leave();
                            return Err(e.into());
                        }
                    }
                }
                res = shutdown.changed() => {
                    if res.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        self.leave();
        Ok(())
    }

    /// Validate one datagram and adopt it as the new anchor if valid.
    fn handle_datagram(&self, datagram: &[u8], received_at: Instant, src: SocketAddr) {
        match BeaconFrame::decode(datagram) {
            Ok(frame) => {
                let prev = self.anchor.read();
                if frame.sequence < prev.sequence {
                    // Latest wins by design: a reordered or replayed
                    // beacon rewinds the anchor.
                    tracing::debug!(
                        sequence = frame.sequence,
                        previous = prev.sequence,
                        "beacon sequence went backwards"
                    );
                }
                self.anchor.update(frame.sequence, frame.tick, received_at);
                tracing::debug!(
                    sequence = frame.sequence,
                    tick = frame.tick,
                    %src,
                    "adopted beacon anchor"
                );
            }
            Err(err) => {
                tracing::trace!(%src, %err, "dropped beacon datagram");
            }
        }
    }

    /// Drop the multicast membership, if any. Idempotent at the socket
    /// level only because the loop calls it exactly once per exit path.
    fn leave(&self) {
        if let Some((group, interface)) = self.membership {
            if let Err(e) = self.socket.leave_multicast_v4(group, interface) {
                tracing::warn!(%group, "failed to leave multicast group: {e}");
            } else {
                tracing::info!(%group, "left beacon multicast group");
            }
        }
    }
}
