use std::thread;

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, error, info, trace, warn};
use tokio_util::sync::CancellationToken;

use crate::iface::{End, Interface};
use crate::wire::{Packet, PacketKind};
use crate::{Address, POLL_IDLE};

/// A network host: a thin producer and consumer of data packets on a single
/// interface. Performs no protocol logic.
///
/// Handles are cheap clones sharing the same queues, so the application can
/// keep one while the run loop owns another thread.
#[derive(Debug, Clone)]
pub struct Host {
    addr: Address,
    iface: Interface,
    delivered_tx: Sender<Packet>,
    delivered_rx: Receiver<Packet>,
    shutdown: CancellationToken,
}

impl Host {
    pub fn new(addr: impl Into<Address>) -> Self {
        let (delivered_tx, delivered_rx) = unbounded();
        Self {
            addr: addr.into(),
            iface: Interface::new(0),
            delivered_tx,
            delivered_rx,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn address(&self) -> &str {
        &self.addr
    }

    pub fn interface(&self) -> &Interface {
        &self.iface
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Builds a data packet and enqueues it for transmission. A full queue
    /// drops the packet; sending never fails the caller.
    pub fn send(&self, dst: &str, payload: &str) {
        let pkt = Packet::data(dst, payload);
        match pkt.encode() {
            Ok(frame) => {
                debug!("{}: sending packet {frame:?}", self.addr);
                if let Err(e) = self.iface.enqueue(End::Outbound, frame, false) {
                    warn!("{}: packet to {dst} dropped: {e}", self.addr);
                }
            }
            Err(e) => warn!("{}: cannot encode packet to {dst}: {e}", self.addr),
        }
    }

    /// Polls the inbound queue once. Undecodable frames are discarded with a
    /// report.
    pub fn receive(&self) -> Option<Packet> {
        let frame = self.iface.dequeue(End::Inbound)?;
        match Packet::decode(&frame) {
            Ok(pkt) => Some(pkt),
            Err(e) => {
                error!("{}: discarding frame {frame:?}: {e}", self.addr);
                None
            }
        }
    }

    /// Next packet the run loop has delivered, if any.
    pub fn poll_delivered(&self) -> Option<Packet> {
        self.delivered_rx.try_recv().ok()
    }

    /// Drains the inbound queue until the shutdown token fires, parking every
    /// received packet on the delivery queue.
    pub fn run(&self) {
        trace!("{}: starting", self.addr);
        loop {
            if let Some(pkt) = self.receive() {
                if pkt.kind == PacketKind::Data {
                    info!("{}: received packet {:?}", self.addr, pkt.payload);
                    let _ = self.delivered_tx.send(pkt);
                } else {
                    // routers advertise on host-facing interfaces too
                    trace!("{}: ignoring control packet", self.addr);
                }
            } else {
                thread::sleep(POLL_IDLE);
            }
            if self.shutdown.is_cancelled() {
                break;
            }
        }
        trace!("{}: stopping", self.addr);
    }
}
