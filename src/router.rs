use std::thread;

use log::{debug, error, trace, warn};
use tokio_util::sync::CancellationToken;

use crate::feedback::RoutingError;
use crate::iface::{End, Interface};
use crate::table::{CostTable, RoutingTable};
use crate::wire::{Advertisement, Packet, PacketKind};
use crate::{Address, POLL_IDLE};

/// A multi-interface router running the distance-vector protocol.
///
/// The router owns its cost and routing tables outright; the only shared
/// state with the rest of the network is the interface queues, so no locking
/// is needed around the tables.
#[derive(Debug)]
pub struct Router {
    name: Address,
    costs: CostTable,
    table: RoutingTable,
    interfaces: Vec<Interface>,
    shutdown: CancellationToken,
}

impl Router {
    /// Builds a router from its static link configuration. The interface
    /// count is derived from the highest interface index the cost table
    /// names, and the routing table starts seeded with the self route at
    /// cost 0 plus one direct route per neighbour.
    pub fn new(name: impl Into<Address>, mut costs: CostTable, queue_capacity: usize) -> Self {
        let name = name.into();
        costs.set_self(&name);
        let table = RoutingTable::seeded(&costs);
        let interfaces = (0..costs.interface_count())
            .map(|_| Interface::new(queue_capacity))
            .collect();
        Self {
            name,
            costs,
            table,
            interfaces,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn interface(&self, index: usize) -> Option<&Interface> {
        self.interfaces.get(index)
    }

    pub fn interfaces(&self) -> &[Interface] {
        &self.interfaces
    }

    /// The current routing table. Converged only after the triggered-update
    /// cascade has settled.
    pub fn routes(&self) -> &RoutingTable {
        &self.table
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// One sweep over all inbound queues in fixed index order: dequeue,
    /// decode, classify. Data packets are forwarded, control packets feed
    /// the route-update algorithm, undecodable frames are discarded with a
    /// report. Returns the number of frames handled.
    pub fn process_sweep(&mut self) -> usize {
        let mut handled = 0;
        for index in 0..self.interfaces.len() {
            let Some(frame) = self.interfaces[index].dequeue(End::Inbound) else {
                continue;
            };
            handled += 1;
            match Packet::decode(&frame) {
                Ok(pkt) => match pkt.kind {
                    PacketKind::Data => self.forward_packet(pkt, index),
                    PacketKind::Control => self.update_routes(&pkt, index),
                },
                Err(e) => {
                    error!("{}: discarding frame on interface {index}: {e}", self.name);
                }
            }
        }
        handled
    }

    /// Forwards a data packet out the interface of its best-known next hop.
    /// A missing route or a saturated egress queue drops the packet; neither
    /// is fatal to the router.
    fn forward_packet(&mut self, pkt: Packet, incoming: usize) {
        let Some((via, _)) = self.table.best(&pkt.dst) else {
            warn!(
                "{}: dropping packet from interface {incoming}: {}",
                self.name,
                RoutingError::NoRoute(pkt.dst)
            );
            return;
        };
        let via = via.clone();
        let Some(outgoing) = self.costs.interface_for(&via) else {
            warn!(
                "{}: dropping packet from interface {incoming}: {}",
                self.name,
                RoutingError::UnresolvedNextHop(via)
            );
            return;
        };
        let frame = match pkt.encode() {
            Ok(frame) => frame,
            Err(e) => {
                error!("{}: cannot re-encode packet to {}: {e}", self.name, pkt.dst);
                return;
            }
        };
        trace!(
            "{}: forwarding packet for {} from interface {incoming} to {outgoing} via {via}",
            self.name, pkt.dst
        );
        if let Err(e) = self.interfaces[outgoing].enqueue(End::Outbound, frame, true) {
            warn!(
                "{}: packet to {} lost on interface {outgoing}: {e}",
                self.name, pkt.dst
            );
        }
    }

    /// The distance-vector relaxation step, triggered by a received control
    /// packet.
    ///
    /// The advertiser must be a configured direct neighbour on the incoming
    /// interface; otherwise the whole update aborts before any table
    /// mutation. Each advertised destination is relaxed against the direct
    /// link cost plus the advertised cost, taking strict improvements only.
    /// Any change triggers a re-advertisement of the full table on every
    /// interface.
    fn update_routes(&mut self, pkt: &Packet, incoming: usize) {
        let advert = match Advertisement::decode(&pkt.payload) {
            Ok(advert) => advert,
            Err(e) => {
                error!(
                    "{}: discarding routing update on interface {incoming}: {e}",
                    self.name
                );
                return;
            }
        };
        let Some(link_cost) = self.costs.link_cost(&advert.advertiser, incoming) else {
            error!(
                "{}: discarding routing update: {}",
                self.name,
                RoutingError::UnknownAdvertiser {
                    advertiser: advert.advertiser,
                    interface: incoming,
                }
            );
            return;
        };
        debug!(
            "{}: routing update from {} on interface {incoming}",
            self.name, advert.advertiser
        );

        let mut changed = false;
        for route in &advert.routes {
            if route.destination == self.name {
                // the self route is pinned at cost 0
                continue;
            }
            let candidate = link_cost.saturating_add(route.cost);
            changed |= self
                .table
                .relax(&route.destination, &advert.advertiser, candidate);
        }

        if changed {
            debug!("{}: routing table changed\n{}", self.name, self.table);
            for index in 0..self.interfaces.len() {
                self.send_routes(index);
            }
        }
    }

    /// Advertises the full routing table on one interface as a control
    /// packet. A saturated queue loses the advertisement; a neighbour will
    /// only re-learn from future updates.
    pub fn send_routes(&self, interface: usize) {
        let advert = Advertisement {
            advertiser: self.name.clone(),
            routes: self.table.triples(),
        };
        let payload = match advert.encode() {
            Ok(payload) => payload,
            Err(e) => {
                error!("{}: cannot encode routing update: {e}", self.name);
                return;
            }
        };
        let frame = match Packet::control(payload).encode() {
            Ok(frame) => frame,
            Err(e) => {
                error!("{}: cannot encode control packet: {e}", self.name);
                return;
            }
        };
        trace!(
            "{}: sending routing update on interface {interface}",
            self.name
        );
        if let Err(e) = self.interfaces[interface].enqueue(End::Outbound, frame, true) {
            warn!(
                "{}: routing update lost on interface {interface}: {e}",
                self.name
            );
        }
    }

    /// Sweeps the inbound queues until the shutdown token fires. The token
    /// is checked once per full sweep, never mid-sweep.
    pub fn run(&mut self) {
        trace!("{}: starting", self.name);
        loop {
            let handled = self.process_sweep();
            if self.shutdown.is_cancelled() {
                break;
            }
            if handled == 0 {
                thread::sleep(POLL_IDLE);
            }
        }
        trace!("{}: stopping", self.name);
    }
}
