use std::collections::BTreeMap;

use dvnet::host::Host;
use dvnet::iface::Interface;
use dvnet::link::Link;
use dvnet::router::Router;
use dvnet::table::CostTable;
use dvnet::{Address, Cost};

/// A deterministic, thread-free network: the same nodes and links the
/// threaded simulation wires up, driven tick by tick. One tick sweeps every
/// link (one frame per direction) and then every router (one frame per
/// interface), in fixed order.
pub struct TickNet {
    hosts: BTreeMap<Address, Host>,
    routers: Vec<Router>,
    links: Vec<Link>,
}

impl TickNet {
    /// `routers` maps a name to `(neighbour, interface, cost)` entries;
    /// `links` are `(a, a_interface, b, b_interface)` with hosts always on
    /// interface 0.
    pub fn build(
        hosts: &[&str],
        routers: &[(&str, &[(&str, usize, Cost)])],
        links: &[(&str, usize, &str, usize)],
    ) -> Self {
        let hosts: BTreeMap<Address, Host> = hosts
            .iter()
            .map(|name| (name.to_string(), Host::new(*name)))
            .collect();
        let routers: Vec<Router> = routers
            .iter()
            .map(|(name, costs)| {
                let mut map: BTreeMap<Address, BTreeMap<usize, Cost>> = BTreeMap::new();
                for (neighbour, interface, cost) in *costs {
                    map.entry(neighbour.to_string())
                        .or_default()
                        .insert(*interface, *cost);
                }
                Router::new(*name, CostTable::new(map), 0)
            })
            .collect();
        let links = links
            .iter()
            .map(|(a, a_if, b, b_if)| {
                let a_iface = endpoint(&hosts, &routers, a, *a_if);
                let b_iface = endpoint(&hosts, &routers, b, *b_if);
                Link::new(*a, a_iface, *b, b_iface)
            })
            .collect();
        Self {
            hosts,
            routers,
            links,
        }
    }

    pub fn host(&self, name: &str) -> &Host {
        &self.hosts[name]
    }

    pub fn router(&self, name: &str) -> &Router {
        self.routers
            .iter()
            .find(|r| r.name() == name)
            .unwrap_or_else(|| panic!("no router {name}"))
    }

    /// Every router advertises on every interface, the driver's convergence
    /// seed.
    pub fn seed_all(&self) {
        for router in &self.routers {
            for index in 0..router.interfaces().len() {
                router.send_routes(index);
            }
        }
    }

    /// One link sweep followed by one router sweep. Returns the number of
    /// frames moved or handled.
    pub fn tick(&mut self) -> usize {
        let mut moved: usize = self.links.iter().map(Link::tick).sum();
        for router in &mut self.routers {
            moved += router.process_sweep();
        }
        moved
    }

    pub fn tick_n(&mut self, ticks: usize) {
        for _ in 0..ticks {
            self.tick();
        }
    }

    /// Ticks until a full tick moves nothing, meaning every queue in the
    /// network is empty. Panics if the network is still busy after
    /// `max_ticks`.
    pub fn tick_to_quiescence(&mut self, max_ticks: usize) -> usize {
        for tick in 1..=max_ticks {
            if self.tick() == 0 {
                return tick;
            }
        }
        panic!("network still busy after {max_ticks} ticks");
    }

    pub fn cost(&self, router: &str, destination: &str) -> Option<Cost> {
        self.router(router).routes().cost_to(destination)
    }

    pub fn next_hop(&self, router: &str, destination: &str) -> Option<Address> {
        self.router(router).routes().next_hop(destination).cloned()
    }
}

fn endpoint(
    hosts: &BTreeMap<Address, Host>,
    routers: &[Router],
    name: &str,
    interface: usize,
) -> Interface {
    if let Some(host) = hosts.get(name) {
        assert_eq!(interface, 0, "host {name} only has interface 0");
        return host.interface().clone();
    }
    routers
        .iter()
        .find(|r| r.name() == name)
        .and_then(|r| r.interface(interface))
        .cloned()
        .unwrap_or_else(|| panic!("no interface {interface} on node {name}"))
}
