use std::collections::BTreeMap;
use std::thread::{self, JoinHandle};

use anyhow::{bail, ensure, Context};
use log::info;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::host::Host;
use crate::iface::Interface;
use crate::link::{Link, LinkLayer};
use crate::router::Router;
use crate::table::CostTable;
use crate::{Address, Cost};

/// Static configuration of one router: its neighbour cost table,
/// `neighbour -> interface -> link cost`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterSpec {
    pub name: Address,
    pub costs: BTreeMap<Address, BTreeMap<usize, Cost>>,
}

/// One bidirectional link between two named node interfaces. Must mirror the
/// connectivity the router cost tables describe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkSpec {
    pub a: Address,
    pub a_interface: usize,
    pub b: Address,
    pub b_interface: usize,
}

/// An initial `send_routes` call that seeds the triggered-update cascade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedSpec {
    pub router: Address,
    pub interface: usize,
}

/// A complete simulated topology.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopologySpec {
    /// Router queue capacity, 0 for unbounded.
    #[serde(default)]
    pub queue_capacity: usize,
    pub hosts: Vec<Address>,
    pub routers: Vec<RouterSpec>,
    pub links: Vec<LinkSpec>,
    #[serde(default)]
    pub seeds: Vec<SeedSpec>,
}

/// An application message for the driver to inject once routing has settled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageSpec {
    pub from: Address,
    pub to: Address,
    pub payload: String,
}

/// A driver scenario: a topology plus the operator-chosen wall-clock
/// intervals the converge-once design relies on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSpec {
    pub topology: TopologySpec,
    /// Time to let the routing tables converge before sending data.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    #[serde(default)]
    pub messages: Vec<MessageSpec>,
    /// Time to let in-flight data drain after each message.
    #[serde(default = "default_drain_ms")]
    pub drain_ms: u64,
}

fn default_settle_ms() -> u64 {
    2000
}

fn default_drain_ms() -> u64 {
    500
}

/// Wires a [`TopologySpec`] into live nodes and drives their threads: one per
/// host, one per router, one for the link layer.
#[derive(Debug)]
pub struct Simulation {
    hosts: BTreeMap<Address, Host>,
    routers: Vec<Router>,
    link_layer: Option<LinkLayer>,
    seeds: Vec<SeedSpec>,
    tokens: Vec<CancellationToken>,
    node_threads: Vec<JoinHandle<()>>,
    router_threads: Vec<JoinHandle<Router>>,
}

impl Simulation {
    /// Builds all nodes and links. Fails on a link or seed that names a
    /// node or interface the topology does not have.
    pub fn build(spec: &TopologySpec) -> anyhow::Result<Self> {
        let mut hosts = BTreeMap::new();
        for name in &spec.hosts {
            ensure!(
                hosts.insert(name.clone(), Host::new(name.clone())).is_none(),
                "duplicate host {name}"
            );
        }
        let routers: Vec<Router> = spec
            .routers
            .iter()
            .map(|r| {
                Router::new(
                    r.name.clone(),
                    CostTable::new(r.costs.clone()),
                    spec.queue_capacity,
                )
            })
            .collect();

        let mut link_layer = LinkLayer::new();
        for link in &spec.links {
            let a = endpoint(&hosts, &routers, &link.a, link.a_interface)?;
            let b = endpoint(&hosts, &routers, &link.b, link.b_interface)?;
            link_layer.add_link(Link::new(link.a.clone(), a, link.b.clone(), b));
        }

        for seed in &spec.seeds {
            let router = routers
                .iter()
                .find(|r| r.name() == seed.router)
                .with_context(|| format!("seed names unknown router {}", seed.router))?;
            ensure!(
                router.interface(seed.interface).is_some(),
                "seed names unknown interface {} on router {}",
                seed.interface,
                seed.router
            );
        }

        Ok(Self {
            hosts,
            routers,
            link_layer: Some(link_layer),
            seeds: spec.seeds.clone(),
            tokens: Vec::new(),
            node_threads: Vec::new(),
            router_threads: Vec::new(),
        })
    }

    /// Starts every thread and fires the seed advertisements. The seeds go
    /// out before the router threads start, so no update can be observed
    /// before the cascade begins.
    pub fn start(&mut self) -> anyhow::Result<()> {
        let layer = self
            .link_layer
            .take()
            .context("simulation already started")?;
        self.tokens.push(layer.shutdown_token());
        self.node_threads.push(
            thread::Builder::new()
                .name("links".to_string())
                .spawn(move || layer.run())?,
        );

        for (name, host) in &self.hosts {
            self.tokens.push(host.shutdown_token());
            let host = host.clone();
            self.node_threads.push(
                thread::Builder::new()
                    .name(name.clone())
                    .spawn(move || host.run())?,
            );
        }

        for seed in &self.seeds {
            // validated at build time
            if let Some(router) = self.routers.iter().find(|r| r.name() == seed.router) {
                info!("seeding routing from {} interface {}", seed.router, seed.interface);
                router.send_routes(seed.interface);
            }
        }

        for mut router in self.routers.drain(..) {
            self.tokens.push(router.shutdown_token());
            self.router_threads.push(
                thread::Builder::new()
                    .name(router.name().to_string())
                    .spawn(move || {
                        router.run();
                        router
                    })?,
            );
        }
        Ok(())
    }

    /// A handle to a host, for sending and polling application data.
    pub fn host(&self, name: &str) -> Option<&Host> {
        self.hosts.get(name)
    }

    /// Cancels every node and joins all threads. Returns the routers so the
    /// caller can inspect the converged tables.
    pub fn shutdown(mut self) -> Vec<Router> {
        for token in &self.tokens {
            token.cancel();
        }
        for handle in self.node_threads.drain(..) {
            let _ = handle.join();
        }
        self.router_threads
            .drain(..)
            .filter_map(|handle| handle.join().ok())
            .collect()
    }
}

fn endpoint(
    hosts: &BTreeMap<Address, Host>,
    routers: &[Router],
    name: &str,
    interface: usize,
) -> anyhow::Result<Interface> {
    if let Some(host) = hosts.get(name) {
        ensure!(interface == 0, "host {name} only has interface 0");
        return Ok(host.interface().clone());
    }
    if let Some(router) = routers.iter().find(|r| r.name() == name) {
        return router
            .interface(interface)
            .cloned()
            .with_context(|| format!("router {name} has no interface {interface}"));
    }
    bail!("link endpoint {name} does not exist")
}
