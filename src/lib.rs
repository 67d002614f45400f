//! dvnet models a small packet-switched network of hosts and routers that
//! exchange data packets and run a distance-vector routing protocol to learn
//! shortest paths without global knowledge.
//!
//! Nodes only communicate through their [`iface::Interface`] queues. A
//! [`link::LinkLayer`] shuttles frames between interfaces, a [`host::Host`]
//! produces and consumes data packets, and a [`router::Router`] forwards data
//! and relaxes its [`table::RoutingTable`] from received advertisements.

use std::time::Duration;

pub mod feedback;
pub mod host;
pub mod iface;
pub mod link;
pub mod router;
pub mod sim;
pub mod table;
pub mod util;
pub mod wire;

/// Name of a node on the simulated network. Opaque, compared by equality only.
pub type Address = String;

/// Link and path cost. Non-negative by construction, additions saturate.
pub type Cost = u32;

/// How long a polling loop sleeps after a sweep that moved nothing.
pub(crate) const POLL_IDLE: Duration = Duration::from_millis(1);
