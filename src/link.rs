use std::thread;

use log::{trace, warn};
use tokio_util::sync::CancellationToken;

use crate::iface::{End, Interface};
use crate::{Address, POLL_IDLE};

/// One bidirectional link between two node interfaces. The link holds cheap
/// clones of the interface handles; the nodes keep ownership.
#[derive(Debug)]
pub struct Link {
    a_name: Address,
    a: Interface,
    b_name: Address,
    b: Interface,
}

impl Link {
    pub fn new(
        a_name: impl Into<Address>,
        a: Interface,
        b_name: impl Into<Address>,
        b: Interface,
    ) -> Self {
        Self {
            a_name: a_name.into(),
            a,
            b_name: b_name.into(),
            b,
        }
    }

    /// Moves at most one frame in each direction, from the sender's outbound
    /// queue to the receiver's inbound queue. A full inbound queue loses the
    /// frame. Returns the number of frames moved.
    pub fn tick(&self) -> usize {
        let mut moved = 0;
        moved += usize::from(transfer(&self.a_name, &self.a, &self.b_name, &self.b));
        moved += usize::from(transfer(&self.b_name, &self.b, &self.a_name, &self.a));
        moved
    }
}

fn transfer(from_name: &str, from: &Interface, to_name: &str, to: &Interface) -> bool {
    let Some(frame) = from.dequeue(End::Outbound) else {
        return false;
    };
    trace!("link {from_name} -> {to_name}: carrying frame {frame:?}");
    if let Err(e) = to.enqueue(End::Inbound, frame, false) {
        warn!("link {from_name} -> {to_name}: frame lost: {e}");
    }
    true
}

/// The physical layer of the simulation: shuttles frames across every link
/// until cancelled. Runs on its own thread, like every node.
#[derive(Debug, Default)]
pub struct LinkLayer {
    links: Vec<Link>,
    shutdown: CancellationToken,
}

impl LinkLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_link(&mut self, link: Link) {
        self.links.push(link);
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Sweeps every link until the shutdown token fires, checked once per
    /// full sweep.
    pub fn run(&self) {
        trace!("link layer: starting");
        loop {
            let moved: usize = self.links.iter().map(Link::tick).sum();
            if self.shutdown.is_cancelled() {
                break;
            }
            if moved == 0 {
                thread::sleep(POLL_IDLE);
            }
        }
        trace!("link layer: stopping");
    }
}
