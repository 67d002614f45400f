use std::collections::BTreeMap;
use std::fmt;

use crate::wire::RouteTriple;
use crate::{Address, Cost};

/// Static link configuration of one router: neighbour -> interface -> direct
/// link cost. Built once at construction; the only later mutation is the
/// owner's self entry at cost 0.
#[derive(Debug, Clone, Default)]
pub struct CostTable {
    entries: BTreeMap<Address, BTreeMap<usize, Cost>>,
}

impl CostTable {
    pub fn new(entries: BTreeMap<Address, BTreeMap<usize, Cost>>) -> Self {
        Self { entries }
    }

    /// Records the owner as reachable from itself at cost 0.
    pub(crate) fn set_self(&mut self, owner: &str) {
        self.entries
            .entry(owner.to_string())
            .or_default()
            .insert(0, 0);
    }

    /// Direct link cost to `neighbour` over `interface`, if the pair is
    /// configured.
    pub fn link_cost(&self, neighbour: &str, interface: usize) -> Option<Cost> {
        self.entries.get(neighbour)?.get(&interface).copied()
    }

    /// The interface on which `neighbour` is directly reachable. Lowest
    /// index wins if several are configured.
    pub fn interface_for(&self, neighbour: &str) -> Option<usize> {
        self.entries.get(neighbour)?.keys().next().copied()
    }

    /// Every configured neighbour with its cheapest direct link cost.
    pub fn direct_neighbours(&self) -> impl Iterator<Item = (&Address, Cost)> {
        self.entries.iter().filter_map(|(addr, links)| {
            links.values().min().map(|cost| (addr, *cost))
        })
    }

    /// Number of interfaces this configuration spans (highest index + 1).
    pub fn interface_count(&self) -> usize {
        self.entries
            .values()
            .flat_map(|links| links.keys())
            .max()
            .map_or(0, |highest| highest + 1)
    }
}

/// The converging per-router state: destination -> via -> best known cost.
///
/// Seeded with the owner's self route at cost 0 and one direct route per
/// neighbour; afterwards mutated only by [`RoutingTable::relax`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingTable {
    routes: BTreeMap<Address, BTreeMap<Address, Cost>>,
}

impl RoutingTable {
    pub fn seeded(costs: &CostTable) -> Self {
        let mut table = Self::default();
        for (neighbour, cost) in costs.direct_neighbours() {
            table
                .routes
                .entry(neighbour.clone())
                .or_default()
                .insert(neighbour.clone(), cost);
        }
        table
    }

    /// Best known route to `destination`: the via with the lowest recorded
    /// cost, ties broken by via name for determinism.
    pub fn best(&self, destination: &str) -> Option<(&Address, Cost)> {
        self.routes
            .get(destination)?
            .iter()
            .map(|(via, cost)| (via, *cost))
            .min_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)))
    }

    pub fn cost_to(&self, destination: &str) -> Option<Cost> {
        self.best(destination).map(|(_, cost)| cost)
    }

    pub fn next_hop(&self, destination: &str) -> Option<&Address> {
        self.best(destination).map(|(via, _)| via)
    }

    /// One Bellman-Ford relaxation step. Inserts the route when the
    /// destination is unknown, overwrites the entry when `candidate` is a
    /// strict improvement over the current best. Equal-cost candidates never
    /// update, so converged tables cannot oscillate.
    ///
    /// Returns whether the table changed.
    pub fn relax(&mut self, destination: &str, via: &str, candidate: Cost) -> bool {
        match self.routes.get_mut(destination) {
            None => {
                self.routes
                    .entry(destination.to_string())
                    .or_default()
                    .insert(via.to_string(), candidate);
                true
            }
            Some(entry) => {
                let current = entry.values().min().copied().unwrap_or(Cost::MAX);
                if candidate < current {
                    entry.clear();
                    entry.insert(via.to_string(), candidate);
                    true
                } else {
                    false
                }
            }
        }
    }

    /// The table flattened into advertisement order.
    pub fn triples(&self) -> Vec<RouteTriple> {
        self.routes
            .iter()
            .flat_map(|(destination, entry)| {
                entry.iter().map(|(via, cost)| RouteTriple {
                    destination: destination.clone(),
                    via: via.clone(),
                    cost: *cost,
                })
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Renders the table as a destination-by-via cost grid, `~` marking pairs
/// with no recorded cost.
impl fmt::Display for RoutingTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let destinations: Vec<&Address> = self.routes.keys().collect();
        let mut vias: Vec<&Address> = self
            .routes
            .values()
            .flat_map(|entry| entry.keys())
            .collect();
        vias.sort();
        vias.dedup();

        write!(f, "{:8}", "cost to")?;
        for dst in &destinations {
            write!(f, " {dst:>5}")?;
        }
        for via in vias {
            write!(f, "\nvia {via:<4}")?;
            for dst in &destinations {
                match self.routes[*dst].get(via) {
                    Some(cost) => write!(f, " {cost:>5}")?,
                    None => write!(f, " {:>5}", "~")?,
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn cost_table(entries: &[(&str, usize, Cost)]) -> CostTable {
        let mut map: BTreeMap<Address, BTreeMap<usize, Cost>> = BTreeMap::new();
        for (neighbour, interface, cost) in entries {
            map.entry(neighbour.to_string())
                .or_default()
                .insert(*interface, *cost);
        }
        CostTable::new(map)
    }

    #[test]
    fn seeding_covers_self_and_neighbours() {
        let mut costs = cost_table(&[("H1", 0, 1), ("RB", 1, 5)]);
        costs.set_self("RA");
        let table = RoutingTable::seeded(&costs);
        assert_eq!(table.cost_to("RA"), Some(0));
        assert_eq!(table.cost_to("H1"), Some(1));
        assert_eq!(table.best("RB"), Some((&"RB".to_string(), 5)));
        assert_eq!(table.cost_to("H9"), None);
    }

    #[test]
    fn relax_inserts_unknown_destinations() {
        let mut table = RoutingTable::default();
        assert!(table.relax("H3", "RC", 5));
        assert_eq!(table.best("H3"), Some((&"RC".to_string(), 5)));
    }

    #[test]
    fn relax_takes_strict_improvements_only() {
        let mut table = RoutingTable::default();
        table.relax("H3", "RB", 9);
        assert!(table.relax("H3", "RC", 5));
        assert_eq!(table.next_hop("H3"), Some(&"RC".to_string()));
        // an equal-cost alternative never updates
        assert!(!table.relax("H3", "RB", 5));
        assert_eq!(table.next_hop("H3"), Some(&"RC".to_string()));
        // neither does a worse one
        assert!(!table.relax("H3", "RD", 6));
        assert_eq!(table.cost_to("H3"), Some(5));
    }

    #[test]
    fn improvement_replaces_the_whole_entry() {
        let mut table = RoutingTable::default();
        table.relax("H3", "RB", 9);
        table.relax("H3", "RC", 5);
        // the stale RB route is gone, not shadowed
        assert_eq!(table.triples().len(), 1);
    }

    #[test]
    fn interface_count_spans_the_highest_index() {
        let costs = cost_table(&[("H1", 0, 1), ("RB", 2, 1)]);
        assert_eq!(costs.interface_count(), 3);
        assert_eq!(costs.interface_for("RB"), Some(2));
        assert_eq!(costs.link_cost("RB", 2), Some(1));
        assert_eq!(costs.link_cost("RB", 0), None);
    }
}
