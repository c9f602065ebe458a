//! Door pairing graph
//!
//! The spoiler log lists every randomized connection as `A -- B`. Each
//! connection is walkable both ways, so the graph stores it in both
//! directions and keeps the two directions consistent when a door is
//! re-paired.
//!
//! Shop terminals are the exception: every shop door in the world leads to
//! them, so they act as hubs. A terminal keeps pointing at the door it was
//! most recently paired with, and earlier doors keep pointing at it.

use std::collections::HashMap;

use super::world::is_shop_terminal;

/// Undirected, one-to-one door linkage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairingGraph {
    partners: HashMap<String, String>,
}

impl PairingGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Links `a` and `b` in both directions
    ///
    /// A door can only have one partner. If either door was already paired
    /// elsewhere, the stale reverse edge is dropped so that
    /// `partner(partner(x)) == x` holds for every door outside the shop.
    pub fn insert(&mut self, a: &str, b: &str) {
        self.unlink(a);
        self.unlink(b);
        self.partners.insert(a.to_string(), b.to_string());
        self.partners.insert(b.to_string(), a.to_string());
    }

    fn unlink(&mut self, door: &str) {
        if is_shop_terminal(door) {
            return;
        }
        if let Some(old) = self.partners.remove(door) {
            if self.partners.get(&old).is_some_and(|back| back == door) {
                self.partners.remove(&old);
            }
        }
    }

    /// The door on the other side of `door`
    pub fn partner(&self, door: &str) -> Option<&str> {
        self.partners.get(door).map(String::as_str)
    }

    pub fn contains(&self, door: &str) -> bool {
        self.partners.contains_key(door)
    }

    /// Number of doors with a partner
    pub fn len(&self) -> usize {
        self.partners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partners.is_empty()
    }

    /// Every directed edge; each pairing shows up twice
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.partners
            .iter()
            .map(|(from, to)| (from.as_str(), to.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn insert_is_symmetric() {
        let mut graph = PairingGraph::new();
        graph.insert("Windmill Entrance", "Cube Cave Exit");

        assert_eq!(graph.partner("Windmill Entrance"), Some("Cube Cave Exit"));
        assert_eq!(graph.partner("Cube Cave Exit"), Some("Windmill Entrance"));
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn unknown_door_has_no_partner() {
        let graph = PairingGraph::new();
        assert_eq!(graph.partner("Windmill Entrance"), None);
        assert!(graph.is_empty());
    }

    #[test]
    fn repairing_drops_stale_edge() {
        let mut graph = PairingGraph::new();
        graph.insert("A", "B");
        graph.insert("A", "C");

        assert_eq!(graph.partner("A"), Some("C"));
        assert_eq!(graph.partner("C"), Some("A"));
        assert_eq!(graph.partner("B"), None);
    }

    #[test]
    fn shop_terminal_keeps_every_incoming_edge() {
        let mut graph = PairingGraph::new();
        graph.insert("Windmill Shop", "Shop Portal");
        graph.insert("Atoll Shop", "Shop Portal");

        assert_eq!(graph.partner("Windmill Shop"), Some("Shop Portal"));
        assert_eq!(graph.partner("Atoll Shop"), Some("Shop Portal"));
        assert_eq!(graph.partner("Shop Portal"), Some("Atoll Shop"));
    }

    #[test]
    fn self_pairing() {
        let mut graph = PairingGraph::new();
        graph.insert("Loop", "Loop");
        assert_eq!(graph.partner("Loop"), Some("Loop"));
        assert_eq!(graph.len(), 1);
    }

    proptest! {
        #[test]
        fn every_edge_has_its_reverse(pairs in prop::collection::vec(("[a-f]", "[a-f]"), 0..40)) {
            let mut graph = PairingGraph::new();
            for (a, b) in &pairs {
                graph.insert(a, b);
            }

            for (from, to) in graph.iter() {
                prop_assert_eq!(graph.partner(to), Some(from));
            }
        }

        #[test]
        fn last_insert_wins(pairs in prop::collection::vec(("[a-z]{1,3}", "[a-z]{1,3}"), 1..20)) {
            let mut graph = PairingGraph::new();
            for (a, b) in &pairs {
                graph.insert(a, b);
            }

            let (a, b) = pairs.last().unwrap();
            prop_assert_eq!(graph.partner(a), Some(b.as_str()));
            prop_assert_eq!(graph.partner(b), Some(a.as_str()));
        }
    }
}
