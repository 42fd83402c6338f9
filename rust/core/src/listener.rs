// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Listener registry
//!
//! Consumers receive entities through ordered chains of sinks, one chain per
//! entity kind. Each entity walks its chain in registration order until a sink
//! returns [`Visit::Stop`]; the next entity starts again at the head of the
//! chain. The parser never keeps entities itself.
//!
//! Closures implement the sink traits, so the common case is:
//!
//! ```rust,ignore
//! let mut count = 0;
//! parser.register_node_listener(|_: &Node| {
//!     count += 1;
//!     Visit::Continue
//! });
//! ```

use crate::entity::{Element, Node, PhysicalGroup};

/// Whether the rest of the chain should see the current entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    Continue,
    Stop,
}

impl From<bool> for Visit {
    /// `true` continues, `false` stops
    #[inline]
    fn from(keep_going: bool) -> Self {
        if keep_going {
            Visit::Continue
        } else {
            Visit::Stop
        }
    }
}

pub trait NodeSink {
    fn visit(&mut self, node: &Node) -> Visit;
}

pub trait ElementSink {
    fn visit(&mut self, element: &Element) -> Visit;
}

pub trait PhysicalNameSink {
    fn visit(&mut self, group: &PhysicalGroup) -> Visit;
}

impl<F> NodeSink for F
where
    F: FnMut(&Node) -> Visit,
{
    #[inline]
    fn visit(&mut self, node: &Node) -> Visit {
        self(node)
    }
}

impl<F> ElementSink for F
where
    F: FnMut(&Element) -> Visit,
{
    #[inline]
    fn visit(&mut self, element: &Element) -> Visit {
        self(element)
    }
}

impl<F> PhysicalNameSink for F
where
    F: FnMut(&PhysicalGroup) -> Visit,
{
    #[inline]
    fn visit(&mut self, group: &PhysicalGroup) -> Visit {
        self(group)
    }
}

/// Walk one chain; `Stop` if some sink short-circuited it
fn run_chain<T: ?Sized, E>(
    chain: &mut [Box<T>],
    entity: &E,
    visit: impl Fn(&mut T, &E) -> Visit,
) -> Visit {
    for sink in chain.iter_mut() {
        if visit(sink.as_mut(), entity) == Visit::Stop {
            return Visit::Stop;
        }
    }
    Visit::Continue
}

/// Three ordered sink chains. Sinks may borrow caller state for `'a`.
#[derive(Default)]
pub struct ListenerRegistry<'a> {
    nodes: Vec<Box<dyn NodeSink + 'a>>,
    elements: Vec<Box<dyn ElementSink + 'a>>,
    physical_names: Vec<Box<dyn PhysicalNameSink + 'a>>,
}

impl<'a> ListenerRegistry<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_node_listener(&mut self, sink: impl NodeSink + 'a) {
        self.nodes.push(Box::new(sink));
    }

    pub fn register_element_listener(&mut self, sink: impl ElementSink + 'a) {
        self.elements.push(Box::new(sink));
    }

    pub fn register_physical_name_listener(&mut self, sink: impl PhysicalNameSink + 'a) {
        self.physical_names.push(Box::new(sink));
    }

    pub fn dispatch_node(&mut self, node: &Node) -> Visit {
        run_chain(&mut self.nodes, node, |sink, n| sink.visit(n))
    }

    pub fn dispatch_element(&mut self, element: &Element) -> Visit {
        run_chain(&mut self.elements, element, |sink, e| sink.visit(e))
    }

    pub fn dispatch_physical_name(&mut self, group: &PhysicalGroup) -> Visit {
        run_chain(&mut self.physical_names, group, |sink, g| sink.visit(g))
    }

    /// Total number of registered sinks across all chains
    pub fn len(&self) -> usize {
        self.nodes.len() + self.elements.len() + self.physical_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for ListenerRegistry<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("nodes", &self.nodes.len())
            .field("elements", &self.elements.len())
            .field("physical_names", &self.physical_names.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_order() {
        let mut seen = Vec::new();
        {
            let log = std::cell::RefCell::new(&mut seen);
            let mut registry = ListenerRegistry::new();
            registry.register_node_listener(|n: &Node| {
                log.borrow_mut().push(("first", n.tag));
                Visit::Continue
            });
            registry.register_node_listener(|n: &Node| {
                log.borrow_mut().push(("second", n.tag));
                Visit::Continue
            });
            registry.dispatch_node(&Node::new(1, 0.0, 0.0, 0.0));
        }
        assert_eq!(seen, vec![("first", 1), ("second", 1)]);
    }

    #[test]
    fn test_short_circuit_is_per_entity() {
        let mut tail_hits = Vec::new();
        {
            let mut registry = ListenerRegistry::new();
            // Absorb even tags
            registry.register_node_listener(|n: &Node| Visit::from(n.tag % 2 != 0));
            registry.register_node_listener(|n: &Node| {
                tail_hits.push(n.tag);
                Visit::Continue
            });

            assert_eq!(
                registry.dispatch_node(&Node::new(2, 0.0, 0.0, 0.0)),
                Visit::Stop
            );
            assert_eq!(
                registry.dispatch_node(&Node::new(3, 0.0, 0.0, 0.0)),
                Visit::Continue
            );
            assert_eq!(
                registry.dispatch_node(&Node::new(4, 0.0, 0.0, 0.0)),
                Visit::Stop
            );
        }
        assert_eq!(tail_hits, vec![3]);
    }

    #[test]
    fn test_chains_are_independent() {
        let mut groups = 0;
        let mut registry = ListenerRegistry::new();
        registry.register_element_listener(|_: &Element| Visit::Stop);
        registry.register_physical_name_listener(|_: &PhysicalGroup| {
            groups += 1;
            Visit::Continue
        });
        assert_eq!(registry.len(), 2);

        registry.dispatch_element(&Element::new(1, 15, &[], &[1]));
        registry.dispatch_physical_name(&PhysicalGroup::new(1, 2, "wall"));
        drop(registry);
        assert_eq!(groups, 1);
    }

    #[test]
    fn test_empty_chain_continues() {
        let mut registry = ListenerRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(
            registry.dispatch_node(&Node::new(1, 0.0, 0.0, 0.0)),
            Visit::Continue
        );
    }
}
