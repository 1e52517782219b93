//! Per-switch active and reactive flow inside a voltage level.
//!
//! Closed switches and internal connections form an undirected graph over
//! node ids. Within each island a spanning tree rooted at the lowest node is
//! built by DFS; every tree switch carries the summed injections of the
//! subtree behind it (switches are lossless), while closed switches outside
//! the tree, and loop switches, carry zero. Open switches carry no flow at
//! all.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use gridvar_core::{compute_connected_components, GvResult, TraverseResult, UndirectedGraph};

/// A switch between two nodes of a voltage level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitchDef {
    pub id: String,
    pub node1: usize,
    pub node2: usize,
    pub open: bool,
}

impl SwitchDef {
    pub fn closed(id: impl Into<String>, node1: usize, node2: usize) -> Self {
        Self {
            id: id.into(),
            node1,
            node2,
            open: false,
        }
    }

    pub fn open(id: impl Into<String>, node1: usize, node2: usize) -> Self {
        Self {
            id: id.into(),
            node1,
            node2,
            open: true,
        }
    }
}

/// Net injection at a node; NaN components count as zero.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Injection {
    pub p: f64,
    pub q: f64,
}

impl Injection {
    pub fn new(p: f64, q: f64) -> Self {
        Self { p, q }
    }
}

/// Flow through one switch, as entering each side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwitchFlow {
    pub p1: f64,
    pub q1: f64,
    pub p2: f64,
    pub q2: f64,
}

impl SwitchFlow {
    fn zero() -> Self {
        Self {
            p1: 0.0,
            q1: 0.0,
            p2: 0.0,
            q2: 0.0,
        }
    }
}

/// Result of distributing node injections over the closed switches of a
/// voltage level.
#[derive(Debug, Clone, Default)]
pub struct SwitchesFlow {
    flows: HashMap<String, SwitchFlow>,
    island_count: usize,
}

impl SwitchesFlow {
    /// Distributes `injections` over `switches` and `internal_connections`.
    ///
    /// Internal connections are unnamed zero-impedance edges: they carry
    /// flow in the tree but never appear in the result. Switches connecting
    /// a node to itself are kept in the result with zero flow.
    pub fn compute(
        switches: &[SwitchDef],
        internal_connections: &[(usize, usize)],
        injections: &HashMap<usize, Injection>,
    ) -> GvResult<Self> {
        let mut graph: UndirectedGraph<(), usize> = UndirectedGraph::new();
        let mut flows = HashMap::new();

        for (i, sw) in switches.iter().enumerate() {
            if sw.open {
                continue;
            }
            if sw.node1 == sw.node2 {
                flows.insert(sw.id.clone(), SwitchFlow::zero());
                continue;
            }
            graph.add_vertex_if_not_present(sw.node1);
            graph.add_vertex_if_not_present(sw.node2);
            graph.add_edge(sw.node1, sw.node2, Some(i))?;
        }
        for &(node1, node2) in internal_connections {
            if node1 == node2 {
                continue;
            }
            graph.add_vertex_if_not_present(node1);
            graph.add_vertex_if_not_present(node2);
            graph.add_edge(node1, node2, None)?;
        }

        let mut adjacency = vec![Vec::new(); graph.max_vertex()];
        for e in graph.edges() {
            let v1 = graph.edge_vertex1(e)?;
            let v2 = graph.edge_vertex2(e)?;
            adjacency[v1].push(v2);
            adjacency[v2].push(v1);
        }
        let components = compute_connected_components(&adjacency);

        // One root per island: the lowest node id. vertices() ascends, so
        // the first sighting of a component is its root.
        let mut roots: BTreeMap<usize, usize> = BTreeMap::new();
        for v in graph.vertices() {
            roots.entry(components.component_number[v]).or_insert(v);
        }
        let island_count = roots.len();
        debug!(
            "Distributing switch flows over {} island(s) of {} node(s)",
            island_count,
            graph.vertex_count()
        );

        let mut accumulated: HashMap<usize, (f64, f64)> = HashMap::new();
        for v in graph.vertices() {
            if let Some(injection) = injections.get(&v) {
                let p = if injection.p.is_nan() { 0.0 } else { injection.p };
                let q = if injection.q.is_nan() { 0.0 } else { injection.q };
                accumulated.insert(v, (p, q));
            }
        }

        for &root in roots.values() {
            // (parent, edge, child) in DFS pre-order; reversed, every child
            // is finalized before its parent accumulates it.
            let mut tree: Vec<(usize, usize, usize)> = Vec::new();
            graph.traverse(root, &mut |parent, e, child| {
                tree.push((parent, e, child));
                TraverseResult::Continue
            })?;

            for &(parent, e, child) in tree.iter().rev() {
                let (p, q) = accumulated.remove(&child).unwrap_or((0.0, 0.0));
                if let Some(&switch_index) = graph.edge_object(e)? {
                    let sw = &switches[switch_index];
                    let flow = if sw.node1 == parent {
                        SwitchFlow {
                            p1: p,
                            q1: q,
                            p2: -p,
                            q2: -q,
                        }
                    } else {
                        SwitchFlow {
                            p1: -p,
                            q1: -q,
                            p2: p,
                            q2: q,
                        }
                    };
                    flows.insert(sw.id.clone(), flow);
                }
                let entry = accumulated.entry(parent).or_insert((0.0, 0.0));
                entry.0 += p;
                entry.1 += q;
            }
        }

        // Closed switches the trees never used (parallel paths, meshes)
        // carry zero flow.
        for sw in switches {
            if !sw.open && !flows.contains_key(&sw.id) {
                flows.insert(sw.id.clone(), SwitchFlow::zero());
            }
        }

        Ok(Self {
            flows,
            island_count,
        })
    }

    pub fn has_flow(&self, switch_id: &str) -> bool {
        self.flows.contains_key(switch_id)
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    pub fn island_count(&self) -> usize {
        self.island_count
    }

    pub fn p1(&self, switch_id: &str) -> f64 {
        self.flows.get(switch_id).map(|f| f.p1).unwrap_or(0.0)
    }

    pub fn q1(&self, switch_id: &str) -> f64 {
        self.flows.get(switch_id).map(|f| f.q1).unwrap_or(0.0)
    }

    pub fn p2(&self, switch_id: &str) -> f64 {
        self.flows.get(switch_id).map(|f| f.p2).unwrap_or(0.0)
    }

    pub fn q2(&self, switch_id: &str) -> f64 {
        self.flows.get(switch_id).map(|f| f.q2).unwrap_or(0.0)
    }
}
