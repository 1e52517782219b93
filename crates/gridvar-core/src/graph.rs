//! Generic undirected multigraph keyed by dense integer ids.
//!
//! [`UndirectedGraph`] backs every topology view in gridvar: vertices and
//! edges live in dense slot arrays whose indices are stable for the lifetime
//! of the graph, freed slots are recycled lowest-index-first on the next add,
//! and neighbor queries go through a lazily rebuilt adjacency cache.
//!
//! Payloads stored on vertices and edges are expected to be lightweight
//! handles (ids, indices) into caller-owned storage; the graph never manages
//! the lifetime of the domain objects they denote.
//!
//! Structural mutation requires `&mut self`, so concurrent mutation is ruled
//! out at compile time. Read-only traversals may run from several threads at
//! once: the adjacency cache rebuild is serialized by an internal mutex and
//! readers work on an `Arc` snapshot.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::{GvError, GvResult};

/// Signal returned by a traverser callback for each edge reached during DFS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraverseResult {
    /// Mark the neighbor visited and recurse into it.
    Continue,
    /// Do not recurse into this neighbor, but keep examining siblings.
    TerminatePath,
    /// Abort the whole traversal immediately.
    TerminateTraverser,
}

/// An ordered sequence of edge indices, as produced by
/// [`UndirectedGraph::find_all_paths`].
pub type Path = Vec<usize>;

#[derive(Debug)]
struct Vertex<V> {
    object: Option<V>,
}

impl<V> Vertex<V> {
    fn new() -> Self {
        Self { object: None }
    }
}

#[derive(Debug)]
struct Edge<E> {
    vertex1: usize,
    vertex2: usize,
    object: Option<E>,
}

/// Mutable undirected multigraph with index recycling.
///
/// See the [module documentation](self) for the storage model. Both graph
/// algorithms ([`traverse`](Self::traverse) and
/// [`find_all_paths`](Self::find_all_paths)) are recursive: one stack frame
/// per graph depth. Path enumeration is exhaustive backtracking and therefore
/// exponential in the worst case; do not call it on large meshed topologies
/// expecting polynomial behavior.
#[derive(Debug)]
pub struct UndirectedGraph<V, E> {
    vertices: Vec<Option<Vertex<V>>>,
    edges: Vec<Option<Edge<E>>>,
    available_vertices: BTreeSet<usize>,
    removed_edges: BTreeSet<usize>,
    adjacency_list: Mutex<Arc<Vec<Vec<usize>>>>,
}

const NEIGHBORS_CAPACITY: usize = 2;

impl<V, E> Default for UndirectedGraph<V, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, E> UndirectedGraph<V, E> {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            edges: Vec::new(),
            available_vertices: BTreeSet::new(),
            removed_edges: BTreeSet::new(),
            adjacency_list: Mutex::new(Arc::new(Vec::new())),
        }
    }

    /// Allocates a new vertex, reusing the smallest freed index if any.
    pub fn add_vertex(&mut self) -> usize {
        let v = match self.available_vertices.pop_first() {
            Some(v) => {
                self.vertices[v] = Some(Vertex::new());
                v
            }
            None => {
                self.vertices.push(Some(Vertex::new()));
                self.vertices.len() - 1
            }
        };
        self.invalidate_adjacency_list();
        v
    }

    /// Ensures a vertex exists at exactly `v`.
    ///
    /// If `v` lies beyond the current slot array, all intermediate indices
    /// are created free and `v` itself is created present. Used by callers
    /// that assign externally meaningful ids, such as node-breaker node
    /// numbers.
    pub fn add_vertex_if_not_present(&mut self, v: usize) {
        if v < self.vertices.len() {
            if self.available_vertices.remove(&v) {
                self.vertices[v] = Some(Vertex::new());
            }
        } else {
            for i in self.vertices.len()..v {
                self.available_vertices.insert(i);
            }
            self.vertices.resize_with(v + 1, || None);
            self.vertices[v] = Some(Vertex::new());
        }
        self.invalidate_adjacency_list();
    }

    /// Adds an edge between two existing vertices and returns its index,
    /// recycling a freed edge slot if one exists.
    pub fn add_edge(&mut self, v1: usize, v2: usize, object: Option<E>) -> GvResult<usize> {
        self.check_vertex(v1)?;
        self.check_vertex(v2)?;

        let edge = Edge {
            vertex1: v1,
            vertex2: v2,
            object,
        };
        let e = match self.removed_edges.pop_first() {
            Some(e) => {
                self.edges[e] = Some(edge);
                e
            }
            None => {
                self.edges.push(Some(edge));
                self.edges.len() - 1
            }
        };
        self.invalidate_adjacency_list();
        Ok(e)
    }

    /// Removes a vertex and returns its payload.
    ///
    /// Fails if any live edge still references `v`; the graph is left
    /// unmodified in that case. Removing the highest slot shrinks the array
    /// and cascades through contiguous trailing freed slots.
    pub fn remove_vertex(&mut self, v: usize) -> GvResult<Option<V>> {
        self.check_vertex(v)?;

        for edge in self.edges.iter().flatten() {
            if edge.vertex1 == v || edge.vertex2 == v {
                return Err(GvError::EdgeConnectedToVertex(v));
            }
        }

        Ok(self.detach_vertex(v))
    }

    /// Frees the slot of a vertex known to be live and unreferenced.
    fn detach_vertex(&mut self, v: usize) -> Option<V> {
        let object = self.vertices[v].take().and_then(|vertex| vertex.object);
        if v == self.vertices.len() - 1 {
            self.vertices.pop();
            if let Some(prev) = v.checked_sub(1) {
                self.clean_vertices(prev);
            }
        } else {
            self.available_vertices.insert(v);
        }
        self.invalidate_adjacency_list();
        object
    }

    /// Pops contiguous trailing freed slots, starting at `v` and walking
    /// backwards until a live slot is met.
    fn clean_vertices(&mut self, v: usize) {
        let mut i = v;
        loop {
            if !self.available_vertices.remove(&i) {
                return;
            }
            self.vertices.pop();
            match i.checked_sub(1) {
                Some(prev) => i = prev,
                None => return,
            }
        }
    }

    /// Removes an edge and returns its payload.
    pub fn remove_edge(&mut self, e: usize) -> GvResult<Option<E>> {
        self.check_edge(e)?;

        let object = self.edges[e].take().and_then(|edge| edge.object);
        if e == self.edges.len() - 1 {
            self.edges.pop();
        } else {
            self.removed_edges.insert(e);
        }
        self.invalidate_adjacency_list();
        Ok(object)
    }

    /// Clears all edges unconditionally.
    pub fn remove_all_edges(&mut self) {
        self.edges.clear();
        self.removed_edges.clear();
        self.invalidate_adjacency_list();
    }

    /// Clears all vertices; fails while any edge slot remains.
    pub fn remove_all_vertices(&mut self) -> GvResult<()> {
        if !self.edges.is_empty() {
            return Err(GvError::EdgesStillPresent);
        }
        self.vertices.clear();
        self.available_vertices.clear();
        self.invalidate_adjacency_list();
        Ok(())
    }

    /// Removes every vertex that has no incident edge and carries no payload.
    ///
    /// A vertex with a payload is kept even when unconnected: it still means
    /// something to the caller.
    pub fn remove_isolated_vertices(&mut self) {
        let mut connected = BTreeSet::new();
        for edge in self.edges.iter().flatten() {
            connected.insert(edge.vertex1);
            connected.insert(edge.vertex2);
        }

        let isolated: Vec<usize> = self
            .vertices
            .iter()
            .enumerate()
            .filter_map(|(v, slot)| match slot {
                Some(vertex) if vertex.object.is_none() && !connected.contains(&v) => Some(v),
                _ => None,
            })
            .collect();

        for v in isolated {
            self.detach_vertex(v);
        }
    }

    /// Number of live vertices (total slots minus freed slots).
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() - self.available_vertices.len()
    }

    /// Number of live edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len() - self.removed_edges.len()
    }

    /// Length of the vertex slot array; may exceed [`vertex_count`](Self::vertex_count).
    pub fn max_vertex(&self) -> usize {
        self.vertices.len()
    }

    pub fn vertex_exists(&self, v: usize) -> bool {
        matches!(self.vertices.get(v), Some(Some(_)))
    }

    /// Live vertex indices, ascending.
    pub fn vertices(&self) -> impl Iterator<Item = usize> + '_ {
        self.vertices
            .iter()
            .enumerate()
            .filter_map(|(v, slot)| slot.as_ref().map(|_| v))
    }

    /// Live edge indices, ascending.
    pub fn edges(&self) -> impl Iterator<Item = usize> + '_ {
        self.edges
            .iter()
            .enumerate()
            .filter_map(|(e, slot)| slot.as_ref().map(|_| e))
    }

    /// Payloads of live vertices that carry one, in index order.
    pub fn vertex_objects(&self) -> impl Iterator<Item = &V> + '_ {
        self.vertices
            .iter()
            .filter_map(|slot| slot.as_ref().and_then(|vertex| vertex.object.as_ref()))
    }

    /// Payloads of live edges that carry one, in index order.
    pub fn edge_objects(&self) -> impl Iterator<Item = &E> + '_ {
        self.edges
            .iter()
            .filter_map(|slot| slot.as_ref().and_then(|edge| edge.object.as_ref()))
    }

    pub fn vertex_object(&self, v: usize) -> GvResult<Option<&V>> {
        match self.vertices.get(v) {
            Some(Some(vertex)) => Ok(vertex.object.as_ref()),
            _ => Err(GvError::VertexNotFound(v)),
        }
    }

    pub fn set_vertex_object(&mut self, v: usize, object: Option<V>) -> GvResult<()> {
        match self.vertices.get_mut(v) {
            Some(Some(vertex)) => {
                vertex.object = object;
                Ok(())
            }
            _ => Err(GvError::VertexNotFound(v)),
        }
    }

    pub fn edge_object(&self, e: usize) -> GvResult<Option<&E>> {
        match self.edges.get(e) {
            Some(Some(edge)) => Ok(edge.object.as_ref()),
            _ => Err(GvError::EdgeNotFound(e)),
        }
    }

    pub fn edge_vertex1(&self, e: usize) -> GvResult<usize> {
        match self.edges.get(e) {
            Some(Some(edge)) => Ok(edge.vertex1),
            _ => Err(GvError::EdgeNotFound(e)),
        }
    }

    pub fn edge_vertex2(&self, e: usize) -> GvResult<usize> {
        match self.edges.get(e) {
            Some(Some(edge)) => Ok(edge.vertex2),
            _ => Err(GvError::EdgeNotFound(e)),
        }
    }

    /// Payloads of every edge directly connecting `v1` and `v2`, in either
    /// orientation, resolved through the adjacency cache.
    pub fn edge_objects_between(&self, v1: usize, v2: usize) -> GvResult<Vec<&E>> {
        self.check_vertex(v1)?;
        self.check_vertex(v2)?;

        let adjacency = self.adjacency_list();
        let mut objects = Vec::new();
        for &e in &adjacency[v1] {
            if let Some(Some(edge)) = self.edges.get(e) {
                let direct = edge.vertex1 == v1 && edge.vertex2 == v2;
                let reversed = edge.vertex1 == v2 && edge.vertex2 == v1;
                if direct || reversed {
                    if let Some(object) = edge.object.as_ref() {
                        objects.push(object);
                    }
                }
            }
        }
        Ok(objects)
    }

    pub fn check_vertex(&self, v: usize) -> GvResult<()> {
        match self.vertices.get(v) {
            Some(Some(_)) => Ok(()),
            _ => Err(GvError::VertexNotFound(v)),
        }
    }

    pub fn check_edge(&self, e: usize) -> GvResult<()> {
        match self.edges.get(e) {
            Some(Some(_)) => Ok(()),
            _ => Err(GvError::EdgeNotFound(e)),
        }
    }

    /// Snapshot of the vertex → incident-edge-indices mapping, rebuilt on
    /// demand when stale.
    ///
    /// Staleness is a coarse check: the cached list is rebuilt whenever its
    /// vertex dimension no longer matches the slot array (every structural
    /// mutation resets the cache to an empty list). Rebuild cost is O(V+E).
    fn adjacency_list(&self) -> Arc<Vec<Vec<usize>>> {
        let mut cached = self
            .adjacency_list
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if cached.len() != self.vertices.len() {
            let mut list: Vec<Vec<usize>> = self
                .vertices
                .iter()
                .map(|slot| match slot {
                    Some(_) => Vec::with_capacity(NEIGHBORS_CAPACITY),
                    None => Vec::new(),
                })
                .collect();
            for (e, slot) in self.edges.iter().enumerate() {
                if let Some(edge) = slot {
                    list[edge.vertex1].push(e);
                    list[edge.vertex2].push(e);
                }
            }
            *cached = Arc::new(list);
        }
        Arc::clone(&cached)
    }

    fn invalidate_adjacency_list(&mut self) {
        *self
            .adjacency_list
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Arc::new(Vec::new());
    }

    /// Single-source DFS with a fresh visited set.
    ///
    /// For each unvisited neighbor reached via an incident edge, the
    /// traverser is invoked with `(other_endpoint, edge, neighbor)` and its
    /// [`TraverseResult`] decides whether to recurse, skip the branch, or
    /// abort everything. Returns `false` iff the traversal was aborted.
    pub fn traverse<F>(&self, v: usize, traverser: &mut F) -> GvResult<bool>
    where
        F: FnMut(usize, usize, usize) -> TraverseResult,
    {
        let mut encountered = vec![false; self.vertices.len()];
        self.traverse_with(v, traverser, &mut encountered)
    }

    /// Single-source DFS sharing a caller-supplied visited set, so several
    /// start vertices can be explored in one logical pass.
    pub fn traverse_with<F>(
        &self,
        v: usize,
        traverser: &mut F,
        encountered: &mut Vec<bool>,
    ) -> GvResult<bool>
    where
        F: FnMut(usize, usize, usize) -> TraverseResult,
    {
        self.check_vertex(v)?;
        encountered.resize(self.vertices.len(), false);

        let adjacency = self.adjacency_list();
        encountered[v] = true;
        let mut keep_going = true;
        for &e in &adjacency[v] {
            let edge = match &self.edges[e] {
                Some(edge) => edge,
                None => continue,
            };
            let (v1, v2) = (edge.vertex1, edge.vertex2);
            if !encountered[v1] {
                match traverser(v2, e, v1) {
                    TraverseResult::Continue => {
                        encountered[v1] = true;
                        keep_going = self.traverse_with(v1, traverser, encountered)?;
                    }
                    TraverseResult::TerminateTraverser => keep_going = false,
                    TraverseResult::TerminatePath => {}
                }
            } else if !encountered[v2] {
                match traverser(v1, e, v2) {
                    TraverseResult::Continue => {
                        encountered[v2] = true;
                        keep_going = self.traverse_with(v2, traverser, encountered)?;
                    }
                    TraverseResult::TerminateTraverser => keep_going = false,
                    TraverseResult::TerminatePath => {}
                }
            }
            if !keep_going {
                break;
            }
        }
        Ok(keep_going)
    }

    /// Runs the single-source DFS for each start vertex not yet visited,
    /// sharing one visited set; stops at the first aborted sub-traversal.
    pub fn traverse_from<F>(&self, starting_vertices: &[usize], traverser: &mut F) -> GvResult<bool>
    where
        F: FnMut(usize, usize, usize) -> TraverseResult,
    {
        let mut encountered = vec![false; self.vertices.len()];
        for &v in starting_vertices {
            self.check_vertex(v)?;
            if !encountered[v] && !self.traverse_with(v, traverser, &mut encountered)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Enumerates every simple path from `v` to any vertex whose payload
    /// satisfies `path_complete`, treating edges whose payload satisfies
    /// `path_canceled` as absent.
    ///
    /// Paths are returned sorted by ascending edge count; same-length paths
    /// keep discovery order (stable sort). Each branch backtracks on its own
    /// copy of the visited set, which makes the enumeration exhaustive and
    /// exponential in the worst case.
    pub fn find_all_paths<FV, FE>(
        &self,
        v: usize,
        path_complete: &mut FV,
        path_canceled: &mut FE,
    ) -> GvResult<Vec<Path>>
    where
        FV: FnMut(Option<&V>) -> bool,
        FE: FnMut(Option<&E>) -> bool,
    {
        let mut paths = Vec::new();
        let mut encountered = vec![false; self.vertices.len()];
        let path = Path::new();
        self.find_paths_from(v, path_complete, path_canceled, &path, &mut encountered, &mut paths)?;
        paths.sort_by_key(Vec::len);
        Ok(paths)
    }

    fn find_paths_from<FV, FE>(
        &self,
        v: usize,
        path_complete: &mut FV,
        path_canceled: &mut FE,
        path: &Path,
        encountered: &mut Vec<bool>,
        paths: &mut Vec<Path>,
    ) -> GvResult<()>
    where
        FV: FnMut(Option<&V>) -> bool,
        FE: FnMut(Option<&E>) -> bool,
    {
        self.check_vertex(v)?;
        encountered[v] = true;

        let adjacency = self.adjacency_list();
        for &e in &adjacency[v] {
            let edge = match &self.edges[e] {
                Some(edge) => edge,
                None => continue,
            };
            if path_canceled(edge.object.as_ref()) {
                continue;
            }

            let next = if v == edge.vertex2 {
                edge.vertex1
            } else if v == edge.vertex1 {
                edge.vertex2
            } else {
                return Err(GvError::EdgeNotIncident(e, v));
            };

            // Sibling branches must not interfere: each gets its own copy of
            // the path-so-far and the visited set.
            let mut branch_path = path.clone();
            let mut branch_encountered = encountered.clone();
            self.step_path(
                e,
                next,
                path_complete,
                path_canceled,
                &mut branch_path,
                &mut branch_encountered,
                paths,
            )?;
        }
        Ok(())
    }

    /// Extends the path by one edge, recording it if the new vertex
    /// completes it and recursing otherwise.
    #[allow(clippy::too_many_arguments)]
    fn step_path<FV, FE>(
        &self,
        e: usize,
        v: usize,
        path_complete: &mut FV,
        path_canceled: &mut FE,
        path: &mut Path,
        encountered: &mut Vec<bool>,
        paths: &mut Vec<Path>,
    ) -> GvResult<()>
    where
        FV: FnMut(Option<&V>) -> bool,
        FE: FnMut(Option<&E>) -> bool,
    {
        if encountered[v] {
            return Ok(());
        }

        let vertex = match self.vertices.get(v) {
            Some(Some(vertex)) => vertex,
            _ => return Err(GvError::VertexNotFound(v)),
        };
        path.push(e);
        if path_complete(vertex.object.as_ref()) {
            paths.push(std::mem::take(path));
            return Ok(());
        }

        let prefix = path.clone();
        self.find_paths_from(v, path_complete, path_canceled, &prefix, encountered, paths)
    }
}
