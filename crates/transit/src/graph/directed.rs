//! Directed weighted graph with an all-pairs shortest path index.

use std::ops::Add;

use crate::graph::shortest_paths::{Path, ShortestPathIndex};
use crate::identifiers::{EdgeId, VertexId};

/// Edge weights: non-negative, totally summable values with a zero.
pub trait Weight: Copy + PartialOrd + Add<Output = Self> {
    const ZERO: Self;
}

impl Weight for f64 {
    const ZERO: Self = 0.0;
}

impl Weight for u32 {
    const ZERO: Self = 0;
}

impl Weight for u64 {
    const ZERO: Self = 0;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge<W> {
    pub from: VertexId,
    pub to: VertexId,
    pub weight: W,
}

impl<W> Edge<W> {
    pub fn new(from: VertexId, to: VertexId, weight: W) -> Self {
        Self { from, to, weight }
    }
}

/// Append-only directed graph over a fixed number of vertices.
///
/// Edges are identified by insertion order. The shortest path index is
/// built once with [`RoutingGraph::build_index`]; adding an edge afterwards
/// discards it and queries return `None` until it is rebuilt.
#[derive(Clone, Debug)]
pub struct RoutingGraph<W = f64> {
    edges: Vec<Edge<W>>,
    incidence: Vec<Vec<EdgeId>>,
    index: Option<ShortestPathIndex<W>>,
}

impl<W: Weight> RoutingGraph<W> {
    pub fn new(vertex_count: usize) -> Self {
        Self {
            edges: Vec::new(),
            incidence: vec![Vec::new(); vertex_count],
            index: None,
        }
    }

    /// Reassemble a graph from its raw parts without recomputation.
    ///
    /// Callers are responsible for consistency: every edge endpoint and every
    /// incidence entry must be in range, and the index must be square over
    /// the vertex count.
    pub(crate) fn from_parts(
        edges: Vec<Edge<W>>,
        incidence: Vec<Vec<EdgeId>>,
        index: Option<ShortestPathIndex<W>>,
    ) -> Self {
        Self {
            edges,
            incidence,
            index,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.incidence.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn add_edge(&mut self, edge: Edge<W>) -> EdgeId {
        debug_assert!(
            edge.from.index() < self.vertex_count() && edge.to.index() < self.vertex_count(),
            "edge {} -> {} outside of {} vertices",
            edge.from,
            edge.to,
            self.vertex_count()
        );

        let id = EdgeId::next(self.edges.len());
        self.incidence[edge.from.index()].push(id);
        self.edges.push(edge);
        self.index = None;
        id
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge<W>> {
        self.edges.get(id.index())
    }

    /// Ids of edges leaving `vertex`, in insertion order
    pub fn outgoing_edges(&self, vertex: VertexId) -> &[EdgeId] {
        self.incidence
            .get(vertex.index())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn edges(&self) -> &[Edge<W>] {
        &self.edges
    }

    pub fn incidence_lists(&self) -> &[Vec<EdgeId>] {
        &self.incidence
    }

    pub fn index(&self) -> Option<&ShortestPathIndex<W>> {
        self.index.as_ref()
    }

    pub fn build_index(&mut self) {
        let index = ShortestPathIndex::build(self);
        log::debug!(
            "Built shortest path index over {} vertices and {} edges",
            self.vertex_count(),
            self.edge_count()
        );
        self.index = Some(index);
    }

    /// Cheapest path between two vertices, `None` if unreachable or the
    /// index has not been built.
    pub fn query(&self, from: VertexId, to: VertexId) -> Option<Path<W>> {
        self.index.as_ref()?.path(self, from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(raw: u32) -> VertexId {
        VertexId::new(raw)
    }

    #[test]
    fn test_edges_get_sequential_ids() {
        let mut graph = RoutingGraph::<u32>::new(3);
        let first = graph.add_edge(Edge::new(v(0), v(1), 2));
        let second = graph.add_edge(Edge::new(v(0), v(2), 6));
        let third = graph.add_edge(Edge::new(v(1), v(2), 3));

        assert_eq!((first.raw(), second.raw(), third.raw()), (0, 1, 2));
        assert_eq!(graph.outgoing_edges(v(0)), &[first, second]);
        assert_eq!(graph.outgoing_edges(v(2)), &[] as &[EdgeId]);
        assert_eq!(graph.outgoing_edges(v(9)), &[] as &[EdgeId]);
        assert_eq!(graph.edge(third), Some(&Edge::new(v(1), v(2), 3)));
        assert_eq!(graph.edge(EdgeId::new(3)), None);
    }

    #[test]
    fn test_two_hops_beat_direct_edge() {
        let mut graph = RoutingGraph::<u32>::new(3);
        let ab = graph.add_edge(Edge::new(v(0), v(1), 2));
        let bc = graph.add_edge(Edge::new(v(1), v(2), 3));
        graph.add_edge(Edge::new(v(0), v(2), 6));
        graph.build_index();

        let path = graph.query(v(0), v(2)).unwrap();
        assert_eq!(path.weight, 5);
        assert_eq!(path.edges, vec![ab, bc]);
    }

    #[test]
    fn test_unreachable_and_self() {
        let mut graph = RoutingGraph::<u32>::new(3);
        graph.add_edge(Edge::new(v(0), v(1), 4));
        graph.build_index();

        assert!(graph.query(v(1), v(0)).is_none());
        assert!(graph.query(v(0), v(2)).is_none());
        assert!(graph.query(v(0), v(7)).is_none());

        let stay = graph.query(v(2), v(2)).unwrap();
        assert_eq!(stay.weight, 0);
        assert!(stay.edges.is_empty());
    }

    #[test]
    fn test_parallel_edges_keep_cheapest() {
        let mut graph = RoutingGraph::<u32>::new(2);
        graph.add_edge(Edge::new(v(0), v(1), 9));
        let cheap = graph.add_edge(Edge::new(v(0), v(1), 4));
        graph.add_edge(Edge::new(v(0), v(1), 4));
        graph.build_index();

        let path = graph.query(v(0), v(1)).unwrap();
        assert_eq!(path.weight, 4);
        assert_eq!(path.edges, vec![cheap]);
    }

    #[test]
    fn test_adding_edge_invalidates_index() {
        let mut graph = RoutingGraph::<f64>::new(2);
        graph.add_edge(Edge::new(v(0), v(1), 1.5));
        assert!(graph.query(v(0), v(1)).is_none());

        graph.build_index();
        assert!(graph.query(v(0), v(1)).is_some());

        graph.add_edge(Edge::new(v(1), v(0), 1.0));
        assert!(graph.index().is_none());
        assert!(graph.query(v(0), v(1)).is_none());

        graph.build_index();
        assert_eq!(graph.query(v(1), v(0)).map(|p| p.weight), Some(1.0));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "outside of 1 vertices")]
    fn test_edge_outside_vertex_range() {
        let mut graph = RoutingGraph::<u32>::new(1);
        graph.add_edge(Edge::new(v(0), v(1), 1));
    }
}
