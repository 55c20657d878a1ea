//! All-pairs shortest path table with last-edge reconstruction.
//!
//! Built by Floyd-Warshall relaxation. Iteration is deterministic: direct
//! entries are seeded in ascending vertex, then ascending edge id order, and
//! relaxation runs over intermediate, source, and target vertices in
//! ascending order. Only strict improvements replace an entry, so among
//! equally cheap paths the first one found wins.

use crate::graph::directed::{RoutingGraph, Weight};
use crate::identifiers::{EdgeId, VertexId};

/// Best known way to reach a target from a source.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathEntry<W> {
    pub weight: W,
    /// Edge arriving at the target, `None` on the diagonal
    pub last_edge: Option<EdgeId>,
}

/// A reconstructed path.
#[derive(Clone, Debug, PartialEq)]
pub struct Path<W> {
    pub weight: W,
    pub edges: Vec<EdgeId>,
}

/// Square table indexed by `[source][target]`; `None` means unreachable.
#[derive(Clone, Debug, PartialEq)]
pub struct ShortestPathIndex<W> {
    table: Vec<Vec<Option<PathEntry<W>>>>,
}

impl<W: Weight> ShortestPathIndex<W> {
    pub fn build(graph: &RoutingGraph<W>) -> Self {
        let vertex_count = graph.vertex_count();
        let mut table = vec![vec![None; vertex_count]; vertex_count];

        for (source, row) in table.iter_mut().enumerate() {
            row[source] = Some(PathEntry {
                weight: W::ZERO,
                last_edge: None,
            });

            for &edge_id in graph.outgoing_edges(VertexId::next(source)) {
                let Some(edge) = graph.edge(edge_id) else {
                    continue;
                };
                let entry = &mut row[edge.to.index()];
                if entry.map_or(true, |current| edge.weight < current.weight) {
                    *entry = Some(PathEntry {
                        weight: edge.weight,
                        last_edge: Some(edge_id),
                    });
                }
            }
        }

        for through in 0..vertex_count {
            for source in 0..vertex_count {
                let Some(first) = table[source][through] else {
                    continue;
                };
                for target in 0..vertex_count {
                    let Some(second) = table[through][target] else {
                        continue;
                    };
                    let candidate = first.weight + second.weight;
                    let entry = &mut table[source][target];
                    if entry.map_or(true, |current| candidate < current.weight) {
                        *entry = Some(PathEntry {
                            weight: candidate,
                            last_edge: second.last_edge.or(first.last_edge),
                        });
                    }
                }
            }
        }

        Self { table }
    }

    /// Restore a previously built table.
    pub(crate) fn from_table(table: Vec<Vec<Option<PathEntry<W>>>>) -> Self {
        Self { table }
    }

    pub fn vertex_count(&self) -> usize {
        self.table.len()
    }

    /// Rows of the table, one per source vertex
    pub fn rows(&self) -> &[Vec<Option<PathEntry<W>>>] {
        &self.table
    }

    pub fn entry(&self, from: VertexId, to: VertexId) -> Option<&PathEntry<W>> {
        self.table.get(from.index())?.get(to.index())?.as_ref()
    }

    /// Walk last edges back from `to` until `from` is reached.
    pub fn path(&self, graph: &RoutingGraph<W>, from: VertexId, to: VertexId) -> Option<Path<W>> {
        let weight = self.entry(from, to)?.weight;

        let mut edges = Vec::new();
        let mut cursor = self.entry(from, to)?.last_edge;
        while let Some(edge_id) = cursor {
            // A chain longer than the edge set means the table is inconsistent
            if edges.len() >= graph.edge_count() {
                log::warn!("Shortest path chain {} -> {} does not terminate", from, to);
                return None;
            }
            edges.push(edge_id);
            let edge = graph.edge(edge_id)?;
            cursor = self.entry(from, edge.from)?.last_edge;
        }
        edges.reverse();

        Some(Path { weight, edges })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::directed::Edge;

    fn v(raw: u32) -> VertexId {
        VertexId::new(raw)
    }

    fn chain() -> RoutingGraph<u32> {
        // 0 -> 1 -> 2 -> 3 with a shortcut 0 -> 2
        let mut graph = RoutingGraph::new(4);
        graph.add_edge(Edge::new(v(0), v(1), 1));
        graph.add_edge(Edge::new(v(1), v(2), 1));
        graph.add_edge(Edge::new(v(2), v(3), 1));
        graph.add_edge(Edge::new(v(0), v(2), 5));
        graph
    }

    #[test]
    fn test_table_entries() {
        let graph = chain();
        let index = ShortestPathIndex::build(&graph);

        assert_eq!(index.vertex_count(), 4);
        assert_eq!(index.entry(v(0), v(3)).map(|e| e.weight), Some(3));
        assert_eq!(index.entry(v(0), v(3)).and_then(|e| e.last_edge), Some(EdgeId::new(2)));
        assert_eq!(index.entry(v(3), v(0)), None);
        assert_eq!(
            index.entry(v(1), v(1)),
            Some(&PathEntry {
                weight: 0,
                last_edge: None
            })
        );
    }

    #[test]
    fn test_path_reconstruction() {
        let graph = chain();
        let index = ShortestPathIndex::build(&graph);

        let path = index.path(&graph, v(0), v(3)).unwrap();
        assert_eq!(path.weight, 3);
        assert_eq!(path.edges, vec![EdgeId::new(0), EdgeId::new(1), EdgeId::new(2)]);

        let path = index.path(&graph, v(1), v(3)).unwrap();
        assert_eq!(path.edges, vec![EdgeId::new(1), EdgeId::new(2)]);
    }

    #[test]
    fn test_equal_weight_tie_keeps_first() {
        // 0 -> 1 directly (2) or through 2 (1 + 1)
        let mut graph = RoutingGraph::new(3);
        let direct = graph.add_edge(Edge::new(v(0), v(1), 2u32));
        graph.add_edge(Edge::new(v(0), v(2), 1));
        graph.add_edge(Edge::new(v(2), v(1), 1));
        let index = ShortestPathIndex::build(&graph);

        let path = index.path(&graph, v(0), v(1)).unwrap();
        assert_eq!(path.weight, 2);
        assert_eq!(path.edges, vec![direct]);
    }

    #[test]
    fn test_zero_weight_cycle_terminates() {
        let mut graph = RoutingGraph::new(3);
        graph.add_edge(Edge::new(v(0), v(1), 0u32));
        graph.add_edge(Edge::new(v(1), v(0), 0));
        graph.add_edge(Edge::new(v(1), v(2), 0));
        let index = ShortestPathIndex::build(&graph);

        let path = index.path(&graph, v(0), v(2)).unwrap();
        assert_eq!(path.weight, 0);
        assert_eq!(path.edges, vec![EdgeId::new(0), EdgeId::new(2)]);
    }

    #[test]
    fn test_inconsistent_table_is_rejected() {
        let graph = chain();
        // Every entry claims to arrive over edge 1, so the walk never reaches 0
        let table = vec![
            vec![
                Some(PathEntry {
                    weight: 1,
                    last_edge: Some(EdgeId::new(1))
                });
                4
            ];
            4
        ];
        let index = ShortestPathIndex::from_table(table);
        assert!(index.path(&graph, v(0), v(3)).is_none());
    }
}
