//! Structural queries: connected components and betweenness centrality.

use std::collections::{HashMap, VecDeque};

use super::store::Graph;
use crate::error::{Result, TopologyError};
use crate::topology::types::NodeId;

impl Graph {
    /// Connected components, largest first
    ///
    /// Components of equal size keep the order of their first-inserted node,
    /// and nodes inside a component keep insertion order.
    pub fn connected_components(&self) -> Vec<Vec<NodeId>> {
        let adjacency = self.adjacency();
        let n = adjacency.len();
        let mut component = vec![usize::MAX; n];
        let mut members: Vec<Vec<usize>> = Vec::new();

        for start in 0..n {
            if component[start] != usize::MAX {
                continue;
            }
            let label = members.len();
            let mut queue = VecDeque::from([start]);
            component[start] = label;
            let mut found = Vec::new();
            while let Some(v) = queue.pop_front() {
                found.push(v);
                for &w in &adjacency[v] {
                    if component[w] == usize::MAX {
                        component[w] = label;
                        queue.push_back(w);
                    }
                }
            }
            found.sort_unstable();
            members.push(found);
        }

        // stable: equal sizes keep discovery order
        members.sort_by(|a, b| b.len().cmp(&a.len()));
        members
            .into_iter()
            .map(|c| c.into_iter().map(|idx| self.id_at(idx).clone()).collect())
            .collect()
    }

    pub fn is_connected(&self) -> bool {
        self.connected_components().len() <= 1
    }

    /// Induced subgraph of the largest connected component
    pub fn largest_component(&self) -> Result<Graph> {
        let components = self.connected_components();
        let largest = components
            .first()
            .ok_or_else(|| TopologyError::malformed("graph has no nodes"))?;
        Ok(self.induced_subgraph(largest.iter()))
    }

    /// Normalized betweenness centrality (Brandes), hop-count paths
    ///
    /// Scores are scaled by `1 / ((n-1)(n-2))`, the undirected normalization:
    /// each unordered pair is counted once from each endpoint. Graphs with
    /// two nodes yield all zeros.
    pub fn betweenness_centrality(&self) -> Result<HashMap<NodeId, f64>> {
        let n = self.node_count();
        if n < 2 {
            return Err(TopologyError::malformed(format!(
                "betweenness needs at least 2 nodes, graph has {}",
                n
            )));
        }
        if self.edge_count() == 0 {
            return Err(TopologyError::malformed("betweenness needs at least one edge"));
        }

        let adjacency = self.adjacency();
        let mut centrality = vec![0.0f64; n];

        let mut stack = Vec::with_capacity(n);
        let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut sigma = vec![0.0f64; n];
        let mut dist = vec![-1i64; n];
        let mut delta = vec![0.0f64; n];
        let mut queue = VecDeque::with_capacity(n);

        for s in 0..n {
            stack.clear();
            for p in preds.iter_mut() {
                p.clear();
            }
            sigma.iter_mut().for_each(|x| *x = 0.0);
            dist.iter_mut().for_each(|x| *x = -1);
            delta.iter_mut().for_each(|x| *x = 0.0);

            sigma[s] = 1.0;
            dist[s] = 0;
            queue.push_back(s);
            while let Some(v) = queue.pop_front() {
                stack.push(v);
                for &w in &adjacency[v] {
                    if dist[w] < 0 {
                        dist[w] = dist[v] + 1;
                        queue.push_back(w);
                    }
                    if dist[w] == dist[v] + 1 {
                        sigma[w] += sigma[v];
                        preds[w].push(v);
                    }
                }
            }

            while let Some(w) = stack.pop() {
                for &v in &preds[w] {
                    delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
                }
                if w != s {
                    centrality[w] += delta[w];
                }
            }
        }

        let scale = if n > 2 {
            1.0 / ((n - 1) as f64 * (n - 2) as f64)
        } else {
            0.0
        };

        Ok(centrality
            .into_iter()
            .enumerate()
            .map(|(idx, c)| (self.id_at(idx).clone(), c * scale))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_components_sorted_by_size() {
        let mut g = Graph::new();
        g.add_edge(10u64, 11u64).unwrap();
        g.add_path([1u64, 2, 3]).unwrap();
        g.add_node(99u64);
        let comps = g.connected_components();
        assert_eq!(comps.len(), 3);
        assert_eq!(comps[0], vec![NodeId::Num(1), NodeId::Num(2), NodeId::Num(3)]);
        assert_eq!(comps[1], vec![NodeId::Num(10), NodeId::Num(11)]);
        assert_eq!(comps[2], vec![NodeId::Num(99)]);
        assert!(!g.is_connected());
    }

    #[test]
    fn test_largest_component_ties_keep_first() {
        let mut g = Graph::new();
        g.add_edge(5u64, 6u64).unwrap();
        g.add_edge(1u64, 2u64).unwrap();
        let lcc = g.largest_component().unwrap();
        let ids: Vec<_> = lcc.node_ids().cloned().collect();
        assert_eq!(ids, vec![NodeId::Num(5), NodeId::Num(6)]);
    }

    #[test]
    fn test_betweenness_path() {
        // 0 - 1 - 2 - 3 - 4
        let mut g = Graph::new();
        g.add_path([0u64, 1, 2, 3, 4]).unwrap();
        let bc = g.betweenness_centrality().unwrap();
        // node 2 lies on pairs (0,3),(0,4),(1,3),(1,4): 4 of C(4,2)=6
        assert!(approx(bc[&NodeId::Num(2)], 4.0 / 6.0));
        assert!(approx(bc[&NodeId::Num(1)], 3.0 / 6.0));
        assert!(approx(bc[&NodeId::Num(0)], 0.0));
    }

    #[test]
    fn test_betweenness_star() {
        let mut g = Graph::new();
        for leaf in 1..=4u64 {
            g.add_edge(0u64, leaf).unwrap();
        }
        let bc = g.betweenness_centrality().unwrap();
        assert!(approx(bc[&NodeId::Num(0)], 1.0));
        assert!(approx(bc[&NodeId::Num(3)], 0.0));
    }

    #[test]
    fn test_betweenness_splits_equal_paths() {
        // square: 0-1-2-3-0, each node carries half of one opposite pair
        let mut g = Graph::new();
        g.add_path([0u64, 1, 2, 3, 0]).unwrap();
        let bc = g.betweenness_centrality().unwrap();
        for v in 0..4u64 {
            assert!(approx(bc[&NodeId::Num(v)], 0.5 / 3.0));
        }
    }

    #[test]
    fn test_betweenness_rejects_trivial_graphs() {
        let mut g = Graph::new();
        g.add_node(1u64);
        assert!(g.betweenness_centrality().is_err());
        g.add_node(2u64);
        assert!(g.betweenness_centrality().is_err());
        g.add_edge(1u64, 2u64).unwrap();
        let bc = g.betweenness_centrality().unwrap();
        assert!(approx(bc[&NodeId::Num(1)], 0.0));
    }
}
