//! Undirected graph with per-node records and per-link attributes.

use std::collections::{BTreeMap, HashMap};

use crate::error::{Result, TopologyError};
use crate::topology::types::{LinkType, NodeId, Role};

/// A node and its structural attributes
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRecord {
    pub id: NodeId,
    pub(crate) role: Option<Role>,
    /// Depth below the root for tree families
    pub depth: Option<u32>,
    /// True for nodes attached by a builder rather than read from a dataset
    pub synthetic: bool,
    /// Dataset metadata (label, coordinates, country, ...)
    pub attributes: BTreeMap<String, String>,
}

impl NodeRecord {
    fn new(id: NodeId) -> Self {
        Self {
            id,
            role: None,
            depth: None,
            synthetic: false,
            attributes: BTreeMap::new(),
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }
}

/// Attributes carried by an undirected link
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    /// Routing cost, strictly positive
    pub weight: f64,
    /// Propagation delay in milliseconds
    pub delay: f64,
    pub kind: LinkType,
}

impl Default for Link {
    fn default() -> Self {
        Self {
            weight: 1.0,
            delay: 0.0,
            kind: LinkType::Internal,
        }
    }
}

/// Simple undirected graph without self-loops or parallel links
///
/// Nodes keep their insertion order, which is the "original ordering" every
/// deterministic tie-break in this crate falls back to.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<NodeRecord>,
    index: HashMap<NodeId, usize>,
    adjacency: Vec<Vec<usize>>,
    links: BTreeMap<(usize, usize), Link>,
}

fn key(a: usize, b: usize) -> (usize, usize) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.index.contains_key(id)
    }

    /// Add a node if absent; returns its record either way
    pub fn add_node(&mut self, id: impl Into<NodeId>) -> &mut NodeRecord {
        let idx = self.ensure(id.into());
        &mut self.nodes[idx]
    }

    fn ensure(&mut self, id: NodeId) -> usize {
        if let Some(&idx) = self.index.get(&id) {
            return idx;
        }
        let idx = self.nodes.len();
        self.index.insert(id.clone(), idx);
        self.nodes.push(NodeRecord::new(id));
        self.adjacency.push(Vec::new());
        idx
    }

    /// Add a link with default attributes, creating missing endpoints
    ///
    /// An existing link between the same pair is reset rather than
    /// duplicated.
    pub fn add_edge(&mut self, u: impl Into<NodeId>, v: impl Into<NodeId>) -> Result<&mut Link> {
        self.add_link(u, v, Link::default())
    }

    /// Add or overwrite a link with explicit attributes
    pub fn add_link(
        &mut self,
        u: impl Into<NodeId>,
        v: impl Into<NodeId>,
        link: Link,
    ) -> Result<&mut Link> {
        let (u, v) = (u.into(), v.into());
        if u == v {
            return Err(TopologyError::malformed(format!("self-loop on node {}", u)));
        }
        let a = self.ensure(u);
        let b = self.ensure(v);
        let k = key(a, b);
        if !self.links.contains_key(&k) {
            self.adjacency[a].push(b);
            self.adjacency[b].push(a);
        }
        let slot = self.links.entry(k).or_insert(link);
        *slot = link;
        Ok(slot)
    }

    /// Add consecutive links along `path`
    pub fn add_path<I, T>(&mut self, path: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<NodeId>,
    {
        let mut prev: Option<NodeId> = None;
        for node in path {
            let node = node.into();
            match prev.take() {
                Some(p) => {
                    self.add_edge(p, node.clone())?;
                }
                None => {
                    self.add_node(node.clone());
                }
            }
            prev = Some(node);
        }
        Ok(())
    }

    pub fn node(&self, id: &NodeId) -> Option<&NodeRecord> {
        self.index.get(id).map(|&idx| &self.nodes[idx])
    }

    pub(crate) fn node_mut(&mut self, id: &NodeId) -> Option<&mut NodeRecord> {
        match self.index.get(id) {
            Some(&idx) => Some(&mut self.nodes[idx]),
            None => None,
        }
    }

    /// Node records in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &NodeRecord> {
        self.nodes.iter()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.iter().map(|n| &n.id)
    }

    pub fn link(&self, u: &NodeId, v: &NodeId) -> Option<&Link> {
        let a = *self.index.get(u)?;
        let b = *self.index.get(v)?;
        self.links.get(&key(a, b))
    }

    pub(crate) fn link_mut(&mut self, u: &NodeId, v: &NodeId) -> Option<&mut Link> {
        let a = *self.index.get(u)?;
        let b = *self.index.get(v)?;
        self.links.get_mut(&key(a, b))
    }

    pub fn has_edge(&self, u: &NodeId, v: &NodeId) -> bool {
        self.link(u, v).is_some()
    }

    /// All links as `(u, v, link)`, ordered by endpoint insertion order
    pub fn edges(&self) -> impl Iterator<Item = (&NodeId, &NodeId, &Link)> {
        self.links
            .iter()
            .map(move |(&(a, b), link)| (&self.nodes[a].id, &self.nodes[b].id, link))
    }

    pub(crate) fn links_mut(&mut self) -> impl Iterator<Item = (&NodeId, &NodeId, &mut Link)> {
        let nodes = &self.nodes;
        self.links
            .iter_mut()
            .map(move |(&(a, b), link)| (&nodes[a].id, &nodes[b].id, link))
    }

    /// Neighbors in the order their links were added; empty for unknown nodes
    pub fn neighbors<'a>(&'a self, id: &NodeId) -> impl Iterator<Item = &'a NodeId> + 'a {
        let adjacent: &'a [usize] = match self.index.get(id) {
            Some(&idx) => &self.adjacency[idx],
            None => &[],
        };
        adjacent.iter().map(move |&n| &self.nodes[n].id)
    }

    /// Number of links incident to `id` (0 for unknown nodes)
    pub fn degree(&self, id: &NodeId) -> usize {
        self.index
            .get(id)
            .map(|&idx| self.adjacency[idx].len())
            .unwrap_or(0)
    }

    /// Copy of the graph restricted to `keep`, preserving order and attributes
    pub fn induced_subgraph<'a, I>(&self, keep: I) -> Graph
    where
        I: IntoIterator<Item = &'a NodeId>,
    {
        let wanted: std::collections::HashSet<usize> = keep
            .into_iter()
            .filter_map(|id| self.index.get(id).copied())
            .collect();
        let mut sub = Graph::new();
        for (idx, record) in self.nodes.iter().enumerate() {
            if wanted.contains(&idx) {
                let id = record.id.clone();
                let slot = sub.ensure(id);
                sub.nodes[slot] = record.clone();
            }
        }
        for (&(a, b), link) in &self.links {
            if wanted.contains(&a) && wanted.contains(&b) {
                let (u, v) = (self.nodes[a].id.clone(), self.nodes[b].id.clone());
                let sa = sub.ensure(u);
                let sb = sub.ensure(v);
                sub.adjacency[sa].push(sb);
                sub.adjacency[sb].push(sa);
                sub.links.insert(key(sa, sb), *link);
            }
        }
        sub
    }

    // Index-level access for the algorithms module
    pub(crate) fn adjacency(&self) -> &[Vec<usize>] {
        &self.adjacency
    }

    pub(crate) fn id_at(&self, idx: usize) -> &NodeId {
        &self.nodes[idx].id
    }
}
