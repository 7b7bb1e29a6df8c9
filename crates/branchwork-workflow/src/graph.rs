use std::collections::{HashMap, HashSet};

use crate::Workflow;

/// Reference graph of a workflow snapshot, for traversal and analysis.
#[derive(Debug, Clone)]
pub struct Graph {
  /// Adjacency list: node_id -> ids it points at, children first then slots.
  adjacency: HashMap<String, Vec<String>>,
  /// Reverse adjacency: node_id -> ids of the nodes pointing at it (each parent once).
  reverse_adjacency: HashMap<String, Vec<String>>,
  /// The root plus every id any node points at.
  referenced: HashSet<String>,
}

impl Graph {
  /// Build a graph from a workflow's nodes.
  pub fn new(workflow: &Workflow) -> Self {
    let mut adjacency: HashMap<String, Vec<String>> = HashMap::new();
    let mut reverse_adjacency: HashMap<String, Vec<String>> = HashMap::new();

    // Initialize all nodes
    for node_id in workflow.nodes.keys() {
      adjacency.entry(node_id.clone()).or_default();
      reverse_adjacency.entry(node_id.clone()).or_default();
    }

    let mut referenced = HashSet::new();
    referenced.insert(workflow.root_id.clone());

    // Build adjacency lists
    for (from, node) in &workflow.nodes {
      for to in node.targets() {
        adjacency.entry(from.clone()).or_default().push(to.to_string());
        let parents = reverse_adjacency.entry(to.to_string()).or_default();
        if !parents.contains(from) {
          parents.push(from.clone());
        }
        referenced.insert(to.to_string());
      }
    }

    Self {
      adjacency,
      reverse_adjacency,
      referenced,
    }
  }

  /// Get the ids a node points at.
  pub fn downstream(&self, node_id: &str) -> &[String] {
    self
      .adjacency
      .get(node_id)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  /// Get the nodes pointing at a node.
  pub fn upstream(&self, node_id: &str) -> &[String] {
    self
      .reverse_adjacency
      .get(node_id)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  /// Whether the node is the root or is pointed at by any node.
  ///
  /// This is a flat reference check over the whole map, not reachability from the
  /// root: a node referenced only by another orphan still counts as referenced.
  pub fn is_referenced(&self, node_id: &str) -> bool {
    self.referenced.contains(node_id)
  }

  /// Ids present in `workflow` that nothing references, sorted.
  pub fn unreferenced<'a>(&self, workflow: &'a Workflow) -> Vec<&'a str> {
    workflow
      .sorted_ids()
      .into_iter()
      .filter(|id| !self.is_referenced(id))
      .collect()
  }

  /// `(from, to)` pairs whose target is missing from `workflow`, sorted by `from`.
  pub fn dangling<'a>(&'a self, workflow: &Workflow) -> Vec<(&'a str, &'a str)> {
    let mut missing: Vec<(&str, &str)> = self
      .adjacency
      .iter()
      .flat_map(|(from, targets)| targets.iter().map(move |to| (from.as_str(), to.as_str())))
      .filter(|(_, to)| !workflow.contains(to))
      .collect();
    missing.sort_unstable();
    missing
  }

  /// Find a node that lies on a cycle, using DFS.
  ///
  /// Nodes are visited in sorted order so the reported node is stable. The walk
  /// keeps an explicit stack of `(node, next neighbor index)`, so long chains do not
  /// grow the call stack.
  pub fn find_cycle(&self) -> Option<&str> {
    // DFS with coloring: 0 = white (unvisited), 1 = gray (in progress), 2 = black (done)
    let mut color: HashMap<&str, u8> = self.adjacency.keys().map(|id| (id.as_str(), 0u8)).collect();

    let mut ids: Vec<&str> = self.adjacency.keys().map(String::as_str).collect();
    ids.sort_unstable();

    let mut stack: Vec<(&str, usize)> = Vec::new();
    for node_id in ids {
      if color.get(node_id) != Some(&0) {
        continue;
      }
      color.insert(node_id, 1);
      stack.push((node_id, 0));

      while let Some((node, next)) = stack.last_mut() {
        let node = *node;
        let neighbors = self.downstream(node);
        let Some(neighbor) = neighbors.get(*next) else {
          color.insert(node, 2);
          stack.pop();
          continue;
        };
        *next += 1;

        match color.get(neighbor.as_str()) {
          Some(1) => return Some(neighbor.as_str()), // Back edge = cycle
          Some(0) => {
            color.insert(neighbor.as_str(), 1);
            stack.push((neighbor.as_str(), 0));
          }
          _ => {}
        }
      }
    }

    None
  }
}
