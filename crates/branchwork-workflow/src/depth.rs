use std::collections::HashSet;

use crate::workflow::Workflow;

/// Maximum depth of the tree below the root, counted in edges.
///
/// A branch node reaches the deepest of its filled slots, but never less than its
/// own depth. Any other node reaches the deepest of its children, or its own depth
/// when it has none. A missing child still counts one level below its parent.
/// A node already on the current path is not entered again, so cyclic workflows
/// terminate.
pub fn compute_depth(workflow: &Workflow) -> usize {
  if !workflow.contains(&workflow.root_id) {
    return 0;
  }

  let mut deepest = 0;
  // (node id, its depth, index of the next target to visit)
  let mut stack: Vec<(&str, usize, usize)> = vec![(workflow.root_id.as_str(), 0, 0)];
  let mut path: HashSet<&str> = HashSet::from([workflow.root_id.as_str()]);

  while let Some((node_id, depth, next)) = stack.last_mut() {
    let (node_id, depth) = (*node_id, *depth);
    let target = workflow
      .get_node(node_id)
      .and_then(|node| node.targets().nth(*next));
    let Some(child_id) = target else {
      path.remove(node_id);
      stack.pop();
      continue;
    };
    *next += 1;

    let child_depth = depth + 1;
    deepest = deepest.max(child_depth);
    if workflow.contains(child_id) && path.insert(child_id) {
      stack.push((child_id, child_depth, 0));
    }
  }

  deepest
}
