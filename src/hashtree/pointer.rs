use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::formula::{ceil_lg, is_power_of_2, largest_power_of_2_less_than};
use crate::hash::{Digest, NIL, combine};
use crate::hashtree::HashTree;

#[cfg(test)]
mod test;

/// Stable address of a node in the arena.
pub type NodeId = usize;

/// Node representation in the hash tree
///
/// Children are owned by their parent through the arena; `parent` is only a back-reference used to walk upwards.
/// The root is the only node without a parent, and leaves are the only nodes without children.
#[derive(Debug, Clone)]
pub struct Node {
  pub hash: Digest,
  pub parent: Option<NodeId>,
  pub children: Option<(NodeId, NodeId)>,
}

impl Node {
  fn new_leaf(hash: Digest) -> Self {
    Node { hash, parent: None, children: None }
  }

  pub fn is_leaf(&self) -> bool {
    self.children.is_none()
  }
}

/// Dynamic Merkle tree whose nodes live in an arena and refer to each other by index.
///
/// Appending a leaf costs amortized O(1) node updates plus the O(log n) recomputation of its ancestors; overwriting
/// a leaf costs O(log n).
#[derive(Debug, Default)]
pub struct PointerMerkleTree {
  nodes: Vec<Node>,
  leaves: Vec<NodeId>,
  root: Option<NodeId>,
  depth: u32,
}

impl PointerMerkleTree {
  pub fn new() -> Self {
    Self::default()
  }

  /// Build the left-complete tree over `elements` in O(n).
  pub fn from_leaves(elements: &[Digest]) -> Self {
    let mut tree = Self::new();
    if elements.is_empty() {
      return tree;
    }
    tree.nodes.reserve(2 * elements.len() - 1);
    let leaves: Vec<NodeId> = elements.iter().map(|e| tree.push(Node::new_leaf(*e))).collect();
    tree.leaves = leaves;
    // the recursion descends one level per call, so it is bounded by ⌈log₂ n⌉
    let root = tree.make_tree(0, elements.len());
    tree.root = Some(root);
    tree.depth = ceil_lg(elements.len());
    tree
  }

  /// Independent tree over the same leaves.
  pub fn copy(&self) -> Self {
    Self::from_leaves(&self.values())
  }

  /// Number of edges between the root and the deepest leaf.
  pub fn depth(&self) -> u32 {
    self.depth
  }

  pub fn node(&self, id: NodeId) -> Option<&Node> {
    self.nodes.get(id)
  }

  pub fn root_id(&self) -> Option<NodeId> {
    self.root
  }

  /// Arena address of leaf `index`.
  pub fn leaf_id(&self, index: usize) -> Result<NodeId> {
    self.leaves.get(index).copied().ok_or(Error::IndexOutOfRange { index, len: self.leaves.len() })
  }

  /// The other child of `id`'s parent.
  pub fn sibling(&self, id: NodeId) -> Result<NodeId> {
    let node = self.nodes.get(id).ok_or_else(|| Error::Inconsistent(format!("node {id} does not exist")))?;
    let parent = node.parent.ok_or(Error::RootHasNoSibling)?;
    match self.nodes.get(parent).and_then(|p| p.children) {
      Some((left, right)) if left == id => Ok(right),
      Some((left, right)) if right == id => Ok(left),
      _ => Err(Error::Inconsistent(format!("node {id} is not a child of its parent {parent}"))),
    }
  }

  fn push(&mut self, node: Node) -> NodeId {
    self.nodes.push(node);
    self.nodes.len() - 1
  }

  fn make_tree(&mut self, begin: usize, size: usize) -> NodeId {
    if size == 1 {
      return self.leaves[begin];
    }
    let lsize = largest_power_of_2_less_than(size);
    let left = self.make_tree(begin, lsize);
    let right = self.make_tree(begin + lsize, size - lsize);
    self.join(left, right)
  }

  /// Create a parent for two detached subtrees.
  fn join(&mut self, left: NodeId, right: NodeId) -> NodeId {
    let hash = combine(&self.nodes[left].hash, &self.nodes[right].hash);
    let id = self.push(Node { hash, parent: None, children: Some((left, right)) });
    self.nodes[left].parent = Some(id);
    self.nodes[right].parent = Some(id);
    id
  }

  fn right_child(&self, id: NodeId) -> NodeId {
    match self.nodes[id].children {
      Some((_, right)) => right,
      None => unreachable!("node {id} is expected to be an internal node"),
    }
  }

  fn recompute(&mut self, id: NodeId) {
    let Some((left, right)) = self.nodes[id].children else {
      unreachable!("cannot recompute the hash of leaf node {id}");
    };
    self.nodes[id].hash = combine(&self.nodes[left].hash, &self.nodes[right].hash);
  }

  fn fix_up(&mut self, mut node: Option<NodeId>) {
    while let Some(id) = node {
      self.recompute(id);
      node = self.nodes[id].parent;
    }
  }
}

impl HashTree for PointerMerkleTree {
  fn len(&self) -> usize {
    self.leaves.len()
  }

  fn root(&self) -> Digest {
    self.root.map(|id| self.nodes[id].hash).unwrap_or(NIL)
  }

  fn add(&mut self, value: Digest) {
    let leaf = self.push(Node::new_leaf(value));
    self.leaves.push(leaf);
    trace!(index = self.leaves.len() - 1, "append leaf");

    let Some(root) = self.root else {
      self.root = Some(leaf);
      self.depth = 0;
      return;
    };

    // descend the right spine to the first subtree holding a power-of-two number of leaves; the right spine can
    // shorten by more than one level per step, so the left size is derived from each subtree's own size
    let mut current = root;
    let mut current_size = self.leaves.len() - 1;
    while !is_power_of_2(current_size) {
      current = self.right_child(current);
      current_size -= largest_power_of_2_less_than(current_size);
    }

    let parent = self.nodes[current].parent;
    let node = self.join(current, leaf);
    self.nodes[node].parent = parent;
    match parent {
      None => {
        self.root = Some(node);
        self.depth += 1;
        debug!(depth = self.depth, leaves = self.leaves.len(), "tree depth increased");
      }
      Some(p) => {
        let (left, right) = self.nodes[p].children.unwrap_or_else(|| unreachable!("parent {p} has no children"));
        debug_assert_eq!(right, current, "the spliced subtree must be a right child");
        self.nodes[p].children = Some((left, node));
      }
    }
    self.fix_up(parent);
  }

  fn set(&mut self, index: usize, value: Digest) -> Result<()> {
    if index == self.leaves.len() {
      self.add(value);
      return Ok(());
    }
    let leaf = self.leaf_id(index)?;
    trace!(index, "overwrite leaf");
    self.nodes[leaf].hash = value;
    self.fix_up(self.nodes[leaf].parent);
    Ok(())
  }

  fn get(&self, index: usize) -> Result<Digest> {
    self.leaf_id(index).map(|id| self.nodes[id].hash)
  }

  fn prove_leaf(&self, index: usize) -> Result<Vec<Digest>> {
    let mut node = self.leaf_id(index)?;
    let mut proof = Vec::with_capacity(self.depth as usize);
    while let Some(parent) = self.nodes[node].parent {
      let sibling = self.sibling(node)?;
      proof.push(self.nodes[sibling].hash);
      node = parent;
    }
    Ok(proof)
  }

  fn values(&self) -> Vec<Digest> {
    self.leaves.iter().map(|id| self.nodes[*id].hash).collect()
  }
}
