use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::hash::{Digest, NIL, combine};
use crate::hashtree::HashTree;

/// Merkle tree packed into a flat table with binary-heap addressing.
///
/// The table holds `2 * capacity - 1` digests: internal nodes at `0..capacity - 1` (`parent(i) = (i - 1) / 2`,
/// children `2i + 1` and `2i + 2`) followed by the leaf slots. `capacity` is a power of two that only doubles. A heap
/// node none of whose leaves has been written yet is vacant; a node with a vacant right child takes over the digest
/// of its left child, which makes the root identical to that of the left-complete tree over the written leaves.
#[derive(Debug, Clone)]
pub struct ArrayMerkleTree {
  nodes: Vec<Digest>,
  k: usize,
  capacity: usize,
}

impl Default for ArrayMerkleTree {
  fn default() -> Self {
    Self { nodes: vec![NIL], k: 0, capacity: 1 }
  }
}

impl ArrayMerkleTree {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn from_leaves(elements: &[Digest]) -> Self {
    let capacity = elements.len().max(1).next_power_of_two();
    let mut tree = Self { nodes: vec![NIL; 2 * capacity - 1], k: elements.len(), capacity };
    tree.nodes[capacity - 1..capacity - 1 + elements.len()].copy_from_slice(elements);
    tree.rebuild();
    tree
  }

  /// Number of leaf slots currently allocated.
  pub fn capacity(&self) -> usize {
    self.capacity
  }

  fn leaf_offset(&self) -> usize {
    self.capacity - 1
  }

  /// Whether the heap node `i` covers no written leaf.
  fn is_vacant(&self, i: usize) -> bool {
    let level = (i + 1).ilog2();
    let height = self.capacity.ilog2() - level;
    let first_leaf = ((i + 1) - (1 << level)) << height;
    first_leaf >= self.k
  }

  fn recompute(&mut self, i: usize) {
    let (left, right) = (2 * i + 1, 2 * i + 2);
    self.nodes[i] = if self.is_vacant(right) { self.nodes[left] } else { combine(&self.nodes[left], &self.nodes[right]) };
  }

  fn fix_up(&mut self, mut i: usize) {
    while i > 0 {
      i = (i - 1) / 2;
      self.recompute(i);
    }
  }

  fn rebuild(&mut self) {
    for i in (0..self.leaf_offset()).rev() {
      self.recompute(i);
    }
  }

  /// Double the capacity, moving the leaves to the new leaf region and recomputing every internal slot.
  fn grow(&mut self) {
    let capacity = self.capacity * 2;
    let mut nodes = vec![NIL; 2 * capacity - 1];
    let (from, to) = (self.leaf_offset(), capacity - 1);
    nodes[to..to + self.k].copy_from_slice(&self.nodes[from..from + self.k]);
    self.nodes = nodes;
    self.capacity = capacity;
    self.rebuild();
    debug!(capacity, leaves = self.k, "flat table capacity doubled");
  }
}

impl HashTree for ArrayMerkleTree {
  fn len(&self) -> usize {
    self.k
  }

  fn root(&self) -> Digest {
    if self.k == 0 { NIL } else { self.nodes[0] }
  }

  fn add(&mut self, value: Digest) {
    if self.k == self.capacity {
      self.grow();
    }
    let slot = self.leaf_offset() + self.k;
    trace!(index = self.k, slot, "append leaf");
    self.nodes[slot] = value;
    self.k += 1;
    self.fix_up(slot);
  }

  fn set(&mut self, index: usize, value: Digest) -> Result<()> {
    if index == self.k {
      self.add(value);
      return Ok(());
    }
    if index > self.k {
      return Err(Error::IndexOutOfRange { index, len: self.k });
    }
    let slot = self.leaf_offset() + index;
    trace!(index, slot, "overwrite leaf");
    self.nodes[slot] = value;
    self.fix_up(slot);
    Ok(())
  }

  fn get(&self, index: usize) -> Result<Digest> {
    if index >= self.k {
      return Err(Error::IndexOutOfRange { index, len: self.k });
    }
    Ok(self.nodes[self.leaf_offset() + index])
  }

  fn prove_leaf(&self, index: usize) -> Result<Vec<Digest>> {
    if index >= self.k {
      return Err(Error::IndexOutOfRange { index, len: self.k });
    }
    let mut proof = Vec::with_capacity(self.capacity.ilog2() as usize);
    let mut i = self.leaf_offset() + index;
    while i > 0 {
      let sibling = if i % 2 == 1 { i + 1 } else { i - 1 };
      // a vacant right sibling means the parent only forwards this node's digest
      if !self.is_vacant(sibling) {
        proof.push(self.nodes[sibling]);
      }
      i = (i - 1) / 2;
    }
    Ok(proof)
  }

  fn values(&self) -> Vec<Digest> {
    let offset = self.leaf_offset();
    self.nodes[offset..offset + self.k].to_vec()
  }
}
