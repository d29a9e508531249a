use crate::error::Result;
use crate::hash::Digest;

pub mod array;
pub mod pointer;

/// Core hash tree abstraction
///
/// Every implementation maintains a left-complete binary Merkle tree over its leaves: for a subtree with `n > 1`
/// leaves, the left child covers the largest power of two strictly less than `n` leaves. Roots and proofs are
/// therefore identical across representations for the same leaf sequence.
pub trait HashTree {
  /// Get the current size (number of leaf nodes)
  fn len(&self) -> usize;

  fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Get the root hash, or [`NIL`](crate::hash::NIL) if the tree is empty
  fn root(&self) -> Digest;

  /// Append a new leaf and recompute the affected internal nodes
  fn add(&mut self, value: Digest);

  /// Overwrite the leaf at `index`; `index == len()` appends instead
  fn set(&mut self, index: usize, value: Digest) -> Result<()>;

  /// Retrieve the leaf at `index`
  fn get(&self, index: usize) -> Result<Digest>;

  /// Generate the sibling digests from leaf `index` up to the root
  fn prove_leaf(&self, index: usize) -> Result<Vec<Digest>>;

  /// All leaves in index order
  fn values(&self) -> Vec<Digest>;
}
