//! Authentication paths of left-complete Merkle trees.
//!
//! The shape of the path from the root to a leaf depends only on the number of leaves and the leaf index, so proofs
//! produced by any representation can be checked here without access to the tree itself.

use crate::error::{Error, Result};
use crate::formula::ceil_lg;
use crate::hash::{Digest, combine};

/// Returns the directions of the edges on the path from the root to leaf `index` in a tree of `size` leaves, in
/// root-to-leaf order. `true` means the path descends to the right child.
pub fn directions(size: usize, index: usize) -> Result<Vec<bool>> {
  if index >= size {
    return Err(Error::IndexOutOfRange { index, len: size });
  }

  let mut size = size;
  let mut index = index;
  let mut directions = Vec::with_capacity(ceil_lg(size) as usize);
  while size > 1 {
    // also the number of leaves of the left subtree
    let mask = 1usize << (ceil_lg(size) - 1);
    let right = index & mask != 0;
    directions.push(right);
    if right {
      size -= mask;
      index -= mask;
    } else {
      size = mask;
    }
  }
  Ok(directions)
}

/// Number of sibling digests in a proof for leaf `index` of a tree with `size` leaves.
pub fn proof_size(size: usize, index: usize) -> Result<usize> {
  directions(size, index).map(|d| d.len())
}

/// Checks that `proof` (sibling digests, leaf-to-root) establishes `element` as leaf `index` of the tree with `size`
/// leaves whose root is `root`. Malformed input is simply rejected.
pub fn verify(root: &Digest, size: usize, element: &Digest, index: usize, proof: &[Digest]) -> bool {
  let Ok(directions) = directions(size, index) else {
    return false;
  };
  if proof.len() != directions.len() {
    return false;
  }

  let mut current = *element;
  for (sibling, right) in proof.iter().zip(directions.iter().rev()) {
    current = if *right { combine(sibling, &current) } else { combine(&current, sibling) };
  }
  current == *root
}
