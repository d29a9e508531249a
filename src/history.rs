//! Accumulator that can prove membership against any root it has ever committed to.
//!
//! Alongside the live tree, the accumulator keeps two auxiliary structures:
//!
//! * the *forest*: the digest of every aligned perfect subtree, recorded once when its last leaf arrives, packed in
//!   Merkle-Mountain-Range post-order. The tree over the first `m` elements is the chain of perfect subtrees given by
//!   the binary expansion of `m`, so a proof against `R[m]` is assembled from the forest in O(log m).
//! * the *checkpoint tree*: a Merkle tree whose leaf `l` holds the most recent root `R[c]` with exactly `l` trailing
//!   zero bits in `c`, committing to a logarithmic skip list of past roots.
//!
//! Element indices of this module are 1-based: the `i`-th element is the one whose append produced `R[i]`.

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::formula::{floor_lg, zeros};
use crate::hash::{Digest, NIL, combine};
use crate::hashtree::HashTree;
use crate::hashtree::pointer::PointerMerkleTree;
use crate::proof::verify;

#[derive(Debug)]
pub struct HistoricalAccumulator<T: HashTree = PointerMerkleTree> {
  tree: T,
  /// `roots[m]` is the root after the `m`-th append.
  roots: Vec<Digest>,
  forest: Vec<Digest>,
  checkpoints: PointerMerkleTree,
}

impl<T: HashTree + Default> Default for HistoricalAccumulator<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T: HashTree + Default> HistoricalAccumulator<T> {
  pub fn new() -> Self {
    let checkpoints = PointerMerkleTree::new();
    HistoricalAccumulator { tree: T::default(), roots: vec![NIL], forest: Vec::new(), checkpoints }
  }

  pub fn from_elements(elements: &[Digest]) -> Self {
    let mut acc = Self::new();
    for e in elements {
      acc.add(*e);
    }
    acc
  }
}

impl<T: HashTree> HistoricalAccumulator<T> {
  pub fn len(&self) -> usize {
    self.tree.len()
  }

  pub fn is_empty(&self) -> bool {
    self.tree.is_empty()
  }

  /// The underlying live tree.
  pub fn tree(&self) -> &T {
    &self.tree
  }

  /// Append an element and record the resulting root. Returns the new number of elements.
  pub fn add(&mut self, x: Digest) -> usize {
    self.tree.add(x);
    let k = self.tree.len();

    self.forest.push(x);
    let mut height = 0;
    let mut hash = x;
    while (k >> height) & 1 == 0 {
      let left = self.forest[forest_position(height, (k >> height) - 2)];
      hash = combine(&left, &hash);
      self.forest.push(hash);
      height += 1;
    }
    debug_assert_eq!(2 * k - k.count_ones() as usize, self.forest.len());

    // equals the checkpoint count exactly when k is a power of two, so `set` appends
    let level = zeros(k) as usize;
    debug_assert!(level <= self.checkpoints.len());
    let root = self.tree.root();
    if let Err(e) = self.checkpoints.set(level, root) {
      unreachable!("checkpoint level {level} of size {k} is out of reach: {e}");
    }
    self.roots.push(root);
    debug!(size = k, completed = height, "recorded root");
    k
  }

  /// The current root, `R[len()]`.
  pub fn get_root(&self) -> Digest {
    self.tree.root()
  }

  /// The root recorded after the `m`-th append.
  pub fn root_at(&self, m: usize) -> Option<Digest> {
    self.roots.get(m).copied()
  }

  /// All recorded roots, starting with `R[0] = NIL`.
  pub fn roots(&self) -> &[Digest] {
    &self.roots
  }

  /// Proof that the `index`-th element belongs to the current root.
  pub fn prove(&self, index: usize) -> Result<Vec<Digest>> {
    let len = self.len();
    if index == 0 || index > len {
      return Err(Error::IndexOutOfRange { index, len });
    }
    self.tree.prove_leaf(index - 1)
  }

  /// Proof that the `index`-th element belongs to the historical root `R[base_size]`.
  pub fn prove_from(&self, base_size: usize, index: usize) -> Result<Vec<Digest>> {
    if base_size > self.len() {
      return Err(Error::IndexOutOfRange { index: base_size, len: self.len() });
    }
    if index == 0 || index > base_size {
      return Err(Error::IndexOutOfRange { index, len: base_size });
    }
    trace!(base_size, index, "historical proof");

    let leaf = index - 1;
    let peaks = peaks(base_size);
    let t = peaks
      .iter()
      .position(|&(height, start)| leaf < start + (1usize << height))
      .ok_or_else(|| Error::Inconsistent(format!("no perfect subtree of {base_size} covers leaf {leaf}")))?;
    let (height, _) = peaks[t];

    let mut proof = Vec::with_capacity(height as usize + peaks.len());
    for level in 0..height {
      let sibling = (leaf >> level) ^ 1;
      proof.push(self.forest[forest_position(level, sibling)]);
    }
    let bagged = peaks[t + 1..].iter().rev().map(|p| self.peak(p)).reduce(|acc, peak| combine(&peak, &acc));
    if let Some(bagged) = bagged {
      proof.push(bagged);
    }
    proof.extend(peaks[..t].iter().rev().map(|p| self.peak(p)));
    Ok(proof)
  }

  fn peak(&self, (height, start): &(u32, usize)) -> Digest {
    self.forest[forest_position(*height, start >> height)]
  }

  /// Root of the checkpoint tree.
  pub fn checkpoint_root(&self) -> Digest {
    self.checkpoints.root()
  }

  /// Rebuild the checkpoint tree as it stood after the `m`-th append.
  pub fn checkpoint_tree(&self, m: usize) -> Result<PointerMerkleTree> {
    if m > self.len() {
      return Err(Error::IndexOutOfRange { index: m, len: self.len() });
    }
    let leaves = checkpoint_indexes(m).into_iter().map(|c| self.roots[c]).collect::<Vec<_>>();
    Ok(PointerMerkleTree::from_leaves(&leaves))
  }

  /// Proof that `R[j]` is committed in the current checkpoint tree.
  pub fn prove_checkpoint(&self, j: usize) -> Result<Vec<Digest>> {
    let len = self.len();
    if !is_checkpoint(len, j) {
      return Err(Error::IndexOutOfRange { index: j, len });
    }
    self.checkpoints.prove_leaf(zeros(j) as usize)
  }
}

/// Checks a proof produced by [`HistoricalAccumulator::prove`] or [`HistoricalAccumulator::prove_from`] that the
/// `index`-th (1-based) element of the accumulator of `size` elements with the given `root` is `element`.
pub fn verify_fast(root: &Digest, size: usize, index: usize, proof: &[Digest], element: &Digest) -> bool {
  index > 0 && verify(root, size, element, index - 1, proof)
}

/// Checks a proof produced by [`HistoricalAccumulator::prove_checkpoint`] that `root_j` is `R[j]` in the checkpoint
/// tree with root `checkpoint_root` of an accumulator of `m` elements.
pub fn verify_checkpoint(checkpoint_root: &Digest, m: usize, j: usize, root_j: &Digest, proof: &[Digest]) -> bool {
  is_checkpoint(m, j) && verify(checkpoint_root, floor_lg(m) as usize + 1, root_j, zeros(j) as usize, proof)
}

/// Sizes whose roots are the leaves of the checkpoint tree after `m` appends: entry `l` is the largest `c ≤ m` whose
/// lowest set bit is bit `l`.
pub fn checkpoint_indexes(m: usize) -> Vec<usize> {
  if m == 0 {
    return Vec::new();
  }
  (0..=floor_lg(m)).map(|l| checkpoint(m, l)).collect()
}

fn checkpoint(m: usize, level: u32) -> usize {
  let low = 1usize << level;
  // residues modulo 2^(level + 1); the period covers the whole word at the top level
  let period_mask = low.checked_mul(2).map_or(usize::MAX, |period| period - 1);
  m - ((m - low) & period_mask)
}

fn is_checkpoint(m: usize, j: usize) -> bool {
  j > 0 && j <= m && checkpoint(m, zeros(j)) == j
}

/// Perfect subtrees of the tree over `m` leaves as `(height, first leaf)`, largest first.
fn peaks(m: usize) -> Vec<(u32, usize)> {
  let mut peaks = Vec::with_capacity(m.count_ones() as usize);
  let mut start = 0;
  for height in (0..usize::BITS).rev() {
    if (m >> height) & 1 == 1 {
      peaks.push((height, start));
      start += 1 << height;
    }
  }
  peaks
}

/// Position in the forest of the perfect subtree of `2^height` leaves with the given block number, i.e. covering
/// leaves `block * 2^height .. (block + 1) * 2^height`.
fn forest_position(height: u32, block: usize) -> usize {
  let c = (block + 1) << height;
  2 * c - c.count_ones() as usize - 1 - (c.trailing_zeros() - height) as usize
}
