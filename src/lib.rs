//! Append-mostly Merkle accumulators over left-complete binary trees.
//!
//! * [`hashtree`]: the tree representations ([`PointerMerkleTree`], [`ArrayMerkleTree`]) behind the [`HashTree`]
//!   trait.
//! * [`proof`]: representation-independent authentication paths.
//! * [`history`]: [`HistoricalAccumulator`], proving membership against the current or any past root.
//!
//! Trees are single-writer: mutations take `&mut self`, while roots and proofs are computed from `&self` against the
//! root that is current at that moment.

pub mod error;
pub mod formula;
pub mod hash;
pub mod hashtree;
pub mod history;
pub mod proof;

pub use error::{Error, Result};
pub use hash::{Digest, NIL};
pub use hashtree::HashTree;
pub use hashtree::array::ArrayMerkleTree;
pub use hashtree::pointer::PointerMerkleTree;
pub use history::{HistoricalAccumulator, verify_fast};

/// SplitMix64, used to derive reproducible element values for tests and benchmarks.
pub fn splitmix64(x: u64) -> u64 {
  let mut z = x.wrapping_add(0x9e3779b97f4a7c15);
  z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
  z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
  z ^ (z >> 31)
}

/// Digest of the `i`-th reproducible element.
pub fn element(i: u64) -> Digest {
  hash::digest(&splitmix64(i).to_le_bytes())
}
