//! The hash oracle shared by every structure in this crate.
//!
//! Leaves and internal nodes are hashed the same way (`H(left || right)` over raw digests); there is no domain
//! separation between the two. A two-leaf subtree and an internal node with the same children digests are therefore
//! indistinguishable. Adding a prefix would change every produced root, so the construction is kept as is.

use blake3::{Hash, Hasher, OUT_LEN};

/// Fixed-length digest produced by the oracle.
pub type Digest = Hash;

/// Root of a structure that commits to no element.
pub const NIL: Digest = Hash::from_bytes([0u8; OUT_LEN]);

/// Maps an arbitrary byte string into the digest domain.
pub fn digest(data: &[u8]) -> Digest {
  blake3::hash(data)
}

/// Digest of an internal node: `H(left || right)`.
pub fn combine(left: &Digest, right: &Digest) -> Digest {
  let mut hasher = Hasher::new();
  hasher.update(left.as_bytes());
  hasher.update(right.as_bytes());
  hasher.finalize()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn combine_is_hash_of_concatenation() {
    let l = digest(b"left");
    let r = digest(b"right");
    let mut concat = Vec::with_capacity(2 * OUT_LEN);
    concat.extend_from_slice(l.as_bytes());
    concat.extend_from_slice(r.as_bytes());
    assert_eq!(digest(&concat), combine(&l, &r));
    assert_ne!(combine(&l, &r), combine(&r, &l));
  }

  #[test]
  fn nil_is_all_zero() {
    assert_eq!(&[0u8; OUT_LEN], NIL.as_bytes());
    assert_ne!(NIL, digest(&[]));
  }
}
