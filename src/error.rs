use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
  /// The index does not address a leaf (or, for `set`, the append position).
  #[error("index {index} is out of range for {len} leaves")]
  IndexOutOfRange { index: usize, len: usize },

  #[error("the root does not have a sibling")]
  RootHasNoSibling,

  /// The node graph no longer satisfies its structural invariants.
  #[error("invalid tree state: {0}")]
  Inconsistent(String),

  #[error(transparent)]
  Io(#[from] std::io::Error),
}
