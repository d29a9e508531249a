//! Integer arithmetic on tree sizes.

#[inline]
pub fn is_power_of_2(n: usize) -> bool {
  n != 0 && n & (n - 1) == 0
}

/// `⌈log₂ n⌉` for `n > 0`.
#[inline]
pub fn ceil_lg(n: usize) -> u32 {
  debug_assert!(n > 0);
  usize::BITS - (n - 1).leading_zeros()
}

/// `⌊log₂ n⌋` for `n > 0`.
#[inline]
pub fn floor_lg(n: usize) -> u32 {
  debug_assert!(n > 0);
  n.ilog2()
}

/// The largest power of two strictly less than `n`, for `n > 1`. This is the leaf count of the left subtree of a
/// left-complete tree over `n` leaves.
#[inline]
pub fn largest_power_of_2_less_than(n: usize) -> usize {
  debug_assert!(n > 1);
  1 << (ceil_lg(n) - 1)
}

/// Number of trailing zero bits of `n > 0`; the level of the checkpoint refreshed by the `n`-th append.
#[inline]
pub fn zeros(n: usize) -> u32 {
  debug_assert!(n > 0);
  n.trailing_zeros()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn verify_lg() {
    for (n, ceil, floor) in [(1, 0, 0), (2, 1, 1), (3, 2, 1), (4, 2, 2), (5, 3, 2), (8, 3, 3), (9, 4, 3), (72, 7, 6)] {
      assert_eq!(ceil, ceil_lg(n), "ceil_lg({n})");
      assert_eq!(floor, floor_lg(n), "floor_lg({n})");
    }
  }

  #[test]
  fn verify_left_subtree_size() {
    for (n, p) in [(2, 1), (3, 2), (4, 2), (5, 4), (7, 4), (8, 4), (9, 8), (1025, 1024)] {
      assert_eq!(p, largest_power_of_2_less_than(n), "n={n}");
    }
  }

  #[test]
  fn verify_power_of_2() {
    assert!(!is_power_of_2(0));
    assert!(is_power_of_2(1));
    assert!(is_power_of_2(64));
    assert!(!is_power_of_2(72));
    assert_eq!(3, zeros(72));
  }
}
