use super::*;
use crate::element;
use crate::proof::verify;

fn elements(n: usize) -> Vec<Digest> {
  (0..n as u64).map(element).collect()
}

/// Number of leaves under `id`, asserting the left-complete split on the way.
fn check_shape(tree: &PointerMerkleTree, id: NodeId) -> usize {
  let node = tree.node(id).unwrap();
  match node.children {
    None => 1,
    Some((left, right)) => {
      assert_eq!(Some(id), tree.node(left).unwrap().parent);
      assert_eq!(Some(id), tree.node(right).unwrap().parent);
      let l = check_shape(tree, left);
      let r = check_shape(tree, right);
      assert_eq!(largest_power_of_2_less_than(l + r), l, "left subtree of {id}");
      assert_eq!(combine(&tree.node(left).unwrap().hash, &tree.node(right).unwrap().hash), node.hash);
      l + r
    }
  }
}

#[test]
fn test_empty_tree() {
  let tree = PointerMerkleTree::new();
  assert_eq!(0, tree.len());
  assert!(tree.is_empty());
  assert_eq!(NIL, tree.root());
  assert!(matches!(tree.get(0), Err(Error::IndexOutOfRange { index: 0, len: 0 })));
  assert!(matches!(tree.prove_leaf(0), Err(Error::IndexOutOfRange { .. })));
  assert!(tree.values().is_empty());
  assert_eq!(NIL, PointerMerkleTree::from_leaves(&[]).root());
}

#[test]
fn verify_left_complete_shape() {
  let values = elements(70);
  let mut tree = PointerMerkleTree::new();
  for n in 1..=values.len() {
    tree.add(values[n - 1]);
    assert_eq!(n, tree.len());
    assert_eq!(ceil_lg(n), tree.depth(), "n={n}");
    assert_eq!(n, check_shape(&tree, tree.root_id().unwrap()));
    assert!(tree.node(tree.root_id().unwrap()).unwrap().parent.is_none());

    let built = PointerMerkleTree::from_leaves(&values[..n]);
    assert_eq!(built.root(), tree.root(), "n={n}");
    assert_eq!(n, check_shape(&built, built.root_id().unwrap()));
  }
}

#[test]
fn test_small_roots() {
  let (a, b, c) = (element(1), element(2), element(3));
  let mut tree = PointerMerkleTree::new();
  tree.add(a);
  assert_eq!(a, tree.root());
  tree.add(b);
  assert_eq!(combine(&a, &b), tree.root());
  tree.add(c);
  assert_eq!(combine(&combine(&a, &b), &c), tree.root());
}

#[test]
fn test_prove_and_verify_every_leaf() {
  for n in 1..=40 {
    let values = elements(n);
    let tree = PointerMerkleTree::from_leaves(&values);
    let root = tree.root();
    for (i, value) in values.iter().enumerate() {
      let proof = tree.prove_leaf(i).unwrap();
      assert!(verify(&root, n, value, i, &proof), "n={n}, i={i}");
      assert!(!verify(&root, n, &element(1000), i, &proof), "n={n}, i={i}");
    }
    assert!(matches!(tree.prove_leaf(n), Err(Error::IndexOutOfRange { .. })));
  }
}

#[test]
fn test_set_at_len_is_add() {
  let values = elements(13);
  for n in 0..values.len() {
    let mut added = PointerMerkleTree::from_leaves(&values[..n]);
    let mut set = PointerMerkleTree::from_leaves(&values[..n]);
    added.add(values[n]);
    set.set(n, values[n]).unwrap();
    assert_eq!(added.root(), set.root());
    assert_eq!(added.values(), set.values());
    assert_eq!(added.depth(), set.depth());
  }
}

#[test]
fn test_set_overwrites_leaf() {
  let mut values = elements(11);
  let mut tree = PointerMerkleTree::from_leaves(&values);
  for i in [0, 5, 10, 7] {
    values[i] = element(100 + i as u64);
    tree.set(i, values[i]).unwrap();
    assert_eq!(values[i], tree.get(i).unwrap());
    assert_eq!(PointerMerkleTree::from_leaves(&values).root(), tree.root(), "i={i}");
  }
}

#[test]
fn test_set_out_of_range() {
  let mut tree = PointerMerkleTree::from_leaves(&elements(5));
  let root = tree.root();
  assert!(matches!(tree.set(6, element(9)), Err(Error::IndexOutOfRange { index: 6, len: 5 })));
  assert_eq!(root, tree.root());
  assert_eq!(5, tree.len());
}

#[test]
fn test_copy_is_independent() {
  let mut tree = PointerMerkleTree::from_leaves(&elements(6));
  let root = tree.root();
  let mut copy = tree.copy();
  assert_eq!(root, copy.root());

  copy.add(element(6));
  copy.set(2, element(99)).unwrap();
  assert_eq!(root, tree.root());
  assert_eq!(6, tree.len());

  tree.set(0, element(42)).unwrap();
  assert_ne!(tree.root(), copy.root());
}

#[test]
fn test_sibling_of_root() {
  let tree = PointerMerkleTree::from_leaves(&elements(3));
  let root = tree.root_id().unwrap();
  assert!(matches!(tree.sibling(root), Err(Error::RootHasNoSibling)));

  let single = PointerMerkleTree::from_leaves(&elements(1));
  assert!(single.prove_leaf(0).unwrap().is_empty());
}

#[test]
fn test_sibling_of_unknown_node() {
  let tree = PointerMerkleTree::from_leaves(&elements(3));
  assert!(matches!(tree.sibling(999), Err(Error::Inconsistent(_))));
  assert!(matches!(PointerMerkleTree::new().sibling(0), Err(Error::Inconsistent(_))));

  let root = tree.root_id().unwrap();
  let (left, right) = tree.node(root).unwrap().children.unwrap();
  assert_eq!(right, tree.sibling(left).unwrap());
  assert_eq!(left, tree.sibling(right).unwrap());
}
