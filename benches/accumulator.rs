use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use merkle_accumulator::proof::verify;
use merkle_accumulator::{ArrayMerkleTree, HashTree, HistoricalAccumulator, PointerMerkleTree, element};

const N: u64 = 1 << 12;

fn bench_append(c: &mut Criterion) {
  let values = (0..N).map(element).collect::<Vec<_>>();
  c.bench_function("pointer-tree append", |b| {
    b.iter_batched(
      PointerMerkleTree::new,
      |mut tree| values.iter().for_each(|v| tree.add(*v)),
      BatchSize::SmallInput,
    )
  });
  c.bench_function("array-tree append", |b| {
    b.iter_batched(ArrayMerkleTree::new, |mut tree| values.iter().for_each(|v| tree.add(*v)), BatchSize::SmallInput)
  });
  c.bench_function("pointer-tree build", |b| b.iter(|| PointerMerkleTree::from_leaves(black_box(&values))));
}

fn bench_prove(c: &mut Criterion) {
  let values = (0..N).map(element).collect::<Vec<_>>();
  let tree = PointerMerkleTree::from_leaves(&values);
  let acc = HistoricalAccumulator::<PointerMerkleTree>::from_elements(&values);
  let n = values.len();

  c.bench_function("pointer-tree prove_leaf", |b| {
    let mut i = 0;
    b.iter(|| {
      i = (i + 7919) % n;
      tree.prove_leaf(black_box(i)).unwrap()
    })
  });
  c.bench_function("accumulator prove_from", |b| {
    let mut i = 0;
    b.iter(|| {
      i = (i + 7919) % n;
      acc.prove_from(black_box(n - i / 2), black_box(i / 2 + 1)).unwrap()
    })
  });

  let proof = tree.prove_leaf(n / 3).unwrap();
  let root = tree.root();
  c.bench_function("verify", |b| b.iter(|| verify(&root, n, black_box(&values[n / 3]), n / 3, &proof)));
}

criterion_group!(benches, bench_append, bench_prove);
criterion_main!(benches);
