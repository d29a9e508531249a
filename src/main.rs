use std::fs::create_dir_all;
use std::path::PathBuf;
use std::time::Instant;

use chrono::Local;
use clap::Parser;
use rand::Rng;
use rand::seq::SliceRandom;
use tracing_subscriber::EnvFilter;

use merkle_accumulator::{
  ArrayMerkleTree, Digest, HashTree, HistoricalAccumulator, PointerMerkleTree, Result, element, verify_fast,
};

use crate::stat::Report;

mod stat;

#[derive(Parser)]
#[command(name = "merkle-bench")]
#[command(author, version, about = "Measure append, proof and verification costs of Merkle accumulators")]
struct Args {
  /// Largest number of elements to measure
  #[arg(default_value_t = 65536usize)]
  data_size: usize,

  /// Output directory for the CSV reports
  #[arg(short, long, default_value = ".")]
  output: PathBuf,

  /// Prefix of the report file names
  #[arg(short, long, default_value_t = Local::now().format("%Y%m%d%H%M%S").to_string())]
  session: String,

  /// Repetitions of each append measurement
  #[arg(short, long, default_value_t = 5)]
  trials: usize,

  /// Number of measured sizes between 0 and `data_size`
  #[arg(short, long, default_value_t = 8)]
  division: usize,

  /// Random indices proven and verified at each measured size
  #[arg(short, long, default_value_t = 100)]
  queries: usize,
}

impl Args {
  fn sizes(&self) -> Vec<usize> {
    let division = self.division.max(1);
    let mut sizes = (1..=division).map(|d| self.data_size * d / division).filter(|n| *n > 0).collect::<Vec<_>>();
    sizes.dedup();
    sizes
  }

  fn save(&self, case: &str, report: &Report) -> Result<()> {
    let path = self.output.join(format!("{}-{case}.csv", self.session));
    report.save_to_csv(&path)?;
    println!("==> {}", path.to_string_lossy());
    Ok(())
  }
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
    .init();

  let args = Args::parse();
  create_dir_all(&args.output)?;
  println!("Output directory: {:?}", &args.output);

  let values = (0..args.data_size as u64).map(element).collect::<Vec<_>>();

  run_append(&args, "append-pointer", &values, |values| {
    let mut tree = PointerMerkleTree::new();
    values.iter().for_each(|v| tree.add(*v));
    Ok(tree.root())
  })?;
  run_append(&args, "append-array", &values, |values| {
    let mut tree = ArrayMerkleTree::new();
    values.iter().for_each(|v| tree.add(*v));
    Ok(tree.root())
  })?;
  run_append(&args, "build-pointer", &values, |values| Ok(PointerMerkleTree::from_leaves(values).root()))?;
  run_append(&args, "append-accumulator", &values, |values| {
    let mut acc = HistoricalAccumulator::<PointerMerkleTree>::new();
    values.iter().for_each(|v| {
      acc.add(*v);
    });
    Ok(acc.get_root())
  })?;

  run_queries(&args, &values)?;
  Ok(())
}

fn run_append<F: Fn(&[Digest]) -> Result<Digest>>(args: &Args, case: &str, values: &[Digest], append: F) -> Result<()> {
  println!("[{case}]");
  let mut report = Report::new();
  for n in args.sizes() {
    for _ in 0..args.trials {
      let start = Instant::now();
      let root = append(&values[..n])?;
      report.add(n, start.elapsed());
      assert_ne!(merkle_accumulator::NIL, root);
    }
    println!("  n={n}: {}", report.single(n));
  }
  args.save(case, &report)
}

/// Grows one accumulator through every measured size and times single proofs and verifications at each of them.
fn run_queries(args: &Args, values: &[Digest]) -> Result<()> {
  println!("[prove-current, prove-historical, verify-historical]");
  let mut rng = rand::rng();
  let mut current = Report::new();
  let mut historical = Report::new();
  let mut verification = Report::new();

  let mut acc = HistoricalAccumulator::<ArrayMerkleTree>::new();
  for n in args.sizes() {
    for v in &values[acc.len()..n] {
      acc.add(*v);
    }

    let mut indices = (1..=n).collect::<Vec<_>>();
    indices.shuffle(&mut rng);
    for &i in indices.iter().take(args.queries) {
      let start = Instant::now();
      let proof = acc.prove(i)?;
      current.add(n, start.elapsed());
      assert!(verify_fast(&acc.get_root(), n, i, &proof, &values[i - 1]), "current proof of {i} at {n}");

      let m = rng.random_range(i..=n);
      let start = Instant::now();
      let proof = acc.prove_from(m, i)?;
      historical.add(n, start.elapsed());

      let root = acc.root_at(m).unwrap_or(merkle_accumulator::NIL);
      let start = Instant::now();
      let verified = verify_fast(&root, m, i, &proof, &values[i - 1]);
      verification.add(n, start.elapsed());
      assert!(verified, "historical proof of {i} against R[{m}]");
    }
    println!(
      "  n={n}: current {}; historical {}; verify {}",
      current.single(n),
      historical.single(n),
      verification.single(n)
    );
  }

  args.save("prove-current", &current)?;
  args.save("prove-historical", &historical)?;
  args.save("verify-historical", &verification)
}
