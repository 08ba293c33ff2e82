use anyhow::{anyhow, Context, Result};
use apted::parsing::{self, LabelDict, LabelId};
use apted::ted::tree::ArenaNode;
use apted::{Apted, CostModel, FixedCostModel, UnitCostModel};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::process::exit;

/// Tree edit distance (APTED) over trees in bracket notation
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute the tree edit distance between two trees
    Distance {
        /// Bracket-notation tree, or `@path` to read it from a file
        tree1: String,
        /// Bracket-notation tree, or `@path` to read it from a file
        tree2: String,
        #[arg(long, default_value = "unit")]
        cost: String,
    },
    /// Compute the tree edit distance and print the edit mapping
    Mapping {
        tree1: String,
        tree2: String,
        #[arg(long, default_value = "unit")]
        cost: String,
    },
    /// Compute TED for every pair in a CSV against a shared dataset file
    Batch {
        /// One bracket-notation tree per line
        #[arg(long, value_name = "FILE")]
        dataset: PathBuf,
        /// CSV with a `tree1_idx,tree2_idx` header
        #[arg(long, value_name = "FILE")]
        pairs: PathBuf,
        /// Where to write the `tree1_idx,tree2_idx,distance` CSV
        #[arg(long, value_name = "FILE")]
        output: PathBuf,
        #[arg(long, default_value = "unit")]
        cost: String,
    },
}

/// Dispatches to whichever concrete cost model the `--cost` flag named,
/// so the rest of the CLI can stay generic over a single type.
#[derive(Debug, Clone, Copy)]
enum ChosenCost {
    Unit(UnitCostModel),
    Fixed(FixedCostModel),
}

impl CostModel<LabelId> for ChosenCost {
    fn delete(&self, label: &LabelId) -> f64 {
        match self {
            ChosenCost::Unit(c) => c.delete(label),
            ChosenCost::Fixed(c) => c.delete(label),
        }
    }

    fn insert(&self, label: &LabelId) -> f64 {
        match self {
            ChosenCost::Unit(c) => c.insert(label),
            ChosenCost::Fixed(c) => c.insert(label),
        }
    }

    fn rename(&self, from: &LabelId, to: &LabelId) -> f64 {
        match self {
            ChosenCost::Unit(c) => c.rename(from, to),
            ChosenCost::Fixed(c) => c.rename(from, to),
        }
    }
}

fn parse_cost(spec: &str) -> Result<ChosenCost> {
    if spec == "unit" {
        return Ok(ChosenCost::Unit(UnitCostModel));
    }
    let rest = spec
        .strip_prefix("fixed:")
        .ok_or_else(|| anyhow!("unknown cost spec '{spec}', expected 'unit' or 'fixed:del,ins,upd'"))?;
    let parts: Vec<&str> = rest.split(',').collect();
    let [del, ins, upd] = parts[..] else {
        return Err(anyhow!(
            "fixed cost spec needs exactly 3 comma-separated values: del,ins,upd"
        ));
    };
    let del: f64 = del.parse().context("invalid delete cost")?;
    let ins: f64 = ins.parse().context("invalid insert cost")?;
    let upd: f64 = upd.parse().context("invalid rename cost")?;
    Ok(ChosenCost::Fixed(FixedCostModel::new(del, ins, upd)))
}

/// Resolves a CLI tree argument: `@path` reads the bracket string from
/// a file, anything else is taken literally.
fn resolve_tree_arg(arg: &str) -> Result<String> {
    if let Some(path) = arg.strip_prefix('@') {
        Ok(fs::read_to_string(path)
            .with_context(|| format!("reading tree file {path}"))?
            .trim()
            .to_owned())
    } else {
        Ok(arg.to_owned())
    }
}

#[derive(Debug, Deserialize)]
struct PairRecord {
    tree1_idx: usize,
    tree2_idx: usize,
}

#[derive(Debug, Serialize)]
struct ResultRecord {
    tree1_idx: usize,
    tree2_idx: usize,
    distance: f64,
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Distance { tree1, tree2, cost } => {
            let cost = parse_cost(&cost)?;
            let mut ld = LabelDict::new();
            let t1 = parsing::parse_single(resolve_tree_arg(&tree1)?, &mut ld);
            let t2 = parsing::parse_single(resolve_tree_arg(&tree2)?, &mut ld);
            let n1 = ArenaNode::root(&t1);
            let n2 = ArenaNode::root(&t2);

            let mut apted = Apted::new(cost);
            let distance = apted.compute_edit_distance(&n1, &n2)?;
            println!("{distance}");
        }
        Command::Mapping { tree1, tree2, cost } => {
            let cost = parse_cost(&cost)?;
            let mut ld = LabelDict::new();
            let t1 = parsing::parse_single(resolve_tree_arg(&tree1)?, &mut ld);
            let t2 = parsing::parse_single(resolve_tree_arg(&tree2)?, &mut ld);
            let n1 = ArenaNode::root(&t1);
            let n2 = ArenaNode::root(&t2);

            let mut apted = Apted::new(cost);
            apted.compute_edit_distance(&n1, &n2)?;
            let mapping = apted.compute_edit_mapping()?;
            for (p1, p2) in mapping.pairs {
                println!("{p1} {p2}");
            }
        }
        Command::Batch {
            dataset,
            pairs,
            output,
            cost,
        } => {
            let cost = parse_cost(&cost)?;
            let mut ld = LabelDict::new();
            let trees = parsing::parse_dataset(&dataset, &mut ld)
                .with_context(|| format!("parsing dataset {}", dataset.display()))?;

            let mut reader = csv::Reader::from_path(&pairs)
                .with_context(|| format!("reading pairs CSV {}", pairs.display()))?;
            let pairs: Vec<PairRecord> = reader
                .deserialize()
                .collect::<std::result::Result<Vec<_>, _>>()
                .context("malformed pairs CSV")?;

            let results: Vec<ResultRecord> = pairs
                .par_iter()
                .map(|p| -> Result<ResultRecord> {
                    let t1 = trees
                        .get(p.tree1_idx)
                        .ok_or_else(|| anyhow!("tree1_idx {} out of range", p.tree1_idx))?;
                    let t2 = trees
                        .get(p.tree2_idx)
                        .ok_or_else(|| anyhow!("tree2_idx {} out of range", p.tree2_idx))?;
                    let n1 = ArenaNode::root(t1);
                    let n2 = ArenaNode::root(t2);

                    // Each task owns its own `Apted` instance: the spec
                    // sanctions this as the only form of parallel use.
                    let mut apted = Apted::new(cost);
                    let distance = apted.compute_edit_distance(&n1, &n2)?;
                    Ok(ResultRecord {
                        tree1_idx: p.tree1_idx,
                        tree2_idx: p.tree2_idx,
                        distance,
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            let mut writer = csv::Writer::from_path(&output)
                .with_context(|| format!("writing results CSV {}", output.display()))?;
            for record in &results {
                writer.serialize(record)?;
            }
            writer.flush()?;
            println!("Computed {} pairs", results.len());
        }
    }

    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        exit(1);
    }
}
