//! Randomized property coverage, run only under `cfg(test)`.
//!
//! Generates small random trees with a seeded `Xoshiro256PlusPlus`
//! generator and checks non-negativity, identity, swap-symmetry,
//! oracle agreement and mapping-cost agreement across many seeds —
//! the property-test harness the bundled `rand`/`rand_xoshiro`
//! dependencies exist for.

#![cfg(test)]

use crate::parsing::{parse_single, LabelDict};
use crate::ted::cost::UnitCostModel;
use crate::ted::indexing::AptedIndex;
use crate::ted::mapping::{self, EditMapping};
use crate::ted::oracle;
use crate::ted::gted;
use crate::ted::tree::ArenaNode;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

const LABELS: [&str; 4] = ["a", "b", "c", "d"];

/// Builds a random bracket-notation tree of at most `budget` nodes.
fn random_tree(rng: &mut Xoshiro256PlusPlus, budget: &mut usize) -> String {
    let label = LABELS[rng.gen_range(0..LABELS.len())];
    *budget -= 1;
    let mut s = format!("{{{label}");

    let max_children = (*budget).min(3);
    if max_children > 0 {
        let num_children = rng.gen_range(0..=max_children);
        for _ in 0..num_children {
            if *budget == 0 {
                break;
            }
            s.push_str(&random_tree(rng, budget));
        }
    }
    s.push('}');
    s
}

fn index_of(s: &str, ld: &mut LabelDict) -> AptedIndex<i32> {
    let tree = parse_single(s.to_owned(), ld);
    let root = ArenaNode::root(&tree);
    AptedIndex::index_tree(&root, &UnitCostModel)
}

fn is_ancestor(idx: &AptedIndex<i32>, a: i32, b: i32) -> bool {
    b >= a && b <= a + idx.prel_to_size_[a as usize] - 1
}

fn assert_mapping_is_legal(mapping: &EditMapping, idx1: &AptedIndex<i32>, idx2: &AptedIndex<i32>) {
    let mapped: Vec<(i32, i32)> = mapping
        .pairs
        .iter()
        .filter(|&&(p1, p2)| p1 != 0 && p2 != 0)
        .map(|&(p1, p2)| {
            (
                idx1.postl_to_prel_[p1 - 1],
                idx2.postl_to_prel_[p2 - 1],
            )
        })
        .collect();

    for &(x1, y1) in &mapped {
        for &(x2, y2) in &mapped {
            if (x1, y1) == (x2, y2) {
                continue;
            }
            assert_eq!(
                is_ancestor(idx1, x1, x2),
                is_ancestor(idx2, y1, y2),
                "ancestor-descendant order not preserved"
            );
            assert_eq!(x1 < x2, y1 < y2, "sibling order not preserved");
        }
    }
}

#[test]
fn random_trees_satisfy_core_properties() {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(0xC0FFEE_u64);

    for _ in 0..150 {
        let mut b1 = 7;
        let mut b2 = 7;
        let s1 = random_tree(&mut rng, &mut b1);
        let s2 = random_tree(&mut rng, &mut b2);

        let mut ld = LabelDict::new();
        let idx1 = index_of(&s1, &mut ld);
        let idx2 = index_of(&s2, &mut ld);

        // 1. Non-negativity.
        let (d_ab, delta_ab) = gted::compute(&idx1, &idx2, &UnitCostModel);
        assert!(d_ab >= 0.0, "{s1} vs {s2}: negative TED");

        // 2. Identity.
        let (d_aa, _) = gted::compute(&idx1, &idx1, &UnitCostModel);
        assert_eq!(d_aa, 0.0, "{s1}: TED(a,a) != 0");

        // 3. Symmetry under unit cost.
        let (d_ba, _) = gted::compute(&idx2, &idx1, &UnitCostModel);
        assert_eq!(d_ab, d_ba, "{s1} vs {s2}: not symmetric");

        // 4. Oracle agreement on small inputs.
        let apmt = oracle::all_mappings_min_cost(
            &idx1,
            &idx2,
            &UnitCostModel,
            oracle::DEFAULT_NODE_BOUND,
        )
        .unwrap();
        assert_eq!(d_ab, apmt, "{s1} vs {s2}: oracle disagreement");

        // 6 & 9. Mapping-cost agreement and mapping legality.
        let mapping = mapping::extract_mapping(&idx1, &idx2, &UnitCostModel, &delta_ab);
        let cost = mapping::mapping_cost(&mapping, &idx1, &idx2, &UnitCostModel);
        assert_eq!(cost, d_ab, "{s1} vs {s2}: mapping cost disagreement");
        assert_mapping_is_legal(&mapping, &idx1, &idx2);
    }
}

#[test]
fn scenario_s4_agrees_with_oracle_under_fixed_cost() {
    use crate::ted::cost::FixedCostModel;

    let mut ld = LabelDict::new();
    let idx1 = index_of("{f{d{a}{c{b}}}{e}}", &mut ld);
    let idx2 = index_of("{f{c{d{a}{b}}}{e}}", &mut ld);
    let fixed = FixedCostModel::new(0.4, 0.4, 0.6);

    let (d, _) = gted::compute(&idx1, &idx2, &fixed);
    let apmt = oracle::all_mappings_min_cost(&idx1, &idx2, &fixed, oracle::DEFAULT_NODE_BOUND).unwrap();
    assert!((d - apmt).abs() < 1e-4);
}

#[test]
fn scenario_table_matches_unit_cost_expectations() {
    let scenarios = [
        ("{a}", "{a}", 0.0),
        ("{a}", "{b}", 1.0),
        ("{a{b}{c}}", "{a{c}{b}}", 2.0),
        ("{f{d{a}{c{b}}}{e}}", "{f{c{d{a}{b}}}{e}}", 2.0),
        ("{a{b{c}}}", "{a{b}{c}}", 1.0),
        ("{r{a}{b}{c}{d}}", "{r}", 4.0),
    ];
    for (s1, s2, expected) in scenarios {
        let mut ld = LabelDict::new();
        let idx1 = index_of(s1, &mut ld);
        let idx2 = index_of(s2, &mut ld);
        let (d, _) = gted::compute(&idx1, &idx2, &UnitCostModel);
        assert_eq!(d, expected, "{s1} vs {s2}");
    }
}
